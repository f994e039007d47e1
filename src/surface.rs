//! Geometric embedding of a tiling.
//!
//! The topology itself carries no positions. Geometry layers keep vertex
//! positions alongside the mesh and constrain them to a [`Surface`], which
//! answers ray intersection, closest-point projection and normal queries.
//! [`WrapOffsets`] turns the seam crossings of an edge into the translation
//! that makes its endpoints adjacent in space.

use nalgebra::{Point3, Unit, Vector3};

use crate::mesh::EdgeWrap;

/// A ray with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Point3<f64>,
    /// Unit direction.
    pub direction: Unit<Vector3<f64>>,
}

impl Ray {
    /// Create a ray; `direction` is normalized.
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self {
            origin,
            direction: Unit::new_normalize(direction),
        }
    }

    /// Point at parameter `t` along the ray.
    #[inline]
    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction.into_inner() * t
    }
}

/// A surface vertex positions can be constrained to.
pub trait Surface: Sync {
    /// First point where `ray` meets the surface, if any.
    fn intersect(&self, ray: &Ray) -> Option<Point3<f64>>;

    /// Closest point of the surface to `point`.
    fn project(&self, point: Point3<f64>) -> Point3<f64>;

    /// Outward unit normal at a point of the surface.
    fn normal(&self, point: Point3<f64>) -> Vector3<f64>;
}

/// An infinite plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Any point of the plane.
    pub origin: Point3<f64>,
    /// Unit normal.
    pub normal: Unit<Vector3<f64>>,
}

impl Plane {
    /// Create a plane through `origin`; `normal` is normalized.
    pub fn new(origin: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            origin,
            normal: Unit::new_normalize(normal),
        }
    }

    /// The plane `z = 0` facing +Z.
    pub fn xy() -> Self {
        Self::new(Point3::origin(), Vector3::z())
    }

    /// Signed distance of `point` above the plane.
    #[inline]
    pub fn signed_distance(&self, point: Point3<f64>) -> f64 {
        (point - self.origin).dot(self.normal.as_ref())
    }
}

impl Surface for Plane {
    fn intersect(&self, ray: &Ray) -> Option<Point3<f64>> {
        let denom = ray.direction.dot(self.normal.as_ref());
        if denom.abs() < f64::EPSILON {
            return None;
        }
        let t = -self.signed_distance(ray.origin) / denom;
        (t >= 0.0).then(|| ray.at(t))
    }

    fn project(&self, point: Point3<f64>) -> Point3<f64> {
        point - self.normal.into_inner() * self.signed_distance(point)
    }

    fn normal(&self, _point: Point3<f64>) -> Vector3<f64> {
        self.normal.into_inner()
    }
}

/// A sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Center.
    pub center: Point3<f64>,
    /// Radius.
    pub radius: f64,
}

impl Sphere {
    /// Create a sphere.
    pub fn new(center: Point3<f64>, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl Surface for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<Point3<f64>> {
        let oc = ray.origin - self.center;
        let b = oc.dot(ray.direction.as_ref());
        let c = oc.norm_squared() - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let root = disc.sqrt();
        // Nearest non-negative root; the far one when starting inside.
        let t = if -b - root >= 0.0 { -b - root } else { -b + root };
        (t >= 0.0).then(|| ray.at(t))
    }

    fn project(&self, point: Point3<f64>) -> Point3<f64> {
        let d = point - self.center;
        let len = d.norm();
        if len < f64::EPSILON {
            return self.center + Vector3::z() * self.radius;
        }
        self.center + d * (self.radius / len)
    }

    fn normal(&self, point: Point3<f64>) -> Vector3<f64> {
        let d = point - self.center;
        if d.norm() < f64::EPSILON {
            return Vector3::z();
        }
        d.normalize()
    }
}

/// Translation per seam crossing of each wrapped axis.
///
/// On a wrapped tiling the far vertex of a seam-crossing edge lives on the
/// other side of the domain; adding [`offset`](Self::offset) to its position
/// places it next to the near vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapOffsets {
    /// Translation for one positive crossing of the X seam.
    pub axis_x: Vector3<f64>,
    /// Translation for one positive crossing of the Y seam.
    pub axis_y: Vector3<f64>,
}

impl WrapOffsets {
    /// Offsets for a domain whose seams are `axis_x` and `axis_y` apart.
    pub fn new(axis_x: Vector3<f64>, axis_y: Vector3<f64>) -> Self {
        Self { axis_x, axis_y }
    }

    /// Offsets of a domain without wrapping.
    pub fn none() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    /// Translation that carries the far vertex of an edge with `wrap` next to
    /// its near vertex.
    #[inline]
    pub fn offset(&self, wrap: EdgeWrap) -> Vector3<f64> {
        let (dx, dy) = wrap.offset();
        self.axis_x * dx as f64 + self.axis_y * dy as f64
    }
}

impl Default for WrapOffsets {
    fn default() -> Self {
        Self::none()
    }
}
