//! Vertex position relaxation on a surface.
//!
//! Positions live outside the topology, in a slice indexed by vertex id. On a
//! wrapped tiling the neighbors of a seam vertex are stored on the far side of
//! the domain, so every neighbor lookup goes through [`WrapOffsets`].
//!
//! These functions are the usual building blocks of the per-pass callback of
//! the topology randomizer:
//!
//! ```
//! use std::cell::RefCell;
//! use tessera::algo::randomize::{randomize_topology_with, relaxation_loop, RandomizeOptions};
//! use tessera::algo::relax::{relax_vertex_positions, repair_inverted_faces, RelaxOptions};
//! use tessera::grid::QuadGrid;
//! use tessera::mesh::HalfEdgeMesh;
//! use tessera::surface::Plane;
//!
//! let grid = QuadGrid::new(6, 6).with_wrap(true, true);
//! let mut mesh: HalfEdgeMesh = grid.build_mesh().unwrap();
//! let positions = RefCell::new(grid.positions(1.0));
//! let offsets = grid.wrap_offsets(1.0);
//! let plane = Plane::xy();
//! let options = RelaxOptions::default();
//!
//! let relax = |m: &HalfEdgeMesh| {
//!     relax_vertex_positions(m, &mut positions.borrow_mut(), &plane, &offsets, &options)
//!         .unwrap_or(0.0)
//! };
//! let repair = |m: &HalfEdgeMesh| {
//!     repair_inverted_faces(m, &mut positions.borrow_mut(), &plane, &offsets, &options)
//!         .unwrap_or(true)
//! };
//!
//! let mut rng = fastrand::Rng::with_seed(7);
//! let after_pass = relaxation_loop(8, 3, 0.05, relax, repair);
//! randomize_topology_with(&mut mesh, &RandomizeOptions::default(), &mut rng, after_pass).unwrap();
//! ```

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::error::{Result, TopologyError};
use crate::mesh::{FaceId, HalfEdgeMesh, MeshIndex, VertexId};
use crate::surface::{Surface, WrapOffsets};

/// Options for position relaxation and repair.
#[derive(Debug, Clone)]
pub struct RelaxOptions {
    /// Fraction of the way each vertex moves toward its neighbor centroid.
    pub lambda: f64,

    /// Whether vertices touching an external face stay fixed.
    pub preserve_boundary: bool,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for RelaxOptions {
    fn default() -> Self {
        Self {
            lambda: 0.5,
            preserve_boundary: true,
            parallel: true,
        }
    }
}

impl RelaxOptions {
    /// Set the step fraction.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Allow boundary vertices to move.
    pub fn allow_boundary_movement(mut self) -> Self {
        self.preserve_boundary = false;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check that `lambda` lies in `(0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !(self.lambda > 0.0 && self.lambda <= 1.0) {
            return Err(TopologyError::invalid_param(
                "lambda",
                self.lambda,
                "must be within (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Move every vertex toward the centroid of its neighbors, then project it
/// onto `surface`.
///
/// Returns the total distance moved, summed over all vertices.
///
/// # Errors
/// `InvalidParameter` for bad options, `InvalidArgument` if `positions` does
/// not hold one point per vertex. Positions are untouched on error.
pub fn relax_vertex_positions<I, S>(
    mesh: &HalfEdgeMesh<I>,
    positions: &mut [Point3<f64>],
    surface: &S,
    offsets: &WrapOffsets,
    options: &RelaxOptions,
) -> Result<f64>
where
    I: MeshIndex,
    S: Surface + ?Sized,
{
    options.validate()?;
    check_positions(mesh, positions)?;

    let fixed = fixed_vertices(mesh, options);
    let current: &[Point3<f64>] = positions;
    let step = |i: usize| -> Point3<f64> {
        let old = current[i];
        if fixed[i] {
            return old;
        }
        let target = neighbor_centroid(mesh, current, offsets, VertexId::new(i));
        surface.project(old + (target - old) * options.lambda)
    };

    let updated: Vec<Point3<f64>> = if options.parallel {
        (0..mesh.num_vertices()).into_par_iter().map(step).collect()
    } else {
        (0..mesh.num_vertices()).map(step).collect()
    };

    let mut change = 0.0;
    for (old, new) in positions.iter_mut().zip(updated) {
        change += (new - *old).norm();
        *old = new;
    }
    Ok(change)
}

/// Pull the vertices of inverted faces back to their neighbor centroids.
///
/// A face is inverted when its winding normal points against the surface
/// normal at its centroid. Returns `true` when no inverted face was found,
/// in which case nothing moved.
///
/// # Errors
/// Same as [`relax_vertex_positions`].
pub fn repair_inverted_faces<I, S>(
    mesh: &HalfEdgeMesh<I>,
    positions: &mut [Point3<f64>],
    surface: &S,
    offsets: &WrapOffsets,
    options: &RelaxOptions,
) -> Result<bool>
where
    I: MeshIndex,
    S: Surface + ?Sized,
{
    options.validate()?;
    check_positions(mesh, positions)?;

    let inverted: Vec<FaceId<I>> = mesh
        .internal_face_ids()
        .filter(|&f| is_inverted(mesh, positions, surface, offsets, f))
        .collect();
    if inverted.is_empty() {
        return Ok(true);
    }
    log::trace!("repairing {} inverted faces", inverted.len());

    let fixed = fixed_vertices(mesh, options);
    let mut selected = vec![false; mesh.num_vertices()];
    for &f in &inverted {
        for he in mesh.face_halfedges(f) {
            let v = mesh.far_vertex(he);
            selected[v.index()] = !fixed[v.index()];
        }
    }

    let moves: Vec<(usize, Point3<f64>)> = (0..mesh.num_vertices())
        .filter(|&i| selected[i])
        .map(|i| {
            let target = neighbor_centroid(mesh, positions, offsets, VertexId::new(i));
            (i, surface.project(target))
        })
        .collect();
    for (i, p) in moves {
        positions[i] = p;
    }

    Ok(false)
}

fn check_positions<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, positions: &[Point3<f64>]) -> Result<()> {
    if positions.len() != mesh.num_vertices() {
        return Err(TopologyError::InvalidArgument(format!(
            "{} positions for {} vertices",
            positions.len(),
            mesh.num_vertices()
        )));
    }
    Ok(())
}

fn fixed_vertices<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, options: &RelaxOptions) -> Vec<bool> {
    if options.preserve_boundary {
        mesh.vertex_ids()
            .map(|v| mesh.has_external_face_neighbor(v))
            .collect()
    } else {
        vec![false; mesh.num_vertices()]
    }
}

/// Centroid of the neighbors of `v`, each carried across seams next to `v`.
fn neighbor_centroid<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    positions: &[Point3<f64>],
    offsets: &WrapOffsets,
    v: VertexId<I>,
) -> Point3<f64> {
    let mut sum = Vector3::<f64>::zeros();
    let mut count = 0usize;
    for he in mesh.vertex_halfedges(v) {
        let far = mesh.far_vertex(he);
        sum += positions[far.index()].coords + offsets.offset(mesh.wrap(he));
        count += 1;
    }
    if count == 0 {
        return positions[v.index()];
    }
    Point3::from(sum / count as f64)
}

fn is_inverted<I: MeshIndex, S: Surface + ?Sized>(
    mesh: &HalfEdgeMesh<I>,
    positions: &[Point3<f64>],
    surface: &S,
    offsets: &WrapOffsets,
    f: FaceId<I>,
) -> bool {
    // Walk the boundary, unrolling seam crossings as we go.
    let mut shift = Vector3::<f64>::zeros();
    let mut corners = Vec::with_capacity(mesh.face_neighbor_count(f));
    for he in mesh.face_halfedges(f) {
        corners.push(positions[mesh.near_vertex(he).index()] + shift);
        shift += offsets.offset(mesh.wrap(he));
    }

    // Newell's method
    let mut normal = Vector3::<f64>::zeros();
    for (k, p) in corners.iter().enumerate() {
        let q = corners[(k + 1) % corners.len()];
        normal += p.coords.cross(&q.coords);
    }
    let centroid = corners
        .iter()
        .fold(Vector3::<f64>::zeros(), |acc, p| acc + p.coords)
        / corners.len().max(1) as f64;
    let up = surface.normal(surface.project(Point3::from(centroid)));
    normal.dot(&up) < 0.0
}
