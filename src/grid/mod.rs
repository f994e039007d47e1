//! Wrapped 2D grid indexing.
//!
//! A grid indexer maps between the linear identity of a face or vertex and an
//! integer 2D coordinate on a logical grid, with optional wrap-around per axis.
//! Wrapping axes reduce any coordinate into range (Euclidean modulo), so the
//! same indexer describes planar, cylindrical and toroidal tilings.
//!
//! Concrete shapes only supply the primitives of [`Indexer2D`]; every other
//! lookup is a composition of them. [`RectIndexer`] lays cells out in plain
//! rows, [`OffsetRowIndexer`] shifts every odd row by half a cell.
//!
//! Coordinates are `i32`, so a wrapping axis can only reduce coordinates when
//! its extent fits in an `i32`; longer axes are left unreduced.
//!
//! # Example
//!
//! ```
//! use tessera::grid::{Indexer2D, RectIndexer};
//! use tessera::nalgebra::Point2;
//!
//! let grid = RectIndexer::new(4, 3).with_wrap(true, false);
//! assert_eq!(grid.index_1d(Point2::new(1, 2)), 9);
//! assert_eq!(grid.wrapped_index_1d(Point2::new(5, 2)), 9);
//! // Y does not wrap: out-of-range rows are left alone.
//! assert_eq!(grid.wrap(Point2::new(-1, 7)), Point2::new(3, 7));
//! ```

mod offset;
mod quad;

pub use offset::OffsetRowIndexer;
pub use quad::QuadGrid;

use nalgebra::Point2;

use crate::error::{Result, TopologyError};
use crate::mesh::{FaceId, MeshIndex, VertexId};

/// Conversion between linear indices and wrapped 2D grid coordinates.
pub trait Indexer2D {
    /// Number of columns.
    fn width(&self) -> usize;

    /// Number of rows.
    fn height(&self) -> usize;

    /// Linear index of an in-range coordinate.
    fn index_1d(&self, p: Point2<i32>) -> usize;

    /// Coordinate of a linear index.
    fn index_2d(&self, index: usize) -> Point2<i32>;

    /// Reduce an X coordinate. The identity when X does not wrap.
    fn wrap_x(&self, x: i32) -> i32;

    /// Reduce a Y coordinate. The identity when Y does not wrap.
    fn wrap_y(&self, y: i32) -> i32;

    /// Number of cells.
    fn len(&self) -> usize {
        self.width() * self.height()
    }

    /// Whether the grid has no cells.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reduce both coordinates.
    fn wrap(&self, p: Point2<i32>) -> Point2<i32> {
        Point2::new(self.wrap_x(p.x), self.wrap_y(p.y))
    }

    /// Linear index of a coordinate after wrapping it.
    fn wrapped_index_1d(&self, p: Point2<i32>) -> usize {
        self.index_1d(self.wrap(p))
    }

    /// Wrapped coordinate of a linear index.
    fn wrapped_index_2d(&self, index: usize) -> Point2<i32> {
        self.wrap(self.index_2d(index))
    }

    /// Whether a coordinate lands on a cell once wrapped.
    fn contains(&self, p: Point2<i32>) -> bool {
        let q = self.wrap(p);
        q.x >= 0 && q.y >= 0 && (q.x as usize) < self.width() && (q.y as usize) < self.height()
    }

    /// Checked linear index of a coordinate after wrapping it.
    ///
    /// # Errors
    /// `OutOfRange` when the wrapped coordinate lies outside the grid.
    fn try_index_1d(&self, p: Point2<i32>) -> Result<usize> {
        if self.contains(p) {
            return Ok(self.wrapped_index_1d(p));
        }
        let q = self.wrap(p);
        let linear = q.y as i64 * self.width() as i64 + q.x as i64;
        Err(TopologyError::out_of_range(
            "grid cell",
            usize::try_from(linear).unwrap_or(usize::MAX),
            self.len(),
        ))
    }

    /// Number of times each axis seam is crossed between the origin cell and
    /// `p`. Always zero on an axis that does not wrap.
    fn seam_offset(&self, p: Point2<i32>) -> (i32, i32) {
        let q = self.wrap(p);
        (
            seam_crossings(p.x, q.x, self.width()),
            seam_crossings(p.y, q.y, self.height()),
        )
    }
}

/// Reduce `v` into `0..extent` on a wrapping axis.
///
/// The identity when the axis does not wrap, is empty, or is too long for
/// `i32` coordinates.
#[inline]
pub(crate) fn wrap_axis(v: i32, extent: usize, wraps: bool) -> i32 {
    match i32::try_from(extent) {
        Ok(extent) if wraps && extent > 0 => v.rem_euclid(extent),
        _ => v,
    }
}

/// How many extents separate a coordinate from its wrapped counterpart.
fn seam_crossings(v: i32, wrapped: i32, extent: usize) -> i32 {
    let Ok(extent) = i64::try_from(extent) else {
        return 0;
    };
    if extent == 0 {
        return 0;
    }
    // For a reducing axis this is `v.div_euclid(extent)`, which fits in i32.
    ((i64::from(v) - i64::from(wrapped)) / extent) as i32
}

/// Row-major rectangular grid: `index = y * width + x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectIndexer {
    width: usize,
    height: usize,
    wrap_x: bool,
    wrap_y: bool,
}

impl RectIndexer {
    /// A `width × height` grid without wrapping.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            wrap_x: false,
            wrap_y: false,
        }
    }

    /// Set which axes wrap around.
    pub fn with_wrap(mut self, wrap_x: bool, wrap_y: bool) -> Self {
        self.wrap_x = wrap_x;
        self.wrap_y = wrap_y;
        self
    }

    /// Whether X wraps.
    pub fn wraps_x(&self) -> bool {
        self.wrap_x
    }

    /// Whether Y wraps.
    pub fn wraps_y(&self) -> bool {
        self.wrap_y
    }
}

impl Indexer2D for RectIndexer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index_1d(&self, p: Point2<i32>) -> usize {
        debug_assert!(self.contains(p) && p == self.wrap(p), "{:?} is outside the grid", p);
        p.y as usize * self.width + p.x as usize
    }

    /// On a zero-width grid every index maps to an out-of-range coordinate.
    #[inline]
    fn index_2d(&self, index: usize) -> Point2<i32> {
        match (index.checked_rem(self.width), index.checked_div(self.width)) {
            (Some(x), Some(y)) => Point2::new(x as i32, y as i32),
            _ => Point2::new(index as i32, 0),
        }
    }

    #[inline]
    fn wrap_x(&self, x: i32) -> i32 {
        wrap_axis(x, self.width, self.wrap_x)
    }

    #[inline]
    fn wrap_y(&self, y: i32) -> i32 {
        wrap_axis(y, self.height, self.wrap_y)
    }
}

macro_rules! delegate_indexer {
    ($name:ident) => {
        impl<G: Indexer2D> Indexer2D for $name<G> {
            fn width(&self) -> usize {
                self.grid.width()
            }

            fn height(&self) -> usize {
                self.grid.height()
            }

            fn index_1d(&self, p: Point2<i32>) -> usize {
                self.grid.index_1d(p)
            }

            fn index_2d(&self, index: usize) -> Point2<i32> {
                self.grid.index_2d(index)
            }

            fn wrap_x(&self, x: i32) -> i32 {
                self.grid.wrap_x(x)
            }

            fn wrap_y(&self, y: i32) -> i32 {
                self.grid.wrap_y(y)
            }

            fn len(&self) -> usize {
                self.grid.len()
            }

            fn contains(&self, p: Point2<i32>) -> bool {
                self.grid.contains(p)
            }
        }
    };
}

/// Grid indexer over faces, speaking in [`FaceId`] handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceIndexer<G = RectIndexer> {
    grid: G,
}

impl<G: Indexer2D> FaceIndexer<G> {
    /// Index faces through `grid`.
    pub fn new(grid: G) -> Self {
        Self { grid }
    }

    /// The underlying grid.
    pub fn grid(&self) -> &G {
        &self.grid
    }

    /// Face at an in-range coordinate.
    pub fn face<I: MeshIndex>(&self, p: Point2<i32>) -> FaceId<I> {
        FaceId::new(self.face_index(p))
    }

    /// Linear face index at an in-range coordinate.
    pub fn face_index(&self, p: Point2<i32>) -> usize {
        self.grid.index_1d(p)
    }

    /// Coordinate of a face.
    pub fn face_index_2d<I: MeshIndex>(&self, face: FaceId<I>) -> Point2<i32> {
        self.grid.index_2d(face.index())
    }

    /// Face at a coordinate after wrapping it.
    pub fn wrapped_face<I: MeshIndex>(&self, p: Point2<i32>) -> FaceId<I> {
        FaceId::new(self.grid.wrapped_index_1d(p))
    }

    /// Face at a coordinate after wrapping it, or `OutOfRange`.
    pub fn try_face<I: MeshIndex>(&self, p: Point2<i32>) -> Result<FaceId<I>> {
        self.grid.try_index_1d(p).map(FaceId::new)
    }
}

delegate_indexer!(FaceIndexer);

/// Grid indexer over vertices, speaking in [`VertexId`] handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexIndexer<G = RectIndexer> {
    grid: G,
}

impl<G: Indexer2D> VertexIndexer<G> {
    /// Index vertices through `grid`.
    pub fn new(grid: G) -> Self {
        Self { grid }
    }

    /// The underlying grid.
    pub fn grid(&self) -> &G {
        &self.grid
    }

    /// Vertex at an in-range coordinate.
    pub fn vertex<I: MeshIndex>(&self, p: Point2<i32>) -> VertexId<I> {
        VertexId::new(self.vertex_index(p))
    }

    /// Linear vertex index at an in-range coordinate.
    pub fn vertex_index(&self, p: Point2<i32>) -> usize {
        self.grid.index_1d(p)
    }

    /// Coordinate of a vertex.
    pub fn vertex_index_2d<I: MeshIndex>(&self, vertex: VertexId<I>) -> Point2<i32> {
        self.grid.index_2d(vertex.index())
    }

    /// Vertex at a coordinate after wrapping it.
    pub fn wrapped_vertex<I: MeshIndex>(&self, p: Point2<i32>) -> VertexId<I> {
        VertexId::new(self.grid.wrapped_index_1d(p))
    }

    /// Vertex at a coordinate after wrapping it, or `OutOfRange`.
    pub fn try_vertex<I: MeshIndex>(&self, p: Point2<i32>) -> Result<VertexId<I>> {
        self.grid.try_index_1d(p).map(VertexId::new)
    }
}

delegate_indexer!(VertexIndexer);
