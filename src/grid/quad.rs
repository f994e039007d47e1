//! Rectangular grids of quads.

use nalgebra::{Point2, Point3, Vector2, Vector3};

use super::{FaceIndexer, Indexer2D, RectIndexer, VertexIndexer};
use crate::error::{Result, TopologyError};
use crate::mesh::{build_from_face_neighbors, EdgeWrap, HalfEdgeMesh, ManualFaceNeighborIndexer, MeshIndex};
use crate::surface::WrapOffsets;

/// Corners of the quad at the origin cell, counter-clockwise.
const QUAD_CORNERS: [(i32, i32); 4] = [(0, 0), (1, 0), (1, 1), (0, 1)];

/// A `width × height` grid of quads, optionally wrapped along either axis.
///
/// Face `(x, y)` has corners `(x, y)`, `(x + 1, y)`, `(x + 1, y + 1)` and
/// `(x, y + 1)`. On a wrapped axis the last column (or row) of vertices is
/// the first one again, and edges crossing that seam carry an [`EdgeWrap`].
///
/// ```
/// use tessera::grid::QuadGrid;
/// use tessera::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = QuadGrid::new(4, 3).with_wrap(true, false).build_mesh().unwrap();
/// assert_eq!(mesh.num_internal_faces(), 12);
/// // A cylinder has a boundary loop at each end.
/// assert_eq!(mesh.num_external_faces(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadGrid {
    width: usize,
    height: usize,
    wrap_x: bool,
    wrap_y: bool,
}

impl QuadGrid {
    /// A planar grid of `width × height` quads.
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

    /// Number of quad columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of quad rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Indexer over the quads.
    pub fn face_indexer(&self) -> FaceIndexer {
        FaceIndexer::new(RectIndexer::new(self.width, self.height).with_wrap(self.wrap_x, self.wrap_y))
    }

    /// Indexer over the grid vertices. A wrapped axis has one vertex per quad,
    /// an open axis one more.
    pub fn vertex_indexer(&self) -> VertexIndexer {
        let width = self.width + usize::from(!self.wrap_x);
        let height = self.height + usize::from(!self.wrap_y);
        VertexIndexer::new(RectIndexer::new(width, height).with_wrap(self.wrap_x, self.wrap_y))
    }

    /// Number of boundary loops: one for a plane, two for a cylinder, none
    /// for a torus.
    pub fn external_face_count(&self) -> usize {
        match (self.wrap_x, self.wrap_y) {
            (false, false) => 1,
            (true, true) => 0,
            _ => 2,
        }
    }

    /// Per-face vertex lists of the grid, faces in row-major order.
    ///
    /// # Errors
    /// `InvalidParameter` for an empty grid or a wrapped axis shorter than
    /// three quads.
    pub fn neighbor_description(&self) -> Result<ManualFaceNeighborIndexer> {
        self.validate()?;

        let faces = self.face_indexer();
        let vertices = self.vertex_indexer();
        let mut description = ManualFaceNeighborIndexer::new(
            vertices.len(),
            QUAD_CORNERS.len() * faces.len(),
            faces.len(),
            self.external_face_count(),
        );

        for index in 0..faces.len() {
            let cell = faces.index_2d(index);
            let corners = QUAD_CORNERS.map(|(dx, dy)| cell + Vector2::new(dx, dy));
            let ids = corners.map(|c| vertices.wrapped_index_1d(c));

            let mut wraps = [EdgeWrap::empty(); 4];
            for (k, wrap) in wraps.iter_mut().enumerate() {
                let (ax, ay) = vertices.seam_offset(corners[k]);
                let (bx, by) = vertices.seam_offset(corners[(k + 1) % 4]);
                *wrap = EdgeWrap::from_offset(bx - ax, by - ay).ok_or_else(|| {
                    TopologyError::InvalidState(format!("quad {:?} spans several seams", cell))
                })?;
            }

            description.add_face_with_wraps(&ids, &wraps)?;
        }

        Ok(description)
    }

    /// Build the half-edge mesh of the grid.
    pub fn build_mesh<I: MeshIndex>(&self) -> Result<HalfEdgeMesh<I>> {
        build_from_face_neighbors(&self.neighbor_description()?)
    }

    /// Vertex positions on the `z = 0` plane, `cell_size` apart, in vertex
    /// index order.
    pub fn positions(&self, cell_size: f64) -> Vec<Point3<f64>> {
        let vertices = self.vertex_indexer();
        (0..vertices.len())
            .map(|i| {
                let p: Point2<i32> = vertices.index_2d(i);
                Point3::new(p.x as f64 * cell_size, p.y as f64 * cell_size, 0.0)
            })
            .collect()
    }

    /// Seam translations matching [`positions`](Self::positions).
    pub fn wrap_offsets(&self, cell_size: f64) -> WrapOffsets {
        let axis = |wraps: bool, cells: usize, dir: Vector3<f64>| {
            if wraps {
                dir * (cells as f64 * cell_size)
            } else {
                Vector3::zeros()
            }
        };
        WrapOffsets::new(
            axis(self.wrap_x, self.width, Vector3::x()),
            axis(self.wrap_y, self.height, Vector3::y()),
        )
    }

    fn validate(&self) -> Result<()> {
        for (name, cells, wraps) in [
            ("width", self.width, self.wrap_x),
            ("height", self.height, self.wrap_y),
        ] {
            if cells == 0 {
                return Err(TopologyError::invalid_param(name, cells, "must be positive"));
            }
            if wraps && cells < 3 {
                return Err(TopologyError::invalid_param(
                    name,
                    cells,
                    "a wrapped axis needs at least 3 quads",
                ));
            }
        }
        Ok(())
    }
}
