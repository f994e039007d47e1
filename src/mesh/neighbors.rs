//! Face neighbor descriptions.
//!
//! A face neighbor description is the minimal input of mesh construction: for
//! every internal face, its boundary vertices in order, plus the seam crossing
//! of each boundary edge. [`FaceNeighborIndexer`] is the provider contract;
//! [`ManualFaceNeighborIndexer`] is a write-once staging buffer implementing it.
//!
//! # Example
//!
//! ```
//! use tessera::mesh::{build_from_face_neighbors, HalfEdgeMesh, ManualFaceNeighborIndexer};
//!
//! // Two quads sharing the edge 1-4.
//! let mut indexer = ManualFaceNeighborIndexer::new(6, 8, 2, 1);
//! indexer.add_face(&[0, 1, 4, 3]).unwrap();
//! indexer.add_face(&[1, 2, 5, 4]).unwrap();
//!
//! let mesh: HalfEdgeMesh = build_from_face_neighbors(&indexer).unwrap();
//! assert_eq!(mesh.num_internal_faces(), 2);
//! assert_eq!(mesh.num_external_faces(), 1);
//! ```

use super::wrap::EdgeWrap;
use crate::error::{Result, TopologyError};

/// Provider of a per-face vertex adjacency description.
///
/// Edge `n` of face `f` runs from neighbor vertex `n` to neighbor vertex
/// `n + 1` (wrapping to 0 after the last).
pub trait FaceNeighborIndexer {
    /// Number of vertices of the tiling.
    fn vertex_count(&self) -> usize;

    /// Number of half-edges bounding internal faces.
    fn edge_count(&self) -> usize;

    /// Number of internal faces.
    fn internal_face_count(&self) -> usize;

    /// Number of external faces construction is expected to synthesize.
    fn external_face_count(&self) -> usize;

    /// Number of boundary vertices of an internal face.
    fn neighbor_count(&self, face: usize) -> Result<usize>;

    /// Vertex index of boundary position `neighbor` of `face`.
    fn neighbor_vertex_index(&self, face: usize, neighbor: usize) -> Result<usize>;

    /// Seam crossing of edge `neighbor` of `face`.
    fn edge_wrap(&self, face: usize, neighbor: usize) -> Result<EdgeWrap>;
}

/// Write-once builder of a face neighbor description.
///
/// Capacities are fixed at construction; faces are appended in order and
/// receive sequential ids.
#[derive(Debug, Clone)]
pub struct ManualFaceNeighborIndexer {
    vertex_count: usize,
    edge_count: usize,
    internal_face_count: usize,
    external_face_count: usize,
    /// Offset of each face's first slot in `vertex_indices`.
    face_offsets: Vec<usize>,
    vertex_indices: Vec<usize>,
    edge_wraps: Vec<EdgeWrap>,
}

impl ManualFaceNeighborIndexer {
    /// Create an empty builder with fixed capacities.
    ///
    /// `edge_count` is the total number of boundary vertices over all
    /// internal faces.
    pub fn new(
        vertex_count: usize,
        edge_count: usize,
        internal_face_count: usize,
        external_face_count: usize,
    ) -> Self {
        Self {
            vertex_count,
            edge_count,
            internal_face_count,
            external_face_count,
            face_offsets: Vec::with_capacity(internal_face_count + 1),
            vertex_indices: Vec::with_capacity(edge_count),
            edge_wraps: Vec::with_capacity(edge_count),
        }
    }

    /// Append a face with no seam crossings.
    pub fn add_face(&mut self, vertices: &[usize]) -> Result<usize> {
        let wraps = vec![EdgeWrap::empty(); vertices.len()];
        self.add_face_with_wraps(vertices, &wraps)
    }

    /// Append a face together with the seam crossing of each of its edges.
    ///
    /// `wraps[k]` belongs to the edge from `vertices[k]` to `vertices[k + 1]`.
    pub fn add_face_with_wraps(&mut self, vertices: &[usize], wraps: &[EdgeWrap]) -> Result<usize> {
        if vertices.len() < 3 {
            return Err(TopologyError::InvalidArgument(format!(
                "a face needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if wraps.len() != vertices.len() {
            return Err(TopologyError::InvalidArgument(format!(
                "{} wraps supplied for {} vertices",
                wraps.len(),
                vertices.len()
            )));
        }
        if self.face_offsets.len() >= self.internal_face_count {
            return Err(TopologyError::CapacityExceeded {
                what: "face",
                capacity: self.internal_face_count,
            });
        }
        if self.vertex_indices.len() + vertices.len() > self.edge_count {
            return Err(TopologyError::CapacityExceeded {
                what: "edge",
                capacity: self.edge_count,
            });
        }
        for (k, &v) in vertices.iter().enumerate() {
            if v >= self.vertex_count {
                return Err(TopologyError::out_of_range("vertex", v, self.vertex_count));
            }
            let w = wraps[k];
            if !w.is_well_formed() {
                return Err(TopologyError::InvalidArgument(format!(
                    "edge {} has contradictory wrap flags {:?}",
                    k, w
                )));
            }
            if v == vertices[(k + 1) % vertices.len()] && w.is_empty() {
                return Err(TopologyError::InvalidArgument(format!(
                    "edge {} connects vertex {} to itself",
                    k, v
                )));
            }
        }

        let id = self.face_offsets.len();
        self.face_offsets.push(self.vertex_indices.len());
        self.vertex_indices.extend_from_slice(vertices);
        self.edge_wraps.extend_from_slice(wraps);
        Ok(id)
    }

    /// Number of faces added so far.
    pub fn face_count(&self) -> usize {
        self.face_offsets.len()
    }

    /// Whether every face and edge slot has been filled.
    pub fn is_complete(&self) -> bool {
        self.face_offsets.len() == self.internal_face_count
            && self.vertex_indices.len() == self.edge_count
    }

    fn slot(&self, face: usize, neighbor: usize) -> Result<usize> {
        let count = self.neighbor_count(face)?;
        if neighbor >= count {
            return Err(TopologyError::out_of_range("neighbor", neighbor, count));
        }
        Ok(self.face_offsets[face] + neighbor)
    }
}

impl FaceNeighborIndexer for ManualFaceNeighborIndexer {
    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn edge_count(&self) -> usize {
        self.edge_count
    }

    fn internal_face_count(&self) -> usize {
        self.internal_face_count
    }

    fn external_face_count(&self) -> usize {
        self.external_face_count
    }

    fn neighbor_count(&self, face: usize) -> Result<usize> {
        if face >= self.face_offsets.len() {
            return Err(TopologyError::out_of_range("face", face, self.face_offsets.len()));
        }
        let end = self
            .face_offsets
            .get(face + 1)
            .copied()
            .unwrap_or(self.vertex_indices.len());
        Ok(end - self.face_offsets[face])
    }

    fn neighbor_vertex_index(&self, face: usize, neighbor: usize) -> Result<usize> {
        Ok(self.vertex_indices[self.slot(face, neighbor)?])
    }

    fn edge_wrap(&self, face: usize, neighbor: usize) -> Result<EdgeWrap> {
        Ok(self.edge_wraps[self.slot(face, neighbor)?])
    }
}
