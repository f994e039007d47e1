//! Core topology data structures.
//!
//! This module provides the half-edge representation of a polygonal tiling,
//! its construction from per-face vertex lists, and the edge spin operations
//! that mutate it in place.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`]. Every edge is stored as two
//! half-edges, every half-edge belongs to exactly one face, and open
//! boundaries are closed by external faces, so face and vertex cycles are
//! always well defined.
//!
//! # Handles
//!
//! Mesh elements are identified by type-safe handles:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//!
//! Handles are generic over the underlying integer type ([`MeshIndex`] trait).
//!
//! # Construction
//!
//! ```
//! use tessera::mesh::{build_from_face_neighbors, HalfEdgeMesh, ManualFaceNeighborIndexer};
//!
//! let mut indexer = ManualFaceNeighborIndexer::new(3, 3, 1, 1);
//! indexer.add_face(&[0, 1, 2]).unwrap();
//!
//! let mesh: HalfEdgeMesh = build_from_face_neighbors(&indexer).unwrap();
//! assert_eq!(mesh.num_internal_faces(), 1);
//! ```

mod builder;
mod group;
mod halfedge;
mod index;
mod neighbors;
mod spin;
mod wrap;

pub use builder::build_from_face_neighbors;
pub use group::FaceGroup;
pub use halfedge::{Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter};
pub use index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
pub use neighbors::{FaceNeighborIndexer, ManualFaceNeighborIndexer};
pub use wrap::EdgeWrap;
