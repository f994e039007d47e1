//! # Tessera
//!
//! Half-edge topology for polygonal tilings, with in-place edge spins, wrapped
//! 2D grid indexing and stochastic topology randomization.
//!
//! Tessera keeps the topology of a tiling (vertices, edges and faces) in a
//! half-edge structure and mutates it only through spins that preserve a
//! closed manifold. Tilings may wrap around along either grid axis; every
//! half-edge records the seams it crosses, so geometry layers can rebuild
//! continuous coordinates on cylinders and tori.
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) adjacency queries with type-safe indices
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **External faces**: Open boundaries are closed by synthetic faces
//! - **Edge spins**: Vertex-edge and face-edge spins, forward and backward
//! - **Wrapped grids**: Linear/2D index mapping with per-axis wrap-around
//! - **Randomization**: Degree-bounded random spins with a relaxation hook
//!
//! ## Quick Start
//!
//! ```
//! use tessera::prelude::*;
//!
//! // An 8 x 8 torus of quads
//! let mut mesh: HalfEdgeMesh = QuadGrid::new(8, 8).with_wrap(true, true).build_mesh().unwrap();
//! assert_eq!(mesh.num_external_faces(), 0);
//!
//! // Rotate one edge inside its two quads
//! let he = HalfEdgeId::new(0);
//! assert!(mesh.can_spin_edge_forward(he));
//! mesh.spin_edge_forward(he).unwrap();
//! assert!(mesh.is_valid());
//! ```
//!
//! ## Building Tilings Programmatically
//!
//! ```
//! use tessera::prelude::*;
//!
//! // Two quads sharing the edge 1-4
//! let mut indexer = ManualFaceNeighborIndexer::new(6, 8, 2, 1);
//! indexer.add_face(&[0, 1, 4, 3]).unwrap();
//! indexer.add_face(&[1, 2, 5, 4]).unwrap();
//!
//! let mesh: HalfEdgeMesh = build_from_face_neighbors(&indexer).unwrap();
//! assert_eq!(mesh.num_vertices(), 6);
//! assert_eq!(mesh.num_edges(), 7);
//!
//! // The open boundary is one external face of degree 6
//! let outer = FaceId::new(2);
//! assert!(mesh.is_external_face(outer));
//! assert_eq!(mesh.face_neighbor_count(outer), 6);
//! ```
//!
//! ## Mesh Traversal
//!
//! ```
//! use tessera::prelude::*;
//!
//! # let mesh: HalfEdgeMesh = QuadGrid::new(3, 3).build_mesh().unwrap();
//! // Iterate over neighbors of a vertex
//! let v = VertexId::new(5);
//! for neighbor in mesh.vertex_neighbors(v) {
//!     println!("Neighbor: {:?}", neighbor);
//! }
//!
//! // Iterate over faces around a vertex
//! for face in mesh.vertex_faces(v) {
//!     println!("Adjacent face: {:?}", face);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod grid;
pub mod mesh;
pub mod random;
pub mod surface;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::randomize::{
        randomize_topology, randomize_topology_with, RandomizeOptions, RandomizeStats,
    };
    pub use crate::error::{Result, TopologyError};
    pub use crate::grid::{
        FaceIndexer, Indexer2D, OffsetRowIndexer, QuadGrid, RectIndexer, VertexIndexer,
    };
    pub use crate::mesh::{
        build_from_face_neighbors, EdgeWrap, Face, FaceGroup, FaceId, FaceNeighborIndexer, HalfEdge,
        HalfEdgeId, HalfEdgeMesh, ManualFaceNeighborIndexer, MeshIndex, Vertex, VertexId,
    };
    pub use crate::random::RandomSource;
}

// Re-export nalgebra types for convenience
pub use nalgebra;
