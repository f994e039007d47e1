//! Half-edge topology store.
//!
//! This module provides the half-edge (doubly-connected edge list)
//! representation of a polygonal tiling. The store owns three parallel arrays
//! of plain records; every cross reference between them is a handle.
//!
//! # Structure
//!
//! - Each edge is split into two **half-edges** pointing in opposite directions
//! - Each half-edge knows its **twin**, its **next** and **prev** half-edges
//!   around its face, the **far vertex** it points to and its **face**
//! - The near vertex of a half-edge is the far vertex of its twin
//! - Each vertex stores one outgoing half-edge, each face one bounding half-edge
//!
//! # External Faces
//!
//! Every half-edge belongs to a face. Where the tiling has an open boundary,
//! construction closes it with synthetic **external** faces, so that walking
//! `next` always yields a closed cycle. Internal faces are numbered first;
//! external faces follow them.

use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use super::wrap::EdgeWrap;
use crate::error::{Result, TopologyError};

/// A vertex of the tiling.
#[derive(Debug, Clone, Copy)]
pub struct Vertex<I: MeshIndex = u32> {
    /// One outgoing half-edge from this vertex.
    /// For boundary vertices, this is an edge of an external face.
    pub halfedge: HalfEdgeId<I>,

    /// Number of edges incident to this vertex.
    pub neighbor_count: usize,
}

impl<I: MeshIndex> Default for Vertex<I> {
    fn default() -> Self {
        Self {
            halfedge: HalfEdgeId::invalid(),
            neighbor_count: 0,
        }
    }
}

/// A half-edge of the tiling.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge points to.
    pub far_vertex: VertexId<I>,

    /// The opposite half-edge.
    pub twin: HalfEdgeId<I>,

    /// The next half-edge around the face.
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face.
    /// Redundant with `next`, kept so spins stay local.
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge bounds.
    pub face: FaceId<I>,

    /// Seam crossings from the near vertex to the far vertex.
    pub wrap: EdgeWrap,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new unlinked half-edge.
    pub fn new() -> Self {
        Self {
            far_vertex: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
            wrap: EdgeWrap::empty(),
        }
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A face of the tiling.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId<I>,

    /// Number of edges bounding this face.
    pub neighbor_count: usize,

    /// Whether this face stands in for an open boundary of the tiling.
    pub is_external: bool,
}

impl<I: MeshIndex> Face<I> {
    /// Create a face from one of its half-edges.
    pub fn new(halfedge: HalfEdgeId<I>, neighbor_count: usize, is_external: bool) -> Self {
        Self {
            halfedge,
            neighbor_count,
            is_external,
        }
    }
}

/// A half-edge tiling topology.
///
/// Built once by [`build_from_face_neighbors`](super::build_from_face_neighbors)
/// and afterwards only mutated in place by the edge spin operations, all of
/// which preserve the invariants checked by [`HalfEdgeMesh::validate`].
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    /// All vertices in the mesh.
    pub(crate) vertices: Vec<Vertex<I>>,

    /// All half-edges in the mesh.
    pub(crate) halfedges: Vec<HalfEdge<I>>,

    /// Internal faces followed by external faces.
    pub(crate) faces: Vec<Face<I>>,

    /// Number of leading faces that are internal.
    pub(crate) internal_face_count: usize,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            faces: Vec::new(),
            internal_face_count: 0,
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of undirected edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.halfedges.len() / 2
    }

    /// Get the number of faces, internal and external.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of internal faces.
    #[inline]
    pub fn num_internal_faces(&self) -> usize {
        self.internal_face_count
    }

    /// Get the number of external faces.
    #[inline]
    pub fn num_external_faces(&self) -> usize {
        self.faces.len() - self.internal_face_count
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by ID.
    #[inline]
    pub(crate) fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// Get a mutable half-edge by ID.
    #[inline]
    pub(crate) fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get a mutable face by ID.
    #[inline]
    pub(crate) fn face_mut(&mut self, id: FaceId<I>) -> &mut Face<I> {
        &mut self.faces[id.index()]
    }

    /// Get a vertex, failing with `OutOfRange` for a bad handle.
    pub fn get_vertex(&self, id: VertexId<I>) -> Result<&Vertex<I>> {
        self.vertices
            .get(id.index())
            .ok_or_else(|| TopologyError::out_of_range("vertex", id.index(), self.vertices.len()))
    }

    /// Get a half-edge, failing with `OutOfRange` for a bad handle.
    pub fn get_halfedge(&self, id: HalfEdgeId<I>) -> Result<&HalfEdge<I>> {
        self.halfedges.get(id.index()).ok_or_else(|| {
            TopologyError::out_of_range("half-edge", id.index(), self.halfedges.len())
        })
    }

    /// Get a face, failing with `OutOfRange` for a bad handle.
    pub fn get_face(&self, id: FaceId<I>) -> Result<&Face<I>> {
        self.faces
            .get(id.index())
            .ok_or_else(|| TopologyError::out_of_range("face", id.index(), self.faces.len()))
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the next outgoing half-edge around the near vertex of `he`.
    #[inline]
    pub fn rotate(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.next(self.twin(he))
    }

    /// Get the vertex a half-edge points to.
    #[inline]
    pub fn far_vertex(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).far_vertex
    }

    /// Get the vertex a half-edge departs from.
    #[inline]
    pub fn near_vertex(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.far_vertex(self.twin(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Get the seam crossings of a half-edge.
    #[inline]
    pub fn wrap(&self, he: HalfEdgeId<I>) -> EdgeWrap {
        self.halfedge(he).wrap
    }

    /// Number of edges incident to a vertex.
    #[inline]
    pub fn vertex_neighbor_count(&self, v: VertexId<I>) -> usize {
        self.vertex(v).neighbor_count
    }

    /// Number of edges bounding a face.
    #[inline]
    pub fn face_neighbor_count(&self, f: FaceId<I>) -> usize {
        self.face(f).neighbor_count
    }

    /// Check if a face is external.
    #[inline]
    pub fn is_external_face(&self, f: FaceId<I>) -> bool {
        self.face(f).is_external
    }

    /// Check if a half-edge bounds an external face.
    #[inline]
    pub fn is_external_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.is_external_face(self.face_of(he))
    }

    /// Check if any face around a vertex is external.
    pub fn has_external_face_neighbor(&self, v: VertexId<I>) -> bool {
        self.vertex_halfedges(v)
            .any(|he| self.is_external_halfedge(he))
    }

    /// Check if either side of an edge is an external face.
    #[inline]
    pub fn is_boundary_edge(&self, he: HalfEdgeId<I>) -> bool {
        self.is_external_halfedge(he) || self.is_external_halfedge(self.twin(he))
    }

    /// Find the half-edge from `from` to `to`, if the two vertices are adjacent.
    pub fn find_halfedge(&self, from: VertexId<I>, to: VertexId<I>) -> Option<HalfEdgeId<I>> {
        self.vertex_halfedges(from)
            .find(|&he| self.far_vertex(he) == to)
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(|i| VertexId::new(i))
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(|i| HalfEdgeId::new(i))
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(|i| FaceId::new(i))
    }

    /// Iterate over internal face IDs.
    pub fn internal_face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.internal_face_count).map(|i| FaceId::new(i))
    }

    /// Iterate over external face IDs.
    pub fn external_face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (self.internal_face_count..self.faces.len()).map(|i| FaceId::new(i))
    }

    /// Iterate over half-edges around a vertex (outgoing half-edges).
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over vertices adjacent to a vertex.
    pub fn vertex_neighbors(&self, v: VertexId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| self.far_vertex(he))
    }

    /// Iterate over faces around a vertex, external ones included.
    pub fn vertex_faces(&self, v: VertexId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| self.face_of(he))
    }

    /// Iterate over half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId<I>) -> FaceHalfEdgeIter<'_, I> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over vertices of a face, in boundary order.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.far_vertex(he))
    }

    /// Iterate over faces across the edges of a face.
    pub fn face_neighbors(&self, f: FaceId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.face_of(self.twin(he)))
    }

    /// Sum of the neighbor counts of all faces. Equals the half-edge count.
    pub fn total_face_degree(&self) -> usize {
        self.faces.iter().map(|f| f.neighbor_count).sum()
    }

    // ==================== Validation ====================

    /// Check if the mesh is valid (all connectivity is consistent).
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check every structural invariant, reporting the first violation.
    ///
    /// Walks are bounded by the half-edge count so a corrupt mesh cannot
    /// loop forever.
    pub fn validate(&self) -> Result<()> {
        let he_count = self.halfedges.len();
        let in_range = |he: HalfEdgeId<I>| he.is_valid() && he.index() < he_count;

        for (i, he) in self.halfedges.iter().enumerate() {
            let id = HalfEdgeId::<I>::new(i);
            if !in_range(he.twin) || !in_range(he.next) || !in_range(he.prev) {
                return Err(TopologyError::malformed(format!("{:?} has an unset link", id)));
            }
            if !he.face.is_valid() || he.face.index() >= self.faces.len() {
                return Err(TopologyError::malformed(format!("{:?} has no face", id)));
            }
            if !he.far_vertex.is_valid() || he.far_vertex.index() >= self.vertices.len() {
                return Err(TopologyError::malformed(format!("{:?} has no far vertex", id)));
            }
        }

        for (i, he) in self.halfedges.iter().enumerate() {
            let id = HalfEdgeId::<I>::new(i);
            if he.twin == id || self.twin(he.twin) != id {
                return Err(TopologyError::malformed(format!(
                    "{:?} and {:?} are not mutual twins",
                    id, he.twin
                )));
            }
            if self.prev(he.next) != id || self.next(he.prev) != id {
                return Err(TopologyError::malformed(format!(
                    "{:?} has inconsistent next/prev links",
                    id
                )));
            }
            if self.wrap(he.twin) != he.wrap.inverse() || !he.wrap.is_well_formed() {
                return Err(TopologyError::malformed(format!(
                    "{:?} and its twin disagree on wrap",
                    id
                )));
            }
            if self.near_vertex(he.next) != he.far_vertex {
                return Err(TopologyError::malformed(format!(
                    "{:?} does not connect to its successor",
                    id
                )));
            }
        }

        for (i, face) in self.faces.iter().enumerate() {
            let fid = FaceId::<I>::new(i);
            if face.is_external != (i >= self.internal_face_count) {
                return Err(TopologyError::malformed(format!(
                    "{:?} has the wrong external flag",
                    fid
                )));
            }
            if !in_range(face.halfedge) {
                return Err(TopologyError::malformed(format!("{:?} has no half-edge", fid)));
            }
            let steps = self.cycle_length(face.halfedge, |he| self.next(he), |he| {
                self.face_of(he) == fid
            });
            if steps != Some(face.neighbor_count) {
                return Err(TopologyError::malformed(format!(
                    "{:?} boundary does not close in {} steps",
                    fid, face.neighbor_count
                )));
            }
            if !face.is_external && face.neighbor_count < 3 {
                return Err(TopologyError::malformed(format!(
                    "{:?} has only {} sides",
                    fid, face.neighbor_count
                )));
            }
        }

        for (i, vertex) in self.vertices.iter().enumerate() {
            let vid = VertexId::<I>::new(i);
            if !in_range(vertex.halfedge) {
                return Err(TopologyError::malformed(format!("{:?} has no half-edge", vid)));
            }
            let steps = self.cycle_length(vertex.halfedge, |he| self.rotate(he), |he| {
                self.near_vertex(he) == vid
            });
            if steps != Some(vertex.neighbor_count) {
                return Err(TopologyError::malformed(format!(
                    "{:?} rotation does not close in {} steps",
                    vid, vertex.neighbor_count
                )));
            }
        }

        let total: usize = self.vertices.iter().map(|v| v.neighbor_count).sum();
        if total != he_count || self.total_face_degree() != he_count {
            return Err(TopologyError::malformed(
                "degree sums do not match the half-edge count",
            ));
        }

        Ok(())
    }

    /// Length of the cycle starting at `start`, or `None` if a step leaves the
    /// element being walked or the walk does not return.
    fn cycle_length(
        &self,
        start: HalfEdgeId<I>,
        step: impl Fn(HalfEdgeId<I>) -> HalfEdgeId<I>,
        belongs: impl Fn(HalfEdgeId<I>) -> bool,
    ) -> Option<usize> {
        let mut he = start;
        for count in 1..=self.halfedges.len() {
            if !belongs(he) {
                return None;
            }
            he = step(he);
            if he == start {
                return Some(count);
            }
        }
        None
    }
}

/// Iterator over half-edges around a vertex.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;

        // If he goes v -> w, twin(he) goes w -> v and the half-edge after it
        // in its face departs from v again.
        self.current = self.mesh.rotate(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, f: FaceId<I>) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}
