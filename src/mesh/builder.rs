//! Mesh construction.
//!
//! Turns a [`FaceNeighborIndexer`] description into a fully linked
//! [`HalfEdgeMesh`]: twins paired, open boundaries closed with external faces
//! and every vertex given a canonical outgoing half-edge.

use std::collections::HashMap;

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh, Vertex};
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use super::neighbors::FaceNeighborIndexer;
use super::wrap::EdgeWrap;
use crate::error::{Result, TopologyError};

/// Build a half-edge mesh from a face neighbor description.
///
/// # Arguments
/// * `neighbors` - Per-face boundary vertices and edge wraps
///
/// # Returns
/// A fully linked mesh, or an error if the description does not form a
/// manifold. No partially built mesh is ever returned.
///
/// # Example
/// ```
/// use tessera::mesh::{build_from_face_neighbors, HalfEdgeMesh, ManualFaceNeighborIndexer};
///
/// let mut indexer = ManualFaceNeighborIndexer::new(4, 4, 1, 1);
/// indexer.add_face(&[0, 1, 2, 3]).unwrap();
///
/// let mesh: HalfEdgeMesh = build_from_face_neighbors(&indexer).unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// assert_eq!(mesh.num_external_faces(), 1);
/// ```
pub fn build_from_face_neighbors<I, N>(neighbors: &N) -> Result<HalfEdgeMesh<I>>
where
    I: MeshIndex,
    N: FaceNeighborIndexer + ?Sized,
{
    let vertex_count = neighbors.vertex_count();
    let internal_face_count = neighbors.internal_face_count();

    let mut described_edges = 0;
    for f in 0..internal_face_count {
        let n = neighbors
            .neighbor_count(f)
            .map_err(|_| TopologyError::InvalidState(format!("face {} was never described", f)))?;
        if n < 3 {
            return Err(TopologyError::InvalidArgument(format!(
                "face {} has {} vertices, at least 3 are needed",
                f, n
            )));
        }
        described_edges += n;
    }
    if described_edges != neighbors.edge_count() {
        return Err(TopologyError::InvalidState(format!(
            "faces fill {} of {} edge slots",
            described_edges,
            neighbors.edge_count()
        )));
    }

    let max_elements = (2 * described_edges).max(vertex_count);
    if max_elements > I::capacity() {
        return Err(TopologyError::CapacityExceeded {
            what: "index",
            capacity: I::capacity(),
        });
    }

    let mut mesh = HalfEdgeMesh::<I>::new();
    mesh.vertices = vec![Vertex::default(); vertex_count];
    mesh.halfedges.reserve(2 * described_edges);
    mesh.faces
        .reserve(internal_face_count + neighbors.external_face_count());
    mesh.internal_face_count = internal_face_count;

    // Near vertex of every half-edge, needed until twins are linked.
    let mut near = Vec::with_capacity(2 * described_edges);

    // First pass: create internal half-edges and faces
    for f in 0..internal_face_count {
        let n = neighbors.neighbor_count(f)?;
        let base = mesh.halfedges.len();
        let face_id = FaceId::<I>::new(f);

        for k in 0..n {
            let from = neighbors.neighbor_vertex_index(f, k)?;
            let to = neighbors.neighbor_vertex_index(f, (k + 1) % n)?;
            for v in [from, to] {
                if v >= vertex_count {
                    return Err(TopologyError::out_of_range("vertex", v, vertex_count));
                }
            }

            mesh.halfedges.push(HalfEdge {
                far_vertex: VertexId::new(to),
                twin: HalfEdgeId::invalid(),
                next: HalfEdgeId::new(base + (k + 1) % n),
                prev: HalfEdgeId::new(base + (k + n - 1) % n),
                face: face_id,
                wrap: neighbors.edge_wrap(f, k)?,
            });
            near.push(from);
        }

        mesh.faces.push(Face::new(HalfEdgeId::new(base), n, false));
    }

    // Second pass: link twins
    link_twins(&mut mesh, &near)?;

    // Third pass: close every boundary loop with an external face
    let external_faces = close_boundary_loops(&mut mesh, &mut near)?;
    if external_faces != neighbors.external_face_count() {
        return Err(TopologyError::malformed(format!(
            "expected {} external faces, found {} boundary loops",
            neighbors.external_face_count(),
            external_faces
        )));
    }

    // Fourth pass: canonical vertex half-edges and degrees
    link_vertices(&mut mesh, &near)?;

    log::debug!(
        "built mesh: {} vertices, {} edges, {} internal faces, {} external faces",
        mesh.num_vertices(),
        mesh.num_edges(),
        mesh.num_internal_faces(),
        mesh.num_external_faces()
    );

    Ok(mesh)
}

/// Pair every internal half-edge with the one running the opposite way.
///
/// Half-edges are keyed by `(near, far, wrap)`; on a wrapped tiling two
/// distinct edges may join the same vertex pair across different seams.
fn link_twins<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, near: &[usize]) -> Result<()> {
    let mut edge_map: HashMap<(usize, usize, EdgeWrap), HalfEdgeId<I>> =
        HashMap::with_capacity(mesh.halfedges.len());

    for (i, he) in mesh.halfedges.iter().enumerate() {
        let key = (near[i], he.far_vertex.index(), he.wrap);
        if edge_map.insert(key, HalfEdgeId::new(i)).is_some() {
            return Err(TopologyError::malformed(format!(
                "edge from vertex {} to vertex {} is claimed by more than two faces or is \
                 inconsistently oriented",
                key.0, key.1
            )));
        }
    }

    for i in 0..mesh.halfedges.len() {
        let he = HalfEdgeId::<I>::new(i);
        if mesh.twin(he).is_valid() {
            continue;
        }
        let key = (mesh.far_vertex(he).index(), near[i], mesh.wrap(he).inverse());
        if let Some(&twin) = edge_map.get(&key) {
            if twin == he {
                return Err(TopologyError::malformed(format!(
                    "half-edge at vertex {} is its own twin",
                    near[i]
                )));
            }
            mesh.halfedge_mut(he).twin = twin;
            mesh.halfedge_mut(twin).twin = he;
        }
    }

    Ok(())
}

/// Create the missing twins along the open boundary and group them into
/// external faces. Returns the number of external faces created.
fn close_boundary_loops<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    near: &mut Vec<usize>,
) -> Result<usize> {
    let unmatched: Vec<HalfEdgeId<I>> = mesh
        .halfedge_ids()
        .filter(|&he| !mesh.twin(he).is_valid())
        .collect();

    // Boundary half-edge departing each boundary vertex
    let mut outgoing: HashMap<usize, HalfEdgeId<I>> = HashMap::with_capacity(unmatched.len());
    let first_boundary = mesh.halfedges.len();

    for &inner in &unmatched {
        let boundary = HalfEdgeId::<I>::new(mesh.halfedges.len());
        let inner_edge = *mesh.halfedge(inner);
        let from = inner_edge.far_vertex.index();

        mesh.halfedges.push(HalfEdge {
            far_vertex: VertexId::new(near[inner.index()]),
            twin: inner,
            wrap: inner_edge.wrap.inverse(),
            ..HalfEdge::new()
        });
        near.push(from);
        mesh.halfedge_mut(inner).twin = boundary;

        if outgoing.insert(from, boundary).is_some() {
            return Err(TopologyError::malformed(format!(
                "vertex {} lies on more than one boundary fan",
                from
            )));
        }
    }

    // Link next/prev: the successor departs where this one ends
    for i in first_boundary..mesh.halfedges.len() {
        let he = HalfEdgeId::<I>::new(i);
        let dest = mesh.far_vertex(he).index();
        let next = *outgoing.get(&dest).ok_or_else(|| {
            TopologyError::malformed(format!("boundary does not continue past vertex {}", dest))
        })?;
        mesh.halfedge_mut(he).next = next;
        mesh.halfedge_mut(next).prev = he;
    }

    // Each closed loop becomes one external face
    let boundary_count = mesh.halfedges.len() - first_boundary;
    let mut external_faces = 0;
    for i in first_boundary..mesh.halfedges.len() {
        let start = HalfEdgeId::<I>::new(i);
        if mesh.face_of(start).is_valid() {
            continue;
        }

        let face_id = FaceId::<I>::new(mesh.faces.len());
        let mut he = start;
        let mut count = 0;
        loop {
            if count == boundary_count || mesh.face_of(he).is_valid() {
                return Err(TopologyError::malformed(format!(
                    "boundary loop through vertex {} does not close",
                    near[i]
                )));
            }
            mesh.halfedge_mut(he).face = face_id;
            count += 1;
            he = mesh.next(he);
            if he == start {
                break;
            }
        }

        mesh.faces.push(Face::new(start, count, true));
        external_faces += 1;
    }

    Ok(external_faces)
}

/// Give every vertex a canonical outgoing half-edge and count its degree.
///
/// Boundary vertices point at a half-edge of an external face.
fn link_vertices<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, near: &[usize]) -> Result<()> {
    let mut outgoing_counts = vec![0usize; mesh.vertices.len()];

    for (i, &v) in near.iter().enumerate() {
        let he = HalfEdgeId::<I>::new(i);
        outgoing_counts[v] += 1;
        let current = mesh.vertices[v].halfedge;
        if !current.is_valid() || mesh.is_external_halfedge(he) {
            mesh.vertices[v].halfedge = he;
        }
    }

    for v in 0..mesh.vertices.len() {
        let start = mesh.vertices[v].halfedge;
        if !start.is_valid() {
            return Err(TopologyError::malformed(format!("vertex {} has no edges", v)));
        }

        let mut he = start;
        let mut count = 0;
        loop {
            count += 1;
            he = mesh.rotate(he);
            if he == start || count > outgoing_counts[v] {
                break;
            }
        }

        if count != outgoing_counts[v] {
            return Err(TopologyError::malformed(format!(
                "edges around vertex {} do not form a single closed fan",
                v
            )));
        }
        mesh.vertices[v].neighbor_count = count;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::neighbors::ManualFaceNeighborIndexer;
    use crate::mesh::test_fixtures::{quad_strip, quad_torus, single_quad, triangle_fan};

    fn assert_cycles_close(mesh: &HalfEdgeMesh) {
        for he in mesh.halfedge_ids() {
            assert_eq!(mesh.twin(mesh.twin(he)), he);
        }
        for f in mesh.face_ids() {
            assert_eq!(mesh.face_halfedges(f).count(), mesh.face_neighbor_count(f));
        }
        for v in mesh.vertex_ids() {
            assert_eq!(mesh.vertex_halfedges(v).count(), mesh.vertex_neighbor_count(v));
        }
    }

    #[test]
    fn test_single_quad() {
        let mesh = single_quad();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_internal_faces(), 1);
        assert_eq!(mesh.num_external_faces(), 1);
        // 4 interior half-edges + 4 boundary half-edges
        assert_eq!(mesh.num_halfedges(), 8);
        assert!(mesh.is_valid());

        let external = FaceId::new(1);
        assert!(mesh.is_external_face(external));
        assert_eq!(mesh.face_neighbor_count(external), 4);

        for v in mesh.vertex_ids() {
            assert_eq!(mesh.vertex_neighbor_count(v), 2);
            assert!(mesh.has_external_face_neighbor(v));
            // Canonical half-edge of a boundary vertex is a boundary one.
            assert!(mesh.is_external_halfedge(mesh.vertex(v).halfedge));
        }
        assert_cycles_close(&mesh);
    }

    #[test]
    fn test_external_face_runs_opposite() {
        let mesh = single_quad();
        let external: Vec<usize> = mesh
            .face_vertices(FaceId::new(1))
            .map(|v| v.index())
            .collect();
        // Internal face lists 0,1,2,3; the boundary walks the other way.
        let start = external.iter().position(|&v| v == 0).unwrap();
        let rotated: Vec<usize> = (0..4).map(|k| external[(start + k) % 4]).collect();
        assert_eq!(rotated, vec![0, 3, 2, 1]);
    }

    #[test]
    fn test_quad_strip() {
        let mesh = quad_strip();

        assert_eq!(mesh.num_vertices(), 6);
        assert_eq!(mesh.num_internal_faces(), 2);
        assert_eq!(mesh.num_external_faces(), 1);
        // 8 interior half-edges + 6 boundary half-edges
        assert_eq!(mesh.num_halfedges(), 14);
        assert_eq!(mesh.num_edges(), 7);
        assert!(mesh.is_valid());
        assert_eq!(mesh.face_neighbor_count(FaceId::new(2)), 6);
        assert_eq!(mesh.vertex_neighbor_count(VertexId::new(1)), 3);
        assert_cycles_close(&mesh);
    }

    #[test]
    fn test_closed_torus_has_no_external_faces() {
        let mesh = quad_torus(4, 3);

        assert_eq!(mesh.num_vertices(), 12);
        assert_eq!(mesh.num_faces(), 12);
        assert_eq!(mesh.num_external_faces(), 0);
        assert_eq!(mesh.num_edges(), 24);
        assert!(mesh.is_valid());
        for v in mesh.vertex_ids() {
            assert_eq!(mesh.vertex_neighbor_count(v), 4);
            assert!(!mesh.has_external_face_neighbor(v));
        }
        assert_cycles_close(&mesh);
    }

    #[test]
    fn test_fan_center_is_interior() {
        let mesh = triangle_fan(6);
        assert!(mesh.is_valid());
        let center = VertexId::new(0);
        assert_eq!(mesh.vertex_neighbor_count(center), 6);
        assert!(!mesh.has_external_face_neighbor(center));
        assert_eq!(mesh.num_external_faces(), 1);
        assert_eq!(mesh.face_neighbor_count(FaceId::new(6)), 6);
    }

    #[test]
    fn test_edge_shared_by_three_faces() {
        let mut indexer = ManualFaceNeighborIndexer::new(5, 9, 3, 1);
        indexer.add_face(&[0, 1, 2]).unwrap();
        indexer.add_face(&[1, 0, 3]).unwrap();
        indexer.add_face(&[0, 1, 4]).unwrap();

        let result: Result<HalfEdgeMesh> = build_from_face_neighbors(&indexer);
        assert!(matches!(result, Err(TopologyError::MalformedTopology { .. })));
    }

    #[test]
    fn test_pinched_vertex_rejected() {
        // Two triangles touching only at vertex 0.
        let mut indexer = ManualFaceNeighborIndexer::new(5, 6, 2, 2);
        indexer.add_face(&[0, 1, 2]).unwrap();
        indexer.add_face(&[0, 3, 4]).unwrap();

        let result: Result<HalfEdgeMesh> = build_from_face_neighbors(&indexer);
        assert!(matches!(result, Err(TopologyError::MalformedTopology { .. })));
    }

    #[test]
    fn test_unused_vertex_rejected() {
        let mut indexer = ManualFaceNeighborIndexer::new(4, 3, 1, 1);
        indexer.add_face(&[0, 1, 2]).unwrap();

        let result: Result<HalfEdgeMesh> = build_from_face_neighbors(&indexer);
        assert!(matches!(result, Err(TopologyError::MalformedTopology { .. })));
    }

    #[test]
    fn test_wrong_external_face_count() {
        let mut indexer = ManualFaceNeighborIndexer::new(3, 3, 1, 0);
        indexer.add_face(&[0, 1, 2]).unwrap();

        let result: Result<HalfEdgeMesh> = build_from_face_neighbors(&indexer);
        assert!(matches!(result, Err(TopologyError::MalformedTopology { .. })));
    }

    #[test]
    fn test_incomplete_description() {
        let mut indexer = ManualFaceNeighborIndexer::new(4, 7, 2, 1);
        indexer.add_face(&[0, 1, 2]).unwrap();

        let result: Result<HalfEdgeMesh> = build_from_face_neighbors(&indexer);
        assert!(matches!(result, Err(TopologyError::InvalidState(_))));
    }

    /// A provider that skips the checks of the manual builder.
    struct RawFaces {
        vertex_count: usize,
        faces: Vec<Vec<usize>>,
        external_face_count: usize,
    }

    impl FaceNeighborIndexer for RawFaces {
        fn vertex_count(&self) -> usize {
            self.vertex_count
        }

        fn edge_count(&self) -> usize {
            self.faces.iter().map(Vec::len).sum()
        }

        fn internal_face_count(&self) -> usize {
            self.faces.len()
        }

        fn external_face_count(&self) -> usize {
            self.external_face_count
        }

        fn neighbor_count(&self, face: usize) -> Result<usize> {
            self.faces
                .get(face)
                .map(Vec::len)
                .ok_or_else(|| TopologyError::out_of_range("face", face, self.faces.len()))
        }

        fn neighbor_vertex_index(&self, face: usize, neighbor: usize) -> Result<usize> {
            Ok(self.faces[face][neighbor])
        }

        fn edge_wrap(&self, _face: usize, _neighbor: usize) -> Result<EdgeWrap> {
            Ok(EdgeWrap::empty())
        }
    }

    #[test]
    fn test_custom_provider() {
        let provider = RawFaces {
            vertex_count: 4,
            faces: vec![vec![0, 1, 2, 3]],
            external_face_count: 1,
        };
        let mesh: HalfEdgeMesh = build_from_face_neighbors(&provider).unwrap();
        assert_eq!(mesh.num_faces(), 2);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_two_sided_face_from_custom_provider() {
        let provider = RawFaces {
            vertex_count: 2,
            faces: vec![vec![0, 1]],
            external_face_count: 0,
        };
        let result: Result<HalfEdgeMesh> = build_from_face_neighbors(&provider);
        assert!(matches!(result, Err(TopologyError::InvalidArgument(_))));
    }

    #[test]
    fn test_index_capacity() {
        // 3 vertices fit in u16, but a description asking for more half-edges
        // than u16 can address must be refused up front.
        let faces = 40_000;
        let mut indexer = ManualFaceNeighborIndexer::new(3, 3 * faces, faces, 0);
        for _ in 0..faces {
            indexer.add_face(&[0, 1, 2]).unwrap();
        }
        let result: Result<HalfEdgeMesh<u16>> = build_from_face_neighbors(&indexer);
        assert!(matches!(result, Err(TopologyError::CapacityExceeded { .. })));
    }

    #[test]
    fn test_wrapped_twins_pair_across_seam() {
        // A 3-wide ring of quads wrapping along X (a cylinder).
        let mut indexer = ManualFaceNeighborIndexer::new(6, 12, 3, 2);
        for x in 0..3 {
            let x1 = (x + 1) % 3;
            let crossing = if x == 2 { EdgeWrap::POS_X } else { EdgeWrap::empty() };
            indexer
                .add_face_with_wraps(
                    &[x, x1, x1 + 3, x + 3],
                    &[crossing, EdgeWrap::empty(), crossing.inverse(), EdgeWrap::empty()],
                )
                .unwrap();
        }
        let mesh: HalfEdgeMesh = build_from_face_neighbors(&indexer).unwrap();

        assert!(mesh.is_valid());
        assert_eq!(mesh.num_external_faces(), 2);
        for f in mesh.external_face_ids() {
            assert_eq!(mesh.face_neighbor_count(f), 3);
        }
        let seam = mesh.find_halfedge(VertexId::new(2), VertexId::new(0)).unwrap();
        assert_eq!(mesh.wrap(seam), EdgeWrap::POS_X);
        assert_eq!(mesh.wrap(mesh.twin(seam)), EdgeWrap::NEG_X);
    }
}
