//! Edge spin operations.
//!
//! A spin re-routes one edge inside the two faces it separates while keeping
//! the element counts and the manifold structure intact. Two dual flavors are
//! provided, each in a forward and a backward direction:
//!
//! - **Vertex-edge spin** rotates the edge inside the polygon formed by its two
//!   faces. Both endpoints advance one step along that polygon, so the two old
//!   endpoints lose a neighbor and the two new ones gain one. Face degrees are
//!   unchanged.
//! - **Face-edge spin** is the same rotation on the dual tiling. The edge keeps
//!   its endpoints but one edge at each endpoint slides across it, so the two
//!   faces of the edge lose a neighbor and the two faces beyond gain one.
//!   Vertex degrees are unchanged.
//!
//! Backward undoes forward. All checks happen before the first edit, so a
//! refused spin leaves the mesh untouched.
//!
//! For a half-edge `e` (a→b) on face F with twin `t` (b→a) on face G, the
//! notation below is `ne = next(e)` (b→c), `pe = prev(e)` (x→a),
//! `nt = next(t)` (a→d) and `pt = prev(t)` (y→b).

use super::halfedge::HalfEdgeMesh;
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use super::wrap::EdgeWrap;
use crate::error::{Result, TopologyError};

/// Smallest degree a face or vertex may be left with by a spin.
const MIN_DEGREE: usize = 3;

/// The half-edges around an edge that a spin touches.
#[derive(Debug, Clone, Copy)]
struct EdgeRing<I: MeshIndex> {
    e: HalfEdgeId<I>,
    t: HalfEdgeId<I>,
    ne: HalfEdgeId<I>,
    pe: HalfEdgeId<I>,
    nt: HalfEdgeId<I>,
    pt: HalfEdgeId<I>,
}

/// Which way an edge is spun.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// A checked vertex-edge spin, ready to apply.
#[derive(Debug, Clone, Copy)]
struct VertexSpin<I: MeshIndex> {
    ring: EdgeRing<I>,
    direction: Direction,
    losing: [VertexId<I>; 2],
    gaining: [VertexId<I>; 2],
    wrap: EdgeWrap,
}

/// A checked face-edge spin, ready to apply.
#[derive(Debug, Clone, Copy)]
struct FaceSpin<I: MeshIndex> {
    ring: EdgeRing<I>,
    direction: Direction,
    losing: [FaceId<I>; 2],
    gaining: [FaceId<I>; 2],
    /// Re-rooted half-edges and their new wraps.
    moved: [(HalfEdgeId<I>, EdgeWrap); 2],
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    // ==================== Legality ====================

    /// Check whether [`spin_edge_forward`](Self::spin_edge_forward) would succeed.
    pub fn can_spin_edge_forward(&self, he: HalfEdgeId<I>) -> bool {
        self.plan_vertex_spin(he, Direction::Forward).is_ok()
    }

    /// Check whether [`spin_edge_backward`](Self::spin_edge_backward) would succeed.
    pub fn can_spin_edge_backward(&self, he: HalfEdgeId<I>) -> bool {
        self.plan_vertex_spin(he, Direction::Backward).is_ok()
    }

    /// Check whether [`spin_face_edge_forward`](Self::spin_face_edge_forward) would succeed.
    pub fn can_spin_face_edge_forward(&self, he: HalfEdgeId<I>) -> bool {
        self.plan_face_spin(he, Direction::Forward).is_ok()
    }

    /// Check whether [`spin_face_edge_backward`](Self::spin_face_edge_backward) would succeed.
    pub fn can_spin_face_edge_backward(&self, he: HalfEdgeId<I>) -> bool {
        self.plan_face_spin(he, Direction::Backward).is_ok()
    }

    /// Vertices whose degree a forward vertex-edge spin of `he` changes:
    /// the endpoints that lose a neighbor, then the vertices that gain one.
    pub fn vertex_spin_forward_neighbors(
        &self,
        he: HalfEdgeId<I>,
    ) -> ([VertexId<I>; 2], [VertexId<I>; 2]) {
        let t = self.twin(he);
        (
            [self.near_vertex(he), self.far_vertex(he)],
            [self.far_vertex(self.next(he)), self.far_vertex(self.next(t))],
        )
    }

    /// Faces whose degree a forward face-edge spin of `he` changes:
    /// the faces of the edge, then the faces beyond its successors.
    pub fn face_spin_forward_neighbors(&self, he: HalfEdgeId<I>) -> ([FaceId<I>; 2], [FaceId<I>; 2]) {
        let t = self.twin(he);
        (
            [self.face_of(he), self.face_of(t)],
            [
                self.face_of(self.twin(self.next(he))),
                self.face_of(self.twin(self.next(t))),
            ],
        )
    }

    // ==================== Vertex-edge spin ====================

    /// Rotate an edge forward inside its two faces.
    ///
    /// The half-edge `a→b` becomes `d→c`, where `c = far(next(e))` and
    /// `d = far(next(twin(e)))`. `a` and `b` lose a neighbor, `c` and `d`
    /// gain one.
    ///
    /// # Errors
    /// `OutOfRange` for a bad handle, `InvalidOperation` if the spin is not
    /// legal. The mesh is unchanged on error.
    pub fn spin_edge_forward(&mut self, he: HalfEdgeId<I>) -> Result<()> {
        self.check_halfedge(he)?;
        let plan = self
            .plan_vertex_spin(he, Direction::Forward)
            .map_err(|reason| spin_error("forward", he, reason))?;
        self.apply_vertex_spin(plan);
        Ok(())
    }

    /// Rotate an edge backward inside its two faces, undoing
    /// [`spin_edge_forward`](Self::spin_edge_forward).
    ///
    /// The half-edge `a→b` becomes `x→y`, where `x = near(prev(e))` and
    /// `y = near(prev(twin(e)))`.
    pub fn spin_edge_backward(&mut self, he: HalfEdgeId<I>) -> Result<()> {
        self.check_halfedge(he)?;
        let plan = self
            .plan_vertex_spin(he, Direction::Backward)
            .map_err(|reason| spin_error("backward", he, reason))?;
        self.apply_vertex_spin(plan);
        Ok(())
    }

    fn plan_vertex_spin(
        &self,
        he: HalfEdgeId<I>,
        direction: Direction,
    ) -> std::result::Result<VertexSpin<I>, &'static str> {
        let ring = self.edge_ring(he)?;
        let EdgeRing { e, t, ne, pe, nt, pt } = ring;

        let losing = [self.near_vertex(e), self.far_vertex(e)];
        let (gaining, path) = match direction {
            // d→a, a→b, b→c
            Direction::Forward => (
                [self.far_vertex(nt), self.far_vertex(ne)],
                [self.wrap(nt).inverse(), self.wrap(e), self.wrap(ne)],
            ),
            // x→a, a→b, b→y
            Direction::Backward => (
                [self.near_vertex(pe), self.near_vertex(pt)],
                [self.wrap(pe), self.wrap(e), self.wrap(pt).inverse()],
            ),
        };

        if self.face_of(e) == self.face_of(t) {
            return Err("both sides of the edge are the same face");
        }
        if losing[0] == losing[1] || gaining[0] == gaining[1] {
            return Err("the edge would connect a vertex to itself");
        }
        if gaining.iter().any(|g| losing.contains(g)) {
            return Err("the rotated edge would share an endpoint with the original");
        }
        if losing
            .iter()
            .any(|&v| self.vertex_neighbor_count(v) <= MIN_DEGREE)
        {
            return Err("an endpoint would drop below three neighbors");
        }
        if gaining
            .iter()
            .any(|&v| self.vertex_neighbor_count(v) < MIN_DEGREE)
        {
            return Err("a new endpoint has fewer than three neighbors");
        }
        if [e, t]
            .iter()
            .any(|&h| self.face_neighbor_count(self.face_of(h)) < MIN_DEGREE)
        {
            return Err("an adjacent face has fewer than three sides");
        }

        let wrap = compose_path(&path).ok_or("the rotated edge would cross a seam twice")?;

        Ok(VertexSpin {
            ring,
            direction,
            losing,
            gaining,
            wrap,
        })
    }

    fn apply_vertex_spin(&mut self, plan: VertexSpin<I>) {
        let EdgeRing { e, t, ne, pe, nt, pt } = plan.ring;
        let f = self.face_of(e);
        let g = self.face_of(t);

        match plan.direction {
            Direction::Forward => {
                let nne = self.next(ne);
                let nnt = self.next(nt);
                self.link(pe, nt);
                self.link(nt, e);
                self.link(e, nne);
                self.link(pt, ne);
                self.link(ne, t);
                self.link(t, nnt);
                self.halfedge_mut(nt).face = f;
                self.halfedge_mut(ne).face = g;
                self.replace_face_halfedge(f, ne, e);
                self.replace_face_halfedge(g, nt, t);
            }
            Direction::Backward => {
                let ppe = self.prev(pe);
                let ppt = self.prev(pt);
                self.link(ppe, e);
                self.link(e, pt);
                self.link(pt, ne);
                self.link(ppt, t);
                self.link(t, pe);
                self.link(pe, nt);
                self.halfedge_mut(pt).face = f;
                self.halfedge_mut(pe).face = g;
                self.replace_face_halfedge(f, pe, e);
                self.replace_face_halfedge(g, pt, t);
            }
        }

        let [a, b] = plan.losing;
        // gaining[0] becomes the near vertex, gaining[1] the far vertex
        let [near, far] = plan.gaining;
        self.halfedge_mut(e).far_vertex = far;
        self.halfedge_mut(t).far_vertex = near;
        self.halfedge_mut(e).wrap = plan.wrap;
        self.halfedge_mut(t).wrap = plan.wrap.inverse();

        self.replace_vertex_halfedge(a, e, nt);
        self.replace_vertex_halfedge(b, t, ne);
        self.vertex_mut(a).neighbor_count -= 1;
        self.vertex_mut(b).neighbor_count -= 1;
        self.vertex_mut(near).neighbor_count += 1;
        self.vertex_mut(far).neighbor_count += 1;
    }

    // ==================== Face-edge spin ====================

    /// Spin an edge forward on the dual tiling.
    ///
    /// `next(e)` is re-rooted from `b` to `a` and `next(twin(e))` from `a` to
    /// `b`; the edge leaves its two faces and separates the two faces beyond
    /// those half-edges instead. The faces of the edge lose a neighbor, the
    /// faces beyond gain one.
    ///
    /// # Errors
    /// `OutOfRange` for a bad handle, `InvalidOperation` if the spin is not
    /// legal. The mesh is unchanged on error.
    pub fn spin_face_edge_forward(&mut self, he: HalfEdgeId<I>) -> Result<()> {
        self.check_halfedge(he)?;
        let plan = self
            .plan_face_spin(he, Direction::Forward)
            .map_err(|reason| spin_error("face forward", he, reason))?;
        self.apply_face_spin(plan);
        Ok(())
    }

    /// Spin an edge backward on the dual tiling, undoing
    /// [`spin_face_edge_forward`](Self::spin_face_edge_forward).
    pub fn spin_face_edge_backward(&mut self, he: HalfEdgeId<I>) -> Result<()> {
        self.check_halfedge(he)?;
        let plan = self
            .plan_face_spin(he, Direction::Backward)
            .map_err(|reason| spin_error("face backward", he, reason))?;
        self.apply_face_spin(plan);
        Ok(())
    }

    fn plan_face_spin(
        &self,
        he: HalfEdgeId<I>,
        direction: Direction,
    ) -> std::result::Result<FaceSpin<I>, &'static str> {
        let ring = self.edge_ring(he)?;
        let EdgeRing { e, t, ne, pe, nt, pt } = ring;

        let losing = [self.face_of(e), self.face_of(t)];
        let (slid, path) = match direction {
            // a→b then b→c; b→a then a→d
            Direction::Forward => ([ne, nt], [(e, ne), (t, nt)]),
            // x→a then a→b; y→b then b→a
            Direction::Backward => ([pe, pt], [(pe, e), (pt, t)]),
        };
        let gaining = [
            self.face_of(self.twin(slid[0])),
            self.face_of(self.twin(slid[1])),
        ];

        if losing[0] == losing[1] {
            return Err("both sides of the edge are the same face");
        }
        if gaining[0] == gaining[1] {
            return Err("the spun edge would separate a face from itself");
        }
        if gaining.iter().any(|g| losing.contains(g)) {
            return Err("a face would both lose and gain a side");
        }
        if losing
            .iter()
            .any(|&f| self.face_neighbor_count(f) <= MIN_DEGREE)
        {
            return Err("a face would drop below three sides");
        }
        if gaining
            .iter()
            .any(|&f| self.face_neighbor_count(f) < MIN_DEGREE)
        {
            return Err("a face beyond the edge has fewer than three sides");
        }
        let (a, b) = (self.near_vertex(e), self.far_vertex(e));
        if a == b {
            return Err("the edge connects a vertex to itself");
        }
        if [a, b]
            .iter()
            .any(|&v| self.vertex_neighbor_count(v) < MIN_DEGREE)
        {
            return Err("an endpoint has fewer than three neighbors");
        }

        let mut moved = [(slid[0], EdgeWrap::empty()); 2];
        for (k, &(first, second)) in path.iter().enumerate() {
            let wrap = self
                .wrap(first)
                .compose(self.wrap(second))
                .ok_or("a re-rooted edge would cross a seam twice")?;
            moved[k] = (slid[k], wrap);
        }

        Ok(FaceSpin {
            ring,
            direction,
            losing,
            gaining,
            moved,
        })
    }

    fn apply_face_spin(&mut self, plan: FaceSpin<I>) {
        let EdgeRing { e, t, ne, pe, nt, pt } = plan.ring;
        let a = self.near_vertex(e);
        let b = self.far_vertex(e);
        let [f, g] = plan.losing;
        let [h, k] = plan.gaining;

        match plan.direction {
            Direction::Forward => {
                let (ne_twin, nt_twin) = (self.twin(ne), self.twin(nt));
                let nn = self.next(ne_twin);
                let mm = self.next(nt_twin);
                self.link(pe, ne);
                self.link(pt, nt);
                self.link(ne_twin, e);
                self.link(e, nn);
                self.link(nt_twin, t);
                self.link(t, mm);
                // ne now departs a, nt departs b
                self.halfedge_mut(ne_twin).far_vertex = a;
                self.halfedge_mut(nt_twin).far_vertex = b;
                self.replace_face_halfedge(f, e, ne);
                self.replace_face_halfedge(g, t, nt);
                self.replace_vertex_halfedge(a, nt, e);
                self.replace_vertex_halfedge(b, ne, t);
            }
            Direction::Backward => {
                let (pe_twin, pt_twin) = (self.twin(pe), self.twin(pt));
                let pp = self.prev(pe_twin);
                let qq = self.prev(pt_twin);
                self.link(pe, ne);
                self.link(pt, nt);
                self.link(pp, e);
                self.link(e, pe_twin);
                self.link(qq, t);
                self.link(t, pt_twin);
                // pe now ends at b, pt ends at a
                self.halfedge_mut(pe).far_vertex = b;
                self.halfedge_mut(pt).far_vertex = a;
                self.replace_face_halfedge(f, e, ne);
                self.replace_face_halfedge(g, t, nt);
                self.replace_vertex_halfedge(a, pe_twin, e);
                self.replace_vertex_halfedge(b, pt_twin, t);
            }
        }

        for (moved, wrap) in plan.moved {
            self.halfedge_mut(moved).wrap = wrap;
            let twin = self.twin(moved);
            self.halfedge_mut(twin).wrap = wrap.inverse();
        }

        self.halfedge_mut(e).face = h;
        self.halfedge_mut(t).face = k;
        self.face_mut(f).neighbor_count -= 1;
        self.face_mut(g).neighbor_count -= 1;
        self.face_mut(h).neighbor_count += 1;
        self.face_mut(k).neighbor_count += 1;
    }

    // ==================== Helpers ====================

    fn check_halfedge(&self, he: HalfEdgeId<I>) -> Result<()> {
        self.get_halfedge(he).map(|_| ())
    }

    fn edge_ring(&self, e: HalfEdgeId<I>) -> std::result::Result<EdgeRing<I>, &'static str> {
        if !e.is_valid() || e.index() >= self.num_halfedges() {
            return Err("half-edge out of range");
        }
        let t = self.twin(e);
        Ok(EdgeRing {
            e,
            t,
            ne: self.next(e),
            pe: self.prev(e),
            nt: self.next(t),
            pt: self.prev(t),
        })
    }

    /// Make `b` follow `a` around their face.
    #[inline]
    fn link(&mut self, a: HalfEdgeId<I>, b: HalfEdgeId<I>) {
        self.halfedge_mut(a).next = b;
        self.halfedge_mut(b).prev = a;
    }

    fn replace_face_halfedge(&mut self, f: FaceId<I>, old: HalfEdgeId<I>, new: HalfEdgeId<I>) {
        let face = self.face_mut(f);
        if face.halfedge == old {
            face.halfedge = new;
        }
    }

    fn replace_vertex_halfedge(&mut self, v: VertexId<I>, old: HalfEdgeId<I>, new: HalfEdgeId<I>) {
        let vertex = self.vertex_mut(v);
        if vertex.halfedge == old {
            vertex.halfedge = new;
        }
    }
}

/// Net seam crossing of a path. Only the total has to be representable;
/// intermediate sums may leave `-1..=1`.
fn compose_path(path: &[EdgeWrap]) -> Option<EdgeWrap> {
    let (dx, dy) = path
        .iter()
        .fold((0, 0), |(dx, dy), w| (dx + w.dx(), dy + w.dy()));
    EdgeWrap::from_offset(dx, dy)
}

fn spin_error<I: MeshIndex>(kind: &str, he: HalfEdgeId<I>, reason: &str) -> TopologyError {
    TopologyError::InvalidOperation(format!("cannot spin {:?} {}: {}", he, kind, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::randomize::{randomize_topology, RandomizeOptions};
    use crate::grid::QuadGrid;
    use crate::mesh::test_fixtures::{quad_grid, quad_torus, single_quad, triangle_fan};

    /// Topology of a mesh with canonical half-edge choices left out.
    #[derive(Debug, PartialEq)]
    struct Snapshot {
        halfedges: Vec<(usize, usize, usize, usize, usize, EdgeWrap)>,
        vertex_degrees: Vec<usize>,
        face_degrees: Vec<usize>,
    }

    fn snapshot(mesh: &HalfEdgeMesh) -> Snapshot {
        Snapshot {
            halfedges: mesh
                .halfedge_ids()
                .map(|he| {
                    let h = mesh.halfedge(he);
                    (
                        h.far_vertex.index(),
                        h.twin.index(),
                        h.next.index(),
                        h.prev.index(),
                        h.face.index(),
                        h.wrap,
                    )
                })
                .collect(),
            vertex_degrees: mesh
                .vertex_ids()
                .map(|v| mesh.vertex_neighbor_count(v))
                .collect(),
            face_degrees: mesh.face_ids().map(|f| mesh.face_neighbor_count(f)).collect(),
        }
    }

    fn assert_counts_preserved(before: &HalfEdgeMesh, after: &HalfEdgeMesh) {
        assert_eq!(before.num_vertices(), after.num_vertices());
        assert_eq!(before.num_edges(), after.num_edges());
        assert_eq!(before.num_faces(), after.num_faces());
        assert_eq!(after.total_face_degree(), 2 * after.num_edges());
    }

    #[test]
    fn test_vertex_spin_forward_on_torus() {
        let mut mesh = quad_torus(4, 4);
        let original = mesh.clone();
        let he = HalfEdgeId::new(0);

        let (losing, gaining) = mesh.vertex_spin_forward_neighbors(he);
        let (f, g) = (mesh.face_of(he), mesh.face_of(mesh.twin(he)));
        assert!(mesh.can_spin_edge_forward(he));
        mesh.spin_edge_forward(he).unwrap();

        mesh.validate().unwrap();
        assert_counts_preserved(&original, &mesh);
        for v in losing {
            assert_eq!(mesh.vertex_neighbor_count(v), 3);
        }
        for v in gaining {
            assert_eq!(mesh.vertex_neighbor_count(v), 5);
        }
        // Face degrees are untouched by a vertex-edge spin.
        assert_eq!(mesh.face_neighbor_count(f), 4);
        assert_eq!(mesh.face_neighbor_count(g), 4);
        assert_eq!(mesh.near_vertex(he), gaining[0]);
        assert_eq!(mesh.far_vertex(he), gaining[1]);
    }

    #[test]
    fn test_vertex_spin_forward_then_backward_is_identity() {
        let mut mesh = quad_torus(4, 4);
        let before = snapshot(&mesh);

        for he in mesh.halfedge_ids().collect::<Vec<_>>() {
            assert!(mesh.can_spin_edge_forward(he));
            mesh.spin_edge_forward(he).unwrap();
            assert!(mesh.can_spin_edge_backward(he));
            mesh.spin_edge_backward(he).unwrap();
            mesh.validate().unwrap();
        }

        assert_eq!(snapshot(&mesh), before);
    }

    #[test]
    fn test_vertex_spin_backward_then_forward_is_identity() {
        let mut mesh = quad_torus(3, 5);
        let before = snapshot(&mesh);
        let he = HalfEdgeId::new(7);

        mesh.spin_edge_backward(he).unwrap();
        mesh.validate().unwrap();
        assert!(mesh.can_spin_edge_forward(he));
        mesh.spin_edge_forward(he).unwrap();

        assert_eq!(snapshot(&mesh), before);
    }

    #[test]
    fn test_face_spin_forward_on_torus() {
        let mut mesh = quad_torus(4, 4);
        let original = mesh.clone();
        let he = HalfEdgeId::new(5);

        let (losing, gaining) = mesh.face_spin_forward_neighbors(he);
        let (a, b) = (mesh.near_vertex(he), mesh.far_vertex(he));
        mesh.spin_face_edge_forward(he).unwrap();

        mesh.validate().unwrap();
        assert_counts_preserved(&original, &mesh);
        for f in losing {
            assert_eq!(mesh.face_neighbor_count(f), 3);
        }
        for f in gaining {
            assert_eq!(mesh.face_neighbor_count(f), 5);
        }
        // The edge keeps its endpoints and every vertex keeps its degree.
        assert_eq!(mesh.near_vertex(he), a);
        assert_eq!(mesh.far_vertex(he), b);
        for v in mesh.vertex_ids() {
            assert_eq!(mesh.vertex_neighbor_count(v), 4);
        }
        assert_eq!(mesh.face_of(he), gaining[0]);
    }

    #[test]
    fn test_face_spin_forward_then_backward_is_identity() {
        let mut mesh = quad_torus(4, 3);
        let before = snapshot(&mesh);

        for he in mesh.halfedge_ids().collect::<Vec<_>>() {
            assert!(mesh.can_spin_face_edge_forward(he));
            mesh.spin_face_edge_forward(he).unwrap();
            mesh.validate().unwrap();
            assert!(mesh.can_spin_face_edge_backward(he));
            mesh.spin_face_edge_backward(he).unwrap();
        }

        assert_eq!(snapshot(&mesh), before);
    }

    #[test]
    fn test_wraps_follow_rotated_edges() {
        let mut mesh = quad_torus(3, 3);
        let seam: Vec<HalfEdgeId> = mesh
            .halfedge_ids()
            .filter(|&he| !mesh.wrap(he).is_empty())
            .collect();
        assert!(!seam.is_empty());

        for he in seam {
            if mesh.spin_edge_forward(he).is_ok() {
                mesh.validate().unwrap();
                mesh.spin_edge_backward(he).unwrap();
            }
            if mesh.spin_face_edge_forward(he).is_ok() {
                mesh.validate().unwrap();
                mesh.spin_face_edge_backward(he).unwrap();
            }
        }
        mesh.validate().unwrap();
    }

    #[test]
    fn test_triangles_refuse_face_spin() {
        let mut mesh = triangle_fan(6);
        let spoke = mesh
            .find_halfedge(VertexId::new(0), VertexId::new(1))
            .unwrap();
        let before = snapshot(&mesh);

        assert!(!mesh.can_spin_face_edge_forward(spoke));
        let result = mesh.spin_face_edge_forward(spoke);
        assert!(matches!(result, Err(TopologyError::InvalidOperation(_))));
        assert_eq!(snapshot(&mesh), before);
    }

    #[test]
    fn test_fan_spoke_vertex_spin() {
        let mut mesh = triangle_fan(6);
        let spoke = mesh
            .find_halfedge(VertexId::new(0), VertexId::new(1))
            .unwrap();

        // Rim vertex 1 only has three neighbors.
        assert!(!mesh.can_spin_edge_forward(spoke));
        assert!(mesh.spin_edge_forward(spoke).is_err());
        mesh.validate().unwrap();
    }

    #[test]
    fn test_single_quad_cannot_spin() {
        let mut mesh = single_quad();
        let before = snapshot(&mesh);
        for he in mesh.halfedge_ids().collect::<Vec<_>>() {
            assert!(!mesh.can_spin_edge_forward(he));
            assert!(!mesh.can_spin_edge_backward(he));
            assert!(!mesh.can_spin_face_edge_forward(he));
            assert!(!mesh.can_spin_face_edge_backward(he));
            assert!(mesh.spin_edge_forward(he).is_err());
        }
        assert_eq!(snapshot(&mesh), before);
    }

    #[test]
    fn test_boundary_edge_face_spin() {
        let mut mesh = quad_grid(4, 4);
        // An interior edge on row 0 between faces 1 and 2, ending on the boundary.
        let he = mesh
            .find_halfedge(VertexId::new(7), VertexId::new(2))
            .unwrap();
        let external = mesh.external_face_ids().next().unwrap();
        let external_degree = mesh.face_neighbor_count(external);

        mesh.spin_face_edge_forward(he).unwrap();
        mesh.validate().unwrap();
        // One side of the spun edge now faces the boundary.
        assert_eq!(mesh.face_neighbor_count(external), external_degree + 1);
        assert!(mesh.is_boundary_edge(he));

        mesh.spin_face_edge_backward(he).unwrap();
        mesh.validate().unwrap();
        assert_eq!(mesh.face_neighbor_count(external), external_degree);
    }

    #[test]
    fn test_spin_out_of_range() {
        let mut mesh = single_quad();
        let result = mesh.spin_edge_forward(HalfEdgeId::new(99));
        assert!(matches!(result, Err(TopologyError::OutOfRange { .. })));
        assert!(!mesh.can_spin_edge_forward(HalfEdgeId::new(99)));
    }

    #[test]
    fn test_compose_path_uses_net_crossing() {
        let path = [EdgeWrap::POS_X, EdgeWrap::POS_X, EdgeWrap::NEG_X];
        assert_eq!(compose_path(&path), Some(EdgeWrap::POS_X));
        let path = [EdgeWrap::NEG_Y, EdgeWrap::POS_X, EdgeWrap::NEG_Y, EdgeWrap::POS_Y];
        assert_eq!(compose_path(&path), Some(EdgeWrap::POS_X | EdgeWrap::NEG_Y));
        assert_eq!(compose_path(&[EdgeWrap::POS_X, EdgeWrap::POS_X]), None);
        assert_eq!(compose_path(&[]), Some(EdgeWrap::empty()));
    }

    /// Every legal spin of `mesh` must be undone exactly by its backward spin.
    fn assert_spins_invert(mesh: &mut HalfEdgeMesh) -> usize {
        let mut checked = 0;
        for he in mesh.halfedge_ids().collect::<Vec<_>>() {
            if mesh.can_spin_edge_forward(he) {
                let before = snapshot(mesh);
                mesh.spin_edge_forward(he).unwrap();
                assert!(mesh.can_spin_edge_backward(he), "{:?} cannot spin back", he);
                mesh.spin_edge_backward(he).unwrap();
                assert_eq!(snapshot(mesh), before, "vertex spin of {:?}", he);
                checked += 1;
            }
            if mesh.can_spin_face_edge_forward(he) {
                let before = snapshot(mesh);
                mesh.spin_face_edge_forward(he).unwrap();
                assert!(mesh.can_spin_face_edge_backward(he), "{:?} cannot face spin back", he);
                mesh.spin_face_edge_backward(he).unwrap();
                assert_eq!(snapshot(mesh), before, "face spin of {:?}", he);
                checked += 1;
            }
        }
        mesh.validate().unwrap();
        checked
    }

    #[test]
    fn test_spins_invert_on_randomized_wrapped_grids() {
        let options = RandomizeOptions::default()
            .with_pass_count(3)
            .with_frequency(0.7)
            .with_lock_boundary(false);

        for (wrap_x, wrap_y) in [(true, true), (true, false), (false, true), (false, false)] {
            for seed in 0..8 {
                let mut mesh: HalfEdgeMesh = QuadGrid::new(6, 5)
                    .with_wrap(wrap_x, wrap_y)
                    .build_mesh()
                    .unwrap();
                let mut rng = fastrand::Rng::with_seed(seed);
                randomize_topology(&mut mesh, &options, &mut rng).unwrap();
                mesh.validate().unwrap();

                assert!(assert_spins_invert(&mut mesh) > 0);
            }
        }
    }
}
