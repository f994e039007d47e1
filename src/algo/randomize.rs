//! Stochastic topology randomization.
//!
//! Repeatedly spins edges of a tiling at random while keeping every vertex and
//! face degree inside configured bounds. Starting from a regular grid this
//! produces an irregular tiling with the same element counts.
//!
//! # Algorithm
//!
//! Each pass visits every half-edge once, in id order, and decides whether a
//! forward vertex-edge spin and a forward face-edge spin would be legal and
//! keep the degrees of the four affected elements in bounds:
//!
//! - Both eligible: one draw `r`; below `frequency / 2` spin the vertex-edge,
//!   below `frequency` spin the face-edge, otherwise leave it.
//! - One eligible: one draw; spin when below `frequency`.
//! - Neither eligible: no draw.
//!
//! A callback runs after every pass, typically to relax vertex positions (see
//! [`relaxation_loop`]).
//!
//! # Example
//!
//! ```
//! use tessera::algo::randomize::{randomize_topology, RandomizeOptions};
//! use tessera::grid::QuadGrid;
//! use tessera::mesh::HalfEdgeMesh;
//!
//! let mut mesh: HalfEdgeMesh = QuadGrid::new(8, 8).with_wrap(true, true).build_mesh().unwrap();
//! let mut rng = fastrand::Rng::with_seed(1);
//!
//! let options = RandomizeOptions::default().with_pass_count(2);
//! let stats = randomize_topology(&mut mesh, &options, &mut rng).unwrap();
//!
//! assert_eq!(stats.passes, 2);
//! assert!(mesh.is_valid());
//! ```

use crate::error::{Result, TopologyError};
use crate::mesh::{HalfEdgeId, HalfEdgeMesh, MeshIndex};
use crate::random::RandomSource;

use super::Progress;

/// Options for topology randomization.
#[derive(Debug, Clone)]
pub struct RandomizeOptions {
    /// Number of passes over all half-edges.
    pub pass_count: usize,

    /// Probability of spinning an eligible half-edge, in `[0, 1]`.
    pub frequency: f64,

    /// Smallest vertex degree a spin may leave behind.
    pub min_vertex_neighbors: usize,

    /// Largest vertex degree a spin may create.
    /// Vertex-edge spins are disabled unless this exceeds the minimum.
    pub max_vertex_neighbors: usize,

    /// Smallest face degree a spin may leave behind.
    pub min_face_neighbors: usize,

    /// Largest internal face degree a spin may create.
    /// Face-edge spins are disabled unless this exceeds the minimum.
    pub max_face_neighbors: usize,

    /// Leave every edge with an endpoint on the boundary alone.
    pub lock_boundary: bool,
}

impl Default for RandomizeOptions {
    fn default() -> Self {
        Self {
            pass_count: 1,
            frequency: 0.5,
            min_vertex_neighbors: 3,
            max_vertex_neighbors: 6,
            min_face_neighbors: 3,
            max_face_neighbors: 6,
            lock_boundary: true,
        }
    }
}

impl RandomizeOptions {
    /// Set the number of passes.
    pub fn with_pass_count(mut self, pass_count: usize) -> Self {
        self.pass_count = pass_count;
        self
    }

    /// Set the spin probability.
    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }

    /// Set the allowed vertex degree range.
    pub fn with_vertex_neighbors(mut self, min: usize, max: usize) -> Self {
        self.min_vertex_neighbors = min;
        self.max_vertex_neighbors = max;
        self
    }

    /// Set the allowed face degree range.
    pub fn with_face_neighbors(mut self, min: usize, max: usize) -> Self {
        self.min_face_neighbors = min;
        self.max_face_neighbors = max;
        self
    }

    /// Set whether edges touching the boundary are left alone.
    pub fn with_lock_boundary(mut self, lock_boundary: bool) -> Self {
        self.lock_boundary = lock_boundary;
        self
    }

    /// Check that the options describe a meaningful run.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.frequency) {
            return Err(TopologyError::invalid_param(
                "frequency",
                self.frequency,
                "must be within [0, 1]",
            ));
        }
        if self.min_vertex_neighbors < 2 {
            return Err(TopologyError::invalid_param(
                "min_vertex_neighbors",
                self.min_vertex_neighbors,
                "must be at least 2",
            ));
        }
        if self.max_vertex_neighbors < self.min_vertex_neighbors {
            return Err(TopologyError::invalid_param(
                "max_vertex_neighbors",
                self.max_vertex_neighbors,
                "must not be below min_vertex_neighbors",
            ));
        }
        if self.min_face_neighbors < 3 {
            return Err(TopologyError::invalid_param(
                "min_face_neighbors",
                self.min_face_neighbors,
                "must be at least 3",
            ));
        }
        if self.max_face_neighbors < self.min_face_neighbors {
            return Err(TopologyError::invalid_param(
                "max_face_neighbors",
                self.max_face_neighbors,
                "must not be below min_face_neighbors",
            ));
        }
        Ok(())
    }
}

/// What a randomization run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomizeStats {
    /// Passes completed.
    pub passes: usize,
    /// Vertex-edge spins performed.
    pub vertex_spins: usize,
    /// Face-edge spins performed.
    pub face_spins: usize,
    /// Half-edge visits that did not spin.
    pub skipped: usize,
}

impl RandomizeStats {
    /// Total number of spins.
    pub fn spins(&self) -> usize {
        self.vertex_spins + self.face_spins
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpinKind {
    Vertex,
    Face,
}

/// Randomize the topology of a mesh in place.
///
/// # Errors
/// `InvalidParameter` if `options` are invalid; the mesh is untouched.
pub fn randomize_topology<I, R>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &RandomizeOptions,
    rng: &mut R,
) -> Result<RandomizeStats>
where
    I: MeshIndex,
    R: RandomSource + ?Sized,
{
    randomize_topology_with(mesh, options, rng, |_| {})
}

/// Randomize the topology of a mesh, calling `relax` after every pass.
pub fn randomize_topology_with<I, R, F>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &RandomizeOptions,
    rng: &mut R,
    relax: F,
) -> Result<RandomizeStats>
where
    I: MeshIndex,
    R: RandomSource + ?Sized,
    F: FnMut(&HalfEdgeMesh<I>),
{
    randomize_topology_with_progress(mesh, options, rng, relax, &Progress::none())
}

/// Randomize the topology of a mesh with progress reporting.
pub fn randomize_topology_with_progress<I, R, F>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &RandomizeOptions,
    rng: &mut R,
    mut relax: F,
    progress: &Progress,
) -> Result<RandomizeStats>
where
    I: MeshIndex,
    R: RandomSource + ?Sized,
    F: FnMut(&HalfEdgeMesh<I>),
{
    options.validate()?;

    let mut stats = RandomizeStats::default();

    for pass in 0..options.pass_count {
        progress.report(pass, options.pass_count, "Randomizing topology");
        let before = stats;

        for index in 0..mesh.num_halfedges() {
            let he = HalfEdgeId::new(index);
            let vertex_ok = vertex_spin_eligible(mesh, he, options);
            let face_ok = face_spin_eligible(mesh, he, options);

            match choose_spin(vertex_ok, face_ok, options.frequency, rng) {
                Some(SpinKind::Vertex) => {
                    mesh.spin_edge_forward(he)?;
                    stats.vertex_spins += 1;
                    log::trace!("pass {}: vertex-edge spin of {:?}", pass, he);
                }
                Some(SpinKind::Face) => {
                    mesh.spin_face_edge_forward(he)?;
                    stats.face_spins += 1;
                    log::trace!("pass {}: face-edge spin of {:?}", pass, he);
                }
                None => stats.skipped += 1,
            }
        }

        relax(mesh);
        stats.passes += 1;

        log::debug!(
            "randomize pass {}/{}: {} vertex-edge spins, {} face-edge spins",
            pass + 1,
            options.pass_count,
            stats.vertex_spins - before.vertex_spins,
            stats.face_spins - before.face_spins
        );
    }
    progress.report(options.pass_count, options.pass_count, "Randomizing topology");

    Ok(stats)
}

/// Pick a spin for a half-edge, drawing only when something is eligible.
fn choose_spin<R: RandomSource + ?Sized>(
    vertex_ok: bool,
    face_ok: bool,
    frequency: f64,
    rng: &mut R,
) -> Option<SpinKind> {
    match (vertex_ok, face_ok) {
        (false, false) => None,
        (true, true) => {
            let r = rng.next_f64();
            if r < frequency * 0.5 {
                Some(SpinKind::Vertex)
            } else if r < frequency {
                Some(SpinKind::Face)
            } else {
                None
            }
        }
        (true, false) => (rng.next_f64() < frequency).then_some(SpinKind::Vertex),
        (false, true) => (rng.next_f64() < frequency).then_some(SpinKind::Face),
    }
}

fn touches_boundary<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, he: HalfEdgeId<I>) -> bool {
    mesh.has_external_face_neighbor(mesh.near_vertex(he))
        || mesh.has_external_face_neighbor(mesh.far_vertex(he))
}

fn vertex_spin_eligible<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    he: HalfEdgeId<I>,
    options: &RandomizeOptions,
) -> bool {
    if options.min_vertex_neighbors >= options.max_vertex_neighbors {
        return false;
    }
    if options.lock_boundary && touches_boundary(mesh, he) {
        return false;
    }
    if !mesh.can_spin_edge_forward(he) {
        return false;
    }

    let (losing, gaining) = mesh.vertex_spin_forward_neighbors(he);
    losing
        .iter()
        .all(|&v| mesh.vertex_neighbor_count(v) > options.min_vertex_neighbors)
        && gaining
            .iter()
            .all(|&v| mesh.vertex_neighbor_count(v) < options.max_vertex_neighbors)
}

fn face_spin_eligible<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    he: HalfEdgeId<I>,
    options: &RandomizeOptions,
) -> bool {
    if options.min_face_neighbors >= options.max_face_neighbors {
        return false;
    }
    if options.lock_boundary && touches_boundary(mesh, he) {
        return false;
    }
    if !mesh.can_spin_face_edge_forward(he) {
        return false;
    }

    let (losing, gaining) = mesh.face_spin_forward_neighbors(he);
    losing
        .iter()
        .all(|&f| mesh.face_neighbor_count(f) > options.min_face_neighbors)
        && gaining.iter().all(|&f| {
            mesh.is_external_face(f) || mesh.face_neighbor_count(f) < options.max_face_neighbors
        })
}

/// Build a per-pass callback that alternates relaxation and repair.
///
/// The callback runs `relax` up to `max_relax_passes` times. After each call
/// it runs `repair` up to `max_repair_passes` times, stopping as soon as
/// `repair` reports that nothing is left to fix. Relaxation stops early once
/// `relax` reports no change, or once the relative reduction of the change
/// from one call to the next falls below `relative_precision`.
///
/// `relax` returns the amount of change it made (for instance the total
/// vertex displacement); `repair` returns `true` when it found no violations.
pub fn relaxation_loop<I, R, P>(
    max_relax_passes: usize,
    max_repair_passes: usize,
    relative_precision: f64,
    mut relax: R,
    mut repair: P,
) -> impl FnMut(&HalfEdgeMesh<I>)
where
    I: MeshIndex,
    R: FnMut(&HalfEdgeMesh<I>) -> f64,
    P: FnMut(&HalfEdgeMesh<I>) -> bool,
{
    move |mesh: &HalfEdgeMesh<I>| {
        let mut previous = 0.0;
        for pass in 0..max_relax_passes {
            let change = relax(mesh);

            let mut repairs = 0;
            while repairs < max_repair_passes {
                repairs += 1;
                if repair(mesh) {
                    break;
                }
            }

            log::trace!(
                "relax pass {}: change {:.6}, {} repair passes",
                pass,
                change,
                repairs
            );

            if change == 0.0 {
                break;
            }
            if previous != 0.0 && 1.0 - change / previous < relative_precision {
                break;
            }
            previous = change;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_fixtures::{quad_grid, quad_torus};
    use crate::mesh::FaceId;
    use crate::random::SequenceRandom;
    use std::cell::{Cell, RefCell};

    fn degrees_within(mesh: &HalfEdgeMesh, options: &RandomizeOptions) -> bool {
        mesh.vertex_ids().all(|v| {
            let d = mesh.vertex_neighbor_count(v);
            d >= options.min_vertex_neighbors && d <= options.max_vertex_neighbors
        }) && mesh.internal_face_ids().all(|f| {
            let d = mesh.face_neighbor_count(f);
            d >= options.min_face_neighbors && d <= options.max_face_neighbors
        })
    }

    #[test]
    fn test_randomize_torus_keeps_invariants() {
        let mut mesh = quad_torus(8, 6);
        let (v, e, f) = (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces());
        let options = RandomizeOptions::default()
            .with_pass_count(4)
            .with_frequency(0.8)
            .with_vertex_neighbors(3, 6)
            .with_face_neighbors(3, 6);
        let mut rng = fastrand::Rng::with_seed(12345);

        let stats = randomize_topology(&mut mesh, &options, &mut rng).unwrap();

        assert_eq!(stats.passes, 4);
        assert!(stats.spins() > 0);
        assert_eq!(stats.spins() + stats.skipped, 4 * mesh.num_halfedges());
        mesh.validate().unwrap();
        assert_eq!((mesh.num_vertices(), mesh.num_edges(), mesh.num_faces()), (v, e, f));
        assert_eq!(mesh.total_face_degree(), 2 * mesh.num_edges());
        assert!(degrees_within(&mesh, &options));
    }

    #[test]
    fn test_equal_vertex_bounds_disable_vertex_spins() {
        let mut mesh = quad_torus(6, 6);
        let options = RandomizeOptions::default()
            .with_pass_count(3)
            .with_frequency(1.0)
            .with_vertex_neighbors(4, 4)
            .with_face_neighbors(3, 6);
        let mut rng = fastrand::Rng::with_seed(3);

        let stats = randomize_topology(&mut mesh, &options, &mut rng).unwrap();

        assert_eq!(stats.vertex_spins, 0);
        assert!(stats.face_spins > 0);
        assert!(mesh.vertex_ids().all(|v| mesh.vertex_neighbor_count(v) == 4));
        mesh.validate().unwrap();
    }

    #[test]
    fn test_zero_frequency_draws_but_never_spins() {
        let mut mesh = quad_torus(4, 4);
        let options = RandomizeOptions::default().with_frequency(0.0);
        let mut rng = SequenceRandom::constant(0.0);

        let stats = randomize_topology(&mut mesh, &options, &mut rng).unwrap();

        assert_eq!(stats.spins(), 0);
        assert_eq!(stats.skipped, mesh.num_halfedges());
        // Every half-edge of a fresh torus is eligible for something.
        assert_eq!(rng.draws(), mesh.num_halfedges());
    }

    #[test]
    fn test_choose_spin_policy() {
        let mut rng = SequenceRandom::new(vec![0.1, 0.3, 0.6]);
        assert_eq!(choose_spin(true, true, 0.5, &mut rng), Some(SpinKind::Vertex));
        assert_eq!(choose_spin(true, true, 0.5, &mut rng), Some(SpinKind::Face));
        assert_eq!(choose_spin(true, true, 0.5, &mut rng), None);
        assert_eq!(rng.draws(), 3);

        let mut rng = SequenceRandom::constant(0.3);
        assert_eq!(choose_spin(false, true, 0.5, &mut rng), Some(SpinKind::Face));
        assert_eq!(choose_spin(true, false, 0.5, &mut rng), Some(SpinKind::Vertex));
        assert_eq!(choose_spin(true, false, 0.2, &mut rng), None);
        assert_eq!(rng.draws(), 3);

        assert_eq!(choose_spin(false, false, 1.0, &mut rng), None);
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn test_lock_boundary_keeps_outline() {
        let mut mesh = quad_grid(6, 5);
        let outline = |mesh: &HalfEdgeMesh| -> Vec<usize> {
            let boundary = FaceId::new(mesh.num_internal_faces());
            let mut vertices: Vec<usize> = mesh.face_vertices(boundary).map(|v| v.index()).collect();
            vertices.sort_unstable();
            vertices
        };
        let before = outline(&mesh);
        let options = RandomizeOptions::default()
            .with_pass_count(5)
            .with_frequency(1.0)
            .with_lock_boundary(true);
        let mut rng = fastrand::Rng::with_seed(99);

        let stats = randomize_topology(&mut mesh, &options, &mut rng).unwrap();

        assert!(stats.spins() > 0);
        mesh.validate().unwrap();
        assert_eq!(outline(&mesh), before);
    }

    #[test]
    fn test_invalid_options_leave_mesh_alone() {
        let mut mesh = quad_torus(4, 4);
        let mut rng = SequenceRandom::constant(0.0);

        let options = RandomizeOptions::default().with_frequency(1.5);
        let result = randomize_topology(&mut mesh, &options, &mut rng);
        assert!(matches!(
            result,
            Err(TopologyError::InvalidParameter { name: "frequency", .. })
        ));

        let options = RandomizeOptions::default().with_face_neighbors(5, 4);
        assert!(randomize_topology(&mut mesh, &options, &mut rng).is_err());
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn test_relax_runs_after_every_pass() {
        let mut mesh = quad_torus(4, 4);
        let options = RandomizeOptions::default().with_pass_count(3);
        let mut rng = fastrand::Rng::with_seed(5);
        let mut calls = 0;

        randomize_topology_with(&mut mesh, &options, &mut rng, |m: &HalfEdgeMesh| {
            assert!(m.is_valid());
            calls += 1;
        })
        .unwrap();

        assert_eq!(calls, 3);
    }

    #[test]
    fn test_progress_reports_every_pass() {
        let mut mesh = quad_torus(4, 4);
        let options = RandomizeOptions::default().with_pass_count(2);
        let mut rng = fastrand::Rng::with_seed(5);
        let reports = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = std::sync::Arc::clone(&reports);
        let progress = Progress::new(move |current, total, _| {
            sink.lock().unwrap().push((current, total));
        });

        randomize_topology_with_progress(&mut mesh, &options, &mut rng, |_| {}, &progress).unwrap();

        assert_eq!(*reports.lock().unwrap(), vec![(0, 2), (1, 2), (2, 2)]);
    }

    #[test]
    fn test_relaxation_loop_stops_on_precision() {
        let mesh = quad_torus(3, 3);
        let relax_calls = Cell::new(0);
        let changes = [8.0, 4.0, 2.0, 1.0];
        let relax = |_: &HalfEdgeMesh| {
            let change = changes[relax_calls.get()];
            relax_calls.set(relax_calls.get() + 1);
            change
        };
        let repair = |_: &HalfEdgeMesh| true;

        // Halving the change is a relative reduction of 0.5.
        let mut after_pass = relaxation_loop(4, 1, 0.6, relax, repair);
        after_pass(&mesh);
        assert_eq!(relax_calls.get(), 2);
    }

    #[test]
    fn test_relaxation_loop_runs_all_passes_without_precision() {
        let mesh = quad_torus(3, 3);
        let relax_calls = Cell::new(0);
        let relax = |_: &HalfEdgeMesh| {
            relax_calls.set(relax_calls.get() + 1);
            1.0 / relax_calls.get() as f64
        };

        let mut after_pass = relaxation_loop(4, 1, 0.0, relax, |_: &HalfEdgeMesh| true);
        after_pass(&mesh);
        assert_eq!(relax_calls.get(), 4);
    }

    #[test]
    fn test_relaxation_loop_zero_change_and_repairs() {
        let mesh = quad_torus(3, 3);
        let relax_calls = Cell::new(0);
        let repair_log = RefCell::new(Vec::new());
        let relax = |_: &HalfEdgeMesh| {
            relax_calls.set(relax_calls.get() + 1);
            0.0
        };
        // Clean on the third attempt.
        let repair = |_: &HalfEdgeMesh| {
            let mut log = repair_log.borrow_mut();
            log.push(());
            log.len() >= 3
        };

        let mut after_pass = relaxation_loop(10, 5, 0.1, relax, repair);
        after_pass(&mesh);
        assert_eq!(relax_calls.get(), 1);
        assert_eq!(repair_log.borrow().len(), 3);
    }

    #[test]
    fn test_relaxation_loop_caps_repairs() {
        let mesh = quad_torus(3, 3);
        let repairs = Cell::new(0);
        let mut after_pass = relaxation_loop(
            2,
            3,
            0.0,
            |_: &HalfEdgeMesh| 1.0,
            |_: &HalfEdgeMesh| {
                repairs.set(repairs.get() + 1);
                false
            },
        );
        after_pass(&mesh);
        assert_eq!(repairs.get(), 6);
    }
}
