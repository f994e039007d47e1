//! Progress reporting for long-running algorithms.
//!
//! # Example
//!
//! ```
//! use tessera::algo::progress::Progress;
//! use tessera::algo::randomize::{randomize_topology_with_progress, RandomizeOptions};
//! use tessera::grid::QuadGrid;
//! use tessera::mesh::HalfEdgeMesh;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//!
//! let mut mesh: HalfEdgeMesh = QuadGrid::new(6, 6).build_mesh().unwrap();
//! let mut rng = fastrand::Rng::with_seed(0);
//! let options = RandomizeOptions::default().with_pass_count(3);
//! randomize_topology_with_progress(&mut mesh, &options, &mut rng, |_| {}, &progress).unwrap();
//! ```

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives:
/// - `current`: Steps completed so far
/// - `total`: Total number of steps
/// - `message`: Description of the current operation
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_report_reaches_callback() {
        let last = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&last);
        let progress = Progress::new(move |current, total, _| {
            assert!(current <= total);
            seen.store(current, Ordering::SeqCst);
        });

        progress.report(3, 5, "step");
        assert_eq!(last.load(Ordering::SeqCst), 3);
        Progress::none().report(1, 1, "ignored");
    }
}
