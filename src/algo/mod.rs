//! Algorithms driving a tiling.
//!
//! - **Randomization**: random edge spins under degree bounds ([`randomize`])
//! - **Relaxation**: surface-constrained vertex smoothing and inverted face
//!   repair, used between randomization passes ([`relax`])

pub mod progress;
pub mod randomize;
pub mod relax;

pub use progress::Progress;
