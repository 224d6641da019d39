//! Simulated background tasks with progress, cancellation and real outcomes.
//!
//! ## Design
//!
//! - Each task is session-scoped and typed by [`TaskKind`]
//! - A [`TaskProfile`] fixes the simulated duration and progress cadence
//! - The runner checks for cancellation on every tick; a cancelled task never
//!   runs its completion work
//! - Completion work returns a `Result`, so failures are reported, not hidden
//!
//! ## Components
//!
//! - `TaskHandle`: shared progress + cancellation flag
//! - `run_simulated` / `spawn_simulated`: the tick loop
//! - `TaskStore`: lookup of live and finished handles per session

pub mod handle;
pub mod runner;
pub mod store;
pub mod types;

pub use handle::TaskHandle;
pub use runner::{run_simulated, spawn_simulated};
pub use store::TaskStore;
pub use types::{TaskError, TaskId, TaskKind, TaskPhase, TaskProfile, TaskProgress};
