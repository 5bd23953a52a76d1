//! Bounded worker-pool scheduler for scope runs.
//!
//! One shared atomic cursor hands out queue indexes; each worker writes its
//! result into the pre-assigned slot for that index, so the final report is
//! ordered identically to the queue regardless of completion order. The only
//! shared mutable state is the cursor and the failure counter.

mod engine;
mod progress;
mod types;

pub use engine::run_scopes;
pub use progress::ProgressMonitor;
pub use types::{RunOptions, TaskResult, TaskStatus};
