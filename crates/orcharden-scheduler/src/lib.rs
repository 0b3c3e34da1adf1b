//! The DAG + resource-lock scheduler: decides which tasks are ready,
//! admits them while honoring mutual-exclusion locks, and tracks state
//! transitions for one run.
//!
//! # Main types
//!
//! - [`Scheduler`] — the single coordinator-owned scheduling object.
//! - [`TaskInfo`] / [`TaskState`] — its input and per-task state.
//! - [`BlockReason`] — why a pending task isn't ready yet.

mod scheduler;
mod types;

pub use scheduler::Scheduler;
pub use types::{BlockReason, TaskInfo, TaskState};
