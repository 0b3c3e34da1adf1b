//! Running a task graph: agent supervision (C6), external-failure
//! classification (C7), artifact persistence (C9), progress
//! classification (C10), and the coordinator loop tying them to the
//! scheduler and worktree manager.
//!
//! # Main types
//!
//! - [`coordinator::run_coordinator_loop`] — the single admit/launch/fold
//!   loop for one run.
//! - [`Supervisor`] / [`SupervisorConfig`] — one task attempt.
//! - [`FailureController`] / [`failure::classify`] — C7.
//! - [`RunDirectory`] / [`write_report`] — C9.
//! - [`Step`] / [`progress::classify_step`] — C10.
//! - [`Report`] — the persisted per-task outcome.

pub mod artifact;
pub mod coordinator;
pub mod failure;
pub mod gate;
pub mod progress;
pub mod prompt;
pub mod report;
pub mod supervisor;

pub use artifact::{write_log, write_report, RunDirectory};
pub use coordinator::{run_coordinator_loop, RunConfig, RunSummary};
pub use failure::{classify, FailureController, LatchedFailure};
pub use gate::{commit_gate, error_payload_gate, passes_all_gates, GateInput};
pub use progress::{classify_step, Step};
pub use report::{FailureType, Report, ReportStatus};
pub use supervisor::{Supervisor, SupervisorConfig, SupervisorOutcome};
