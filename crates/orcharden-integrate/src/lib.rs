//! The integration pipeline: dependency-ordered merge, AI-assisted
//! conflict resolution, semantic review, and finalization with
//! fix-task synthesis.
//!
//! # Main types
//!
//! - [`pipeline::run_integration_pipeline`] — the full C8 pipeline.
//! - [`merge::topological_order`] / [`merge::merge_task_branch`].
//! - [`review::ReviewReport`] / [`review::Issue`] / [`review::Severity`].
//! - [`finalize::finalize`] / [`finalize::FixTaskAuthority`].

pub mod finalize;
pub mod merge;
pub mod pipeline;
pub mod review;

pub use finalize::{FinalizeOutcome, FixTaskAuthority};
pub use merge::{merge_task_branch, topological_order, MergeOutcome};
pub use pipeline::{run_integration_pipeline, IntegrationOutcome, MergeRecord};
pub use review::{Issue, ReviewReport, Severity};
