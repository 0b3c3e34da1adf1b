//! The task-graph: its wire format, validation, lock inference, and the
//! small mutable store that wraps a validated graph for the duration of
//! a run.
//!
//! # Main types
//!
//! - [`TaskGraphDocument`] / [`TaskRecord`] — the persisted YAML shape.
//! - [`validate`] / [`ValidationReport`] — structural and acyclicity
//!   checks, batched rather than fail-fast.
//! - [`effective_locks`] / [`infer_lock`] — mutual-exclusion inference
//!   from touched file paths.
//! - [`TaskGraphStore`] / [`FixTaskToken`] — the run-scoped store and its
//!   capability-gated mutation.

mod locks;
mod store;
mod types;
mod validate;

pub use locks::{effective_locks, infer_lock};
pub use store::{FixTaskToken, TaskGraphStore};
pub use types::{TaskGraphDocument, TaskRecord, SUPPORTED_SCHEMA_VERSION};
pub use validate::{validate, ValidationError, ValidationReport};
