use thiserror::Error;

/// A convenience `Result` alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Shared leaf error type for the orcharden workspace.
///
/// Higher crates (`orcharden-graph`, `orcharden-scheduler`, `orcharden-vcs`,
/// `orcharden-run`, `orcharden-integrate`) wrap this with their own
/// variants rather than re-deriving a new IO/serialization story.
#[derive(Debug, Error)]
pub enum Error {
    /// The task-graph document declares a schema version this build does
    /// not recognize.
    #[error("unsupported task-graph schema version: {0}")]
    UnsupportedSchemaVersion(u64),

    /// Validation of a loaded task-graph failed with one or more errors.
    /// Each entry is one batched defect's rendered message (duplicate ids,
    /// dangling dependencies, the cycle witness), not just a count.
    #[error("task-graph validation failed: {} error(s): {}", .0.len(), .0.join("; "))]
    Validation(Vec<String>),

    /// A version-control operation failed.
    #[error("vcs error: {0}")]
    Vcs(String),

    /// An agent engine invocation failed.
    #[error("engine error: {0}")]
    Engine(String),

    /// A run-directory or artifact I/O operation failed in a way that
    /// isn't a plain `std::io::Error` (e.g. an atomic rename race).
    #[error("artifact error: {0}")]
    Artifact(String),

    /// The integration pipeline could not proceed.
    #[error("integration error: {0}")]
    Integration(String),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML serialization/deserialization error (task-graph documents).
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON serialization/deserialization error (reports, engine output).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
