use std::path::PathBuf;

/// Options threaded through to an [`crate::Engine::execute`] call.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Run the invocation detached rather than awaiting it inline. Used
    /// by the integration pipeline's fire-and-forget notification hooks;
    /// the supervisor always awaits its own invocations.
    pub asynchronous: bool,
    pub working_directory: Option<PathBuf>,
    /// Where the engine's stderr is captured for later inspection.
    pub log_file: Option<PathBuf>,
    /// Where a streaming copy of stdout is mirrored as it arrives, for
    /// the progress aggregator (C10) to tail.
    pub tee_file: Option<PathBuf>,
}

/// How an engine reports what an invocation cost, if at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CostOrDuration {
    /// An actual dollar cost, as engine A reports per step.
    Cost(f64),
    /// Wall-clock duration in milliseconds, as engine B reports in lieu
    /// of a cost figure.
    DurationMs(u64),
    /// Neither is available from this engine's output.
    None,
}

/// The parsed outcome of one engine invocation, uniform across all four
/// concrete engines regardless of how differently they stream output.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutcome {
    pub response_text: String,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub cost_or_duration: CostOrDuration,
}
