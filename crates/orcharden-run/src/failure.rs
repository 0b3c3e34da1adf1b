//! The external-failure controller (C7): classifies a failure message as
//! external infrastructure trouble or an internal agent/task problem, and
//! owns the run-wide latch that stops admission once an external failure
//! is seen.

use std::time::Duration;

use orcharden_core::Clock;

use crate::report::FailureType;

/// Canonical, case-insensitive substrings that mark a failure as
/// external/infrastructural rather than a problem with the task itself.
/// Order doesn't matter here — this is a membership test, not a
/// first-match table.
const CANONICAL_TOKENS: &[&str] = &[
    "installation failed",
    "command not found",
    "no such file or directory",
    "permission denied",
    "network",
    "timeout",
    "tls",
    "connection reset",
    "certificate",
    "ssl",
    "lock file",
];

/// Classify a failure message. A match against any canonical token
/// (case-insensitive substring) is `External`; otherwise `Internal`.
pub fn classify(message: &str) -> FailureType {
    let lowered = message.to_lowercase();
    if CANONICAL_TOKENS.iter().any(|token| lowered.contains(token)) {
        FailureType::External
    } else {
        FailureType::Internal
    }
}

/// The first external failure recorded for a run.
#[derive(Debug, Clone)]
pub struct LatchedFailure {
    pub task_id: String,
    pub message: String,
}

/// Coordinator-owned latch: once tripped, the coordinator stops
/// admitting new tasks. Not an `Arc<Mutex<_>>` or atomic — the
/// coordinator is the only writer and reader of scheduler-adjacent
/// state, per the workspace's single-writer concurrency model, so this
/// is plain owned state on the coordinator's struct.
#[derive(Debug, Default)]
pub struct FailureController {
    latched: Option<LatchedFailure>,
}

impl FailureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_latched(&self) -> bool {
        self.latched.is_some()
    }

    pub fn latched(&self) -> Option<&LatchedFailure> {
        self.latched.as_ref()
    }

    /// Record a failure's classification; latches on the first external
    /// failure only. Later external failures are ignored for latching
    /// purposes (the run is already stopping) but still surface as their
    /// own failed reports upstream.
    pub fn observe(&mut self, task_id: &str, message: &str, kind: FailureType) {
        if kind == FailureType::External && self.latched.is_none() {
            self.latched = Some(LatchedFailure {
                task_id: task_id.to_string(),
                message: message.to_string(),
            });
        }
    }

    /// Wait up to `deadline` for `still_running` to return `true` while
    /// polling at fixed intervals via the injected clock, so graceful
    /// shutdown is deterministic in tests. Returns `true` if everything
    /// drained before the deadline, `false` if the deadline elapsed with
    /// tasks still outstanding.
    pub async fn wait_for_drain(
        &self,
        clock: &dyn Clock,
        deadline: Duration,
        poll_interval: Duration,
        mut still_running: impl FnMut() -> bool,
    ) -> bool {
        let start = clock.now();
        loop {
            if !still_running() {
                return true;
            }
            if clock.now().signed_duration_since(start).to_std().unwrap_or_default() >= deadline {
                return false;
            }
            clock.sleep(poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orcharden_core::SystemClock;

    #[test]
    fn matches_canonical_tokens_case_insensitively() {
        assert_eq!(classify("Network unreachable"), FailureType::External);
        assert_eq!(classify("TLS handshake failed"), FailureType::External);
        assert_eq!(classify("Permission Denied"), FailureType::External);
    }

    #[test]
    fn unmatched_message_is_internal() {
        assert_eq!(classify("assertion failed: expected 2 got 3"), FailureType::Internal);
    }

    #[test]
    fn latches_on_first_external_failure_only() {
        let mut controller = FailureController::new();
        controller.observe("T-1", "network error", FailureType::External);
        assert!(controller.is_latched());
        assert_eq!(controller.latched().unwrap().task_id, "T-1");

        controller.observe("T-2", "timeout", FailureType::External);
        assert_eq!(controller.latched().unwrap().task_id, "T-1");
    }

    #[test]
    fn internal_failures_never_latch() {
        let mut controller = FailureController::new();
        controller.observe("T-1", "assertion failed", FailureType::Internal);
        assert!(!controller.is_latched());
    }

    #[tokio::test]
    async fn wait_for_drain_returns_true_once_nothing_is_running() {
        let controller = FailureController::new();
        let clock = SystemClock;
        let mut calls = 0;
        let drained = controller
            .wait_for_drain(&clock, Duration::from_millis(50), Duration::from_millis(5), || {
                calls += 1;
                calls < 2
            })
            .await;
        assert!(drained);
    }
}
