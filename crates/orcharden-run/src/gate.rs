//! The two gating rules a supervisor applies before declaring an agent's
//! termination a success, kept as pure predicates over a small input
//! struct so they're testable without a worktree or subprocess.

/// Everything a gate needs to judge one agent termination.
#[derive(Debug, Clone)]
pub struct GateInput {
    /// Commits made on the task branch since the base, per `VcsOps`.
    pub commit_count: u64,
    /// The engine's parsed response text, searched for an error payload.
    pub response_text: String,
}

/// Commit gate: a zero-commit outcome is failure regardless of what the
/// agent claims in its output.
pub fn commit_gate(input: &GateInput) -> bool {
    input.commit_count >= 1
}

/// Tokens that mark an engine response as carrying an error payload,
/// independent of the commit gate.
const ERROR_MARKERS: &[&str] = &["\"error\"", "\"is_error\":true", "\"is_error\": true"];

/// Error-payload gate: presence of an error record anywhere in the
/// parsed response text is failure.
pub fn error_payload_gate(input: &GateInput) -> bool {
    let lowered = input.response_text.to_lowercase();
    !ERROR_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Both gates must pass for the supervisor to declare success.
pub fn passes_all_gates(input: &GateInput) -> bool {
    commit_gate(input) && error_payload_gate(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(commits: u64, text: &str) -> GateInput {
        GateInput {
            commit_count: commits,
            response_text: text.to_string(),
        }
    }

    #[test]
    fn zero_commits_fails_regardless_of_output() {
        assert!(!commit_gate(&input(0, "looks great")));
    }

    #[test]
    fn one_commit_passes_the_commit_gate() {
        assert!(commit_gate(&input(1, "")));
    }

    #[test]
    fn error_payload_fails_the_payload_gate() {
        assert!(!error_payload_gate(&input(1, r#"{"error": "boom"}"#)));
    }

    #[test]
    fn clean_output_passes_both_gates() {
        assert!(passes_all_gates(&input(2, "all tests pass")));
    }

    #[test]
    fn zero_commits_fails_overall_even_with_clean_output() {
        assert!(!passes_all_gates(&input(0, "all tests pass")));
    }
}
