//! The progress aggregator (C10): classifies an agent's current step
//! from the tail of its streaming output by first match against a fixed,
//! ordered rule table. Pure — same input always yields the same step.

/// A step label the UI (out of scope here) maps to a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Committing,
    Staging,
    Logging,
    UpdatingPrd,
    Linting,
    Testing,
    WritingTests,
    Implementing,
    ReadingCode,
    RunningCmd,
    Thinking,
}

impl Step {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Committing => "Committing",
            Self::Staging => "Staging",
            Self::Logging => "Logging",
            Self::UpdatingPrd => "Updating PRD",
            Self::Linting => "Linting",
            Self::Testing => "Testing",
            Self::WritingTests => "Writing tests",
            Self::Implementing => "Implementing",
            Self::ReadingCode => "Reading code",
            Self::RunningCmd => "Running cmd",
            Self::Thinking => "Thinking",
        }
    }
}

type Matcher = fn(&str) -> bool;

const RULES: &[(Matcher, Step)] = &[
    (|s| s.contains("git commit"), Step::Committing),
    (|s| s.contains("git add"), Step::Staging),
    (|s| s.contains("progress.md") || s.contains("progress file"), Step::Logging),
    (|s| s.contains("tasks.yaml") || s.contains("prd"), Step::UpdatingPrd),
    (
        |s| ["lint", "eslint", "biome", "prettier"].iter().any(|t| s.contains(t)),
        Step::Linting,
    ),
    (
        |s| {
            ["vitest", "jest", "bun test", "npm test", "pytest", "go test"]
                .iter()
                .any(|t| s.contains(t))
        },
        Step::Testing,
    ),
    (
        |s| [".test.", ".spec.", "__tests__", "_test."].iter().any(|t| s.contains(t)),
        Step::WritingTests,
    ),
    (
        |s| s.contains("\"tool\":\"write\"") || s.contains("\"tool\":\"edit\""),
        Step::Implementing,
    ),
    (
        |s| {
            ["\"tool\":\"read\"", "\"tool\":\"glob\"", "\"tool\":\"grep\""]
                .iter()
                .any(|t| s.contains(t))
        },
        Step::ReadingCode,
    ),
    (
        |s| s.contains("\"tool\":\"bash\"") || s.contains("\"tool\":\"shell\""),
        Step::RunningCmd,
    ),
    (|s| s.contains("\"type\":\"thinking\""), Step::Thinking),
];

/// Classify the current step from a bounded tail window of an agent's
/// streaming output, lower-cased before matching so rule authors never
/// need to worry about case. Falls through to `Thinking` when nothing
/// matches, per the ordered rule table's own final catch-all.
pub fn classify_step(tail: &str) -> Step {
    let lowered = tail.to_lowercase();
    for (matcher, step) in RULES {
        if matcher(&lowered) {
            return *step;
        }
    }
    Step::Thinking
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_takes_priority_over_staging() {
        let tail = "running git add . then git commit -m done";
        assert_eq!(classify_step(tail), Step::Committing);
    }

    #[test]
    fn recognizes_test_runner_tokens() {
        assert_eq!(classify_step("npx vitest run"), Step::Testing);
        assert_eq!(classify_step("go test ./..."), Step::Testing);
    }

    #[test]
    fn recognizes_test_file_paths_after_runner_check() {
        assert_eq!(classify_step("editing src/foo.test.ts"), Step::WritingTests);
    }

    #[test]
    fn tool_invocations_map_to_their_step() {
        assert_eq!(classify_step(r#"{"tool":"Write","path":"x"}"#), Step::Implementing);
        assert_eq!(classify_step(r#"{"tool":"Grep","pattern":"x"}"#), Step::ReadingCode);
        assert_eq!(classify_step(r#"{"tool":"Bash","cmd":"ls"}"#), Step::RunningCmd);
    }

    #[test]
    fn unmatched_output_falls_back_to_thinking() {
        assert_eq!(classify_step("pondering the architecture"), Step::Thinking);
    }
}
