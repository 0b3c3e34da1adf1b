use serde::{Deserialize, Serialize};

/// How severe a review finding is. Only `Blocker` prevents finalization
/// to base — see `DESIGN.md` for why `Critical` was resolved as
/// non-fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Blocker,
    Critical,
    Warning,
    Info,
}

/// One finding from the review agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// The parsed `review-report.json` produced by the review agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReport {
    pub issues: Vec<Issue>,
}

impl ReviewReport {
    pub fn blockers(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Blocker)
    }

    pub fn has_blockers(&self) -> bool {
        self.blockers().next().is_some()
    }
}
