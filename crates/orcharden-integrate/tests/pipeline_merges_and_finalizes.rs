use async_trait::async_trait;
use orcharden_core::Result;
use orcharden_engine::{CostOrDuration, Engine, EngineOutcome, ExecuteOptions};
use orcharden_graph::TaskGraphStore;
use orcharden_integrate::{pipeline::run_integration_pipeline, IntegrationOutcome};
use orcharden_vcs::FakeVcs;

struct ReviewEngine {
    body: String,
}

#[async_trait]
impl Engine for ReviewEngine {
    async fn execute(
        &self,
        _prompt: &str,
        output_file: &std::path::Path,
        _options: &ExecuteOptions,
    ) -> Result<EngineOutcome> {
        tokio::fs::write(output_file, &self.body).await.unwrap();
        Ok(EngineOutcome {
            response_text: self.body.clone(),
            input_tokens: None,
            output_tokens: None,
            cost_or_duration: CostOrDuration::None,
        })
    }

    fn name(&self) -> &'static str {
        "review"
    }
}

struct NoopResolver;

#[async_trait]
impl Engine for NoopResolver {
    async fn execute(
        &self,
        _prompt: &str,
        _output_file: &std::path::Path,
        _options: &ExecuteOptions,
    ) -> Result<EngineOutcome> {
        Ok(EngineOutcome {
            response_text: "resolved".to_string(),
            input_tokens: None,
            output_tokens: None,
            cost_or_duration: CostOrDuration::None,
        })
    }

    fn name(&self) -> &'static str {
        "resolver"
    }
}

const GRAPH: &str = r#"
version: 1
tasks:
  - id: T-1
    title: First
    completed: true
  - id: T-2
    title: Second
    completed: true
    dependsOn: [T-1]
"#;

#[tokio::test]
async fn clean_merges_and_clean_review_finalize_to_base() {
    let mut store = TaskGraphStore::from_str(GRAPH).unwrap();
    let vcs = FakeVcs::new();
    vcs.seed_branch("orcharden/T-1/attempt-0", 1, vec![], true);
    vcs.seed_branch("orcharden/T-2/attempt-0", 1, vec![], true);
    vcs.seed_branch("integration/prd-1", 2, vec![], true);

    let resolver = NoopResolver;
    let reviewer = ReviewEngine {
        body: r#"{"issues":[]}"#.to_string(),
    };

    let dir = tempfile::tempdir().unwrap();
    let outcome = run_integration_pipeline(
        &vcs,
        &resolver,
        &reviewer,
        &mut store,
        "main",
        "integration/prd-1",
        dir.path(),
        "summary of reports",
    )
    .await
    .unwrap();

    match outcome {
        IntegrationOutcome::Finalized { records, finalize } => {
            assert_eq!(records.len(), 2);
            assert_eq!(finalize, orcharden_integrate::FinalizeOutcome::MergedToBase);
        }
        other => panic!("expected finalized outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn blockers_leave_integration_branch_and_append_fix_tasks() {
    let mut store = TaskGraphStore::from_str(GRAPH).unwrap();
    let vcs = FakeVcs::new();
    vcs.seed_branch("orcharden/T-1/attempt-0", 1, vec![], true);
    vcs.seed_branch("orcharden/T-2/attempt-0", 1, vec![], true);

    let resolver = NoopResolver;
    let reviewer = ReviewEngine {
        body: r#"{"issues":[{"severity":"blocker","description":"missing auth check"}]}"#.to_string(),
    };

    let dir = tempfile::tempdir().unwrap();
    let outcome = run_integration_pipeline(
        &vcs,
        &resolver,
        &reviewer,
        &mut store,
        "main",
        "integration/prd-1",
        dir.path(),
        "summary of reports",
    )
    .await
    .unwrap();

    match outcome {
        IntegrationOutcome::Finalized { finalize, .. } => match finalize {
            orcharden_integrate::FinalizeOutcome::FixTasksAppended(ids) => {
                assert_eq!(ids, vec!["FIX-001".to_string()]);
            }
            other => panic!("expected fix tasks appended, got {other:?}"),
        },
        other => panic!("expected finalized outcome, got {other:?}"),
    }
    assert!(store.get("FIX-001").is_some());
}
