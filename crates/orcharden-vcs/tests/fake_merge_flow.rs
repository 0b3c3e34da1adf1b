use std::path::PathBuf;

use orcharden_vcs::{FakeVcs, VcsOps};

#[tokio::test]
async fn conflicted_merge_reports_false_not_error() {
    let vcs = FakeVcs::new();
    vcs.create_branch("feature", "main").await.unwrap();
    vcs.seed_branch("feature", 3, vec![PathBuf::from("src/lib.rs")], false);

    let clean = vcs.merge(&PathBuf::from("/tmp/wt"), "feature").await.unwrap();
    assert!(!clean);

    let count = vcs
        .commit_count(&PathBuf::from("/tmp/wt"), "feature", "main")
        .await
        .unwrap();
    assert_eq!(count, 3);
}

#[tokio::test]
async fn merging_an_unknown_branch_is_an_error() {
    let vcs = FakeVcs::new();
    let result = vcs.merge(&PathBuf::from("/tmp/wt"), "ghost").await;
    assert!(result.is_err());
}
