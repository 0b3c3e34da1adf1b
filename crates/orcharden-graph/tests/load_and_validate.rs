use std::io::Write;

use orcharden_graph::TaskGraphStore;

#[tokio::test]
async fn loads_a_graph_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "version: 1\ntasks:\n  - id: T-1\n    title: Build the thing\n  - id: T-2\n    title: Ship it\n    dependsOn: [T-1]\n"
    )
    .unwrap();

    let store = TaskGraphStore::load(file.path()).await.unwrap();
    assert_eq!(store.task_ids(), vec!["T-1", "T-2"]);
    assert_eq!(store.depends_on("T-2"), &["T-1".to_string()]);
}

#[tokio::test]
async fn rejects_a_graph_with_multiple_defects() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "version: 1\ntasks:\n  - id: T-1\n    title: \"\"\n    dependsOn: [T-missing]\n"
    )
    .unwrap();

    let err = TaskGraphStore::load(file.path()).await.unwrap_err();
    match err {
        orcharden_core::Error::Validation(messages) => {
            assert!(messages.len() >= 2);
            assert!(messages.iter().any(|m| m.contains("missing a title")));
            assert!(messages.iter().any(|m| m.contains("does not exist")));
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}
