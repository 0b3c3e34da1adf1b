//! Agent prompt assembly (C6 step 2), kept as a pure function over plain
//! data so it's testable without a worktree or engine invocation.

use orcharden_graph::TaskRecord;

const BASE_INSTRUCTIONS: &str = "\
You are an autonomous coding agent working inside an isolated git worktree. \
Implement the task described below, commit your changes as you go, and keep \
a running note of your progress.";

/// Build the full prompt for one task attempt: base instructions followed
/// by the task's identifying metadata.
pub fn assemble_prompt(task: &TaskRecord, effective_locks: &[String]) -> String {
    let mut prompt = String::from(BASE_INSTRUCTIONS);
    prompt.push_str("\n\nTask ID: ");
    prompt.push_str(&task.id);
    prompt.push_str("\nTitle: ");
    prompt.push_str(&task.title);

    if !task.touches.is_empty() {
        prompt.push_str("\nDeclared touches:\n");
        for path in &task.touches {
            prompt.push_str("  - ");
            prompt.push_str(path);
            prompt.push('\n');
        }
    }

    if !task.locks.is_empty() {
        prompt.push_str("Explicit locks: ");
        prompt.push_str(&task.locks.join(", "));
        prompt.push('\n');
    }

    if !effective_locks.is_empty() {
        prompt.push_str("Effective locks (explicit + inferred): ");
        prompt.push_str(&effective_locks.join(", "));
        prompt.push('\n');
    }

    if !task.merge_notes.is_empty() {
        prompt.push_str("\nMerge notes: ");
        prompt.push_str(&task.merge_notes);
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> TaskRecord {
        TaskRecord {
            id: "T-1".into(),
            title: "Add login form".into(),
            completed: false,
            depends_on: vec![],
            touches: vec!["src/login.rs".into()],
            locks: vec![],
            merge_notes: "prefer additive changes".into(),
            verify: vec![],
        }
    }

    #[test]
    fn includes_task_identity_and_touches() {
        let prompt = assemble_prompt(&task(), &["lockfile".to_string()]);
        assert!(prompt.contains("Task ID: T-1"));
        assert!(prompt.contains("Title: Add login form"));
        assert!(prompt.contains("src/login.rs"));
        assert!(prompt.contains("Effective locks (explicit + inferred): lockfile"));
    }

    #[test]
    fn omits_empty_sections() {
        let mut t = task();
        t.touches.clear();
        t.merge_notes.clear();
        let prompt = assemble_prompt(&t, &[]);
        assert!(!prompt.contains("Declared touches"));
        assert!(!prompt.contains("Merge notes"));
    }
}
