//! Dependency-ordered merging (C8 step 2): merge every completed task's
//! branch into the integration branch in an order consistent with the
//! DAG, invoking a conflict-resolution agent when a merge leaves
//! conflict markers behind.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

use orcharden_core::Result;
use orcharden_engine::{Engine, ExecuteOptions};
use orcharden_graph::TaskRecord;
use orcharden_vcs::VcsOps;

/// Outcome of merging one task's branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged,
    /// Conflicts remained after the resolver agent ran; the branch was
    /// left unmerged and its worktree/branch preserved for inspection.
    Unresolved { conflicted_paths: Vec<String> },
}

/// A topological order over `tasks`, ties broken by declaration order
/// (the order the tasks appear in the slice) — the same tie-break
/// convention the scheduler uses for admission.
pub fn topological_order(tasks: &[TaskRecord]) -> Vec<String> {
    let index: HashMap<&str, usize> = tasks.iter().enumerate().map(|(i, t)| (t.id.as_str(), i)).collect();
    let mut in_degree: HashMap<&str, usize> = tasks.iter().map(|t| (t.id.as_str(), 0)).collect();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for task in tasks {
        for dep in &task.depends_on {
            if index.contains_key(dep.as_str()) {
                *in_degree.get_mut(task.id.as_str()).unwrap() += 1;
                dependents.entry(dep.as_str()).or_default().push(task.id.as_str());
            }
        }
    }

    let mut ready: VecDeque<&str> = tasks
        .iter()
        .map(|t| t.id.as_str())
        .filter(|id| in_degree[id] == 0)
        .collect();
    // Deterministic initial order: declaration order among in-degree-0 nodes.
    let mut ready_vec: Vec<&str> = ready.drain(..).collect();
    ready_vec.sort_by_key(|id| index[id]);
    let mut queue: VecDeque<&str> = ready_vec.into();

    let mut order = Vec::with_capacity(tasks.len());
    let mut visited: HashSet<&str> = HashSet::new();
    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        order.push(id.to_string());
        if let Some(next) = dependents.get(id) {
            let mut newly_ready: Vec<&str> = Vec::new();
            for &dependent in next {
                let degree = in_degree.get_mut(dependent).unwrap();
                *degree -= 1;
                if *degree == 0 {
                    newly_ready.push(dependent);
                }
            }
            newly_ready.sort_by_key(|id| index[id]);
            for id in newly_ready {
                queue.push_back(id);
            }
        }
    }
    order
}

/// Merge one task's branch into the integration worktree, invoking the
/// conflict-resolution engine if the merge leaves conflicts.
pub async fn merge_task_branch(
    vcs: &dyn VcsOps,
    resolver: &dyn Engine,
    integration_worktree: &Path,
    task: &TaskRecord,
    branch: &str,
) -> Result<MergeOutcome> {
    let clean = vcs.merge(integration_worktree, branch).await?;
    if clean {
        vcs.delete_branch(branch).await?;
        return Ok(MergeOutcome::Merged);
    }

    let conflicted_paths: Vec<String> = vcs
        .changed_files(integration_worktree, branch, "HEAD")
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect();

    let prompt = format!(
        "Resolve the merge conflicts in the following paths, using the task's merge notes \
         as guidance, then stage and commit the resolution.\n\nPaths:\n{}\n\nMerge notes: {}",
        conflicted_paths.join("\n"),
        if task.merge_notes.is_empty() {
            "(none provided)"
        } else {
            &task.merge_notes
        }
    );

    let output_path = integration_worktree.join(".orcharden-conflict-resolution.txt");
    resolver
        .execute(&prompt, &output_path, &ExecuteOptions::default())
        .await?;

    let still_clean = vcs.is_clean(integration_worktree).await.unwrap_or(false);
    if still_clean {
        vcs.delete_branch(branch).await?;
        Ok(MergeOutcome::Merged)
    } else {
        vcs.merge_abort(integration_worktree).await?;
        Ok(MergeOutcome::Unresolved { conflicted_paths })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, deps: &[&str]) -> TaskRecord {
        TaskRecord {
            id: id.into(),
            title: id.into(),
            completed: true,
            depends_on: deps.iter().map(|s| s.to_string()).collect(),
            touches: vec![],
            locks: vec![],
            merge_notes: String::new(),
            verify: vec![],
        }
    }

    #[test]
    fn orders_dependents_after_their_dependencies() {
        let tasks = vec![task("B", &["A"]), task("A", &[]), task("C", &["A", "B"])];
        let order = topological_order(&tasks);
        assert_eq!(order, vec!["A".to_string(), "B".to_string(), "C".to_string()]);
    }

    #[test]
    fn ties_break_by_declaration_order() {
        let tasks = vec![task("X", &[]), task("Y", &[])];
        let order = topological_order(&tasks);
        assert_eq!(order, vec!["X".to_string(), "Y".to_string()]);
    }
}
