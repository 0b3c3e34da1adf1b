//! Lock inference (C3): derive mutual-exclusion lock names from the files
//! a task touches, so the scheduler can serialize tasks that would
//! otherwise race on the same package manifest, migration set, or config.

use crate::types::TaskRecord;

/// Ordered, first-match-wins matchers from path fragment to lock name.
/// Order is significant: a path under both a config dir and a migrations
/// dir (unlikely, but not forbidden) takes the earlier match.
const PATTERNS: &[(&str, &str)] = &[
    ("Cargo.lock", "lockfile"),
    ("Cargo.toml", "lockfile"),
    ("package.json", "lockfile"),
    ("package-lock.json", "lockfile"),
    ("yarn.lock", "lockfile"),
    ("pnpm-lock.yaml", "lockfile"),
    ("go.sum", "lockfile"),
    ("go.mod", "lockfile"),
    ("migrations/", "db-migrations"),
    ("schema/", "db-schema"),
    ("router/", "router"),
    ("routes/", "router"),
    ("config/", "global-config"),
    ("settings/", "global-config"),
    (".env", "global-config"),
];

/// Infer the lock name for a single touched path.
///
/// Falls back to the path's top-level segment, or `"root"` for a bare
/// filename with no directory component.
pub fn infer_lock(path: &str) -> String {
    for (pattern, lock) in PATTERNS {
        if path.contains(pattern) {
            return (*lock).to_string();
        }
    }
    match path.split('/').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => "root".to_string(),
    }
}

/// The stable-ordered, deduplicated union of a task's explicit `locks`
/// and the locks inferred from its `touches` list. Explicit locks are
/// listed first, in declared order, followed by inferred locks in the
/// order their source paths appear in `touches`.
pub fn effective_locks(task: &TaskRecord) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for lock in &task.locks {
        if seen.insert(lock.clone()) {
            out.push(lock.clone());
        }
    }
    for path in &task.touches {
        let lock = infer_lock(path);
        if seen.insert(lock.clone()) {
            out.push(lock);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_files_map_to_lockfile() {
        assert_eq!(infer_lock("Cargo.toml"), "lockfile");
        assert_eq!(infer_lock("backend/go.sum"), "lockfile");
    }

    #[test]
    fn migrations_and_schema_are_distinct_locks() {
        assert_eq!(infer_lock("db/migrations/0001_init.sql"), "db-migrations");
        assert_eq!(infer_lock("db/schema/users.sql"), "db-schema");
    }

    #[test]
    fn config_and_env_share_a_lock() {
        assert_eq!(infer_lock("config/app.yaml"), "global-config");
        assert_eq!(infer_lock(".env"), "global-config");
    }

    #[test]
    fn unmatched_path_uses_top_level_segment() {
        assert_eq!(infer_lock("crates/orcharden-graph/src/lib.rs"), "crates");
    }

    #[test]
    fn bare_filename_falls_back_to_root() {
        assert_eq!(infer_lock("README.md"), "root");
    }

    #[test]
    fn effective_locks_dedups_and_preserves_order() {
        let task = TaskRecord {
            id: "T-1".into(),
            title: "t".into(),
            completed: false,
            depends_on: vec![],
            touches: vec!["config/app.yaml".into(), "src/main.rs".into()],
            locks: vec!["custom-lock".into(), "custom-lock".into()],
            merge_notes: String::new(),
            verify: vec![],
        };
        assert_eq!(
            effective_locks(&task),
            vec![
                "custom-lock".to_string(),
                "global-config".to_string(),
                "src".to_string(),
            ]
        );
    }
}
