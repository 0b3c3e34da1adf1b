//! Version control: the injectable [`VcsOps`] port, its real `git`-backed
//! implementation, an in-memory fake for tests, and the worktree
//! lifecycle built on top.
//!
//! # Main types
//!
//! - [`VcsOps`] — the trait the supervisor and integration pipeline
//!   depend on.
//! - [`GitVcs`] — the real implementation, shelling out to `git`.
//! - [`FakeVcs`] — an in-memory implementation for tests.
//! - [`WorktreeManager`] — provisioning/teardown sequencing around a
//!   `VcsOps`.

mod fake;
mod git;
mod ops;
mod worktree;

pub use fake::FakeVcs;
pub use git::GitVcs;
pub use ops::VcsOps;
pub use worktree::{branch_name, worktree_path, WorktreeManager};
