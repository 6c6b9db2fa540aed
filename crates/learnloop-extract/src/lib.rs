//! Learning extraction from version-control history.
//!
//! The heuristics in [`commits`] and [`diff`] are pure functions over text.
//! The `extract_*` entry points pull that text from a [`VersionControl`]
//! collaborator and degrade to an empty result when it fails.

pub mod commits;
pub mod diff;
pub mod vcs;

pub use commits::{CommitPrefix, extract_from_commits, learnings_from_commits};
pub use diff::{DiffInput, extract_from_diff, learnings_from_diff};
pub use vcs::{CommitRecord, GitCli, VersionControl};
