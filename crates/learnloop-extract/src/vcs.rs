//! Version-control collaborator.
//!
//! [`VersionControl`] is the seam the extractor reads through; [`GitCli`]
//! implements it by shelling out to `git` in the project root.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Field separator inside a `git log` record (ASCII unit separator).
const FIELD_SEP: char = '\u{1f}';
/// Record separator between `git log` entries (ASCII record separator).
const RECORD_SEP: char = '\u{1e}';

/// One commit as read from the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub hash: String,
    pub subject: String,
    pub body: String,
}

impl CommitRecord {
    pub fn new(hash: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Queries the extractor needs from version control.
pub trait VersionControl {
    /// Commits newer than `since` (anything `git log --since` accepts).
    fn commits_since(&self, since: &str) -> Result<Vec<CommitRecord>>;

    /// File names touched by each commit in `base..head`, one entry per
    /// touch, so a file changed in three commits appears three times.
    fn changed_files(&self, base: &str, head: &str) -> Result<Vec<String>>;

    /// Unified diff of the working tree against `base`.
    fn unified_diff(&self, base: &str) -> Result<String>;
}

/// Validate a revision spec to prevent option injection.
///
/// Rejects strings starting with `-` (would be parsed as git options).
fn validate_revision(rev: &str) -> Result<()> {
    if rev.is_empty() {
        anyhow::bail!("Revision must not be empty");
    }
    if rev.starts_with('-') {
        anyhow::bail!("Invalid revision: '{rev}' (must not start with '-')");
    }
    Ok(())
}

/// [`VersionControl`] backed by the `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_root: PathBuf,
}

impl GitCli {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .output()
            .with_context(|| format!("Failed to run git {}", args.first().unwrap_or(&"")))?;

        if !output.status.success() {
            anyhow::bail!(
                "git {} failed (exit {}): {}",
                args.join(" "),
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl VersionControl for GitCli {
    fn commits_since(&self, since: &str) -> Result<Vec<CommitRecord>> {
        let since_arg = format!("--since={since}");
        let stdout = self.run(&["log", &since_arg, "--format=%H%x1f%s%x1f%b%x1e"])?;
        Ok(parse_commit_log(&stdout))
    }

    fn changed_files(&self, base: &str, head: &str) -> Result<Vec<String>> {
        validate_revision(base)?;
        validate_revision(head)?;
        let range = format!("{base}..{head}");
        let stdout = self.run(&["log", &range, "--name-only", "--format="])?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn unified_diff(&self, base: &str) -> Result<String> {
        validate_revision(base)?;
        self.run(&["diff", base, "--"])
    }
}

/// Parse `git log --format=%H%x1f%s%x1f%b%x1e` output.
pub fn parse_commit_log(raw: &str) -> Vec<CommitRecord> {
    raw.split(RECORD_SEP)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let mut fields = entry.splitn(3, FIELD_SEP);
            let hash = fields.next()?.trim();
            let subject = fields.next()?.trim();
            let body = fields.next().unwrap_or("").trim();
            if hash.is_empty() {
                return None;
            }
            Some(CommitRecord::new(hash, subject, body))
        })
        .collect()
}
