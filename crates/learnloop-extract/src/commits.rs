//! Learnings from commit messages.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use learnloop_core::{
    Categorizer, Category, Learning, LearningSource, MIN_CONFIDENCE, round_confidence,
};
use regex::Regex;

use crate::vcs::{CommitRecord, VersionControl};

const HASH_PREFIX_LEN: usize = 8;

/// Conventional-commit prefix families that override the categorizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPrefix {
    /// `fix:`, `bugfix:`, `hotfix:`
    Fix,
    /// `feat:`, `feature:`
    Feature,
    /// `docs:`, `doc:`
    Docs,
    /// `chore:`, `deps:`
    Maintenance,
}

impl CommitPrefix {
    /// Detect a prefix at the start of a commit subject (case-insensitive).
    pub fn detect(subject: &str) -> Option<Self> {
        static PREFIX: OnceLock<Option<Regex>> = OnceLock::new();
        let regex = PREFIX
            .get_or_init(|| {
                Regex::new(r"(?i)^(fix|bugfix|hotfix|feat|feature|docs|doc|chore|deps):").ok()
            })
            .as_ref()?;

        let captures = regex.captures(subject)?;
        match captures.get(1)?.as_str().to_lowercase().as_str() {
            "fix" | "bugfix" | "hotfix" => Some(Self::Fix),
            "feat" | "feature" => Some(Self::Feature),
            "docs" | "doc" => Some(Self::Docs),
            "chore" | "deps" => Some(Self::Maintenance),
            _ => None,
        }
    }

    /// Category this prefix forces, if any.
    pub fn category(&self) -> Option<Category> {
        match self {
            Self::Fix => Some(Category::ErrorFix),
            Self::Feature => None,
            Self::Docs => Some(Category::Pattern),
            Self::Maintenance => Some(Category::Dependency),
        }
    }

    /// Minimum confidence a commit with this prefix is raised to.
    pub fn confidence_floor(&self) -> f64 {
        match self {
            Self::Fix => 0.85,
            Self::Feature => 0.6,
            Self::Docs => 0.7,
            Self::Maintenance => 0.75,
        }
    }

    /// Apply the override. Confidence is only ever raised.
    pub fn apply(&self, category: Category, confidence: f64) -> (Category, f64) {
        (
            self.category().unwrap_or(category),
            confidence.max(self.confidence_floor()),
        )
    }
}

/// Turn commit records into learnings, dropping anything below
/// [`MIN_CONFIDENCE`].
pub fn learnings_from_commits(
    categorizer: &Categorizer<'_>,
    commits: &[CommitRecord],
    now: DateTime<Utc>,
) -> Vec<Learning> {
    commits
        .iter()
        .filter_map(|commit| learning_from_commit(categorizer, commit, now))
        .collect()
}

fn learning_from_commit(
    categorizer: &Categorizer<'_>,
    commit: &CommitRecord,
    now: DateTime<Utc>,
) -> Option<Learning> {
    let message = format!("{}\n{}", commit.subject, commit.body);
    let scored = categorizer.categorize(message.trim());

    let (category, confidence) = match CommitPrefix::detect(&commit.subject) {
        Some(prefix) => prefix.apply(scored.category, scored.confidence),
        None => (scored.category, scored.confidence),
    };

    if confidence < MIN_CONFIDENCE {
        tracing::debug!(hash = %commit.hash, confidence, "dropping low-confidence commit");
        return None;
    }

    let hash_prefix: String = commit.hash.chars().take(HASH_PREFIX_LEN).collect();
    let learning = Learning::new(
        LearningSource::Commit,
        category,
        commit.subject.as_str(),
        round_confidence(confidence),
        now,
    );
    let learning = match learning {
        Ok(learning) => learning.with_source_ref(hash_prefix),
        Err(error) => {
            tracing::debug!(hash = %commit.hash, %error, "skipping commit");
            return None;
        }
    };

    Some(if commit.body.is_empty() {
        learning
    } else {
        learning.with_details(commit.body.as_str())
    })
}

/// Read commits newer than `since` and extract learnings.
///
/// Returns an empty list when version control is unavailable.
pub fn extract_from_commits(
    vcs: &dyn VersionControl,
    categorizer: &Categorizer<'_>,
    since: &str,
) -> Vec<Learning> {
    match vcs.commits_since(since) {
        Ok(commits) => learnings_from_commits(categorizer, &commits, Utc::now()),
        Err(error) => {
            tracing::warn!(since, error = %format!("{error:#}"), "commit history unavailable");
            Vec::new()
        }
    }
}
