//! Learnings from change history and unified diffs.
//!
//! Three independent heuristics run over the same input and their results
//! are concatenated without dedup:
//!
//! 1. files touched in 3+ commits of the range → one `diff_analysis` learning;
//! 2. marker comments (`TODO:`, `FIXME:`, ...) on added lines;
//! 3. dependencies added to a `package.json` manifest.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use learnloop_core::{Category, Learning, LearningSource};
use regex::Regex;

use crate::vcs::VersionControl;

const ITERATION_THRESHOLD: usize = 3;
const ITERATION_SUMMARY_FILES: usize = 5;
const ITERATION_LISTED_FILES: usize = 10;
const ITERATION_CONFIDENCE: f64 = 0.55;
const ITERATION_DETAILS: &str =
    "These files were modified multiple times, possibly indicating tricky areas";

const MANIFEST_FILE: &str = "package.json";
const MAX_DEPENDENCY_MATCHES: usize = 5;
const DEPENDENCY_CONFIDENCE: f64 = 0.8;
const TYPES_SCOPE: &str = "@types/";

/// Marker keyword, category, confidence. Emission follows this order.
const MARKERS: [(&str, Category, f64); 5] = [
    ("TODO", Category::Caveat, 0.8),
    ("FIXME", Category::ErrorFix, 0.85),
    ("HACK", Category::Caveat, 0.9),
    ("NOTE", Category::Caveat, 0.7),
    ("XXX", Category::Caveat, 0.75),
];

/// Text gathered from version control for one diff extraction.
#[derive(Debug, Clone, Default)]
pub struct DiffInput {
    /// Range label recorded as `source_ref`, e.g. `HEAD~5..HEAD`.
    pub range: String,
    /// Name-only change listing, one entry per file per commit.
    pub changed_files: Vec<String>,
    /// Unified diff text.
    pub unified_diff: String,
}

/// Run all diff heuristics.
pub fn learnings_from_diff(input: &DiffInput, now: DateTime<Utc>) -> Vec<Learning> {
    let mut learnings = Vec::new();
    learnings.extend(iteration_learning(input, now));
    learnings.extend(marker_learnings(input, now));
    learnings.extend(dependency_learnings(&input.unified_diff, now));
    learnings
}

/// Query version control for `base..HEAD` and extract learnings.
///
/// Returns an empty list when any query fails.
pub fn extract_from_diff(vcs: &dyn VersionControl, base: &str) -> Vec<Learning> {
    let gathered = vcs.changed_files(base, "HEAD").and_then(|changed_files| {
        Ok(DiffInput {
            range: format!("{base}..HEAD"),
            changed_files,
            unified_diff: vcs.unified_diff(base)?,
        })
    });

    match gathered {
        Ok(input) => learnings_from_diff(&input, Utc::now()),
        Err(error) => {
            tracing::warn!(base, error = %format!("{error:#}"), "diff unavailable");
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Heuristics
// ---------------------------------------------------------------------------

fn iteration_learning(input: &DiffInput, now: DateTime<Utc>) -> Option<Learning> {
    // First-touched order, so the summary is stable across runs.
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for file in &input.changed_files {
        let count = counts.entry(file.as_str()).or_insert(0);
        if *count == 0 {
            order.push(file.as_str());
        }
        *count += 1;
    }

    let iterated: Vec<&str> = order
        .into_iter()
        .filter(|file| counts.get(file).copied().unwrap_or(0) >= ITERATION_THRESHOLD)
        .collect();
    if iterated.is_empty() {
        return None;
    }

    let summary = iterated
        .iter()
        .take(ITERATION_SUMMARY_FILES)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    let files = iterated
        .iter()
        .take(ITERATION_LISTED_FILES)
        .map(|file| file.to_string())
        .collect();

    Learning::new(
        LearningSource::DiffAnalysis,
        Category::Caveat,
        format!("Multiple iterations on: {summary}"),
        ITERATION_CONFIDENCE,
        now,
    )
    .ok()
    .map(|learning| {
        learning
            .with_source_ref(input.range.as_str())
            .with_details(ITERATION_DETAILS)
            .with_files(files)
    })
}

fn marker_patterns() -> &'static [(Regex, Category, f64)] {
    static PATTERNS: OnceLock<Vec<(Regex, Category, f64)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        MARKERS
            .iter()
            .filter_map(|(marker, category, confidence)| {
                Regex::new(&format!(r"^\+.*{marker}:\s*(.+)"))
                    .ok()
                    .map(|regex| (regex, *category, *confidence))
            })
            .collect()
    })
}

fn marker_learnings(input: &DiffInput, now: DateTime<Utc>) -> Vec<Learning> {
    let added: Vec<&str> = added_lines(&input.unified_diff)
        .map(|(_, line)| line)
        .collect();

    let mut learnings = Vec::new();
    for (pattern, category, confidence) in marker_patterns() {
        for line in &added {
            let Some(text) = pattern
                .captures(line)
                .and_then(|captures| captures.get(1))
                .map(|m| m.as_str().trim())
            else {
                continue;
            };
            match Learning::new(LearningSource::DiffComment, *category, text, *confidence, now) {
                Ok(learning) => learnings.push(learning.with_source_ref(input.range.as_str())),
                Err(error) => tracing::debug!(%error, line, "skipping marker comment"),
            }
        }
    }
    learnings
}

fn dependency_learnings(diff: &str, now: DateTime<Utc>) -> Vec<Learning> {
    static DEPENDENCY: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(pattern) = DEPENDENCY
        .get_or_init(|| Regex::new(r#"^\+\s*"([^"]+)":\s*"([^"]+)""#).ok())
        .as_ref()
    else {
        return Vec::new();
    };

    added_lines(diff)
        .filter(|(path, _)| {
            path.is_some_and(|p| p.rsplit('/').next() == Some(MANIFEST_FILE))
        })
        .filter_map(|(path, line)| {
            let captures = pattern.captures(line)?;
            Some((path?, captures.get(1)?.as_str(), captures.get(2)?.as_str()))
        })
        .take(MAX_DEPENDENCY_MATCHES)
        .filter(|(_, name, _)| !name.starts_with(TYPES_SCOPE))
        .filter_map(|(path, name, version)| {
            Learning::new(
                LearningSource::DiffDependency,
                Category::Dependency,
                format!("Added dependency: {name}@{version}"),
                DEPENDENCY_CONFIDENCE,
                now,
            )
            .ok()
            .map(|learning| learning.with_source_ref(path))
        })
        .collect()
}

/// Added lines of a unified diff, paired with the post-image path of the
/// file they belong to (`None` before the first file header).
fn added_lines(diff: &str) -> impl Iterator<Item = (Option<&str>, &str)> {
    let mut current: Option<&str> = None;
    diff.lines().filter_map(move |line| {
        if let Some(header) = line.strip_prefix("+++ ") {
            let header = header.trim_end();
            current = header.strip_prefix("b/").or(Some(header));
            return None;
        }
        if line.starts_with("diff --git ") {
            current = None;
            return None;
        }
        line.starts_with('+').then_some((current, line))
    })
}
