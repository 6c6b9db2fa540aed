//! On-disk JSON documents and the helpers that read and write them.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use learnloop_core::Suggestion;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// `pending-suggestions.json`: suggestions in append order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingDocument {
    pub suggestions: Vec<Suggestion>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl PendingDocument {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            suggestions: Vec::new(),
            created: now,
            updated: now,
        }
    }
}

/// `history.json`: append-only archive of applied and discarded suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryDocument {
    pub applied: Vec<Suggestion>,
    pub discarded: Vec<Suggestion>,
    pub created: DateTime<Utc>,
}

impl HistoryDocument {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            applied: Vec::new(),
            discarded: Vec::new(),
            created: now,
        }
    }
}

/// Read a JSON document.
///
/// Missing and malformed files both yield `Ok(None)`; only I/O failures
/// other than "not found" are errors.
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    match serde_json::from_str(&content) {
        Ok(document) => Ok(Some(document)),
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                %error,
                "malformed document, treating as empty"
            );
            Ok(None)
        }
    }
}

/// Serialize `document` as pretty JSON and replace `path` atomically.
pub(crate) fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    let mut json =
        serde_json::to_string_pretty(document).context("Failed to serialize document")?;
    json.push('\n');
    atomic_write(path, json.as_bytes())
}

/// Write data to a file atomically using temp-file + rename.
fn atomic_write(target: &Path, data: &[u8]) -> Result<()> {
    let parent = target.parent().context("Target path has no parent")?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;

    std::io::Write::write_all(&mut tmp, data).context("Failed to write temp file")?;

    tmp.persist(target)
        .with_context(|| format!("Failed to persist to {}", target.display()))?;

    Ok(())
}
