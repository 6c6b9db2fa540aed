//! Persistent suggestion storage.
//!
//! A project keeps two JSON documents in its storage directory:
//!
//! ```text
//! .learning-loop/
//! ├── .lock                      (flock serializing writers)
//! ├── config.toml                (optional, see learnloop-config)
//! ├── pending-suggestions.json   (every suggestion, status mutated in place)
//! └── history.json               (applied / discarded archive)
//! ```
//!
//! Every operation is a full read-modify-write of the affected document.
//! Writers hold an exclusive `flock` on `.lock` for the whole cycle, and
//! each document write is temp-file + rename.

pub mod document;

use anyhow::{Context, Result};
use chrono::Utc;
use learnloop_core::{LoopError, Suggestion, SuggestionStatus};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub use document::{HistoryDocument, PendingDocument};

use document::{read_document, write_document};

pub const PENDING_FILE: &str = "pending-suggestions.json";
pub const HISTORY_FILE: &str = "history.json";
const LOCK_FILE: &str = ".lock";

/// Outcome of [`SuggestionStore::init`].
#[derive(Debug, Clone, Serialize)]
pub struct InitReport {
    pub storage_dir: PathBuf,
    pub created_files: Vec<PathBuf>,
    pub status: &'static str,
}

/// Owns the pending and history documents under one storage directory.
#[derive(Debug, Clone)]
pub struct SuggestionStore {
    storage_dir: PathBuf,
}

impl SuggestionStore {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
        }
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn pending_path(&self) -> PathBuf {
        self.storage_dir.join(PENDING_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.storage_dir.join(HISTORY_FILE)
    }

    // -- Write operations (flock-protected) --------------------------------

    /// Create the storage directory and any missing document.
    pub fn init(&self) -> Result<InitReport> {
        self.with_write_lock(|| {
            let created_files = self.init_inner()?;
            Ok(InitReport {
                storage_dir: self.storage_dir.clone(),
                created_files,
                status: "initialized",
            })
        })
    }

    /// Append a suggestion to the pending document.
    ///
    /// Fails with [`LoopError::DuplicateSuggestion`] if the id is taken.
    pub fn save(&self, suggestion: &Suggestion) -> Result<()> {
        self.with_write_lock(|| {
            self.init_inner()?;
            let mut pending = self.load_pending()?;

            if pending.suggestions.iter().any(|s| s.id == suggestion.id) {
                return Err(LoopError::DuplicateSuggestion(suggestion.id.clone()).into());
            }

            pending.suggestions.push(suggestion.clone());
            pending.updated = Utc::now();
            write_document(&self.pending_path(), &pending)?;

            tracing::debug!(id = %suggestion.id, "saved suggestion");
            Ok(())
        })
    }

    /// Move a suggestion to `status`.
    ///
    /// Any status other than `pending` stamps `resolved_at`. `applied` and
    /// `discarded` also append the updated record to the matching history
    /// list before the pending document is rewritten. `skipped` is not
    /// archived. The record always stays in the pending document.
    pub fn update_status(&self, id: &str, status: SuggestionStatus) -> Result<Suggestion> {
        self.with_write_lock(|| {
            let mut pending = self.load_pending()?;

            let Some(suggestion) = pending.suggestions.iter_mut().find(|s| s.id == id) else {
                return Err(LoopError::SuggestionNotFound(id.to_string()).into());
            };

            let now = Utc::now();
            suggestion.status = status;
            suggestion.resolved_at = status.is_resolved().then_some(now);
            let updated = suggestion.clone();

            if status.is_archived() {
                let mut history = self.load_history()?;
                match status {
                    SuggestionStatus::Applied => history.applied.push(updated.clone()),
                    _ => history.discarded.push(updated.clone()),
                }
                write_document(&self.history_path(), &history)?;
            }

            pending.updated = now;
            write_document(&self.pending_path(), &pending)?;

            tracing::debug!(id, %status, "updated suggestion status");
            Ok(updated)
        })
    }

    /// Drop every non-pending suggestion from the pending document.
    ///
    /// History is untouched. Returns the number of records removed.
    pub fn compact(&self) -> Result<usize> {
        self.with_write_lock(|| {
            let mut pending = self.load_pending()?;

            let before = pending.suggestions.len();
            pending
                .suggestions
                .retain(|s| s.status == SuggestionStatus::Pending);
            let removed = before - pending.suggestions.len();

            pending.updated = Utc::now();
            write_document(&self.pending_path(), &pending)?;

            tracing::debug!(removed, "compacted pending suggestions");
            Ok(removed)
        })
    }

    // -- Read operations (no lock needed) ----------------------------------

    /// Suggestions whose status is `pending`, in append order.
    pub fn list_pending(&self) -> Result<Vec<Suggestion>> {
        Ok(self
            .load_pending()?
            .suggestions
            .into_iter()
            .filter(|s| s.status == SuggestionStatus::Pending)
            .collect())
    }

    /// Number of pending suggestions.
    pub fn count(&self) -> Result<usize> {
        Ok(self.list_pending()?.len())
    }

    /// Every suggestion in the pending document, whatever its status.
    pub fn list_all(&self) -> Result<Vec<Suggestion>> {
        Ok(self.load_pending()?.suggestions)
    }

    /// Look up one suggestion by id.
    pub fn get(&self, id: &str) -> Result<Suggestion> {
        self.load_pending()?
            .suggestions
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| LoopError::SuggestionNotFound(id.to_string()).into())
    }

    /// The history document, or an empty one if none exists yet.
    pub fn history(&self) -> Result<HistoryDocument> {
        self.load_history()
    }

    // -- Internal helpers --------------------------------------------------

    fn load_pending(&self) -> Result<PendingDocument> {
        Ok(read_document(&self.pending_path())?
            .unwrap_or_else(|| PendingDocument::new(Utc::now())))
    }

    fn load_history(&self) -> Result<HistoryDocument> {
        Ok(read_document(&self.history_path())?
            .unwrap_or_else(|| HistoryDocument::new(Utc::now())))
    }

    /// Write whichever documents are missing. Caller holds the lock.
    fn init_inner(&self) -> Result<Vec<PathBuf>> {
        let mut created = Vec::new();
        let now = Utc::now();

        let pending_path = self.pending_path();
        if !pending_path.exists() {
            write_document(&pending_path, &PendingDocument::new(now))?;
            created.push(pending_path);
        }

        let history_path = self.history_path();
        if !history_path.exists() {
            write_document(&history_path, &HistoryDocument::new(now))?;
            created.push(history_path);
        }

        Ok(created)
    }

    /// Acquire a write lock on the storage directory, execute `f`, then release.
    fn with_write_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        std::fs::create_dir_all(&self.storage_dir).with_context(|| {
            format!(
                "Failed to create storage directory: {}",
                self.storage_dir.display()
            )
        })?;

        let lock_path = self.storage_dir.join(LOCK_FILE);
        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;
        let mut lock = fd_lock::RwLock::new(lock_file);
        let _guard = lock
            .write()
            .map_err(|e| anyhow::anyhow!("Failed to acquire suggestion store lock: {e}"))?;

        f()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
