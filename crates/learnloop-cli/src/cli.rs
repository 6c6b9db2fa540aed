use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "learnloop")]
#[command(about = "Learning loop: capture project knowledge as documentation suggestions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root (defaults to CWD)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the storage directory and empty documents
    Init,

    /// Extract learnings from recent commit messages
    ExtractCommits {
        /// Time bound understood by `git log --since` (default from config)
        #[arg(long)]
        since: Option<String>,
    },

    /// Extract learnings from the diff between a base reference and HEAD
    ExtractDiff {
        /// Base reference (default from config)
        #[arg(long)]
        base: Option<String>,
    },

    /// Categorize free text
    Categorize {
        /// Text to categorize
        text: String,
    },

    /// List documentation targets for a learning
    FindTargets {
        /// Category (caveat, pattern, error_fix, dependency, command, architecture)
        #[arg(long)]
        category: String,

        /// Learning content
        #[arg(long)]
        content: String,
    },

    /// Print the number of pending suggestions
    PendingCount,

    /// List pending suggestions
    ListSuggestions,

    /// Show applied and discarded suggestions
    History,

    /// Record a learning as a new pending suggestion
    AddSuggestion {
        /// Category (caveat, pattern, error_fix, dependency, command, architecture)
        #[arg(long)]
        category: String,

        /// Learning content
        #[arg(long)]
        content: String,

        /// Preferred target document
        #[arg(long, default_value = "CLAUDE.md")]
        target: String,

        /// Confidence in [0.0, 1.0]
        #[arg(long, default_value_t = 0.7)]
        confidence: f64,
    },

    /// Change the status of a suggestion
    MarkSuggestion {
        /// Suggestion ID
        id: String,

        /// New status (pending, applied, skipped, discarded)
        status: String,
    },

    /// Remove resolved suggestions from the pending document
    ClearResolved,
}
