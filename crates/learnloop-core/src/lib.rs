//! Domain model, categorizer and suggestion builder for learnloop.
//!
//! Everything in this crate is pure: no filesystem or process access.
//! Storage lives in `learnloop-store`, extraction in `learnloop-extract`.

pub mod error;
pub mod suggestion;
pub mod taxonomy;
pub mod types;

pub use error::LoopError;
pub use suggestion::{build_suggestion, build_suggestion_at, compute_priority, format_preview};
pub use taxonomy::{Categorization, Categorizer, Taxonomy};
pub use types::{
    Category, Learning, LearningSource, Suggestion, SuggestionPriority, SuggestionStatus, Target,
    TargetKind, TargetPriority,
};

/// Learnings below this confidence are never surfaced by the extractor.
pub const MIN_CONFIDENCE: f64 = 0.5;

/// Round a confidence value to two decimal places.
pub fn round_confidence(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
