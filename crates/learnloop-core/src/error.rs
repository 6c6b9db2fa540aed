#[derive(thiserror::Error, Debug)]
pub enum LoopError {
    #[error("Suggestion {0} not found")]
    SuggestionNotFound(String),

    #[error("Suggestion {0} already exists")]
    DuplicateSuggestion(String),

    #[error(
        "Invalid category '{0}'. Valid: caveat, pattern, error_fix, dependency, command, architecture"
    )]
    InvalidCategory(String),

    #[error("Invalid suggestion status '{0}'. Valid: pending, applied, skipped, discarded")]
    InvalidStatus(String),

    #[error(
        "Invalid learning source '{0}'. Valid: commit, diff_analysis, diff_comment, diff_dependency, user"
    )]
    InvalidSource(String),

    #[error("Confidence {0} is outside [0.0, 1.0]")]
    ConfidenceOutOfRange(f64),

    #[error("Learning content must not be empty")]
    EmptyContent,
}
