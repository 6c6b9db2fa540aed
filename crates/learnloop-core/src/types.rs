use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LoopError;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Fixed learning taxonomy.
///
/// Declaration order of [`Category::ALL`] is the tie-break order used by the
/// categorizer: earlier categories win equal scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Caveat,
    ErrorFix,
    Dependency,
    Pattern,
    Command,
    Architecture,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Caveat,
        Category::ErrorFix,
        Category::Dependency,
        Category::Pattern,
        Category::Command,
        Category::Architecture,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Caveat => "caveat",
            Self::ErrorFix => "error_fix",
            Self::Dependency => "dependency",
            Self::Pattern => "pattern",
            Self::Command => "command",
            Self::Architecture => "architecture",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = LoopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "caveat" => Ok(Self::Caveat),
            "error_fix" => Ok(Self::ErrorFix),
            "dependency" => Ok(Self::Dependency),
            "pattern" => Ok(Self::Pattern),
            "command" => Ok(Self::Command),
            "architecture" => Ok(Self::Architecture),
            _ => Err(LoopError::InvalidCategory(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Learning
// ---------------------------------------------------------------------------

/// Where a learning was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningSource {
    Commit,
    DiffAnalysis,
    DiffComment,
    DiffDependency,
    User,
}

impl std::fmt::Display for LearningSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Commit => write!(f, "commit"),
            Self::DiffAnalysis => write!(f, "diff_analysis"),
            Self::DiffComment => write!(f, "diff_comment"),
            Self::DiffDependency => write!(f, "diff_dependency"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for LearningSource {
    type Err = LoopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "commit" => Ok(Self::Commit),
            "diff_analysis" => Ok(Self::DiffAnalysis),
            "diff_comment" => Ok(Self::DiffComment),
            "diff_dependency" => Ok(Self::DiffDependency),
            "user" => Ok(Self::User),
            _ => Err(LoopError::InvalidSource(s.to_string())),
        }
    }
}

/// A candidate fact worth documenting. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Learning {
    pub source: LearningSource,
    /// Commit hash prefix, commit range, or file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
    pub category: Category,
    /// Short human-readable summary.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub confidence: f64,
    pub extracted_at: DateTime<Utc>,
    /// Touched files (diff analysis only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

impl Learning {
    /// Create a learning, rejecting empty content and out-of-range confidence.
    pub fn new(
        source: LearningSource,
        category: Category,
        content: impl Into<String>,
        confidence: f64,
        extracted_at: DateTime<Utc>,
    ) -> Result<Self, LoopError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(LoopError::EmptyContent);
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(LoopError::ConfidenceOutOfRange(confidence));
        }
        Ok(Self {
            source,
            source_ref: None,
            category,
            content,
            details: None,
            confidence,
            extracted_at,
            files: Vec::new(),
        })
    }

    pub fn with_source_ref(mut self, source_ref: impl Into<String>) -> Self {
        self.source_ref = Some(source_ref.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPriority {
    /// Root documentation file.
    Primary,
    /// Subdirectory documentation file whose directory is named in the content.
    Secondary,
    /// Agent-capability document.
    Tertiary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    ClaudeMd,
    Agent,
}

/// A candidate destination document plus the section to append under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Path relative to the project root, `/`-separated.
    pub path: String,
    pub section: String,
    pub priority: TargetPriority,
    #[serde(rename = "type")]
    pub kind: TargetKind,
}

// ---------------------------------------------------------------------------
// Suggestion
// ---------------------------------------------------------------------------

/// Status of a suggestion through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Applied,
    Skipped,
    Discarded,
}

impl SuggestionStatus {
    /// Whether a transition into this status stamps `resolved_at`.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether a transition into this status copies the record into history.
    pub fn is_archived(&self) -> bool {
        matches!(self, Self::Applied | Self::Discarded)
    }
}

impl std::fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Applied => write!(f, "applied"),
            Self::Skipped => write!(f, "skipped"),
            Self::Discarded => write!(f, "discarded"),
        }
    }
}

impl std::str::FromStr for SuggestionStatus {
    type Err = LoopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "applied" => Ok(Self::Applied),
            "skipped" => Ok(Self::Skipped),
            "discarded" => Ok(Self::Discarded),
            _ => Err(LoopError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionPriority {
    High,
    Medium,
    Low,
}

/// A persisted, actionable proposal to edit a document.
///
/// `learning` and `target` are embedded in full so history entries stay
/// self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub created: DateTime<Utc>,
    pub learning: Learning,
    pub target: Target,
    pub status: SuggestionStatus,
    /// Computed once at creation, never recomputed.
    pub priority: SuggestionPriority,
    /// Preview: section heading, blank line, `+ ` formatted content.
    pub diff: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
