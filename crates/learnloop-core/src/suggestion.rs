//! Build suggestions from a learning and a chosen target.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::types::{
    Category, Learning, Suggestion, SuggestionPriority, SuggestionStatus, Target, TargetPriority,
};

const ID_PREFIX: &str = "sug_";
const ID_HASH_LENGTH: usize = 6;

/// Priority is a pure function of confidence, target tier and category.
pub fn compute_priority(
    confidence: f64,
    target_priority: TargetPriority,
    category: Category,
) -> SuggestionPriority {
    let is_primary = target_priority == TargetPriority::Primary;
    let is_high_impact = matches!(category, Category::Caveat | Category::ErrorFix);

    if confidence >= 0.8 && is_primary && is_high_impact {
        SuggestionPriority::High
    } else if confidence >= 0.6 || is_primary {
        SuggestionPriority::Medium
    } else {
        SuggestionPriority::Low
    }
}

/// Render the edit preview shown to the user.
pub fn format_preview(category: Category, content: &str, section: &str) -> String {
    let formatted = match category {
        Category::Command => format!("```bash\n{content}\n```"),
        Category::ErrorFix => {
            format!("**Issue:** {content}\n**Solution:** [Add solution details]")
        }
        _ => format!("- {content}"),
    };
    format!("{section}\n\n+ {formatted}")
}

/// `sug_<YYYYmmddHHMMSS>_<6 hex chars of sha256(content)>`.
///
/// Identical content created within the same second yields the same id.
pub fn suggestion_id(content: &str, at: DateTime<Utc>) -> String {
    let digest = format!("{:x}", Sha256::digest(content.as_bytes()));
    format!(
        "{ID_PREFIX}{}_{}",
        at.format("%Y%m%d%H%M%S"),
        &digest[..ID_HASH_LENGTH]
    )
}

/// Build a pending suggestion stamped with the current time.
pub fn build_suggestion(learning: Learning, target: Target) -> Suggestion {
    build_suggestion_at(learning, target, Utc::now())
}

/// Build a pending suggestion stamped with `now`.
pub fn build_suggestion_at(learning: Learning, target: Target, now: DateTime<Utc>) -> Suggestion {
    let priority = compute_priority(learning.confidence, target.priority, learning.category);
    let diff = format_preview(learning.category, &learning.content, &target.section);
    tracing::debug!(
        category = %learning.category,
        target = %target.path,
        ?priority,
        "built suggestion"
    );

    Suggestion {
        id: suggestion_id(&learning.content, now),
        created: now,
        learning,
        target,
        status: SuggestionStatus::Pending,
        priority,
        diff,
        resolved_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LearningSource, TargetKind};
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn learning(category: Category, content: &str, confidence: f64) -> Learning {
        Learning::new(
            LearningSource::User,
            category,
            content,
            confidence,
            Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap(),
        )
        .unwrap()
    }

    fn target(priority: TargetPriority) -> Target {
        Target {
            path: "CLAUDE.md".to_string(),
            section: "## Troubleshooting".to_string(),
            priority,
            kind: TargetKind::ClaudeMd,
        }
    }

    #[test]
    fn test_high_priority_error_fix_primary() {
        let suggestion = build_suggestion(
            learning(Category::ErrorFix, "Null pointer in parser", 0.9),
            target(TargetPriority::Primary),
        );
        assert_eq!(suggestion.priority, SuggestionPriority::High);
        assert_eq!(suggestion.status, SuggestionStatus::Pending);
        assert!(suggestion.resolved_at.is_none());
    }

    #[test]
    fn test_priority_table() {
        use Category::*;
        use SuggestionPriority::*;
        use TargetPriority::*;

        assert_eq!(compute_priority(0.8, Primary, Caveat), High);
        assert_eq!(compute_priority(0.79, Primary, Caveat), Medium);
        assert_eq!(compute_priority(0.9, Primary, Pattern), Medium);
        assert_eq!(compute_priority(0.9, Secondary, ErrorFix), Medium);
        assert_eq!(compute_priority(0.6, Tertiary, Architecture), Medium);
        assert_eq!(compute_priority(0.1, Primary, Command), Medium);
        assert_eq!(compute_priority(0.59, Secondary, Caveat), Low);
        assert_eq!(compute_priority(0.0, Tertiary, Pattern), Low);
    }

    #[test]
    fn test_preview_command() {
        let preview = format_preview(Category::Command, "cargo test", "## Common Commands");
        assert_eq!(preview, "## Common Commands\n\n+ ```bash\ncargo test\n```");
    }

    #[test]
    fn test_preview_error_fix() {
        let preview = format_preview(Category::ErrorFix, "Build fails on CI", "## Troubleshooting");
        assert_eq!(
            preview,
            "## Troubleshooting\n\n+ **Issue:** Build fails on CI\n**Solution:** [Add solution details]"
        );
    }

    #[test]
    fn test_preview_bullet() {
        let preview = format_preview(Category::Caveat, "Set FOO", "## Important Caveats");
        assert_eq!(preview, "## Important Caveats\n\n+ - Set FOO");
    }

    #[test]
    fn test_id_format() {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 5).unwrap();
        let id = suggestion_id("hello", at);
        // sha256("hello") = 2cf24dba...
        assert_eq!(id, "sug_20261016093005_2cf24d");
    }

    #[test]
    fn test_id_collides_for_same_second_same_content() {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 5).unwrap();
        assert_eq!(suggestion_id("same", at), suggestion_id("same", at));
        assert_ne!(suggestion_id("same", at), suggestion_id("other", at));
    }

    #[test]
    fn test_build_embeds_learning_and_target() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 10, 0, 0).unwrap();
        let learning = learning(Category::Caveat, "Set RUST_LOG", 0.7);
        let target = target(TargetPriority::Secondary);
        let suggestion = build_suggestion_at(learning.clone(), target.clone(), now);

        assert_eq!(suggestion.learning, learning);
        assert_eq!(suggestion.target, target);
        assert_eq!(suggestion.created, now);
        assert!(suggestion.id.starts_with("sug_20261016100000_"));
        assert_eq!(suggestion.diff, "## Troubleshooting\n\n+ - Set RUST_LOG");
    }

    proptest! {
        #[test]
        fn build_is_deterministic_in_priority_and_diff(
            confidence in 0.0f64..=1.0,
            category_idx in 0usize..6,
            tier_idx in 0usize..3,
            content in "[a-zA-Z0-9 ]{1,40}",
        ) {
            let category = Category::ALL[category_idx];
            let tier = [TargetPriority::Primary, TargetPriority::Secondary, TargetPriority::Tertiary][tier_idx];
            prop_assume!(!content.trim().is_empty());

            let a = build_suggestion(learning(category, &content, confidence), target(tier));
            let b = build_suggestion(learning(category, &content, confidence), target(tier));
            prop_assert_eq!(a.priority, b.priority);
            prop_assert_eq!(a.diff, b.diff);
            prop_assert_eq!(a.priority, compute_priority(confidence, tier, category));
        }
    }
}
