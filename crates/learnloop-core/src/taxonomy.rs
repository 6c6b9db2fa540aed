//! Weighted-keyword categorization.
//!
//! A [`Taxonomy`] is an immutable, ordered list of categories with the
//! keyword patterns that vote for them. Every matching pattern adds
//! [`KEYWORD_WEIGHT`] to its category; the highest score wins and ties go
//! to the category declared first.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::round_confidence;
use crate::types::Category;

/// Score added per matching keyword.
pub const KEYWORD_WEIGHT: f64 = 0.15;
/// Confidence floor added to every computed score.
pub const BASE_CONFIDENCE: f64 = 0.4;
/// Confidence ceiling for computed scores.
pub const MAX_CONFIDENCE: f64 = 0.95;

const BUILTIN_KEYWORDS: [(Category, &[&str]); 6] = [
    (
        Category::Caveat,
        &[
            "env",
            "environment",
            "config",
            "secret",
            "gotcha",
            "watch out",
            "careful",
            "must",
            "required",
            "important",
            "note",
            "warning",
        ],
    ),
    (
        Category::ErrorFix,
        &[
            "error",
            "fix",
            "workaround",
            "hack",
            "resolved",
            "solved",
            "issue",
            "bug",
            "failed",
            "broken",
        ],
    ),
    (
        Category::Dependency,
        &[
            "install",
            "dependency",
            "package",
            "version",
            "npm",
            "pip",
            "requires",
            "upgrade",
            "library",
            "module",
        ],
    ),
    (
        Category::Pattern,
        &[
            "pattern",
            "convention",
            "style",
            "naming",
            "standard",
            "best practice",
            "approach",
            "prefer",
            "always",
            "never",
        ],
    ),
    (
        Category::Command,
        &[
            "command", "script", "run", "npm", "python", "bash", "shell", "cli", "execute",
            "terminal",
        ],
    ),
    (
        Category::Architecture,
        &[
            "architecture",
            "design",
            "structure",
            "component",
            "module",
            "layer",
            "service",
            "api",
            "endpoint",
        ],
    ),
];

#[derive(Debug, Clone)]
struct CategoryRule {
    category: Category,
    patterns: Vec<Regex>,
}

/// Ordered category → keyword-pattern table.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    rules: Vec<CategoryRule>,
}

impl Taxonomy {
    /// Build a taxonomy from plain keywords.
    ///
    /// Keywords are lower-cased, regex-escaped and wrapped in word
    /// boundaries, so `fix` does not match inside `prefix`. Entry order is
    /// the tie-break order.
    pub fn from_keywords<S: AsRef<str>>(
        entries: &[(Category, &[S])],
    ) -> Result<Self, regex::Error> {
        let mut rules = Vec::with_capacity(entries.len());
        for (category, keywords) in entries {
            let patterns = keywords
                .iter()
                .map(|kw| {
                    Regex::new(&format!(
                        r"\b{}\b",
                        regex::escape(&kw.as_ref().to_lowercase())
                    ))
                })
                .collect::<Result<Vec<_>, _>>()?;
            rules.push(CategoryRule {
                category: *category,
                patterns,
            });
        }
        Ok(Self { rules })
    }

    /// The built-in six-category taxonomy.
    pub fn builtin() -> &'static Taxonomy {
        static BUILTIN: OnceLock<Taxonomy> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            Taxonomy::from_keywords(&BUILTIN_KEYWORDS).unwrap_or_else(|error| {
                tracing::error!(%error, "built-in taxonomy failed to compile");
                Taxonomy { rules: Vec::new() }
            })
        })
    }

    /// Categories in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.rules.iter().map(|rule| rule.category)
    }
}

/// Result of categorizing a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Categorization {
    pub category: Category,
    pub confidence: f64,
}

/// Scores text against a borrowed [`Taxonomy`].
#[derive(Debug, Clone, Copy)]
pub struct Categorizer<'t> {
    taxonomy: &'t Taxonomy,
}

impl Categorizer<'static> {
    pub fn builtin() -> Self {
        Self::new(Taxonomy::builtin())
    }
}

impl Default for Categorizer<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'t> Categorizer<'t> {
    pub fn new(taxonomy: &'t Taxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &'t Taxonomy {
        self.taxonomy
    }

    /// Pick the best-scoring category for `text`.
    ///
    /// Text with no keyword hits falls back to `caveat` at
    /// [`BASE_CONFIDENCE`].
    pub fn categorize(&self, text: &str) -> Categorization {
        let lowered = text.to_lowercase();

        // Hit counts keep tie-breaking exact; scores are derived afterwards.
        let mut best: Option<(Category, usize)> = None;
        for rule in &self.taxonomy.rules {
            let hits = rule
                .patterns
                .iter()
                .filter(|pattern| pattern.is_match(&lowered))
                .count();
            if best.is_none_or(|(_, best_hits)| hits > best_hits) {
                best = Some((rule.category, hits));
            }
        }

        match best {
            Some((category, hits)) if hits > 0 => {
                let score = hits as f64 * KEYWORD_WEIGHT;
                Categorization {
                    category,
                    confidence: round_confidence((BASE_CONFIDENCE + score).min(MAX_CONFIDENCE)),
                }
            }
            _ => Categorization {
                category: Category::Caveat,
                confidence: BASE_CONFIDENCE,
            },
        }
    }
}

/// Categorize with the built-in taxonomy.
pub fn categorize(text: &str) -> Categorization {
    Categorizer::builtin().categorize(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_no_keywords_defaults_to_caveat() {
        let result = categorize("lorem ipsum dolor sit amet");
        assert_eq!(result.category, Category::Caveat);
        assert_eq!(result.confidence, 0.4);
    }

    #[test]
    fn test_empty_text_defaults_to_caveat() {
        let result = categorize("");
        assert_eq!(result.category, Category::Caveat);
        assert_eq!(result.confidence, 0.4);
    }

    #[test]
    fn test_single_hit() {
        let result = categorize("Upgrade the thing");
        assert_eq!(result.category, Category::Dependency);
        assert_eq!(result.confidence, 0.55);
    }

    #[test]
    fn test_multiple_hits_accumulate() {
        // error, bug, fix, broken -> 4 hits
        let result = categorize("Fix broken bug causing an error");
        assert_eq!(result.category, Category::ErrorFix);
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn test_confidence_is_capped() {
        let result = categorize("error fix workaround hack resolved solved issue bug failed");
        assert_eq!(result.category, Category::ErrorFix);
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn test_word_boundaries() {
        // "prefix" must not count as "fix"; "running" must not count as "run".
        let result = categorize("prefix running");
        assert_eq!(result.category, Category::Caveat);
        assert_eq!(result.confidence, 0.4);
    }

    #[test]
    fn test_multi_word_keyword() {
        let result = categorize("Follow the best practice here");
        assert_eq!(result.category, Category::Pattern);
        assert_eq!(result.confidence, 0.55);
    }

    #[test]
    fn test_case_insensitive() {
        let result = categorize("ARCHITECTURE of the API LAYER");
        assert_eq!(result.category, Category::Architecture);
        assert_eq!(result.confidence, 0.85);
    }

    #[test]
    fn test_tie_goes_to_first_declared() {
        // One caveat hit (config) vs one error_fix hit (bug): caveat declared first.
        let result = categorize("config bug");
        assert_eq!(result.category, Category::Caveat);

        // "npm" scores dependency and command equally: dependency declared first.
        let result = categorize("npm");
        assert_eq!(result.category, Category::Dependency);

        // "module" scores dependency and architecture equally.
        let result = categorize("module");
        assert_eq!(result.category, Category::Dependency);
    }

    #[test]
    fn test_error_fix_beats_pattern_on_tie() {
        let result = categorize("always fix");
        assert_eq!(result.category, Category::ErrorFix);
    }

    #[test]
    fn test_custom_taxonomy() {
        let taxonomy = Taxonomy::from_keywords(&[
            (Category::Command, &["cargo"][..]),
            (Category::Caveat, &["unsafe"][..]),
        ])
        .unwrap();
        let categorizer = Categorizer::new(&taxonomy);

        let result = categorizer.categorize("run cargo build");
        assert_eq!(result.category, Category::Command);
        assert_eq!(result.confidence, 0.55);

        let categories: Vec<_> = taxonomy.categories().collect();
        assert_eq!(categories, vec![Category::Command, Category::Caveat]);
    }

    #[test]
    fn test_custom_keywords_are_escaped() {
        let taxonomy = Taxonomy::from_keywords(&[(Category::Command, &["c++"][..])]).unwrap();
        let categorizer = Categorizer::new(&taxonomy);
        assert_eq!(
            categorizer.categorize("ccc").confidence,
            BASE_CONFIDENCE,
            "escaped keyword must not act as a regex"
        );
    }

    #[test]
    fn test_builtin_order() {
        let categories: Vec<_> = Taxonomy::builtin().categories().collect();
        assert_eq!(categories, Category::ALL.to_vec());
    }

    proptest! {
        #[test]
        fn categorize_stays_in_range(text in ".{0,200}") {
            let result = categorize(&text);
            prop_assert!(Category::ALL.contains(&result.category));
            prop_assert!((0.4..=0.95).contains(&result.confidence));
        }

        #[test]
        fn categorize_is_deterministic(text in "[a-z ]{0,80}") {
            prop_assert_eq!(categorize(&text), categorize(&text));
        }
    }
}
