use std::path::PathBuf;

use anyhow::{Context, Result};
use learnloop_config::{LoopConfig, TargetsConfig};
use learnloop_core::{
    Categorizer, Category, Learning, LearningSource, Suggestion, SuggestionStatus,
    build_suggestion,
};
use learnloop_extract::{GitCli, extract_from_commits, extract_from_diff};
use learnloop_store::SuggestionStore;
use learnloop_targets::{DocLayout, FsDocTree, TargetResolver};
use serde::Serialize;
use serde_json::json;

use crate::cli::Commands;

/// Project root plus its effective configuration.
pub struct Project {
    root: PathBuf,
    config: LoopConfig,
}

impl Project {
    /// Resolve the project root (`--project` or CWD) and load its config.
    pub fn open(root: Option<PathBuf>) -> Result<Self> {
        let root = match root {
            Some(root) => root,
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };
        let config = LoopConfig::load(&root)?;
        Ok(Self { root, config })
    }

    fn store(&self) -> SuggestionStore {
        SuggestionStore::new(self.config.storage_dir(&self.root))
    }

    fn resolver(&self) -> TargetResolver<FsDocTree> {
        TargetResolver::for_project(self.root.clone(), doc_layout(&self.config.targets))
    }

    fn vcs(&self) -> GitCli {
        GitCli::new(self.root.clone())
    }
}

fn doc_layout(targets: &TargetsConfig) -> DocLayout {
    DocLayout {
        doc_file: targets.doc_file.clone(),
        agents_dir: targets.agents_dir.clone(),
        exclude_dirs: targets.exclude_dirs.clone(),
        max_agent_targets: targets.max_agent_targets,
    }
}

/// Write `value` to stdout as pretty-printed JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{rendered}");
    Ok(())
}

pub fn dispatch(project: &Project, command: Commands) -> Result<()> {
    match command {
        Commands::Init => print_json(&project.store().init()?),
        Commands::ExtractCommits { since } => {
            let since = since.unwrap_or_else(|| project.config.extract.since.clone());
            let learnings = extract_from_commits(&project.vcs(), &Categorizer::builtin(), &since);
            print_json(&learnings)
        }
        Commands::ExtractDiff { base } => {
            let base = base.unwrap_or_else(|| project.config.extract.base.clone());
            print_json(&extract_from_diff(&project.vcs(), &base))
        }
        Commands::Categorize { text } => print_json(&Categorizer::builtin().categorize(&text)),
        Commands::FindTargets { category, content } => {
            let category: Category = category.parse()?;
            print_json(&project.resolver().resolve(category, &content))
        }
        Commands::PendingCount => {
            println!("{}", project.store().count()?);
            Ok(())
        }
        Commands::ListSuggestions => print_json(&project.store().list_pending()?),
        Commands::History => print_json(&project.store().history()?),
        Commands::AddSuggestion {
            category,
            content,
            target,
            confidence,
        } => {
            let suggestion = add_suggestion(project, &category, &content, &target, confidence)?;
            print_json(&json!({ "status": "saved", "id": suggestion.id }))
        }
        Commands::MarkSuggestion { id, status } => {
            let status: SuggestionStatus = status.parse()?;
            let updated = project.store().update_status(&id, status)?;
            print_json(&json!({
                "status": "updated",
                "id": updated.id,
                "new_status": updated.status,
            }))
        }
        Commands::ClearResolved => {
            let removed = project.store().compact()?;
            print_json(&json!({ "status": "cleared", "removed": removed }))
        }
    }
}

/// Build a user learning, pick its target and persist the suggestion.
fn add_suggestion(
    project: &Project,
    category: &str,
    content: &str,
    requested_target: &str,
    confidence: f64,
) -> Result<Suggestion> {
    let category: Category = category.parse()?;
    let learning = Learning::new(
        LearningSource::User,
        category,
        content,
        confidence,
        chrono::Utc::now(),
    )?;

    let target = project
        .resolver()
        .choose(category, content, requested_target);
    tracing::debug!(path = %target.path, priority = ?target.priority, "chose target");

    let suggestion = build_suggestion(learning, target);
    project.store().save(&suggestion)?;
    Ok(suggestion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnloop_core::{LoopError, TargetPriority};
    use std::fs;
    use tempfile::tempdir;

    fn project_at(root: &std::path::Path) -> Project {
        Project {
            root: root.to_path_buf(),
            config: LoopConfig::default(),
        }
    }

    #[test]
    fn test_doc_layout_follows_config() {
        let targets = TargetsConfig {
            doc_file: "AGENTS.md".to_string(),
            agents_dir: "capabilities".to_string(),
            exclude_dirs: vec!["vendor".to_string()],
            max_agent_targets: 1,
        };
        let layout = doc_layout(&targets);
        assert_eq!(layout.doc_file, "AGENTS.md");
        assert_eq!(layout.agents_dir, "capabilities");
        assert_eq!(layout.exclude_dirs, vec!["vendor"]);
        assert_eq!(layout.max_agent_targets, 1);

        assert_eq!(doc_layout(&TargetsConfig::default()), DocLayout::default());
    }

    #[test]
    fn test_add_suggestion_uses_requested_target() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("CLAUDE.md"), "# Project\n").unwrap();
        fs::create_dir_all(dir.path().join("api")).unwrap();
        fs::write(dir.path().join("api/CLAUDE.md"), "# API\n").unwrap();
        let project = project_at(dir.path());

        let suggestion = add_suggestion(
            &project,
            "caveat",
            "The api client must set a timeout",
            "api/CLAUDE.md",
            0.9,
        )
        .unwrap();

        assert_eq!(suggestion.target.path, "api/CLAUDE.md");
        assert_eq!(suggestion.target.priority, TargetPriority::Secondary);
        assert_eq!(suggestion.learning.source, LearningSource::User);
        assert_eq!(project.store().count().unwrap(), 1);
    }

    #[test]
    fn test_add_suggestion_without_docs_falls_back() {
        let dir = tempdir().unwrap();
        let project = project_at(dir.path());

        let suggestion =
            add_suggestion(&project, "command", "Run make lint", "CLAUDE.md", 0.7).unwrap();
        assert_eq!(suggestion.target.path, "CLAUDE.md");
        assert_eq!(suggestion.target.section, "## Notes");
    }

    #[test]
    fn test_add_suggestion_rejects_bad_input() {
        let dir = tempdir().unwrap();
        let project = project_at(dir.path());

        let err = add_suggestion(&project, "trivia", "x", "CLAUDE.md", 0.7).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoopError>(),
            Some(LoopError::InvalidCategory(_))
        ));

        let err = add_suggestion(&project, "caveat", "x", "CLAUDE.md", 1.5).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoopError>(),
            Some(LoopError::ConfidenceOutOfRange(_))
        ));

        assert!(!project.store().pending_path().exists());
    }

    #[test]
    fn test_storage_dir_from_config() {
        let dir = tempdir().unwrap();
        let mut project = project_at(dir.path());
        project.config.storage.dir = PathBuf::from("state/learnings");

        add_suggestion(&project, "pattern", "Prefer small modules", "CLAUDE.md", 0.6).unwrap();
        assert!(
            dir.path()
                .join("state/learnings/pending-suggestions.json")
                .exists()
        );
    }
}
