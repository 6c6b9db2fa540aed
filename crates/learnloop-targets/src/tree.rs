//! Documentation-tree collaborator.

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};

/// Where documentation lives in a project and what to skip while looking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocLayout {
    /// File name of root and per-directory documentation files.
    pub doc_file: String,
    /// Directory name marking agent-capability documents.
    pub agents_dir: String,
    /// Directory names never descended into.
    pub exclude_dirs: Vec<String>,
    /// Upper bound on tertiary targets.
    pub max_agent_targets: usize,
}

impl Default for DocLayout {
    fn default() -> Self {
        Self {
            doc_file: "CLAUDE.md".to_string(),
            agents_dir: "agents".to_string(),
            exclude_dirs: vec!["node_modules".to_string(), ".git".to_string()],
            max_agent_targets: 3,
        }
    }
}

/// File queries the target resolver needs.
///
/// Paths are relative to the project root and `/`-separated.
pub trait DocTree {
    /// Whether the root documentation file exists.
    fn root_doc_exists(&self) -> bool;

    /// Every documentation file in the tree, root included, sorted.
    fn doc_files(&self) -> Result<Vec<String>>;

    /// Markdown files below an agents directory, sorted.
    fn agent_files(&self) -> Result<Vec<String>>;
}

/// [`DocTree`] over the real filesystem.
#[derive(Debug, Clone)]
pub struct FsDocTree {
    root: PathBuf,
    layout: DocLayout,
}

impl FsDocTree {
    pub fn new(root: impl Into<PathBuf>, layout: DocLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn layout(&self) -> &DocLayout {
        &self.layout
    }

    /// Walk every regular file under the root, skipping excluded directories.
    ///
    /// Ignore files are not consulted: a gitignored directory can still hold
    /// documentation.
    fn walk_files(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            anyhow::bail!("Project root is not a directory: {}", self.root.display());
        }

        let excluded = self.layout.exclude_dirs.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder.standard_filters(false);
        builder.filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir
                && entry.depth() > 0
                && excluded
                    .iter()
                    .any(|name| entry.file_name().to_str() == Some(name.as_str())))
        });

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    tracing::debug!(error = %error, "Skipping unreadable walk entry");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .with_context(|| {
                    format!(
                        "Failed to compute relative path for {} under {}",
                        entry.path().display(),
                        self.root.display()
                    )
                })?
                .to_path_buf();
            files.push(relative);
        }
        Ok(files)
    }
}

impl DocTree for FsDocTree {
    fn root_doc_exists(&self) -> bool {
        self.root.join(&self.layout.doc_file).is_file()
    }

    fn doc_files(&self) -> Result<Vec<String>> {
        let mut docs: Vec<String> = self
            .walk_files()?
            .into_iter()
            .filter(|path| {
                path.file_name().and_then(|n| n.to_str()) == Some(self.layout.doc_file.as_str())
            })
            .map(|path| to_slash(&path))
            .collect();
        docs.sort();
        Ok(docs)
    }

    fn agent_files(&self) -> Result<Vec<String>> {
        let mut agents: Vec<String> = self
            .walk_files()?
            .into_iter()
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("md"))
            .filter(|path| has_ancestor_named(path, &self.layout.agents_dir))
            .map(|path| to_slash(&path))
            .collect();
        agents.sort();
        Ok(agents)
    }
}

fn has_ancestor_named(path: &Path, name: &str) -> bool {
    path.parent().is_some_and(|parent| {
        parent
            .components()
            .any(|c| matches!(c, Component::Normal(part) if part.to_str() == Some(name)))
    })
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
