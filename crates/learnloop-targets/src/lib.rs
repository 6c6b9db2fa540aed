//! Map a learning to the documents it could be written into.
//!
//! [`TargetResolver::resolve`] returns targets ordered by tier:
//! the root documentation file, then subdirectory documentation files whose
//! directory is named in the content, then (architecture and pattern only)
//! agent-capability documents.

pub mod tree;

use learnloop_core::{Category, Target, TargetKind, TargetPriority};

pub use tree::{DocLayout, DocTree, FsDocTree};

/// Heading used when a category has no dedicated section.
pub const DEFAULT_SECTION: &str = "## Notes";
/// Heading used for agent-capability targets.
pub const AGENT_SECTION: &str = "## Guardrails";

/// Section heading a learning of `category` is appended under.
pub fn section_for(category: Category) -> &'static str {
    match category {
        Category::Caveat => "## Important Caveats",
        Category::Pattern => "## Conventions & Patterns",
        Category::ErrorFix => "## Troubleshooting",
        Category::Dependency => "## Dependencies",
        Category::Command => "## Common Commands",
        Category::Architecture => "## Architecture",
    }
}

/// Resolves targets against a [`DocTree`].
#[derive(Debug, Clone)]
pub struct TargetResolver<T> {
    tree: T,
    layout: DocLayout,
}

impl TargetResolver<FsDocTree> {
    /// Resolver over the filesystem tree rooted at `project_root`.
    pub fn for_project(project_root: impl Into<std::path::PathBuf>, layout: DocLayout) -> Self {
        Self::new(FsDocTree::new(project_root, layout.clone()), layout)
    }
}

impl<T: DocTree> TargetResolver<T> {
    pub fn new(tree: T, layout: DocLayout) -> Self {
        Self { tree, layout }
    }

    pub fn resolve(&self, category: Category, content: &str) -> Vec<Target> {
        let section = section_for(category);
        let mut targets = Vec::new();

        if self.tree.root_doc_exists() {
            targets.push(Target {
                path: self.layout.doc_file.clone(),
                section: section.to_string(),
                priority: TargetPriority::Primary,
                kind: TargetKind::ClaudeMd,
            });
        }

        match self.tree.doc_files() {
            Ok(docs) => {
                let lowered = content.to_lowercase();
                targets.extend(
                    docs.into_iter()
                        .filter(|path| *path != self.layout.doc_file)
                        .filter(|path| {
                            parent_dir_name(path)
                                .is_some_and(|dir| lowered.contains(&dir.to_lowercase()))
                        })
                        .map(|path| Target {
                            path,
                            section: section.to_string(),
                            priority: TargetPriority::Secondary,
                            kind: TargetKind::ClaudeMd,
                        }),
                );
            }
            Err(error) => {
                tracing::warn!(error = %format!("{error:#}"), "documentation listing unavailable");
            }
        }

        if matches!(category, Category::Architecture | Category::Pattern) {
            match self.tree.agent_files() {
                Ok(agents) => targets.extend(
                    agents
                        .into_iter()
                        .take(self.layout.max_agent_targets)
                        .map(|path| Target {
                            path,
                            section: AGENT_SECTION.to_string(),
                            priority: TargetPriority::Tertiary,
                            kind: TargetKind::Agent,
                        }),
                ),
                Err(error) => {
                    tracing::warn!(error = %format!("{error:#}"), "agent listing unavailable");
                }
            }
        }

        tracing::debug!(%category, count = targets.len(), "resolved targets");
        targets
    }

    /// Target for an explicitly requested path that resolution did not offer.
    pub fn fallback(&self, path: &str) -> Target {
        let is_agent = path
            .split('/')
            .rev()
            .skip(1)
            .any(|component| component == self.layout.agents_dir);
        Target {
            path: path.to_string(),
            section: DEFAULT_SECTION.to_string(),
            priority: TargetPriority::Secondary,
            kind: if is_agent {
                TargetKind::Agent
            } else {
                TargetKind::ClaudeMd
            },
        }
    }

    /// Resolve, then pick the target whose path equals `requested`, else the
    /// first resolved target, else [`Self::fallback`].
    pub fn choose(&self, category: Category, content: &str, requested: &str) -> Target {
        let mut targets = self.resolve(category, content);
        match targets.iter().position(|t| t.path == requested) {
            Some(idx) => targets.swap_remove(idx),
            None if !targets.is_empty() => targets.swap_remove(0),
            None => self.fallback(requested),
        }
    }
}

fn parent_dir_name(path: &str) -> Option<&str> {
    let mut components = path.rsplit('/');
    components.next()?;
    components.next().filter(|dir| !dir.is_empty())
}
