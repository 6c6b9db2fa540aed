use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config_merge::merge_toml_values;

/// Default storage directory, relative to the project root.
pub const DEFAULT_STORAGE_DIR: &str = ".learning-loop";
/// Name of the configuration file in both the user and project layers.
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub storage: StorageConfig,
    pub extract: ExtractConfig,
    pub targets: TargetsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage directory. Relative paths resolve against the project root.
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_STORAGE_DIR),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Time bound passed to `git log --since`.
    pub since: String,
    /// Base reference for diff extraction.
    pub base: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            since: "2 hours ago".to_string(),
            base: "HEAD~5".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    pub doc_file: String,
    pub agents_dir: String,
    pub exclude_dirs: Vec<String>,
    pub max_agent_targets: usize,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            doc_file: "CLAUDE.md".to_string(),
            agents_dir: "agents".to_string(),
            exclude_dirs: vec!["node_modules".to_string(), ".git".to_string()],
            max_agent_targets: 3,
        }
    }
}

impl LoopConfig {
    /// Load config for `project_root`.
    ///
    /// The user file (`~/.config/learnloop/config.toml`) is the base layer and
    /// `<project_root>/.learning-loop/config.toml` overrides it key by key.
    /// Missing files contribute nothing; with neither present this is
    /// [`LoopConfig::default`].
    pub fn load(project_root: &Path) -> Result<Self> {
        let project_path = project_root.join(DEFAULT_STORAGE_DIR).join(CONFIG_FILE);
        let user_path = Self::user_config_path();
        Self::load_with_paths(user_path.as_deref(), &project_path)
    }

    /// Load config from explicit paths. Testable without global filesystem state.
    pub fn load_with_paths(user_path: Option<&Path>, project_path: &Path) -> Result<Self> {
        let layers = [
            user_path.filter(|p| p.exists()),
            Some(project_path).filter(|p| p.exists()),
        ];

        let mut merged: Option<toml::Value> = None;
        for path in layers.into_iter().flatten() {
            let value = read_toml(path)?;
            tracing::debug!(path = %path.display(), "loaded config layer");
            merged = Some(match merged {
                Some(base) => merge_toml_values(base, value),
                None => value,
            });
        }

        let Some(merged) = merged else {
            return Ok(Self::default());
        };

        // Roundtrip through string for reliable deserialization
        let merged_str = toml::to_string(&merged).context("Failed to serialize merged config")?;
        toml::from_str(&merged_str).context("Failed to deserialize merged config")
    }

    /// Path to user-level config: `~/.config/learnloop/config.toml`.
    ///
    /// Returns None if the config directory cannot be determined
    /// (e.g., no HOME in containers).
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "learnloop")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Absolute storage directory for `project_root`.
    pub fn storage_dir(&self, project_root: &Path) -> PathBuf {
        if self.storage.dir.is_absolute() {
            self.storage.dir.clone()
        } else {
            project_root.join(&self.storage.dir)
        }
    }
}

fn read_toml(path: &Path) -> Result<toml::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
