//! Config store for loading and saving grove.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::types::RollbackPolicy;

pub const CONFIG_FILE: &str = "grove.toml";

/// Workspace configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroveConfig {
    /// Repository roots in operation order, relative to the workspace
    /// root unless absolute.
    #[serde(default)]
    pub repos: Vec<PathBuf>,

    /// Rollback policy after a halted operation.
    #[serde(default)]
    pub rollback: RollbackPolicy,
}

impl GroveConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Loads and saves grove.toml at a workspace root.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
    workspace_root: PathBuf,
}

impl ConfigStore {
    pub fn new(workspace_root: PathBuf) -> Self {
        let config_path = workspace_root.join(CONFIG_FILE);
        Self {
            config_path,
            workspace_root,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn load(&self) -> anyhow::Result<GroveConfig> {
        if !self.config_path.exists() {
            return Ok(GroveConfig::new());
        }
        let content = std::fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;
        toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse config file: {}",
                self.config_path.display()
            )
        })
    }

    pub fn save(&self, config: &GroveConfig) -> anyhow::Result<()> {
        let content =
            toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.config_path, content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(())
    }
}
