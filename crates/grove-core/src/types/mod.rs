//! Shared core types used across the operation and command layers.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Identity of one repository root.
///
/// Keyed by the canonical path string so equality and ordering are
/// independent of how the path was spelled on the command line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoKey(String);

impl RepoKey {
    /// Canonicalize a path into a repository key.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let canonical = std::fs::canonicalize(path)
            .with_context(|| format!("Failed to resolve repository path: {}", path.display()))?;
        Ok(Self(canonical.to_string_lossy().into_owned()))
    }

    /// Wrap an already-canonical path string.
    pub fn from_canonical(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Short name for user-facing listings (the root's directory name).
    pub fn short_name(&self) -> &str {
        Path::new(&self.0)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.0)
    }

    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }
}

impl fmt::Display for RepoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What to do with the successful prefix after a halted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RollbackPolicy {
    /// Propose the rollback and wait for explicit confirmation.
    #[default]
    Ask,
    /// Roll back immediately without asking.
    Auto,
    /// Leave the successful prefix in place.
    Never,
}

impl FromStr for RollbackPolicy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value {
            "ask" => Ok(RollbackPolicy::Ask),
            "auto" => Ok(RollbackPolicy::Auto),
            "never" => Ok(RollbackPolicy::Never),
            other => anyhow::bail!("Invalid rollback policy '{other}' (expected ask, auto, never)"),
        }
    }
}
