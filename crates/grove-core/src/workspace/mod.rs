//! Target resolution for operations.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::GroveConfig;
use crate::types::RepoKey;

/// Resolve operation targets in precedence order: explicit paths, then
/// configured repos, then discovery under the workspace root.
///
/// Explicit and configured paths keep their declaration order;
/// discovered repositories are sorted by canonical path.
pub fn resolve_targets(
    workspace_root: &Path,
    config: &GroveConfig,
    explicit: &[PathBuf],
) -> anyhow::Result<Vec<RepoKey>> {
    if !explicit.is_empty() {
        return keys_from_paths(workspace_root, explicit);
    }
    if !config.repos.is_empty() {
        return keys_from_paths(workspace_root, &config.repos);
    }
    discover_repositories(workspace_root)
}

fn keys_from_paths(base: &Path, paths: &[PathBuf]) -> anyhow::Result<Vec<RepoKey>> {
    paths
        .iter()
        .map(|path| {
            let full = if path.is_absolute() {
                path.clone()
            } else {
                base.join(path)
            };
            RepoKey::from_path(&full)
        })
        .collect()
}

/// Find git repository roots under a directory, sorted by path.
///
/// Descends into subdirectories (skipping hidden ones) but not into
/// found repositories.
pub fn discover_repositories(root: &Path) -> anyhow::Result<Vec<RepoKey>> {
    let mut found = Vec::new();
    walk(root, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(dir: &Path, found: &mut Vec<RepoKey>) -> anyhow::Result<()> {
    if dir.join(".git").exists() {
        found.push(RepoKey::from_path(dir)?);
        return Ok(());
    }
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        walk(&path, found)?;
    }
    Ok(())
}
