//! Undo journal persistence in the XDG state directory.
//!
//! The latest restore request per workspace is kept outside the
//! repositories themselves, so an undo survives process exit without
//! polluting working trees.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::operation::RestoreRequest;

/// One journaled undo opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub recorded_at: DateTime<Utc>,
    pub request: RestoreRequest,
}

/// Per-workspace undo journal.
///
/// Entries live at `<store_dir>/<workspace_key>.undo.json`; each
/// workspace keeps only its most recent restore request.
#[derive(Debug, Clone)]
pub struct UndoJournal {
    store_dir: PathBuf,
}

impl UndoJournal {
    pub fn new(store_dir: PathBuf) -> Self {
        Self { store_dir }
    }

    /// Default journal directory.
    ///
    /// - Unix: `$XDG_STATE_HOME/grove/undo` or `~/.local/state/grove/undo`
    /// - Windows: `%LOCALAPPDATA%\grove\undo`
    pub fn default_store_dir() -> anyhow::Result<PathBuf> {
        let base = if cfg!(unix) {
            dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .ok_or_else(|| anyhow::anyhow!("Cannot determine state directory"))?
        } else {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Cannot determine local app data directory"))?
        };
        Ok(base.join("grove").join("undo"))
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    /// Stable key for a workspace root.
    ///
    /// Uses the canonical path when resolvable; moving a workspace
    /// yields a new key (and orphans the old entry).
    pub fn workspace_key(workspace_root: &Path) -> String {
        let path =
            fs::canonicalize(workspace_root).unwrap_or_else(|_| workspace_root.to_path_buf());
        blake3::hash(path.to_string_lossy().as_bytes())
            .to_hex()
            .to_string()
    }

    fn entry_path(&self, workspace_root: &Path) -> PathBuf {
        self.store_dir
            .join(format!("{}.undo.json", Self::workspace_key(workspace_root)))
    }

    /// Persist the restore request, replacing any previous entry for
    /// this workspace. Atomic (tmp + rename).
    pub fn record(&self, workspace_root: &Path, request: &RestoreRequest) -> anyhow::Result<()> {
        let entry = JournalEntry {
            recorded_at: Utc::now(),
            request: request.clone(),
        };
        fs::create_dir_all(&self.store_dir).with_context(|| {
            format!(
                "Failed to create journal directory: {}",
                self.store_dir.display()
            )
        })?;

        let path = self.entry_path(workspace_root);
        let bytes =
            serde_json::to_vec_pretty(&entry).context("Failed to serialize journal entry")?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, bytes)
            .with_context(|| format!("Failed to write journal entry: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to finalize journal entry: {}", path.display()))?;
        Ok(())
    }

    /// Load the most recent entry for this workspace, if any.
    pub fn load_latest(&self, workspace_root: &Path) -> anyhow::Result<Option<JournalEntry>> {
        let path = self.entry_path(workspace_root);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read journal entry: {}", path.display()))?;
        let entry: JournalEntry = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse journal entry: {}", path.display()))?;
        Ok(Some(entry))
    }

    /// Remove the entry for this workspace.
    ///
    /// Returns `Ok(true)` if an entry was removed.
    pub fn clear(&self, workspace_root: &Path) -> anyhow::Result<bool> {
        let path = self.entry_path(workspace_root);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove journal entry: {}", path.display()))?;
        Ok(true)
    }
}
