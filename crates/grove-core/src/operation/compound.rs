//! Aggregate verdict over per-target rollback outcomes.

use serde::{Deserialize, Serialize};

use crate::types::RepoKey;

/// Per-target result of one compensation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RollbackOutcome {
    /// The compensation command succeeded.
    Restored,
    /// The compensation command ran and failed.
    CommandFailed(String),
    /// No captured state existed; compensation was never attempted.
    Uncompensable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackEntry {
    pub repo: RepoKey,
    pub outcome: RollbackOutcome,
}

/// Ordered per-target outcomes of one rollback pass.
///
/// Immutable once built; the sole input to the final rollback report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundResult {
    entries: Vec<RollbackEntry>,
}

impl CompoundResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, repo: RepoKey, outcome: RollbackOutcome) {
        self.entries.push(RollbackEntry { repo, outcome });
    }

    pub fn entries(&self) -> &[RollbackEntry] {
        &self.entries
    }

    /// Holds iff every target was restored; an uncompensable target
    /// breaks it just like a failed command.
    pub fn total_success(&self) -> bool {
        self.entries
            .iter()
            .all(|entry| entry.outcome == RollbackOutcome::Restored)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RollbackEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.outcome != RollbackOutcome::Restored)
    }

    /// Consolidated failure text naming every affected repository.
    pub fn error_output_with_repo_indication(&self) -> String {
        self.entries
            .iter()
            .filter_map(|entry| match &entry.outcome {
                RollbackOutcome::Restored => None,
                RollbackOutcome::CommandFailed(detail) => {
                    Some(format!("{}: {}", entry.repo.short_name(), detail))
                }
                RollbackOutcome::Uncompensable => Some(format!(
                    "{}: no captured state to restore from",
                    entry.repo.short_name()
                )),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
