//! Serializable compensation requests for the deferred undo path.

use serde::{Deserialize, Serialize};

use crate::git::GitBackend;
use crate::services::RefreshHook;
use crate::types::RepoKey;

use super::capture::CaptureRecord;
use super::compound::{CompoundResult, RollbackOutcome};
use super::delete_tag::TagDeleteStrategy;
use super::strategy::MutationStrategy;

/// The operation a restore request compensates for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum OperationKind {
    TagDeletion { tag: String },
}

impl OperationKind {
    /// Short description for labels and messages.
    pub fn describe(&self) -> String {
        match self {
            OperationKind::TagDeletion { tag } => format!("tag '{tag}'"),
        }
    }
}

/// Everything needed to compensate a finished operation, with no
/// reference to the live coordinator: the operation kind, the targets
/// that were mutated, and their captured pre-mutation state.
///
/// Serializable so frontends can persist it (undo journal) and trigger
/// the restore from a later process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreRequest {
    pub operation: OperationKind,
    pub targets: Vec<RepoKey>,
    pub capture: CaptureRecord,
}

impl RestoreRequest {
    pub fn new(operation: OperationKind, targets: Vec<RepoKey>, capture: CaptureRecord) -> Self {
        Self {
            operation,
            targets,
            capture,
        }
    }

    /// Rebuild the concrete strategy this request compensates for.
    pub fn strategy(&self, git: GitBackend) -> Box<dyn MutationStrategy> {
        match &self.operation {
            OperationKind::TagDeletion { tag } => {
                Box::new(TagDeleteStrategy::new(git, tag.clone()))
            }
        }
    }
}

/// Run the compensation loop described by a restore request.
pub fn run_restore(
    request: &RestoreRequest,
    git: &GitBackend,
    refresh: &dyn RefreshHook,
) -> CompoundResult {
    let strategy = request.strategy(git.clone());
    compensate_all(strategy.as_ref(), &request.targets, &request.capture, refresh)
}

/// Compensate every target in order, skipping targets without captured
/// state. Shared by the coordinator's rollback and the deferred undo.
pub(crate) fn compensate_all(
    strategy: &dyn MutationStrategy,
    successful: &[RepoKey],
    capture: &CaptureRecord,
    refresh: &dyn RefreshHook,
) -> CompoundResult {
    let mut result = CompoundResult::new();
    for repo in successful {
        match capture.tip(repo) {
            Some(tip) => {
                let outcome = strategy.compensate(repo, tip);
                if outcome.success() {
                    refresh.refresh(repo);
                    result.append(repo.clone(), RollbackOutcome::Restored);
                } else {
                    result.append(
                        repo.clone(),
                        RollbackOutcome::CommandFailed(outcome.error_output().to_string()),
                    );
                }
            }
            None => {
                tracing::warn!(
                    operation = strategy.operation_name(),
                    repo = %repo,
                    "no captured state for target, skipping compensation"
                );
                result.append(repo.clone(), RollbackOutcome::Uncompensable);
            }
        }
    }
    result
}
