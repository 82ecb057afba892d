//! Tag deletion command.
//!
//! Composes capture, coordinator, and the collaborator services:
//! deletes a tag across the target repositories, reports through the
//! notification gateway, and applies the configured rollback policy
//! when the forward pass halts.

use std::path::PathBuf;

use serde::Serialize;

use crate::git::{GitBackend, GitRevisionResolver};
use crate::operation::{
    CompoundResult, ForwardOutcome, HaltDetail, OperationCoordinator, OperationKind,
    OperationState, RestoreRequest, TagDeleteStrategy, capture_tips,
};
use crate::services::{OperationServices, Severity};
use crate::types::{RepoKey, RollbackPolicy};

/// Options for the tag deletion command.
#[derive(Debug, Clone)]
pub struct DeleteTagOptions {
    /// Tag to delete.
    pub tag: String,
    /// Target repository roots, in operation order.
    pub repos: Vec<PathBuf>,
    /// What to do with the successful prefix after a halt.
    pub rollback: RollbackPolicy,
}

impl DeleteTagOptions {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            repos: Vec::new(),
            rollback: RollbackPolicy::default(),
        }
    }

    pub fn with_repo(mut self, repo: impl Into<PathBuf>) -> Self {
        self.repos.push(repo.into());
        self
    }

    pub fn with_repos(mut self, repos: impl IntoIterator<Item = PathBuf>) -> Self {
        self.repos.extend(repos);
        self
    }

    pub fn with_rollback(mut self, policy: RollbackPolicy) -> Self {
        self.rollback = policy;
        self
    }
}

/// Report from one tag deletion run.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteTagReport {
    pub tag: String,
    /// Terminal coordinator state.
    pub state: OperationState,
    /// Repositories whose tag was deleted, in operation order.
    pub deleted: Vec<RepoKey>,
    /// The fatal forward-pass failure, when the run halted.
    pub failure: Option<HaltDetail>,
    /// Outcome of the immediate rollback, when one ran.
    pub rollback: Option<CompoundResult>,
    /// Present after a fully successful run; frontends persist it to
    /// offer a deferred undo.
    pub restore: Option<RestoreRequest>,
}

/// Deletes one tag across an ordered set of repositories.
pub struct DeleteTagCommand {
    git: GitBackend,
    services: OperationServices,
}

impl DeleteTagCommand {
    pub fn new(git: GitBackend, services: OperationServices) -> Self {
        Self { git, services }
    }

    /// Execute the deletion.
    ///
    /// Errors only on infrastructure misuse (no targets, unresolvable
    /// paths); mutation failures are reported in the returned report
    /// and through the notification gateway.
    pub fn execute(&self, options: &DeleteTagOptions) -> anyhow::Result<DeleteTagReport> {
        if options.repos.is_empty() {
            anyhow::bail!("No target repositories for tag deletion");
        }
        let mut targets = Vec::with_capacity(options.repos.len());
        for path in &options.repos {
            targets.push(RepoKey::from_path(path)?);
        }

        let strategy = TagDeleteStrategy::new(self.git.clone(), options.tag.clone());
        let resolver = GitRevisionResolver::new();
        let capture = capture_tips(&resolver, &targets, &strategy.capture_reference());

        let mut coordinator = OperationCoordinator::new(
            strategy,
            targets,
            capture.clone(),
            self.services.refresh.clone(),
        );

        match coordinator.execute()? {
            ForwardOutcome::Completed => {
                let request = RestoreRequest::new(
                    OperationKind::TagDeletion {
                        tag: options.tag.clone(),
                    },
                    coordinator.successful_targets().to_vec(),
                    capture,
                );
                let mut handle = self.services.notifier.notify(
                    Severity::Info,
                    "Tag deleted",
                    &format!(
                        "Deleted tag '{}' in {} repositories",
                        options.tag,
                        request.targets.len()
                    ),
                );
                handle.offer_restore("Restore", &request);

                Ok(DeleteTagReport {
                    tag: options.tag.clone(),
                    state: coordinator.state(),
                    deleted: coordinator.successful_targets().to_vec(),
                    failure: None,
                    rollback: None,
                    restore: Some(request),
                })
            }
            ForwardOutcome::Halted(detail) => {
                self.services.notifier.notify(
                    Severity::Error,
                    &format!("Tag '{}' wasn't deleted", options.tag),
                    &detail.error,
                );
                let rollback = self.run_halt_rollback(&mut coordinator, options)?;

                Ok(DeleteTagReport {
                    tag: options.tag.clone(),
                    state: coordinator.state(),
                    deleted: coordinator.successful_targets().to_vec(),
                    failure: Some(detail),
                    rollback,
                    restore: None,
                })
            }
        }
    }

    /// Apply the rollback policy to a halted operation.
    fn run_halt_rollback(
        &self,
        coordinator: &mut OperationCoordinator<TagDeleteStrategy>,
        options: &DeleteTagOptions,
    ) -> anyhow::Result<Option<CompoundResult>> {
        if coordinator.successful_targets().is_empty() {
            return Ok(None);
        }

        let accepted = match options.rollback {
            RollbackPolicy::Auto => true,
            RollbackPolicy::Never => false,
            RollbackPolicy::Ask => {
                let proposal = coordinator.rollback_proposal();
                self.services.confirmation.propose(&proposal)
            }
        };
        if !accepted {
            return Ok(None);
        }

        let result = coordinator.rollback()?;
        if result.total_success() {
            self.services.notifier.notify(
                Severity::Info,
                "Rollback successful",
                &format!("Restored tag '{}'", options.tag),
            );
        } else {
            self.services.notifier.notify(
                Severity::Error,
                "Error during rollback of tag deletion",
                &result.error_output_with_repo_indication(),
            );
        }
        Ok(Some(result))
    }
}
