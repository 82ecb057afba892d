//! Multi-repository operation state machine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::RefreshHook;
use crate::types::RepoKey;

use super::capture::CaptureRecord;
use super::compound::CompoundResult;
use super::cursor::TargetCursor;
use super::restore::compensate_all;
use super::strategy::MutationStrategy;

/// Lifecycle of one multi-repository operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationState {
    Created,
    Running,
    FullySucceeded,
    Halted,
    RollingBack,
    RolledBackFully,
    RolledBackPartially,
}

/// Misuse of the coordinator lifecycle.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("operation was already executed (state: {0:?})")]
    AlreadyExecuted(OperationState),
    #[error("operation has not run yet, nothing to roll back (state: {0:?})")]
    NotRollbackable(OperationState),
}

/// Detail of the fatal forward-pass failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaltDetail {
    pub repo: RepoKey,
    pub error: String,
}

/// Verdict of the forward pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// Every target was mutated.
    Completed,
    /// Traversal stopped at the first failure; targets at and after the
    /// failing one are untouched.
    Halted(HaltDetail),
}

/// Applies one mutation strategy across an ordered target set.
///
/// The forward pass is synchronous and single-threaded: targets are
/// mutated strictly in declaration order, never concurrently, and the
/// pass runs to exhaustion or to the first failure. Rollback
/// compensates the successful prefix, in order, and only where a
/// captured state exists.
///
/// Rollback is deliberately not guarded against repetition: invoking it
/// again on an already-rolled-back operation re-runs every compensation
/// and reports the resulting failures.
pub struct OperationCoordinator<S: MutationStrategy> {
    strategy: S,
    cursor: TargetCursor,
    capture: CaptureRecord,
    successful: Vec<RepoKey>,
    state: OperationState,
    halt: Option<HaltDetail>,
    refresh: Arc<dyn RefreshHook>,
}

impl<S: MutationStrategy> OperationCoordinator<S> {
    pub fn new(
        strategy: S,
        targets: Vec<RepoKey>,
        capture: CaptureRecord,
        refresh: Arc<dyn RefreshHook>,
    ) -> Self {
        Self {
            strategy,
            cursor: TargetCursor::new(targets),
            capture,
            successful: Vec::new(),
            state: OperationState::Created,
            halt: None,
            refresh,
        }
    }

    /// Run the forward pass.
    ///
    /// Errors only when called on an operation that already ran.
    pub fn execute(&mut self) -> Result<ForwardOutcome, CoordinatorError> {
        if self.state != OperationState::Created {
            return Err(CoordinatorError::AlreadyExecuted(self.state));
        }
        self.state = OperationState::Running;

        while let Some(repo) = self.cursor.advance() {
            let result = self.strategy.apply(&repo);
            if result.success() {
                self.refresh.refresh(&repo);
                self.successful.push(repo);
            } else {
                let detail = HaltDetail {
                    repo,
                    error: result.error_output().to_string(),
                };
                tracing::warn!(
                    operation = self.strategy.operation_name(),
                    repo = %detail.repo,
                    error = %detail.error,
                    "halting forward pass after fatal failure"
                );
                self.halt = Some(detail.clone());
                self.state = OperationState::Halted;
                return Ok(ForwardOutcome::Halted(detail));
            }
        }

        self.state = OperationState::FullySucceeded;
        Ok(ForwardOutcome::Completed)
    }

    /// Compensate the successful prefix.
    ///
    /// Callable after a halt or, as an explicit undo, after full
    /// success. Per-target failures are aggregated, never fatal to the
    /// pass: every remaining target is still attempted.
    pub fn rollback(&mut self) -> Result<CompoundResult, CoordinatorError> {
        if matches!(self.state, OperationState::Created | OperationState::Running) {
            return Err(CoordinatorError::NotRollbackable(self.state));
        }
        self.state = OperationState::RollingBack;

        let result = compensate_all(
            &self.strategy,
            &self.successful,
            &self.capture,
            self.refresh.as_ref(),
        );

        self.state = if result.total_success() {
            OperationState::RolledBackFully
        } else {
            OperationState::RolledBackPartially
        };
        tracing::info!(
            operation = self.strategy.operation_name(),
            state = ?self.state,
            "rollback pass finished"
        );
        Ok(result)
    }

    /// Targets that completed the forward mutation, in traversal order.
    pub fn successful_targets(&self) -> &[RepoKey] {
        &self.successful
    }

    pub fn state(&self) -> OperationState {
        self.state
    }

    pub fn halt_detail(&self) -> Option<&HaltDetail> {
        self.halt.as_ref()
    }

    pub fn capture(&self) -> &CaptureRecord {
        &self.capture
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn operation_name(&self) -> &str {
        self.strategy.operation_name()
    }

    /// Proposal text enumerating the successful prefix.
    pub fn rollback_proposal(&self) -> String {
        self.strategy.rollback_proposal(&self.successful)
    }
}
