//! Coordinator state-machine behavior with scripted strategies.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use grove_core::git::CommandResult;
use grove_core::operation::{
    CaptureRecord, CoordinatorError, ForwardOutcome, MutationStrategy, OperationCoordinator,
    OperationState, RollbackOutcome,
};
use grove_core::services::{NoopRefresh, RefreshHook};
use grove_core::types::RepoKey;

fn key(name: &str) -> RepoKey {
    RepoKey::from_canonical(format!("/w/{name}"))
}

fn keys(names: &[&str]) -> Vec<RepoKey> {
    names.iter().map(|name| key(name)).collect()
}

/// Capture record covering every given target with a distinct tip.
fn capture_for(targets: &[RepoKey]) -> CaptureRecord {
    let mut record = CaptureRecord::new();
    for (index, repo) in targets.iter().enumerate() {
        record.insert(repo.clone(), format!("tip-{index}"));
    }
    record
}

fn noop() -> Arc<dyn RefreshHook> {
    Arc::new(NoopRefresh)
}

#[derive(Default)]
struct ScriptedStrategy {
    fail_apply: HashMap<RepoKey, String>,
    fail_compensate: HashMap<RepoKey, String>,
    /// Second compensation for the same repo fails, like recreating an
    /// existing ref.
    conflict_on_repeat: bool,
    applied: RefCell<Vec<RepoKey>>,
    compensated: RefCell<Vec<(RepoKey, String)>>,
    restored: RefCell<HashSet<RepoKey>>,
}

impl ScriptedStrategy {
    fn failing_apply(repo: &RepoKey, detail: &str) -> Self {
        let mut strategy = Self::default();
        strategy.fail_apply.insert(repo.clone(), detail.to_string());
        strategy
    }

    fn failing_compensate(repo: &RepoKey, detail: &str) -> Self {
        let mut strategy = Self::default();
        strategy
            .fail_compensate
            .insert(repo.clone(), detail.to_string());
        strategy
    }

    fn conflicting_on_repeat() -> Self {
        Self {
            conflict_on_repeat: true,
            ..Self::default()
        }
    }
}

impl MutationStrategy for ScriptedStrategy {
    fn operation_name(&self) -> &str {
        "scripted mutation"
    }

    fn apply(&self, repo: &RepoKey) -> CommandResult {
        self.applied.borrow_mut().push(repo.clone());
        match self.fail_apply.get(repo) {
            Some(detail) => CommandResult::error(detail.clone()),
            None => CommandResult::ok(),
        }
    }

    fn compensate(&self, repo: &RepoKey, captured: &str) -> CommandResult {
        self.compensated
            .borrow_mut()
            .push((repo.clone(), captured.to_string()));
        if let Some(detail) = self.fail_compensate.get(repo) {
            return CommandResult::error(detail.clone());
        }
        if self.conflict_on_repeat && !self.restored.borrow_mut().insert(repo.clone()) {
            return CommandResult::error(format!("ref already exists in {}", repo.short_name()));
        }
        CommandResult::ok()
    }

    fn rollback_proposal(&self, successful: &[RepoKey]) -> String {
        successful
            .iter()
            .map(RepoKey::short_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[test]
fn full_success_keeps_traversal_order() {
    let targets = keys(&["alpha", "beta", "gamma"]);
    let capture = capture_for(&targets);
    let mut coordinator = OperationCoordinator::new(
        ScriptedStrategy::default(),
        targets.clone(),
        capture,
        noop(),
    );

    let outcome = coordinator.execute().expect("first execute");

    assert_eq!(outcome, ForwardOutcome::Completed);
    assert_eq!(coordinator.state(), OperationState::FullySucceeded);
    assert_eq!(coordinator.successful_targets(), targets.as_slice());
    assert_eq!(*coordinator.strategy().applied.borrow(), targets);
}

#[test]
fn halt_stops_at_first_failure() {
    let targets = keys(&["alpha", "beta", "gamma"]);
    let capture = capture_for(&targets);
    let strategy = ScriptedStrategy::failing_apply(&targets[1], "not found");
    let mut coordinator = OperationCoordinator::new(strategy, targets.clone(), capture, noop());

    let outcome = coordinator.execute().expect("first execute");

    let ForwardOutcome::Halted(detail) = outcome else {
        panic!("expected halt");
    };
    assert_eq!(detail.repo, targets[1]);
    assert_eq!(detail.error, "not found");
    assert_eq!(coordinator.state(), OperationState::Halted);
    // SuccessfulSet is exactly the prefix before the failure.
    assert_eq!(coordinator.successful_targets(), &targets[..1]);
    // The target after the failing one is never attempted.
    assert_eq!(*coordinator.strategy().applied.borrow(), targets[..2]);
}

#[test]
fn execute_twice_is_an_error() {
    let targets = keys(&["alpha"]);
    let capture = capture_for(&targets);
    let mut coordinator =
        OperationCoordinator::new(ScriptedStrategy::default(), targets, capture, noop());

    coordinator.execute().expect("first execute");
    let error = coordinator.execute().expect_err("second execute");
    assert!(matches!(error, CoordinatorError::AlreadyExecuted(_)));
}

#[test]
fn rollback_before_execute_is_an_error() {
    let targets = keys(&["alpha"]);
    let capture = capture_for(&targets);
    let mut coordinator =
        OperationCoordinator::new(ScriptedStrategy::default(), targets, capture, noop());

    let error = coordinator.rollback().expect_err("rollback before execute");
    assert!(matches!(error, CoordinatorError::NotRollbackable(_)));
}

#[test]
fn rollback_after_full_success_restores_every_target() {
    let targets = keys(&["alpha", "beta", "gamma"]);
    let capture = capture_for(&targets);
    let mut coordinator = OperationCoordinator::new(
        ScriptedStrategy::default(),
        targets.clone(),
        capture,
        noop(),
    );

    coordinator.execute().expect("execute");
    let result = coordinator.rollback().expect("rollback");

    assert!(result.total_success());
    assert_eq!(coordinator.state(), OperationState::RolledBackFully);
    let compensated = coordinator.strategy().compensated.borrow();
    assert_eq!(compensated.len(), 3);
    // Compensation uses the captured tips, in traversal order.
    assert_eq!(compensated[0], (targets[0].clone(), "tip-0".to_string()));
    assert_eq!(compensated[2], (targets[2].clone(), "tip-2".to_string()));
}

#[test]
fn rollback_after_halt_compensates_only_the_prefix() {
    let targets = keys(&["alpha", "beta", "gamma"]);
    let capture = capture_for(&targets);
    let strategy = ScriptedStrategy::failing_apply(&targets[1], "not found");
    let mut coordinator = OperationCoordinator::new(strategy, targets.clone(), capture, noop());

    coordinator.execute().expect("execute");
    let result = coordinator.rollback().expect("rollback");

    assert!(result.total_success());
    assert_eq!(coordinator.state(), OperationState::RolledBackFully);
    let compensated = coordinator.strategy().compensated.borrow();
    assert_eq!(compensated.len(), 1);
    assert_eq!(compensated[0].0, targets[0]);
}

#[test]
fn uncaptured_target_never_receives_a_compensate_call() {
    let targets = keys(&["alpha", "beta", "gamma"]);
    // gamma succeeded the forward pass but has no captured state.
    let capture = capture_for(&targets[..2]);
    let mut coordinator = OperationCoordinator::new(
        ScriptedStrategy::default(),
        targets.clone(),
        capture,
        noop(),
    );

    coordinator.execute().expect("execute");
    let result = coordinator.rollback().expect("rollback");

    assert!(!result.total_success());
    assert_eq!(coordinator.state(), OperationState::RolledBackPartially);
    let compensated = coordinator.strategy().compensated.borrow();
    assert!(compensated.iter().all(|(repo, _)| repo != &targets[2]));
    assert_eq!(
        result.entries().last().map(|entry| &entry.outcome),
        Some(&RollbackOutcome::Uncompensable)
    );
}

#[test]
fn rollback_attempts_every_target_despite_earlier_failures() {
    let targets = keys(&["alpha", "beta", "gamma"]);
    let capture = capture_for(&targets);
    let strategy = ScriptedStrategy::failing_compensate(&targets[1], "permission denied");
    let mut coordinator = OperationCoordinator::new(strategy, targets.clone(), capture, noop());

    coordinator.execute().expect("execute");
    let result = coordinator.rollback().expect("rollback");

    assert!(!result.total_success());
    assert_eq!(coordinator.state(), OperationState::RolledBackPartially);
    // All three targets were still attempted.
    assert_eq!(coordinator.strategy().compensated.borrow().len(), 3);

    let outcomes: Vec<_> = result
        .entries()
        .iter()
        .map(|entry| entry.outcome.clone())
        .collect();
    assert_eq!(
        outcomes,
        vec![
            RollbackOutcome::Restored,
            RollbackOutcome::CommandFailed("permission denied".to_string()),
            RollbackOutcome::Restored,
        ]
    );
    assert!(
        result
            .error_output_with_repo_indication()
            .contains("beta: permission denied")
    );
}

#[test]
fn double_rollback_is_not_guarded() {
    let targets = keys(&["alpha", "beta"]);
    let capture = capture_for(&targets);
    let mut coordinator = OperationCoordinator::new(
        ScriptedStrategy::conflicting_on_repeat(),
        targets,
        capture,
        noop(),
    );

    coordinator.execute().expect("execute");
    let first = coordinator.rollback().expect("first rollback");
    assert!(first.total_success());
    assert_eq!(coordinator.state(), OperationState::RolledBackFully);

    // A second rollback re-runs every compensation; each one now fails
    // because the refs already exist again.
    let second = coordinator.rollback().expect("second rollback");
    assert!(!second.total_success());
    assert_eq!(coordinator.state(), OperationState::RolledBackPartially);
    assert!(
        second
            .entries()
            .iter()
            .all(|entry| matches!(entry.outcome, RollbackOutcome::CommandFailed(_)))
    );
}

#[test]
fn rollback_of_an_empty_prefix_is_trivially_full() {
    let targets = keys(&["alpha", "beta"]);
    let capture = capture_for(&targets);
    let strategy = ScriptedStrategy::failing_apply(&targets[0], "not found");
    let mut coordinator = OperationCoordinator::new(strategy, targets, capture, noop());

    coordinator.execute().expect("execute");
    let result = coordinator.rollback().expect("rollback");

    assert!(result.entries().is_empty());
    assert!(result.total_success());
    assert_eq!(coordinator.state(), OperationState::RolledBackFully);
    assert!(coordinator.strategy().compensated.borrow().is_empty());
}

#[test]
fn proposal_names_only_the_successful_prefix() {
    let targets = keys(&["alpha", "beta", "gamma"]);
    let capture = capture_for(&targets);
    let strategy = ScriptedStrategy::failing_apply(&targets[1], "not found");
    let mut coordinator = OperationCoordinator::new(strategy, targets, capture, noop());

    coordinator.execute().expect("execute");
    let proposal = coordinator.rollback_proposal();

    assert!(proposal.contains("alpha"));
    assert!(!proposal.contains("beta"));
    assert!(!proposal.contains("gamma"));
}

#[derive(Default)]
struct RecordingRefresh {
    seen: Mutex<Vec<RepoKey>>,
}

impl RefreshHook for RecordingRefresh {
    fn refresh(&self, repo: &RepoKey) {
        self.seen.lock().expect("refresh lock").push(repo.clone());
    }
}

#[test]
fn refresh_runs_after_each_successful_apply_and_compensate() {
    let targets = keys(&["alpha", "beta"]);
    let capture = capture_for(&targets);
    let refresh = Arc::new(RecordingRefresh::default());
    let strategy = ScriptedStrategy::failing_compensate(&targets[1], "permission denied");
    let mut coordinator =
        OperationCoordinator::new(strategy, targets.clone(), capture, refresh.clone());

    coordinator.execute().expect("execute");
    coordinator.rollback().expect("rollback");

    // Two forward refreshes, then one for the single successful
    // compensation; the failed compensate does not refresh.
    let seen = refresh.seen.lock().expect("refresh lock");
    assert_eq!(
        *seen,
        vec![
            targets[0].clone(),
            targets[1].clone(),
            targets[0].clone(),
        ]
    );
}
