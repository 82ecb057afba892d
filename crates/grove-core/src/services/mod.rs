//! Collaborator seams: notifications, confirmation, background work,
//! and cache refresh.
//!
//! All collaborators are explicit handles injected at construction so
//! frontends and tests can substitute them freely.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::operation::RestoreRequest;
use crate::types::RepoKey;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One presented notification.
pub trait NotificationHandle: Send {
    /// Attach a restore action carrying the serializable request.
    fn offer_restore(&mut self, label: &str, request: &RestoreRequest);

    /// Dismiss the notification.
    fn expire(&mut self);
}

/// Presents operation results to the user.
pub trait NotificationGateway: Send + Sync {
    fn notify(&self, severity: Severity, title: &str, message: &str)
    -> Box<dyn NotificationHandle>;
}

/// Asks the user whether to run a proposed rollback.
pub trait ConfirmationGateway: Send + Sync {
    fn propose(&self, text: &str) -> bool;
}

/// Executes deferred work off the calling thread. Fire-and-forget: no
/// result is observed by the scheduler.
pub trait BackgroundRunner: Send + Sync {
    fn schedule(&self, label: &str, task: Box<dyn FnOnce() + Send + 'static>);
}

/// Invalidates externally cached views of one repository after a
/// successful apply or compensate.
pub trait RefreshHook: Send + Sync {
    fn refresh(&self, repo: &RepoKey);
}

/// Refresh hook that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRefresh;

impl RefreshHook for NoopRefresh {
    fn refresh(&self, _repo: &RepoKey) {}
}

/// Confirmation gateway with a fixed answer, for `--yes` flows and
/// non-interactive policies.
#[derive(Debug, Clone, Copy)]
pub struct StaticConfirm(pub bool);

impl ConfirmationGateway for StaticConfirm {
    fn propose(&self, _text: &str) -> bool {
        self.0
    }
}

/// Background runner on the tokio blocking thread pool.
#[derive(Debug, Clone)]
pub struct TokioRunner {
    handle: tokio::runtime::Handle,
}

impl TokioRunner {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }
}

impl BackgroundRunner for TokioRunner {
    fn schedule(&self, label: &str, task: Box<dyn FnOnce() + Send + 'static>) {
        tracing::debug!(label, "scheduling background task");
        let _ = self.handle.spawn_blocking(task);
    }
}

/// Explicit service handles for one operation run.
#[derive(Clone)]
pub struct OperationServices {
    pub notifier: Arc<dyn NotificationGateway>,
    pub confirmation: Arc<dyn ConfirmationGateway>,
    pub runner: Arc<dyn BackgroundRunner>,
    pub refresh: Arc<dyn RefreshHook>,
}

impl OperationServices {
    pub fn new(
        notifier: Arc<dyn NotificationGateway>,
        confirmation: Arc<dyn ConfirmationGateway>,
        runner: Arc<dyn BackgroundRunner>,
        refresh: Arc<dyn RefreshHook>,
    ) -> Self {
        Self {
            notifier,
            confirmation,
            runner,
            refresh,
        }
    }
}
