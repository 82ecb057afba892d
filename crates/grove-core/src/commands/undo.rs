//! Deferred restore of a finished operation.

use crate::git::GitBackend;
use crate::operation::{CompoundResult, RestoreRequest, run_restore};
use crate::services::{NotificationHandle, OperationServices, Severity};

/// Compensates a finished operation from its serializable restore
/// request.
pub struct UndoCommand {
    git: GitBackend,
    services: OperationServices,
}

impl UndoCommand {
    pub fn new(git: GitBackend, services: OperationServices) -> Self {
        Self { git, services }
    }

    /// Run the restore on the calling thread.
    pub fn execute(&self, request: &RestoreRequest) -> CompoundResult {
        run_restore(request, &self.git, self.services.refresh.as_ref())
    }

    /// Run the restore on the background runner without blocking the
    /// caller.
    ///
    /// On a fully successful restore the originating notification is
    /// expired; on a partial restore a new error notification is
    /// surfaced and the original is left in place.
    pub fn restore_in_background(
        &self,
        request: RestoreRequest,
        notification: Option<Box<dyn NotificationHandle>>,
    ) {
        let git = self.git.clone();
        let notifier = self.services.notifier.clone();
        let refresh = self.services.refresh.clone();
        let label = format!("Restoring {}", request.operation.describe());

        self.services.runner.schedule(
            &label,
            Box::new(move || {
                let result = run_restore(&request, &git, refresh.as_ref());
                if result.total_success() {
                    if let Some(mut handle) = notification {
                        handle.expire();
                    }
                } else {
                    notifier.notify(
                        Severity::Error,
                        &format!("Couldn't restore {}", request.operation.describe()),
                        &result.error_output_with_repo_indication(),
                    );
                }
            }),
        );
    }
}
