//! Console implementations of the notification and confirmation seams.

use std::path::PathBuf;

use console::style;
use dialoguer::Confirm;

use grove_core::journal::UndoJournal;
use grove_core::operation::RestoreRequest;
use grove_core::services::{
    ConfirmationGateway, NotificationGateway, NotificationHandle, Severity,
};

/// Prints notifications to the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

struct ConsoleHandle;

impl NotificationGateway for ConsoleNotifier {
    fn notify(
        &self,
        severity: Severity,
        title: &str,
        message: &str,
    ) -> Box<dyn NotificationHandle> {
        let tag = match severity {
            Severity::Info => style("ok").green(),
            Severity::Warning => style("warn").yellow(),
            Severity::Error => style("error").red(),
        };
        if title.is_empty() {
            println!("{tag} {message}");
        } else {
            println!("{tag} {}: {message}", style(title).bold());
        }
        Box::new(ConsoleHandle)
    }
}

impl NotificationHandle for ConsoleHandle {
    fn offer_restore(&mut self, label: &str, _request: &RestoreRequest) {
        println!("   {label}: run `grove undo`");
    }

    fn expire(&mut self) {}
}

/// Notification handle for `grove undo`: clears the journal entry once
/// the restore fully succeeds.
pub struct JournalClearingHandle {
    journal: UndoJournal,
    workspace_root: PathBuf,
}

impl JournalClearingHandle {
    pub fn new(journal: UndoJournal, workspace_root: PathBuf) -> Self {
        Self {
            journal,
            workspace_root,
        }
    }
}

impl NotificationHandle for JournalClearingHandle {
    fn offer_restore(&mut self, _label: &str, _request: &RestoreRequest) {}

    fn expire(&mut self) {
        if let Err(err) = self.journal.clear(&self.workspace_root) {
            tracing::warn!(error = %err, "failed to clear undo journal");
        }
        println!("{} restore complete", style("ok").green());
    }
}

/// Interactive rollback confirmation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialoguerConfirm;

impl ConfirmationGateway for DialoguerConfirm {
    fn propose(&self, text: &str) -> bool {
        println!("{text}");
        Confirm::new()
            .with_prompt("Roll back now?")
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}
