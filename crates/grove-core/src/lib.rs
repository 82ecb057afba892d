//! Grove Core Library
//!
//! Multi-repository ref operations: apply a mutating git command across
//! an ordered set of repositories, halt on first failure, and roll back
//! the successful prefix from captured pre-mutation state — immediately
//! or deferred through a persisted restore request.

pub mod commands;
pub mod config;
pub mod git;
pub mod journal;
pub mod operation;
pub mod services;
pub mod types;
pub mod workspace;

/// Re-exports of commonly used types
pub mod prelude {
    // Commands
    pub use crate::commands::{DeleteTagCommand, DeleteTagOptions, DeleteTagReport, UndoCommand};

    // Configuration
    pub use crate::config::{ConfigStore, GroveConfig};

    // Git backend
    pub use crate::git::{CommandResult, GitBackend, GitRevisionResolver, RevisionResolver};

    // Journal
    pub use crate::journal::{JournalEntry, UndoJournal};

    // Operation coordination
    pub use crate::operation::{
        CaptureRecord, CompoundResult, CoordinatorError, ForwardOutcome, HaltDetail,
        MutationStrategy, OperationCoordinator, OperationKind, OperationState, RestoreRequest,
        RollbackEntry, RollbackOutcome, TagDeleteStrategy,
    };

    // Services
    pub use crate::services::{
        BackgroundRunner, ConfirmationGateway, NoopRefresh, NotificationGateway,
        NotificationHandle, OperationServices, RefreshHook, Severity, StaticConfirm, TokioRunner,
    };

    // Types
    pub use crate::types::{RepoKey, RollbackPolicy};
}
