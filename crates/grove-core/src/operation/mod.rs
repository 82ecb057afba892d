//! Multi-repository operation coordination.
//!
//! An operation applies one mutating command across an ordered set of
//! repositories: pre-mutation state is captured per target, the forward
//! pass halts at the first failure, and the successful prefix can be
//! compensated either immediately or later through a serializable
//! restore request.

mod capture;
mod compound;
mod coordinator;
mod cursor;
mod delete_tag;
mod restore;
mod strategy;

pub use capture::{CaptureRecord, capture_tips};
pub use compound::{CompoundResult, RollbackEntry, RollbackOutcome};
pub use coordinator::{
    CoordinatorError, ForwardOutcome, HaltDetail, OperationCoordinator, OperationState,
};
pub use cursor::TargetCursor;
pub use delete_tag::TagDeleteStrategy;
pub use restore::{OperationKind, RestoreRequest, run_restore};
pub use strategy::MutationStrategy;
