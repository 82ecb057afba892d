//! Mutation strategy seam between the coordinator and a backend.

use crate::git::CommandResult;
use crate::types::RepoKey;

/// One mutating operation kind, bundled as a value.
///
/// The coordinator is parameterized by this trait instead of being
/// subclassed: `apply`/`compensate` run the backend command for one
/// target, the remaining methods supply user-facing wording.
pub trait MutationStrategy {
    /// Short human-readable operation name, e.g. "tag deletion".
    fn operation_name(&self) -> &str;

    /// Apply the forward mutation to one target. Blocking; the outcome
    /// is reported atomically.
    fn apply(&self, repo: &RepoKey) -> CommandResult;

    /// Undo a previously applied mutation using the captured state.
    /// Blocking.
    fn compensate(&self, repo: &RepoKey, captured: &str) -> CommandResult;

    /// Wording for the rollback proposal over the successful prefix.
    fn rollback_proposal(&self, successful: &[RepoKey]) -> String;
}
