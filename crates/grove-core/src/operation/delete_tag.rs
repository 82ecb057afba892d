//! Tag deletion as a mutation strategy.

use crate::git::{CommandResult, GitBackend};
use crate::types::RepoKey;

use super::strategy::MutationStrategy;

/// Deletes one tag per repository; compensates by recreating the tag
/// at the captured tip.
#[derive(Debug, Clone)]
pub struct TagDeleteStrategy {
    git: GitBackend,
    tag: String,
}

impl TagDeleteStrategy {
    pub fn new(git: GitBackend, tag: impl Into<String>) -> Self {
        Self {
            git,
            tag: tag.into(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The ref whose tip is captured before deletion.
    pub fn capture_reference(&self) -> String {
        format!("refs/tags/{}", self.tag)
    }
}

impl MutationStrategy for TagDeleteStrategy {
    fn operation_name(&self) -> &str {
        "tag deletion"
    }

    fn apply(&self, repo: &RepoKey) -> CommandResult {
        self.git.delete_tag(repo, &self.tag)
    }

    fn compensate(&self, repo: &RepoKey, captured: &str) -> CommandResult {
        self.git.create_tag(repo, &self.tag, captured)
    }

    fn rollback_proposal(&self, successful: &[RepoKey]) -> String {
        let roots = successful
            .iter()
            .map(RepoKey::short_name)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "However, tag deletion succeeded in: {roots}. \
             You may roll back (recreate '{}' in these roots) to keep tags from diverging.",
            self.tag
        )
    }
}
