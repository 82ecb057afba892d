//! Revision resolution for the capture step.

use git2::Repository;

use crate::types::RepoKey;

/// Resolves a ref in one repository to a commit id.
///
/// Used only when an operation is constructed, before any mutation.
pub trait RevisionResolver {
    fn resolve(&self, repo: &RepoKey, reference: &str) -> anyhow::Result<String>;
}

/// Resolver backed by libgit2.
#[derive(Debug, Clone, Default)]
pub struct GitRevisionResolver;

impl GitRevisionResolver {
    pub fn new() -> Self {
        Self
    }
}

impl RevisionResolver for GitRevisionResolver {
    fn resolve(&self, repo: &RepoKey, reference: &str) -> anyhow::Result<String> {
        let repository = Repository::open(repo.path())?;
        let object = repository.revparse_single(reference)?;
        let commit = object.peel_to_commit()?;
        Ok(commit.id().to_string())
    }
}
