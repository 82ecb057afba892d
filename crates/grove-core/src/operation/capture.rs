//! Pre-mutation state capture.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::git::RevisionResolver;
use crate::types::RepoKey;

/// Captured pre-mutation tips, keyed by repository.
///
/// Built once at operation construction and read-only afterwards. A
/// repository missing from the record can never be compensated, even
/// if its forward mutation succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRecord {
    tips: BTreeMap<RepoKey, String>,
}

impl CaptureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, repo: RepoKey, tip: String) {
        self.tips.insert(repo, tip);
    }

    pub fn tip(&self, repo: &RepoKey) -> Option<&str> {
        self.tips.get(repo).map(String::as_str)
    }

    pub fn contains(&self, repo: &RepoKey) -> bool {
        self.tips.contains_key(repo)
    }

    pub fn len(&self) -> usize {
        self.tips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tips.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RepoKey, &str)> {
        self.tips.iter().map(|(repo, tip)| (repo, tip.as_str()))
    }
}

/// Resolve the pre-mutation tip of `reference` for every target.
///
/// A target whose resolution fails is logged and omitted; capture
/// coverage never blocks the forward pass.
pub fn capture_tips(
    resolver: &dyn RevisionResolver,
    targets: &[RepoKey],
    reference: &str,
) -> CaptureRecord {
    let mut record = CaptureRecord::new();
    for repo in targets {
        match resolver.resolve(repo, reference) {
            Ok(tip) => record.insert(repo.clone(), tip),
            Err(err) => {
                tracing::warn!(
                    repo = %repo,
                    reference,
                    error = %err,
                    "failed to capture pre-mutation tip; target will be uncompensable"
                );
            }
        }
    }
    record
}
