//! Git subprocess backend for ref mutations.

use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::types::RepoKey;

/// Outcome of one blocking git invocation against one repository.
///
/// Spawn failures are folded into a failed result; the backend never
/// panics and never returns an error value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    success: bool,
    stdout: String,
    stderr: String,
}

impl CommandResult {
    /// A successful result with no output.
    pub fn ok() -> Self {
        Self {
            success: true,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// A failed result carrying the error detail.
    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: detail.into(),
        }
    }

    /// Build a result from a finished process.
    pub fn from_output(output: std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Error detail for user-facing reports.
    pub fn error_output(&self) -> &str {
        self.stderr.trim()
    }
}

/// Runs git ref mutations as subprocesses in a repository root.
#[derive(Debug, Clone, Default)]
pub struct GitBackend;

impl GitBackend {
    pub fn new() -> Self {
        Self
    }

    /// Delete a tag in one repository.
    pub fn delete_tag(&self, repo: &RepoKey, tag: &str) -> CommandResult {
        self.run(repo, &["tag", "-d", tag])
    }

    /// Create a tag pointing at a revision in one repository.
    ///
    /// Fails if the tag already exists; restoring never overwrites.
    pub fn create_tag(&self, repo: &RepoKey, tag: &str, revision: &str) -> CommandResult {
        self.run(repo, &["tag", tag, revision])
    }

    fn run(&self, repo: &RepoKey, args: &[&str]) -> CommandResult {
        let output = Command::new("git")
            .args(args)
            .current_dir(repo.path())
            .output();
        match output {
            Ok(output) => CommandResult::from_output(output),
            Err(err) => CommandResult::error(format!("Failed to invoke git {:?}: {}", args, err)),
        }
    }
}
