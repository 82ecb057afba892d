//! Real-git fixtures for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

const GIT_ENV_OVERRIDES: [&str; 4] = [
    "GIT_DIR",
    "GIT_WORK_TREE",
    "GIT_INDEX_FILE",
    "GIT_COMMON_DIR",
];

pub fn git_command() -> Command {
    let mut cmd = Command::new("git");
    for key in GIT_ENV_OVERRIDES {
        cmd.env_remove(key);
    }
    cmd
}

pub fn run_git(repo: &Path, args: &[&str]) {
    let status = git_command()
        .args(args)
        .current_dir(repo)
        .status()
        .expect("Failed to invoke git");
    assert!(status.success(), "git command failed: {:?}", args);
}

pub fn init_repo(repo: &Path) {
    std::fs::create_dir_all(repo).expect("Failed to create repo dir");
    run_git(repo, &["init"]);
    run_git(repo, &["checkout", "-b", "main"]);
    run_git(repo, &["config", "user.email", "test@example.com"]);
    run_git(repo, &["config", "user.name", "Test User"]);
    run_git(repo, &["config", "commit.gpgsign", "false"]);
    std::fs::write(repo.join("README.md"), "root file").expect("Failed to write README.md");
    run_git(repo, &["add", "."]);
    run_git(repo, &["commit", "-m", "init"]);
}

pub fn commit_file(repo: &Path, name: &str, content: &str, message: &str) {
    std::fs::write(repo.join(name), content).expect("Failed to write file");
    run_git(repo, &["add", "."]);
    run_git(repo, &["commit", "-m", message]);
}

pub fn tag(repo: &Path, name: &str) {
    run_git(repo, &["tag", name]);
}

pub fn tag_exists(repo: &Path, name: &str) -> bool {
    git_command()
        .args(["rev-parse", "--verify", &format!("refs/tags/{name}")])
        .current_dir(repo)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

pub fn rev_parse(repo: &Path, rev: &str) -> String {
    let output = git_command()
        .args(["rev-parse", rev])
        .current_dir(repo)
        .output()
        .expect("Failed to run git rev-parse");
    assert!(output.status.success(), "rev-parse failed for {rev}");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
