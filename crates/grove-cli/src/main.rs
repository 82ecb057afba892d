//! Grove - multi-repository ref operations
//!
//! Usage:
//!   grove tag delete v1.2.3   # delete a tag across the workspace
//!   grove undo                # restore the refs of the last deletion
//!   grove repos               # list the repositories an operation would target

mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grove_core::commands::{DeleteTagCommand, DeleteTagOptions, DeleteTagReport, UndoCommand};
use grove_core::config::ConfigStore;
use grove_core::git::GitBackend;
use grove_core::journal::UndoJournal;
use grove_core::operation::{OperationState, RollbackOutcome};
use grove_core::services::{NoopRefresh, OperationServices, StaticConfirm, TokioRunner};
use grove_core::types::RollbackPolicy;
use grove_core::workspace;

use crate::console::{ConsoleNotifier, DialoguerConfirm, JournalClearingHandle};

#[derive(Parser)]
#[command(name = "grove")]
#[command(about = "Multi-repository ref operations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tag operations across the workspace
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },

    /// Restore the refs removed by the last operation
    Undo {
        /// Workspace root (defaults to the current directory)
        #[arg(long)]
        workspace: Option<PathBuf>,
    },

    /// List the repositories an operation would target
    Repos {
        /// Target repository (repeatable; overrides grove.toml and discovery)
        #[arg(long = "repo", value_name = "PATH")]
        repos: Vec<PathBuf>,

        /// Workspace root (defaults to the current directory)
        #[arg(long)]
        workspace: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum TagCommands {
    /// Delete a tag in every target repository
    ///
    /// Repositories are processed in order; the first failure halts the
    /// run and the already-deleted tags can be rolled back.
    Delete {
        /// Tag name
        name: String,

        /// Target repository (repeatable; overrides grove.toml and discovery)
        #[arg(long = "repo", value_name = "PATH")]
        repos: Vec<PathBuf>,

        /// Rollback policy after a halted run
        ///
        /// - ask (default): propose the rollback and wait for confirmation
        /// - auto: roll back immediately
        /// - never: leave the successful prefix in place
        #[arg(long)]
        rollback: Option<String>,

        /// Answer yes to all confirmation prompts (for CI/CD)
        #[arg(short = 'y', long)]
        yes: bool,

        /// Workspace root (defaults to the current directory)
        #[arg(long)]
        workspace: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grove=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // The runtime backs deferred restores; dropping it at the end of
    // main drains any scheduled background work.
    let runtime = tokio::runtime::Runtime::new()?;
    let result = run_cli(cli.command, &runtime);
    drop(runtime);
    result
}

fn run_cli(command: Commands, runtime: &tokio::runtime::Runtime) -> Result<()> {
    match command {
        Commands::Tag {
            command:
                TagCommands::Delete {
                    name,
                    repos,
                    rollback,
                    yes,
                    workspace,
                    format,
                },
        } => run_tag_delete(runtime, name, repos, rollback, yes, workspace, format),
        Commands::Undo { workspace } => run_undo(runtime, workspace),
        Commands::Repos { repos, workspace } => run_repos(repos, workspace),
    }
}

fn run_tag_delete(
    runtime: &tokio::runtime::Runtime,
    name: String,
    repos: Vec<PathBuf>,
    rollback: Option<String>,
    yes: bool,
    workspace: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let workspace_root = resolve_workspace_root(workspace)?;
    let store = ConfigStore::new(workspace_root.clone());
    let config = store.load()?;

    let policy = rollback
        .as_deref()
        .map(str::parse::<RollbackPolicy>)
        .transpose()?
        .unwrap_or(config.rollback);

    let targets = workspace::resolve_targets(&workspace_root, &config, &repos)?;
    if targets.is_empty() {
        anyhow::bail!(
            "No repositories found under {}",
            workspace_root.display()
        );
    }

    let services = build_services(runtime, yes);
    let command = DeleteTagCommand::new(GitBackend::new(), services);
    let options = DeleteTagOptions::new(&name)
        .with_repos(targets.iter().map(|key| key.to_path_buf()))
        .with_rollback(policy);

    let report = command.execute(&options)?;

    if let Some(request) = &report.restore {
        let journal = UndoJournal::new(UndoJournal::default_store_dir()?);
        journal.record(&workspace_root, request)?;
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_report(&report),
    }

    if report.failure.is_some() {
        anyhow::bail!("Tag deletion halted");
    }
    Ok(())
}

fn run_undo(runtime: &tokio::runtime::Runtime, workspace: Option<PathBuf>) -> Result<()> {
    let workspace_root = resolve_workspace_root(workspace)?;
    let journal = UndoJournal::new(UndoJournal::default_store_dir()?);
    let Some(entry) = journal.load_latest(&workspace_root)? else {
        anyhow::bail!("Nothing to undo for {}", workspace_root.display());
    };

    println!(
        "Restoring {} across {} repositories",
        entry.request.operation.describe(),
        entry.request.targets.len()
    );

    let services = build_services(runtime, true);
    let undo = UndoCommand::new(GitBackend::new(), services);
    let handle = JournalClearingHandle::new(journal, workspace_root);
    undo.restore_in_background(entry.request, Some(Box::new(handle)));
    Ok(())
}

fn run_repos(repos: Vec<PathBuf>, workspace: Option<PathBuf>) -> Result<()> {
    let workspace_root = resolve_workspace_root(workspace)?;
    let store = ConfigStore::new(workspace_root.clone());
    let config = store.load()?;
    let targets = workspace::resolve_targets(&workspace_root, &config, &repos)?;

    if targets.is_empty() {
        println!("No repositories found under {}", workspace_root.display());
        return Ok(());
    }
    for target in targets {
        println!("{target}");
    }
    Ok(())
}

fn resolve_workspace_root(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(root) => Ok(root),
        None => Ok(std::env::current_dir()?),
    }
}

fn build_services(runtime: &tokio::runtime::Runtime, yes: bool) -> OperationServices {
    OperationServices::new(
        Arc::new(ConsoleNotifier),
        if yes {
            Arc::new(StaticConfirm(true))
        } else {
            Arc::new(DialoguerConfirm)
        },
        Arc::new(TokioRunner::new(runtime.handle().clone())),
        Arc::new(NoopRefresh),
    )
}

fn print_report(report: &DeleteTagReport) {
    for repo in &report.deleted {
        println!("  deleted '{}' in {}", report.tag, repo.short_name());
    }
    if let Some(failure) = &report.failure {
        println!(
            "  failed in {}: {}",
            failure.repo.short_name(),
            failure.error
        );
    }
    if let Some(rollback) = &report.rollback {
        for entry in rollback.entries() {
            match &entry.outcome {
                RollbackOutcome::Restored => {
                    println!("  restored '{}' in {}", report.tag, entry.repo.short_name());
                }
                RollbackOutcome::CommandFailed(detail) => {
                    println!("  restore failed in {}: {}", entry.repo.short_name(), detail);
                }
                RollbackOutcome::Uncompensable => {
                    println!(
                        "  cannot restore in {}: no captured state",
                        entry.repo.short_name()
                    );
                }
            }
        }
    }
    if report.state == OperationState::FullySucceeded {
        println!("  {} repositories updated", report.deleted.len());
    }
}
