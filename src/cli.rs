use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Synchronize LeanKit cards onto Asana tasks.
#[derive(Debug, Parser)]
#[command(name = "lanesync", version)]
pub struct Cli {
    /// Settings file (defaults to ~/.lanesync/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless LOG_LEVEL says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Get information from LeanKit and Asana
    Info(InfoArgs),
    /// Sync all active cards to Asana using a mapping file
    Sync(SyncArgs),
}

#[derive(Debug, Args)]
#[command(group(clap::ArgGroup::new("target").required(true)))]
pub struct InfoArgs {
    /// Get LeanKit board information
    #[arg(short, long, group = "target")]
    pub board: bool,

    /// Get Asana project information
    #[arg(short, long, group = "target")]
    pub project: bool,

    /// Get tasks for the Asana project
    #[arg(short, long, group = "target")]
    pub tasks: bool,

    /// Delete all Asana project tasks
    #[arg(short, long, group = "target")]
    pub delete_tasks: bool,

    /// Get the task linked to a LeanKit card id
    #[arg(long, value_name = "ID", alias = "task-leankit-id", group = "target")]
    pub task_card_id: Option<String>,

    /// Store results in the specified file
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Mapping document (JSON)
    pub mapping: PathBuf,

    /// Map cards without changing anything in Asana
    #[arg(short, long)]
    pub test: bool,

    /// Store mapped cards and tasks in this file
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}
