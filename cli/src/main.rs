//! CLI for the Redmine to GitLab migrator.
//!
//! Reads a Redmine project and recreates its users' content, roadmap and
//! issues in a GitLab project.

use clap::{Parser, Subcommand};
use redmine_gitlab_migrator::{
    MigrationConfig, RunSummary, Runner, RunnerConfig, RunnerError, DEFAULT_CONFIG_FILE,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Redmine to GitLab migrator - Copy users' issues, notes and versions to GitLab.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the migrator configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Redmine API key.
    #[arg(long, env = "REDMINE_API_KEY", hide_env_values = true)]
    redmine_key: String,

    /// GitLab access token of an administrator.
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    gitlab_token: String,

    /// Print payloads without writing anything to GitLab.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Report Redmine participants without a GitLab account.
    CheckUsers,
    /// Migrate Redmine versions to GitLab milestones.
    MigrateRoadmap,
    /// Migrate Redmine issues, their notes and attachments.
    MigrateIssues,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();
    let command = args.command;

    match run(args).await {
        Ok(summary) => {
            print_summary(command, &summary);

            if summary.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::from(0)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Sets up the global tracing subscriber with compact single-line output,
/// filtered through `RUST_LOG` (defaults to "info").
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let settings = MigrationConfig::load(&args.config)?;
    let config = RunnerConfig::new(settings, args.redmine_key, args.gitlab_token, args.dry_run);
    let runner = Runner::new(config)?;

    match args.command {
        Command::CheckUsers => runner.check_users().await,
        Command::MigrateRoadmap => runner.migrate_roadmap().await,
        Command::MigrateIssues => runner.migrate_issues().await,
    }
}

/// Prints the final run summary.
fn print_summary(command: Command, summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );

    match command {
        Command::CheckUsers => {
            println!("  Users checked: {}", summary.users_checked);
            println!("  Users missing on GitLab: {}", summary.users_missing);
        }
        Command::MigrateRoadmap => {
            println!("  Milestones skipped: {}", summary.milestones_skipped);
            if summary.dry_run {
                println!("  Milestones previewed: {}", summary.previewed);
            } else {
                println!("  Milestones created: {}", summary.milestones_created);
                println!("  Milestones closed: {}", summary.milestones_closed);
            }
        }
        Command::MigrateIssues => {
            if summary.dry_run {
                println!("  Issues previewed: {}", summary.previewed);
            } else {
                println!("  Issues created: {}", summary.issues_created);
                println!("  Issues closed: {}", summary.issues_closed);
                println!("  Notes created: {}", summary.notes_created);
                println!(
                    "  Attachments downloaded: {}",
                    summary.attachments_downloaded
                );
            }
        }
    }
}
