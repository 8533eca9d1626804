//! CLI for the GitLab to GitHub migrator.
//!
//! Reads a settings file and either lists the GitLab projects the token can
//! see or migrates the configured project into the configured GitHub
//! repository.

use clap::Parser;
use gitlab_migrator::source::SourceProject;
use gitlab_migrator::{RunOutcome, RunSummary, Runner, RunnerError, Settings, TokenOverrides};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// GitLab Migrator - Copy milestones, labels, issues and merge requests from GitLab to GitHub.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the settings file.
    #[arg(long, default_value = "settings.toml")]
    settings: PathBuf,

    /// Log GitHub writes instead of sending them.
    #[arg(long)]
    dry_run: bool,

    /// GitLab access token, overriding the settings file.
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    gitlab_token: Option<String>,

    /// GitHub access token, overriding the settings file.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    // Item failures are reported in the summary; only run-stopping errors fail the process.
    match run(args).await {
        Ok(RunOutcome::Projects(projects)) => {
            print_projects(&projects);
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Migrated(summary)) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Migration aborted");
            ExitCode::from(1)
        }
    }
}

/// Installs a compact subscriber filtered by `RUST_LOG`, defaulting to `info`.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

async fn run(args: Args) -> Result<RunOutcome, RunnerError> {
    let overrides = TokenOverrides {
        gitlab: args.gitlab_token,
        github: args.github_token,
    };
    let settings = Settings::load(&args.settings, overrides)?;
    let runner = Runner::new(&settings)?.with_dry_run(args.dry_run);
    runner.run().await
}

fn print_projects(projects: &[SourceProject]) {
    println!("\nProjects:");
    for project in projects {
        println!("{}", project_line(project));
    }
    println!("\nSet gitlab.project-id in the settings file to migrate one of them.");
}

fn project_line(project: &SourceProject) -> String {
    format!(
        "  {:>6}  {} ({})  {}",
        project.id,
        project.name,
        project.path_with_namespace,
        project.description.as_deref().unwrap_or_default()
    )
    .trim_end()
    .to_string()
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );

    for (phase, counts) in &summary.phases {
        println!(
            "  {phase}: {} items, {} created, {} existing, {} skipped, {} failed",
            counts.total(),
            counts.created,
            counts.existing,
            counts.skipped,
            counts.failed
        );
        if counts.comments > 0 {
            println!("    comments transferred: {}", counts.comments);
        }
    }

    println!("  Failed items: {}", summary.total_failed());

    if let Some(before) = &summary.quota_before {
        println!("  GitHub quota before: {before}");
    }
    if let Some(after) = &summary.quota_after {
        println!("  GitHub quota after: {after}");
    }
    if let Some(consumed) = summary.quota_consumed() {
        println!("  Requests consumed: {consumed}");
    }
}
