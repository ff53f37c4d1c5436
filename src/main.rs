//! git-integrate - continuous merge integration
//!
//! CLI binary that builds a linux-next style integration branch.

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::style::Stylize;
use git_integrate::types::TrackingMode;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "git-integrate")]
#[command(about = "Merge a list of topic branches onto a baseline, every run from scratch")]
#[command(version)]
struct Cli {
    /// Path to the git repository (defaults to current directory)
    #[arg(short, long, global = true, env = "GIT_INTEGRATE_REPO")]
    repo: Option<PathBuf>,

    /// Branch list file (defaults to <git-dir>/git-integrate/branches, then user and system locations)
    #[arg(short, long, global = true, env = "GIT_INTEGRATE_CONFIG")]
    config: Option<PathBuf>,

    /// Name of the baseline remote in the branch list
    #[arg(long, global = true, env = "GIT_INTEGRATE_BASELINE", default_value = "origin")]
    baseline: String,

    /// Debug logging and full merge-log output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile remotes, rebuild the integration branch and publish it
    Build(cli::BuildArgs),

    /// Render merge reports from an existing merge log
    Report {
        /// Merge log to read
        log: PathBuf,

        /// Directory for the report files
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Show (or apply) the changes needed to match remotes to the branch list
    Remotes {
        /// Apply the plan instead of printing it
        #[arg(long)]
        apply: bool,

        /// Answer yes to every confirmation
        #[arg(short, long)]
        yes: bool,

        /// Baseline tracking mode; tag tracking fetches baseline tags
        #[arg(long, env = "GIT_INTEGRATE_TRACKING", default_value = "tag")]
        tracking: TrackingMode,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "git_integrate=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let repo = cli.repo.unwrap_or_else(|| PathBuf::from("."));
    let config = cli.config.as_deref();

    match cli.command {
        None => {
            // Default: status view
            let workspace = cli::Workspace::open(&repo, config, &cli.baseline).await?;
            cli::run_status(&workspace).await?;
        }
        Some(Commands::Build(args)) => {
            let workspace = cli::Workspace::open(&repo, config, &cli.baseline).await?;
            cli::run_build(&workspace, &args, cli.verbose).await?;
        }
        Some(Commands::Remotes {
            apply,
            yes,
            tracking,
        }) => {
            let workspace = cli::Workspace::open(&repo, config, &cli.baseline).await?;
            cli::run_remotes(&workspace, apply, yes, tracking, cli.verbose).await?;
        }
        Some(Commands::Report { log, out_dir }) => {
            cli::run_report(&log, &out_dir)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            anstream::eprintln!("{}: {err:#}", "error".error());
            let code = err
                .downcast_ref::<git_integrate::Error>()
                .map_or(1, git_integrate::Error::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
