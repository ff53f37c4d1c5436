//! Build command - reconcile, merge every topic, publish

use crate::cli::Workspace;
use crate::cli::confirm::DialoguerPrompt;
use crate::cli::progress::CliProgress;
use crate::cli::style::{Stylize, check, short_sha};
use anstream::println;
use clap::Args;
use git_integrate::config::CONFIG_DIR_NAME;
use git_integrate::error::Result;
use git_integrate::prompt::{AssumeYes, ConfirmationPort};
use git_integrate::report::{self, MERGE_LOG_FILE};
use git_integrate::run::{RunOptions, RunOutcome, run_integration};
use git_integrate::types::{MergeStatus, NoChangePolicy, TrackingMode};
use std::path::PathBuf;
use tracing::debug;

/// Build the integration branch
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Integration branch name
    #[arg(short, long, env = "GIT_INTEGRATE_BRANCH", default_value = "next")]
    pub branch: String,

    /// Baseline tip to build on: latest tag or head commit
    #[arg(long, env = "GIT_INTEGRATE_TRACKING", default_value = "tag")]
    pub tracking: TrackingMode,

    /// Shared rerere cache repository (rerere is disabled without one)
    #[arg(long, env = "GIT_INTEGRATE_RERERE_CACHE")]
    pub rerere_cache: Option<String>,

    /// Push the integration branch here when done
    #[arg(long, env = "GIT_INTEGRATE_PUSH_URL")]
    pub push_url: Option<String>,

    /// Resolve conflicts with `git mergetool` instead of failing
    #[arg(short, long)]
    pub interactive: bool,

    /// Build even if nothing changed since the last run
    #[arg(short, long)]
    pub force: bool,

    /// What to do when nothing changed: prompt, abort or proceed
    #[arg(long, env = "GIT_INTEGRATE_ON_NO_CHANGE", default_value = "prompt")]
    pub on_no_change: NoChangePolicy,

    /// Answer yes to every confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Where to write merge.log and the reports (defaults to <git-dir>/git-integrate)
    #[arg(long, env = "GIT_INTEGRATE_REPORT_DIR")]
    pub report_dir: Option<PathBuf>,
}

impl BuildArgs {
    fn run_options(&self, baseline: &str) -> RunOptions {
        RunOptions {
            baseline: baseline.to_string(),
            branch: self.branch.clone(),
            tracking: self.tracking,
            rerere_cache: self.rerere_cache.clone(),
            push_url: self.push_url.clone(),
            interactive: self.interactive,
            on_no_change: if self.force {
                NoChangePolicy::Proceed
            } else {
                self.on_no_change
            },
        }
    }
}

/// Run the build command
pub async fn run_build(workspace: &Workspace, args: &BuildArgs, verbose: bool) -> Result<()> {
    let options = args.run_options(&workspace.baseline);
    if verbose {
        if let Ok(json) = serde_json::to_string_pretty(&options) {
            debug!("Run options: {json}");
        }
    }

    let report_dir = args
        .report_dir
        .clone()
        .unwrap_or_else(|| workspace.git_dir.join(CONFIG_DIR_NAME));
    std::fs::create_dir_all(&report_dir)?;

    let progress = CliProgress::new(verbose).with_log_file(report_dir.join(MERGE_LOG_FILE));
    let confirm: Box<dyn ConfirmationPort> = if args.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(DialoguerPrompt)
    };

    let outcome = run_integration(
        &options,
        &workspace.specs,
        &workspace.vcs,
        confirm.as_ref(),
        &progress,
    )
    .await;

    // Reports are written on failure too; the conflict table is the point then
    let lines = progress.log_lines();
    if !lines.is_empty() {
        let files = report::write_reports(&lines.join("\n"), &report_dir)?;
        println!(
            "Reports: {} {}",
            files.merged.display().muted(),
            files.conflicts.display().muted()
        );
    }

    match outcome? {
        RunOutcome::Unchanged { .. } => {
            println!("{}", "Nothing to do.".muted());
        }
        RunOutcome::Built {
            reconciliation,
            build,
            cache_committed,
            publish,
        } => {
            let up_to_date = build
                .outcomes
                .iter()
                .filter(|o| o.status == MergeStatus::UpToDate)
                .count();

            println!();
            println!(
                "{} Built {} on {}",
                check(),
                build.branch.accent(),
                short_sha(&build.baseline_tip).accent()
            );
            println!(
                "  {} remote change{}, {} topic{} merged, {} up to date",
                reconciliation.change_count().accent(),
                if reconciliation.change_count() == 1 { "" } else { "s" },
                build.merged_count().accent(),
                if build.merged_count() == 1 { "" } else { "s" },
                up_to_date.accent()
            );
            if let Some(rotated) = &build.rotated {
                println!("  Previous branch kept as {}", rotated.accent());
            }
            if let Some(manifest) = &build.manifest {
                println!("  Manifest: {}", manifest.display().muted());
            }
            if cache_committed {
                println!(
                    "  {}",
                    "New conflict resolutions committed to the rerere cache; push it to share them"
                        .warn()
                        .for_stdout()
                );
            }
            if !publish.pushed.is_empty() {
                println!("  Pushed: {}", publish.pushed.join(", ").accent());
            }
        }
    }

    Ok(())
}
