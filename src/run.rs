//! The integration run pipeline
//!
//! Wires the modules together in data-flow order: reconcile remotes, prepare
//! the rerere cache, gate on changes, build the integration branch, save new
//! resolutions and publish.

use crate::error::Result;
use crate::integrate::{BuildOptions, BuildResult, IntegrationBuilder, should_build};
use crate::progress::{Phase, ProgressCallback};
use crate::prompt::ConfirmationPort;
use crate::publish::{PublishResult, publish};
use crate::reconcile::{ReconciliationResult, reconcile};
use crate::rerere;
use crate::types::{BranchList, NoChangePolicy, TrackingMode};
use crate::vcs::VcsClient;
use serde::Serialize;
use tracing::info;

/// Everything a run needs besides the branch list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOptions {
    /// Baseline remote name
    pub baseline: String,
    /// Integration branch name
    pub branch: String,
    /// Baseline tracking mode
    pub tracking: TrackingMode,
    /// Shared rerere cache URL
    pub rerere_cache: Option<String>,
    /// Where to push the integration branch
    pub push_url: Option<String>,
    /// Resolve conflicts with the merge tool
    pub interactive: bool,
    /// What to do when nothing changed
    pub on_no_change: NoChangePolicy,
}

impl RunOptions {
    fn build_options(&self) -> BuildOptions {
        BuildOptions {
            baseline: self.baseline.clone(),
            branch: self.branch.clone(),
            tracking: self.tracking,
            interactive: self.interactive,
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing changed and the run stopped before touching any branch
    Unchanged {
        /// Reconciliation that found nothing new
        reconciliation: ReconciliationResult,
    },
    /// Integration branch built
    Built {
        /// Remote reconciliation
        reconciliation: ReconciliationResult,
        /// Integration branch
        build: BuildResult,
        /// Whether new resolutions were committed to the cache
        cache_committed: bool,
        /// Pushes performed
        publish: PublishResult,
    },
}

/// Run the whole integration pipeline
pub async fn run_integration(
    options: &RunOptions,
    specs: &BranchList,
    vcs: &dyn VcsClient,
    confirm: &dyn ConfirmationPort,
    progress: &dyn ProgressCallback,
) -> Result<RunOutcome> {
    let reconciliation = reconcile(
        specs,
        &options.baseline,
        options.tracking,
        vcs,
        confirm,
        progress,
    )
    .await?;
    info!(changes = reconciliation.change_count(), "remotes reconciled");

    let cache = rerere::setup(vcs, options.rerere_cache.as_deref(), progress).await?;

    if !should_build(&reconciliation, options.on_no_change, confirm)? {
        progress
            .on_message("Nothing changed since the last run; stopping")
            .await;
        return Ok(RunOutcome::Unchanged { reconciliation });
    }

    let mut builder = IntegrationBuilder::new(vcs, progress, options.build_options());
    let build = builder.build(specs).await?;

    let cache_committed = match &cache {
        Some(cache) => rerere::publish(vcs, cache, progress).await?,
        None => false,
    };

    let publish = publish(
        vcs,
        confirm,
        progress,
        options.push_url.as_deref(),
        &build.branch,
        build.rotated.as_deref(),
    )
    .await?;

    progress.on_phase(Phase::Complete).await;
    Ok(RunOutcome::Built {
        reconciliation,
        build,
        cache_committed,
        publish,
    })
}
