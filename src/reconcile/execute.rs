//! Applying a reconciliation plan and updating remotes
//!
//! Every confirmed remote change and every fetch that brought something in
//! is recorded in a [`ReconciliationResult`]; its `change_count` decides
//! whether a new integration branch is worth building.

use crate::error::{Error, Result};
use crate::progress::{Phase, ProgressCallback, RemoteEvent};
use crate::prompt::ConfirmationPort;
use crate::reconcile::ReconciliationPlan;
use crate::types::{BranchList, TrackingMode};
use crate::vcs::{VcsClient, tracked_tip};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Baseline tip movement observed while fetching
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaselineMove {
    /// Tracked tip before fetching (`None` if the ref did not exist)
    pub before: Option<String>,
    /// Tracked tip after fetching
    pub after: String,
}

/// Everything reconciliation and fetching changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    /// Remotes added
    pub added: Vec<String>,
    /// Remotes removed
    pub removed: Vec<String>,
    /// Changes the operator declined
    pub declined: Vec<String>,
    /// Non-baseline remotes whose fetch brought in new objects
    pub updated: Vec<String>,
    /// Baseline tip movement, if any
    pub baseline_moved: Option<BaselineMove>,
    /// Baseline tracked tip after fetching
    pub baseline_tip: Option<String>,
}

impl ReconciliationResult {
    /// Number of changes since the last run
    pub fn change_count(&self) -> usize {
        self.added.len()
            + self.removed.len()
            + self.updated.len()
            + usize::from(self.baseline_moved.is_some())
    }

    /// Whether anything changed since the last run
    pub fn has_changes(&self) -> bool {
        self.change_count() > 0
    }
}

/// Apply a plan: removals first, then additions
///
/// Each change is confirmed through `confirm` (default yes). A declined
/// removal keeps the remote and skips re-adding a remote of the same name.
pub async fn apply_plan(
    plan: &ReconciliationPlan,
    tracking: TrackingMode,
    vcs: &dyn VcsClient,
    confirm: &dyn ConfirmationPort,
    progress: &dyn ProgressCallback,
    result: &mut ReconciliationResult,
) -> Result<()> {
    progress.on_phase(Phase::Reconciling).await;

    for remote in &plan.to_remove {
        // The planner already refuses this; keep the invariant local too
        if remote.name == plan.baseline {
            return Err(Error::BaselineRemovalRefused {
                name: remote.name.clone(),
                url: remote.url.clone(),
            });
        }

        let question = format!("Remove remote '{}' ({})?", remote.name, remote.url);
        if confirm.confirm(&question, true)? {
            vcs.remove_remote(&remote.name).await?;
            info!(remote = %remote.name, url = %remote.url, "removed remote");
            progress.on_remote(&remote.name, RemoteEvent::Removed).await;
            result.removed.push(remote.name.clone());
        } else {
            debug!("Keeping remote {}", remote.name);
            progress.on_remote(&remote.name, RemoteEvent::Declined).await;
            result.declined.push(remote.name.clone());
        }
    }

    for spec in &plan.to_add {
        if result.declined.contains(&spec.name) {
            warn!(
                remote = %spec.name,
                "not adding remote: a remote with this name was kept"
            );
            continue;
        }

        let question = format!(
            "Add remote '{}' ({} {})?",
            spec.name,
            spec.url,
            spec.branch_or_default()
        );
        if confirm.confirm(&question, true)? {
            let with_tags = spec.name == plan.baseline && tracking == TrackingMode::Tag;
            vcs.add_remote(spec, with_tags).await?;
            info!(remote = %spec.name, url = %spec.url, "added remote");
            progress.on_remote(&spec.name, RemoteEvent::Added).await;
            result.added.push(spec.name.clone());
        } else {
            progress.on_remote(&spec.name, RemoteEvent::Declined).await;
            result.declined.push(spec.name.clone());
        }
    }

    Ok(())
}

/// Fetch every remote and detect changes
///
/// Topic remotes are fetched in configuration order, then any remote kept
/// after a declined removal. A remote counts as changed when the fetch
/// reports anything. The baseline counts as changed when its tracked tip
/// moved. Topics without a remote are skipped.
pub async fn update_remotes(
    specs: &BranchList,
    baseline: &str,
    tracking: TrackingMode,
    vcs: &dyn VcsClient,
    progress: &dyn ProgressCallback,
    result: &mut ReconciliationResult,
) -> Result<()> {
    progress.on_phase(Phase::Fetching).await;

    let present = vcs.remotes().await?;
    for spec in specs.topics(baseline) {
        if !present.iter().any(|r| r.name == spec.name) {
            // Operator declined adding it
            debug!("Skipping fetch of missing remote {}", spec.name);
            continue;
        }
        fetch_one(&spec.name, vcs, progress, result).await?;
    }

    // Remotes the operator kept although the configuration dropped them
    for remote in &present {
        if remote.name == baseline || specs.get(&remote.name).is_some() {
            continue;
        }
        fetch_one(&remote.name, vcs, progress, result).await?;
    }

    let baseline_spec = specs
        .baseline(baseline)
        .ok_or_else(|| Error::BaselineMissing(baseline.to_string()))?;

    // A baseline without tags yet has no previous tip to compare against
    let before = tracked_tip(vcs, baseline_spec, tracking).await.ok().flatten();
    vcs.fetch(baseline, tracking == TrackingMode::Tag).await?;
    let after = tracked_tip(vcs, baseline_spec, tracking)
        .await?
        .ok_or_else(|| Error::RepositoryUnreachable {
            target: baseline_spec.tracking_ref(),
            message: "baseline branch not found after fetch".to_string(),
        })?;

    if before.as_deref() == Some(after.as_str()) {
        progress.on_remote(baseline, RemoteEvent::Unchanged).await;
    } else {
        progress
            .on_remote(
                baseline,
                RemoteEvent::BaselineMoved {
                    before: before.clone(),
                    after: after.clone(),
                },
            )
            .await;
        result.baseline_moved = Some(BaselineMove {
            before,
            after: after.clone(),
        });
    }
    result.baseline_tip = Some(after);

    Ok(())
}

async fn fetch_one(
    name: &str,
    vcs: &dyn VcsClient,
    progress: &dyn ProgressCallback,
    result: &mut ReconciliationResult,
) -> Result<()> {
    if vcs.fetch(name, false).await?.changed {
        progress.on_remote(name, RemoteEvent::Updated).await;
        result.updated.push(name.to_string());
    } else {
        progress.on_remote(name, RemoteEvent::Unchanged).await;
    }
    Ok(())
}
