//! Remote reconciliation
//!
//! Keeps git's remotes in line with the branch configuration:
//! 1. Planning - diff configured remotes against git's remotes
//! 2. Applying - remove stale remotes, add missing ones (confirmed)
//! 3. Updating - fetch everything and detect what changed

mod execute;
mod plan;

pub use execute::{BaselineMove, ReconciliationResult, apply_plan, update_remotes};
pub use plan::{ReconciliationPlan, create_reconciliation_plan};

use crate::error::Result;
use crate::progress::ProgressCallback;
use crate::prompt::ConfirmationPort;
use crate::types::{BranchList, TrackingMode};
use crate::vcs::VcsClient;

/// Plan, apply and fetch in one go
///
/// The plan is computed before anything is mutated, so a misconfigured
/// baseline aborts with every remote untouched.
pub async fn reconcile(
    specs: &BranchList,
    baseline: &str,
    tracking: TrackingMode,
    vcs: &dyn VcsClient,
    confirm: &dyn ConfirmationPort,
    progress: &dyn ProgressCallback,
) -> Result<ReconciliationResult> {
    let remotes = vcs.remotes().await?;
    let plan = create_reconciliation_plan(specs, &remotes, baseline)?;

    let mut result = ReconciliationResult::default();
    apply_plan(&plan, tracking, vcs, confirm, progress, &mut result).await?;
    update_remotes(specs, baseline, tracking, vcs, progress, &mut result).await?;
    Ok(result)
}
