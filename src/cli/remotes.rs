//! Remotes command - show or apply the remote reconciliation plan

use crate::cli::Workspace;
use crate::cli::confirm::DialoguerPrompt;
use crate::cli::progress::CliProgress;
use crate::cli::style::{Stylize, arrow, check};
use anstream::println;
use git_integrate::error::Result;
use git_integrate::prompt::{AssumeYes, ConfirmationPort};
use git_integrate::reconcile::{ReconciliationResult, apply_plan, create_reconciliation_plan};
use git_integrate::types::TrackingMode;
use git_integrate::vcs::VcsClient;

/// Run the remotes command
///
/// Without `apply` this is a dry run: the plan is printed and nothing in the
/// repository changes.
pub async fn run_remotes(
    workspace: &Workspace,
    apply: bool,
    yes: bool,
    tracking: TrackingMode,
    verbose: bool,
) -> Result<()> {
    let remotes = workspace.vcs.remotes().await?;
    let plan = create_reconciliation_plan(&workspace.specs, &remotes, &workspace.baseline)?;

    if plan.is_empty() {
        println!(
            "{} Remotes match {}",
            check(),
            workspace.config_path.display().accent()
        );
        return Ok(());
    }

    println!("{}", "Reconciliation plan".emphasis());
    for remote in &plan.to_remove {
        println!(
            "  {} remove {} {}",
            arrow(),
            remote.name.accent(),
            remote.url.muted()
        );
    }
    for spec in &plan.to_add {
        println!(
            "  {} add {} {} {}",
            arrow(),
            spec.name.accent(),
            spec.url.muted(),
            spec.branch_or_default().muted()
        );
    }

    if !apply {
        println!();
        println!(
            "{}",
            "Dry run: re-run with --apply to change the remotes".muted()
        );
        return Ok(());
    }

    println!();
    let confirm: Box<dyn ConfirmationPort> = if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(DialoguerPrompt)
    };
    let progress = CliProgress::new(verbose);
    let mut result = ReconciliationResult::default();
    apply_plan(
        &plan,
        tracking,
        &workspace.vcs,
        confirm.as_ref(),
        &progress,
        &mut result,
    )
    .await?;

    println!(
        "{} {} added, {} removed, {} left unchanged",
        check(),
        result.added.len().accent(),
        result.removed.len().accent(),
        result.declined.len().accent()
    );
    Ok(())
}
