//! Default status command - configured branches and their remotes

use crate::cli::Workspace;
use crate::cli::style::{self, Stylize, bullet, check, short_sha};
use anstream::println;
use git_integrate::error::Result;
use git_integrate::types::BranchSpec;
use git_integrate::vcs::VcsClient;

/// Run the status command (default when no subcommand given)
///
/// Read-only: lists every configured branch, whether git has its remote and
/// what its tracking ref currently points at.
pub async fn run_status(workspace: &Workspace) -> Result<()> {
    let remotes = workspace.vcs.remotes().await?;
    let vcs = &workspace.vcs;

    println!(
        "{} {}",
        "Branch list".emphasis(),
        workspace.config_path.display().muted()
    );
    println!();

    let mut missing = 0usize;
    let mut orphaned = 0usize;
    for spec in workspace.specs.specs() {
        let registered = remotes.iter().find(|r| r.name == spec.name);
        let is_baseline = spec.name == workspace.baseline;
        let role = if is_baseline { " (baseline)" } else { "" };

        let state = match registered {
            Some(remote) if remote.url != spec.url => {
                orphaned += 1;
                format!("{}", format!("url differs: {}", remote.url).warn().for_stdout())
            }
            Some(_) => describe_tip(vcs, spec).await?,
            None => {
                missing += 1;
                format!("{}", "not added".warn().for_stdout())
            }
        };

        let marker = if registered.is_some() {
            format!("{}", check())
        } else {
            format!("{}", bullet())
        };
        println!(
            "  {} {}{} {}",
            marker,
            spec.name.accent(),
            role.muted(),
            state
        );
    }

    orphaned += remotes
        .iter()
        .filter(|r| workspace.specs.get(&r.name).is_none())
        .count();

    println!();
    println!(
        "{} branch{}, {} topic{}",
        workspace.specs.len().accent(),
        if workspace.specs.len() == 1 { "" } else { "es" },
        workspace.specs.topics(&workspace.baseline).count().accent(),
        if workspace.specs.topics(&workspace.baseline).count() == 1 {
            ""
        } else {
            "s"
        }
    );
    if missing + orphaned > 0 {
        println!(
            "{}",
            format!(
                "{missing} to add, {orphaned} to remove or replace; run `git-integrate remotes` for the plan"
            )
            .muted()
        );
    }
    println!(
        "{}",
        format!(
            "Legend: {} = remote present, {} = remote missing",
            style::CHECK,
            style::BULLET
        )
        .muted()
    );

    Ok(())
}

async fn describe_tip(vcs: &dyn VcsClient, spec: &BranchSpec) -> Result<String> {
    let override_ref = spec.override_ref();
    if let Some(sha) = vcs.resolve(&override_ref).await? {
        return Ok(format!(
            "{} {}",
            override_ref.warn().for_stdout(),
            short_sha(&sha).muted()
        ));
    }

    let tracking = spec.tracking_ref();
    Ok(match vcs.resolve(&tracking).await? {
        Some(sha) => format!("{} {}", tracking.muted(), short_sha(&sha).muted()),
        None => format!("{} {}", tracking.muted(), "not fetched".warn().for_stdout()),
    })
}
