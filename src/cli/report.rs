//! Report command - render the merge tables from an existing log

use crate::cli::style::{Stylize, check, cross, short_sha};
use anstream::println;
use git_integrate::error::Result;
use git_integrate::report::{self, ReportEntry};
use std::path::Path;

/// Run the report command
///
/// Writes both tables into `out_dir` and prints a summary of the log.
pub fn run_report(log: &Path, out_dir: &Path) -> Result<()> {
    let text = std::fs::read_to_string(log)?;
    let entries = report::parse_log(text.lines());
    let files = report::write_reports(&text, out_dir)?;

    if entries.is_empty() {
        println!(
            "{}",
            format!("No merge results found in {}", log.display()).muted()
        );
    }

    for entry in &entries {
        match entry {
            ReportEntry::Merged { name, sha, count } => println!(
                "  {} {} {} ({})",
                check(),
                name.accent(),
                short_sha(sha).muted(),
                count
            ),
            ReportEntry::Conflict { name, sha } => println!(
                "  {} {} {} {}",
                cross().for_stdout(),
                name.accent(),
                short_sha(sha).muted(),
                "conflict".error().for_stdout()
            ),
        }
    }

    println!();
    println!("Wrote {}", files.merged.display().accent());
    println!("Wrote {}", files.conflicts.display().accent());
    Ok(())
}
