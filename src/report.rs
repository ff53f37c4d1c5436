//! Merge reports
//!
//! Reads the structured merge log and renders two fixed-width tables: topics
//! that merged (name, SHA, commit count) and topics that conflicted (name,
//! SHA). Unrecognised lines are ignored, so any stream containing the log
//! lines can be fed in.

use crate::error::Result;
use regex::Regex;
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// File name of the merged-topics report
pub const MERGED_REPORT_FILE: &str = "merged-topics.txt";

/// File name of the conflicted-topics report
pub const CONFLICT_REPORT_FILE: &str = "conflicted-topics.txt";

/// File name of the merge log written next to the reports
pub const MERGE_LOG_FILE: &str = "merge.log";

const NAME_WIDTH: usize = 20;
const SHA_WIDTH: usize = 45;
const COUNT_WIDTH: usize = 10;

/// One recognised merge-log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ReportEntry {
    /// `Merge successful : <name> : <sha> : <count>`
    Merged {
        /// Topic name
        name: String,
        /// Tip SHA
        sha: String,
        /// Commits merged
        count: u64,
    },
    /// `Merge conflict : <name> : <sha>`
    Conflict {
        /// Topic name
        name: String,
        /// Tip SHA
        sha: String,
    },
}

fn merged_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*Merge successful : (\S+) : ([0-9a-fA-F]{7,40}) : (\d+)\s*$")
            .expect("hardcoded merged-line pattern is valid")
    })
}

fn conflict_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*Merge conflict : (\S+) : ([0-9a-fA-F]{7,40})\s*$")
            .expect("hardcoded conflict-line pattern is valid")
    })
}

/// Parse a single log line
pub fn parse_line(line: &str) -> Option<ReportEntry> {
    if let Some(caps) = merged_pattern().captures(line) {
        return Some(ReportEntry::Merged {
            name: caps[1].to_string(),
            sha: caps[2].to_string(),
            count: caps[3].parse().ok()?,
        });
    }
    conflict_pattern()
        .captures(line)
        .map(|caps| ReportEntry::Conflict {
            name: caps[1].to_string(),
            sha: caps[2].to_string(),
        })
}

/// Parse every recognised line of a log
pub fn parse_log<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<ReportEntry> {
    lines.into_iter().filter_map(parse_line).collect()
}

fn merged_header() -> String {
    let mut out = format!(
        "{:<NAME_WIDTH$}{:>SHA_WIDTH$}{:>COUNT_WIDTH$}\n",
        "Name", "SHA", "Commits"
    );
    out.push_str(&"-".repeat(NAME_WIDTH + SHA_WIDTH + COUNT_WIDTH));
    out.push('\n');
    out
}

fn conflict_header() -> String {
    let mut out = format!("{:<NAME_WIDTH$}{:>SHA_WIDTH$}\n", "Name", "SHA");
    out.push_str(&"-".repeat(NAME_WIDTH + SHA_WIDTH));
    out.push('\n');
    out
}

/// Render parsed entries into `(merged_report, conflict_report)`
pub fn render_entries(entries: &[ReportEntry]) -> (String, String) {
    let mut merged = merged_header();
    let mut conflicts = conflict_header();

    for entry in entries {
        match entry {
            ReportEntry::Merged { name, sha, count } => {
                let _ = writeln!(
                    merged,
                    "{name:<NAME_WIDTH$}{sha:>SHA_WIDTH$}{count:>COUNT_WIDTH$}"
                );
            }
            ReportEntry::Conflict { name, sha } => {
                let _ = writeln!(conflicts, "{name:<NAME_WIDTH$}{sha:>SHA_WIDTH$}");
            }
        }
    }

    (merged, conflicts)
}

/// Render a merge log into `(merged_report, conflict_report)`
pub fn render<'a>(lines: impl IntoIterator<Item = &'a str>) -> (String, String) {
    render_entries(&parse_log(lines))
}

/// Paths of the written reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    /// Merged-topics table
    pub merged: PathBuf,
    /// Conflicted-topics table
    pub conflicts: PathBuf,
}

/// Render `log` and write both reports into `dir`
pub fn write_reports(log: &str, dir: &Path) -> Result<ReportFiles> {
    let (merged, conflicts) = render(log.lines());
    std::fs::create_dir_all(dir)?;

    let files = ReportFiles {
        merged: dir.join(MERGED_REPORT_FILE),
        conflicts: dir.join(CONFLICT_REPORT_FILE),
    };
    std::fs::write(&files.merged, merged)?;
    std::fs::write(&files.conflicts, conflicts)?;
    Ok(files)
}
