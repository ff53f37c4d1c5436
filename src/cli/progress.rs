//! CLI progress callback with styled output, spinners and the merge log

use crate::cli::style::{Stylize, arrow, check, cross, short_sha, spinner_style};
use anstream::{eprintln, println};
use async_trait::async_trait;
use git_integrate::error::Error;
use git_integrate::progress::{Phase, ProgressCallback, PushStatus, RemoteEvent};
use git_integrate::types::{MergeOutcome, MergeStatus};
use indicatif::ProgressBar;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::warn;

/// Prints progress and records the structured merge log
///
/// Log lines are kept in memory for the reports and, when a log path is
/// set, appended to it as they arrive so a crashed run still leaves a
/// readable log behind. The file is only created by the first line, so a
/// run that merges nothing keeps the previous log.
pub struct CliProgress {
    verbose: bool,
    lines: Mutex<Vec<String>>,
    log_path: Option<PathBuf>,
    log_file: Mutex<Option<File>>,
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    /// Progress printer; `verbose` also echoes every log line
    pub const fn new(verbose: bool) -> Self {
        Self {
            verbose,
            lines: Mutex::new(Vec::new()),
            log_path: None,
            log_file: Mutex::new(None),
            spinner: Mutex::new(None),
        }
    }

    /// Write log lines to `path`, replacing it on the first line
    #[must_use]
    pub fn with_log_file(mut self, path: PathBuf) -> Self {
        self.log_path = Some(path);
        self
    }

    fn append_to_log(&self, line: &str) -> std::io::Result<()> {
        let Some(path) = &self.log_path else {
            return Ok(());
        };
        let Ok(mut slot) = self.log_file.lock() else {
            return Ok(());
        };
        if slot.is_none() {
            *slot = Some(File::create(path)?);
        }
        if let Some(file) = slot.as_mut() {
            writeln!(file, "{line}")?;
            file.flush()?;
        }
        Ok(())
    }

    /// Every log line seen so far
    pub fn log_lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn start_spinner(&self, message: String) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style());
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(old) = slot.replace(bar) {
                old.finish_and_clear();
            }
        }
    }

    fn clear_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.clear_spinner();
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        self.clear_spinner();
        match phase {
            Phase::Complete => println!("{}", phase.to_string().success()),
            _ => println!("{}...", phase.to_string().emphasis()),
        }
    }

    async fn on_remote(&self, remote: &str, event: RemoteEvent) {
        match &event {
            RemoteEvent::Unchanged if !self.verbose => {}
            RemoteEvent::Declined => {
                eprintln!(
                    "  {} {} {}",
                    "-".warn(),
                    remote.accent().for_stderr(),
                    event.to_string().warn()
                );
            }
            RemoteEvent::Unchanged => {
                println!("  {} {}", remote.accent(), event.to_string().muted());
            }
            _ => println!("  {} {} {}", check(), remote.accent(), event),
        }
    }

    async fn on_merge_started(&self, topic: &str, source: &str) {
        self.start_spinner(format!("Merging {topic} ({source})"));
    }

    async fn on_merge(&self, outcome: &MergeOutcome) {
        self.clear_spinner();
        let sha = short_sha(&outcome.tip_sha);
        match outcome.status {
            MergeStatus::UpToDate => println!(
                "  {} {} {} {}",
                "-".muted(),
                outcome.topic.accent(),
                sha.muted(),
                outcome.status.to_string().muted()
            ),
            _ => println!(
                "  {} {} {} {} ({} commit{})",
                check(),
                outcome.topic.accent(),
                sha.muted(),
                outcome.status,
                outcome.commit_count.accent(),
                if outcome.commit_count == 1 { "" } else { "s" }
            ),
        }
    }

    async fn on_log_line(&self, line: &str) {
        self.clear_spinner();
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
        if let Err(e) = self.append_to_log(line) {
            warn!("could not write merge log: {e}");
        }
        if self.verbose {
            println!("    {}", line.muted());
        }
    }

    async fn on_push(&self, refname: &str, status: PushStatus) {
        match &status {
            PushStatus::Started => println!("  {} Pushing {}...", arrow(), refname.accent()),
            PushStatus::Success => println!("  {} Pushed {}", check(), refname.emphasis()),
            PushStatus::Skipped => println!(
                "  {} {} {}",
                "-".muted(),
                refname.accent(),
                status.to_string().muted()
            ),
            PushStatus::Failed(_) => eprintln!(
                "  {} Failed to push {}: {}",
                cross(),
                refname.accent().for_stderr(),
                status.to_string().error()
            ),
        }
    }

    async fn on_error(&self, err: &Error) {
        self.clear_spinner();
        eprintln!("  {}: {}", "error".error(), err);
    }

    async fn on_message(&self, message: &str) {
        self.clear_spinner();
        println!("  {}", message.muted());
    }
}
