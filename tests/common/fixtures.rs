//! Test data factories for git-integrate
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use super::mock_vcs::MockVcs;
use async_trait::async_trait;
use git_integrate::error::Error;
use git_integrate::progress::{Phase, ProgressCallback, PushStatus, RemoteEvent};
use git_integrate::run::RunOptions;
use git_integrate::types::{
    BranchList, BranchSpec, MergeOutcome, NoChangePolicy, TrackingMode,
};
use std::sync::Mutex;

pub const BASELINE: &str = "origin";
pub const BASELINE_URL: &str = "https://git.example.com/linux.git";
pub const BASELINE_TAG: &str = "v6.8";
pub const BASELINE_SHA: &str = "0000000000000000000000000000000000000001";

/// Topic names with their tip SHAs, in configuration order
pub const TOPICS: &[(&str, &str)] = &[
    ("alpha", "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
    ("bravo", "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"),
    ("charlie", "cccccccccccccccccccccccccccccccccccccccc"),
];

/// URL used for a topic remote
pub fn topic_url(name: &str) -> String {
    format!("https://git.example.com/{name}.git")
}

/// Tip SHA of a standard topic
pub fn topic_sha(name: &str) -> &'static str {
    TOPICS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, sha)| *sha)
        .unwrap()
}

/// Baseline plus the standard topics
pub fn make_branch_list() -> BranchList {
    let mut specs = vec![BranchSpec::new(BASELINE, BASELINE_URL, "")];
    specs.extend(
        TOPICS
            .iter()
            .map(|(name, _)| BranchSpec::new(*name, topic_url(name), "master")),
    );
    BranchList::new(specs)
}

/// Mock state matching [`make_branch_list`] after a previous run
///
/// Every remote is registered and fetched; nothing new is waiting upstream.
pub fn seed_synced(vcs: &MockVcs) {
    vcs.add_existing_remote(BASELINE, BASELINE_URL);
    vcs.set_ref("origin/master", BASELINE_SHA);
    vcs.set_tag("origin/master", BASELINE_TAG);
    for (name, sha) in TOPICS {
        vcs.add_existing_remote(name, &topic_url(name));
        vcs.set_ref(&format!("{name}/master"), sha);
    }
}

/// Options for a non-interactive tag-tracking run
pub fn make_options() -> RunOptions {
    RunOptions {
        baseline: BASELINE.to_string(),
        branch: "next".to_string(),
        tracking: TrackingMode::Tag,
        rerere_cache: None,
        push_url: None,
        interactive: false,
        on_no_change: NoChangePolicy::Proceed,
    }
}

/// Progress callback that records everything it is told
#[derive(Default)]
pub struct RecordingProgress {
    pub phases: Mutex<Vec<Phase>>,
    pub remotes: Mutex<Vec<(String, RemoteEvent)>>,
    pub merges: Mutex<Vec<MergeOutcome>>,
    pub log_lines: Mutex<Vec<String>>,
    pub pushes: Mutex<Vec<(String, PushStatus)>>,
    pub errors: Mutex<Vec<String>>,
    pub messages: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn log_lines(&self) -> Vec<String> {
        self.log_lines.lock().unwrap().clone()
    }

    pub fn phases(&self) -> Vec<Phase> {
        self.phases.lock().unwrap().clone()
    }

    pub fn remote_events(&self) -> Vec<(String, RemoteEvent)> {
        self.remotes.lock().unwrap().clone()
    }

    pub fn pushes(&self) -> Vec<(String, PushStatus)> {
        self.pushes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressCallback for RecordingProgress {
    async fn on_phase(&self, phase: Phase) {
        self.phases.lock().unwrap().push(phase);
    }

    async fn on_remote(&self, remote: &str, event: RemoteEvent) {
        self.remotes
            .lock()
            .unwrap()
            .push((remote.to_string(), event));
    }

    async fn on_merge_started(&self, _topic: &str, _source: &str) {}

    async fn on_merge(&self, outcome: &MergeOutcome) {
        self.merges.lock().unwrap().push(outcome.clone());
    }

    async fn on_log_line(&self, line: &str) {
        self.log_lines.lock().unwrap().push(line.to_string());
    }

    async fn on_push(&self, refname: &str, status: PushStatus) {
        self.pushes
            .lock()
            .unwrap()
            .push((refname.to_string(), status));
    }

    async fn on_error(&self, error: &Error) {
        self.errors.lock().unwrap().push(error.to_string());
    }

    async fn on_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
