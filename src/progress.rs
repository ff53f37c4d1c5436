//! Progress callback trait for interface-agnostic updates
//!
//! The CLI prints these; tests record them. Structured merge-log lines also
//! travel through here so they reach the log even when a run aborts.

use crate::error::Error;
use crate::types::MergeOutcome;
use async_trait::async_trait;
use std::fmt;

/// Run phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Comparing configured and actual remotes
    Reconciling,
    /// Fetching remotes
    Fetching,
    /// Cloning or refreshing the shared rerere cache
    PreparingCache,
    /// Establishing the baseline and integration branch
    Building,
    /// Merging topics
    Merging,
    /// Writing the topic manifest
    WritingManifest,
    /// Committing new conflict resolutions
    PublishingCache,
    /// Pushing the integration branch
    Pushing,
    /// Run complete
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reconciling => write!(f, "Reconciling remotes"),
            Self::Fetching => write!(f, "Fetching remotes"),
            Self::PreparingCache => write!(f, "Preparing rerere cache"),
            Self::Building => write!(f, "Preparing integration branch"),
            Self::Merging => write!(f, "Merging topics"),
            Self::WritingManifest => write!(f, "Writing topic manifest"),
            Self::PublishingCache => write!(f, "Saving resolutions"),
            Self::Pushing => write!(f, "Pushing"),
            Self::Complete => write!(f, "Done"),
        }
    }
}

/// What happened to a remote during reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEvent {
    /// Remote added and its branch fetched
    Added,
    /// Remote removed
    Removed,
    /// Operator declined a change; the remote was left as is
    Declined,
    /// Fetch brought in new objects
    Updated,
    /// Fetch found nothing new
    Unchanged,
    /// Baseline tracked tip moved
    BaselineMoved {
        /// Tip before fetching
        before: Option<String>,
        /// Tip after fetching
        after: String,
    },
}

impl fmt::Display for RemoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Removed => write!(f, "removed"),
            Self::Declined => write!(f, "left unchanged"),
            Self::Updated => write!(f, "updated"),
            Self::Unchanged => write!(f, "no changes"),
            Self::BaselineMoved { before, after } => match before {
                Some(before) => write!(f, "moved {before} -> {after}"),
                None => write!(f, "now at {after}"),
            },
        }
    }
}

/// Push operation status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushStatus {
    /// Push started
    Started,
    /// Push succeeded
    Success,
    /// Operator declined the push
    Skipped,
    /// Push failed with error message
    Failed(String),
}

impl fmt::Display for PushStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "pushing"),
            Self::Success => write!(f, "pushed"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

/// Progress callback trait
///
/// Implement this trait to receive progress updates during a run.
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when entering a new phase
    async fn on_phase(&self, phase: Phase);

    /// Called for every remote touched by reconciliation or fetching
    async fn on_remote(&self, remote: &str, event: RemoteEvent);

    /// Called before a topic merge starts
    async fn on_merge_started(&self, topic: &str, source: &str);

    /// Called after a topic was integrated
    async fn on_merge(&self, outcome: &MergeOutcome);

    /// Called with every structured merge-log line
    async fn on_log_line(&self, line: &str);

    /// Called when a ref is being pushed
    async fn on_push(&self, refname: &str, status: PushStatus);

    /// Called when an error occurs (non-fatal)
    async fn on_error(&self, error: &Error);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_remote(&self, _remote: &str, _event: RemoteEvent) {}
    async fn on_merge_started(&self, _topic: &str, _source: &str) {}
    async fn on_merge(&self, _outcome: &MergeOutcome) {}
    async fn on_log_line(&self, _line: &str) {}
    async fn on_push(&self, _refname: &str, _status: PushStatus) {}
    async fn on_error(&self, _error: &Error) {}
    async fn on_message(&self, _message: &str) {}
}
