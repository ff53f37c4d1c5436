//! Integration branch construction
//!
//! Rotates the previous integration branch out of the way, starts a fresh
//! one at the baseline's tracked tip and merges every topic in configuration
//! order.

use crate::error::{Error, Result};
use crate::integrate::TopicManifest;
use crate::progress::{Phase, ProgressCallback};
use crate::types::{
    BranchList, BranchSpec, MergeOutcome, MergeStatus, TrackingMode, conflict_log_line,
};
use crate::vcs::{MergeResult, VcsClient, tracked_tip};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Commit message for the manifest commit
pub const MANIFEST_COMMIT_MESSAGE: &str = "Add topic manifest";

/// Builder state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuildState {
    /// Nothing done yet
    NotStarted,
    /// Baseline tip computed
    BaselineEstablished,
    /// Previous integration branch renamed, new branch created
    Rotated,
    /// New branch created, nothing to rotate
    Fresh,
    /// Topics being merged
    MergingTopics,
    /// All topics integrated
    Complete,
    /// A topic failed; the run stops here
    Aborted,
}

/// How to build the integration branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOptions {
    /// Baseline remote name
    pub baseline: String,
    /// Integration branch name
    pub branch: String,
    /// Baseline tracking mode
    pub tracking: TrackingMode,
    /// Resolve conflicts with the merge tool instead of failing
    pub interactive: bool,
}

/// Result of a successful build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResult {
    /// Integration branch name
    pub branch: String,
    /// Baseline tip the branch was started from
    pub baseline_tip: String,
    /// New name of the previous integration branch, if there was one
    pub rotated: Option<String>,
    /// Per-topic outcomes in merge order
    pub outcomes: Vec<MergeOutcome>,
    /// Manifest path relative to the work tree, if written
    pub manifest: Option<PathBuf>,
    /// Final builder state
    pub state: BuildState,
}

impl BuildResult {
    /// Topics that produced a merge commit
    pub fn merged_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_merged()).count()
    }
}

/// Name for a rotated-out integration branch
///
/// `<branch>-<YYYYmmdd-HHMMSS>-<describe>`, with characters git refuses in
/// ref names replaced by `-`.
pub fn rotated_name(branch: &str, at: DateTime<Local>, describe: &str) -> String {
    let describe: String = describe
        .trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '~' | '^' | ':' | '?' | '*' | '[' | '\\') {
                '-'
            } else {
                c
            }
        })
        .collect();
    format!("{branch}-{}-{describe}", at.format("%Y%m%d-%H%M%S"))
}

/// Builds the integration branch
pub struct IntegrationBuilder<'a> {
    vcs: &'a dyn VcsClient,
    progress: &'a dyn ProgressCallback,
    options: BuildOptions,
    state: BuildState,
}

impl<'a> IntegrationBuilder<'a> {
    /// Create a builder
    pub const fn new(
        vcs: &'a dyn VcsClient,
        progress: &'a dyn ProgressCallback,
        options: BuildOptions,
    ) -> Self {
        Self {
            vcs,
            progress,
            options,
            state: BuildState::NotStarted,
        }
    }

    /// Current state
    pub const fn state(&self) -> BuildState {
        self.state
    }

    fn advance(&mut self, next: BuildState) {
        debug!("Build state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Build the integration branch from `specs`
    pub async fn build(&mut self, specs: &BranchList) -> Result<BuildResult> {
        self.progress.on_phase(Phase::Building).await;

        let baseline_spec = specs
            .baseline(&self.options.baseline)
            .ok_or_else(|| Error::BaselineMissing(self.options.baseline.clone()))?;
        let baseline_tip = tracked_tip(self.vcs, baseline_spec, self.options.tracking)
            .await?
            .ok_or_else(|| Error::RepositoryUnreachable {
                target: baseline_spec.tracking_ref(),
                message: "baseline branch has not been fetched".to_string(),
            })?;
        info!(tip = %baseline_tip, "baseline established");
        self.advance(BuildState::BaselineEstablished);

        let rotated = self.rotate_existing().await?;
        self.vcs
            .checkout_new_branch(&self.options.branch, &baseline_tip)
            .await?;
        self.advance(if rotated.is_some() {
            BuildState::Rotated
        } else {
            BuildState::Fresh
        });

        self.progress.on_phase(Phase::Merging).await;
        self.advance(BuildState::MergingTopics);

        let baseline = self.options.baseline.clone();
        let mut outcomes = Vec::new();
        let mut manifest = TopicManifest::new();
        for spec in specs.topics(&baseline) {
            let outcome = match self.merge_topic(spec).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.advance(BuildState::Aborted);
                    return Err(e);
                }
            };
            if outcome.status.is_merged() {
                manifest.push(&outcome.topic, &outcome.tip_sha);
            }
            self.progress.on_log_line(&outcome.log_line()).await;
            self.progress.on_merge(&outcome).await;
            outcomes.push(outcome);
        }

        let manifest_path = if manifest.is_empty() {
            None
        } else {
            self.progress.on_phase(Phase::WritingManifest).await;
            let path = manifest.write(self.vcs.work_dir())?;
            self.vcs
                .commit_paths(&[path.as_path()], MANIFEST_COMMIT_MESSAGE)
                .await?;
            Some(path)
        };

        self.advance(BuildState::Complete);
        Ok(BuildResult {
            branch: self.options.branch.clone(),
            baseline_tip,
            rotated,
            outcomes,
            manifest: manifest_path,
            state: self.state,
        })
    }

    /// Rename an existing integration branch so its history is kept
    async fn rotate_existing(&self) -> Result<Option<String>> {
        let branch = &self.options.branch;
        if !self.vcs.branch_exists(branch).await? {
            return Ok(None);
        }

        let describe = self.vcs.describe(branch).await?;
        let new_name = rotated_name(branch, Local::now(), &describe);
        self.vcs.rename_branch(branch, &new_name).await?;
        info!(from = %branch, to = %new_name, "rotated previous integration branch");
        self.progress
            .on_message(&format!("Previous {branch} kept as {new_name}"))
            .await;
        Ok(Some(new_name))
    }

    /// Merge source: an `override/<name>` ref if present, else `<name>/<branch>`
    async fn merge_source(&self, spec: &BranchSpec) -> Result<(String, String)> {
        let override_ref = spec.override_ref();
        if let Some(sha) = self.vcs.resolve(&override_ref).await? {
            info!(topic = %spec.name, "using {override_ref}");
            return Ok((override_ref, sha));
        }

        let tracking = spec.tracking_ref();
        match self.vcs.resolve(&tracking).await? {
            Some(sha) => Ok((tracking, sha)),
            None => Err(Error::MergeFailed {
                topic: spec.name.clone(),
                source_ref: tracking,
                code: 1,
            }),
        }
    }

    async fn merge_topic(&self, spec: &BranchSpec) -> Result<MergeOutcome> {
        let (source, tip_sha) = self.merge_source(spec).await?;
        self.progress.on_merge_started(&spec.name, &source).await;

        let outcome = |commit_count, status| MergeOutcome {
            topic: spec.name.clone(),
            source: source.clone(),
            tip_sha: tip_sha.clone(),
            commit_count,
            status,
        };

        if self.vcs.is_ancestor(&tip_sha, "HEAD").await? {
            debug!("{} already merged", spec.name);
            return Ok(outcome(0, MergeStatus::UpToDate));
        }

        let commit_count = self.vcs.count_commits("HEAD", &tip_sha).await?;
        let message = format!("Merge {source} into {}", self.options.branch);

        let status = match self.vcs.merge(&tip_sha, &message).await? {
            MergeResult::Clean => MergeStatus::MergedClean,
            MergeResult::Conflicted if self.options.interactive => {
                self.resolve_manually(spec, &tip_sha).await?
            }
            MergeResult::Conflicted => self.finish_with_rerere(spec, &source, &tip_sha).await?,
        };

        Ok(outcome(commit_count, status))
    }

    /// Conclude a conflicted merge using whatever rerere already resolved
    async fn finish_with_rerere(
        &self,
        spec: &BranchSpec,
        source: &str,
        tip_sha: &str,
    ) -> Result<MergeStatus> {
        match self.vcs.commit_merge().await {
            Ok(()) => {
                info!(topic = %spec.name, "conflicts resolved from rerere cache");
                Ok(MergeStatus::MergedAfterResolution)
            }
            Err(e) => {
                let code = match &e {
                    Error::Git { code: Some(c), .. } => *c,
                    _ => 1,
                };
                warn!(topic = %spec.name, error = %e, "unresolved conflicts");
                self.fail_topic(spec, tip_sha).await;
                Err(Error::MergeFailed {
                    topic: spec.name.clone(),
                    source_ref: source.to_string(),
                    code,
                })
            }
        }
    }

    /// Hand the conflict to the operator's merge tool
    async fn resolve_manually(&self, spec: &BranchSpec, tip_sha: &str) -> Result<MergeStatus> {
        self.progress
            .on_message(&format!("Conflicts merging {}; starting merge tool", spec.name))
            .await;

        let resolved = match self.vcs.run_mergetool().await {
            Ok(()) => self.vcs.commit_merge().await,
            Err(e) => Err(e),
        };

        match resolved {
            Ok(()) => Ok(MergeStatus::MergedAfterManualResolution),
            Err(e) => {
                warn!(topic = %spec.name, error = %e, "manual resolution failed");
                self.fail_topic(spec, tip_sha).await;
                Err(Error::ManualResolutionFailed {
                    topic: spec.name.clone(),
                })
            }
        }
    }

    /// Abort the merge and log the conflict line
    async fn fail_topic(&self, spec: &BranchSpec, tip_sha: &str) {
        if let Err(e) = self.vcs.abort_merge().await {
            self.progress.on_error(&e).await;
        }
        self.progress
            .on_log_line(&conflict_log_line(&spec.name, tip_sha))
            .await;
    }
}
