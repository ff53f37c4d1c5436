//! Core types for git-integrate

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Branch used for a baseline entry that names no branch
pub const DEFAULT_BASELINE_BRANCH: &str = "master";

/// One configured remote: `name url [branch]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchSpec {
    /// Remote name (unique key)
    pub name: String,
    /// Remote URL
    pub url: String,
    /// Branch to track on the remote (may be empty for the baseline)
    pub branch: String,
}

impl BranchSpec {
    /// Create a new branch spec
    pub fn new(name: impl Into<String>, url: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            branch: branch.into(),
        }
    }

    /// Branch name, falling back to the default baseline branch when empty
    pub fn branch_or_default(&self) -> &str {
        if self.branch.is_empty() {
            DEFAULT_BASELINE_BRANCH
        } else {
            &self.branch
        }
    }

    /// Remote-tracking ref for this spec (`<name>/<branch>`)
    pub fn tracking_ref(&self) -> String {
        format!("{}/{}", self.name, self.branch_or_default())
    }

    /// Operator override ref that replaces the normal merge source
    pub fn override_ref(&self) -> String {
        format!("override/{}", self.name)
    }
}

/// Ordered list of configured remotes, in configuration-file order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchList {
    specs: Vec<BranchSpec>,
}

impl BranchList {
    /// Build from already-ordered specs
    pub const fn new(specs: Vec<BranchSpec>) -> Self {
        Self { specs }
    }

    /// All specs in file order
    pub fn specs(&self) -> &[BranchSpec] {
        &self.specs
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether no entries were configured
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Look up an entry by remote name
    pub fn get(&self, name: &str) -> Option<&BranchSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// The baseline entry, if configured
    pub fn baseline(&self, baseline: &str) -> Option<&BranchSpec> {
        self.get(baseline)
    }

    /// Topic entries (everything except the baseline), in file order
    pub fn topics<'a>(&'a self, baseline: &'a str) -> impl Iterator<Item = &'a BranchSpec> + 'a {
        self.specs.iter().filter(move |s| s.name != baseline)
    }
}

/// Live view of a git remote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteState {
    /// Remote name
    pub name: String,
    /// Fetch URL
    pub url: String,
}

impl RemoteState {
    /// Create a remote state
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// What "latest state" of the baseline means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingMode {
    /// Latest tag reachable from the baseline branch
    #[default]
    Tag,
    /// Head commit of the baseline branch
    Head,
}

impl fmt::Display for TrackingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag => write!(f, "tag"),
            Self::Head => write!(f, "head"),
        }
    }
}

impl FromStr for TrackingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tag" => Ok(Self::Tag),
            "head" => Ok(Self::Head),
            other => Err(format!("unknown tracking mode '{other}' (expected tag or head)")),
        }
    }
}

/// What to do when nothing changed since the last run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoChangePolicy {
    /// Ask the operator whether to abort (default answer: abort)
    #[default]
    Prompt,
    /// Abort without asking
    Abort,
    /// Build anyway
    Proceed,
}

impl FromStr for NoChangePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prompt" => Ok(Self::Prompt),
            "abort" => Ok(Self::Abort),
            "proceed" => Ok(Self::Proceed),
            other => Err(format!(
                "unknown policy '{other}' (expected prompt, abort or proceed)"
            )),
        }
    }
}

/// How a topic ended up in the integration branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStatus {
    /// Source was already an ancestor of the integration branch
    UpToDate,
    /// Merged without conflicts
    MergedClean,
    /// Conflicts were resolved from the rerere cache
    MergedAfterResolution,
    /// Conflicts were resolved by the operator
    MergedAfterManualResolution,
}

impl MergeStatus {
    /// Whether a merge commit was created
    pub const fn is_merged(self) -> bool {
        !matches!(self, Self::UpToDate)
    }
}

impl fmt::Display for MergeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpToDate => write!(f, "up to date"),
            Self::MergedClean => write!(f, "merged"),
            Self::MergedAfterResolution => write!(f, "merged (rerere)"),
            Self::MergedAfterManualResolution => write!(f, "merged (manual)"),
        }
    }
}

/// Result of integrating one topic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Topic (remote) name
    pub topic: String,
    /// Ref that was merged
    pub source: String,
    /// Tip of the source, recorded before merging
    pub tip_sha: String,
    /// Commits brought in by the merge
    pub commit_count: u64,
    /// How the merge went
    pub status: MergeStatus,
}

impl MergeOutcome {
    /// Structured log line consumed by the report generator
    pub fn log_line(&self) -> String {
        format!(
            "Merge successful : {} : {} : {}",
            self.topic, self.tip_sha, self.commit_count
        )
    }
}

/// Structured log line for a topic that failed to merge
pub fn conflict_log_line(topic: &str, tip_sha: &str) -> String {
    format!("Merge conflict : {topic} : {tip_sha}")
}
