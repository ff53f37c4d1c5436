//! Version-control capability
//!
//! Everything git does for us goes through [`VcsClient`], so reconciliation
//! and merge logic can run against a fake in tests.

mod git;

pub use git::GitCli;

use crate::error::Result;
use crate::types::{BranchSpec, RemoteState, TrackingMode};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Outcome of `git merge`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeResult {
    /// Merge commit created
    Clean,
    /// Merge stopped with conflicts
    Conflicted,
}

/// Outcome of fetching a remote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchResult {
    /// Whether the fetch brought in anything new
    pub changed: bool,
}

/// Version-control operations used by git-integrate
///
/// Methods taking a `path` operate on that repository instead of the working
/// repository (used for the rerere cache mount).
#[async_trait]
pub trait VcsClient: Send + Sync {
    /// Working tree of the repository
    fn work_dir(&self) -> &Path;

    /// Absolute path of the repository's git dir
    async fn git_dir(&self) -> Result<PathBuf>;

    /// Configured remotes
    async fn remotes(&self) -> Result<Vec<RemoteState>>;

    /// Add a remote, fetching only its configured branch
    async fn add_remote(&self, spec: &BranchSpec, with_tags: bool) -> Result<()>;

    /// Remove a remote and its tracking refs
    async fn remove_remote(&self, name: &str) -> Result<()>;

    /// Fetch a remote
    async fn fetch(&self, remote: &str, with_tags: bool) -> Result<FetchResult>;

    /// Resolve a revision to a full commit id, `None` if it does not exist
    async fn resolve(&self, rev: &str) -> Result<Option<String>>;

    /// Latest tag reachable from `rev`
    async fn latest_tag(&self, rev: &str) -> Result<String>;

    /// Human-readable description of `rev` (tag-relative, falls back to a short id)
    async fn describe(&self, rev: &str) -> Result<String>;

    /// Whether a local branch exists
    async fn branch_exists(&self, name: &str) -> Result<bool>;

    /// Rename a local branch
    async fn rename_branch(&self, from: &str, to: &str) -> Result<()>;

    /// Create a branch at `start` and check it out
    async fn checkout_new_branch(&self, name: &str, start: &str) -> Result<()>;

    /// Whether `ancestor` is reachable from `descendant`
    async fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool>;

    /// Number of commits in `from..to`
    async fn count_commits(&self, from: &str, to: &str) -> Result<u64>;

    /// Non-fast-forward merge of `source` into HEAD
    async fn merge(&self, source: &str, message: &str) -> Result<MergeResult>;

    /// Conclude an in-progress merge with the prepared message
    async fn commit_merge(&self) -> Result<()>;

    /// Abort an in-progress merge
    async fn abort_merge(&self) -> Result<()>;

    /// Run the configured merge tool on the operator's terminal
    async fn run_mergetool(&self) -> Result<()>;

    /// Stage and commit specific paths (relative to the work dir)
    async fn commit_paths(&self, paths: &[&Path], message: &str) -> Result<()>;

    /// Set a repository config value
    async fn set_config(&self, key: &str, value: &str) -> Result<()>;

    /// Push `refspec` to `url`
    async fn push(&self, url: &str, refspec: &str, force: bool) -> Result<()>;

    /// Clone `url` into `dest`
    async fn clone_repository(&self, url: &str, dest: &Path) -> Result<()>;

    /// Fetch the repository at `path` and hard-reset it to its upstream
    ///
    /// A remote without any branch yet leaves the checkout untouched.
    async fn refresh_checkout(&self, path: &Path) -> Result<()>;

    /// Whether the repository at `path` has uncommitted changes
    async fn has_uncommitted_changes(&self, path: &Path) -> Result<bool>;

    /// Stage everything in the repository at `path` and commit
    async fn commit_all(&self, path: &Path, message: &str) -> Result<()>;
}

/// The baseline's tracked tip: its latest tag or its head commit id
///
/// `None` when the remote-tracking ref does not exist yet.
pub async fn tracked_tip(
    vcs: &dyn VcsClient,
    spec: &BranchSpec,
    mode: TrackingMode,
) -> Result<Option<String>> {
    let rev = spec.tracking_ref();
    let Some(commit) = vcs.resolve(&rev).await? else {
        return Ok(None);
    };
    match mode {
        TrackingMode::Head => Ok(Some(commit)),
        TrackingMode::Tag => vcs.latest_tag(&rev).await.map(Some),
    }
}
