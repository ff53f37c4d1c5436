//! In-memory `VcsClient` for workflow tests
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use git_integrate::error::{Error, Result};
use git_integrate::types::{BranchSpec, RemoteState};
use git_integrate::vcs::{FetchResult, MergeResult, VcsClient};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Call record for `merge`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCall {
    pub source: String,
    pub message: String,
}

/// Call record for `push`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushCall {
    pub url: String,
    pub refspec: String,
    pub force: bool,
}

/// Hand-written mock of the git capability
///
/// Features:
/// - Remotes, refs, tags and branches held in memory
/// - Fetches that move refs when queued with [`MockVcs::queue_fetch`]
/// - Per-tip merge results and commit counts
/// - Call tracking (an ordered log of mutating calls plus typed records)
/// - Error injection for failure path testing
pub struct MockVcs {
    work_dir: PathBuf,
    remotes: Mutex<Vec<RemoteState>>,
    refs: Mutex<HashMap<String, String>>,
    tags: Mutex<HashMap<String, String>>,
    branches: Mutex<HashSet<String>>,
    merged: Mutex<HashSet<String>>,
    commit_counts: Mutex<HashMap<String, u64>>,
    merge_results: Mutex<HashMap<String, MergeResult>>,
    pending_fetches: Mutex<HashMap<String, Vec<(String, String)>>>,
    cache_dirty: Mutex<bool>,
    describe: Mutex<String>,
    head: Mutex<Option<String>>,
    // Call tracking
    log: Mutex<Vec<String>>,
    merge_calls: Mutex<Vec<MergeCall>>,
    push_calls: Mutex<Vec<PushCall>>,
    config_calls: Mutex<Vec<(String, String)>>,
    commit_calls: Mutex<Vec<(Vec<PathBuf>, String)>>,
    // Error injection
    commit_merge_error: Mutex<Option<i32>>,
    mergetool_error: Mutex<bool>,
    clone_error: Mutex<Option<String>>,
    push_error: Mutex<Option<String>>,
    fetch_errors: Mutex<HashSet<String>>,
}

impl MockVcs {
    /// Mock repository rooted at `work_dir`; `<work_dir>/.git` is created
    pub fn new(work_dir: &Path) -> Self {
        std::fs::create_dir_all(work_dir.join(".git")).unwrap();
        Self {
            work_dir: work_dir.to_path_buf(),
            remotes: Mutex::new(Vec::new()),
            refs: Mutex::new(HashMap::new()),
            tags: Mutex::new(HashMap::new()),
            branches: Mutex::new(HashSet::new()),
            merged: Mutex::new(HashSet::new()),
            commit_counts: Mutex::new(HashMap::new()),
            merge_results: Mutex::new(HashMap::new()),
            pending_fetches: Mutex::new(HashMap::new()),
            cache_dirty: Mutex::new(false),
            describe: Mutex::new("v1.0-2-gabcdef0".to_string()),
            head: Mutex::new(None),
            log: Mutex::new(Vec::new()),
            merge_calls: Mutex::new(Vec::new()),
            push_calls: Mutex::new(Vec::new()),
            config_calls: Mutex::new(Vec::new()),
            commit_calls: Mutex::new(Vec::new()),
            commit_merge_error: Mutex::new(None),
            mergetool_error: Mutex::new(false),
            clone_error: Mutex::new(None),
            push_error: Mutex::new(None),
            fetch_errors: Mutex::new(HashSet::new()),
        }
    }

    // === Setup ===

    /// Register a remote as if it had been added earlier
    pub fn add_existing_remote(&self, name: &str, url: &str) {
        self.remotes
            .lock()
            .unwrap()
            .push(RemoteState::new(name, url));
    }

    /// Point `refname` at `sha`
    pub fn set_ref(&self, refname: &str, sha: &str) {
        self.refs
            .lock()
            .unwrap()
            .insert(refname.to_string(), sha.to_string());
    }

    /// Latest tag reachable from `rev`
    pub fn set_tag(&self, rev: &str, tag: &str) {
        self.tags
            .lock()
            .unwrap()
            .insert(rev.to_string(), tag.to_string());
    }

    /// Pretend a local branch exists
    pub fn add_branch(&self, name: &str) {
        self.branches.lock().unwrap().insert(name.to_string());
    }

    /// Treat `sha` as already contained in HEAD
    pub fn set_already_merged(&self, sha: &str) {
        self.merged.lock().unwrap().insert(sha.to_string());
    }

    /// Commits `HEAD..sha`
    pub fn set_commit_count(&self, sha: &str, count: u64) {
        self.commit_counts
            .lock()
            .unwrap()
            .insert(sha.to_string(), count);
    }

    /// Result of merging `sha` (clean by default)
    pub fn set_merge_result(&self, sha: &str, result: MergeResult) {
        self.merge_results
            .lock()
            .unwrap()
            .insert(sha.to_string(), result);
    }

    /// Next fetch of `remote` moves `refname` to `sha`
    pub fn queue_fetch(&self, remote: &str, refname: &str, sha: &str) {
        self.pending_fetches
            .lock()
            .unwrap()
            .entry(remote.to_string())
            .or_default()
            .push((refname.to_string(), sha.to_string()));
    }

    /// Output of `git describe` for rotation names
    pub fn set_describe(&self, describe: &str) {
        *self.describe.lock().unwrap() = describe.to_string();
    }

    /// Report uncommitted changes in the rerere cache mount
    pub fn set_cache_dirty(&self, dirty: bool) {
        *self.cache_dirty.lock().unwrap() = dirty;
    }

    // === Error injection ===

    /// Make `commit_merge` fail with `code` (conflicts rerere did not resolve)
    pub fn fail_commit_merge(&self, code: i32) {
        *self.commit_merge_error.lock().unwrap() = Some(code);
    }

    /// Make `run_mergetool` fail
    pub fn fail_mergetool(&self) {
        *self.mergetool_error.lock().unwrap() = true;
    }

    /// Make `clone_repository` fail
    pub fn fail_clone(&self, msg: &str) {
        *self.clone_error.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `push` fail
    pub fn fail_push(&self, msg: &str) {
        *self.push_error.lock().unwrap() = Some(msg.to_string());
    }

    /// Make fetching `remote` fail
    pub fn fail_fetch(&self, remote: &str) {
        self.fetch_errors.lock().unwrap().insert(remote.to_string());
    }

    // === Call verification ===

    /// Ordered log of calls, e.g. `add_remote net`
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Calls starting with `prefix`
    pub fn calls_matching(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    /// Calls that change repository state
    pub fn mutating_calls(&self) -> Vec<String> {
        const READ_ONLY: &[&str] = &["fetch ", "git_dir", "remotes", "describe "];
        self.calls()
            .into_iter()
            .filter(|c| !READ_ONLY.iter().any(|p| c.starts_with(p)))
            .collect()
    }

    pub fn merge_calls(&self) -> Vec<MergeCall> {
        self.merge_calls.lock().unwrap().clone()
    }

    pub fn push_calls(&self) -> Vec<PushCall> {
        self.push_calls.lock().unwrap().clone()
    }

    pub fn config_calls(&self) -> Vec<(String, String)> {
        self.config_calls.lock().unwrap().clone()
    }

    pub fn commit_calls(&self) -> Vec<(Vec<PathBuf>, String)> {
        self.commit_calls.lock().unwrap().clone()
    }

    pub fn remote_names(&self) -> Vec<String> {
        self.remotes
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.branches.lock().unwrap().contains(name)
    }

    /// Branch checked out by the last `checkout_new_branch`, with its start point
    pub fn head(&self) -> Option<String> {
        self.head.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.log.lock().unwrap().push(call);
    }
}

fn git_failure(command: &str, stderr: &str, code: i32) -> Error {
    Error::Git {
        command: command.to_string(),
        stderr: stderr.to_string(),
        code: Some(code),
    }
}

#[async_trait]
impl VcsClient for MockVcs {
    fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    async fn git_dir(&self) -> Result<PathBuf> {
        self.record("git_dir".to_string());
        Ok(self.work_dir.join(".git"))
    }

    async fn remotes(&self) -> Result<Vec<RemoteState>> {
        self.record("remotes".to_string());
        Ok(self.remotes.lock().unwrap().clone())
    }

    async fn add_remote(&self, spec: &BranchSpec, with_tags: bool) -> Result<()> {
        self.record(format!(
            "add_remote {} {}{}",
            spec.name,
            spec.branch_or_default(),
            if with_tags { " --tags" } else { "" }
        ));
        self.remotes
            .lock()
            .unwrap()
            .push(RemoteState::new(&spec.name, &spec.url));
        Ok(())
    }

    async fn remove_remote(&self, name: &str) -> Result<()> {
        self.record(format!("remove_remote {name}"));
        self.remotes.lock().unwrap().retain(|r| r.name != name);
        let prefix = format!("{name}/");
        self.refs.lock().unwrap().retain(|k, _| !k.starts_with(&prefix));
        Ok(())
    }

    async fn fetch(&self, remote: &str, with_tags: bool) -> Result<FetchResult> {
        self.record(format!(
            "fetch {remote}{}",
            if with_tags { " --tags" } else { "" }
        ));
        if self.fetch_errors.lock().unwrap().contains(remote) {
            return Err(Error::RepositoryUnreachable {
                target: remote.to_string(),
                message: "could not read from remote repository".to_string(),
            });
        }

        let updates = self
            .pending_fetches
            .lock()
            .unwrap()
            .remove(remote)
            .unwrap_or_default();
        let changed = !updates.is_empty();
        let mut refs = self.refs.lock().unwrap();
        for (refname, sha) in updates {
            refs.insert(refname, sha);
        }
        Ok(FetchResult { changed })
    }

    async fn resolve(&self, rev: &str) -> Result<Option<String>> {
        Ok(self.refs.lock().unwrap().get(rev).cloned())
    }

    async fn latest_tag(&self, rev: &str) -> Result<String> {
        self.tags
            .lock()
            .unwrap()
            .get(rev)
            .cloned()
            .ok_or_else(|| git_failure("describe --tags --abbrev=0", "No names found", 128))
    }

    async fn describe(&self, rev: &str) -> Result<String> {
        self.record(format!("describe {rev}"));
        Ok(self.describe.lock().unwrap().clone())
    }

    async fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.branches.lock().unwrap().contains(name))
    }

    async fn rename_branch(&self, from: &str, to: &str) -> Result<()> {
        self.record(format!("rename_branch {from} {to}"));
        let mut branches = self.branches.lock().unwrap();
        if !branches.remove(from) {
            return Err(git_failure("branch -m", "no such branch", 1));
        }
        branches.insert(to.to_string());
        Ok(())
    }

    async fn checkout_new_branch(&self, name: &str, start: &str) -> Result<()> {
        self.record(format!("checkout_new_branch {name} {start}"));
        self.branches.lock().unwrap().insert(name.to_string());
        *self.head.lock().unwrap() = Some(format!("{name}@{start}"));
        self.merged.lock().unwrap().insert(start.to_string());
        Ok(())
    }

    async fn is_ancestor(&self, ancestor: &str, _descendant: &str) -> Result<bool> {
        Ok(self.merged.lock().unwrap().contains(ancestor))
    }

    async fn count_commits(&self, _from: &str, to: &str) -> Result<u64> {
        Ok(self
            .commit_counts
            .lock()
            .unwrap()
            .get(to)
            .copied()
            .unwrap_or(1))
    }

    async fn merge(&self, source: &str, message: &str) -> Result<MergeResult> {
        self.record(format!("merge {source}"));
        self.merge_calls.lock().unwrap().push(MergeCall {
            source: source.to_string(),
            message: message.to_string(),
        });
        let result = self
            .merge_results
            .lock()
            .unwrap()
            .get(source)
            .copied()
            .unwrap_or(MergeResult::Clean);
        if result == MergeResult::Clean {
            self.merged.lock().unwrap().insert(source.to_string());
        }
        Ok(result)
    }

    async fn commit_merge(&self) -> Result<()> {
        self.record("commit_merge".to_string());
        if let Some(code) = *self.commit_merge_error.lock().unwrap() {
            return Err(git_failure(
                "commit --no-edit",
                "Committing is not possible because you have unmerged files.",
                code,
            ));
        }
        Ok(())
    }

    async fn abort_merge(&self) -> Result<()> {
        self.record("abort_merge".to_string());
        Ok(())
    }

    async fn run_mergetool(&self) -> Result<()> {
        self.record("run_mergetool".to_string());
        if *self.mergetool_error.lock().unwrap() {
            return Err(git_failure("mergetool", "merge of file.c failed", 1));
        }
        Ok(())
    }

    async fn commit_paths(&self, paths: &[&Path], message: &str) -> Result<()> {
        self.record(format!("commit_paths {message}"));
        self.commit_calls.lock().unwrap().push((
            paths.iter().map(|p| p.to_path_buf()).collect(),
            message.to_string(),
        ));
        Ok(())
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.record(format!("set_config {key}={value}"));
        self.config_calls
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }

    async fn push(&self, url: &str, refspec: &str, force: bool) -> Result<()> {
        self.record(format!("push {url} {refspec}"));
        if let Some(msg) = self.push_error.lock().unwrap().as_ref() {
            return Err(git_failure("push", msg, 1));
        }
        self.push_calls.lock().unwrap().push(PushCall {
            url: url.to_string(),
            refspec: refspec.to_string(),
            force,
        });
        Ok(())
    }

    async fn clone_repository(&self, url: &str, dest: &Path) -> Result<()> {
        self.record(format!("clone_repository {url}"));
        if let Some(msg) = self.clone_error.lock().unwrap().as_ref() {
            return Err(git_failure("clone", msg, 128));
        }
        std::fs::create_dir_all(dest)?;
        Ok(())
    }

    async fn refresh_checkout(&self, path: &Path) -> Result<()> {
        self.record(format!("refresh_checkout {}", path.display()));
        Ok(())
    }

    async fn has_uncommitted_changes(&self, _path: &Path) -> Result<bool> {
        Ok(*self.cache_dirty.lock().unwrap())
    }

    async fn commit_all(&self, _path: &Path, message: &str) -> Result<()> {
        self.record(format!("commit_all {message}"));
        Ok(())
    }
}
