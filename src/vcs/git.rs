//! `VcsClient` backed by the `git` binary
//!
//! Uses the system git so SSH keys, credential helpers and the operator's
//! merge tool configuration all apply unchanged.

use crate::error::{Error, Result};
use crate::types::{BranchSpec, RemoteState};
use crate::vcs::{FetchResult, MergeResult, VcsClient};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Git repository driven through the command line
#[derive(Debug, Clone)]
pub struct GitCli {
    work_dir: PathBuf,
}

impl GitCli {
    /// Open the repository containing `path`
    pub async fn open(path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(path)
            .output()
            .await
            .map_err(|e| Error::RepositoryUnreachable {
                target: path.display().to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::RepositoryUnreachable {
                target: path.display().to_string(),
                message: stderr_of(&output),
            });
        }

        let top = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Self {
            work_dir: PathBuf::from(top),
        })
    }

    async fn output_in(&self, dir: &Path, args: &[&str]) -> Result<Output> {
        debug!("git {} (in {})", args.join(" "), dir.display());
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::Git {
                command: args.join(" "),
                stderr: e.to_string(),
                code: None,
            })
    }

    async fn run_in(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let output = self.output_in(dir, args).await?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(git_error(args, &output))
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        self.run_in(&self.work_dir, args).await
    }

    /// Run a git predicate: exit 0 is true, exit 1 is false
    async fn check(&self, args: &[&str]) -> Result<bool> {
        let output = self.output_in(&self.work_dir, args).await?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(git_error(args, &output)),
        }
    }
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

fn git_error(args: &[&str], output: &Output) -> Error {
    Error::Git {
        command: args.join(" "),
        stderr: stderr_of(output),
        code: output.status.code(),
    }
}

fn unreachable(target: &str, err: Error) -> Error {
    let message = match err {
        Error::Git { stderr, .. } => stderr,
        other => other.to_string(),
    };
    Error::RepositoryUnreachable {
        target: target.to_string(),
        message,
    }
}

/// Parse `git remote -v` output into fetch URLs
fn parse_remote_list(stdout: &str) -> Vec<RemoteState> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let url = parts.next()?;
            (parts.next() == Some("(fetch)")).then(|| RemoteState::new(name, url))
        })
        .collect()
}

#[async_trait]
impl VcsClient for GitCli {
    fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    async fn git_dir(&self) -> Result<PathBuf> {
        self.run(&["rev-parse", "--absolute-git-dir"])
            .await
            .map(PathBuf::from)
    }

    async fn remotes(&self) -> Result<Vec<RemoteState>> {
        let stdout = self.run(&["remote", "-v"]).await?;
        Ok(parse_remote_list(&stdout))
    }

    async fn add_remote(&self, spec: &BranchSpec, with_tags: bool) -> Result<()> {
        let tags = if with_tags { "--tags" } else { "--no-tags" };
        self.run(&[
            "remote",
            "add",
            "-t",
            spec.branch_or_default(),
            "-f",
            tags,
            &spec.name,
            &spec.url,
        ])
        .await
        .map_err(|e| unreachable(&spec.url, e))?;
        Ok(())
    }

    async fn remove_remote(&self, name: &str) -> Result<()> {
        self.run(&["remote", "remove", name]).await?;
        Ok(())
    }

    async fn fetch(&self, remote: &str, with_tags: bool) -> Result<FetchResult> {
        let mut args = vec!["fetch"];
        if with_tags {
            args.push("--tags");
        }
        args.push(remote);

        let output = self.output_in(&self.work_dir, &args).await?;
        if !output.status.success() {
            return Err(unreachable(remote, git_error(&args, &output)));
        }

        // git fetch is silent unless something was updated
        let changed = !output.stderr.iter().all(u8::is_ascii_whitespace)
            || !output.stdout.iter().all(u8::is_ascii_whitespace);
        Ok(FetchResult { changed })
    }

    async fn resolve(&self, rev: &str) -> Result<Option<String>> {
        let spec = format!("{rev}^{{commit}}");
        let args = ["rev-parse", "--verify", "--quiet", spec.as_str()];
        let output = self.output_in(&self.work_dir, &args).await?;
        match output.status.code() {
            Some(0) => Ok(Some(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            )),
            Some(1) => Ok(None),
            _ => Err(git_error(&args, &output)),
        }
    }

    async fn latest_tag(&self, rev: &str) -> Result<String> {
        self.run(&["describe", "--tags", "--abbrev=0", rev]).await
    }

    async fn describe(&self, rev: &str) -> Result<String> {
        self.run(&["describe", "--tags", "--always", rev]).await
    }

    async fn branch_exists(&self, name: &str) -> Result<bool> {
        let full = format!("refs/heads/{name}");
        self.check(&["show-ref", "--verify", "--quiet", &full]).await
    }

    async fn rename_branch(&self, from: &str, to: &str) -> Result<()> {
        self.run(&["branch", "-m", from, to]).await?;
        Ok(())
    }

    async fn checkout_new_branch(&self, name: &str, start: &str) -> Result<()> {
        self.run(&["checkout", "-b", name, start]).await?;
        Ok(())
    }

    async fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        self.check(&["merge-base", "--is-ancestor", ancestor, descendant])
            .await
    }

    async fn count_commits(&self, from: &str, to: &str) -> Result<u64> {
        let range = format!("{from}..{to}");
        let stdout = self.run(&["rev-list", "--count", &range]).await?;
        stdout.parse().map_err(|_| Error::Git {
            command: format!("rev-list --count {range}"),
            stderr: format!("unexpected output: {stdout}"),
            code: None,
        })
    }

    async fn merge(&self, source: &str, message: &str) -> Result<MergeResult> {
        let args = ["merge", "--no-ff", "-m", message, source];
        let output = self.output_in(&self.work_dir, &args).await?;
        if output.status.success() {
            return Ok(MergeResult::Clean);
        }

        // A stopped merge leaves MERGE_HEAD behind; anything else is a real failure
        if self.resolve("MERGE_HEAD").await?.is_some() {
            Ok(MergeResult::Conflicted)
        } else {
            Err(git_error(&args, &output))
        }
    }

    async fn commit_merge(&self) -> Result<()> {
        self.run(&["commit", "--no-edit"]).await?;
        Ok(())
    }

    async fn abort_merge(&self) -> Result<()> {
        self.run(&["merge", "--abort"]).await?;
        Ok(())
    }

    async fn run_mergetool(&self) -> Result<()> {
        let status = Command::new("git")
            .arg("mergetool")
            .current_dir(&self.work_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Git {
                command: "mergetool".to_string(),
                stderr: "merge tool exited unsuccessfully".to_string(),
                code: status.code(),
            })
        }
    }

    async fn commit_paths(&self, paths: &[&Path], message: &str) -> Result<()> {
        let path_args: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        let mut add = vec!["add", "--"];
        add.extend(path_args.iter().map(String::as_str));
        self.run(&add).await?;
        self.run(&["commit", "-m", message]).await?;
        Ok(())
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.run(&["config", key, value]).await?;
        Ok(())
    }

    async fn push(&self, url: &str, refspec: &str, force: bool) -> Result<()> {
        let mut args = vec!["push"];
        if force {
            args.push("--force");
        }
        args.extend([url, refspec]);
        self.run(&args).await.map_err(|e| unreachable(url, e))?;
        Ok(())
    }

    async fn clone_repository(&self, url: &str, dest: &Path) -> Result<()> {
        let dest_str = dest.display().to_string();
        self.run(&["clone", "--quiet", url, &dest_str])
            .await
            .map_err(|e| unreachable(url, e))?;
        Ok(())
    }

    async fn refresh_checkout(&self, path: &Path) -> Result<()> {
        self.run_in(path, &["fetch", "--quiet", "origin"]).await?;

        // An empty remote has no upstream branch yet; keep the local state
        let upstream = ["rev-parse", "--verify", "--quiet", "@{upstream}"];
        if !self.output_in(path, &upstream).await?.status.success() {
            debug!("No upstream in {}, nothing to reset to", path.display());
            return Ok(());
        }

        self.run_in(path, &["reset", "--hard", "--quiet", "@{upstream}"])
            .await?;
        Ok(())
    }

    async fn has_uncommitted_changes(&self, path: &Path) -> Result<bool> {
        let status = self.run_in(path, &["status", "--porcelain"]).await?;
        Ok(!status.is_empty())
    }

    async fn commit_all(&self, path: &Path, message: &str) -> Result<()> {
        self.run_in(path, &["add", "-A"]).await?;
        self.run_in(path, &["commit", "--quiet", "-m", message])
            .await?;
        Ok(())
    }
}
