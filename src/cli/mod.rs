//! CLI commands
//!
//! Command implementations for the `git-integrate` binary.

mod build;
mod confirm;
mod progress;
mod remotes;
mod report;
mod status;
pub mod style;

pub use build::{BuildArgs, run_build};
pub use remotes::run_remotes;
pub use report::run_report;
pub use status::run_status;

use git_integrate::config;
use git_integrate::error::Result;
use git_integrate::types::BranchList;
use git_integrate::vcs::{GitCli, VcsClient};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Repository, branch list and baseline shared by every command
pub struct Workspace {
    pub vcs: GitCli,
    pub git_dir: PathBuf,
    pub config_path: PathBuf,
    pub specs: BranchList,
    pub baseline: String,
}

impl Workspace {
    /// Open the repository at `repo` and load its branch configuration
    pub async fn open(repo: &Path, config: Option<&Path>, baseline: &str) -> Result<Self> {
        let vcs = GitCli::open(repo).await?;
        let git_dir = vcs.git_dir().await?;
        let config_path =
            config::resolve_config_path(config, &config::default_config_paths(&git_dir))?;
        debug!("Using branch configuration {}", config_path.display());
        let specs = config::load_with_baseline(&config_path, baseline)?;

        Ok(Self {
            vcs,
            git_dir,
            config_path,
            specs,
            baseline: baseline.to_string(),
        })
    }
}
