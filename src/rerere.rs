//! Shared rerere cache
//!
//! The team's recorded conflict resolutions live in their own repository.
//! It is cloned into the git dir and git's `rr-cache` is symlinked into it,
//! so `git rerere` reads and records straight into the shared checkout.

use crate::error::{Error, Result};
use crate::progress::{Phase, ProgressCallback};
use crate::vcs::VcsClient;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Mount directory for the cache checkout, relative to the git dir
pub const CACHE_MOUNT_DIR: &str = "rerere-cache";

/// git's native resolution store name (inside the git dir and the mount)
pub const RR_CACHE_DIR: &str = "rr-cache";

/// Commit message used when saving new resolutions
pub const CACHE_COMMIT_MESSAGE: &str = "Update rerere cache";

/// A mounted shared rerere cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RerereCache {
    /// Cache repository URL
    pub url: String,
    /// Local checkout of the cache repository
    pub mount: PathBuf,
}

/// Prepare conflict-resolution reuse for this run
///
/// With a cache URL: clone (first run) or fetch and hard-reset (later runs)
/// the cache, point `rr-cache` at it and enable `rerere.enabled` plus
/// `rerere.autoupdate`. Local unpushed resolutions in the mount are
/// discarded; the remote copy is canonical.
///
/// Without a cache URL rerere is disabled so every conflict reaches the
/// operator.
pub async fn setup(
    vcs: &dyn VcsClient,
    cache_url: Option<&str>,
    progress: &dyn ProgressCallback,
) -> Result<Option<RerereCache>> {
    let Some(url) = cache_url else {
        debug!("No rerere cache configured, disabling rerere");
        vcs.set_config("rerere.enabled", "false").await?;
        return Ok(None);
    };

    progress.on_phase(Phase::PreparingCache).await;

    let git_dir = vcs.git_dir().await?;
    let mount = git_dir.join(CACHE_MOUNT_DIR);
    let unreachable = |err: Error| Error::RerereCacheUnreachable {
        url: url.to_string(),
        message: err.to_string(),
    };

    if mount.exists() {
        debug!("Refreshing rerere cache at {}", mount.display());
        vcs.refresh_checkout(&mount).await.map_err(unreachable)?;
    } else {
        info!(url, "cloning rerere cache");
        vcs.clone_repository(url, &mount).await.map_err(unreachable)?;
    }

    link_rr_cache(&git_dir, &mount)?;

    vcs.set_config("rerere.enabled", "true").await?;
    vcs.set_config("rerere.autoupdate", "true").await?;

    Ok(Some(RerereCache {
        url: url.to_string(),
        mount,
    }))
}

/// Point `<git-dir>/rr-cache` at `<mount>/rr-cache`
///
/// A real `rr-cache` directory is moved aside rather than deleted.
pub fn link_rr_cache(git_dir: &Path, mount: &Path) -> Result<()> {
    let target = mount.join(RR_CACHE_DIR);
    std::fs::create_dir_all(&target)?;

    let link = git_dir.join(RR_CACHE_DIR);
    match std::fs::symlink_metadata(&link) {
        Ok(meta) if meta.file_type().is_symlink() => {
            if std::fs::read_link(&link)? == target {
                return Ok(());
            }
            std::fs::remove_file(&link)?;
        }
        Ok(_) => {
            let aside = git_dir.join(format!(
                "{RR_CACHE_DIR}.local-{}",
                Local::now().format("%Y%m%d-%H%M%S")
            ));
            info!(
                "moving existing {} aside to {}",
                link.display(),
                aside.display()
            );
            std::fs::rename(&link, &aside)?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    symlink_dir(&target, &link)?;
    Ok(())
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

/// Commit any new resolutions in the cache checkout
///
/// Returns whether a commit was made. Never pushes: sharing the cache is an
/// explicit operator step.
pub async fn publish(
    vcs: &dyn VcsClient,
    cache: &RerereCache,
    progress: &dyn ProgressCallback,
) -> Result<bool> {
    progress.on_phase(Phase::PublishingCache).await;

    if !vcs.has_uncommitted_changes(&cache.mount).await? {
        debug!("No new resolutions to save");
        return Ok(false);
    }

    vcs.commit_all(&cache.mount, CACHE_COMMIT_MESSAGE).await?;
    info!(mount = %cache.mount.display(), "committed new resolutions");
    progress
        .on_message(&format!(
            "New resolutions committed in {}; push them to share with the team",
            cache.mount.display()
        ))
        .await;
    Ok(true)
}
