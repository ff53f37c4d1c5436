//! Publishing the integration branch

use crate::error::Result;
use crate::progress::{Phase, ProgressCallback, PushStatus};
use crate::prompt::ConfirmationPort;
use crate::vcs::VcsClient;
use tracing::info;

/// What got pushed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishResult {
    /// Refs pushed, in push order
    pub pushed: Vec<String>,
    /// Whether the operator declined
    pub declined: bool,
}

/// Push the integration branch (and a rotated-out branch) to `push_url`
///
/// Nothing happens without a push URL. The integration branch is
/// force-pushed since it is rebuilt every run; the rotated branch is a new
/// ref and is pushed without force.
pub async fn publish(
    vcs: &dyn VcsClient,
    confirm: &dyn ConfirmationPort,
    progress: &dyn ProgressCallback,
    push_url: Option<&str>,
    branch: &str,
    rotated: Option<&str>,
) -> Result<PublishResult> {
    let mut result = PublishResult::default();
    let Some(url) = push_url else {
        return Ok(result);
    };

    if !confirm.confirm(&format!("Push {branch} to {url}?"), true)? {
        progress.on_push(branch, PushStatus::Skipped).await;
        result.declined = true;
        return Ok(result);
    }

    progress.on_phase(Phase::Pushing).await;

    let mut refs = vec![(branch, true)];
    if let Some(old) = rotated {
        refs.push((old, false));
    }

    for (name, force) in refs {
        progress.on_push(name, PushStatus::Started).await;
        let refspec = format!("refs/heads/{name}:refs/heads/{name}");
        match vcs.push(url, &refspec, force).await {
            Ok(()) => {
                info!(branch = name, url, force, "pushed");
                progress.on_push(name, PushStatus::Success).await;
                result.pushed.push(name.to_string());
            }
            Err(e) => {
                progress
                    .on_push(name, PushStatus::Failed(e.to_string()))
                    .await;
                return Err(e);
            }
        }
    }

    Ok(result)
}
