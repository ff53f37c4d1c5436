//! Integration branch building
//!
//! Turns the reconciled remotes into a fresh integration branch:
//! baseline tip, rotation of the previous branch, ordered topic merges and
//! the topic manifest.

mod builder;
mod manifest;

pub use builder::{
    BuildOptions, BuildResult, BuildState, IntegrationBuilder, MANIFEST_COMMIT_MESSAGE,
    rotated_name,
};
pub use manifest::{MANIFEST_PATH, TopicManifest};

use crate::error::Result;
use crate::prompt::ConfirmationPort;
use crate::reconcile::ReconciliationResult;
use crate::types::NoChangePolicy;
use tracing::info;

/// Decide whether a build is warranted
///
/// Always builds when something changed. With no changes the policy decides;
/// `Prompt` asks whether to abort, defaulting to yes.
pub fn should_build(
    reconciliation: &ReconciliationResult,
    policy: NoChangePolicy,
    confirm: &dyn ConfirmationPort,
) -> Result<bool> {
    if reconciliation.has_changes() {
        return Ok(true);
    }

    info!("no remote or baseline changes since the last run");
    match policy {
        NoChangePolicy::Proceed => Ok(true),
        NoChangePolicy::Abort => Ok(false),
        NoChangePolicy::Prompt => {
            let abort = confirm.confirm("Nothing changed since the last run. Abort?", true)?;
            Ok(!abort)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{AcceptDefaults, ScriptedAnswers};

    #[test]
    fn test_changes_always_build() {
        let result = ReconciliationResult {
            updated: vec!["net".to_string()],
            ..Default::default()
        };
        let port = ScriptedAnswers::always(true);
        assert!(should_build(&result, NoChangePolicy::Abort, &port).unwrap());
        assert!(port.questions().is_empty());
    }

    #[test]
    fn test_no_changes_prompt_defaults_to_abort() {
        let result = ReconciliationResult::default();
        assert!(!should_build(&result, NoChangePolicy::Prompt, &AcceptDefaults).unwrap());
    }

    #[test]
    fn test_no_changes_operator_continues() {
        let result = ReconciliationResult::default();
        let port = ScriptedAnswers::always(false);
        assert!(should_build(&result, NoChangePolicy::Prompt, &port).unwrap());
        assert_eq!(port.questions().len(), 1);
    }

    #[test]
    fn test_no_changes_fixed_policies() {
        let result = ReconciliationResult::default();
        let port = ScriptedAnswers::always(false);
        assert!(should_build(&result, NoChangePolicy::Proceed, &port).unwrap());
        assert!(!should_build(&result, NoChangePolicy::Abort, &port).unwrap());
        assert!(port.questions().is_empty());
    }
}
