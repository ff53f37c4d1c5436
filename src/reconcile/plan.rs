//! Reconciliation planning
//!
//! Diffs the configured remotes against git's remotes without touching
//! anything.

use crate::error::{Error, Result};
use crate::types::{BranchList, BranchSpec, RemoteState};

/// Remote changes needed to match the configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    /// Remotes that are not configured, or configured with another URL
    pub to_remove: Vec<RemoteState>,
    /// Configured remotes missing from git (in configuration order)
    pub to_add: Vec<BranchSpec>,
    /// Baseline remote name
    pub baseline: String,
}

impl ReconciliationPlan {
    /// Whether the remotes already match the configuration
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

/// Compute the reconciliation plan
///
/// A remote whose URL changed shows up in both lists: it is removed and added
/// back with the new URL. The baseline is never removed; a plan that would do
/// so fails with `BaselineRemovalRefused`.
pub fn create_reconciliation_plan(
    specs: &BranchList,
    remotes: &[RemoteState],
    baseline: &str,
) -> Result<ReconciliationPlan> {
    let to_remove: Vec<RemoteState> = remotes
        .iter()
        .filter(|remote| {
            specs
                .get(&remote.name)
                .is_none_or(|spec| spec.url != remote.url)
        })
        .cloned()
        .collect();

    if let Some(remote) = to_remove.iter().find(|r| r.name == baseline) {
        return Err(Error::BaselineRemovalRefused {
            name: remote.name.clone(),
            url: remote.url.clone(),
        });
    }

    if specs.baseline(baseline).is_none() {
        return Err(Error::BaselineMissing(baseline.to_string()));
    }

    let to_add: Vec<BranchSpec> = specs
        .specs()
        .iter()
        .filter(|spec| {
            !remotes
                .iter()
                .any(|r| r.name == spec.name && r.url == spec.url)
        })
        .cloned()
        .collect();

    Ok(ReconciliationPlan {
        to_remove,
        to_add,
        baseline: baseline.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> BranchList {
        BranchList::new(vec![
            BranchSpec::new("origin", "https://example.com/linux.git", ""),
            BranchSpec::new("net", "https://example.com/net.git", "main"),
            BranchSpec::new("sound", "https://example.com/sound.git", "for-next"),
        ])
    }

    fn remotes_matching(list: &BranchList) -> Vec<RemoteState> {
        list.specs()
            .iter()
            .map(|s| RemoteState::new(&s.name, &s.url))
            .collect()
    }

    #[test]
    fn test_missing_remotes_are_added_in_config_order() {
        let remotes = vec![RemoteState::new("origin", "https://example.com/linux.git")];
        let plan = create_reconciliation_plan(&specs(), &remotes, "origin").unwrap();

        let added: Vec<&str> = plan.to_add.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(added, vec!["net", "sound"]);
        assert!(plan.to_remove.is_empty());
    }

    #[test]
    fn test_orphaned_remote_is_removed() {
        let list = specs();
        let mut remotes = remotes_matching(&list);
        remotes.push(RemoteState::new("old", "https://example.com/old.git"));

        let plan = create_reconciliation_plan(&list, &remotes, "origin").unwrap();
        assert_eq!(plan.to_remove, vec![RemoteState::new("old", "https://example.com/old.git")]);
        assert!(plan.to_add.is_empty());
    }

    #[test]
    fn test_changed_url_is_removed_and_added() {
        let list = specs();
        let mut remotes = remotes_matching(&list);
        remotes[1].url = "https://mirror.example.com/net.git".to_string();

        let plan = create_reconciliation_plan(&list, &remotes, "origin").unwrap();
        assert_eq!(plan.to_remove.len(), 1);
        assert_eq!(plan.to_remove[0].name, "net");
        assert_eq!(plan.to_add.len(), 1);
        assert_eq!(plan.to_add[0].url, "https://example.com/net.git");
    }

    #[test]
    fn test_matching_remotes_give_empty_plan() {
        let list = specs();
        let remotes = remotes_matching(&list);

        let first = create_reconciliation_plan(&list, &remotes, "origin").unwrap();
        let second = create_reconciliation_plan(&list, &remotes, "origin").unwrap();
        assert!(first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_baseline_removal_refused_when_unconfigured() {
        let list = BranchList::new(vec![BranchSpec::new(
            "net",
            "https://example.com/net.git",
            "main",
        )]);
        let remotes = vec![
            RemoteState::new("origin", "https://example.com/linux.git"),
            RemoteState::new("net", "https://example.com/net.git"),
        ];

        let err = create_reconciliation_plan(&list, &remotes, "origin").unwrap_err();
        assert!(matches!(err, Error::BaselineRemovalRefused { name, .. } if name == "origin"));
    }

    #[test]
    fn test_baseline_removal_refused_on_url_change() {
        let list = specs();
        let mut remotes = remotes_matching(&list);
        remotes[0].url = "https://elsewhere.example.com/linux.git".to_string();

        let err = create_reconciliation_plan(&list, &remotes, "origin").unwrap_err();
        assert!(matches!(err, Error::BaselineRemovalRefused { .. }));
    }

    #[test]
    fn test_baseline_missing_without_remote() {
        let list = BranchList::new(vec![BranchSpec::new("net", "u", "main")]);
        let err = create_reconciliation_plan(&list, &[], "origin").unwrap_err();
        assert!(matches!(err, Error::BaselineMissing(_)));
    }
}
