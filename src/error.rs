//! Error types for git-integrate
//!
//! Every variant names the remote, URL, topic or path at fault so the
//! operator knows what to fix.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for git-integrate operations
#[derive(Error, Debug)]
pub enum Error {
    /// No branch-list configuration file could be located
    #[error("no branch configuration found (searched: {})", format_paths(searched))]
    ConfigNotFound {
        /// Every location that was checked, in priority order
        searched: Vec<PathBuf>,
    },

    /// A configuration line could not be parsed
    #[error("{}:{line}: {message}", path.display())]
    ConfigParse {
        /// Configuration file
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        message: String,
    },

    /// The same remote name appears twice in the configuration
    #[error("remote '{name}' is configured twice (lines {first} and {second})")]
    DuplicateRemote {
        /// Remote name
        name: String,
        /// Line of the first occurrence
        first: usize,
        /// Line of the repeated occurrence
        second: usize,
    },

    /// No configuration entry matches the baseline name
    #[error("baseline remote '{0}' is not listed in the branch configuration")]
    BaselineMissing(String),

    /// Reconciliation would drop the baseline remote
    #[error("refusing to remove baseline remote '{name}' ({url}); fix the branch configuration")]
    BaselineRemovalRefused {
        /// Baseline remote name
        name: String,
        /// URL currently registered for it
        url: String,
    },

    /// A local repository, remote or ref could not be reached
    #[error("repository unreachable: {target}: {message}")]
    RepositoryUnreachable {
        /// Path, URL or remote name
        target: String,
        /// Underlying failure
        message: String,
    },

    /// The shared rerere cache could not be cloned or refreshed
    #[error("rerere cache unreachable at {url}: {message}")]
    RerereCacheUnreachable {
        /// Cache repository URL
        url: String,
        /// Underlying failure
        message: String,
    },

    /// A topic could not be merged (conflicts left unresolved)
    #[error("merge of '{topic}' ({source_ref}) failed; resolve the conflict and record it with rerere")]
    MergeFailed {
        /// Topic (remote) name
        topic: String,
        /// Ref that was being merged
        source_ref: String,
        /// Exit code of the failing git command
        code: i32,
    },

    /// Interactive resolution did not produce a committable merge
    #[error("manual resolution of '{topic}' did not complete")]
    ManualResolutionFailed {
        /// Topic (remote) name
        topic: String,
    },

    /// A git command exited unsuccessfully
    #[error("git {command} failed{}: {stderr}", code.map(|c| format!(" (exit {c})")).unwrap_or_default())]
    Git {
        /// Arguments passed to git
        command: String,
        /// Captured standard error
        stderr: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
    },

    /// Operator prompt failed (no terminal, I/O error)
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Regex compilation error
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Process exit code for this error
    ///
    /// A failed merge terminates with git's own exit code; everything else
    /// exits with 1.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::MergeFailed { code, .. } if *code != 0 => *code,
            _ => 1,
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_lists_paths() {
        let err = Error::ConfigNotFound {
            searched: vec![PathBuf::from("/a/branches"), PathBuf::from("/b/branches")],
        };
        let msg = err.to_string();
        assert!(msg.contains("/a/branches"));
        assert!(msg.contains("/b/branches"));
    }

    #[test]
    fn test_merge_failed_exit_code() {
        let err = Error::MergeFailed {
            topic: "net".to_string(),
            source_ref: "net/master".to_string(),
            code: 128,
        };
        assert_eq!(err.exit_code(), 128);
        assert!(err.to_string().contains("net/master"));
    }

    #[test]
    fn test_other_errors_exit_one() {
        assert_eq!(Error::BaselineMissing("origin".to_string()).exit_code(), 1);
        let zero = Error::MergeFailed {
            topic: "t".to_string(),
            source_ref: "t/b".to_string(),
            code: 0,
        };
        assert_eq!(zero.exit_code(), 1);
    }

    #[test]
    fn test_git_error_display() {
        let err = Error::Git {
            command: "fetch net".to_string(),
            stderr: "fatal: no such remote".to_string(),
            code: Some(128),
        };
        assert_eq!(err.to_string(), "git fetch net failed (exit 128): fatal: no such remote");
    }
}
