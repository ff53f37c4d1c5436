//! git-integrate - continuous merge integration for git
//!
//! Builds a linux-next style integration branch: a baseline branch plus a
//! configured list of topic branches, merged in order on every run, with
//! conflict resolutions shared through a rerere cache repository.
//!
//! Every git operation goes through the [`vcs::VcsClient`] trait and every
//! operator question through [`prompt::ConfirmationPort`], so the whole
//! pipeline in [`run`] can be driven by a mock in tests.

pub mod config;
pub mod error;
pub mod integrate;
pub mod progress;
pub mod prompt;
pub mod publish;
pub mod reconcile;
pub mod report;
pub mod rerere;
pub mod run;
pub mod types;
pub mod vcs;

pub use error::{Error, Result};
