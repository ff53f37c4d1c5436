//! Topic manifest committed on the integration branch
//!
//! Downstream tooling parses this file, so the layout is fixed: a
//! `Name SHA1` header and one row per merged topic.

use crate::error::Result;
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Manifest location relative to the work tree
pub const MANIFEST_PATH: &str = "Next/SHA1s";

/// Column width of the name field
const NAME_WIDTH: usize = 20;

/// Merged topics and the tips they were merged at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicManifest {
    rows: Vec<(String, String)>,
}

impl TopicManifest {
    /// Empty manifest
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Append a merged topic
    pub fn push(&mut self, name: &str, sha: &str) {
        self.rows.push((name.to_string(), sha.to_string()));
    }

    /// Whether no topic was recorded
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Topic names in merge order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(name, _)| name.as_str())
    }

    /// File contents
    pub fn render(&self) -> String {
        let mut out = format!("{:<NAME_WIDTH$} SHA1\n", "Name");
        for (name, sha) in &self.rows {
            let _ = writeln!(out, "{name:<NAME_WIDTH$} {sha}");
        }
        out
    }

    /// Write the manifest under `work_dir`, returning its relative path
    pub fn write(&self, work_dir: &Path) -> Result<PathBuf> {
        let relative = PathBuf::from(MANIFEST_PATH);
        let full = work_dir.join(&relative);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full, self.render())?;
        Ok(relative)
    }

    /// Parse manifest text back into `(name, sha)` rows
    pub fn parse(text: &str) -> Self {
        let rows = text
            .lines()
            .skip(1)
            .filter_map(|line| {
                let mut fields = line.split_whitespace();
                Some((fields.next()?.to_string(), fields.next()?.to_string()))
            })
            .collect();
        Self { rows }
    }

    /// Recorded rows
    pub fn rows(&self) -> &[(String, String)] {
        &self.rows
    }
}
