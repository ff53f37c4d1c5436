//! Branch-list configuration
//!
//! One record per line: `<remote-name> <url> [<branch>]`. Blank lines and
//! lines starting with `#` are ignored. Records keep file order, which is
//! the order topics get merged in.

use crate::error::{Error, Result};
use crate::types::{BranchList, BranchSpec};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name used at every default location
pub const CONFIG_FILE_NAME: &str = "branches";

/// Directory name under the git dir and the user config dir
pub const CONFIG_DIR_NAME: &str = "git-integrate";

/// System-wide default location
pub const SYSTEM_CONFIG_PATH: &str = "/etc/git-integrate/branches";

/// Default configuration locations in priority order (explicit path excluded)
///
/// 1. `<git-dir>/git-integrate/branches`
/// 2. `<user config dir>/git-integrate/branches`
/// 3. `/etc/git-integrate/branches`
pub fn default_config_paths(git_dir: &Path) -> Vec<PathBuf> {
    let mut paths = vec![git_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(SYSTEM_CONFIG_PATH));
    paths
}

/// Pick the configuration file to use
///
/// An explicit path wins and must exist. Otherwise the first existing
/// candidate is returned.
pub fn resolve_config_path(explicit: Option<&Path>, candidates: &[PathBuf]) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(Error::ConfigNotFound {
            searched: vec![path.to_path_buf()],
        });
    }

    for candidate in candidates {
        debug!("Looking for branch configuration at {}", candidate.display());
        if candidate.is_file() {
            return Ok(candidate.clone());
        }
    }

    Err(Error::ConfigNotFound {
        searched: candidates.to_vec(),
    })
}

/// Parse configuration text
///
/// `path` is only used for error messages.
pub fn parse(text: &str, path: &Path) -> Result<BranchList> {
    let mut specs = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let spec = match fields.as_slice() {
            [name, url] => BranchSpec::new(*name, *url, ""),
            [name, url, branch] => BranchSpec::new(*name, *url, *branch),
            _ => {
                return Err(Error::ConfigParse {
                    path: path.to_path_buf(),
                    line: line_no,
                    message: format!(
                        "expected '<name> <url> [<branch>]', found {} field{}",
                        fields.len(),
                        if fields.len() == 1 { "" } else { "s" }
                    ),
                });
            }
        };

        if let Some(first) = seen.insert(spec.name.clone(), line_no) {
            return Err(Error::DuplicateRemote {
                name: spec.name,
                first,
                second: line_no,
            });
        }

        specs.push(spec);
    }

    Ok(BranchList::new(specs))
}

/// Read and parse a configuration file
pub fn load(path: &Path) -> Result<BranchList> {
    let text = std::fs::read_to_string(path)?;
    let list = parse(&text, path)?;
    debug!(
        "Loaded {} branch entries from {}",
        list.len(),
        path.display()
    );
    Ok(list)
}

/// Load a configuration file and check that it names the baseline
pub fn load_with_baseline(path: &Path, baseline: &str) -> Result<BranchList> {
    let list = load(path)?;
    require_baseline(&list, baseline)?;
    Ok(list)
}

/// Fail with `BaselineMissing` unless the list contains the baseline
pub fn require_baseline<'a>(list: &'a BranchList, baseline: &str) -> Result<&'a BranchSpec> {
    list.baseline(baseline)
        .ok_or_else(|| Error::BaselineMissing(baseline.to_string()))
}
