use std::fmt;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TshirtsError;

/// An `owner/name` GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn issue_url(&self, number: u64) -> String {
        format!("https://github.com/{}/{}/issues/{number}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

fn valid_part(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl FromStr for RepoRef {
    type Err = TshirtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.split_once('/') {
            Some((owner, name)) if valid_part(owner) && valid_part(name) => {
                Ok(RepoRef::new(owner, name))
            }
            _ => Err(TshirtsError::InvalidRepo(s.to_string())),
        }
    }
}

const REMOTE_PREFIXES: &[&str] = &[
    "https://github.com/",
    "http://github.com/",
    "ssh://git@github.com/",
    "git@github.com:",
];

/// Extract `owner/name` from a github.com remote URL.
///
/// Accepts `https://`, `http://` and `ssh://git@` URLs as well as the scp-like
/// `git@github.com:owner/name` form, each with an optional `.git` suffix.
/// Any other host yields `None`.
pub fn parse_remote_url(url: &str) -> Option<RepoRef> {
    let url = url.trim();
    let path = REMOTE_PREFIXES
        .iter()
        .find_map(|prefix| url.strip_prefix(prefix))?;
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    path.parse().ok()
}

/// The repository behind `origin` in the git checkout at `dir`.
///
/// Missing git, a non-repository directory or a non-GitHub remote all
/// resolve to `None`.
pub fn detect_from_git(dir: &Path) -> Option<RepoRef> {
    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .current_dir(dir)
        .output()
        .ok()?;
    if !output.status.success() {
        tracing::debug!(dir = %dir.display(), "no origin remote");
        return None;
    }
    let url = String::from_utf8_lossy(&output.stdout);
    let repo = parse_remote_url(&url);
    if repo.is_none() {
        tracing::debug!(url = %url.trim(), "origin is not a github.com remote");
    }
    repo
}
