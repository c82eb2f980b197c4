use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Context;
use tshirts_core::repo::{detect_from_git, RepoRef};
use tshirts_core::TshirtsError;

use crate::interact::Prompter;

/// Repositories offered by the interactive picker.
const PICK_LIMIT: usize = 50;

/// Resolve the target repository.
///
/// Priority:
/// 1. `--repo` flag / `TSHIRTS_REPO` env var (passed in as `explicit`)
/// 2. The `origin` remote of the git checkout at `cwd`
/// 3. A numbered pick from `candidates` (fetched lazily)
pub fn resolve_repo<R, W, F>(
    explicit: Option<&str>,
    cwd: &Path,
    candidates: F,
    io: &mut Prompter<R, W>,
) -> anyhow::Result<RepoRef>
where
    R: BufRead,
    W: Write,
    F: FnOnce() -> tshirts_core::Result<Vec<String>>,
{
    if let Some(raw) = explicit.filter(|r| !r.trim().is_empty()) {
        return Ok(raw.parse()?);
    }

    if let Some(repo) = detect_from_git(cwd) {
        tracing::info!(repo = %repo, "using repository from git remote");
        return Ok(repo);
    }

    let repos = candidates().context("failed to list your repositories")?;
    pick_repo(&repos, io)
}

fn pick_repo<R: BufRead, W: Write>(
    repos: &[String],
    io: &mut Prompter<R, W>,
) -> anyhow::Result<RepoRef> {
    let shown = &repos[..repos.len().min(PICK_LIMIT)];
    if shown.is_empty() {
        return Err(TshirtsError::MissingRepo.into());
    }

    io.say("Select a repository:")?;
    for (i, name) in shown.iter().enumerate() {
        io.say(format!("  {:>2}. {name}", i + 1))?;
    }

    loop {
        let Some(answer) = io.ask(&format!("Repository [1-{}]:", shown.len()))? else {
            return Err(TshirtsError::MissingRepo.into());
        };
        match answer.parse::<usize>() {
            Ok(n) if (1..=shown.len()).contains(&n) => return Ok(shown[n - 1].parse()?),
            _ => io.say("Invalid choice.")?,
        }
    }
}
