//! Read-only MCP resources rendered as plain text.

use serde_json::Value;
use thiserror::Error;
use tshirts_core::repo::RepoRef;
use tshirts_core::Issue;

use crate::tools::StoreOpener;

const SCHEME: &str = "github://";
const REPO_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("unknown resource: {0}")]
    UnknownUri(String),

    #[error(transparent)]
    Backend(#[from] tshirts_core::TshirtsError),
}

/// Resources addressed by `uri`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Resource {
    Repos,
    OpenIssues(RepoRef),
    Unestimated(RepoRef),
    Groomable(RepoRef),
    Issue(RepoRef, u64),
}

impl Resource {
    fn parse(uri: &str) -> Option<Resource> {
        let path = uri.strip_prefix(SCHEME)?;
        if path == "repos" {
            return Some(Resource::Repos);
        }
        let parts: Vec<&str> = path.split('/').collect();
        let (owner, name, rest) = match parts.as_slice() {
            [owner, name, "issues", rest @ ..] => (*owner, *name, rest),
            _ => return None,
        };
        let repo: RepoRef = format!("{owner}/{name}").parse().ok()?;
        match rest {
            [] => Some(Resource::OpenIssues(repo)),
            ["unestimated"] => Some(Resource::Unestimated(repo)),
            ["groomable"] => Some(Resource::Groomable(repo)),
            [number] => number.parse().ok().map(|n| Resource::Issue(repo, n)),
            _ => None,
        }
    }
}

pub fn list() -> Value {
    serde_json::json!({
        "resources": [{
            "uri": "github://repos",
            "name": "Your repositories",
            "description": "Repositories you have access to, most recently updated first",
            "mimeType": "text/plain"
        }]
    })
}

pub fn templates() -> Value {
    let template = |uri: &str, name: &str, description: &str| {
        serde_json::json!({
            "uriTemplate": uri,
            "name": name,
            "description": description,
            "mimeType": "text/plain"
        })
    };
    serde_json::json!({
        "resourceTemplates": [
            template("github://{owner}/{repo}/issues", "Open issues", "Open issues with their labels"),
            template("github://{owner}/{repo}/issues/unestimated", "Unestimated issues", "Open issues without a size label"),
            template("github://{owner}/{repo}/issues/groomable", "Groomable issues", "Sized open issues that may need refinement"),
            template("github://{owner}/{repo}/issues/{number}", "Issue", "A single issue with its labels and description"),
        ]
    })
}

pub fn read(uri: &str, stores: &dyn StoreOpener) -> Result<String, ResourceError> {
    let resource = Resource::parse(uri).ok_or_else(|| ResourceError::UnknownUri(uri.to_string()))?;
    tracing::debug!(uri, "reading resource");

    let text = match resource {
        Resource::Repos => {
            let repos = stores.user_repos()?;
            if repos.is_empty() {
                "No repositories found".to_string()
            } else {
                let lines: Vec<String> = repos
                    .iter()
                    .take(REPO_LIMIT)
                    .map(|r| format!("- {r}"))
                    .collect();
                format!("Your repositories:\n{}", lines.join("\n"))
            }
        }
        Resource::OpenIssues(repo) => {
            let issues = stores.open(&repo)?.list_open_issues()?;
            if issues.is_empty() {
                format!("No open issues in {repo}")
            } else {
                let lines: Vec<String> = issues
                    .iter()
                    .map(|i| format!("#{}: {} [{}]", i.number, i.title, label_list(i)))
                    .collect();
                format!("Open issues in {repo}:\n{}", lines.join("\n"))
            }
        }
        Resource::Unestimated(repo) => {
            let issues = stores.open(&repo)?.list_unsized_issues()?;
            if issues.is_empty() {
                format!("All issues in {repo} have size labels")
            } else {
                let lines: Vec<String> = issues
                    .iter()
                    .map(|i| format!("#{}: {}", i.number, i.title))
                    .collect();
                format!("Issues without size labels in {repo}:\n{}", lines.join("\n"))
            }
        }
        Resource::Groomable(repo) => {
            let issues = stores.open(&repo)?.list_groomable_issues()?;
            if issues.is_empty() {
                format!("No issues need grooming in {repo}")
            } else {
                let lines: Vec<String> = issues
                    .iter()
                    .map(|i| format!("#{} [{}]: {}", i.number, i.size_display(), i.title))
                    .collect();
                format!(
                    "Issues that may need refinement in {repo}:\n{}",
                    lines.join("\n")
                )
            }
        }
        Resource::Issue(repo, number) => match stores.open(&repo)?.get_issue(number)? {
            None => format!("Issue #{number} not found in {repo}"),
            Some(issue) => {
                let body = if issue.body.trim().is_empty() {
                    "(no description)"
                } else {
                    issue.body.as_str()
                };
                format!(
                    "Issue #{}: {}\nLabels: {}\n\n{body}",
                    issue.number,
                    issue.title,
                    label_list(&issue)
                )
            }
        },
    };
    Ok(text)
}

fn label_list(issue: &Issue) -> String {
    if issue.labels.is_empty() {
        "no labels".to_string()
    } else {
        issue.labels.join(", ")
    }
}
