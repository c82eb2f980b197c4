use std::fmt::Display;
use std::rc::Rc;

use serde_json::Value;
use tshirts_core::config::GitHubConfig;
use tshirts_core::github::GitHubClient;
use tshirts_core::model::Model;
use tshirts_core::repo::RepoRef;
use tshirts_core::store::IssueStore;
use tshirts_core::{Issue, Size};

pub mod apply_size_label;
pub mod breakdown_issue;
pub mod close_issue;
pub mod create_issue;
pub mod create_subtasks;
pub mod draft_issue;
pub mod estimate_issue;
pub mod find_similar_issues;
pub mod generate_closing_comment;
pub mod refine_issue;
pub mod update_issue_body;

// ---------------------------------------------------------------------------
// Tool context
// ---------------------------------------------------------------------------

/// Opens an issue store per repository named in a tool call.
pub trait StoreOpener {
    fn open(&self, repo: &RepoRef) -> tshirts_core::Result<Rc<dyn IssueStore>>;
    fn user_repos(&self) -> tshirts_core::Result<Vec<String>>;
}

/// Connects to GitHub afresh for every call.
pub struct GitHubOpener {
    config: GitHubConfig,
}

impl GitHubOpener {
    pub fn new(config: GitHubConfig) -> Self {
        Self { config }
    }
}

impl StoreOpener for GitHubOpener {
    fn open(&self, repo: &RepoRef) -> tshirts_core::Result<Rc<dyn IssueStore>> {
        let client: Rc<dyn IssueStore> =
            Rc::new(GitHubClient::connect(&self.config, repo.clone())?);
        Ok(client)
    }

    fn user_repos(&self) -> tshirts_core::Result<Vec<String>> {
        GitHubClient::list_user_repos(&self.config)
    }
}

pub struct ToolContext<'a> {
    pub model: &'a dyn Model,
    pub stores: &'a dyn StoreOpener,
}

pub trait TshirtsTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> Value;
    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, String>;
}

pub fn all_tools() -> Vec<Box<dyn TshirtsTool>> {
    vec![
        Box::new(estimate_issue::EstimateIssueTool),
        Box::new(breakdown_issue::BreakdownIssueTool),
        Box::new(draft_issue::DraftIssueTool),
        Box::new(refine_issue::RefineIssueTool),
        Box::new(find_similar_issues::FindSimilarIssuesTool),
        Box::new(generate_closing_comment::GenerateClosingCommentTool),
        Box::new(apply_size_label::ApplySizeLabelTool),
        Box::new(create_issue::CreateIssueTool),
        Box::new(create_subtasks::CreateSubtasksTool),
        Box::new(update_issue_body::UpdateIssueBodyTool),
        Box::new(close_issue::CloseIssueTool),
    ]
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

fn err(e: impl Display) -> String {
    e.to_string()
}

pub(crate) fn repo_property() -> Value {
    serde_json::json!({
        "type": "string",
        "description": "GitHub repository in owner/repo format"
    })
}

fn str_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str, String> {
    args[key]
        .as_str()
        .ok_or_else(|| format!("missing required argument: {key}"))
}

fn opt_str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args[key].as_str()
}

fn number_arg(args: &Value, key: &str) -> Result<u64, String> {
    match &args[key] {
        Value::Null => Err(format!("missing required argument: {key}")),
        v => v
            .as_u64()
            .ok_or_else(|| format!("{key} must be a positive integer")),
    }
}

fn repo_arg(args: &Value) -> Result<RepoRef, String> {
    str_arg(args, "repo")?.parse().map_err(err)
}

/// Strict size parsing; optional when `key` is absent.
fn size_arg(args: &Value, key: &str) -> Result<Option<Size>, String> {
    match &args[key] {
        Value::Null => Ok(None),
        Value::String(s) => s.parse().map(Some).map_err(err),
        other => Err(format!("invalid size: {other}. Must be XS, S, M, L, or XL")),
    }
}

fn open_store(ctx: &ToolContext, repo: &RepoRef) -> Result<Rc<dyn IssueStore>, String> {
    ctx.stores.open(repo).map_err(err)
}

fn fetch_issue(store: &dyn IssueStore, number: u64, repo: &RepoRef) -> Result<Issue, String> {
    store
        .get_issue(number)
        .map_err(err)?
        .ok_or_else(|| format!("Issue #{number} not found in {repo}"))
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------
