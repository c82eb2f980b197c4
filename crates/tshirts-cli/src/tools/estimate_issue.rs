use super::{fetch_issue, number_arg, open_store, repo_arg, repo_property, ToolContext, TshirtsTool};
use serde_json::Value;
use tshirts_core::ai;

pub struct EstimateIssueTool;

impl TshirtsTool for EstimateIssueTool {
    fn name(&self) -> &str {
        "estimate_issue"
    }

    fn description(&self) -> &str {
        "Estimate the t-shirt size (XS, S, M, L, XL) of a GitHub issue from its scope, complexity and unknowns"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "repo": repo_property(),
                "issue_number": {
                    "type": "integer",
                    "description": "Issue number to estimate"
                }
            },
            "required": ["repo", "issue_number"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, String> {
        let repo = repo_arg(&args)?;
        let number = number_arg(&args, "issue_number")?;

        let store = open_store(ctx, &repo)?;
        let issue = fetch_issue(store.as_ref(), number, &repo)?;
        let size = ai::estimate_size(ctx.model, &issue).map_err(|e| e.to_string())?;

        Ok(serde_json::json!({
            "size": size,
            "issue_number": number,
            "title": issue.title,
        }))
    }
}
