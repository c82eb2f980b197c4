use super::{
    fetch_issue, number_arg, open_store, opt_str_arg, repo_arg, repo_property, ToolContext,
    TshirtsTool,
};
use serde_json::Value;

pub struct CloseIssueTool;

impl TshirtsTool for CloseIssueTool {
    fn name(&self) -> &str {
        "close_issue"
    }

    fn description(&self) -> &str {
        "Close a GitHub issue, posting an optional closing comment first"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "repo": repo_property(),
                "issue_number": {
                    "type": "integer",
                    "description": "Issue to close"
                },
                "comment": {
                    "type": "string",
                    "description": "Optional closing comment"
                }
            },
            "required": ["repo", "issue_number"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, String> {
        let repo = repo_arg(&args)?;
        let number = number_arg(&args, "issue_number")?;
        let comment = opt_str_arg(&args, "comment");

        let store = open_store(ctx, &repo)?;
        fetch_issue(store.as_ref(), number, &repo)?;
        store
            .close_issue(number, comment)
            .map_err(|e| e.to_string())?;

        Ok(serde_json::json!({
            "issue_number": number,
            "status": "closed",
            "comment_added": comment.is_some(),
        }))
    }
}
