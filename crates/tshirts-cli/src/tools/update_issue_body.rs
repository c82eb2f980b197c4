use super::{
    fetch_issue, number_arg, open_store, repo_arg, repo_property, str_arg, ToolContext,
    TshirtsTool,
};
use serde_json::Value;

pub struct UpdateIssueBodyTool;

impl TshirtsTool for UpdateIssueBodyTool {
    fn name(&self) -> &str {
        "update_issue_body"
    }

    fn description(&self) -> &str {
        "Replace the body of a GitHub issue"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "repo": repo_property(),
                "issue_number": {
                    "type": "integer",
                    "description": "Issue to update"
                },
                "body": {
                    "type": "string",
                    "description": "New issue body"
                }
            },
            "required": ["repo", "issue_number", "body"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, String> {
        let repo = repo_arg(&args)?;
        let number = number_arg(&args, "issue_number")?;
        let body = str_arg(&args, "body")?;

        let store = open_store(ctx, &repo)?;
        fetch_issue(store.as_ref(), number, &repo)?;
        store.update_body(number, body).map_err(|e| e.to_string())?;

        Ok(serde_json::json!({
            "issue_number": number,
            "status": "updated",
        }))
    }
}
