use super::{
    fetch_issue, number_arg, open_store, opt_str_arg, repo_arg, repo_property, ToolContext,
    TshirtsTool,
};
use serde_json::Value;
use tshirts_core::{ai, workflow};

pub struct GenerateClosingCommentTool;

impl TshirtsTool for GenerateClosingCommentTool {
    fn name(&self) -> &str {
        "generate_closing_comment"
    }

    fn description(&self) -> &str {
        "Suggest a closing comment for an issue from its content and completed sub-issues"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "repo": repo_property(),
                "issue_number": {
                    "type": "integer",
                    "description": "Issue to write the comment for"
                },
                "reason": {
                    "type": "string",
                    "description": "Why the issue is being closed (useful when it has no sub-issues)"
                }
            },
            "required": ["repo", "issue_number"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, String> {
        let repo = repo_arg(&args)?;
        let number = number_arg(&args, "issue_number")?;
        let reason = opt_str_arg(&args, "reason");

        let store = open_store(ctx, &repo)?;
        let issue = fetch_issue(store.as_ref(), number, &repo)?;
        let check = workflow::close_readiness(store.as_ref(), number).map_err(|e| e.to_string())?;
        let comment = ai::closing_comment(ctx.model, &issue, check.completed(), reason)
            .map_err(|e| e.to_string())?;

        Ok(serde_json::json!({
            "issue_number": number,
            "comment": comment,
            "open_subtasks": check.open().len(),
            "closed_subtasks": check.completed().len(),
        }))
    }
}
