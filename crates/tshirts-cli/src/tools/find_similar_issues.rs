use super::{open_store, repo_arg, repo_property, str_arg, ToolContext, TshirtsTool};
use serde_json::Value;
use tshirts_core::{ai, DraftIssue, Size};

pub struct FindSimilarIssuesTool;

impl TshirtsTool for FindSimilarIssuesTool {
    fn name(&self) -> &str {
        "find_similar_issues"
    }

    fn description(&self) -> &str {
        "Find open issues that duplicate, contain or relate to a proposed new issue before creating it"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "repo": repo_property(),
                "title": {
                    "type": "string",
                    "description": "Proposed issue title"
                },
                "description": {
                    "type": "string",
                    "description": "Proposed issue description"
                }
            },
            "required": ["repo", "title", "description"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, String> {
        let repo = repo_arg(&args)?;
        let draft = DraftIssue {
            title: str_arg(&args, "title")?.to_string(),
            description: str_arg(&args, "description")?.to_string(),
            size: Size::M,
            tasks: Vec::new(),
        };

        let store = open_store(ctx, &repo)?;
        let existing = store.list_open_issues().map_err(|e| e.to_string())?;
        let similar = ai::find_similar(ctx.model, &draft, &existing).map_err(|e| e.to_string())?;

        serde_json::to_value(similar).map_err(|e| e.to_string())
    }
}
