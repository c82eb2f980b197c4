use super::{err, number_arg, open_store, repo_arg, repo_property, ToolContext, TshirtsTool};
use serde_json::Value;
use tshirts_core::normalize::{text_or, UNTITLED};
use tshirts_core::{workflow, Size, SubTask};

pub struct CreateSubtasksTool;

impl TshirtsTool for CreateSubtasksTool {
    fn name(&self) -> &str {
        "create_subtasks"
    }

    fn description(&self) -> &str {
        "Create subtask issues linked to a parent issue and list them in a comment on the parent"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "repo": repo_property(),
                "parent_issue": {
                    "type": "integer",
                    "description": "Parent issue number"
                },
                "subtasks": {
                    "type": "array",
                    "description": "Subtasks to create",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "size": { "type": "string", "enum": ["XS", "S", "M", "L", "XL"] }
                        },
                        "required": ["title"]
                    }
                }
            },
            "required": ["repo", "parent_issue", "subtasks"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, String> {
        let repo = repo_arg(&args)?;
        let parent = number_arg(&args, "parent_issue")?;
        let tasks = subtasks_arg(&args["subtasks"])?;

        let store = open_store(ctx, &repo)?;
        store
            .get_issue(parent)
            .map_err(err)?
            .ok_or_else(|| format!("Parent issue #{parent} not found in {repo}"))?;
        let created =
            workflow::create_subtasks(store.as_ref(), parent, &tasks).map_err(|e| e.to_string())?;

        Ok(serde_json::json!({
            "parent_issue": parent,
            "subtasks_created": created.len(),
            "subtasks": created,
        }))
    }
}

/// Every size is validated before anything is created.
fn subtasks_arg(value: &Value) -> Result<Vec<SubTask>, String> {
    let items = value
        .as_array()
        .ok_or_else(|| "missing required argument: subtasks".to_string())?;
    items
        .iter()
        .map(|item| {
            let size = match item.get("size") {
                None | Some(Value::Null) => Size::M,
                Some(Value::String(s)) => s.parse::<Size>().map_err(|e| e.to_string())?,
                Some(other) => {
                    return Err(format!("invalid size: {other}. Must be XS, S, M, L, or XL"))
                }
            };
            Ok(SubTask {
                title: text_or(item.get("title"), UNTITLED),
                description: text_or(item.get("description"), ""),
                size,
            })
        })
        .collect()
}
