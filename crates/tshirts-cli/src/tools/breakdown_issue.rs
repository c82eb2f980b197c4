use super::{fetch_issue, number_arg, open_store, repo_arg, repo_property, ToolContext, TshirtsTool};
use serde_json::Value;
use tshirts_core::ai;

pub struct BreakdownIssueTool;

impl TshirtsTool for BreakdownIssueTool {
    fn name(&self) -> &str {
        "breakdown_issue"
    }

    fn description(&self) -> &str {
        "Break a large issue into 3-7 actionable subtasks, each with a title, description and size estimate"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "repo": repo_property(),
                "issue_number": {
                    "type": "integer",
                    "description": "Issue number to break down"
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
        let tasks = ai::breakdown(ctx.model, &issue).map_err(|e| e.to_string())?;

        serde_json::to_value(tasks).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{call, MemoryOpener};
    use serde_json::json;
    use tshirts_core::model::ScriptedModel;
    use tshirts_core::Issue;

    #[test]
    fn returns_normalized_tasks() {
        let stores = MemoryOpener::new(vec![Issue::new(4, "Billing", "Stripe")]);
        let model = ScriptedModel::structured([json!({
            "tasks": [
                { "title": "Customer model", "description": "db", "size": "s" },
                { "title": "Webhooks", "size": "giant" }
            ]
        })]);
        let result = call(
            &BreakdownIssueTool,
            json!({ "repo": "octo/widgets", "issue_number": 4 }),
            &model,
            &stores,
        )
        .unwrap();
        assert_eq!(
            result,
            json!([
                { "title": "Customer model", "description": "db", "size": "S" },
                { "title": "Webhooks", "description": "", "size": "M" }
            ])
        );
    }

    #[test]
    fn model_failure_returns_single_fallback_task() {
        let stores = MemoryOpener::new(vec![Issue::new(4, "Billing", "Stripe")]);
        let model = ScriptedModel::new([""]);
        let result = call(
            &BreakdownIssueTool,
            json!({ "repo": "octo/widgets", "issue_number": 4 }),
            &model,
            &stores,
        )
        .unwrap();
        assert_eq!(result, json!([{ "title": "Implement: Billing", "description": "Stripe", "size": "M" }]));
    }
}
