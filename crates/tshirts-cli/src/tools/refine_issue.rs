use super::{
    fetch_issue, number_arg, open_store, opt_str_arg, repo_arg, repo_property, ToolContext,
    TshirtsTool,
};
use serde_json::Value;
use tshirts_core::conversation::{GroomSession, GroomState};

pub struct RefineIssueTool;

impl TshirtsTool for RefineIssueTool {
    fn name(&self) -> &str {
        "refine_issue"
    }

    fn description(&self) -> &str {
        "Review an issue for clarity and completeness. Returns suggestions plus either a refined description or a clarifying question"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "repo": repo_property(),
                "issue_number": {
                    "type": "integer",
                    "description": "Issue to refine"
                },
                "context": {
                    "type": "string",
                    "description": "Additional context or answers to previous clarifying questions"
                }
            },
            "required": ["repo", "issue_number"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, String> {
        let repo = repo_arg(&args)?;
        let number = number_arg(&args, "issue_number")?;
        let context = opt_str_arg(&args, "context").unwrap_or("");

        let store = open_store(ctx, &repo)?;
        let issue = fetch_issue(store.as_ref(), number, &repo)?;
        let title = issue.title.clone();

        let mut session = GroomSession::with_context(issue, context);
        let state = session.advance(ctx.model).map_err(|e| e.to_string())?;

        let mut result = serde_json::json!({
            "issue_number": number,
            "title": title,
            "ready": session_ready(state),
            "suggestions": state.suggestions(),
        });
        match state {
            GroomState::Ready {
                refined_description,
                ..
            } => result["refined_description"] = Value::from(refined_description.as_str()),
            GroomState::Gathering {
                question: Some(question),
                ..
            } => result["question"] = Value::from(question.as_str()),
            GroomState::Gathering { question: None, .. } => {}
        }
        Ok(result)
    }
}

fn session_ready(state: &GroomState) -> bool {
    matches!(state, GroomState::Ready { .. })
}
