use super::{str_arg, ToolContext, TshirtsTool};
use serde_json::Value;
use tshirts_core::ai::{self, DraftTurn};
use tshirts_core::Conversation;

pub struct DraftIssueTool;

impl TshirtsTool for DraftIssueTool {
    fn name(&self) -> &str {
        "draft_issue"
    }

    fn description(&self) -> &str {
        "Turn a natural language description into one or more issue drafts with titles, descriptions, sizes and task lists. Returns a clarifying question when more detail is needed"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "description": {
                    "type": "string",
                    "description": "What to build or fix"
                }
            },
            "required": ["description"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, String> {
        let description = str_arg(&args, "description")?;
        let conversation = Conversation::starting_with(description);

        match ai::draft(ctx.model, &conversation).map_err(|e| e.to_string())? {
            DraftTurn::Ready(drafts) => serde_json::to_value(drafts).map_err(|e| e.to_string()),
            DraftTurn::Question(question) => Ok(serde_json::json!([{
                "needs_clarification": true,
                "question": question,
            }])),
        }
    }
}
