use super::{
    fetch_issue, number_arg, open_store, repo_arg, repo_property, size_arg, ToolContext,
    TshirtsTool,
};
use serde_json::Value;

pub struct ApplySizeLabelTool;

impl TshirtsTool for ApplySizeLabelTool {
    fn name(&self) -> &str {
        "apply_size_label"
    }

    fn description(&self) -> &str {
        "Apply a t-shirt size label (XS, S, M, L, XL) to an issue, replacing any existing size label"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "repo": repo_property(),
                "issue_number": {
                    "type": "integer",
                    "description": "Issue number to label"
                },
                "size": {
                    "type": "string",
                    "enum": ["XS", "S", "M", "L", "XL"],
                    "description": "Size label to apply"
                }
            },
            "required": ["repo", "issue_number", "size"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, String> {
        let repo = repo_arg(&args)?;
        let number = number_arg(&args, "issue_number")?;
        let size = size_arg(&args, "size")?
            .ok_or_else(|| "missing required argument: size".to_string())?;

        let store = open_store(ctx, &repo)?;
        fetch_issue(store.as_ref(), number, &repo)?;
        store
            .apply_size_label(number, size)
            .map_err(|e| e.to_string())?;

        Ok(serde_json::json!({
            "issue_number": number,
            "label": size.label(),
            "status": "applied",
        }))
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
    fn replaces_existing_size_label() {
        let stores = MemoryOpener::new(vec![Issue::new(1, "t", "").with_labels(["size: XL", "bug"])]);
        let model = ScriptedModel::default();
        let result = call(
            &ApplySizeLabelTool,
            json!({ "repo": "octo/widgets", "issue_number": 1, "size": "m" }),
            &model,
            &stores,
        )
        .unwrap();
        assert_eq!(result, json!({ "issue_number": 1, "label": "size: M", "status": "applied" }));
        assert_eq!(stores.store.issue(1).unwrap().labels, vec!["bug", "size: M"]);
    }

    #[test]
    fn invalid_size_is_rejected_before_any_lookup() {
        let stores = MemoryOpener::new(vec![Issue::new(1, "t", "")]);
        let model = ScriptedModel::default();
        let err = call(
            &ApplySizeLabelTool,
            json!({ "repo": "octo/widgets", "issue_number": 1, "size": "XXL" }),
            &model,
            &stores,
        )
        .unwrap_err();
        assert_eq!(err, "invalid size: XXL. Must be XS, S, M, L, or XL");
        assert_eq!(stores.opened.get(), 0);
    }
}
