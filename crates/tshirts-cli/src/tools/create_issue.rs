use super::{open_store, repo_arg, repo_property, size_arg, str_arg, ToolContext, TshirtsTool};
use serde_json::Value;

pub struct CreateIssueTool;

impl TshirtsTool for CreateIssueTool {
    fn name(&self) -> &str {
        "create_issue"
    }

    fn description(&self) -> &str {
        "Create a GitHub issue, optionally with a size label and extra labels"
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "repo": repo_property(),
                "title": {
                    "type": "string",
                    "description": "Issue title"
                },
                "body": {
                    "type": "string",
                    "description": "Issue description"
                },
                "size": {
                    "type": "string",
                    "enum": ["XS", "S", "M", "L", "XL"],
                    "description": "Optional t-shirt size; adds the matching label"
                },
                "labels": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Optional additional labels"
                }
            },
            "required": ["repo", "title", "body"]
        })
    }

    fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, String> {
        let repo = repo_arg(&args)?;
        let title = str_arg(&args, "title")?;
        let body = str_arg(&args, "body")?;
        let size = size_arg(&args, "size")?;

        let mut labels: Vec<String> = match &args["labels"] {
            Value::Null => Vec::new(),
            Value::Array(items) => items
                .iter()
                .map(|l| {
                    l.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| "labels must be strings".to_string())
                })
                .collect::<Result<_, _>>()?,
            _ => return Err("labels must be an array of strings".to_string()),
        };
        if let Some(size) = size {
            labels.push(size.label());
        }

        let store = open_store(ctx, &repo)?;
        let issue = store
            .create_issue(title, body, &labels)
            .map_err(|e| e.to_string())?;

        Ok(serde_json::json!({
            "issue_number": issue.number,
            "title": title,
            "url": repo.issue_url(issue.number),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{call, MemoryOpener};
    use serde_json::json;
    use tshirts_core::model::ScriptedModel;
    use tshirts_core::Size;

    #[test]
    fn creates_with_size_and_labels() {
        let stores = MemoryOpener::new(vec![]);
        let model = ScriptedModel::default();
        let result = call(
            &CreateIssueTool,
            json!({
                "repo": "octo/widgets",
                "title": "Add export",
                "body": "CSV",
                "size": "s",
                "labels": ["enhancement"]
            }),
            &model,
            &stores,
        )
        .unwrap();
        assert_eq!(
            result,
            json!({
                "issue_number": 1,
                "title": "Add export",
                "url": "https://github.com/octo/widgets/issues/1"
            })
        );
        let created = stores.store.issue(1).unwrap();
        assert_eq!(created.labels, vec!["enhancement", "size: S"]);
        assert_eq!(created.size(), Some(Size::S));
    }

    #[test]
    fn invalid_size_creates_nothing() {
        let stores = MemoryOpener::new(vec![]);
        let model = ScriptedModel::default();
        let err = call(
            &CreateIssueTool,
            json!({ "repo": "octo/widgets", "title": "t", "body": "b", "size": "huge" }),
            &model,
            &stores,
        )
        .unwrap_err();
        assert!(err.starts_with("invalid size: huge"));
        assert_eq!(stores.opened.get(), 0);
        assert!(stores.store.issues().is_empty());
    }
}
