//! JSON Schemas handed to the model with `--json-schema`, one per
//! operation. The model is asked to conform but nothing downstream relies
//! on it doing so.

use serde_json::{json, Value};

use crate::types::Size;

fn size_enum() -> Value {
    json!({
        "type": "string",
        "enum": Size::all().iter().map(|s| s.as_str()).collect::<Vec<_>>(),
    })
}

pub fn size() -> Value {
    json!({
        "type": "object",
        "properties": { "size": size_enum() },
        "required": ["size"],
    })
}

pub fn breakdown() -> Value {
    json!({
        "type": "object",
        "properties": {
            "tasks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "size": size_enum(),
                    },
                    "required": ["title", "description", "size"],
                },
            },
        },
        "required": ["tasks"],
    })
}

pub fn draft_conversation() -> Value {
    json!({
        "type": "object",
        "properties": {
            "ready": { "type": "boolean" },
            "question": { "type": "string" },
            "issues": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "size": size_enum(),
                        "tasks": { "type": "array", "items": { "type": "string" } },
                    },
                },
            },
        },
        "required": ["ready"],
    })
}

pub fn grooming() -> Value {
    json!({
        "type": "object",
        "properties": {
            "ready": { "type": "boolean" },
            "question": { "type": "string" },
            "refined_description": { "type": "string" },
            "suggestions": { "type": "array", "items": { "type": "string" } },
        },
        "required": ["ready"],
    })
}

pub fn similarity() -> Value {
    json!({
        "type": "object",
        "properties": {
            "similar_issues": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "issue_number": { "type": "integer" },
                        "relationship": {
                            "type": "string",
                            "enum": ["duplicate", "subtask", "related", "distinct"],
                        },
                        "reasoning": { "type": "string" },
                    },
                    "required": ["issue_number", "relationship", "reasoning"],
                },
            },
        },
        "required": ["similar_issues"],
    })
}

pub fn closing_comment() -> Value {
    json!({
        "type": "object",
        "properties": { "comment": { "type": "string" } },
        "required": ["comment"],
    })
}
