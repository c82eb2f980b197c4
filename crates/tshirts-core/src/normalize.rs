//! Total conversion of raw model output into typed results.
//!
//! Every function here accepts arbitrary text and never fails. Parse
//! errors, wrong types, and empty output from a failed process all land on
//! the same per-operation default. Field extraction goes through one
//! coercer per field type so that policy is applied uniformly.

use serde_json::{Map, Value};

use crate::types::{DraftIssue, Issue, Relationship, SimilarIssue, Size, SubTask};

pub const DEFAULT_DRAFT_QUESTION: &str = "Can you describe what you want to build?";
pub const DEFAULT_GROOM_QUESTION: &str = "What else should this issue cover?";
pub const DEFAULT_CLOSING_COMMENT: &str = "Issue closed.";
pub const UNTITLED: &str = "Untitled";

type Object = Map<String, Value>;

// ---------------------------------------------------------------------------
// Turn results
// ---------------------------------------------------------------------------

/// One step of the drafting conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftTurn {
    /// More information needed; ask the user this.
    Question(String),
    /// At least one issue is ready to create.
    Ready(Vec<DraftIssue>),
}

impl DraftTurn {
    pub fn is_ready(&self) -> bool {
        matches!(self, DraftTurn::Ready(_))
    }

    pub fn question(&self) -> Option<&str> {
        match self {
            DraftTurn::Question(q) => Some(q),
            DraftTurn::Ready(_) => None,
        }
    }

    pub fn issues(&self) -> Option<&[DraftIssue]> {
        match self {
            DraftTurn::Ready(issues) => Some(issues),
            DraftTurn::Question(_) => None,
        }
    }
}

/// One step of the grooming conversation. Suggestions accompany both
/// outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroomTurn {
    Question {
        question: String,
        suggestions: Vec<String>,
    },
    Ready {
        refined_description: String,
        suggestions: Vec<String>,
    },
}

impl GroomTurn {
    pub fn is_ready(&self) -> bool {
        matches!(self, GroomTurn::Ready { .. })
    }

    pub fn question(&self) -> Option<&str> {
        match self {
            GroomTurn::Question { question, .. } => Some(question),
            GroomTurn::Ready { .. } => None,
        }
    }

    pub fn refined_description(&self) -> Option<&str> {
        match self {
            GroomTurn::Ready {
                refined_description,
                ..
            } => Some(refined_description),
            GroomTurn::Question { .. } => None,
        }
    }

    pub fn suggestions(&self) -> &[String] {
        match self {
            GroomTurn::Question { suggestions, .. } | GroomTurn::Ready { suggestions, .. } => {
                suggestions
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Payload and field coercers
// ---------------------------------------------------------------------------

/// The answer object inside raw model output.
///
/// The CLI wraps schema-constrained answers in an envelope whose
/// `structured_output` field holds the object; bare objects are accepted as
/// well. Anything that is not a JSON object (after unwrapping) is `None`.
pub fn payload(raw: &str) -> Option<Object> {
    let Ok(Value::Object(mut top)) = serde_json::from_str::<Value>(raw.trim()) else {
        return None;
    };
    match top.remove("structured_output") {
        Some(Value::Object(inner)) => Some(inner),
        Some(_) => None,
        None => Some(top),
    }
}

/// A size from a JSON string in any case; anything else is `M`.
pub fn size_or_default(value: Option<&Value>) -> Size {
    value
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

/// The string itself, or `default` for any non-string.
pub fn text_or(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// Like [`text_or`] but blank strings also fall back.
fn non_blank_or(value: Option<&Value>, default: &str) -> String {
    match value.and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => default.to_string(),
    }
}

fn non_blank(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// The string elements of an array. Non-string elements are dropped and a
/// non-array is empty.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// The `ready` flag. JSON booleans are authoritative; the strings `"true"`
/// and `"false"` are accepted in any case. Anything else is `false`.
pub fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn field<'a>(item: &'a Value, key: &str) -> Option<&'a Value> {
    item.as_object().and_then(|obj| obj.get(key))
}

fn sub_task(item: &Value) -> SubTask {
    SubTask {
        title: text_or(field(item, "title"), UNTITLED),
        description: text_or(field(item, "description"), ""),
        size: size_or_default(field(item, "size")),
    }
}

fn draft_issue(item: &Value) -> DraftIssue {
    DraftIssue {
        title: text_or(field(item, "title"), UNTITLED),
        description: text_or(field(item, "description"), ""),
        size: size_or_default(field(item, "size")),
        tasks: string_list(field(item, "tasks")),
    }
}

// ---------------------------------------------------------------------------
// Per-operation results
// ---------------------------------------------------------------------------

pub fn size(raw: &str) -> Size {
    payload(raw)
        .map(|obj| size_or_default(obj.get("size")))
        .unwrap_or_default()
}

/// The single task that stands in for a failed breakdown.
pub fn fallback_breakdown(issue: &Issue) -> Vec<SubTask> {
    vec![SubTask {
        title: format!("Implement: {}", issue.title),
        description: issue.body.clone(),
        size: Size::M,
    }]
}

/// Sub-tasks for `issue`. An empty `tasks` array is a valid answer.
pub fn breakdown(raw: &str, issue: &Issue) -> Vec<SubTask> {
    let tasks = payload(raw).and_then(|mut obj| match obj.remove("tasks") {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    });
    match tasks {
        Some(items) => items.iter().map(sub_task).collect(),
        None => fallback_breakdown(issue),
    }
}

pub fn draft_turn(raw: &str) -> DraftTurn {
    let Some(obj) = payload(raw) else {
        return DraftTurn::Question(DEFAULT_DRAFT_QUESTION.to_string());
    };
    if flag(obj.get("ready")) {
        let issues: Vec<DraftIssue> = obj
            .get("issues")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(draft_issue).collect())
            .unwrap_or_default();
        if !issues.is_empty() {
            return DraftTurn::Ready(issues);
        }
    }
    DraftTurn::Question(non_blank_or(obj.get("question"), DEFAULT_DRAFT_QUESTION))
}

pub fn groom_turn(raw: &str) -> GroomTurn {
    let Some(obj) = payload(raw) else {
        return GroomTurn::Question {
            question: DEFAULT_GROOM_QUESTION.to_string(),
            suggestions: Vec::new(),
        };
    };
    let suggestions = string_list(obj.get("suggestions"));
    if flag(obj.get("ready")) {
        if let Some(refined_description) = non_blank(obj.get("refined_description")) {
            return GroomTurn::Ready {
                refined_description,
                suggestions,
            };
        }
    }
    GroomTurn::Question {
        question: non_blank_or(obj.get("question"), DEFAULT_GROOM_QUESTION),
        suggestions,
    }
}

/// Candidates that name a known issue with a kept relationship. Titles come
/// from `existing`, never from the model.
pub fn similar_issues(raw: &str, existing: &[Issue]) -> Vec<SimilarIssue> {
    let Some(items) = payload(raw).and_then(|mut obj| match obj.remove("similar_issues") {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let number = field(item, "issue_number").and_then(Value::as_u64)?;
            let relationship = field(item, "relationship")
                .and_then(Value::as_str)
                .and_then(Relationship::parse)?;
            let known = existing.iter().find(|i| i.number == number)?;
            Some(SimilarIssue {
                issue_number: number,
                title: known.title.clone(),
                relationship,
                reasoning: text_or(field(item, "reasoning"), ""),
            })
        })
        .collect()
}

pub fn closing_comment(raw: &str) -> String {
    payload(raw)
        .map(|obj| non_blank_or(obj.get("comment"), DEFAULT_CLOSING_COMMENT))
        .unwrap_or_else(|| DEFAULT_CLOSING_COMMENT.to_string())
}
