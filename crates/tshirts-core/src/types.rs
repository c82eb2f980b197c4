use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every size label, e.g. `size: M`.
pub const SIZE_LABEL_PREFIX: &str = "size: ";

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// T-shirt size: an ordinal effort category.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Size {
    Xs,
    S,
    #[default]
    M,
    L,
    Xl,
}

impl Size {
    pub fn all() -> &'static [Size] {
        &[Size::Xs, Size::S, Size::M, Size::L, Size::Xl]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Size::Xs => "XS",
            Size::S => "S",
            Size::M => "M",
            Size::L => "L",
            Size::Xl => "XL",
        }
    }

    /// The GitHub label carrying this size.
    pub fn label(self) -> String {
        format!("{SIZE_LABEL_PREFIX}{}", self.as_str())
    }

    /// Inverse of [`Size::label`]; exact match only.
    pub fn from_label(label: &str) -> Option<Size> {
        let rest = label.strip_prefix(SIZE_LABEL_PREFIX)?;
        Size::all().iter().copied().find(|s| s.as_str() == rest)
    }

    pub fn color(self) -> &'static str {
        match self {
            Size::Xs => "0e8a16",
            Size::S => "7bc96f",
            Size::M => "fef2c0",
            Size::L => "f9a03f",
            Size::Xl => "d93f0b",
        }
    }

    /// Sizes large enough to be worth a grooming pass.
    pub fn is_groomable(self) -> bool {
        self >= Size::S
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Size {
    type Err = crate::error::TshirtsError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "XS" => Ok(Size::Xs),
            "S" => Ok(Size::S),
            "M" => Ok(Size::M),
            "L" => Ok(Size::L),
            "XL" => Ok(Size::Xl),
            _ => Err(crate::error::TshirtsError::InvalidSize(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Issue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub state: IssueState,
}

impl Issue {
    pub fn new(number: u64, title: impl Into<String>, body: impl Into<String>) -> Self {
        Issue {
            number,
            title: title.into(),
            body: body.into(),
            labels: Vec::new(),
            state: IssueState::Open,
        }
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// The size carried by this issue's labels, if any.
    pub fn size(&self) -> Option<Size> {
        self.labels.iter().find_map(|l| Size::from_label(l))
    }

    /// Size for display in prompts and listings: `Unknown` when unlabeled.
    pub fn size_display(&self) -> &'static str {
        self.size().map(Size::as_str).unwrap_or("Unknown")
    }

    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }
}

// ---------------------------------------------------------------------------
// SubTask / DraftIssue
// ---------------------------------------------------------------------------

/// One piece of a broken-down issue. Becomes an issue only when created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    pub title: String,
    pub description: String,
    pub size: Size,
}

/// An issue proposal produced by the draft conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftIssue {
    pub title: String,
    pub description: String,
    pub size: Size,
    #[serde(default)]
    pub tasks: Vec<String>,
}

// ---------------------------------------------------------------------------
// SimilarIssue
// ---------------------------------------------------------------------------

/// How an existing issue relates to a draft. `distinct` is never
/// represented: such candidates are discarded during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Duplicate,
    Subtask,
    Related,
}

impl Relationship {
    pub fn as_str(self) -> &'static str {
        match self {
            Relationship::Duplicate => "duplicate",
            Relationship::Subtask => "subtask",
            Relationship::Related => "related",
        }
    }

    /// Parses the three kept relationships. `distinct` and anything else
    /// yield `None`.
    pub fn parse(s: &str) -> Option<Relationship> {
        match s.trim().to_ascii_lowercase().as_str() {
            "duplicate" => Some(Relationship::Duplicate),
            "subtask" => Some(Relationship::Subtask),
            "related" => Some(Relationship::Related),
            _ => None,
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarIssue {
    pub issue_number: u64,
    pub title: String,
    pub relationship: Relationship,
    pub reasoning: String,
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn speaker(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

/// Append-only history of one interactive exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A conversation seeded with a single user message.
    pub fn starting_with(message: impl Into<String>) -> Self {
        let mut conversation = Self::new();
        conversation.push_user(message);
        conversation
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(ConversationTurn {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(ConversationTurn {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// `User: ...` / `Assistant: ...` lines, one per turn.
    pub fn transcript(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{}: {}", t.role.speaker(), t.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_parse_is_case_insensitive() {
        for raw in ["xs", "s", "m", "l", "xl", "XS", "S", "M", "L", "XL", "Xl", " l "] {
            let size: Size = raw.parse().unwrap();
            assert_eq!(size.as_str(), raw.trim().to_ascii_uppercase());
        }
    }

    #[test]
    fn size_parse_rejects_unknown() {
        for raw in ["XXL", "", "medium", "size: M"] {
            assert!(raw.parse::<Size>().is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn size_labels_round_trip() {
        for size in Size::all() {
            assert_eq!(Size::from_label(&size.label()), Some(*size));
        }
        assert_eq!(Size::from_label("size: m"), None);
        assert_eq!(Size::from_label("bug"), None);
    }

    #[test]
    fn size_order_and_grooming() {
        assert!(Size::Xs < Size::S && Size::L < Size::Xl);
        assert!(!Size::Xs.is_groomable());
        assert!(Size::S.is_groomable() && Size::Xl.is_groomable());
    }

    #[test]
    fn size_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Size::Xl).unwrap(), "\"XL\"");
        let back: Size = serde_json::from_str("\"XS\"").unwrap();
        assert_eq!(back, Size::Xs);
    }

    #[test]
    fn issue_size_from_labels() {
        let issue = Issue::new(1, "t", "").with_labels(["bug", "size: L"]);
        assert_eq!(issue.size(), Some(Size::L));
        assert_eq!(issue.size_display(), "L");
        assert_eq!(Issue::new(2, "t", "").size_display(), "Unknown");
    }

    #[test]
    fn relationship_drops_distinct() {
        assert_eq!(Relationship::parse("Duplicate"), Some(Relationship::Duplicate));
        assert_eq!(Relationship::parse("distinct"), None);
        assert_eq!(Relationship::parse("sibling"), None);
    }

    #[test]
    fn conversation_transcript() {
        let mut c = Conversation::starting_with("Add dark mode");
        c.push_assistant("What framework?");
        c.push_user("React");
        assert_eq!(c.len(), 3);
        assert_eq!(
            c.transcript(),
            "User: Add dark mode\nAssistant: What framework?\nUser: React"
        );
    }
}
