//! Multi-turn refinement sessions.
//!
//! A session owns the conversation and alternates between asking the model
//! for a turn and collecting the user's answer. Once ready it stays ready
//! and no further model calls are made. There is no turn limit; callers
//! stop a session by dropping it.

use crate::ai::{self, DraftTurn, GroomTurn};
use crate::error::Result;
use crate::model::Model;
use crate::types::{Conversation, DraftIssue, Issue};

// ---------------------------------------------------------------------------
// DraftSession
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftState {
    /// Waiting on the user. `question` is `None` until the first turn.
    Gathering { question: Option<String> },
    Ready { issues: Vec<DraftIssue> },
}

/// Drafts one or more new issues from a free-form description.
#[derive(Debug, Clone)]
pub struct DraftSession {
    conversation: Conversation,
    state: DraftState,
}

impl DraftSession {
    pub fn new(first_message: impl Into<String>) -> Self {
        Self {
            conversation: Conversation::starting_with(first_message),
            state: DraftState::Gathering { question: None },
        }
    }

    pub fn state(&self) -> &DraftState {
        &self.state
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, DraftState::Ready { .. })
    }

    /// Run one model turn. A question is recorded as an assistant turn.
    pub fn advance(&mut self, model: &dyn Model) -> Result<&DraftState> {
        if self.is_ready() {
            return Ok(&self.state);
        }
        self.state = match ai::draft(model, &self.conversation)? {
            DraftTurn::Ready(issues) => {
                tracing::debug!(count = issues.len(), "draft ready");
                DraftState::Ready { issues }
            }
            DraftTurn::Question(question) => {
                self.conversation.push_assistant(question.clone());
                DraftState::Gathering {
                    question: Some(question),
                }
            }
        };
        Ok(&self.state)
    }

    /// Record the user's reply to the last question.
    pub fn answer(&mut self, text: impl Into<String>) {
        if self.is_ready() {
            tracing::debug!("ignoring answer to a ready draft");
            return;
        }
        self.conversation.push_user(text);
    }

    pub fn into_issues(self) -> Option<Vec<DraftIssue>> {
        match self.state {
            DraftState::Ready { issues } => Some(issues),
            DraftState::Gathering { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// GroomSession
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroomState {
    Gathering {
        question: Option<String>,
        suggestions: Vec<String>,
    },
    Ready {
        refined_description: String,
        suggestions: Vec<String>,
    },
}

impl GroomState {
    pub fn suggestions(&self) -> &[String] {
        match self {
            GroomState::Gathering { suggestions, .. } | GroomState::Ready { suggestions, .. } => {
                suggestions
            }
        }
    }
}

/// Refines the description of one existing issue.
#[derive(Debug, Clone)]
pub struct GroomSession {
    issue: Issue,
    conversation: Conversation,
    state: GroomState,
}

impl GroomSession {
    pub fn new(issue: Issue) -> Self {
        Self {
            issue,
            conversation: Conversation::new(),
            state: GroomState::Gathering {
                question: None,
                suggestions: Vec::new(),
            },
        }
    }

    /// A session whose conversation opens with caller-supplied context.
    pub fn with_context(issue: Issue, context: &str) -> Self {
        let mut session = Self::new(issue);
        if !context.trim().is_empty() {
            session.conversation.push_user(context);
        }
        session
    }

    pub fn issue(&self) -> &Issue {
        &self.issue
    }

    pub fn state(&self) -> &GroomState {
        &self.state
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, GroomState::Ready { .. })
    }

    pub fn advance(&mut self, model: &dyn Model) -> Result<&GroomState> {
        if self.is_ready() {
            return Ok(&self.state);
        }
        self.state = match ai::groom(model, &self.issue, &self.conversation)? {
            GroomTurn::Ready {
                refined_description,
                suggestions,
            } => GroomState::Ready {
                refined_description,
                suggestions,
            },
            GroomTurn::Question {
                question,
                suggestions,
            } => {
                self.conversation.push_assistant(question.clone());
                GroomState::Gathering {
                    question: Some(question),
                    suggestions,
                }
            }
        };
        Ok(&self.state)
    }

    pub fn answer(&mut self, text: impl Into<String>) {
        if self.is_ready() {
            tracing::debug!(number = self.issue.number, "ignoring answer to a ready grooming");
            return;
        }
        self.conversation.push_user(text);
    }
}
