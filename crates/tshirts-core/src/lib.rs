//! Issue triage on top of GitHub and the `claude` CLI: t-shirt sizing,
//! breakdown into sub-issues, conversational drafting and grooming,
//! duplicate detection and closing comments.

pub mod ai;
pub mod config;
pub mod conversation;
pub mod error;
pub mod github;
pub mod model;
pub mod normalize;
pub mod prompt;
pub mod repo;
pub mod schema;
pub mod store;
pub mod types;
pub mod workflow;

pub use error::{Result, TshirtsError};
pub use types::{
    Conversation, ConversationTurn, DraftIssue, Issue, IssueState, Relationship, Role,
    SimilarIssue, Size, SubTask,
};
