use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClaudeAgentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} CLI not found. Install it with: npm install -g @anthropic-ai/claude-code")]
    NotFound(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("Claude process timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("failed to serialize output schema: {0}")]
    Schema(#[from] serde_json::Error),
}

impl ClaudeAgentError {
    /// `true` when the claude executable could not be located at all.
    ///
    /// Every other variant means the tool ran (or was started) and failed.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClaudeAgentError::NotFound(_))
    }
}
