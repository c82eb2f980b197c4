use std::cell::RefCell;
use std::collections::VecDeque;

use claude_agent::{ClaudeAgentError, QueryOptions, RunConfig};
use serde_json::Value;

use crate::config::ModelConfig;
use crate::error::{Result, TshirtsError};

/// A text-in, text-out language model.
///
/// `complete` returns the raw response. Only a missing model is an error;
/// every other failure must come back as an empty string so the normalizer
/// can substitute its defaults.
pub trait Model {
    fn complete(&self, prompt: &str, schema: Option<&Value>) -> Result<String>;
}

// ---------------------------------------------------------------------------
// ClaudeModel
// ---------------------------------------------------------------------------

/// [`Model`] backed by the `claude` CLI.
#[derive(Debug, Clone, Default)]
pub struct ClaudeModel {
    config: ModelConfig,
}

impl ClaudeModel {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn options(&self, schema: Option<&Value>) -> QueryOptions {
        let mut opts = QueryOptions::default()
            .with_model(self.config.model.clone())
            .with_timeout(self.config.timeout);
        opts.path_to_executable = self.config.executable.clone();
        if let Some(schema) = schema {
            opts = opts.with_schema(schema.clone());
        }
        opts
    }
}

impl Model for ClaudeModel {
    fn complete(&self, prompt: &str, schema: Option<&Value>) -> Result<String> {
        let config = RunConfig {
            prompt: prompt.to_string(),
            opts: self.options(schema),
        };
        match claude_agent::run_blocking(config) {
            Ok(result) => {
                if result.output.is_empty() {
                    tracing::warn!("claude returned no output");
                }
                Ok(result.output)
            }
            Err(e @ ClaudeAgentError::NotFound(_)) => Err(TshirtsError::ModelNotFound(e.to_string())),
            Err(e) => {
                tracing::warn!(error = %e, "claude invocation failed; using defaults");
                Ok(String::new())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedModel
// ---------------------------------------------------------------------------

/// A [`Model`] that replays canned responses in order and records the
/// prompts it was given. Once the script runs out it answers with an empty
/// string. For tests.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    responses: RefCell<VecDeque<String>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedModel {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: RefCell::new(responses.into_iter().map(Into::into).collect()),
            prompts: RefCell::default(),
        }
    }

    /// Wraps each value in the `structured_output` envelope the CLI emits.
    pub fn structured<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self::new(values.into_iter().map(|v| {
            serde_json::json!({ "type": "result", "structured_output": v }).to_string()
        }))
    }

    pub fn calls(&self) -> usize {
        self.prompts.borrow().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Model for ScriptedModel {
    fn complete(&self, prompt: &str, _schema: Option<&Value>) -> Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok(self.responses.borrow_mut().pop_front().unwrap_or_default())
    }
}

/// A [`Model`] whose executable cannot be found.
#[derive(Debug, Default)]
pub struct MissingModel;

impl Model for MissingModel {
    fn complete(&self, _prompt: &str, _schema: Option<&Value>) -> Result<String> {
        Err(TshirtsError::ModelNotFound(
            ClaudeAgentError::NotFound("claude".into()).to_string(),
        ))
    }
}
