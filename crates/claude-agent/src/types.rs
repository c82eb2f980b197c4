use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

// ─── QueryOptions ─────────────────────────────────────────────────────────

/// Options for a single `claude --print` invocation.
///
/// Only the flags this workspace needs are modelled. The prompt itself is
/// never an option: it always travels over stdin.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Claude model name or alias (e.g. `"sonnet"`)
    pub model: Option<String>,
    /// JSON Schema the response must conform to. When set, the CLI is asked
    /// for `--output-format json` and the structured result lands in the
    /// `structured_output` field of the envelope.
    pub json_schema: Option<serde_json::Value>,
    /// Custom path to the `claude` binary (default: `claude`, then `claude.cmd`)
    pub path_to_executable: Option<PathBuf>,
    /// Kill the subprocess if it has not exited after this long
    pub timeout: Option<Duration>,
    /// Working directory for the subprocess (default: current dir)
    pub cwd: Option<PathBuf>,
    /// Additional environment variables for the subprocess
    pub env: HashMap<String, String>,
}

impl QueryOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.json_schema = Some(schema);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
