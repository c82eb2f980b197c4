use std::path::PathBuf;
use std::time::Duration;

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const API_URL_ENV: &str = "GITHUB_API_URL";
pub const MODEL_ENV: &str = "TSHIRTS_MODEL";
pub const CLAUDE_BIN_ENV: &str = "TSHIRTS_CLAUDE_BIN";
pub const CLAUDE_TIMEOUT_ENV: &str = "TSHIRTS_CLAUDE_TIMEOUT";

// ---------------------------------------------------------------------------
// ModelConfig
// ---------------------------------------------------------------------------

/// How the external model is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub model: String,
    /// Explicit claude executable; `None` searches PATH.
    pub executable: Option<PathBuf>,
    pub timeout: Duration,
}

fn default_model() -> String {
    "sonnet".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(300)
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            executable: None,
            timeout: default_timeout(),
        }
    }
}

impl ModelConfig {
    /// Defaults overridden by `TSHIRTS_MODEL`, `TSHIRTS_CLAUDE_BIN` and
    /// `TSHIRTS_CLAUDE_TIMEOUT` (seconds). Unparseable timeouts are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(model) = non_empty(lookup(MODEL_ENV)) {
            config.model = model;
        }
        if let Some(bin) = non_empty(lookup(CLAUDE_BIN_ENV)) {
            config.executable = Some(PathBuf::from(bin));
        }
        match non_empty(lookup(CLAUDE_TIMEOUT_ENV)).map(|s| s.parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => config.timeout = Duration::from_secs(secs),
            Some(_) => tracing::warn!("ignoring invalid {CLAUDE_TIMEOUT_ENV}"),
            None => {}
        }
        config
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = non_empty(model) {
            self.model = model;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// GitHubConfig
// ---------------------------------------------------------------------------

/// Credentials and endpoint for the issue tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubConfig {
    pub api_base: String,
    pub token: Option<String>,
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token: None,
        }
    }
}

impl GitHubConfig {
    /// Reads `GITHUB_TOKEN` and `GITHUB_API_URL`. A missing token is only
    /// reported when a client is built.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_base: non_empty(lookup(API_URL_ENV))
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(default_api_base),
            token: non_empty(lookup(TOKEN_ENV)),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
