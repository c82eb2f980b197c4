//! `claude-agent`: Rust driver for one-shot Claude CLI invocations.
//!
//! Runs `claude -p [--model M] [--output-format json --json-schema S]` as a
//! subprocess, feeds the prompt over stdin and hands back raw stdout.
//! Interpreting that output is the caller's job.
//!
//! ```text
//! RunConfig { prompt, QueryOptions }
//!     │
//!     ▼
//! ClaudeProcess   ← spawns `claude -p …`, writes prompt to stdin, closes it
//!     │              collects stdout/stderr, enforces the timeout
//!     ▼
//! RunResult       ← trimmed stdout
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use claude_agent::{run_blocking, QueryOptions, RunConfig};
//!
//! let result = run_blocking(RunConfig {
//!     prompt: "Say hello.".into(),
//!     opts: QueryOptions::default().with_model("sonnet"),
//! })?;
//! println!("{}", result.output);
//! ```

pub mod error;
pub mod runner;
pub mod types;

pub(crate) mod process;

pub use error::ClaudeAgentError;
pub use runner::{run, run_blocking, RunConfig, RunResult};
pub use types::QueryOptions;

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, ClaudeAgentError>;
