use std::time::{Duration, Instant};

use tokio::runtime::RuntimeFlavor;

use crate::process::ClaudeProcess;
use crate::{QueryOptions, Result};

// ─── RunConfig ────────────────────────────────────────────────────────────

/// Configuration for a single one-shot Claude invocation.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// The prompt, delivered on stdin.
    pub prompt: String,
    /// Query options: model, output schema, executable, timeout.
    pub opts: QueryOptions,
}

// ─── RunResult ────────────────────────────────────────────────────────────

/// Raw output of a completed invocation.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Stdout with surrounding whitespace removed. Not interpreted.
    pub output: String,
    pub elapsed: Duration,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run `claude -p` once and return its stdout.
///
/// No retries are attempted. Errors distinguish a missing executable
/// ([`ClaudeAgentError::NotFound`](crate::ClaudeAgentError::NotFound)) from a
/// process that ran and failed (`Process`, `Timeout`, `Io`).
pub async fn run(config: RunConfig) -> Result<RunResult> {
    let started = Instant::now();
    tracing::debug!(
        model = config.opts.model.as_deref().unwrap_or("default"),
        structured = config.opts.json_schema.is_some(),
        prompt_len = config.prompt.len(),
        "spawning claude subprocess"
    );

    let process = ClaudeProcess::spawn(&config.prompt, &config.opts)?;
    let output = process.wait(config.opts.timeout).await?;

    let elapsed = started.elapsed();
    tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, bytes = output.len(), "claude finished");
    Ok(RunResult { output, elapsed })
}

/// Blocking wrapper around [`run`] for synchronous callers.
///
/// Inside a multi-threaded Tokio runtime the ambient handle is used. A
/// current-thread runtime cannot be blocked in place, so the call is driven
/// on a scoped thread with its own runtime. Outside any runtime a fresh
/// current-thread runtime is built.
pub fn run_blocking(config: RunConfig) -> Result<RunResult> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| handle.block_on(run(config)))
        }
        Ok(_) => std::thread::scope(|scope| {
            match scope.spawn(|| run_on_fresh_runtime(config)).join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }),
        Err(_) => run_on_fresh_runtime(config),
    }
}

fn run_on_fresh_runtime(config: RunConfig) -> Result<RunResult> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(run(config))
}

// ─── Tests ────────────────────────────────────────────────────────────────
