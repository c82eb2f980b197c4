use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};

use crate::types::QueryOptions;
use crate::{ClaudeAgentError, Result};

// ─── ClaudeProcess ────────────────────────────────────────────────────────

/// A running `claude --print` subprocess.
///
/// The prompt is written to stdin by a background task and stdin is closed
/// afterwards, so prompts of any size or content never touch argv. Stdout
/// and stderr are collected in full when the process exits.
pub(crate) struct ClaudeProcess {
    child: Child,
}

impl ClaudeProcess {
    /// Spawn the real `claude` binary with the given prompt and options.
    ///
    /// `CLAUDECODE` is removed from the environment so this works both from a
    /// terminal and from inside a running Claude session.
    pub(crate) fn spawn(prompt: &str, opts: &QueryOptions) -> Result<Self> {
        let exe = resolve_executable(opts)?;
        let mut cmd = build_command(&exe, opts)?;
        cmd.env_remove("CLAUDECODE");

        for (k, v) in &opts.env {
            cmd.env(k, v);
        }

        Self::from_command(cmd, prompt)
    }

    /// Spawn an arbitrary command as a mock Claude process.
    /// Used in unit tests to inject a command that emits fixed output.
    #[cfg(test)]
    pub(crate) fn spawn_command(cmd: Command, prompt: &str) -> Result<Self> {
        Self::from_command(cmd, prompt)
    }

    fn from_command(mut cmd: Command, prompt: &str) -> Result<Self> {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let program = cmd.as_std().get_program().to_string_lossy().into_owned();
        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ClaudeAgentError::NotFound(program.clone())
            } else {
                ClaudeAgentError::Io(e)
            }
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ClaudeAgentError::Process("stdin not captured".into()))?;

        // Written from a separate task: a child that produces output before
        // draining stdin would otherwise deadlock against a full pipe.
        let input = prompt.as_bytes().to_vec();
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(&input).await {
                tracing::debug!(error = %e, "claude stdin closed before prompt was written");
            }
            let _ = stdin.shutdown().await;
        });

        Ok(Self { child })
    }

    /// Wait for the child to exit and return its stdout.
    ///
    /// A non-zero exit becomes [`ClaudeAgentError::Process`] carrying the
    /// captured stderr; exceeding `timeout` kills the child and returns
    /// [`ClaudeAgentError::Timeout`].
    pub(crate) async fn wait(self, timeout: Option<Duration>) -> Result<String> {
        let pending = self.child.wait_with_output();
        let output = match timeout {
            // Dropping the future drops the child, and kill_on_drop reaps it.
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| ClaudeAgentError::Timeout(limit))??,
            None => pending.await?,
        };

        if let Some(err) = exit_error(&output) {
            return Err(err);
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn exit_error(output: &Output) -> Option<ClaudeAgentError> {
    if output.status.success() {
        return None;
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let msg = if let Some(code) = output.status.code() {
        if stderr.is_empty() {
            format!("Claude process exited with code {code}")
        } else {
            format!("Claude process exited with code {code}\nstderr: {stderr}")
        }
    } else if stderr.is_empty() {
        "Claude process terminated by signal".to_string()
    } else {
        format!("Claude process terminated by signal\nstderr: {stderr}")
    };

    Some(ClaudeAgentError::Process(msg))
}

// ─── Command builder ──────────────────────────────────────────────────────

/// Locate the claude executable: explicit path, then `claude`, then
/// `claude.cmd` (npm shims on Windows).
fn resolve_executable(opts: &QueryOptions) -> Result<PathBuf> {
    if let Some(path) = &opts.path_to_executable {
        return Ok(path.clone());
    }
    which::which("claude")
        .or_else(|_| which::which("claude.cmd"))
        .map_err(|_| ClaudeAgentError::NotFound("claude".into()))
}

pub(crate) fn build_command(exe: &std::path::Path, opts: &QueryOptions) -> Result<Command> {
    let mut cmd = Command::new(exe);
    cmd.arg("-p");

    if let Some(model) = &opts.model {
        cmd.arg("--model").arg(model);
    }

    if let Some(schema) = &opts.json_schema {
        cmd.arg("--output-format")
            .arg("json")
            .arg("--json-schema")
            .arg(serde_json::to_string(schema)?);
    }

    if let Some(cwd) = &opts.cwd {
        cmd.current_dir(cwd);
    }

    // The prompt is never a positional arg; it goes over stdin.

    Ok(cmd)
}
