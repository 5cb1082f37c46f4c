//! Claude Code CLI driver
//!
//! Runs the `claude` CLI in headless mode and consumes its `stream-json`
//! output as an ordered sequence of [`AgentMessage`]s.
//!
//! ## CLI Command Structure
//!
//! ```bash
//! claude --print \
//!        --output-format stream-json \
//!        --verbose \
//!        --max-turns 3 \
//!        --model sonnet \   # only when a model is requested
//!        -- "Prompt"
//! ```
//!
//! ## Response Format
//!
//! One JSON object per line. The session ends with a message of the form:
//! ```json
//! {"type": "result", "result": "...", "total_cost_usd": 0.01, "num_turns": 2}
//! ```

use crate::claude::types::{AgentInvocation, AgentMessage, ClaudeError};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Spawns and reads `claude` sessions
#[derive(Debug, Clone)]
pub struct ClaudeCodeInterface {
    binary: PathBuf,
    working_dir: Option<PathBuf>,
}

impl ClaudeCodeInterface {
    /// Create an interface for the given executable.
    ///
    /// Fails when the executable cannot be resolved on `PATH`.
    pub fn new(binary: impl AsRef<Path>) -> Result<Self, ClaudeError> {
        let binary = binary.as_ref();
        let resolved = which::which(binary).map_err(|e| {
            ClaudeError::NotFound(format!("{}: {}", binary.display(), e))
        })?;
        debug!("Resolved Claude Code executable: {:?}", resolved);

        Ok(Self {
            binary: resolved,
            working_dir: None,
        })
    }

    /// Run the agent from a specific directory instead of the current one
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Run one session and collect every message it emits, in order.
    ///
    /// Triggering `cancel` kills the child immediately and yields
    /// [`ClaudeError::Cancelled`]; messages received so far are dropped.
    pub async fn run(
        &self,
        invocation: &AgentInvocation,
        cancel: &CancellationToken,
    ) -> Result<Vec<AgentMessage>, ClaudeError> {
        if cancel.is_cancelled() {
            return Err(ClaudeError::Cancelled);
        }

        let mut command = self.build_command(invocation);
        debug!("Executing Claude Code command: {}", self.command_line(invocation));

        let mut child = command
            .spawn()
            .map_err(|e| ClaudeError::Spawn(e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ClaudeError::Spawn("Failed to capture stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ClaudeError::Spawn("Failed to capture stderr".to_string()))?;

        // Drain stderr concurrently so the child never blocks on a full pipe
        let stderr_task = tokio::spawn(async move {
            let mut buffer = String::new();
            if let Err(e) = BufReader::new(stderr).read_to_string(&mut buffer).await {
                warn!("Error reading stderr: {}", e);
            }
            buffer
        });

        let mut stdout = BufReader::new(stdout);
        let mut buffer = Vec::new();
        let mut messages = Vec::new();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!("Cancellation requested, terminating Claude Code session");
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill claude process: {}", e);
                    }
                    stderr_task.abort();
                    return Err(ClaudeError::Cancelled);
                }
                read = stdout.read_until(b'\n', &mut buffer) => {
                    if read? == 0 {
                        break;
                    }
                    // Invalid UTF-8 degrades to a non-JSON line
                    let parsed = Self::parse_line(&String::from_utf8_lossy(&buffer));
                    buffer.clear();
                    if let Some(message) = parsed {
                        Self::report_progress(&message);
                        messages.push(message);
                    }
                }
            }
        }

        let status = child.wait().await?;
        let stderr = stderr_task.await.unwrap_or_default();
        debug!(
            "Claude Code exited with {:?} after {} messages",
            status.code(),
            messages.len()
        );

        if !status.success() && !messages.iter().any(AgentMessage::is_result) {
            return Err(ClaudeError::Exited {
                code: status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(messages)
    }

    fn build_command(&self, invocation: &AgentInvocation) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("--print") // Non-interactive mode
            .arg("--output-format")
            .arg("stream-json")
            .arg("--verbose") // stream-json requires --verbose
            .arg("--max-turns")
            .arg(invocation.max_turns.to_string());

        if let Some(model) = &invocation.model {
            command.arg("--model").arg(model);
        }

        command
            .arg("--")
            .arg(&invocation.prompt)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        command
    }

    /// Shell-escaped rendition of the command, for debug logs
    fn command_line(&self, invocation: &AgentInvocation) -> String {
        let mut line = format!(
            "{} --print --output-format stream-json --verbose --max-turns {}",
            shell_escape::escape(self.binary.to_string_lossy()),
            invocation.max_turns
        );
        if let Some(model) = &invocation.model {
            line.push_str(&format!(" --model {}", shell_escape::escape(model.into())));
        }
        line.push_str(&format!(
            " -- {}",
            shell_escape::escape(invocation.prompt.clone().into())
        ));
        line
    }

    fn parse_line(line: &str) -> Option<AgentMessage> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match serde_json::from_str::<AgentMessage>(line) {
            Ok(message) => Some(message),
            Err(e) => {
                debug!("Skipping non-JSON agent output line ({}): {}", e, line);
                None
            }
        }
    }

    fn report_progress(message: &AgentMessage) {
        match message {
            AgentMessage::Assistant { .. } => info!("Claude is responding..."),
            AgentMessage::Result {
                total_cost_usd,
                num_turns,
                ..
            } => info!(
                "Cost: ${:.4}, turns: {}",
                total_cost_usd.unwrap_or_default(),
                num_turns.unwrap_or_default()
            ),
            _ => {}
        }
    }
}
