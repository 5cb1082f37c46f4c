use serde::{Deserialize, Serialize};

/// One line of `claude --output-format stream-json` output.
///
/// Only the fields needed to drive a generation are modelled; unknown fields
/// are ignored and unknown message types map to [`AgentMessage::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentMessage {
    /// Session initialisation, announces the model and session id
    System {
        subtype: Option<String>,
        session_id: Option<String>,
        model: Option<String>,
    },
    /// An assistant turn
    Assistant {
        session_id: Option<String>,
        message: Option<serde_json::Value>,
    },
    /// Tool results fed back to the model
    User {
        session_id: Option<String>,
        message: Option<serde_json::Value>,
    },
    /// Final outcome of the session
    Result {
        subtype: Option<String>,
        #[serde(default)]
        is_error: bool,
        result: Option<String>,
        total_cost_usd: Option<f64>,
        num_turns: Option<u32>,
        session_id: Option<String>,
    },
    #[serde(other)]
    Other,
}

impl AgentMessage {
    pub fn is_result(&self) -> bool {
        matches!(self, AgentMessage::Result { .. })
    }
}

/// What a finished agent session produced
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutcome {
    pub result: String,
    pub total_cost_usd: Option<f64>,
    pub num_turns: Option<u32>,
    pub session_id: Option<String>,
    /// Model announced by the init message, if any
    pub model: Option<String>,
}

/// Parameters for one agent session
#[derive(Debug, Clone)]
pub struct AgentInvocation {
    pub prompt: String,
    pub max_turns: u32,
    pub model: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ClaudeError {
    #[error("Claude Code executable not found: {0}")]
    NotFound(String),
    #[error("Failed to spawn claude command: {0}")]
    Spawn(String),
    #[error("Claude command failed with exit code {code}: {stderr}")]
    Exited { code: i32, stderr: String },
    #[error("No result from Claude Code: {0}")]
    NoResult(String),
    #[error("Agent session cancelled")]
    Cancelled,
    #[error("I/O error while reading agent output: {0}")]
    Io(#[from] std::io::Error),
}

/// Scan a finished message sequence for its result.
///
/// The result message is searched for rather than assumed to be last.
pub fn collect_result(messages: &[AgentMessage]) -> Result<AgentOutcome, ClaudeError> {
    let model = messages.iter().find_map(|message| match message {
        AgentMessage::System { model, .. } => model.clone(),
        _ => None,
    });

    let Some(AgentMessage::Result {
        subtype,
        is_error,
        result,
        total_cost_usd,
        num_turns,
        session_id,
    }) = messages.iter().find(|message| message.is_result())
    else {
        return Err(ClaudeError::NoResult(format!(
            "session ended after {} messages without a result message",
            messages.len()
        )));
    };

    let subtype = subtype.as_deref().unwrap_or("unknown");
    let text = result.as_deref().map(str::trim).unwrap_or_default();

    if *is_error {
        return Err(ClaudeError::NoResult(format!(
            "session ended with an error result ({subtype}): {text}"
        )));
    }
    if text.is_empty() {
        return Err(ClaudeError::NoResult(format!(
            "result message carried no text ({subtype})"
        )));
    }

    Ok(AgentOutcome {
        result: result.clone().unwrap_or_default(),
        total_cost_usd: *total_cost_usd,
        num_turns: *num_turns,
        session_id: session_id.clone(),
        model,
    })
}
