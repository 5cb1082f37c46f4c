use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which backend is active for this process run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderMode {
    /// The official Claude Code agent, driven through the `claude` CLI
    OfficialAgent,
    /// Direct calls to the Anthropic Messages API
    DirectApi,
    /// AWS Bedrock `InvokeModel`
    ManagedGateway,
}

impl ProviderMode {
    /// Human readable label used in log lines and output headers
    pub fn label(&self) -> &'static str {
        match self {
            ProviderMode::OfficialAgent => "Official SDK",
            ProviderMode::DirectApi => "Direct API",
            ProviderMode::ManagedGateway => "via AWS Bedrock",
        }
    }
}

impl fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderMode::OfficialAgent => "official-agent",
            ProviderMode::DirectApi => "direct-api",
            ProviderMode::ManagedGateway => "managed-gateway",
        };
        f.write_str(name)
    }
}

/// Static AWS credentials captured from the environment for SigV4 signing
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Settings for the Bedrock gateway
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub region: String,
    pub model: String,
    pub bearer_token: Option<String>,
    pub aws_credentials: Option<AwsCredentials>,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("region", &self.region)
            .field("model", &self.model)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("aws_credentials", &self.aws_credentials)
            .finish()
    }
}

/// Resolved provider selection plus the credentials the selected mode needs.
///
/// Built once at startup by [`crate::config::ConfigResolver`] and never
/// mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub mode: ProviderMode,
    pub anthropic_api_key: Option<String>,
    pub gateway: Option<GatewayConfig>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("mode", &self.mode)
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("gateway", &self.gateway)
            .finish()
    }
}

impl ProviderConfig {
    pub fn official_agent() -> Self {
        Self {
            mode: ProviderMode::OfficialAgent,
            anthropic_api_key: None,
            gateway: None,
        }
    }

    pub fn direct_api(api_key: impl Into<String>) -> Self {
        Self {
            mode: ProviderMode::DirectApi,
            anthropic_api_key: Some(api_key.into()),
            gateway: None,
        }
    }

    pub fn managed_gateway(gateway: GatewayConfig) -> Self {
        Self {
            mode: ProviderMode::ManagedGateway,
            anthropic_api_key: None,
            gateway: Some(gateway),
        }
    }
}

/// One code generation job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub output_path: PathBuf,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    /// Turn cap for the multi-turn agent; ignored by single-shot providers
    pub max_turns: Option<u32>,
    /// Overrides the default instruction block
    pub system_prompt: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            prompt: prompt.into(),
            output_path: output_path.into(),
            model: None,
            max_tokens: None,
            max_turns: None,
            system_prompt: None,
        }
    }
}

/// Result of a successful generation, handed to the output writer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCode {
    pub content: String,
    pub language: String,
    pub explanation: Option<String>,
    pub provider_name: String,
    pub model_name: String,
    pub cost_usd: Option<f64>,
    pub session_id: Option<String>,
}

/// Errors produced while configuring providers or generating code
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Unexpected response format: {0}")]
    UnexpectedResponseFormat(String),
    #[error("Empty response: {0}")]
    EmptyResponse(String),
    #[error("No result received: {0}")]
    NoResult(String),
    #[error("Generation cancelled")]
    Cancelled,
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Agent process error: {0}")]
    Process(String),
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        LLMError::Network(err.to_string())
    }
}
