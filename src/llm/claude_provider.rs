//! Official Claude Code agent provider
//!
//! Drives a bounded multi-turn `claude` session through
//! [`ClaudeCodeInterface`] and turns its final result into [`GeneratedCode`].
//! The session can be aborted through the provider's cancellation token; see
//! [`ClaudeCodeProvider::cancellation_token`].

use crate::claude::{AgentInvocation, ClaudeCodeInterface, ClaudeError, collect_result};
use crate::env::defaults;
use crate::llm::parser::parse_response;
use crate::llm::prompt::PromptBuilder;
use crate::llm::provider::CodeGenerator;
use crate::llm::types::{GeneratedCode, GenerationRequest, LLMError};
use futures::future::BoxFuture;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub const PROVIDER_NAME: &str = "Claude Code SDK (Official)";

/// Model name reported when the session does not announce one
pub const FALLBACK_MODEL_NAME: &str = "claude-via-official-sdk";

pub struct ClaudeCodeProvider {
    interface: ClaudeCodeInterface,
    cancel: CancellationToken,
}

impl ClaudeCodeProvider {
    pub fn new(binary: impl AsRef<Path>) -> Result<Self, LLMError> {
        let interface = ClaudeCodeInterface::new(binary).map_err(map_claude_error)?;
        Ok(Self {
            interface,
            cancel: CancellationToken::new(),
        })
    }

    pub fn from_interface(interface: ClaudeCodeInterface) -> Self {
        Self {
            interface,
            cancel: CancellationToken::new(),
        }
    }

    /// Handle that aborts the in-flight session when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run a generation against an explicit cancellation token
    pub async fn generate_with_cancel(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GeneratedCode, LLMError> {
        info!("Starting code generation with the official Claude Code agent");

        let invocation = AgentInvocation {
            prompt: PromptBuilder::build(&request.prompt, request.system_prompt.as_deref()),
            max_turns: request.max_turns.unwrap_or(defaults::MAX_TURNS),
            model: request.model.clone(),
        };

        let messages = self
            .interface
            .run(&invocation, cancel)
            .await
            .map_err(map_claude_error)
            .inspect_err(|e| error!("Claude Code generation failed: {}", e))?;

        let outcome = collect_result(&messages).map_err(map_claude_error)?;
        let parsed = parse_response(&outcome.result);

        Ok(GeneratedCode {
            content: parsed.content,
            language: parsed.language,
            explanation: parsed.explanation,
            provider_name: PROVIDER_NAME.to_string(),
            model_name: outcome
                .model
                .unwrap_or_else(|| FALLBACK_MODEL_NAME.to_string()),
            cost_usd: outcome.total_cost_usd,
            session_id: outcome.session_id,
        })
    }
}

impl CodeGenerator for ClaudeCodeProvider {
    fn generate_code<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<GeneratedCode, LLMError>> {
        Box::pin(async move { self.generate_with_cancel(request, &self.cancel).await })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

fn map_claude_error(err: ClaudeError) -> LLMError {
    match err {
        ClaudeError::NotFound(msg) => LLMError::ProviderUnavailable(msg),
        ClaudeError::NoResult(msg) => LLMError::NoResult(msg),
        ClaudeError::Cancelled => LLMError::Cancelled,
        ClaudeError::Io(e) => LLMError::Io(e),
        e @ (ClaudeError::Spawn(_) | ClaudeError::Exited { .. }) => {
            LLMError::Process(e.to_string())
        }
    }
}
