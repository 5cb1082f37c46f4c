//! Direct Anthropic Messages API provider

use crate::env::defaults;
use crate::llm::parser::parse_response;
use crate::llm::prompt::PromptBuilder;
use crate::llm::provider::CodeGenerator;
use crate::llm::types::{GeneratedCode, GenerationRequest, LLMError};
use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

pub const PROVIDER_NAME: &str = "Anthropic Direct API";

#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub system: &'a str,
    pub messages: Vec<UserMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub struct UserMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
}

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, LLMError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: defaults::ANTHROPIC_BASE_URL.to_string(),
        })
    }

    /// Point the provider at a different API host (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = base_url.as_ref().trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    /// Text of the first content block, which must be a text block
    pub fn extract_text(response: MessagesResponse) -> Result<String, LLMError> {
        let block = response.content.into_iter().next().ok_or_else(|| {
            LLMError::UnexpectedResponseFormat("response contained no content blocks".to_string())
        })?;

        match (block.kind.as_str(), block.text) {
            ("text", Some(text)) => Ok(text),
            (kind, _) => Err(LLMError::UnexpectedResponseFormat(format!(
                "expected a text content block, got '{kind}'"
            ))),
        }
    }

    async fn send(&self, request: &GenerationRequest) -> Result<GeneratedCode, LLMError> {
        info!("Starting code generation with the Anthropic API");

        let model = request.model.as_deref().unwrap_or(defaults::DIRECT_MODEL);
        let user_prompt = PromptBuilder::user_request(&request.prompt);
        let body = MessagesRequest {
            model,
            max_tokens: request.max_tokens.unwrap_or(defaults::MAX_TOKENS),
            system: PromptBuilder::system_prompt(request.system_prompt.as_deref()),
            messages: vec![UserMessage {
                role: "user",
                content: &user_prompt,
            }],
        };
        debug!("POST {} (model: {})", self.messages_url(), model);

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", defaults::ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(LLMError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: MessagesResponse = serde_json::from_str(&text).map_err(|e| {
            LLMError::UnexpectedResponseFormat(format!("response is not valid JSON: {e}"))
        })?;
        let raw = Self::extract_text(parsed)?;
        let parsed = parse_response(&raw);

        Ok(GeneratedCode {
            content: parsed.content,
            language: parsed.language,
            explanation: parsed.explanation,
            provider_name: PROVIDER_NAME.to_string(),
            model_name: model.to_string(),
            cost_usd: None,
            session_id: None,
        })
    }
}

impl CodeGenerator for AnthropicProvider {
    fn generate_code<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<GeneratedCode, LLMError>> {
        Box::pin(async move {
            self.send(request)
                .await
                .inspect_err(|e| error!("Anthropic API generation failed: {}", e))
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> MessagesResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let body = MessagesRequest {
            model: "claude-3-haiku-20240307",
            max_tokens: 2000,
            system: "sys",
            messages: vec![UserMessage {
                role: "user",
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "claude-3-haiku-20240307",
                "max_tokens": 2000,
                "system": "sys",
                "messages": [{"role": "user", "content": "hi"}]
            })
        );
    }

    #[test]
    fn test_extract_text_block() {
        let text = AnthropicProvider::extract_text(response(
            r#"{"content":[{"type":"text","text":"hello"}],"model":"m"}"#,
        ))
        .unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_non_text_block_is_rejected() {
        let err = AnthropicProvider::extract_text(response(
            r#"{"content":[{"type":"tool_use","id":"x","name":"n","input":{}}]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, LLMError::UnexpectedResponseFormat(ref m) if m.contains("tool_use")));
    }

    #[test]
    fn test_empty_content_is_rejected() {
        assert!(matches!(
            AnthropicProvider::extract_text(response(r#"{"content":[]}"#)),
            Err(LLMError::UnexpectedResponseFormat(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let provider = AnthropicProvider::new("k", Duration::from_secs(5))
            .unwrap()
            .with_base_url("http://127.0.0.1:9999/");
        assert_eq!(provider.messages_url(), "http://127.0.0.1:9999/v1/messages");
    }
}
