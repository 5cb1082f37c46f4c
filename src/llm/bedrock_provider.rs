//! AWS Bedrock provider
//!
//! Calls `InvokeModel` with the Anthropic messages envelope:
//!
//! ```json
//! {
//!   "anthropic_version": "bedrock-2023-05-31",
//!   "max_tokens": 2000,
//!   "system": "...",
//!   "messages": [{"role": "user", "content": "..."}]
//! }
//! ```
//!
//! Requests carry `Authorization: Bearer` when a Bedrock API key is configured,
//! and are SigV4-signed with static AWS credentials otherwise.

use crate::env::{bedrock_runtime_endpoint, defaults};
use crate::llm::anthropic_provider::UserMessage;
use crate::llm::parser::parse_response;
use crate::llm::prompt::PromptBuilder;
use crate::llm::provider::CodeGenerator;
use crate::llm::sigv4;
use crate::llm::types::{GatewayConfig, GeneratedCode, GenerationRequest, LLMError};
use chrono::Utc;
use futures::future::BoxFuture;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

pub const PROVIDER_NAME: &str = "AWS Bedrock";

#[derive(Debug, Serialize)]
pub struct InvokeBody<'a> {
    pub anthropic_version: &'static str,
    pub max_tokens: u32,
    pub system: &'a str,
    pub messages: Vec<UserMessage<'a>>,
}

pub struct BedrockProvider {
    client: Client,
    config: GatewayConfig,
    endpoint: String,
}

impl BedrockProvider {
    pub fn new(config: GatewayConfig, timeout: Duration) -> Result<Self, LLMError> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = bedrock_runtime_endpoint(&config.region);
        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    /// Override the regional runtime endpoint (VPC endpoints, tests)
    pub fn with_endpoint(mut self, endpoint: impl AsRef<str>) -> Self {
        self.endpoint = endpoint.as_ref().trim_end_matches('/').to_string();
        self
    }

    pub fn invoke_url(&self, model: &str) -> Result<Url, LLMError> {
        let raw = format!(
            "{}/model/{}/invoke",
            self.endpoint,
            sigv4::percent_encode(model)
        );
        Url::parse(&raw).map_err(|e| LLMError::Config(format!("invalid Bedrock URL {raw}: {e}")))
    }

    /// Read `content[0].text` from a raw response body
    pub fn extract_text(body: &[u8]) -> Result<String, LLMError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(LLMError::EmptyResponse(
                "Bedrock returned an empty response body".to_string(),
            ));
        }

        let json: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
            LLMError::UnexpectedResponseFormat(format!("Bedrock response is not valid JSON: {e}"))
        })?;

        json.pointer("/content/0/text")
            .and_then(serde_json::Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                LLMError::UnexpectedResponseFormat(
                    "Bedrock response has no non-empty content[0].text".to_string(),
                )
            })
    }

    async fn invoke(&self, request: &GenerationRequest) -> Result<GeneratedCode, LLMError> {
        info!("Starting code generation with AWS Bedrock");

        let model = request.model.as_deref().unwrap_or(&self.config.model);
        let user_prompt = PromptBuilder::user_request(&request.prompt);
        let payload = serde_json::to_vec(&InvokeBody {
            anthropic_version: defaults::BEDROCK_ANTHROPIC_VERSION,
            max_tokens: request.max_tokens.unwrap_or(defaults::MAX_TOKENS),
            system: PromptBuilder::system_prompt(request.system_prompt.as_deref()),
            messages: vec![UserMessage {
                role: "user",
                content: &user_prompt,
            }],
        })?;

        let url = self.invoke_url(model)?;
        debug!("POST {} (region: {})", url, self.config.region);

        let mut builder = self
            .client
            .post(url.as_str())
            .header("content-type", "application/json")
            .header("accept", "application/json");

        if let Some(token) = &self.config.bearer_token {
            builder = builder.bearer_auth(token);
        } else if let Some(credentials) = &self.config.aws_credentials {
            let signed =
                sigv4::sign_post(&url, &payload, credentials, &self.config.region, Utc::now())?;
            builder = builder
                .header("authorization", signed.authorization)
                .header("x-amz-date", signed.amz_date)
                .header("x-amz-content-sha256", signed.payload_hash);
            if let Some(token) = signed.security_token {
                builder = builder.header("x-amz-security-token", token);
            }
        } else {
            return Err(LLMError::Authentication(
                "no Bedrock bearer token or AWS access keys configured".to_string(),
            ));
        }

        let response = builder.body(payload).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(LLMError::Api {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let raw = Self::extract_text(&body)?;
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

impl CodeGenerator for BedrockProvider {
    fn generate_code<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<GeneratedCode, LLMError>> {
        Box::pin(async move {
            self.invoke(request)
                .await
                .inspect_err(|e| error!("AWS Bedrock generation failed: {}", e))
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
