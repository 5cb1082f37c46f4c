use crate::env::defaults;
use crate::llm::anthropic_provider::AnthropicProvider;
use crate::llm::bedrock_provider::BedrockProvider;
use crate::llm::claude_provider::ClaudeCodeProvider;
use crate::llm::types::{GeneratedCode, GenerationRequest, LLMError, ProviderConfig, ProviderMode};
use futures::future::BoxFuture;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A backend capable of turning a prompt into generated code
pub trait CodeGenerator: Send + Sync {
    /// Run one generation.
    ///
    /// The raw backend text is reduced with [`crate::llm::parse_response`] and
    /// tagged with provider metadata before being returned.
    fn generate_code<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<GeneratedCode, LLMError>>;

    /// Get provider name/identifier
    fn provider_name(&self) -> &'static str;
}

/// The closed set of supported backends
pub enum Provider {
    OfficialAgent(ClaudeCodeProvider),
    DirectApi(AnthropicProvider),
    ManagedGateway(BedrockProvider),
}

impl Provider {
    pub fn mode(&self) -> ProviderMode {
        match self {
            Provider::OfficialAgent(_) => ProviderMode::OfficialAgent,
            Provider::DirectApi(_) => ProviderMode::DirectApi,
            Provider::ManagedGateway(_) => ProviderMode::ManagedGateway,
        }
    }

    /// Abort handle for providers that support cancellation
    pub fn cancellation_token(&self) -> Option<CancellationToken> {
        match self {
            Provider::OfficialAgent(provider) => Some(provider.cancellation_token()),
            _ => None,
        }
    }
}

impl CodeGenerator for Provider {
    fn generate_code<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<GeneratedCode, LLMError>> {
        match self {
            Provider::OfficialAgent(provider) => provider.generate_code(request),
            Provider::DirectApi(provider) => provider.generate_code(request),
            Provider::ManagedGateway(provider) => provider.generate_code(request),
        }
    }

    fn provider_name(&self) -> &'static str {
        match self {
            Provider::OfficialAgent(provider) => provider.provider_name(),
            Provider::DirectApi(provider) => provider.provider_name(),
            Provider::ManagedGateway(provider) => provider.provider_name(),
        }
    }
}

/// Transport settings that are not credentials
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    pub claude_binary: PathBuf,
    pub anthropic_base_url: Option<String>,
    pub bedrock_endpoint: Option<String>,
    pub http_timeout: Duration,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            claude_binary: PathBuf::from(defaults::CLAUDE_BINARY),
            anthropic_base_url: None,
            bedrock_endpoint: None,
            http_timeout: Duration::from_secs(defaults::HTTP_TIMEOUT_SECS),
        }
    }
}

/// Factory for creating the provider matching a resolved configuration
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create(config: &ProviderConfig) -> Result<Provider, LLMError> {
        Self::create_with(config, &ProviderOptions::default())
    }

    /// Instantiate the provider for `config.mode`.
    ///
    /// Re-checks that the credentials the mode needs are present, regardless
    /// of what the resolver already validated.
    pub fn create_with(
        config: &ProviderConfig,
        options: &ProviderOptions,
    ) -> Result<Provider, LLMError> {
        match config.mode {
            ProviderMode::OfficialAgent => Ok(Provider::OfficialAgent(ClaudeCodeProvider::new(
                &options.claude_binary,
            )?)),
            ProviderMode::ManagedGateway => {
                let gateway = config.gateway.clone().ok_or_else(|| {
                    LLMError::Config("gateway settings are required for Bedrock".to_string())
                })?;
                if gateway.region.trim().is_empty() || gateway.model.trim().is_empty() {
                    return Err(LLMError::Config("missing region or model".to_string()));
                }
                let mut provider = BedrockProvider::new(gateway, options.http_timeout)?;
                if let Some(endpoint) = &options.bedrock_endpoint {
                    provider = provider.with_endpoint(endpoint);
                }
                Ok(Provider::ManagedGateway(provider))
            }
            ProviderMode::DirectApi => {
                let api_key = config.anthropic_api_key.clone().ok_or_else(|| {
                    LLMError::Config("an Anthropic API key is required".to_string())
                })?;
                let mut provider = AnthropicProvider::new(api_key, options.http_timeout)?;
                if let Some(base_url) = &options.anthropic_base_url {
                    provider = provider.with_base_url(base_url);
                }
                Ok(Provider::DirectApi(provider))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::GatewayConfig;

    #[test]
    fn test_gateway_mode_without_settings_fails() {
        let config = ProviderConfig {
            mode: ProviderMode::ManagedGateway,
            anthropic_api_key: Some("ignored".to_string()),
            gateway: None,
        };
        assert!(matches!(
            ProviderFactory::create(&config),
            Err(LLMError::Config(_))
        ));
    }

    #[test]
    fn test_gateway_mode_with_blank_region_or_model_fails() {
        for (region, model) in [("", "anthropic.claude-3-haiku"), ("us-east-1", "  ")] {
            let config = ProviderConfig::managed_gateway(GatewayConfig {
                region: region.to_string(),
                model: model.to_string(),
                bearer_token: Some("token".to_string()),
                aws_credentials: None,
            });
            assert!(matches!(
                ProviderFactory::create(&config),
                Err(LLMError::Config(ref msg)) if msg == "missing region or model"
            ));
        }
    }

    #[test]
    fn test_direct_mode_without_key_fails() {
        let config = ProviderConfig {
            mode: ProviderMode::DirectApi,
            anthropic_api_key: None,
            gateway: None,
        };
        assert!(matches!(
            ProviderFactory::create(&config),
            Err(LLMError::Config(_))
        ));
    }

    #[test]
    fn test_direct_mode_dispatch() {
        let provider = ProviderFactory::create(&ProviderConfig::direct_api("sk-test")).unwrap();
        assert_eq!(provider.mode(), ProviderMode::DirectApi);
        assert_eq!(provider.provider_name(), "Anthropic Direct API");
        assert!(provider.cancellation_token().is_none());
    }

    #[test]
    fn test_gateway_mode_dispatch() {
        let config = ProviderConfig::managed_gateway(GatewayConfig {
            region: "us-east-1".to_string(),
            model: "anthropic.claude-3-haiku-20240307-v1:0".to_string(),
            bearer_token: None,
            aws_credentials: None,
        });
        let provider = ProviderFactory::create(&config).unwrap();
        assert_eq!(provider.mode(), ProviderMode::ManagedGateway);
        assert_eq!(provider.provider_name(), "AWS Bedrock");
    }

    #[test]
    fn test_official_mode_requires_binary() {
        let options = ProviderOptions {
            claude_binary: PathBuf::from("no-such-claude-binary-for-tests"),
            ..Default::default()
        };
        assert!(matches!(
            ProviderFactory::create_with(&ProviderConfig::official_agent(), &options),
            Err(LLMError::ProviderUnavailable(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_official_mode_dispatch() {
        let options = ProviderOptions {
            claude_binary: PathBuf::from("sh"),
            ..Default::default()
        };
        let provider =
            ProviderFactory::create_with(&ProviderConfig::official_agent(), &options).unwrap();
        assert_eq!(provider.mode(), ProviderMode::OfficialAgent);
        assert!(provider.cancellation_token().is_some());
    }
}
