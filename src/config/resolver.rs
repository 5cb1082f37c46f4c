//! Provider mode resolution.
//!
//! Precedence, first match wins:
//! 1. `USE_OFFICIAL_CLAUDE_CODE_SDK=1` selects the official agent
//! 2. `CLAUDE_CODE_USE_BEDROCK=1` selects AWS Bedrock
//! 3. Otherwise the direct Anthropic API

use super::Environment;
use crate::env::vars;
use crate::llm::{
    AwsCredentials, GatewayConfig, LLMError, ProviderConfig, ProviderMode, ProviderOptions,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

pub struct ConfigResolver;

impl ConfigResolver {
    /// Resolve the provider configuration, failing when the selected mode
    /// lacks its required settings.
    pub fn resolve(env: &Environment) -> Result<ProviderConfig, LLMError> {
        let mode = Self::select_mode(env);
        debug!("Selected provider mode: {}", mode);

        let anthropic_api_key = env.get_owned(vars::ANTHROPIC_API_KEY);

        match mode {
            ProviderMode::OfficialAgent => Ok(ProviderConfig {
                mode,
                anthropic_api_key,
                gateway: None,
            }),
            ProviderMode::ManagedGateway => {
                let (Some(region), Some(model)) = (
                    env.get_owned(vars::AWS_REGION),
                    env.get_owned(vars::ANTHROPIC_MODEL),
                ) else {
                    return Err(LLMError::Config("missing region or model".to_string()));
                };

                Ok(ProviderConfig {
                    mode,
                    anthropic_api_key,
                    gateway: Some(GatewayConfig {
                        region,
                        model,
                        bearer_token: env.get_owned(vars::AWS_BEARER_TOKEN_BEDROCK),
                        aws_credentials: Self::aws_credentials(env),
                    }),
                })
            }
            ProviderMode::DirectApi => match anthropic_api_key {
                Some(key) => Ok(ProviderConfig::direct_api(key)),
                None => Err(LLMError::Config("missing api key".to_string())),
            },
        }
    }

    fn select_mode(env: &Environment) -> ProviderMode {
        if env.flag(vars::USE_OFFICIAL_SDK) {
            ProviderMode::OfficialAgent
        } else if env.flag(vars::USE_BEDROCK) {
            ProviderMode::ManagedGateway
        } else {
            ProviderMode::DirectApi
        }
    }

    fn aws_credentials(env: &Environment) -> Option<AwsCredentials> {
        Some(AwsCredentials {
            access_key_id: env.get_owned(vars::AWS_ACCESS_KEY_ID)?,
            secret_access_key: env.get_owned(vars::AWS_SECRET_ACCESS_KEY)?,
            session_token: env.get_owned(vars::AWS_SESSION_TOKEN),
        })
    }

    /// Transport overrides: binary path, endpoints and HTTP timeout
    pub fn provider_options(env: &Environment) -> ProviderOptions {
        let mut options = ProviderOptions::default();
        if let Some(binary) = env.get(vars::CLAUDE_CODE_BIN) {
            options.claude_binary = PathBuf::from(binary);
        }
        options.anthropic_base_url = env.get_owned(vars::ANTHROPIC_BASE_URL);
        options.bedrock_endpoint = env.get_owned(vars::BEDROCK_ENDPOINT_URL);
        if let Some(secs) = env.parse::<u64>(vars::HTTP_TIMEOUT_SECS).filter(|s| *s > 0) {
            options.http_timeout = Duration::from_secs(secs);
        }
        options
    }

    /// Log the resolved configuration without secrets
    pub fn log_config(config: &ProviderConfig) {
        match config.mode {
            ProviderMode::OfficialAgent => info!("Using the official Claude Code agent"),
            ProviderMode::DirectApi => info!("Using the Anthropic API directly"),
            ProviderMode::ManagedGateway => {
                info!("Using Anthropic models via AWS Bedrock");
                if let Some(gateway) = &config.gateway {
                    info!("Region: {}", gateway.region);
                    info!("Model: {}", gateway.model);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_official_agent_needs_nothing_else() {
        let env = Environment::from_pairs([(vars::USE_OFFICIAL_SDK, "1")]);
        let config = ConfigResolver::resolve(&env).unwrap();
        assert_eq!(config.mode, ProviderMode::OfficialAgent);
        assert!(config.gateway.is_none());
    }

    #[test]
    fn test_official_agent_wins_over_bedrock() {
        let env = Environment::from_pairs([
            (vars::USE_OFFICIAL_SDK, "1"),
            (vars::USE_BEDROCK, "1"),
        ]);
        let config = ConfigResolver::resolve(&env).unwrap();
        assert_eq!(config.mode, ProviderMode::OfficialAgent);
    }

    #[test]
    fn test_gateway_missing_model_fails() {
        let env = Environment::from_pairs([(vars::USE_BEDROCK, "1"), (vars::AWS_REGION, "us-east-1")]);
        let err = ConfigResolver::resolve(&env).unwrap_err();
        assert!(matches!(err, LLMError::Config(ref msg) if msg == "missing region or model"));
    }

    #[test]
    fn test_gateway_missing_region_fails() {
        let env = Environment::from_pairs([
            (vars::USE_BEDROCK, "1"),
            (vars::ANTHROPIC_MODEL, "anthropic.claude-3-haiku-20240307-v1:0"),
        ]);
        assert!(matches!(
            ConfigResolver::resolve(&env),
            Err(LLMError::Config(_))
        ));
    }

    #[test]
    fn test_gateway_resolves_optional_credentials() {
        let env = Environment::from_pairs([
            (vars::USE_BEDROCK, "1"),
            (vars::AWS_REGION, "eu-west-1"),
            (vars::ANTHROPIC_MODEL, "anthropic.claude-3-haiku-20240307-v1:0"),
            (vars::AWS_BEARER_TOKEN_BEDROCK, "token"),
            (vars::AWS_ACCESS_KEY_ID, "AKID"),
            (vars::AWS_SECRET_ACCESS_KEY, "secret"),
        ]);
        let config = ConfigResolver::resolve(&env).unwrap();
        let gateway = config.gateway.unwrap();
        assert_eq!(gateway.region, "eu-west-1");
        assert_eq!(gateway.bearer_token.as_deref(), Some("token"));
        let creds = gateway.aws_credentials.unwrap();
        assert_eq!(creds.access_key_id, "AKID");
        assert_eq!(creds.session_token, None);
    }

    #[test]
    fn test_gateway_without_bearer_token_is_valid() {
        let env = Environment::from_pairs([
            (vars::USE_BEDROCK, "1"),
            (vars::AWS_REGION, "eu-west-1"),
            (vars::ANTHROPIC_MODEL, "m"),
        ]);
        let gateway = ConfigResolver::resolve(&env).unwrap().gateway.unwrap();
        assert!(gateway.bearer_token.is_none());
        assert!(gateway.aws_credentials.is_none());
    }

    #[test]
    fn test_direct_api_requires_key() {
        let err = ConfigResolver::resolve(&Environment::default()).unwrap_err();
        assert!(matches!(err, LLMError::Config(ref msg) if msg == "missing api key"));
    }

    #[test]
    fn test_direct_api_with_key() {
        let env = Environment::from_pairs([(vars::ANTHROPIC_API_KEY, "sk-ant-test")]);
        let config = ConfigResolver::resolve(&env).unwrap();
        assert_eq!(config.mode, ProviderMode::DirectApi);
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-ant-test"));
    }

    #[test]
    fn test_provider_options_from_environment() {
        let env = Environment::from_pairs([
            (vars::CLAUDE_CODE_BIN, "/opt/claude/bin/claude"),
            (vars::ANTHROPIC_BASE_URL, "http://127.0.0.1:9000"),
            (vars::HTTP_TIMEOUT_SECS, "12"),
        ]);
        let options = ConfigResolver::provider_options(&env);
        assert_eq!(options.claude_binary, PathBuf::from("/opt/claude/bin/claude"));
        assert_eq!(
            options.anthropic_base_url.as_deref(),
            Some("http://127.0.0.1:9000")
        );
        assert!(options.bedrock_endpoint.is_none());
        assert_eq!(options.http_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_provider_options_ignore_bad_timeout() {
        let env = Environment::from_pairs([(vars::HTTP_TIMEOUT_SECS, "soon")]);
        let options = ConfigResolver::provider_options(&env);
        assert_eq!(
            options.http_timeout,
            ProviderOptions::default().http_timeout
        );
    }

    #[test]
    fn test_flag_other_than_one_is_ignored() {
        let env = Environment::from_pairs([
            (vars::USE_OFFICIAL_SDK, "true"),
            (vars::ANTHROPIC_API_KEY, "k"),
        ]);
        assert_eq!(
            ConfigResolver::resolve(&env).unwrap().mode,
            ProviderMode::DirectApi
        );
    }
}
