pub mod anthropic_provider;
pub mod bedrock_provider;
pub mod claude_provider;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod sigv4;
pub mod types;

pub use anthropic_provider::AnthropicProvider;
pub use bedrock_provider::BedrockProvider;
pub use claude_provider::ClaudeCodeProvider;
pub use parser::{ParsedResponse, parse_response};
pub use prompt::{DEFAULT_SYSTEM_PROMPT, PromptBuilder};
pub use provider::{CodeGenerator, Provider, ProviderFactory, ProviderOptions};
pub use types::*;
