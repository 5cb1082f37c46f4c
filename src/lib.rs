//! # ccgen
//!
//! A command-line code generator that turns a natural-language prompt into a
//! source file using one of three interchangeable backends:
//!
//! - **Official agent**: the `claude` CLI in multi-turn streaming mode
//! - **Direct API**: the Anthropic Messages API
//! - **Managed gateway**: Anthropic models hosted on AWS Bedrock
//!
//! ## Architecture Overview
//!
//! - **[`config`]**: environment snapshot and provider mode resolution
//! - **[`llm`]**: the `CodeGenerator` capability, its three providers, prompt
//!   construction and response parsing
//! - **[`claude`]**: subprocess integration with the `claude` CLI
//! - **[`output`]**: rendering and writing the generated file
//! - **[`cli`]**: argument parsing and config file discovery
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ccgen::config::{ConfigResolver, Environment};
//! use ccgen::llm::{CodeGenerator, GenerationRequest, ProviderFactory};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let env = Environment::from_process();
//!     let config = ConfigResolver::resolve(&env)?;
//!     let provider = ProviderFactory::create(&config)?;
//!
//!     let request = GenerationRequest::new("add two numbers", "generated/add.ts");
//!     let code = provider.generate_code(&request).await?;
//!     println!("{}", code.content);
//!     Ok(())
//! }
//! ```

/// Claude Code CLI integration.
///
/// Spawns the agent, streams its JSONL output and reduces it to a result.
pub mod claude;

/// Provider-agnostic code generation interface.
pub mod llm;

/// Environment snapshot and provider mode resolution.
pub mod config;

/// Environment variable names, defaults and path utilities.
pub mod env;

/// Generated file rendering.
pub mod output;

// CLI module for command-line interface
pub mod cli;

pub use claude::ClaudeCodeInterface;
pub use config::{ConfigResolver, Environment};
pub use llm::{
    CodeGenerator, GeneratedCode, GenerationRequest, LLMError, Provider, ProviderConfig,
    ProviderFactory, ProviderMode,
};
