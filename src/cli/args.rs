//! Command line argument parsing
//!
//! Subcommands:
//! - `generate`: Generate code from a prompt (default when no subcommand is given)
//! - `show-config`: Show configuration discovery and provider selection

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug)]
pub enum ExecutionMode {
    Generate(GenerateConfig),
    ShowConfig,
}

#[derive(Debug, Default)]
pub struct GenerateConfig {
    pub prompt: Option<String>,
    pub output: Option<PathBuf>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub max_turns: Option<u32>,
    pub system_prompt_file: Option<PathBuf>,
    pub config_override: Option<PathBuf>,
    pub dry_run: bool,
    pub json: bool,
    pub verbose: bool,
}

#[derive(Debug, Parser)]
#[command(name = "ccgen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Generate source files from natural-language prompts using Claude Code, the Anthropic API or AWS Bedrock"
)]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate code from a prompt
    Generate {
        /// What to generate (falls back to INPUT_PROMPT)
        prompt: Option<String>,
        /// Output file (falls back to OUTPUT_FILE)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
        /// Model identifier
        #[arg(long = "model")]
        model: Option<String>,
        /// Maximum tokens in the response
        #[arg(long = "max-tokens")]
        max_tokens: Option<u32>,
        /// Maximum agent turns (official agent only)
        #[arg(long = "max-turns")]
        max_turns: Option<u32>,
        /// Read the system prompt from a file
        #[arg(long = "system-prompt", value_name = "FILE")]
        system_prompt: Option<PathBuf>,
        /// Configuration file path
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
        /// Print the resolved provider and prompt without calling any backend
        #[arg(short = 'n', long = "dry-run")]
        dry_run: bool,
        /// Also print the result as JSON on stdout
        #[arg(long = "json")]
        json: bool,
        /// Enable verbose output
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },
    /// Show configuration discovery information and the selected provider
    ShowConfig,
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn mode(&self) -> ExecutionMode {
        match &self.command {
            Some(Commands::Generate {
                prompt,
                output,
                model,
                max_tokens,
                max_turns,
                system_prompt,
                config,
                dry_run,
                json,
                verbose,
            }) => ExecutionMode::Generate(GenerateConfig {
                prompt: prompt.clone(),
                output: output.clone(),
                model: model.clone(),
                max_tokens: *max_tokens,
                max_turns: *max_turns,
                system_prompt_file: system_prompt.clone(),
                config_override: config.clone(),
                dry_run: *dry_run,
                json: *json,
                verbose: *verbose,
            }),
            Some(Commands::ShowConfig) => ExecutionMode::ShowConfig,
            // Environment-driven generation, as in CI pipelines
            None => ExecutionMode::Generate(GenerateConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_command_with_options() {
        let args = Args::try_parse_from([
            "ccgen",
            "generate",
            "add two numbers",
            "-o",
            "out/add.ts",
            "--model",
            "claude-3-5-sonnet-latest",
            "--max-tokens",
            "1024",
            "--max-turns",
            "5",
            "--json",
            "-v",
        ])
        .unwrap();

        let ExecutionMode::Generate(config) = args.mode() else {
            panic!("Expected Generate mode");
        };
        assert_eq!(config.prompt.as_deref(), Some("add two numbers"));
        assert_eq!(config.output, Some(PathBuf::from("out/add.ts")));
        assert_eq!(config.model.as_deref(), Some("claude-3-5-sonnet-latest"));
        assert_eq!(config.max_tokens, Some(1024));
        assert_eq!(config.max_turns, Some(5));
        assert!(config.json);
        assert!(config.verbose);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_no_subcommand_generates_from_environment() {
        let args = Args::try_parse_from(["ccgen"]).unwrap();
        let ExecutionMode::Generate(config) = args.mode() else {
            panic!("Expected Generate mode");
        };
        assert!(config.prompt.is_none());
        assert!(config.output.is_none());
    }

    #[test]
    fn test_show_config() {
        let args = Args::try_parse_from(["ccgen", "show-config"]).unwrap();
        assert!(matches!(args.mode(), ExecutionMode::ShowConfig));
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        assert!(Args::try_parse_from(["ccgen", "generate", "--max-tokens", "lots"]).is_err());
    }
}
