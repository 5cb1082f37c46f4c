//! Environment constants and path utilities for ccgen.
//!
//! This module centralizes environment variable names, built-in defaults and
//! configuration file locations used throughout the application.

use std::path::{Path, PathBuf};

/// Main application directory name (hidden directory like .git, .vscode)
pub const CCGEN_DIR_NAME: &str = ".ccgen";

/// Configuration file name inside [`CCGEN_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file name looked up directly in the current directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "ccgen.toml";

/// Environment variable names read by the config resolver
pub mod vars {
    /// `1` selects the official Claude Code agent
    pub const USE_OFFICIAL_SDK: &str = "USE_OFFICIAL_CLAUDE_CODE_SDK";

    /// `1` selects AWS Bedrock
    pub const USE_BEDROCK: &str = "CLAUDE_CODE_USE_BEDROCK";

    pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
    pub const ANTHROPIC_MODEL: &str = "ANTHROPIC_MODEL";
    pub const ANTHROPIC_BASE_URL: &str = "ANTHROPIC_BASE_URL";

    pub const AWS_REGION: &str = "AWS_REGION";
    pub const AWS_BEARER_TOKEN_BEDROCK: &str = "AWS_BEARER_TOKEN_BEDROCK";
    pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
    pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
    pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
    pub const BEDROCK_ENDPOINT_URL: &str = "BEDROCK_ENDPOINT_URL";

    /// Path to the `claude` executable
    pub const CLAUDE_CODE_BIN: &str = "CLAUDE_CODE_BIN";

    pub const INPUT_PROMPT: &str = "INPUT_PROMPT";
    pub const OUTPUT_FILE: &str = "OUTPUT_FILE";

    pub const HTTP_TIMEOUT_SECS: &str = "CCGEN_HTTP_TIMEOUT_SECS";
}

/// Built-in defaults
pub mod defaults {
    /// Prompt used when neither the CLI nor `INPUT_PROMPT` provides one
    pub const PROMPT: &str = "Write a TypeScript function that prints Hello World";

    pub const OUTPUT_FILE: &str = "generated/hello.ts";

    /// Model used by the direct Anthropic API provider
    pub const DIRECT_MODEL: &str = "claude-3-haiku-20240307";

    pub const MAX_TOKENS: u32 = 2000;
    pub const MAX_TURNS: u32 = 3;

    /// Language assumed when a response carries no fence tag
    pub const LANGUAGE: &str = "typescript";

    pub const HTTP_TIMEOUT_SECS: u64 = 300;

    pub const CLAUDE_BINARY: &str = "claude";
    pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
    pub const ANTHROPIC_VERSION: &str = "2023-06-01";
    pub const BEDROCK_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

    pub const LOG_FILTER: &str = "ccgen=info";
    pub const VERBOSE_LOG_FILTER: &str = "ccgen=debug";
}

/// Build the .ccgen directory path under a root (home or project)
pub fn ccgen_dir_path(root: &Path) -> PathBuf {
    root.join(CCGEN_DIR_NAME)
}

/// Build config file path in user's home directory
pub fn user_config_file_path(home_dir: &Path) -> PathBuf {
    ccgen_dir_path(home_dir).join(CONFIG_FILE_NAME)
}

/// Build local config file path in current directory
pub fn local_config_file_path(current_dir: &Path) -> PathBuf {
    ccgen_dir_path(current_dir).join(CONFIG_FILE_NAME)
}

/// Build the Bedrock runtime endpoint for a region
pub fn bedrock_runtime_endpoint(region: &str) -> String {
    format!("https://bedrock-runtime.{region}.amazonaws.com")
}
