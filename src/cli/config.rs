//! Configuration discovery and loading
//!
//! This module handles the configuration discovery hierarchy:
//! 1. Current directory: ./ccgen.toml or ./.ccgen/config.toml
//! 2. User config: ~/.ccgen/config.toml
//! 3. System config: /etc/ccgen/config.toml
//! 4. Built-in defaults
//!
//! Generation settings are layered as CLI flag > environment > config file >
//! built-in default. Provider selection and credentials only ever come from
//! the environment.

use super::args::GenerateConfig;
use crate::config::Environment;
use crate::env::{self, defaults, vars};
use crate::llm::GenerationRequest;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env as std_env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Generation defaults loaded from a TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationDefaults {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub max_turns: Option<u32>,
    pub output_file: Option<PathBuf>,
    pub system_prompt: Option<String>,
}

impl GenerationDefaults {
    /// Load from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Save to TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Combine CLI flags, environment and these defaults into a request.
    pub fn build_request(
        &self,
        cli: &GenerateConfig,
        env: &Environment,
    ) -> anyhow::Result<GenerationRequest> {
        let prompt = cli
            .prompt
            .clone()
            .or_else(|| env.get_owned(vars::INPUT_PROMPT))
            .unwrap_or_else(|| defaults::PROMPT.to_string());

        let output_path = cli
            .output
            .clone()
            .or_else(|| env.get_owned(vars::OUTPUT_FILE).map(PathBuf::from))
            .or_else(|| self.output_file.clone())
            .unwrap_or_else(|| PathBuf::from(defaults::OUTPUT_FILE));

        let system_prompt = match &cli.system_prompt_file {
            Some(path) => Some(fs::read_to_string(path).with_context(|| {
                format!("failed to read system prompt file {}", path.display())
            })?),
            None => self.system_prompt.clone(),
        };

        Ok(GenerationRequest {
            prompt,
            output_path,
            model: cli.model.clone().or_else(|| self.model.clone()),
            max_tokens: cli.max_tokens.or(self.max_tokens),
            max_turns: cli.max_turns.or(self.max_turns),
            system_prompt,
        })
    }
}

/// Configuration discovery system
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Discover and load configuration using the hierarchy
    pub fn discover_config() -> anyhow::Result<GenerationDefaults> {
        if let Some(config_path) = Self::find_config_file() {
            info!("Loading configuration from: {:?}", config_path);
            return GenerationDefaults::from_toml_file(config_path);
        }

        debug!("No configuration file found, using defaults");
        Ok(GenerationDefaults::default())
    }

    /// Find configuration file using discovery hierarchy
    pub fn find_config_file() -> Option<PathBuf> {
        Self::get_config_candidates()
            .into_iter()
            .inspect(|candidate| debug!("Checking for config file: {:?}", candidate))
            .find(|candidate| candidate.is_file())
    }

    /// Get list of configuration file candidates in priority order
    pub fn get_config_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        // 1. Current directory
        if let Ok(current_dir) = std_env::current_dir() {
            candidates.push(current_dir.join(env::LOCAL_CONFIG_FILE_NAME));
            candidates.push(env::local_config_file_path(&current_dir));
        }

        // 2. User config
        if let Some(home_dir) = Self::get_home_dir() {
            candidates.push(env::user_config_file_path(&home_dir));
        }

        // 3. System config
        #[cfg(unix)]
        candidates.push(PathBuf::from("/etc/ccgen/config.toml"));

        #[cfg(windows)]
        if let Ok(program_data) = std_env::var("PROGRAMDATA") {
            candidates.push(PathBuf::from(program_data).join("ccgen").join("config.toml"));
        }

        candidates
    }

    fn get_home_dir() -> Option<PathBuf> {
        std_env::var("HOME")
            .ok()
            .or_else(|| std_env::var("USERPROFILE").ok())
            .map(PathBuf::from)
    }

    /// Show configuration discovery information for debugging
    pub fn show_discovery_info() {
        println!("Configuration Discovery Hierarchy:");
        println!();

        for (i, candidate) in Self::get_config_candidates().iter().enumerate() {
            let status = if candidate.exists() {
                if candidate.is_file() {
                    "✓ EXISTS"
                } else {
                    "✗ NOT A FILE"
                }
            } else {
                "✗ NOT FOUND"
            };

            println!("  {}. {:?} - {}", i + 1, candidate, status);
        }

        println!();
        match Self::find_config_file() {
            Some(found) => println!("Active configuration: {:?}", found),
            None => println!("Active configuration: Built-in defaults"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_overrides_environment_and_file() {
        let file = GenerationDefaults {
            model: Some("file-model".to_string()),
            max_tokens: Some(100),
            max_turns: Some(7),
            output_file: Some(PathBuf::from("file.ts")),
            system_prompt: Some("file system prompt".to_string()),
        };
        let env = Environment::from_pairs([
            (vars::INPUT_PROMPT, "env prompt"),
            (vars::OUTPUT_FILE, "env.ts"),
        ]);
        let cli = GenerateConfig {
            prompt: Some("cli prompt".to_string()),
            output: Some(PathBuf::from("cli.ts")),
            model: Some("cli-model".to_string()),
            max_tokens: Some(50),
            ..Default::default()
        };

        let request = file.build_request(&cli, &env).unwrap();
        assert_eq!(request.prompt, "cli prompt");
        assert_eq!(request.output_path, PathBuf::from("cli.ts"));
        assert_eq!(request.model.as_deref(), Some("cli-model"));
        assert_eq!(request.max_tokens, Some(50));
        assert_eq!(request.max_turns, Some(7));
        assert_eq!(request.system_prompt.as_deref(), Some("file system prompt"));
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = GenerationDefaults {
            output_file: Some(PathBuf::from("file.ts")),
            ..Default::default()
        };
        let env = Environment::from_pairs([
            (vars::INPUT_PROMPT, "env prompt"),
            (vars::OUTPUT_FILE, "env.ts"),
        ]);

        let request = file
            .build_request(&GenerateConfig::default(), &env)
            .unwrap();
        assert_eq!(request.prompt, "env prompt");
        assert_eq!(request.output_path, PathBuf::from("env.ts"));
    }

    #[test]
    fn test_built_in_defaults() {
        let request = GenerationDefaults::default()
            .build_request(&GenerateConfig::default(), &Environment::default())
            .unwrap();
        assert_eq!(request.prompt, defaults::PROMPT);
        assert_eq!(request.output_path, PathBuf::from(defaults::OUTPUT_FILE));
        assert!(request.model.is_none());
        assert!(request.system_prompt.is_none());
    }

    #[test]
    fn test_system_prompt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("system.txt");
        fs::write(&path, "Only write Go.").unwrap();

        let cli = GenerateConfig {
            system_prompt_file: Some(path),
            ..Default::default()
        };
        let request = GenerationDefaults::default()
            .build_request(&cli, &Environment::default())
            .unwrap();
        assert_eq!(request.system_prompt.as_deref(), Some("Only write Go."));
    }

    #[test]
    fn test_missing_system_prompt_file_fails() {
        let cli = GenerateConfig {
            system_prompt_file: Some(PathBuf::from("/nonexistent/system.txt")),
            ..Default::default()
        };
        assert!(
            GenerationDefaults::default()
                .build_request(&cli, &Environment::default())
                .is_err()
        );
    }

    #[test]
    fn test_config_file_operations() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("ccgen.toml");

        let original = GenerationDefaults {
            model: Some("claude-3-5-haiku-latest".to_string()),
            max_tokens: Some(4096),
            ..Default::default()
        };
        original.to_toml_file(&config_path).unwrap();

        let loaded = GenerationDefaults::from_toml_file(&config_path).unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_partial_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("ccgen.toml");
        fs::write(&config_path, "max_turns = 5\n").unwrap();

        let loaded = GenerationDefaults::from_toml_file(&config_path).unwrap();
        assert_eq!(loaded.max_turns, Some(5));
        assert!(loaded.model.is_none());
    }

    #[test]
    fn test_config_candidates() {
        let candidates = ConfigDiscovery::get_config_candidates();
        assert!(!candidates.is_empty());
        assert_eq!(candidates[0].file_name().unwrap(), "ccgen.toml");
    }
}
