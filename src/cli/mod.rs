//! CLI-specific functionality for ccgen
//!
//! This module contains argument parsing and configuration discovery.

pub mod args;
pub mod config;

pub use args::{Args, Commands, ExecutionMode, GenerateConfig};
pub use config::{ConfigDiscovery, GenerationDefaults};
