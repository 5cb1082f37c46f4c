//! Environment snapshot and provider configuration resolution.

pub mod environment;
pub mod resolver;

pub use environment::Environment;
pub use resolver::ConfigResolver;
