pub mod interface;
pub mod types;

pub use interface::ClaudeCodeInterface;
pub use types::*;
