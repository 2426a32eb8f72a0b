// Tool server over the xoso wager engine
pub mod config;
pub mod loader;
pub mod mcp_handler;
pub mod types;
pub mod use_cases;
pub mod utils;

pub use loader::Snapshots;
pub use mcp_handler::{MCPHandler, stdio};
