/// Output formatting for tool results
pub mod format;
/// MCP tool handler
pub mod tools;

pub use tools::ApiDocs;
