//! MCP server and HTTP transport

pub mod handlers;
pub mod serve;
pub mod tools;
