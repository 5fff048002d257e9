//! docker-mcp library
//!
//! Deploys and inspects containers on the host Docker runtime on behalf of
//! MCP clients.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod logs;
pub mod models;
pub mod runtime;
pub mod server;
pub mod storage;
pub mod utils;
