//! MCP (Model Context Protocol) server for Vidu.
//!
//! Exposes the video generation modes as tools to AI assistants.
//! Implements JSON-RPC 2.0 over stdio.

mod protocol;
mod server;
mod tools;

pub use server::McpServer;
