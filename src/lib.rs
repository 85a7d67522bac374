//! Vidu MCP - video generation tools for AI assistants
//!
//! Exposes the Vidu video generation API as a set of MCP tools.
//!
//! # Overview
//!
//! Each tool call:
//! - validates the mode-specific required fields
//! - inlines local image files as data URIs
//! - submits the generation job and polls until it finishes
//! - returns the task id and video URL as JSON, or an `Error: ...` string
//!
//! # Architecture
//!
//! - `config` - Settings from the config file and environment
//! - `image` - Image reference normalization
//! - `vidu` - HTTP client, wire types and the task poller
//! - `generation` - Per-mode request validation and payload shaping
//! - `mcp` - JSON-RPC server over stdio
//! - `cli` - Command line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use vidu_mcp::config::Settings;
//! use vidu_mcp::generation::{generate, GenerationRequest, TextToVideo};
//! use vidu_mcp::vidu::ViduClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let client = ViduClient::new(&settings.credentials()?, settings.request_timeout())?;
//!
//!     let request = GenerationRequest::TextToVideo(TextToVideo {
//!         prompt: "A paper boat drifting down a rainy street".to_string(),
//!         ..Default::default()
//!     });
//!     let result = generate(&client, &settings.poll_config(), &request).await?;
//!     println!("{}", result.video_url);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod image;
pub mod mcp;
pub mod vidu;

pub use error::{Result, ViduError};
