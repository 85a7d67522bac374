//! Configuration module for the Vidu MCP server.
//!
//! Handles loading settings from the config file and environment.

mod settings;

pub use settings::{ApiSettings, Credentials, GeneralSettings, PollingSettings, Settings};
