//! CLI module for the Vidu MCP server.

pub mod commands;
mod output;

pub use output::{mask_secret, Output};

use clap::{Parser, Subcommand};

/// Vidu MCP - video generation tools for AI assistants
///
/// Serves the Vidu text, image, reference, start/end frame and template
/// video generation APIs as MCP tools over stdio.
#[derive(Parser, Debug)]
#[command(name = "vidu-mcp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the MCP server on stdio for AI assistant integration
    Mcp,

    /// Wait for an existing generation task and print its result
    Query {
        /// Task id returned by a generation call
        task_id: String,
    },

    /// Check credentials and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration (API key masked)
    Show,

    /// Show configuration file path
    Path,
}
