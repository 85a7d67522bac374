//! MCP command implementation.

use crate::config::Settings;
use crate::mcp::McpServer;
use crate::vidu::ViduClient;
use anyhow::Result;
use std::sync::Arc;

/// Run the MCP server.
///
/// Missing credentials are fatal here, before any request is read.
pub async fn run_mcp(settings: Settings) -> Result<()> {
    let credentials = settings.credentials()?;
    let client = ViduClient::new(&credentials, settings.request_timeout())?;

    let server = McpServer::new(Arc::new(client), settings.poll_config());
    server.run().await
}
