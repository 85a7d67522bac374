//! Error types for the Vidu MCP server.

use thiserror::Error;

/// Library-level error type for Vidu operations.
#[derive(Error, Debug)]
pub enum ViduError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("API Error: {message}, please check your API key and API host. Trace-Id: {}", .trace_id.as_deref().unwrap_or("none"))]
    AuthFailed {
        message: String,
        trace_id: Option<String>,
    },

    #[error("{0}")]
    RequestFailed(String),

    #[error("Video generation failed for task_id: {task_id}")]
    GenerationFailed { task_id: String },

    #[error("{0}")]
    MalformedResponse(String),

    #[error("Failed to get creation_url for task_id: {task_id} after {attempts} attempts")]
    Timeout { task_id: String, attempts: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ViduError {
    /// Whether the failure came from input validation or the upstream API,
    /// as opposed to something unexpected inside the server.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            ViduError::InvalidInput(_)
                | ViduError::AuthFailed { .. }
                | ViduError::RequestFailed(_)
                | ViduError::GenerationFailed { .. }
                | ViduError::MalformedResponse(_)
                | ViduError::Timeout { .. }
                | ViduError::Io(_)
                | ViduError::Http(_)
        )
    }

    /// Render the error as the string handed back to the tool host.
    pub fn to_tool_output(&self) -> String {
        if self.is_expected() {
            format!("Error: {}", self)
        } else {
            format!("Error generating video: {}", self)
        }
    }
}

/// Result type alias for Vidu operations.
pub type Result<T> = std::result::Result<T, ViduError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failed_message_carries_trace_id() {
        let err = ViduError::AuthFailed {
            message: "invalid token".to_string(),
            trace_id: Some("abc-123".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("invalid token"));
        assert!(msg.ends_with("Trace-Id: abc-123"));
    }

    #[test]
    fn test_tool_output_prefixes() {
        let err = ViduError::InvalidInput("prompt is required".to_string());
        assert_eq!(err.to_tool_output(), "Error: prompt is required");

        let err = ViduError::Config("missing".to_string());
        assert_eq!(
            err.to_tool_output(),
            "Error generating video: Configuration error: missing"
        );
    }

    #[test]
    fn test_timeout_is_expected() {
        let err = ViduError::Timeout {
            task_id: "42".to_string(),
            attempts: 30,
        };
        assert!(err.is_expected());
        assert!(err.to_tool_output().starts_with("Error: "));
    }
}
