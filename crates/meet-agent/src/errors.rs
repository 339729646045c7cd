use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("OAuth flow timed out after {timeout_secs} seconds. Please try again.")]
    ConnectionTimeout { timeout_secs: u64 },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Failed to fetch tools: {0}")]
    ToolDiscovery(String),

    #[error("{message}")]
    ToolExecution {
        tool: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Claude API error: {0}")]
    Llm(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentError {
    /// Short name of the failure class, reported to the model alongside the message
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::Configuration(_) => "ConfigurationError",
            AgentError::ConnectionTimeout { .. } => "ConnectionTimeoutError",
            AgentError::Connection(_) => "ConnectionError",
            AgentError::ToolDiscovery(_) => "ToolDiscoveryError",
            AgentError::ToolExecution { .. } => "ToolExecutionError",
            AgentError::Llm(_) => "LlmError",
            AgentError::Internal(_) => "InternalError",
        }
    }
}

pub type AgentResult<T> = Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_the_limit() {
        let err = AgentError::ConnectionTimeout { timeout_secs: 300 };
        assert_eq!(
            err.to_string(),
            "OAuth flow timed out after 300 seconds. Please try again."
        );
        assert_eq!(err.kind(), "ConnectionTimeoutError");
    }

    #[test]
    fn test_tool_execution_displays_message_only() {
        let err = AgentError::ToolExecution {
            tool: "GOOGLEMEET_LIST_CONFERENCE_RECORDS".to_string(),
            status: Some(404),
            message: "Resource not found".to_string(),
        };
        assert_eq!(err.to_string(), "Resource not found");
    }

    #[test]
    fn test_error_serialization() -> anyhow::Result<()> {
        let err = AgentError::ToolDiscovery("network down".to_string());
        let serialized = serde_json::to_string(&err)?;
        let deserialized: AgentError = serde_json::from_str(&serialized)?;
        assert_eq!(err, deserialized);
        Ok(())
    }
}
