//! The managed-auth broker boundary: connection status, authorization,
//! tool listing and tool execution. Everything OAuth lives on the other side.
pub mod composio;

use serde_json::Value;
use strum_macros::Display;
use thiserror::Error;

use crate::models::tool::{Tool, Toolkit};

/// Broker-side state of a user's connection, ordered from least to most usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionStatus {
    Absent,
    Pending,
    Active,
}

impl ConnectionStatus {
    /// Map a broker status string onto the three states we act on
    pub fn from_broker(status: &str) -> Self {
        match status.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => ConnectionStatus::Active,
            "INITIATED" | "INITIALIZING" | "PENDING" => ConnectionStatus::Pending,
            _ => ConnectionStatus::Absent,
        }
    }
}

/// A started authorization the user still has to complete in a browser
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationRequest {
    pub connection_id: String,
    pub redirect_url: String,
}

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Api(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl BrokerError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BrokerError::Http { status, .. } => Some(*status),
            BrokerError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Capabilities we need from the broker, kept small so tests can fake them
pub trait Broker {
    fn connection_status(
        &self,
        user_id: &str,
        auth_config_id: &str,
    ) -> Result<ConnectionStatus, BrokerError>;

    fn authorize(
        &self,
        user_id: &str,
        auth_config_id: &str,
    ) -> Result<AuthorizationRequest, BrokerError>;

    fn list_tools(&self, user_id: &str, toolkit: Toolkit) -> Result<Vec<Tool>, BrokerError>;

    fn execute_tool(
        &self,
        user_id: &str,
        tool_name: &str,
        arguments: &Value,
    ) -> Result<Value, BrokerError>;
}
