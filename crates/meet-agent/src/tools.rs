use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::broker::{Broker, BrokerError};
use crate::config::Config;
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::{Tool, ToolSummary, Toolkit};

pub const DRIVE_LIST_FILES: &str = "GOOGLEDRIVE_LIST_FILES";
pub const DRIVE_DOWNLOAD_FILE: &str = "GOOGLEDRIVE_DOWNLOAD_FILE";
pub const DRIVE_GET_FILE_METADATA: &str = "GOOGLEDRIVE_GET_FILE_METADATA";

/// The Drive tools needed to find and read Gemini meeting notes
pub const DRIVE_NOTES_TOOLS: [&str; 3] = [DRIVE_LIST_FILES, DRIVE_DOWNLOAD_FILE, DRIVE_GET_FILE_METADATA];

/// Discovers the tools the broker offers for the configured user
pub struct ToolRegistry<'a> {
    broker: &'a dyn Broker,
    config: &'a Config,
}

impl<'a> ToolRegistry<'a> {
    pub fn new(broker: &'a dyn Broker, config: &'a Config) -> Self {
        Self { broker, config }
    }

    /// Fetch every tool of the given toolkits, in toolkit order
    pub fn list_tools(&self, toolkits: &[Toolkit]) -> AgentResult<Vec<Tool>> {
        let mut tools = Vec::new();
        for toolkit in toolkits {
            info!(user_id = %self.config.user_id, %toolkit, "Fetching tools");
            let listed = self
                .broker
                .list_tools(&self.config.user_id, *toolkit)
                .map_err(|e| {
                    error!(%toolkit, error = %e, "Failed to fetch tools");
                    AgentError::ToolDiscovery(format!("{}: {}", toolkit, e))
                })?;
            info!(
                %toolkit,
                tools = ?listed.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
                "Discovered {} tools",
                listed.len()
            );
            tools.extend(listed);
        }
        Ok(tools)
    }

    /// The tools for one session: all of Meet, plus the Drive notes subset when Drive is reachable
    pub fn session_tools(&self) -> AgentResult<Vec<Tool>> {
        let mut tools = self.list_tools(&[Toolkit::GoogleMeet])?;

        match self.list_tools(&[Toolkit::GoogleDrive]) {
            Ok(drive_tools) => {
                tools.extend(
                    drive_tools
                        .into_iter()
                        .filter(|tool| DRIVE_NOTES_TOOLS.contains(&tool.name.as_str())),
                );
            }
            Err(e) => {
                warn!(error = %e, "Could not fetch Google Drive tools, continuing with Google Meet only");
            }
        }

        Ok(tools)
    }
}

pub fn summarize(tools: &[Tool]) -> Vec<ToolSummary> {
    tools.iter().map(ToolSummary::from).collect()
}

/// Forwards model-chosen tool calls to the broker, one at a time
pub struct ToolExecutor<'a> {
    broker: &'a dyn Broker,
    config: &'a Config,
    tools: &'a [Tool],
}

impl<'a> ToolExecutor<'a> {
    pub fn new(broker: &'a dyn Broker, config: &'a Config, tools: &'a [Tool]) -> Self {
        Self {
            broker,
            config,
            tools,
        }
    }

    /// The tools offered to the model for this session
    pub fn tools(&self) -> &'a [Tool] {
        self.tools
    }

    pub fn execute(&self, tool_name: &str, arguments: &Value) -> AgentResult<Value> {
        if !self.tools.iter().any(|tool| tool.name == tool_name) {
            return Err(AgentError::ToolExecution {
                tool: tool_name.to_string(),
                status: None,
                message: format!("Tool not found: {}", tool_name),
            });
        }

        debug!(tool = tool_name, %arguments, "Executing tool");
        self.broker
            .execute_tool(&self.config.user_id, tool_name, arguments)
            .map_err(|e| {
                error!(tool = tool_name, error = %e, "Tool execution failed");
                describe_failure(tool_name, e)
            })
    }
}

fn describe_failure(tool_name: &str, err: BrokerError) -> AgentError {
    let status = err.status();
    let service = match Toolkit::for_tool(tool_name) {
        Some(toolkit) => toolkit.to_string(),
        None => "the service".to_string(),
    };
    let message = match status {
        Some(401) => format!(
            "No active {} connection authorizes {}. Please run setup first. ({})",
            service, tool_name, err
        ),
        Some(403) => format!(
            "Permission denied. Ensure you have a Google Workspace account with {} API access. ({})",
            service, err
        ),
        Some(404) => format!("Resource not found: {} ({})", tool_name, err),
        Some(429) => format!("{} rate limit exceeded. ({})", service, err),
        _ => format!("Failed to execute {}: {}", tool_name, err),
    };

    AgentError::ToolExecution {
        tool: tool_name.to_string(),
        status,
        message,
    }
}
