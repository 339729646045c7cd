use chrono::{Local, NaiveDate};
use tracing::{error, info};

use crate::broker::composio::ComposioClient;
use crate::broker::Broker;
use crate::config::Config;
use crate::connection::{ConnectionBootstrapper, ConsentPrompt, LogConsent};
use crate::conversation::{Orchestrator, Outcome};
use crate::errors::{AgentError, AgentResult};
use crate::models::response::Response;
use crate::models::tool::{Tool, ToolSummary, Toolkit};
use crate::models::transcript::Transcript;
use crate::prompt_template::system_prompt;
use crate::providers::anthropic::AnthropicProvider;
use crate::providers::base::Provider;
use crate::providers::configs::AnthropicProviderConfig;
use crate::tools::{summarize, ToolExecutor, ToolRegistry};

/// Answers natural-language questions about past Google Meet meetings by
/// letting the model drive Meet and Drive tools through the broker.
pub struct Agent {
    config: Config,
    broker: Box<dyn Broker>,
    provider: Box<dyn Provider>,
    consent: Box<dyn ConsentPrompt>,
    tools: Option<Vec<Tool>>,
    is_setup: bool,
}

impl Agent {
    pub fn new(config: Config, broker: Box<dyn Broker>, provider: Box<dyn Provider>) -> Self {
        Self {
            config,
            broker,
            provider,
            consent: Box::new(LogConsent),
            tools: None,
            is_setup: false,
        }
    }

    /// Build an agent talking to Composio and Anthropic
    pub fn from_config(config: Config) -> AgentResult<Self> {
        let broker = ComposioClient::from_config(&config)
            .map_err(|e| AgentError::Configuration(format!("Composio client: {}", e)))?;
        let provider = AnthropicProvider::new(AnthropicProviderConfig::from_config(&config))
            .map_err(|e| AgentError::Configuration(format!("Anthropic client: {}", e)))?;
        Ok(Self::new(config, Box::new(broker), Box::new(provider)))
    }

    /// Replace how consent URLs reach the user during setup
    pub fn with_consent(mut self, consent: Box<dyn ConsentPrompt>) -> Self {
        self.consent = consent;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn user_id(&self) -> &str {
        &self.config.user_id
    }

    pub fn is_setup(&self) -> bool {
        self.is_setup
    }

    /// Make sure the Meet connection, and the Drive one when configured, are active.
    ///
    /// Blocks while the user completes consent in a browser. Queries run this
    /// on first use when it has not been called.
    pub fn setup(&mut self) -> AgentResult<()> {
        let bootstrapper = ConnectionBootstrapper::new(self.broker.as_ref(), &self.config);
        let consent = self.consent.as_ref();

        bootstrapper.ensure_connected(Toolkit::GoogleMeet, &self.config.auth_config_id, consent)?;
        if let Some(drive_auth_config_id) = &self.config.drive_auth_config_id {
            bootstrapper.ensure_connected(Toolkit::GoogleDrive, drive_auth_config_id, consent)?;
        }

        self.is_setup = true;
        info!(user_id = %self.config.user_id, "Agent setup complete");
        Ok(())
    }

    /// Tools offered to the model, fetched once per agent
    pub fn tools(&mut self) -> AgentResult<&[Tool]> {
        if self.tools.is_none() {
            let tools = ToolRegistry::new(self.broker.as_ref(), &self.config).session_tools()?;
            self.tools = Some(tools);
        }
        Ok(self.tools.as_deref().unwrap_or_default())
    }

    pub fn list_available_tools(&mut self) -> AgentResult<Vec<ToolSummary>> {
        Ok(summarize(self.tools()?))
    }

    pub fn query(&mut self, query: &str) -> Response {
        let max_turns = self.config.max_turns;
        self.query_with_max_turns(query, max_turns)
    }

    pub fn query_with_max_turns(&mut self, query: &str, max_turns: usize) -> Response {
        match self.converse(query, max_turns) {
            Ok((outcome, _)) => Response::from(outcome),
            Err(e) => {
                error!(error = %e, "Query failed");
                Response::failure(e.to_string())
            }
        }
    }

    /// Run one query and keep its transcript
    pub fn converse(&mut self, query: &str, max_turns: usize) -> AgentResult<(Outcome, Transcript)> {
        self.converse_on(query, max_turns, Local::now().date_naive())
    }

    fn converse_on(
        &mut self,
        query: &str,
        max_turns: usize,
        today: NaiveDate,
    ) -> AgentResult<(Outcome, Transcript)> {
        info!(query, "Processing query");
        if !self.is_setup {
            self.setup()?;
        }
        self.tools()?;
        let tools = self.tools.as_deref().unwrap_or_default();

        let drive_enabled = tools.iter().any(|tool| tool.toolkit == Toolkit::GoogleDrive);
        let system = system_prompt(today, drive_enabled)
            .map_err(|e| AgentError::Internal(format!("Failed to render system prompt: {}", e)))?;

        let executor = ToolExecutor::new(self.broker.as_ref(), &self.config, tools);
        let orchestrator = Orchestrator::new(self.provider.as_ref(), &executor, max_turns.max(1));
        Ok(orchestrator.run(&system, query))
    }

    pub fn list_conferences(&mut self, limit: usize) -> Response {
        self.query(&format!(
            "List my {} most recent Google Meet conferences. For each, show the meeting code, date/time, and duration.",
            limit
        ))
    }

    pub fn get_conference(&mut self, conference_id: &str) -> Response {
        self.query(&format!(
            "Get full details for Google Meet conference: {}",
            conference_id
        ))
    }

    pub fn get_participants(&mut self, conference_id: &str) -> Response {
        self.query(&format!(
            "List all participants who attended Google Meet conference: {}. Include their names, emails (if available), and join/leave times.",
            conference_id
        ))
    }

    pub fn get_transcript(&mut self, conference_id: &str) -> Response {
        self.query(&format!(
            "Get the transcript for Google Meet conference: {}. Include speaker names and timestamps.",
            conference_id
        ))
    }

    pub fn get_meeting_notes(&mut self, conference_id: &str) -> Response {
        self.query(&format!(
            "Find the Gemini meeting notes for Google Meet conference: {}. Search Google Drive for the notes document and show its content.",
            conference_id
        ))
    }
}
