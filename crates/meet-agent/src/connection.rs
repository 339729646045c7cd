use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::broker::{AuthorizationRequest, Broker, ConnectionStatus};
use crate::config::Config;
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::Toolkit;

/// Shows the user where to grant access. Implementations usually print the URL
/// and try to open a browser.
pub trait ConsentPrompt {
    fn present(&self, toolkit: Toolkit, request: &AuthorizationRequest);
}

/// Logs the consent URL; used when no interactive prompt is attached
pub struct LogConsent;

impl ConsentPrompt for LogConsent {
    fn present(&self, toolkit: Toolkit, request: &AuthorizationRequest) {
        warn!(
            %toolkit,
            url = %request.redirect_url,
            "Authorization required, open the URL to grant access"
        );
    }
}

/// Makes sure a user's connection to a toolkit is active, running the
/// browser consent flow when it is not.
pub struct ConnectionBootstrapper<'a> {
    broker: &'a dyn Broker,
    config: &'a Config,
}

impl<'a> ConnectionBootstrapper<'a> {
    pub fn new(broker: &'a dyn Broker, config: &'a Config) -> Self {
        Self { broker, config }
    }

    pub fn ensure_connected(
        &self,
        toolkit: Toolkit,
        auth_config_id: &str,
        consent: &dyn ConsentPrompt,
    ) -> AgentResult<()> {
        let user_id = self.config.user_id.as_str();

        match self.status(user_id, auth_config_id)? {
            ConnectionStatus::Active => {
                info!(user_id, %toolkit, "Using existing connection");
                return Ok(());
            }
            status => debug!(user_id, %toolkit, %status, "No active connection"),
        }

        let request = self
            .broker
            .authorize(user_id, auth_config_id)
            .map_err(|e| {
                AgentError::Connection(format!("Failed to start {} authorization: {}", toolkit, e))
            })?;
        info!(connection_id = %request.connection_id, %toolkit, "Authorization initiated");
        consent.present(toolkit, &request);

        self.wait_for_active(user_id, auth_config_id, toolkit)
    }

    fn wait_for_active(&self, user_id: &str, auth_config_id: &str, toolkit: Toolkit) -> AgentResult<()> {
        // a timeout too large to represent means waiting indefinitely
        let deadline = Instant::now().checked_add(self.config.oauth_timeout);

        loop {
            thread::sleep(self.config.poll_interval);

            if self.status(user_id, auth_config_id)? == ConnectionStatus::Active {
                info!(user_id, %toolkit, "Connection established");
                return Ok(());
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                warn!(user_id, %toolkit, "Timed out waiting for authorization");
                return Err(AgentError::ConnectionTimeout {
                    timeout_secs: self.config.oauth_timeout.as_secs(),
                });
            }
        }
    }

    fn status(&self, user_id: &str, auth_config_id: &str) -> AgentResult<ConnectionStatus> {
        self.broker
            .connection_status(user_id, auth_config_id)
            .map_err(|e| AgentError::Connection(format!("Failed to check connection: {}", e)))
    }
}
