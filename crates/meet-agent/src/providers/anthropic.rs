use anyhow::{anyhow, Result};
use reqwest::blocking::Client; // we are using blocking API here to make sync calls
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::base::{Provider, Reply, Usage};
use super::configs::AnthropicProviderConfig;
use super::utils::{
    anthropic_response_to_reply, get_usage, tools_to_anthropic_spec, transcript_to_anthropic_spec,
};
use crate::models::tool::Tool;
use crate::models::transcript::Transcript;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: Client,
    config: AnthropicProviderConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    fn post(&self, payload: Value) -> Result<Value> {
        let url = format!("{}/v1/messages", self.config.host.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload)
            .send()?;

        match response.status() {
            StatusCode::OK => Ok(response.json()?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                let error_text = response.text().unwrap_or_default();
                Err(anyhow!("Server error: {} - {}", status, error_text))
            }
            status => {
                let error_text = response.text().unwrap_or_default();
                Err(anyhow!("Request failed: {} - {}", status, error_text))
            }
        }
    }
}

impl Provider for AnthropicProvider {
    fn complete(
        &self,
        system: &str,
        transcript: &Transcript,
        tools: &[Tool],
    ) -> Result<(Reply, Usage)> {
        let mut payload = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": system,
            "messages": transcript_to_anthropic_spec(transcript),
        });

        if !tools.is_empty() {
            if let Some(object) = payload.as_object_mut() {
                object.insert("tools".to_string(), json!(tools_to_anthropic_spec(tools)?));
            }
        }

        let response = self.post(payload)?;

        if let Some(error) = response.get("error") {
            return Err(anyhow!("Anthropic API error: {}", error));
        }

        let stop_reason = response
            .get("stop_reason")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown");
        debug!(stop_reason, "Received model reply");
        let reply = anthropic_response_to_reply(&response)?;
        let usage = get_usage(&response);

        Ok((reply, usage))
    }
}
