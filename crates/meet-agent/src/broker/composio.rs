use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::USER_AGENT;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use super::{AuthorizationRequest, Broker, BrokerError, ConnectionStatus};
use crate::config::Config;
use crate::models::tool::{Tool, Toolkit};
use crate::tools::DRIVE_DOWNLOAD_FILE;

const TOOL_LIST_LIMIT: &str = "200";
const FILE_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct ItemList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize)]
struct ConnectedAccount {
    #[serde(default)]
    status: String,
}

#[derive(Deserialize)]
struct InitiatedConnection {
    #[serde(default)]
    id: String,
    #[serde(alias = "redirectUrl")]
    redirect_url: Option<String>,
}

#[derive(Deserialize)]
struct ListedTool {
    slug: Option<String>,
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(alias = "input_schema", alias = "inputSchema", alias = "parameters")]
    input_parameters: Option<Value>,
}

#[derive(Deserialize)]
struct ExecutionResult {
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default = "default_successful")]
    successful: bool,
}

fn default_successful() -> bool {
    true
}

/// Broker client for the Composio v3 REST API
pub struct ComposioClient {
    client: Client,
    host: String,
    api_key: String,
}

impl ComposioClient {
    pub fn new<H: Into<String>, K: Into<String>>(host: H, api_key: K) -> Result<Self, BrokerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            host: host.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, BrokerError> {
        Self::new(&config.composio_host, &config.composio_api_key)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.host.trim_end_matches('/'), path)
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, BrokerError> {
        let response = self
            .client
            .get(self.url(path))
            .header("x-api-key", &self.api_key)
            .query(query)
            .send()?;
        Self::handle(response)
    }

    fn post(&self, path: &str, payload: &Value) -> Result<Value, BrokerError> {
        let response = self
            .client
            .post(self.url(path))
            .header("x-api-key", &self.api_key)
            .json(payload)
            .send()?;
        Self::handle(response)
    }

    fn handle(response: Response) -> Result<Value, BrokerError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json()?)
        } else {
            let body = response.text().unwrap_or_default();
            Err(BrokerError::Http {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn decode<T: DeserializeOwned>(value: Value) -> Result<T, BrokerError> {
        serde_json::from_value(value).map_err(|e| BrokerError::Decode(e.to_string()))
    }

    fn fetch_text(&self, url: &str) -> Result<String, BrokerError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, "meet-agent/0.1")
            .timeout(FILE_FETCH_TIMEOUT)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(BrokerError::Http {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        let bytes = response.bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Drive downloads come back as a short-lived URL; swap it for the document text
    fn inline_downloaded_content(&self, data: &mut Value) {
        let Some(url) = data
            .pointer("/downloaded_file_content/s3url")
            .and_then(Value::as_str)
            .map(str::to_owned)
        else {
            return;
        };

        info!("Fetching file content from temporary URL");
        let content = self.fetch_text(&url).unwrap_or_else(|e| {
            error!(error = %e, "Failed to fetch downloaded file content");
            format!("Error fetching content: {}", e)
        });

        if let Some(downloaded) = data
            .get_mut("downloaded_file_content")
            .and_then(Value::as_object_mut)
        {
            downloaded.remove("s3url");
        }
        if let Some(object) = data.as_object_mut() {
            object.insert("file_content".to_string(), json!(content));
            object.insert("content_fetched".to_string(), json!(true));
        }
    }
}

/// Tool schemas must be JSON objects with `type` and `properties`
pub fn normalize_schema(schema: Option<Value>) -> Value {
    let mut schema = match schema {
        Some(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    schema
        .entry("type")
        .or_insert_with(|| json!("object"));
    schema
        .entry("properties")
        .or_insert_with(|| json!({}));
    Value::Object(schema)
}

impl Broker for ComposioClient {
    fn connection_status(
        &self,
        user_id: &str,
        auth_config_id: &str,
    ) -> Result<ConnectionStatus, BrokerError> {
        let response = self.get(
            "connected_accounts",
            &[("user_ids", user_id), ("auth_config_ids", auth_config_id)],
        )?;
        let accounts: ItemList<ConnectedAccount> = Self::decode(response)?;

        let status = accounts
            .items
            .iter()
            .map(|account| ConnectionStatus::from_broker(&account.status))
            .max()
            .unwrap_or(ConnectionStatus::Absent);
        debug!(user_id, auth_config_id, %status, "Checked connection status");
        Ok(status)
    }

    fn authorize(
        &self,
        user_id: &str,
        auth_config_id: &str,
    ) -> Result<AuthorizationRequest, BrokerError> {
        let payload = json!({
            "auth_config": { "id": auth_config_id },
            "connection": { "user_id": user_id }
        });
        let response = self.post("connected_accounts", &payload)?;
        let initiated: InitiatedConnection = Self::decode(response)?;

        let redirect_url = initiated
            .redirect_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| BrokerError::Api("Could not get OAuth URL from Composio.".to_string()))?;

        Ok(AuthorizationRequest {
            connection_id: initiated.id,
            redirect_url,
        })
    }

    fn list_tools(&self, _user_id: &str, toolkit: Toolkit) -> Result<Vec<Tool>, BrokerError> {
        let response = self.get(
            "tools",
            &[("toolkit_slug", toolkit.slug()), ("limit", TOOL_LIST_LIMIT)],
        )?;
        let listed: ItemList<ListedTool> = Self::decode(response)?;

        let tools = listed
            .items
            .into_iter()
            .filter_map(|tool| {
                let name = tool.slug.or(tool.name).filter(|n| !n.is_empty())?;
                Some(Tool::new(
                    name,
                    tool.description.unwrap_or_default(),
                    normalize_schema(tool.input_parameters),
                    toolkit,
                ))
            })
            .collect();
        Ok(tools)
    }

    fn execute_tool(
        &self,
        user_id: &str,
        tool_name: &str,
        arguments: &Value,
    ) -> Result<Value, BrokerError> {
        let arguments = if arguments.is_null() {
            json!({})
        } else {
            arguments.clone()
        };
        let payload = json!({
            "user_id": user_id,
            "arguments": arguments
        });
        let response = self.post(&format!("tools/execute/{}", tool_name), &payload)?;
        let result: ExecutionResult = Self::decode(response)?;

        match result.error {
            Some(Value::String(message)) if !message.is_empty() => {
                return Err(BrokerError::Api(format!("API Error: {}", message)))
            }
            Some(Value::String(_)) | Some(Value::Null) | None => {}
            Some(other) => return Err(BrokerError::Api(format!("API Error: {}", other))),
        }
        if !result.successful {
            return Err(BrokerError::Api(format!("{} did not succeed", tool_name)));
        }

        let mut data = result.data;
        if tool_name == DRIVE_DOWNLOAD_FILE {
            self.inline_downloaded_content(&mut data);
        }
        Ok(data)
    }
}
