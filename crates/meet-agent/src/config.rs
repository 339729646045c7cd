use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{AgentError, AgentResult};

pub const COMPOSIO_HOST: &str = "https://backend.composio.dev/api/v3";
pub const ANTHROPIC_HOST: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_USER_ID: &str = "default";
pub const DEFAULT_MAX_TURNS: usize = 10;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_OAUTH_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Settings for one process, read once at startup and handed to every component.
#[derive(Clone, PartialEq)]
pub struct Config {
    pub composio_api_key: String,
    pub anthropic_api_key: String,
    /// Composio auth config that grants the Google Meet connection
    pub auth_config_id: String,
    /// Optional second auth config for the Google Drive connection
    pub drive_auth_config_id: Option<String>,
    /// Broker-side user (entity) the connections belong to
    pub user_id: String,
    pub model_name: String,
    pub max_turns: usize,
    pub max_tokens: u32,
    pub oauth_timeout: Duration,
    pub poll_interval: Duration,
    pub composio_host: String,
    pub anthropic_host: String,
}

impl Config {
    pub fn new(
        composio_api_key: impl Into<String>,
        anthropic_api_key: impl Into<String>,
        auth_config_id: impl Into<String>,
    ) -> Self {
        Self {
            composio_api_key: composio_api_key.into(),
            anthropic_api_key: anthropic_api_key.into(),
            auth_config_id: auth_config_id.into(),
            drive_auth_config_id: None,
            user_id: DEFAULT_USER_ID.to_string(),
            model_name: DEFAULT_MODEL.to_string(),
            max_turns: DEFAULT_MAX_TURNS,
            max_tokens: DEFAULT_MAX_TOKENS,
            oauth_timeout: Duration::from_secs(DEFAULT_OAUTH_TIMEOUT_SECS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            composio_host: COMPOSIO_HOST.to_string(),
            anthropic_host: ANTHROPIC_HOST.to_string(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> AgentResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> AgentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let composio_api_key = get_env(&lookup, "COMPOSIO_API_KEY", true)?
            .ok_or_else(|| missing("COMPOSIO_API_KEY", "Get one from https://app.composio.dev"))?;
        let anthropic_api_key = get_env(&lookup, "ANTHROPIC_API_KEY", true)?.ok_or_else(
            || missing("ANTHROPIC_API_KEY", "Get one from https://console.anthropic.com"),
        )?;
        let auth_config_id = get_env(&lookup, "COMPOSIO_AUTH_CONFIG_ID", true)?
            .ok_or_else(|| {
                missing(
                    "COMPOSIO_AUTH_CONFIG_ID",
                    "Create a Google Meet auth config at https://app.composio.dev",
                )
            })?;

        let mut config = Self::new(composio_api_key, anthropic_api_key, auth_config_id);

        config.drive_auth_config_id = get_env(&lookup, "COMPOSIO_DRIVE_AUTH_CONFIG_ID", false)?;
        if let Some(user_id) = get_env(&lookup, "GOOGLE_MEET_USER_ID", false)? {
            config.user_id = user_id;
        }
        if let Some(model_name) = get_env(&lookup, "MODEL_NAME", false)? {
            config.model_name = model_name;
        }
        if let Some(host) = get_env(&lookup, "COMPOSIO_API_HOST", false)? {
            config.composio_host = host;
        }
        if let Some(host) = get_env(&lookup, "ANTHROPIC_API_HOST", false)? {
            config.anthropic_host = host;
        }

        config.max_turns = parse_number(&lookup, "AGENT_MAX_TURNS", DEFAULT_MAX_TURNS)?;
        config.max_tokens = parse_number(&lookup, "MAX_TOKENS", DEFAULT_MAX_TOKENS)?;
        config.oauth_timeout = Duration::from_secs(parse_number(
            &lookup,
            "OAUTH_TIMEOUT",
            DEFAULT_OAUTH_TIMEOUT_SECS,
        )?);
        config.poll_interval = Duration::from_secs(parse_number(
            &lookup,
            "OAUTH_POLL_INTERVAL",
            DEFAULT_POLL_INTERVAL_SECS,
        )?);

        if config.max_turns == 0 {
            return Err(AgentError::Configuration(
                "AGENT_MAX_TURNS must be at least 1".to_string(),
            ));
        }
        if config.poll_interval.is_zero() {
            return Err(AgentError::Configuration(
                "OAUTH_POLL_INTERVAL must be at least 1 second".to_string(),
            ));
        }

        Ok(config)
    }
}

// Keys never end up in logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("composio_api_key", &"<redacted>")
            .field("anthropic_api_key", &"<redacted>")
            .field("auth_config_id", &self.auth_config_id)
            .field("drive_auth_config_id", &self.drive_auth_config_id)
            .field("user_id", &self.user_id)
            .field("model_name", &self.model_name)
            .field("max_turns", &self.max_turns)
            .field("max_tokens", &self.max_tokens)
            .field("oauth_timeout", &self.oauth_timeout)
            .field("poll_interval", &self.poll_interval)
            .field("composio_host", &self.composio_host)
            .field("anthropic_host", &self.anthropic_host)
            .finish()
    }
}

/// Helper function to get environment variables with error handling
fn get_env<F>(
    lookup: &F,
    key: &str,
    required: bool,
) -> AgentResult<Option<String>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => Ok(Some(value)),
        _ if !required => Ok(None),
        _ => Err(AgentError::Configuration(format!(
            "Environment variable '{}' is required but not set.",
            key
        ))),
    }
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> AgentResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match get_env(lookup, key, false)? {
        Some(raw) => raw.parse::<T>().map_err(|e| {
            AgentError::Configuration(format!("{} must be a whole number, got '{}': {}", key, raw, e))
        }),
        None => Ok(default),
    }
}

fn missing(key: &str, hint: &str) -> AgentError {
    AgentError::Configuration(format!("{} is required. {}", key, hint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("COMPOSIO_API_KEY", "comp_key"),
            ("ANTHROPIC_API_KEY", "anth_key"),
            ("COMPOSIO_AUTH_CONFIG_ID", "ac_meet"),
        ]
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&required())).unwrap();
        assert_eq!(config.composio_api_key, "comp_key");
        assert_eq!(config.anthropic_api_key, "anth_key");
        assert_eq!(config.auth_config_id, "ac_meet");
        assert_eq!(config.drive_auth_config_id, None);
        assert_eq!(config.user_id, "default");
        assert_eq!(config.model_name, DEFAULT_MODEL);
        assert_eq!(config.max_turns, 10);
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.oauth_timeout, Duration::from_secs(300));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.composio_host, COMPOSIO_HOST);
        assert_eq!(config.anthropic_host, ANTHROPIC_HOST);
    }

    #[test]
    fn test_overrides() {
        let mut vars = required();
        vars.extend([
            ("GOOGLE_MEET_USER_ID", "alice"),
            ("MODEL_NAME", "claude-3-5-haiku-latest"),
            ("AGENT_MAX_TURNS", "4"),
            ("OAUTH_TIMEOUT", "60"),
            ("COMPOSIO_DRIVE_AUTH_CONFIG_ID", "ac_drive"),
        ]);
        let config = Config::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(config.user_id, "alice");
        assert_eq!(config.model_name, "claude-3-5-haiku-latest");
        assert_eq!(config.max_turns, 4);
        assert_eq!(config.oauth_timeout, Duration::from_secs(60));
        assert_eq!(config.drive_auth_config_id.as_deref(), Some("ac_drive"));
    }

    #[test]
    fn test_missing_required_value() {
        for skipped in ["COMPOSIO_API_KEY", "ANTHROPIC_API_KEY", "COMPOSIO_AUTH_CONFIG_ID"] {
            let vars: Vec<_> = required().into_iter().filter(|(k, _)| *k != skipped).collect();
            let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
            assert!(matches!(err, AgentError::Configuration(_)));
            assert!(err.to_string().contains(skipped), "{}", err);
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut vars = required();
        vars[0] = ("COMPOSIO_API_KEY", "   ");
        let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("COMPOSIO_API_KEY"));
    }

    #[test]
    fn test_invalid_number() {
        let mut vars = required();
        vars.push(("AGENT_MAX_TURNS", "lots"));
        let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("AGENT_MAX_TURNS"));
    }

    #[test]
    fn test_zero_turn_ceiling_rejected() {
        let mut vars = required();
        vars.push(("AGENT_MAX_TURNS", "0"));
        assert!(Config::from_lookup(lookup_from(&vars)).is_err());
    }

    #[test]
    fn test_load_is_deterministic() {
        let lookup = lookup_from(&required());
        let first = Config::from_lookup(&lookup).unwrap();
        let second = Config::from_lookup(&lookup).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = Config::from_lookup(lookup_from(&required())).unwrap();
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("comp_key"));
        assert!(!debug_output.contains("anth_key"));
        assert!(debug_output.contains("ac_meet"));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        let keys = ["COMPOSIO_API_KEY", "ANTHROPIC_API_KEY", "COMPOSIO_AUTH_CONFIG_ID"];
        let saved: Vec<_> = keys.iter().map(|k| (k, env::var(k).ok())).collect();

        env::set_var("COMPOSIO_API_KEY", "env_comp");
        env::set_var("ANTHROPIC_API_KEY", "env_anth");
        env::set_var("COMPOSIO_AUTH_CONFIG_ID", "ac_env");
        let config = Config::from_env();

        for (key, value) in saved {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }

        let config = config.unwrap();
        assert_eq!(config.composio_api_key, "env_comp");
        assert_eq!(config.auth_config_id, "ac_env");
    }
}
