use crate::config::Config;

pub struct AnthropicProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

impl AnthropicProviderConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.anthropic_host.clone(),
            api_key: config.anthropic_api_key.clone(),
            model: config.model_name.clone(),
            max_tokens: config.max_tokens,
        }
    }
}
