//! Upstream service configuration.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a spam detection expert. Analyze the given text and \
determine if it's spam or not. Provide a confidence score and explanation.";

/// Where and how to reach the analysis service.
///
/// ```toml
/// [upstream]
/// url = "https://api.deepseek.com/v1/chat/completions"
/// model = "deepseek-chat"
/// api_key_env = "DEEPSEEK_API_KEY"
/// temperature = 0.3
/// timeout_secs = 30
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_", into)]
#[builder(default, setter(into))]
pub struct UpstreamConfig {
    /// Chat-completions endpoint
    #[serde(default = "default_url")]
    url: String,

    /// Default model identifier
    #[serde(default = "default_model")]
    model: String,

    /// Environment variable holding the service API key
    #[serde(default = "default_api_key_env")]
    api_key_env: String,

    /// Default sampling temperature
    #[serde(default = "default_temperature")]
    temperature: f32,

    /// System prompt framing the analysis
    #[serde(default = "default_system_prompt")]
    system_prompt: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_url() -> String {
    "https://api.deepseek.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_api_key_env() -> String {
    "DEEPSEEK_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
