use std::env;
use std::time::Duration;

const DEFAULT_API_HOSTNAME: &str = "https://api.groq.com/openai";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SYSTEM_MESSAGE: &str = "You are Pandora, a snarky but helpful chatbot. \
You are an expert in the lunar trading theory for Bitcoin. Your personality is sharp, \
witty, and a bit cynical, but you always provide accurate, helpful information, \
especially for newbies. Never break character.";

// Generation parameters are part of the deployment, not the request
pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Credential for the completion provider. Checked per request so the
    /// server can start without it and report a configuration error.
    pub api_key: Option<String>,
    pub api_hostname: String,
    pub model: String,
    pub system_message: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Longest quiet period tolerated on the upstream stream
    pub idle_timeout: Duration,
}

impl AppConfig {
    /// Build the config from a variable lookup. `Default` uses the process
    /// environment.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = var("GROQ_API_KEY").filter(|key| !key.trim().is_empty());
        let api_hostname =
            var("PANDORA_LLM_HOST").unwrap_or_else(|| DEFAULT_API_HOSTNAME.to_string());
        let model = var("PANDORA_LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let system_message = var("PANDORA_SYSTEM_MESSAGE")
            .unwrap_or_else(|| DEFAULT_SYSTEM_MESSAGE.to_string());
        let idle_timeout_secs = match var("PANDORA_IDLE_TIMEOUT_SECS") {
            // Zero would stall every relay on its first read
            Some(raw) => raw
                .parse()
                .ok()
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or_else(|| {
                    tracing::warn!(
                        "Ignoring invalid PANDORA_IDLE_TIMEOUT_SECS {:?}, using {}",
                        raw,
                        DEFAULT_IDLE_TIMEOUT_SECS
                    );
                    DEFAULT_IDLE_TIMEOUT_SECS
                }),
            None => DEFAULT_IDLE_TIMEOUT_SECS,
        };

        Self {
            api_key,
            api_hostname,
            model,
            system_message,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            idle_timeout: Duration::from_secs(idle_timeout_secs),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }
}
