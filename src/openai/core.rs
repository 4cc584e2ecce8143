use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::AppConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
// Per read, so a long but active stream is never cut off. The relay's own
// idle timeout is normally hit first.
const READ_TIMEOUT: Duration = Duration::from_secs(60 * 5);

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "system" => Some(Role::System),
            "assistant" => Some(Role::Assistant),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
        }
    }
}

/// Body of a streaming chat completion request.
#[derive(Serialize, Debug)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Server configuration error: GROQ_API_KEY is missing.")]
    MissingCredential,

    #[error("Upstream API error: {status}")]
    Rejected { status: StatusCode, body: String },

    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Raw bytes of an upstream response body, as they arrive.
pub type ByteStream = BoxStream<'static, reqwest::Result<Bytes>>;

/// Client for an OpenAI compatible chat completions endpoint.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    api_hostname: String,
    api_key: Option<String>,
    model: String,
    system_message: String,
    temperature: f32,
    max_tokens: u32,
}

impl UpstreamClient {
    pub fn new(config: &AppConfig) -> Result<Self, UpstreamError> {
        Self::with_read_timeout(config, READ_TIMEOUT)
    }

    fn with_read_timeout(
        config: &AppConfig,
        read_timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(read_timeout)
            .build()?;

        Ok(Self {
            http,
            api_hostname: config.api_hostname.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            system_message: config.system_message.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.api_hostname.trim_end_matches('/')
        )
    }

    /// The request sent upstream for a conversation, system prompt first.
    pub fn request_body(&self, messages: &[ChatMessage]) -> CompletionRequest<'_> {
        let mut all = Vec::with_capacity(messages.len() + 1);
        all.push(ChatMessage::new(Role::System, &self.system_message));
        all.extend_from_slice(messages);

        CompletionRequest {
            model: &self.model,
            messages: all,
            stream: true,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Start a streaming completion.
    ///
    /// Fails before touching the network when no credential is configured.
    /// A non-success status is returned as [`UpstreamError::Rejected`] with
    /// the provider's body, so the caller can still pick its own status.
    pub async fn open_stream(&self, messages: &[ChatMessage]) -> Result<ByteStream, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredential)?;

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .json(&self.request_body(messages))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Upstream API error response: {} {}", status, body);
            return Err(UpstreamError::Rejected { status, body });
        }

        tracing::debug!("Upstream accepted request, streaming response");
        Ok(response.bytes_stream().boxed())
    }
}
