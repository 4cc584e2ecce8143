use std::time::Duration;

use async_stream::stream;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use reqwest::StatusCode;
use serde_json::json;
use thiserror::Error;

use crate::openai::ChatMessage;
use crate::relay::{Extracted, LineStream, SemanticEvent, decode_line};

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Relay rejected the request with {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("Relay stream stalled for {0:?}")]
    Stalled(Duration),
}

pub type ClientEventStream = BoxStream<'static, Result<SemanticEvent, ClientError>>;

/// Talks to the relay's chat endpoint.
#[derive(Clone, Debug)]
pub struct RelayClient {
    http: reqwest::Client,
    url: String,
    idle_timeout: Duration,
}

impl RelayClient {
    pub fn new(url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.to_string(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Send the history and return the relayed events as they arrive.
    ///
    /// A rejected request, or a relay that doesn't answer within the idle
    /// timeout, fails here before any event. Once streaming, a
    /// transport failure or stall is yielded as the last item. The stream
    /// ends after the first terminal event.
    pub async fn send(&self, history: &[ChatMessage]) -> Result<ClientEventStream, ClientError> {
        let request = self
            .http
            .post(&self.url)
            .json(&json!({ "messages": history }))
            .send();
        // The wait for response headers counts against the idle timeout too
        let response = tokio::time::timeout(self.idle_timeout, request)
            .await
            .map_err(|_| ClientError::Stalled(self.idle_timeout))??;

        let status = response.status();
        if !status.is_success() {
            let body = tokio::time::timeout(self.idle_timeout, response.text())
                .await
                .ok()
                .and_then(Result::ok)
                .unwrap_or_default();
            return Err(ClientError::Rejected { status, body });
        }

        let idle_timeout = self.idle_timeout;
        let events = stream! {
            let mut lines = LineStream::new(response.bytes_stream().boxed());

            loop {
                let next = match tokio::time::timeout(idle_timeout, lines.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        yield Err(ClientError::Stalled(idle_timeout));
                        return;
                    }
                };

                match next {
                    Some(Ok(line)) => match decode_line(&line) {
                        Some(Extracted::Event(event)) => {
                            let terminal = event.is_terminal();
                            yield Ok(event);
                            if terminal {
                                return;
                            }
                        }
                        Some(Extracted::Malformed(_)) | None => {}
                    },
                    Some(Err(e)) => {
                        yield Err(ClientError::Transport(e));
                        return;
                    }
                    None => return,
                }
            }
        };

        Ok(events.boxed())
    }
}
