use crate::core::AppConfig;
use crate::openai::{UpstreamClient, UpstreamError};

/// Read-only state shared by every request. Each relay owns its own
/// decoding state, so nothing here needs a lock.
pub struct AppState {
    pub config: AppConfig,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, UpstreamError> {
        let upstream = UpstreamClient::new(&config)?;
        Ok(Self { config, upstream })
    }
}
