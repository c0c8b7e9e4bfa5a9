//! HTTP client for the streaming chat backend.
//!
//! Issues the chat completions request and hands the response body to a
//! [`StreamSession`], which decodes it and notifies the observer channel.

use futures_util::StreamExt;
use reqwest::Client;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::config::Config;
use crate::error::ClientError;
use crate::events::TranscriptUpdate;
use crate::models::ChatRequest;
use crate::stream::StreamSession;

/// Client for the chat completions API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ChatClient {
    /// Base URL for the API.
    pub base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl ChatClient {
    /// Create a client from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            client: Client::new(),
        }
    }

    /// Create a client against a custom base URL without auth.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            client: Client::new(),
        }
    }

    /// Stream one chat completion.
    ///
    /// Sends a POST to `/v1/chat/completions` and drives the SSE response
    /// through the decoder, delivering one [`TranscriptUpdate`] per data
    /// line on `updates`. Returns the final transcript once the stream
    /// terminates.
    ///
    /// A non-success status fails the session before any update is sent.
    /// Dropping the update receiver cancels the stream; the partial
    /// transcript is returned.
    pub async fn stream_chat(
        &self,
        request: &ChatRequest,
        updates: UnboundedSender<TranscriptUpdate>,
    ) -> Result<String, ClientError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!(%url, turns = request.messages.len(), "starting chat stream");

        let mut builder = self
            .client
            .post(&url)
            .header("Accept", "text/event-stream")
            .json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Server { status, message });
        }

        let chunks = response
            .bytes_stream()
            .map(|result| result.map_err(ClientError::from));
        StreamSession::new().run(chunks, updates).await
    }

    /// Check whether the API is reachable and healthy.
    pub async fn health_check(&self) -> Result<bool, ClientError> {
        let url = format!("{}/v1/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }
}
