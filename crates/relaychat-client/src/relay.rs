//! HTTP client for the relay's `POST /api/chat` endpoint.

use reqwest::{Client, Response};
use tracing::debug;

use relaychat_chat::ChatRequest;

use crate::error::ClientError;

/// Posts prompts to a relay and hands back the streaming response.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    chat_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            chat_url: format!("{}/api/chat", base_url.trim_end_matches('/')),
        }
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    /// Send a prompt. Resolves once response headers arrive; any non-2xx
    /// status counts as failure and the error body is discarded.
    pub async fn send(&self, prompt: &str) -> Result<Response, ClientError> {
        debug!("Posting prompt to {}", self.chat_url);

        let response = self
            .client
            .post(&self.chat_url)
            .json(&ChatRequest::new(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        Ok(response)
    }
}
