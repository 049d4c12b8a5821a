//! Errors raised while talking to an upstream provider.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("No LLM provider configured")]
    NotConfigured,

    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("API error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Stream read error: {0}")]
    Stream(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
