//! Errors from talking to the relay.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Relay returned status {0}")]
    Status(u16),
}
