//! relaychat core — process configuration and shared error types.

pub mod config;
pub mod error;

pub use config::RelayConfig;
pub use error::{Error, Result};
