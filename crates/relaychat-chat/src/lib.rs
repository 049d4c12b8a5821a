//! Streaming text completion against external LLM APIs (OpenAI/Gemini).
//!
//! A single capability, [`TextCompletionProvider`], turns a prompt into a
//! stream of text fragments. One implementation exists per upstream backend;
//! which one is used is decided once from [`LLMConfig`].

pub mod config;
pub mod error;
pub mod providers;
pub mod sse;
pub mod types;

pub use config::LLMConfig;
pub use error::ChatError;
pub use providers::{build_provider, TextCompletionProvider, TextStream};
pub use types::*;
