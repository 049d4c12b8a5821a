//! Upstream streaming text providers.
//!
//! Each backend opens one streaming HTTP request per prompt and decodes the
//! provider's SSE body into plain text fragments. Both backends share the
//! request/response plumbing here and differ only in URL, auth header,
//! request body and how a `data:` payload maps to text.

mod gemini;
mod openai;

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;
use reqwest::{Client, RequestBuilder, Response};
use tokio_stream::StreamExt;
use tracing::{debug, info};

use crate::config::LLMConfig;
use crate::error::ChatError;
use crate::sse::{self, SseLineBuffer};
use crate::types::LLMProvider;

pub use gemini::GeminiProvider;
pub use openai::OpenAIProvider;

/// Boxed stream of text fragments in emission order.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

/// Streaming text completion for a single user prompt.
///
/// `stream_completion` resolves only after the upstream has accepted the
/// request, so callers can still report failure before emitting any output.
/// Errors after that point arrive as `Err` items and end the stream.
#[async_trait]
pub trait TextCompletionProvider: Send + Sync {
    fn kind(&self) -> LLMProvider;

    fn model(&self) -> &str;

    async fn stream_completion(&self, prompt: &str) -> Result<TextStream, ChatError>;
}

/// Construct the backend selected by configuration.
pub fn build_provider(
    config: &LLMConfig,
    client: Client,
) -> Result<Arc<dyn TextCompletionProvider>, ChatError> {
    let (provider, model, api_key) = config.resolve_provider().ok_or(ChatError::NotConfigured)?;

    info!("Using {} provider with model {}", provider, model);

    let backend: Arc<dyn TextCompletionProvider> = match provider {
        LLMProvider::OpenAI => Arc::new(OpenAIProvider::new(
            client,
            &config.openai_base_url,
            api_key,
            model,
        )),
        LLMProvider::Gemini => Arc::new(GeminiProvider::new(
            client,
            &config.gemini_base_url,
            api_key,
            model,
        )),
    };
    Ok(backend)
}

/// Interpretation of one SSE `data:` payload.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SseData {
    Fragment(String),
    Skip,
    Done,
    Error(String),
}

/// Send the request and fail early on transport errors or non-2xx status.
pub(crate) async fn open_stream(request: RequestBuilder) -> Result<Response, ChatError> {
    let response = request.send().await.map_err(ChatError::Request)?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ChatError::Upstream { status, body });
    }

    Ok(response)
}

/// Decode an SSE response into text fragments using a backend-specific parser.
pub(crate) fn sse_fragments(response: Response, parse: fn(&str) -> SseData) -> TextStream {
    Box::pin(async_stream::stream! {
        let mut bytes = response.bytes_stream();
        let mut lines = SseLineBuffer::new();

        loop {
            let (batch, finished) = match bytes.next().await {
                Some(Ok(chunk)) => (lines.push(&chunk), false),
                Some(Err(e)) => {
                    yield Err(ChatError::Stream(e.to_string()));
                    return;
                }
                None => (lines.finish().into_iter().collect::<Vec<_>>(), true),
            };

            for line in batch {
                let Some(data) = sse::data_payload(&line) else {
                    continue;
                };

                match parse(data) {
                    SseData::Fragment(text) => {
                        if !text.is_empty() {
                            yield Ok(text);
                        }
                    }
                    SseData::Skip => {}
                    SseData::Done => return,
                    SseData::Error(message) => {
                        yield Err(ChatError::Provider(message));
                        return;
                    }
                }
            }

            if finished {
                debug!("Upstream body ended");
                return;
            }
        }
    })
}

/// Parse a JSON payload, logging and skipping anything malformed.
pub(crate) fn parse_json(data: &str) -> Option<serde_json::Value> {
    match serde_json::from_str(data) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Skipping unparseable SSE payload: {}", e);
            None
        }
    }
}

/// In-band `{"error": {"message": ...}}` object, as both backends send it.
pub(crate) fn error_message(value: &serde_json::Value) -> Option<String> {
    let error = value.get("error").filter(|e| !e.is_null())?;
    Some(
        error["message"]
            .as_str()
            .unwrap_or("Unknown error")
            .to_string(),
    )
}
