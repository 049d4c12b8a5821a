//! Google Gemini generative content backend.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use super::{
    error_message, open_stream, parse_json, sse_fragments, SseData, TextCompletionProvider,
    TextStream,
};
use crate::error::ChatError;
use crate::types::LLMProvider;

/// Streams candidate text from `:streamGenerateContent?alt=sse`.
pub struct GeminiProvider {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(client: Client, base_url: &str, api_key: String, model: String) -> Self {
        Self {
            client,
            url: format!(
                "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
                base_url.trim_end_matches('/'),
                model
            ),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl TextCompletionProvider for GeminiProvider {
    fn kind(&self) -> LLMProvider {
        LLMProvider::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn stream_completion(&self, prompt: &str) -> Result<TextStream, ChatError> {
        let body = json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
        });

        debug!("Streaming from Gemini with model {}", self.model);

        let response = open_stream(
            self.client
                .post(&self.url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body),
        )
        .await?;

        Ok(sse_fragments(response, parse_data))
    }
}

/// Gemini has no end marker; the stream finishes with the HTTP body.
fn parse_data(data: &str) -> SseData {
    let Some(parsed) = parse_json(data) else {
        return SseData::Skip;
    };

    if let Some(message) = error_message(&parsed) {
        return SseData::Error(message);
    }

    let Some(parts) = parsed["candidates"][0]["content"]["parts"].as_array() else {
        return SseData::Skip;
    };

    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();

    SseData::Fragment(text)
}
