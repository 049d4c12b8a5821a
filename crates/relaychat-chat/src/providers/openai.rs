//! OpenAI chat completions backend.

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

/// Streams `choices[0].delta.content` from `/v1/chat/completions`.
pub struct OpenAIProvider {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

impl OpenAIProvider {
    pub fn new(client: Client, base_url: &str, api_key: String, model: String) -> Self {
        Self {
            client,
            url: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl TextCompletionProvider for OpenAIProvider {
    fn kind(&self) -> LLMProvider {
        LLMProvider::OpenAI
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn stream_completion(&self, prompt: &str) -> Result<TextStream, ChatError> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": true,
        });

        debug!("Streaming from {} with model {}", self.url, self.model);

        let response = open_stream(
            self.client
                .post(&self.url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body),
        )
        .await?;

        Ok(sse_fragments(response, parse_data))
    }
}

fn parse_data(data: &str) -> SseData {
    if data.trim() == "[DONE]" {
        return SseData::Done;
    }

    let Some(parsed) = parse_json(data) else {
        return SseData::Skip;
    };

    if let Some(message) = error_message(&parsed) {
        return SseData::Error(message);
    }

    match parsed["choices"][0]["delta"]["content"].as_str() {
        Some(content) => SseData::Fragment(content.to_string()),
        None => SseData::Skip,
    }
}
