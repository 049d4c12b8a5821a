//! Provider backends against a local mock upstream.
//!
//! Each test binds an axum server on an ephemeral port that speaks the
//! provider's SSE dialect, then drives the real backend against it.

use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use relaychat_chat::{build_provider, ChatError, LLMConfig, LLMProvider, TextStream};
use tokio_stream::StreamExt;

const OPENAI_BODY: &str = concat!(
    "data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n",
    ": keep-alive\n\n",
    "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hi\"}}]}\n\n",
    "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\" there\"}}]}\n\n",
    "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"!\"}}]}\n\n",
    "data: {\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
    "data: [DONE]\n\n",
    "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"after done\"}}]}\n\n",
);

const GEMINI_BODY: &str = concat!(
    "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hi\"}],\"role\":\"model\"}}]}\r\n\r\n",
    "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\" there\"}],\"role\":\"model\"}}]}\r\n\r\n",
    "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"\"}],\"role\":\"model\"}}]}\r\n\r\n",
    "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"!\"}],\"role\":\"model\"},\"finishReason\":\"STOP\"}]}",
);

async fn openai_handler(
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer sk-test") {
        return (StatusCode::UNAUTHORIZED, "invalid key".to_string()).into_response();
    }
    assert_eq!(body["stream"], true);
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "Hello");
    ([("content-type", "text/event-stream")], OPENAI_BODY).into_response()
}

async fn gemini_handler(
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("g-test") {
        return (StatusCode::FORBIDDEN, "API key not valid".to_string()).into_response();
    }
    assert_eq!(body["contents"][0]["parts"][0]["text"], "Hello");
    ([("content-type", "text/event-stream")], GEMINI_BODY).into_response()
}

async fn in_band_error_handler() -> impl IntoResponse {
    (
        [("content-type", "text/event-stream")],
        concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n\n",
            "data: {\"error\":{\"message\":\"overloaded\"}}\n\n",
        ),
    )
}

async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/v1/chat/completions", post(openai_handler))
        .route("/v1beta/models/{action}", post(gemini_handler))
        .route("/broken/v1/chat/completions", post(in_band_error_handler));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

// Mock upstreams live on loopback; keep any proxy settings out of the way.
fn local_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn config(base: &str, provider: &str, openai_key: &str, gemini_key: &str) -> LLMConfig {
    LLMConfig {
        preferred_provider: provider.into(),
        openai_api_key: Some(openai_key.into()),
        gemini_api_key: Some(gemini_key.into()),
        openai_base_url: base.into(),
        gemini_base_url: base.into(),
        ..LLMConfig::default()
    }
}

async fn collect(mut stream: TextStream) -> (Vec<String>, Option<ChatError>) {
    let mut fragments = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(text) => fragments.push(text),
            Err(e) => return (fragments, Some(e)),
        }
    }
    (fragments, None)
}

#[tokio::test]
async fn test_openai_stream_fragments() {
    let base = spawn_upstream().await;
    let provider =
        build_provider(&config(&base, "openai", "sk-test", "g-test"), local_client())
            .unwrap();
    assert_eq!(provider.kind(), LLMProvider::OpenAI);

    let stream = provider.stream_completion("Hello").await.unwrap();
    let (fragments, err) = collect(stream).await;
    assert!(err.is_none());
    assert_eq!(fragments, vec!["Hi", " there", "!"]);
}

#[tokio::test]
async fn test_gemini_stream_fragments() {
    let base = spawn_upstream().await;
    let provider =
        build_provider(&config(&base, "gemini", "sk-test", "g-test"), local_client())
            .unwrap();
    assert_eq!(provider.kind(), LLMProvider::Gemini);

    let stream = provider.stream_completion("Hello").await.unwrap();
    let (fragments, err) = collect(stream).await;
    assert!(err.is_none());
    // The empty-text candidate yields nothing.
    assert_eq!(fragments, vec!["Hi", " there", "!"]);
}

#[tokio::test]
async fn test_rejected_key_fails_before_streaming() {
    let base = spawn_upstream().await;

    let openai =
        build_provider(&config(&base, "openai", "wrong", "g-test"), local_client())
            .unwrap();
    match openai.stream_completion("Hello").await {
        Err(ChatError::Upstream { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid key");
        }
        other => panic!("expected upstream error, got {:?}", other.err()),
    }

    let gemini =
        build_provider(&config(&base, "gemini", "sk-test", "wrong"), local_client())
            .unwrap();
    assert!(matches!(
        gemini.stream_completion("Hello").await,
        Err(ChatError::Upstream { status: 403, .. })
    ));
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = build_provider(
        &config(&format!("http://{}", addr), "openai", "sk-test", "g-test"),
        local_client(),
    )
    .unwrap();
    assert!(matches!(
        provider.stream_completion("Hello").await,
        Err(ChatError::Request(_))
    ));
}

#[tokio::test]
async fn test_in_band_error_ends_stream() {
    let base = spawn_upstream().await;
    let provider = build_provider(
        &config(&format!("{}/broken", base), "openai", "sk-test", "g-test"),
        local_client(),
    )
    .unwrap();

    let stream = provider.stream_completion("Hello").await.unwrap();
    let (fragments, err) = collect(stream).await;
    assert_eq!(fragments, vec!["partial"]);
    assert!(matches!(err, Some(ChatError::Provider(ref m)) if m == "overloaded"));
}

#[test]
fn test_unconfigured_provider() {
    let result = build_provider(&LLMConfig::default(), local_client());
    assert!(matches!(result, Err(ChatError::NotConfigured)));
}
