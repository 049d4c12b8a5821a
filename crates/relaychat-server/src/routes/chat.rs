//! Chat relay routes.
//!
//! `POST /api/chat` forwards one prompt upstream and relays the generated
//! text as an unframed `text/plain` chunked body.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio_stream::StreamExt;
use tracing::{debug, error};

use crate::state::AppState;
use relaychat_chat::{ChatError, ChatRequest, ChatStatus, ErrorBody};

pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/status", get(get_status))
}

/// Failure before any body byte was sent.
///
/// Every cause collapses into the same 500 response; the detail only goes
/// to the log.
#[derive(Debug)]
pub struct ApiError(ChatError);

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Chat request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::internal()),
        )
            .into_response()
    }
}

// ---------------------------------------------------------------
// Streaming relay
// ---------------------------------------------------------------

async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response, ApiError> {
    // Malformed bodies share the generic failure path instead of a 4xx.
    let req = ChatRequest::from_slice(&body)?;

    debug!("Relaying prompt ({} bytes)", req.prompt.len());

    let mut fragments = state.provider.stream_completion(&req.prompt).await?;

    // Headers are committed once this body starts; a later upstream failure
    // can only abort the response.
    let body_stream = async_stream::stream! {
        while let Some(item) = fragments.next().await {
            match item {
                Ok(text) => yield Ok(text),
                Err(e) => {
                    error!("Upstream failed mid-stream, aborting response: {}", e);
                    yield Err(e);
                    return;
                }
            }
        }
    };

    Ok((
        [(CONTENT_TYPE, TEXT_CONTENT_TYPE)],
        Body::from_stream(body_stream),
    )
        .into_response())
}

// ---------------------------------------------------------------
// Status
// ---------------------------------------------------------------

async fn get_status(State(state): State<Arc<AppState>>) -> Json<ChatStatus> {
    Json(ChatStatus {
        provider: state.provider.kind(),
        model: state.provider.model().to_string(),
    })
}
