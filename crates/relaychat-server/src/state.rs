//! Shared application state.

use std::sync::Arc;

use relaychat_chat::TextCompletionProvider;

/// Immutable state shared by all route handlers.
///
/// The provider is built once at startup; handlers only borrow it, so
/// concurrent requests need no locking.
pub struct AppState {
    pub provider: Arc<dyn TextCompletionProvider>,
}

impl AppState {
    pub fn new(provider: Arc<dyn TextCompletionProvider>) -> Self {
        Self { provider }
    }
}
