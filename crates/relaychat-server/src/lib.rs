//! relaychat server — relays streamed LLM completions to HTTP clients.

pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
