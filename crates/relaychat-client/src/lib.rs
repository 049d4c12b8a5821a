//! Chat front-end logic for the relay.
//!
//! [`ChatSession`] owns the transcript and drives one exchange at a time.
//! Views never touch the transcript directly; they subscribe to the
//! [`ChatEvent`] channel returned by [`ChatSession::new`] and repaint on
//! every event.

pub mod decode;
pub mod error;
pub mod relay;
pub mod session;

pub use decode::Utf8Decoder;
pub use error::ClientError;
pub use relay::RelayClient;
pub use session::{ChatEvent, ChatSession, Phase, SubmitOutcome};
