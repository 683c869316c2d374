//! # grammarbot
//!
//! A chat companion backed by Google Gemini that answers your messages and
//! points out grammar, spelling and punctuation mistakes along the way.
//!
//! Models do not always return what they are asked for. Whatever comes back,
//! [`GeminiClient`] turns it into a [`ReplyEnvelope`]: malformed JSON, safety
//! blocks, network failures and error statuses all end up as a readable reply.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use grammarbot::{ApiKey, Completer, GeminiClient, GeminiConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GeminiClient::new(GeminiConfig::new(ApiKey::Default)?)?;
//!
//!     if let Some(envelope) = client.complete("me and him goes to the park").await {
//!         println!("{}", envelope.reply);
//!         if let Some(fix) = envelope.correction {
//!             println!("Grammar Fix: {fix}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod provider;
pub mod reply;
pub mod session;

pub use crate::core::{
    ApiKey, Completer, GenerationConfig, HttpClientConfig, LlmError, OutgoingRequest,
};
pub use provider::{GeminiClient, GeminiConfig};
pub use reply::{ReplyEnvelope, parse_reply, strip_code_fences};
pub use session::{ConversationTurn, Sender, Session, Transcript, View};
