pub mod config;
pub mod error;
pub mod http;
pub mod traits;
pub mod types;

pub use config::ApiKey;
pub use error::LlmError;
pub use http::{HttpClient, HttpClientConfig};
pub use traits::Completer;
pub use types::{GenerationConfig, OutgoingRequest};
