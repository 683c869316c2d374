pub mod constants;
pub mod gemini;

pub use gemini::{GeminiClient, GeminiConfig, GRAMMAR_INSTRUCTION};
