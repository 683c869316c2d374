/// Sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Sampling temperature
    pub temperature: f32,

    /// Top-k sampling: only the k most likely tokens are considered.
    pub top_k: u32,

    /// Nucleus sampling parameter (0.0 to 1.0)
    pub top_p: f32,

    /// Maximum number of tokens to generate
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

/// A single, stateless completion request.
///
/// Built fresh for every message; nothing from earlier turns is carried over.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub instruction_text: String,
    pub user_text: String,
    pub generation: GenerationConfig,
}

impl OutgoingRequest {
    pub fn new(
        instruction_text: impl Into<String>,
        user_text: impl Into<String>,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            instruction_text: instruction_text.into(),
            user_text: user_text.into(),
            generation,
        }
    }

    /// The instruction and the user's message folded into one prompt.
    pub fn prompt(&self) -> String {
        format!(
            "Instruction: {}\n\nUser Message: {}",
            self.instruction_text, self.user_text
        )
    }
}
