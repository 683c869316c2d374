//! Google Gemini `generateContent` client.
//!
//! The API key travels as the `key` query parameter rather than a header.
//! Every message is sent on its own; the model never sees earlier turns.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::core::{
    ApiKey, Completer, GenerationConfig, HttpClient, HttpClientConfig, LlmError, OutgoingRequest,
};
use crate::provider::constants::gemini;
use crate::reply::{ReplyEnvelope, parse_reply};

/// Persona and output-format directive sent ahead of every user message.
pub const GRAMMAR_INSTRUCTION: &str = r#"You are a helpful AI chat bot and grammar assistant.
1. Respond naturally to the user's input.
2. Check the user's input for grammar, spelling, or punctuation errors.
3. If there are errors, identify the corrected version.
4. ALWAYS respond in JSON format with these exact keys:
   {
     "reply": "Your conversational response",
     "hasCorrection": true,
     "correction": "The full corrected sentence"
   }
If there are no errors, set hasCorrection to false and correction to null.
Do not include any markdown formatting like ```json in the output. Just the raw JSON string."#;

pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub instruction: String,
    pub generation: GenerationConfig,
    pub http_config: HttpClientConfig,
}

impl GeminiConfig {
    pub fn new(api_key: ApiKey) -> Result<Self, LlmError> {
        Ok(Self {
            api_key: api_key.resolve(gemini::API_KEY_ENV_VAR)?,
            base_url: gemini::API_BASE.to_string(),
            model: gemini::DEFAULT_MODEL.to_string(),
            instruction: GRAMMAR_INSTRUCTION.to_string(),
            generation: GenerationConfig::default(),
            http_config: HttpClientConfig::default(),
        })
    }

    /// Key from `GEMINI_API_KEY`, with `GEMINI_MODEL` and `GEMINI_BASE_URL`
    /// applied when set.
    pub fn from_env() -> Result<Self, LlmError> {
        let mut config = Self::new(ApiKey::Default)?;

        if let Ok(model) = std::env::var(gemini::MODEL_ENV_VAR)
            && !model.trim().is_empty()
        {
            config = config.with_model(model.trim());
        }

        if let Ok(base_url) = std::env::var(gemini::BASE_URL_ENV_VAR)
            && !base_url.trim().is_empty()
        {
            config = config.with_base_url(base_url.trim());
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:{}",
            self.base_url,
            self.model,
            gemini::GENERATE_ACTION
        )
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("generation", &self.generation)
            .field("http_config", &self.http_config)
            .finish_non_exhaustive()
    }
}

pub struct GeminiClient {
    pub config: GeminiConfig,
    http: HttpClient,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        let http = HttpClient::new(config.http_config.clone(), None)?;
        Ok(Self { config, http })
    }

    pub fn build_request(&self, user_text: &str) -> OutgoingRequest {
        OutgoingRequest::new(
            self.config.instruction.clone(),
            user_text,
            self.config.generation.clone(),
        )
    }

    /// Send one request and return the model's raw text.
    ///
    /// A response without text fails with [`LlmError::Blocked`] when the
    /// prompt was filtered, and [`LlmError::EmptyResponse`] otherwise.
    #[tracing::instrument(
        name = "gemini_generate",
        skip(self, request),
        fields(model = %self.config.model),
        err
    )]
    pub async fn generate(&self, request: &OutgoingRequest) -> Result<String, LlmError> {
        let body = GenerateContentRequest::from(request);
        let response: Value = self
            .http
            .post_json(
                &self.config.endpoint(),
                &[("key", self.config.api_key.as_str())],
                &body,
            )
            .await?;

        extract_text(&response)
    }
}

#[async_trait]
impl Completer for GeminiClient {
    async fn complete(&self, user_text: &str) -> Option<ReplyEnvelope> {
        debug!(user_text, "Sending message to Gemini");
        let request = self.build_request(user_text);

        match self.generate(&request).await {
            Ok(text) => {
                debug!(raw_text = %text, "Gemini replied");
                Some(parse_reply(&text))
            }
            Err(LlmError::Blocked { reason }) => {
                warn!(%reason, "Prompt blocked by safety filters");
                Some(ReplyEnvelope::blocked())
            }
            Err(LlmError::EmptyResponse) => {
                warn!("Gemini returned no candidates");
                None
            }
            Err(e) => {
                error!(error = %e, "Gemini request failed");
                Some(ReplyEnvelope::error(e.user_message()))
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum Role {
    User,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct Content {
    role: Role,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: WireGenerationConfig,
}

impl From<&OutgoingRequest> for GenerateContentRequest {
    fn from(request: &OutgoingRequest) -> Self {
        let generation = &request.generation;
        Self {
            contents: vec![Content {
                role: Role::User,
                parts: vec![Part {
                    text: request.prompt(),
                }],
            }],
            generation_config: WireGenerationConfig {
                temperature: generation.temperature,
                top_k: generation.top_k,
                top_p: generation.top_p,
                max_output_tokens: generation.max_output_tokens,
            },
        }
    }
}

/// Pull the model's text out of a `generateContent` body.
///
/// The body is walked loosely: a missing or mistyped piece means no text
/// rather than a decoding failure.
fn extract_text(response: &Value) -> Result<String, LlmError> {
    let text = response
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .and_then(|parts| parts.first())
        .and_then(|part| part.get("text"))
        .and_then(Value::as_str);

    if let Some(text) = text {
        return Ok(text.trim().to_string());
    }

    match response.pointer("/promptFeedback/blockReason") {
        Some(Value::Null) | None => Err(LlmError::EmptyResponse),
        Some(Value::String(reason)) => Err(LlmError::Blocked {
            reason: reason.clone(),
        }),
        Some(other) => Err(LlmError::Blocked {
            reason: other.to_string(),
        }),
    }
}
