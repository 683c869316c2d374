//! The structured reply the model is asked to produce, and the lenient
//! parsing that turns whatever it actually produced into one.

use serde::{Deserialize, Serialize};

pub const BLOCKED_REPLY: &str =
    "I'm sorry, my safety filters blocked that request. Please try saying something else.";

/// Shown when the provider answered with nothing usable.
pub const NO_RESULT_REPLY: &str = "I'm sorry, I couldn't process that. Please try again.";

/// Shown when the completer itself blew up.
pub const FAILURE_REPLY: &str = "Oops! Something went wrong. Check your connection or API key.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyEnvelope {
    pub reply: String,
    pub has_correction: bool,
    #[serde(default)]
    pub correction: Option<String>,
}

impl ReplyEnvelope {
    /// A plain reply with no grammar correction attached.
    pub fn plain(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            has_correction: false,
            correction: None,
        }
    }

    pub fn error(message: impl std::fmt::Display) -> Self {
        Self::plain(format!("Error: {message}"))
    }

    pub fn blocked() -> Self {
        Self::plain(BLOCKED_REPLY)
    }
}

/// Remove every ```` ```json ```` and ```` ``` ```` marker, wherever it sits.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Interpret raw model output as a [`ReplyEnvelope`].
///
/// Output that is not JSON, or JSON of the wrong shape, becomes a plain reply
/// carrying the trimmed raw text.
pub fn parse_reply(raw: &str) -> ReplyEnvelope {
    let raw = raw.trim();
    let cleaned = strip_code_fences(raw);

    match serde_json::from_str::<ReplyEnvelope>(&cleaned) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "Model output is not a reply envelope, using raw text");
            ReplyEnvelope::plain(raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_json_is_unwrapped() {
        let raw = "```json\n{\"reply\":\"Hi!\",\"hasCorrection\":false,\"correction\":null}\n```";
        assert_eq!(
            parse_reply(raw),
            ReplyEnvelope {
                reply: "Hi!".to_string(),
                has_correction: false,
                correction: None,
            }
        );
    }

    #[test]
    fn correction_is_kept() {
        let raw = r#"{"reply":"Sure thing!","hasCorrection":true,"correction":"I have two apples."}"#;
        let envelope = parse_reply(raw);

        assert!(envelope.has_correction);
        assert_eq!(envelope.correction.as_deref(), Some("I have two apples."));
    }

    #[test]
    fn plain_text_falls_back_to_raw_reply() {
        assert_eq!(parse_reply("Hello there"), ReplyEnvelope::plain("Hello there"));
    }

    #[test]
    fn fallback_keeps_fences_but_trims_whitespace() {
        let raw = "  ```\nnot json at all\n```  ";
        assert_eq!(
            parse_reply(raw).reply,
            "```\nnot json at all\n```"
        );
    }

    #[test]
    fn wrong_field_types_fall_back() {
        let raw = r#"{"reply":"ok","hasCorrection":"yes","correction":null}"#;
        let envelope = parse_reply(raw);

        assert_eq!(envelope.reply, raw);
        assert!(!envelope.has_correction);
        assert_eq!(envelope.correction, None);
    }

    #[test]
    fn non_string_correction_falls_back() {
        let raw = r#"{"reply":"ok","hasCorrection":true,"correction":42}"#;
        assert_eq!(parse_reply(raw), ReplyEnvelope::plain(raw));
    }

    #[test]
    fn missing_correction_is_treated_as_null() {
        let envelope = parse_reply(r#"{"reply":"ok","hasCorrection":false}"#);
        assert_eq!(envelope, ReplyEnvelope::plain("ok"));
    }

    #[test]
    fn json_that_is_not_an_object_falls_back() {
        assert_eq!(parse_reply("42"), ReplyEnvelope::plain("42"));
        assert_eq!(parse_reply("[1, 2]"), ReplyEnvelope::plain("[1, 2]"));
    }

    #[test]
    fn error_envelope_is_prefixed() {
        let envelope = ReplyEnvelope::error("quota exceeded");
        assert_eq!(envelope.reply, "Error: quota exceeded");
        assert!(!envelope.has_correction);
    }

    #[test]
    fn envelope_serializes_camel_case() {
        let value = serde_json::to_value(ReplyEnvelope::plain("hey")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "reply": "hey", "hasCorrection": false, "correction": null })
        );
    }
}
