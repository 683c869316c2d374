use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Provider configuration error: {0}")]
    ProviderConfiguration(String),

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: BoxError,
    },

    /// The prompt was rejected by the provider's safety filters.
    #[error("Request blocked: {reason}")]
    Blocked { reason: String },

    /// The provider answered without any candidate text.
    #[error("Empty response from provider")]
    EmptyResponse,
}

impl LlmError {
    /// The part of the error worth showing to someone chatting.
    ///
    /// For API errors this is the message the upstream put in its error body.
    pub fn user_message(&self) -> String {
        match self {
            LlmError::Api { message, .. }
            | LlmError::Network { message, .. }
            | LlmError::Parse { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_surface_the_upstream_message() {
        let err = LlmError::Api {
            message: "quota exceeded".to_string(),
            status_code: Some(429),
            source: None,
        };

        assert_eq!(err.user_message(), "quota exceeded");
        assert_eq!(err.to_string(), "API error: quota exceeded");
    }

    #[test]
    fn parse_errors_hide_their_cause() {
        let source = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err = LlmError::Parse {
            message: "Failed to parse response as JSON".to_string(),
            source: Box::new(source),
        };

        assert_eq!(err.user_message(), "Failed to parse response as JSON");
    }

    #[test]
    fn blocked_errors_name_the_reason() {
        let err = LlmError::Blocked {
            reason: "SAFETY".to_string(),
        };
        assert_eq!(err.user_message(), "Request blocked: SAFETY");
    }
}
