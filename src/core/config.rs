use super::error::LlmError;

/// Where to find the API key.
#[derive(Debug, Clone)]
pub enum ApiKey {
    /// Read the provider's default environment variable (`GEMINI_API_KEY`).
    Default,
    /// Use the given key as-is.
    Custom(String),
}

impl ApiKey {
    pub(crate) fn resolve(self, env_var: &str) -> Result<String, LlmError> {
        let key = match self {
            ApiKey::Default => std::env::var(env_var).map_err(|_| {
                LlmError::ProviderConfiguration(format!("{env_var} environment variable not set"))
            })?,
            ApiKey::Custom(key) => key,
        };

        if key.trim().is_empty() {
            return Err(LlmError::ProviderConfiguration(
                "API key must not be empty".to_string(),
            ));
        }

        Ok(key)
    }
}
