pub mod gemini {
    pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
    pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const GENERATE_ACTION: &str = "generateContent";
    pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";
    pub const MODEL_ENV_VAR: &str = "GEMINI_MODEL";
    pub const BASE_URL_ENV_VAR: &str = "GEMINI_BASE_URL";
}
