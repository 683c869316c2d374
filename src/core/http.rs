//! Shared HTTP client with timeout and retry handling.

use std::time::Duration;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::error::LlmError;

/// Fallback shown when an error response carries no readable message.
pub const GENERIC_API_ERROR: &str = "API request failed";

/// Configuration for HTTP client resilience
///
/// Timeouts are not retried, so a request that never answers fails after
/// one `timeout`.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Total time allowed for a single attempt
    pub timeout: Duration,
    pub max_retries: u32,
    /// Base duration for exponential backoff
    pub initial_retry_delay: Duration,
    /// Cap on the backoff duration
    pub max_retry_delay: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 2,
            initial_retry_delay: Duration::from_millis(500),
            max_retry_delay: Duration::from_secs(5),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Pull `error.message` out of an `{ "error": { "message": ... } }` body.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.message)
        .filter(|m| !m.trim().is_empty())
}

/// HTTP client with retry logic and exponential backoff.
pub struct HttpClient {
    client: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig, user_agent: Option<&str>) -> Result<Self, LlmError> {
        let default_ua = format!("grammarbot/{}", env!("CARGO_PKG_VERSION"));
        let ua = user_agent.unwrap_or(&default_ua);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(ua)
            .build()
            .map_err(|e| {
                LlmError::ProviderConfiguration(format!("Failed to build reqwest client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// POST a JSON body and decode the JSON response.
    ///
    /// Retries on 429, 5xx and connection failures with exponential backoff.
    /// Timeouts and any other non-success status fail immediately. The
    /// recorded `url` never includes the query string.
    #[tracing::instrument(
        name = "http_post_json",
        skip(self, query, body),
        fields(url = %url),
        err
    )]
    pub async fn post_json<Req, Res>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        body: &Req,
    ) -> Result<Res, LlmError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..=self.config.max_retries {
            let request = self.client.post(url).query(query).json(body);

            match request.send().await {
                Err(e) => {
                    // The URL may carry the API key in its query string.
                    let e = e.without_url();
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.config.max_retries + 1,
                        error = %e,
                        "HTTP request failed"
                    );
                    // A timed-out attempt already used the whole budget.
                    if e.is_timeout() {
                        return Err(LlmError::Network {
                            message: "Request timed out".to_string(),
                            source: Box::new(e),
                        });
                    }
                    last_error = Some(LlmError::Network {
                        message: "Failed to reach the API".to_string(),
                        source: Box::new(e),
                    });
                }
                Ok(res) => {
                    let status = res.status();

                    if status.is_success() {
                        debug!(status = %status, "HTTP request successful");

                        let text = res.text().await.map_err(|e| LlmError::Network {
                            message: "Failed to read response body".to_string(),
                            source: Box::new(e.without_url()),
                        })?;

                        return serde_json::from_str(&text).map_err(|e| LlmError::Parse {
                            message: "Failed to parse response as JSON".to_string(),
                            source: Box::new(e),
                        });
                    }

                    let error_text = res.text().await.unwrap_or_default();
                    warn!(attempt, status = %status, body = %error_text, "API returned error status");

                    let message = extract_error_message(&error_text)
                        .unwrap_or_else(|| GENERIC_API_ERROR.to_string());
                    let error = LlmError::Api {
                        message,
                        status_code: Some(status.as_u16()),
                        source: None,
                    };

                    let is_retryable = status == reqwest::StatusCode::TOO_MANY_REQUESTS
                        || status.is_server_error();
                    if !is_retryable {
                        return Err(error);
                    }
                    last_error = Some(error);
                }
            }

            if attempt < self.config.max_retries {
                tokio::time::sleep(self.backoff(attempt)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Api {
            message: GENERIC_API_ERROR.to_string(),
            status_code: None,
            source: None,
        }))
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let base_delay =
            self.config.initial_retry_delay.as_millis() as f64 * 2_f64.powi(attempt as i32);

        // +/- 10% jitter
        let jitter_factor = rand::random::<f64>() * 0.2 + 0.9;
        let delay_ms = (base_delay * jitter_factor) as u64;

        Duration::from_millis(delay_ms).min(self.config.max_retry_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    fn fast_client(max_retries: u32) -> HttpClient {
        let config = HttpClientConfig {
            timeout: Duration::from_secs(5),
            max_retries,
            initial_retry_delay: Duration::from_millis(10),
            max_retry_delay: Duration::from_millis(50),
        };
        HttpClient::new(config, None).expect("client")
    }

    #[test]
    fn extracts_message_from_error_body() {
        let body = r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(extract_error_message(body).as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn ignores_bodies_without_a_message() {
        assert_eq!(extract_error_message("Internal Server Error"), None);
        assert_eq!(extract_error_message(r#"{"error":{"code":500}}"#), None);
        assert_eq!(extract_error_message(r#"{"error":{"message":"  "}}"#), None);
    }

    #[test]
    fn backoff_is_capped() {
        let client = fast_client(5);
        assert!(client.backoff(10) <= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn retries_server_errors_until_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/echo"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/echo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let client = fast_client(2);
        let url = format!("{}/echo", server.uri());
        let res: Value = client
            .post_json(&url, &[], &json!({}))
            .await
            .expect("should recover after retry");

        assert_eq!(res["ok"], true);
    }

    #[tokio::test]
    async fn client_errors_fail_without_retry() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/echo"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "error": { "message": "API key not valid" } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = fast_client(3);
        let url = format!("{}/echo", server.uri());
        let result = client.post_json::<_, Value>(&url, &[], &json!({})).await;

        match result {
            Err(LlmError::Api {
                message,
                status_code: Some(400),
                ..
            }) => assert_eq!(message, "API key not valid"),
            other => panic!("expected 400 Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn timeouts_are_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/echo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(
            HttpClientConfig {
                timeout: Duration::from_millis(100),
                max_retries: 3,
                initial_retry_delay: Duration::from_millis(10),
                max_retry_delay: Duration::from_millis(50),
            },
            None,
        )
        .expect("client");
        let url = format!("{}/echo", server.uri());
        let result = client.post_json::<_, Value>(&url, &[], &json!({})).await;

        match result {
            Err(LlmError::Network { message, .. }) => assert_eq!(message, "Request timed out"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sends_query_parameters() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(query_param("key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = fast_client(0);
        let url = format!("{}/echo", server.uri());
        let result = client
            .post_json::<_, Value>(&url, &[("key", "secret")], &json!({}))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/echo"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{ invalid json"))
            .mount(&server)
            .await;

        let client = fast_client(0);
        let url = format!("{}/echo", server.uri());
        let result = client.post_json::<_, Value>(&url, &[], &json!({})).await;

        assert!(matches!(result, Err(LlmError::Parse { .. })));
    }
}
