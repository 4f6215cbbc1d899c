//! Outbound HTTP infrastructure
//!
//! A shared `reqwest` client builder and a JSON POST helper used by the
//! adapters that talk to external services.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Outbound client settings
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    /// TCP/TLS connect timeout
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            user_agent: concat!("song-battle/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpClientConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// Failure of an outbound JSON call
#[derive(Debug, thiserror::Error)]
pub enum HttpCallError {
    /// Client could not be constructed
    #[error("HTTP client setup failed: {0}")]
    Setup(String),

    /// Connection, TLS or timeout failure
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Upstream answered with a non-2xx status
    #[error("{url} returned status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    /// Upstream answered 2xx with an unexpected body
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Build a client from config.
pub fn build_client(config: &HttpClientConfig) -> Result<reqwest::Client, HttpCallError> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| HttpCallError::Setup(e.to_string()))
}

/// Longest upstream error body kept in [`HttpCallError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// POST `body` as JSON to `url` and decode a JSON response.
///
/// Non-2xx responses are turned into [`HttpCallError::Status`] with a
/// truncated copy of the body for diagnostics.
pub async fn post_json<Req, Resp>(
    client: &reqwest::Client,
    url: &str,
    body: &Req,
) -> Result<Resp, HttpCallError>
where
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| HttpCallError::Transport {
            url: redact_url(url),
            message: transport_message(e),
        })?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(HttpCallError::Status {
            url: redact_url(url),
            status: status.as_u16(),
            body: truncate(&text, MAX_ERROR_BODY),
        });
    }

    response
        .json::<Resp>()
        .await
        .map_err(|e| HttpCallError::Decode {
            url: redact_url(url),
            message: e.without_url().to_string(),
        })
}

fn transport_message(err: reqwest::Error) -> String {
    if err.is_timeout() {
        "timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        err.without_url().to_string()
    }
}

/// Strip path segments that look like credentials (`/bot<token>/...`) before
/// a URL ends up in logs or error messages.
pub fn redact_url(url: &str) -> String {
    url.split('/')
        .map(|segment| {
            if segment.starts_with("bot") && segment.contains(':') {
                "bot***"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("song-battle/"));
    }

    #[test]
    fn test_build_client() {
        let config = HttpClientConfig::with_timeout(Duration::from_secs(2));
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn test_redact_bot_token() {
        let url = "https://api.telegram.org/bot123456:ABC-DEF/sendMessage";
        assert_eq!(
            redact_url(url),
            "https://api.telegram.org/bot***/sendMessage"
        );
        assert_eq!(
            redact_url("https://eval.example/submit"),
            "https://eval.example/submit"
        );
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééé", 3), "é…");
    }

    #[tokio::test]
    async fn test_post_json_transport_error() {
        let client = build_client(&HttpClientConfig::with_timeout(Duration::from_secs(1))).unwrap();
        // Port 9 (discard) on localhost is almost never listening.
        let result: Result<serde_json::Value, _> =
            post_json(&client, "http://127.0.0.1:9/", &serde_json::json!({})).await;
        assert!(matches!(result, Err(HttpCallError::Transport { .. })));
    }
}
