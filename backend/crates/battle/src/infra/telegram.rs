//! Telegram Result Broadcaster
//!
//! Delivers outcome messages through the Telegram Bot API. Participant ids
//! are Telegram user ids, which double as private chat ids.

use kernel::error::app_error::{AppResult, ResultExt};
use kernel::error::kind::ErrorKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::config::BattleConfig;
use crate::domain::gateway::ResultBroadcaster;
use crate::domain::value_objects::ParticipantId;
use crate::error::{BattleError, BattleResult};
use platform::http::{HttpClientConfig, build_client, post_json};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub api_base: String,
    timeout: Duration,
}

impl TelegramConfig {
    /// Each send is bounded by the coordinator's broadcast timeout.
    pub fn new(bot_token: impl Into<String>, battle: &BattleConfig) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: battle.broadcast_timeout,
        }
    }
}

// Keep the token out of logs.
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct TelegramBroadcaster {
    client: reqwest::Client,
    send_message_url: String,
}

impl TelegramBroadcaster {
    pub fn new(config: TelegramConfig) -> AppResult<Self> {
        let client = build_client(&HttpClientConfig::with_timeout(config.timeout))
            .map_app_err(
                ErrorKind::InternalServerError,
                "Could not build the Telegram HTTP client",
            )?;
        Ok(Self {
            client,
            send_message_url: send_message_url(&config.api_base, &config.bot_token),
        })
    }
}

fn send_message_url(api_base: &str, bot_token: &str) -> String {
    format!(
        "{}/bot{}/sendMessage",
        api_base.trim_end_matches('/'),
        bot_token
    )
}

impl ResultBroadcaster for TelegramBroadcaster {
    async fn send(&self, recipient: ParticipantId, text: &str) -> BattleResult<()> {
        let request = SendMessageRequest {
            chat_id: recipient.get(),
            text,
        };

        let response: ApiResponse = post_json(&self.client, &self.send_message_url, &request)
            .await
            .map_err(|e| BattleError::Broadcast(e.to_string()))?;

        if !response.ok {
            return Err(BattleError::Broadcast(
                response
                    .description
                    .unwrap_or_else(|| "Telegram rejected the message".to_string()),
            ));
        }

        tracing::debug!(participant_id = %recipient, "Result delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_url() {
        assert_eq!(
            send_message_url("https://api.telegram.org/", "123:ABC"),
            "https://api.telegram.org/bot123:ABC/sendMessage"
        );
    }

    #[test]
    fn test_request_body() {
        let request = SendMessageRequest {
            chat_id: 424242,
            text: "No winner could be determined.",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["chat_id"], 424242);
        assert_eq!(json["text"], "No winner could be determined.");
    }

    #[test]
    fn test_api_response_parsing() {
        let ok: ApiResponse = serde_json::from_str(r#"{"ok":true,"result":{}}"#).unwrap();
        assert!(ok.ok);

        let blocked: ApiResponse = serde_json::from_str(
            r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was blocked by the user"}"#,
        )
        .unwrap();
        assert!(!blocked.ok);
        assert!(blocked.description.unwrap().contains("blocked"));
    }

    #[test]
    fn test_config_debug_redacts_token() {
        let config = TelegramConfig::new("123:SECRET", &BattleConfig::default());
        let debug = format!("{config:?}");
        assert!(!debug.contains("SECRET"));
    }

    #[test]
    fn test_config_uses_broadcast_timeout() {
        let battle = BattleConfig {
            broadcast_timeout: Duration::from_secs(3),
            ..BattleConfig::default()
        };
        let config = TelegramConfig::new("123:ABC", &battle);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }
}
