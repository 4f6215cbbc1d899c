//! HTTP Evaluation Client
//!
//! Scores a submission set by POSTing it to the evaluation service:
//!
//! ```text
//! POST <endpoint>
//! {"submissions": [{"wallet_address": "0x…", "audio_file": "…"}]}
//!
//! 200 {"winner_wallet": "0x…" | null}
//! ```

use kernel::error::app_error::{AppResult, ResultExt};
use kernel::error::kind::ErrorKind;
use serde::Serialize;
use std::time::Duration;

use crate::application::config::BattleConfig;
use crate::domain::gateway::{EvaluationClient, EvaluationEntry, EvaluationVerdict};
use crate::error::{BattleError, BattleResult};
use platform::http::{HttpCallError, HttpClientConfig, build_client, post_json};

#[derive(Debug, Clone)]
pub struct EvaluationClientConfig {
    pub endpoint: String,
    timeout: Duration,
}

impl EvaluationClientConfig {
    /// The HTTP client shares the coordinator's evaluation timeout.
    pub fn new(endpoint: impl Into<String>, battle: &BattleConfig) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: battle.evaluation_timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EvaluationRequest<'a> {
    pub submissions: Vec<SubmissionBody<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionBody<'a> {
    pub wallet_address: &'a str,
    pub audio_file: &'a str,
}

impl<'a> EvaluationRequest<'a> {
    pub(crate) fn from_entries(entries: &'a [EvaluationEntry]) -> Self {
        Self {
            submissions: entries
                .iter()
                .map(|entry| SubmissionBody {
                    wallet_address: &entry.wallet_address,
                    audio_file: &entry.artifact,
                })
                .collect(),
        }
    }
}

/// reqwest-backed evaluation client
#[derive(Clone)]
pub struct HttpEvaluationClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpEvaluationClient {
    pub fn new(config: EvaluationClientConfig) -> AppResult<Self> {
        let client = build_client(&HttpClientConfig::with_timeout(config.timeout))
            .map_app_err(
                ErrorKind::InternalServerError,
                "Could not build the evaluation HTTP client",
            )?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
        })
    }
}

impl EvaluationClient for HttpEvaluationClient {
    async fn evaluate(&self, entries: &[EvaluationEntry]) -> BattleResult<EvaluationVerdict> {
        let request = EvaluationRequest::from_entries(entries);
        tracing::debug!(
            submissions = request.submissions.len(),
            "Requesting evaluation"
        );

        let verdict: EvaluationVerdict = post_json(&self.client, &self.endpoint, &request)
            .await
            .map_err(evaluation_error)?;

        tracing::info!(winner_wallet = ?verdict.winner_wallet, "Evaluation completed");
        Ok(verdict)
    }
}

fn evaluation_error(err: HttpCallError) -> BattleError {
    BattleError::Evaluation(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let entries = vec![
            EvaluationEntry {
                wallet_address: "0x1111111111111111111111111111111111111111".into(),
                artifact: "audio_submissions/1_a.mp3".into(),
            },
            EvaluationEntry {
                wallet_address: "0x2222222222222222222222222222222222222222".into(),
                artifact: "audio_submissions/2_b.mp3".into(),
            },
        ];

        let json = serde_json::to_value(EvaluationRequest::from_entries(&entries)).unwrap();
        let submissions = json["submissions"].as_array().unwrap();
        assert_eq!(submissions.len(), 2);
        assert_eq!(
            submissions[0]["wallet_address"],
            "0x1111111111111111111111111111111111111111"
        );
        assert_eq!(submissions[1]["audio_file"], "audio_submissions/2_b.mp3");
    }

    #[test]
    fn test_verdict_parsing() {
        let verdict: EvaluationVerdict =
            serde_json::from_str(r#"{"winner_wallet":"0xabc","score":0.9}"#).unwrap();
        assert_eq!(verdict.winner_wallet.as_deref(), Some("0xabc"));

        let verdict: EvaluationVerdict = serde_json::from_str(r#"{"winner_wallet":null}"#).unwrap();
        assert!(verdict.winner_wallet.is_none());

        let verdict: EvaluationVerdict = serde_json::from_str("{}").unwrap();
        assert!(verdict.winner_wallet.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_evaluation_error() {
        let battle = BattleConfig {
            evaluation_timeout: Duration::from_secs(1),
            ..BattleConfig::default()
        };
        let config = EvaluationClientConfig::new("http://127.0.0.1:9/submit", &battle);
        assert_eq!(config.timeout(), Duration::from_secs(1));
        let client = HttpEvaluationClient::new(config).unwrap();

        let entries = vec![EvaluationEntry {
            wallet_address: "0x1111111111111111111111111111111111111111".into(),
            artifact: "a.mp3".into(),
        }];
        let result = client.evaluate(&entries).await;
        assert!(matches!(result, Err(BattleError::Evaluation(_))));
    }
}
