//! Collaborator Traits
//!
//! Interfaces to the external services a session talks to when it is
//! finalized. Implementations live in the infrastructure layer.

use serde::{Deserialize, Serialize};

use crate::domain::entities::Participant;
use crate::domain::value_objects::ParticipantId;
use crate::error::BattleResult;

/// One scored submission: whose wallet, which artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationEntry {
    pub wallet_address: String,
    pub artifact: String,
}

impl EvaluationEntry {
    /// Build the entry for a participant; `None` if they never submitted.
    pub fn from_participant(participant: &Participant) -> Option<Self> {
        participant.submission().map(|submission| Self {
            wallet_address: participant.wallet().to_string(),
            artifact: submission.artifact.to_string(),
        })
    }
}

/// Evaluation service verdict
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EvaluationVerdict {
    pub winner_wallet: Option<String>,
}

/// Scores a completed submission set
#[trait_variant::make(EvaluationClient: Send)]
pub trait LocalEvaluationClient {
    /// Score `entries` (non-empty, registration order) and name a winner.
    async fn evaluate(&self, entries: &[EvaluationEntry]) -> BattleResult<EvaluationVerdict>;
}

/// Delivers the outcome text to one participant
#[trait_variant::make(ResultBroadcaster: Send)]
pub trait LocalResultBroadcaster {
    async fn send(&self, recipient: ParticipantId, text: &str) -> BattleResult<()>;
}
