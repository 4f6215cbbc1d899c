//! Domain Services
//!
//! Pure logic for turning an evaluation verdict into a battle outcome.

use serde::Serialize;

use crate::domain::entities::Participant;
use crate::domain::gateway::EvaluationVerdict;
use crate::domain::value_objects::ParticipantId;

/// How a finalized session ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BattleOutcome {
    Winner {
        participant_id: ParticipantId,
        display_name: String,
        wallet: String,
    },
    NoWinner,
}

impl BattleOutcome {
    /// Message broadcast to every participant
    pub fn message(&self) -> String {
        match self {
            BattleOutcome::Winner {
                display_name,
                wallet,
                ..
            } => format!("🏆 Battle Winner: {display_name} (Wallet: {wallet})"),
            BattleOutcome::NoWinner => "No winner could be determined.".to_string(),
        }
    }

    pub fn winner_id(&self) -> Option<ParticipantId> {
        match self {
            BattleOutcome::Winner { participant_id, .. } => Some(*participant_id),
            BattleOutcome::NoWinner => None,
        }
    }
}

/// Match the verdict's wallet against the submitters.
///
/// Matching is by wallet address, never by participant id. The first
/// submitter (registration order) with a matching wallet wins; an unknown
/// or missing wallet means no winner.
pub fn resolve_winner(submitters: &[Participant], verdict: &EvaluationVerdict) -> BattleOutcome {
    let Some(winner_wallet) = verdict.winner_wallet.as_deref() else {
        return BattleOutcome::NoWinner;
    };

    submitters
        .iter()
        .filter(|p| p.has_submitted())
        .find(|p| p.wallet().matches(winner_wallet))
        .map(|p| BattleOutcome::Winner {
            participant_id: p.id(),
            display_name: p.display_name().to_string(),
            wallet: p.wallet().to_string(),
        })
        .unwrap_or(BattleOutcome::NoWinner)
}
