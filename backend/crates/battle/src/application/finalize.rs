//! Finalize Use Case
//!
//! Everything that happens after a trigger has claimed finalization:
//! score the submissions, then tell every registered participant how the
//! battle ended. Runs outside the session lock.

use derive_more::Display;
use kernel::id::SessionId;
use serde::Serialize;

use crate::application::config::BattleConfig;
use crate::domain::entities::Participant;
use crate::domain::gateway::{EvaluationClient, EvaluationEntry, ResultBroadcaster};
use crate::domain::services::{BattleOutcome, resolve_winner};
use crate::error::BattleError;

/// What triggered finalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum FinalizeReason {
    /// Every registered participant submitted
    #[display("completion")]
    Completion,
    /// The deadline elapsed
    #[display("timeout")]
    Timeout,
}

/// Whether the evaluation service was consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Completed,
    /// Nobody submitted, so there was nothing to score
    Skipped,
    /// The service failed or timed out; treated as no winner
    Failed,
}

/// Data captured under the session lock by the winning trigger
#[derive(Debug)]
pub(crate) struct FinalizeClaim {
    pub session_id: SessionId,
    pub reason: FinalizeReason,
    /// Every registered participant
    pub recipients: Vec<Participant>,
    /// Participants with a submission
    pub submitters: Vec<Participant>,
}

/// Summary of a finalized session
#[derive(Debug, Clone, Serialize)]
pub struct FinalizeReport {
    pub session_id: SessionId,
    pub reason: FinalizeReason,
    pub outcome: BattleOutcome,
    pub evaluation: EvaluationStatus,
    pub notified: usize,
    pub failed_deliveries: usize,
}

pub(crate) async fn execute<E, B>(
    evaluator: &E,
    broadcaster: &B,
    config: &BattleConfig,
    claim: FinalizeClaim,
) -> FinalizeReport
where
    E: EvaluationClient + Sync,
    B: ResultBroadcaster + Sync,
{
    tracing::info!(
        session_id = %claim.session_id,
        reason = %claim.reason,
        participants = claim.recipients.len(),
        submissions = claim.submitters.len(),
        "Finalizing battle session"
    );

    let (outcome, evaluation) = evaluate(evaluator, config, &claim).await;
    let message = outcome.message();

    let mut notified = 0;
    let mut failed_deliveries = 0;
    for participant in &claim.recipients {
        let sent = tokio::time::timeout(
            config.broadcast_timeout,
            broadcaster.send(participant.id(), &message),
        )
        .await
        .unwrap_or_else(|_| {
            Err(BattleError::Broadcast(format!(
                "timed out after {:?}",
                config.broadcast_timeout
            )))
        });

        match sent {
            Ok(()) => notified += 1,
            Err(e) => {
                failed_deliveries += 1;
                tracing::error!(
                    session_id = %claim.session_id,
                    participant_id = %participant.id(),
                    error = %e,
                    "Could not deliver battle result"
                );
            }
        }
    }

    tracing::info!(
        session_id = %claim.session_id,
        winner = ?outcome.winner_id(),
        notified,
        failed_deliveries,
        "Battle result broadcast"
    );

    FinalizeReport {
        session_id: claim.session_id,
        reason: claim.reason,
        outcome,
        evaluation,
        notified,
        failed_deliveries,
    }
}

async fn evaluate<E>(
    evaluator: &E,
    config: &BattleConfig,
    claim: &FinalizeClaim,
) -> (BattleOutcome, EvaluationStatus)
where
    E: EvaluationClient + Sync,
{
    let entries: Vec<EvaluationEntry> = claim
        .submitters
        .iter()
        .filter_map(EvaluationEntry::from_participant)
        .collect();

    if entries.is_empty() {
        tracing::info!(session_id = %claim.session_id, "No submissions, skipping evaluation");
        return (BattleOutcome::NoWinner, EvaluationStatus::Skipped);
    }

    let verdict = tokio::time::timeout(config.evaluation_timeout, evaluator.evaluate(&entries))
        .await
        .unwrap_or_else(|_| {
            Err(BattleError::Evaluation(format!(
                "timed out after {:?}",
                config.evaluation_timeout
            )))
        });

    match verdict {
        Ok(verdict) => {
            let outcome = resolve_winner(&claim.submitters, &verdict);
            if outcome == BattleOutcome::NoWinner {
                if let Some(wallet) = &verdict.winner_wallet {
                    tracing::warn!(
                        session_id = %claim.session_id,
                        winner_wallet = %wallet,
                        "Evaluation named a wallet that did not submit"
                    );
                }
            }
            (outcome, EvaluationStatus::Completed)
        }
        Err(e) => {
            tracing::error!(
                session_id = %claim.session_id,
                error = %e,
                "Evaluation failed, closing session without a winner"
            );
            (BattleOutcome::NoWinner, EvaluationStatus::Failed)
        }
    }
}
