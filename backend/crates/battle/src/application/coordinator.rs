//! Session Coordinator
//!
//! Owns the single active battle session and serializes every event that
//! touches it (registration, submission, deadline) behind one async mutex.
//!
//! ## Exactly-once finalization
//! Both triggers, the last submission and the deadline timer, claim
//! finalization through [`Session::begin_finalize`] while holding the
//! session lock. Only the claimant goes on to call the evaluation service
//! and broadcast; every other trigger observes the claim and returns
//! without side effects. The lock is released before any collaborator call
//! and re-taken only to close the session, which is matched by session id so
//! a late finalize can never clear a newer session.

use chrono::{DateTime, Utc};
use kernel::id::SessionId;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::config::BattleConfig;
use crate::application::deadline_timer::DeadlineTimer;
use crate::application::finalize::{self, FinalizeClaim, FinalizeReason, FinalizeReport};
use crate::domain::entities::{Session, SessionState};
use crate::domain::gateway::{EvaluationClient, ResultBroadcaster};
use crate::domain::value_objects::{ArtifactRef, ParticipantId};
use crate::error::{BattleError, BattleResult};

/// Input DTO for registration
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub participant_id: ParticipantId,
    pub display_name: String,
    /// Wallet text exactly as the user typed it
    pub wallet: String,
}

/// Output DTO for registration
#[derive(Debug, Clone)]
pub struct RegisterOutput {
    pub session_id: SessionId,
    pub deadline: DateTime<Utc>,
    /// This registration opened the session
    pub opened_session: bool,
    pub participants: usize,
}

/// Output DTO for submission
#[derive(Debug, Clone)]
pub struct SubmitOutput {
    pub session_id: SessionId,
    pub all_submitted: bool,
    /// Present when this submission completed the session
    pub report: Option<FinalizeReport>,
}

/// Point-in-time view of the coordinator
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionStatus {
    pub session_id: Option<SessionId>,
    pub state: Option<SessionState>,
    pub participants: usize,
    pub submitted: usize,
    pub opened_at: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
}

struct ActiveSession {
    session: Session,
    timer: DeadlineTimer,
}

impl ActiveSession {
    fn new() -> Self {
        Self {
            session: Session::new(),
            timer: DeadlineTimer::new(),
        }
    }

    /// Claim finalization and capture what the finalize step needs.
    fn claim(&mut self, reason: FinalizeReason) -> Option<FinalizeClaim> {
        if !self.session.begin_finalize() {
            return None;
        }
        let timer_fired = self.timer.has_fired();
        let timer_cancelled = self.timer.cancel();
        tracing::debug!(
            session_id = %self.session.id(),
            %reason,
            timer_fired,
            timer_cancelled,
            "Finalization claimed"
        );

        let participants = self.session.participants();
        Some(FinalizeClaim {
            session_id: self.session.id(),
            reason,
            recipients: participants.snapshot(),
            submitters: participants.submitted_snapshot(),
        })
    }
}

struct CoordinatorInner<E, B> {
    slot: Mutex<Option<ActiveSession>>,
    evaluator: E,
    broadcaster: B,
    config: Arc<BattleConfig>,
}

/// Battle session state machine
pub struct SessionCoordinator<E, B> {
    inner: Arc<CoordinatorInner<E, B>>,
}

impl<E, B> Clone for SessionCoordinator<E, B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E, B> SessionCoordinator<E, B>
where
    E: EvaluationClient + Sync + 'static,
    B: ResultBroadcaster + Sync + 'static,
{
    pub fn new(evaluator: E, broadcaster: B, config: Arc<BattleConfig>) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                slot: Mutex::new(None),
                evaluator,
                broadcaster,
                config,
            }),
        }
    }

    pub fn config(&self) -> &BattleConfig {
        &self.inner.config
    }

    /// Register a participant, opening a session if none is active.
    ///
    /// The registration that opens a session arms its deadline timer. A
    /// rejected registration never leaves an empty session behind.
    pub async fn register(&self, input: RegisterInput) -> BattleResult<RegisterOutput> {
        let mut slot = self.inner.slot.lock().await;
        let active = slot.get_or_insert_with(ActiveSession::new);

        let registration = match active.session.register(
            input.participant_id,
            &input.display_name,
            &input.wallet,
            self.inner.config.window,
        ) {
            Ok(registration) => registration,
            Err(e) => {
                if active.session.participants().is_empty() {
                    *slot = None;
                }
                return Err(e);
            }
        };

        let session_id = active.session.id();
        if registration.first {
            let weak = Arc::downgrade(&self.inner);
            let armed = active.timer.arm(self.inner.config.window, move || async move {
                if let Some(inner) = weak.upgrade() {
                    SessionCoordinator { inner }
                        .finalize(session_id, FinalizeReason::Timeout)
                        .await;
                }
            });
            if let Err(e) = armed {
                e.log();
                return Err(e);
            }
            tracing::info!(
                %session_id,
                deadline = %registration.deadline,
                "Battle session opened"
            );
        }

        let participants = active.session.participants().len();
        tracing::info!(
            %session_id,
            participant_id = %input.participant_id,
            participants,
            "Participant registered"
        );

        Ok(RegisterOutput {
            session_id,
            deadline: registration.deadline,
            opened_session: registration.first,
            participants,
        })
    }

    /// Record a submission. The submission that completes the set finalizes
    /// the session before this call returns.
    pub async fn submit(
        &self,
        participant_id: ParticipantId,
        artifact: ArtifactRef,
    ) -> BattleResult<SubmitOutput> {
        let (session_id, all_submitted, claim) = {
            let mut slot = self.inner.slot.lock().await;
            let active = slot.as_mut().ok_or(BattleError::NotRegistered)?;

            let all_submitted = active.session.record_submission(participant_id, artifact)?;
            let session_id = active.session.id();
            tracing::info!(
                %session_id,
                %participant_id,
                submitted = active.session.participants().submitted_count(),
                participants = active.session.participants().len(),
                "Submission recorded"
            );

            let claim = if all_submitted {
                active.claim(FinalizeReason::Completion)
            } else {
                None
            };
            (session_id, all_submitted, claim)
        };

        let report = match claim {
            Some(claim) => Some(self.run_finalize(claim).await),
            None => None,
        };

        Ok(SubmitOutput {
            session_id,
            all_submitted,
            report,
        })
    }

    /// Finalize `session_id` if it is still collecting and nobody has
    /// claimed it yet. Returns `None` when this trigger lost the claim.
    pub async fn finalize(
        &self,
        session_id: SessionId,
        reason: FinalizeReason,
    ) -> Option<FinalizeReport> {
        let claim = {
            let mut slot = self.inner.slot.lock().await;
            match slot.as_mut() {
                Some(active) if active.session.id() == session_id => active.claim(reason),
                _ => None,
            }
        };

        match claim {
            Some(claim) => Some(self.run_finalize(claim).await),
            None => {
                tracing::debug!(%session_id, %reason, "Finalize trigger ignored, already claimed");
                None
            }
        }
    }

    /// Discard the active session without evaluating or notifying anyone.
    ///
    /// Returns whether there was a session to discard.
    pub async fn reset(&self) -> bool {
        let mut slot = self.inner.slot.lock().await;
        match slot.take() {
            Some(mut active) => {
                let timer_armed = active.timer.is_armed();
                active.timer.cancel();
                tracing::warn!(
                    session_id = %active.session.id(),
                    state = %active.session.state(),
                    timer_armed,
                    participants = active.session.participants().len(),
                    "Battle session discarded"
                );
                true
            }
            None => false,
        }
    }

    pub async fn status(&self) -> SessionStatus {
        let slot = self.inner.slot.lock().await;
        match slot.as_ref() {
            Some(active) => {
                let session = &active.session;
                SessionStatus {
                    session_id: Some(session.id()),
                    state: Some(session.state()),
                    participants: session.participants().len(),
                    submitted: session.participants().submitted_count(),
                    opened_at: Some(session.created_at()),
                    deadline: session.deadline(),
                }
            }
            None => SessionStatus::default(),
        }
    }

    async fn run_finalize(&self, claim: FinalizeClaim) -> FinalizeReport {
        let report = finalize::execute(
            &self.inner.evaluator,
            &self.inner.broadcaster,
            &self.inner.config,
            claim,
        )
        .await;
        self.close(report.session_id).await;
        report
    }

    async fn close(&self, session_id: SessionId) {
        let mut slot = self.inner.slot.lock().await;
        if !slot
            .as_ref()
            .is_some_and(|active| active.session.id() == session_id)
        {
            tracing::warn!(%session_id, "Session was discarded before it could close");
            return;
        }

        if let Some(mut active) = slot.take() {
            if let Err(e) = active.session.close() {
                e.log();
            }
            tracing::info!(%session_id, "Battle session closed");
        }
    }
}
