//! Domain Entities
//!
//! Core business entities for the battle domain.

use chrono::{DateTime, Utc};
use derive_more::Display;
use kernel::id::SessionId;
use serde::Serialize;
use std::time::Duration;

use crate::domain::participant_store::ParticipantStore;
use crate::domain::value_objects::{ArtifactRef, ParticipantId, WalletAddress};
use crate::error::{BattleError, BattleResult};

/// A participant's one and only artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub artifact: ArtifactRef,
    pub submitted_at: DateTime<Utc>,
}

/// Participant entity - a registered identity in the current session
#[derive(Debug, Clone)]
pub struct Participant {
    id: ParticipantId,
    display_name: String,
    wallet: WalletAddress,
    submission: Option<Submission>,
}

impl Participant {
    pub fn new(id: ParticipantId, display_name: impl Into<String>, wallet: WalletAddress) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            wallet,
            submission: None,
        }
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn wallet(&self) -> &WalletAddress {
        &self.wallet
    }

    pub fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    pub fn has_submitted(&self) -> bool {
        self.submission.is_some()
    }

    /// Attach the artifact. A second call is rejected and leaves the first
    /// submission untouched.
    pub fn submit(&mut self, artifact: ArtifactRef) -> BattleResult<()> {
        if self.submission.is_some() {
            return Err(BattleError::DuplicateSubmission);
        }
        self.submission = Some(Submission {
            artifact,
            submitted_at: Utc::now(),
        });
        Ok(())
    }
}

/// Session lifecycle state. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[display("forming")]
    Forming,
    #[display("collecting")]
    Collecting,
    #[display("finalizing")]
    Finalizing,
    #[display("closed")]
    Closed,
}

impl SessionState {
    /// Whether `next` is the immediate successor of `self`
    pub const fn can_advance_to(&self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (SessionState::Forming, SessionState::Collecting)
                | (SessionState::Collecting, SessionState::Finalizing)
                | (SessionState::Finalizing, SessionState::Closed)
        )
    }

    pub const fn accepts_registrations(&self) -> bool {
        matches!(self, SessionState::Forming | SessionState::Collecting)
    }

    pub const fn accepts_submissions(&self) -> bool {
        matches!(self, SessionState::Collecting)
    }
}

/// Result of a successful registration
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    /// The store went from empty to one participant
    pub first: bool,
    pub deadline: DateTime<Utc>,
}

/// Session entity - one registration → collection → finalize run
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    state: SessionState,
    participants: ParticipantStore,
    deadline: Option<DateTime<Utc>>,
    finalized_once: bool,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            state: SessionState::Forming,
            participants: ParticipantStore::new(),
            deadline: None,
            finalized_once: false,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn participants(&self) -> &ParticipantStore {
        &self.participants
    }

    /// Add a participant. The first registration moves the session into
    /// `Collecting` and fixes the deadline `window` from now.
    pub fn register(
        &mut self,
        id: ParticipantId,
        display_name: &str,
        raw_wallet: &str,
        window: Duration,
    ) -> BattleResult<Registration> {
        if !self.state.accepts_registrations() {
            return Err(BattleError::SessionNotCollecting { state: self.state });
        }

        // Resolve the deadline before touching the store so a bad window
        // leaves the session untouched.
        let opening_deadline = match self.state {
            SessionState::Forming => Some(deadline_after(Utc::now(), window)?),
            _ => None,
        };

        let first = self.participants.register(id, display_name, raw_wallet)?;

        if let Some(deadline) = opening_deadline {
            self.deadline = Some(deadline);
            self.advance(SessionState::Collecting)?;
        }

        let deadline = self
            .deadline
            .ok_or_else(|| BattleError::Internal("collecting session without deadline".into()))?;

        Ok(Registration { first, deadline })
    }

    /// Record a submission; returns whether everyone has now submitted.
    pub fn record_submission(
        &mut self,
        id: ParticipantId,
        artifact: ArtifactRef,
    ) -> BattleResult<bool> {
        if !self.state.accepts_submissions() {
            return Err(BattleError::SessionNotCollecting { state: self.state });
        }
        self.participants.record_submission(id, artifact)
    }

    /// Claim finalization.
    ///
    /// Check-and-set of the finalize guard: returns `true` exactly once per
    /// session, and only while collecting.
    pub fn begin_finalize(&mut self) -> bool {
        if self.finalized_once || self.state != SessionState::Collecting {
            return false;
        }
        self.finalized_once = true;
        self.state = SessionState::Finalizing;
        true
    }

    /// Move a finalizing session to `Closed` and drop its participants.
    pub fn close(&mut self) -> BattleResult<()> {
        self.advance(SessionState::Closed)?;
        self.participants.clear();
        Ok(())
    }

    fn advance(&mut self, next: SessionState) -> BattleResult<()> {
        if !self.state.can_advance_to(next) {
            return Err(BattleError::Internal(format!(
                "illegal session transition {} -> {}",
                self.state, next
            )));
        }
        self.state = next;
        Ok(())
    }
}

/// `now + window`, or an error when the window does not fit a timestamp
fn deadline_after(now: DateTime<Utc>, window: Duration) -> BattleResult<DateTime<Utc>> {
    chrono::Duration::from_std(window)
        .ok()
        .and_then(|window| now.checked_add_signed(window))
        .ok_or_else(|| BattleError::Internal(format!("window out of range: {window:?}")))
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W1: &str = "0x1111111111111111111111111111111111111111";
    const W2: &str = "0x2222222222222222222222222222222222222222";
    const WINDOW: Duration = Duration::from_secs(300);

    fn artifact(handle: &str) -> ArtifactRef {
        ArtifactRef::new(handle).unwrap()
    }

    #[test]
    fn test_state_transitions_only_move_forward() {
        use SessionState::*;
        assert!(Forming.can_advance_to(Collecting));
        assert!(Collecting.can_advance_to(Finalizing));
        assert!(Finalizing.can_advance_to(Closed));

        assert!(!Forming.can_advance_to(Finalizing));
        assert!(!Collecting.can_advance_to(Forming));
        assert!(!Closed.can_advance_to(Forming));
        assert!(!Collecting.can_advance_to(Closed));
    }

    #[test]
    fn test_first_registration_starts_collecting() {
        let mut session = Session::new();
        assert_eq!(session.state(), SessionState::Forming);
        assert!(session.deadline().is_none());

        let reg = session.register(ParticipantId::new(1), "alice", W1, WINDOW).unwrap();
        assert!(reg.first);
        assert_eq!(session.state(), SessionState::Collecting);

        let deadline = session.deadline().unwrap();
        assert_eq!(reg.deadline, deadline);
        let remaining = deadline - Utc::now();
        assert!(remaining <= chrono::Duration::seconds(300));
        assert!(remaining > chrono::Duration::seconds(290));

        let reg = session.register(ParticipantId::new(2), "bob", W2, WINDOW).unwrap();
        assert!(!reg.first);
        assert_eq!(reg.deadline, deadline);
    }

    #[test]
    fn test_failed_first_registration_keeps_forming() {
        let mut session = Session::new();
        let err = session
            .register(ParticipantId::new(1), "alice", "not-a-wallet", WINDOW)
            .unwrap_err();
        assert!(matches!(err, BattleError::InvalidWallet(_)));
        assert_eq!(session.state(), SessionState::Forming);
        assert!(session.participants().is_empty());
    }

    #[test]
    fn test_unrepresentable_window_leaves_session_untouched() {
        for window in [
            Duration::from_secs(u64::MAX),
            Duration::from_secs(10_000_000_000_000),
        ] {
            let mut session = Session::new();
            let err = session
                .register(ParticipantId::new(1), "alice", W1, window)
                .unwrap_err();
            assert!(matches!(err, BattleError::Internal(_)));
            assert_eq!(session.state(), SessionState::Forming);
            assert!(session.participants().is_empty());
            assert!(session.deadline().is_none());

            let reg = session.register(ParticipantId::new(1), "alice", W1, WINDOW).unwrap();
            assert!(reg.first);
            assert_eq!(session.state(), SessionState::Collecting);
        }
    }

    #[test]
    fn test_submission_rejected_while_forming() {
        let mut session = Session::new();
        let err = session
            .record_submission(ParticipantId::new(1), artifact("a.mp3"))
            .unwrap_err();
        assert!(matches!(
            err,
            BattleError::SessionNotCollecting {
                state: SessionState::Forming
            }
        ));
    }

    #[test]
    fn test_begin_finalize_claims_once() {
        let mut session = Session::new();
        assert!(!session.begin_finalize(), "cannot finalize while forming");

        session.register(ParticipantId::new(1), "alice", W1, WINDOW).unwrap();
        assert!(session.begin_finalize());
        assert_eq!(session.state(), SessionState::Finalizing);

        assert!(!session.begin_finalize());
    }

    #[test]
    fn test_finalizing_session_rejects_events() {
        let mut session = Session::new();
        session.register(ParticipantId::new(1), "alice", W1, WINDOW).unwrap();
        assert!(session.begin_finalize());

        assert!(matches!(
            session.register(ParticipantId::new(2), "bob", W2, WINDOW),
            Err(BattleError::SessionNotCollecting { .. })
        ));
        assert!(matches!(
            session.record_submission(ParticipantId::new(1), artifact("late.mp3")),
            Err(BattleError::SessionNotCollecting { .. })
        ));
    }

    #[test]
    fn test_close_clears_participants() {
        let mut session = Session::new();
        session.register(ParticipantId::new(1), "alice", W1, WINDOW).unwrap();
        assert!(session.close().is_err(), "must finalize before closing");

        assert!(session.begin_finalize());
        session.close().unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.participants().is_empty());
    }

    #[test]
    fn test_participant_submit_once() {
        let wallet = WalletAddress::parse(W1).unwrap();
        let mut participant = Participant::new(ParticipantId::new(1), "alice", wallet);
        assert!(!participant.has_submitted());

        participant.submit(artifact("first.mp3")).unwrap();
        let first_at = participant.submission().unwrap().submitted_at;

        assert!(matches!(
            participant.submit(artifact("second.mp3")),
            Err(BattleError::DuplicateSubmission)
        ));
        let stored = participant.submission().unwrap();
        assert_eq!(stored.artifact.as_str(), "first.mp3");
        assert_eq!(stored.submitted_at, first_at);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::Collecting.to_string(), "collecting");
        assert_eq!(
            serde_json::to_string(&SessionState::Finalizing).unwrap(),
            r#""finalizing""#
        );
    }
}
