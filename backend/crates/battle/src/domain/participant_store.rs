//! Participant Store
//!
//! Authoritative record of who is registered in the current session and
//! what they have submitted. Insertion order is preserved so snapshots,
//! evaluation requests and broadcasts all see participants in the order
//! they joined.

use std::collections::HashMap;

use crate::domain::entities::Participant;
use crate::domain::value_objects::{ArtifactRef, ParticipantId, WalletAddress};
use crate::error::{BattleError, BattleResult};

#[derive(Debug, Default)]
pub struct ParticipantStore {
    participants: Vec<Participant>,
    index: HashMap<ParticipantId, usize>,
}

impl ParticipantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant.
    ///
    /// Returns `true` when this is the first participant in the store.
    pub fn register(
        &mut self,
        id: ParticipantId,
        display_name: &str,
        raw_wallet: &str,
    ) -> BattleResult<bool> {
        if self.contains(id) {
            return Err(BattleError::AlreadyRegistered);
        }
        let wallet = WalletAddress::parse(raw_wallet)?;

        let first = self.participants.is_empty();
        self.index.insert(id, self.participants.len());
        self.participants
            .push(Participant::new(id, display_name.trim(), wallet));
        Ok(first)
    }

    /// Record a participant's artifact.
    ///
    /// Returns whether every registered participant has now submitted.
    pub fn record_submission(
        &mut self,
        id: ParticipantId,
        artifact: ArtifactRef,
    ) -> BattleResult<bool> {
        let position = *self.index.get(&id).ok_or(BattleError::NotRegistered)?;
        self.participants[position].submit(artifact)?;
        Ok(self.all_submitted())
    }

    pub fn all_submitted(&self) -> bool {
        !self.participants.is_empty() && self.participants.iter().all(Participant::has_submitted)
    }

    /// Owned copy of every participant, in registration order.
    pub fn snapshot(&self) -> Vec<Participant> {
        self.participants.clone()
    }

    /// Owned copy of the participants that have submitted, in registration order.
    pub fn submitted_snapshot(&self) -> Vec<Participant> {
        self.participants
            .iter()
            .filter(|p| p.has_submitted())
            .cloned()
            .collect()
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.index.get(&id).map(|&position| &self.participants[position])
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn submitted_count(&self) -> usize {
        self.participants.iter().filter(|p| p.has_submitted()).count()
    }

    pub fn clear(&mut self) {
        self.participants.clear();
        self.index.clear();
    }
}
