//! Domain Value Objects
//!
//! Immutable value types for the battle domain.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BattleError, BattleResult};

/// Participant identity as issued by the chat transport
///
/// Stable per user; doubles as the chat id results are delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(i64);

impl ParticipantId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ParticipantId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Validated wallet address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Parse raw chat text into an address.
    ///
    /// Surrounding whitespace is ignored; the case of the hex digits is kept.
    pub fn parse(raw: &str) -> BattleResult<Self> {
        let trimmed = raw.trim();
        platform::wallet::check_address_format(trimmed)?;
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against an address reported by an external service.
    ///
    /// Hex digits are compared case-insensitively: checksummed and lowercase
    /// spellings name the same account.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque handle to a submitted artifact
///
/// The transport persists the audio and hands us a reference; its meaning
/// is the transport's business.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn new(handle: impl Into<String>) -> BattleResult<Self> {
        let handle = handle.into();
        if handle.trim().is_empty() {
            return Err(BattleError::InvalidRequest(
                "artifact reference cannot be empty".to_string(),
            ));
        }
        Ok(Self(handle))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
