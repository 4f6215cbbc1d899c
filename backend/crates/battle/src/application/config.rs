//! Application Configuration
//!
//! Configuration for the battle application layer.

use std::time::Duration;

use crate::error::{BattleError, BattleResult};

/// Longest accepted registration window
pub const MAX_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Battle session configuration
#[derive(Debug, Clone)]
pub struct BattleConfig {
    /// Time from the first registration to the deadline
    pub window: Duration,
    /// Upper bound on one evaluation call
    pub evaluation_timeout: Duration,
    /// Upper bound on delivering the outcome to one participant
    pub broadcast_timeout: Duration,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(300),
            evaluation_timeout: Duration::from_secs(60),
            broadcast_timeout: Duration::from_secs(10),
        }
    }
}

impl BattleConfig {
    /// Default config with a custom window
    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            ..Default::default()
        }
    }

    /// Short window for local runs
    pub fn development() -> Self {
        Self::with_window(Duration::from_secs(60))
    }

    pub fn window_secs(&self) -> u64 {
        self.window.as_secs()
    }

    /// Reject windows and timeouts the coordinator cannot work with.
    pub fn validate(&self) -> BattleResult<()> {
        if self.window.is_zero() || self.window > MAX_WINDOW {
            return Err(BattleError::InvalidConfig(format!(
                "window must be between 1 and {} seconds, got {}",
                MAX_WINDOW.as_secs(),
                self.window.as_secs()
            )));
        }
        if self.evaluation_timeout.is_zero() || self.broadcast_timeout.is_zero() {
            return Err(BattleError::InvalidConfig(
                "collaborator timeouts must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
