//! Battle Session Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Session state machine, participants, collaborator traits
//! - `application/` - Session coordinator, deadline timer, finalize use case
//! - `infra/` - Evaluation service and Telegram clients
//! - `presentation/` - HTTP handlers for the chat transport
//!
//! ## Session Model
//! - At most one battle session is active per process
//! - The first registration opens the session and starts its deadline
//! - A session is finalized exactly once, by whichever comes first: the last
//!   submission or the deadline
//! - Finalization evaluates the submissions once and notifies every participant

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::BattleConfig;
pub use application::coordinator::{RegisterInput, SessionCoordinator, SessionStatus};
pub use application::finalize::{FinalizeReason, FinalizeReport};
pub use domain::services::BattleOutcome;
pub use error::{BattleError, BattleResult};
pub use infra::http_evaluation::{EvaluationClientConfig, HttpEvaluationClient};
pub use infra::telegram::{TelegramBroadcaster, TelegramConfig};
pub use presentation::router::{battle_router, battle_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult, OptionExt, ResultExt},
    kind::ErrorKind,
};
