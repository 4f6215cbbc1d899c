//! Battle Error Types
//!
//! Battle-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::entities::SessionState;

pub type BattleResult<T> = Result<T, BattleError>;

/// Battle-specific error variants
///
/// Validation variants are reported back to the originating participant and
/// never change session state. Collaborator variants only arise while a
/// session is being finalized.
#[derive(Debug, Error)]
pub enum BattleError {
    #[error("Participant is already registered for the current battle")]
    AlreadyRegistered,

    #[error("Invalid wallet address: {0}")]
    InvalidWallet(#[from] platform::wallet::AddressFormatError),

    #[error("Participant is not registered for the current battle")]
    NotRegistered,

    #[error("Participant has already submitted an artifact")]
    DuplicateSubmission,

    /// Registration or submission outside the window that accepts it
    #[error("Battle is not accepting this request (state: {state})")]
    SessionNotCollecting { state: SessionState },

    /// A deadline timer was armed twice; indicates a coordinator bug
    #[error("Deadline timer already armed")]
    AlreadyArmed,

    /// Malformed request from the chat transport
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Evaluation service error: {0}")]
    Evaluation(String),

    #[error("Broadcast failed: {0}")]
    Broadcast(String),

    /// Startup configuration outside the supported range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BattleError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BattleError::AlreadyRegistered
            | BattleError::DuplicateSubmission
            | BattleError::SessionNotCollecting { .. } => ErrorKind::Conflict,
            BattleError::InvalidWallet(_) => ErrorKind::UnprocessableEntity,
            BattleError::NotRegistered => ErrorKind::NotFound,
            BattleError::InvalidRequest(_) => ErrorKind::BadRequest,
            BattleError::Evaluation(_) | BattleError::Broadcast(_) => ErrorKind::BadGateway,
            BattleError::AlreadyArmed
            | BattleError::InvalidConfig(_)
            | BattleError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Whether this is a per-request validation failure
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BattleError::AlreadyRegistered
                | BattleError::InvalidWallet(_)
                | BattleError::NotRegistered
                | BattleError::DuplicateSubmission
                | BattleError::SessionNotCollecting { .. }
                | BattleError::InvalidRequest(_)
        )
    }

    /// Next step offered to the participant alongside the message
    fn action(&self) -> Option<&'static str> {
        match self {
            BattleError::AlreadyRegistered => Some("Wait for the current battle to finish"),
            BattleError::InvalidWallet(_) => {
                Some("Send a 0x-prefixed address with 40 hexadecimal characters")
            }
            BattleError::NotRegistered => Some("Register with your wallet address first"),
            BattleError::DuplicateSubmission => Some("Only your first submission counts"),
            BattleError::SessionNotCollecting { .. } => {
                Some("Try again once the current battle has been resolved")
            }
            _ => None,
        }
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            BattleError::AlreadyArmed => {
                tracing::error!("Deadline timer armed twice; session invariant violated");
            }
            BattleError::InvalidConfig(msg) => {
                tracing::error!(message = %msg, "Battle configuration rejected");
            }
            BattleError::Internal(msg) => {
                tracing::error!(message = %msg, "Battle internal error");
            }
            BattleError::Evaluation(msg) => {
                tracing::error!(message = %msg, "Evaluation service failed");
            }
            BattleError::Broadcast(msg) => {
                tracing::warn!(message = %msg, "Result broadcast failed");
            }
            _ => {
                tracing::debug!(error = %self, "Battle request rejected");
            }
        }
    }
}

impl From<BattleError> for AppError {
    fn from(err: BattleError) -> Self {
        let kind = err.kind();
        let action = err.action();
        let app_err = AppError::new(kind, err.to_string());
        match action {
            Some(action) => app_err.with_action(action),
            None => app_err,
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for BattleError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        BattleError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for BattleError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
