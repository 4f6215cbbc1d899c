//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::coordinator::{RegisterOutput, SessionStatus, SubmitOutput};
use crate::application::finalize::FinalizeReport;
use crate::domain::entities::SessionState;

/// Request for POST /api/battle/register
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub participant_id: i64,
    #[serde(default)]
    pub display_name: String,
    /// Raw wallet text as typed in chat
    pub wallet: String,
}

/// Response for POST /api/battle/register
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub session_id: Uuid,
    pub deadline: DateTime<Utc>,
    pub seconds_remaining: i64,
    pub opened_session: bool,
    pub participants: usize,
}

impl RegisterResponse {
    pub fn from_output(output: RegisterOutput, now: DateTime<Utc>) -> Self {
        Self {
            session_id: output.session_id.into_uuid(),
            deadline: output.deadline,
            seconds_remaining: seconds_until(output.deadline, now),
            opened_session: output.opened_session,
            participants: output.participants,
        }
    }
}

/// Request for POST /api/battle/submit
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub participant_id: i64,
    /// Handle of the audio file already persisted by the transport
    pub artifact: String,
}

/// Response for POST /api/battle/submit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub session_id: Uuid,
    pub all_submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finalized: Option<FinalizeReport>,
}

impl From<SubmitOutput> for SubmitResponse {
    fn from(output: SubmitOutput) -> Self {
        Self {
            session_id: output.session_id.into_uuid(),
            all_submitted: output.all_submitted,
            finalized: output.report,
        }
    }
}

/// Response for GET /api/battle/status
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub active: bool,
    pub session_id: Option<Uuid>,
    pub state: Option<SessionState>,
    pub participants: usize,
    pub submitted: usize,
    pub opened_at: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub seconds_remaining: Option<i64>,
}

impl StatusResponse {
    pub fn from_status(status: SessionStatus, now: DateTime<Utc>) -> Self {
        Self {
            active: status.session_id.is_some(),
            session_id: status.session_id.map(|id| id.into_uuid()),
            state: status.state,
            participants: status.participants,
            submitted: status.submitted,
            opened_at: status.opened_at,
            deadline: status.deadline,
            seconds_remaining: status.deadline.map(|d| seconds_until(d, now)),
        }
    }
}

fn seconds_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (deadline - now).num_seconds().max(0)
}
