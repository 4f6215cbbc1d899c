//! HTTP Handlers
//!
//! Endpoints the chat transport calls when a user registers or submits.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use chrono::Utc;

use crate::application::coordinator::{RegisterInput, SessionCoordinator};
use crate::domain::gateway::{EvaluationClient, ResultBroadcaster};
use crate::domain::value_objects::{ArtifactRef, ParticipantId};
use crate::error::BattleResult;
use crate::presentation::dto::{
    RegisterRequest, RegisterResponse, StatusResponse, SubmitRequest, SubmitResponse,
};

/// Shared state for battle handlers
pub struct BattleAppState<E, B> {
    pub coordinator: SessionCoordinator<E, B>,
}

impl<E, B> Clone for BattleAppState<E, B> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
        }
    }
}

/// POST /api/battle/register
pub async fn register<E, B>(
    State(state): State<BattleAppState<E, B>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> BattleResult<(StatusCode, Json<RegisterResponse>)>
where
    E: EvaluationClient + Sync + 'static,
    B: ResultBroadcaster + Sync + 'static,
{
    let Json(req) = payload?;

    let output = state
        .coordinator
        .register(RegisterInput {
            participant_id: ParticipantId::new(req.participant_id),
            display_name: req.display_name,
            wallet: req.wallet,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse::from_output(output, Utc::now())),
    ))
}

/// POST /api/battle/submit
pub async fn submit<E, B>(
    State(state): State<BattleAppState<E, B>>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> BattleResult<Json<SubmitResponse>>
where
    E: EvaluationClient + Sync + 'static,
    B: ResultBroadcaster + Sync + 'static,
{
    let Json(req) = payload?;
    let artifact = ArtifactRef::new(req.artifact)?;

    let output = state
        .coordinator
        .submit(ParticipantId::new(req.participant_id), artifact)
        .await?;

    Ok(Json(output.into()))
}

/// GET /api/battle/status
pub async fn status<E, B>(State(state): State<BattleAppState<E, B>>) -> Json<StatusResponse>
where
    E: EvaluationClient + Sync + 'static,
    B: ResultBroadcaster + Sync + 'static,
{
    let status = state.coordinator.status().await;
    Json(StatusResponse::from_status(status, Utc::now()))
}
