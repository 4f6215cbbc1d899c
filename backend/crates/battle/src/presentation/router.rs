//! Battle Router

use crate::application::coordinator::SessionCoordinator;
use crate::domain::gateway::{EvaluationClient, ResultBroadcaster};
use crate::infra::http_evaluation::HttpEvaluationClient;
use crate::infra::telegram::TelegramBroadcaster;
use crate::presentation::handlers::{self, BattleAppState};
use axum::{
    Router,
    routing::{get, post},
};

/// Create the battle router wired to the HTTP evaluation service and Telegram
pub fn battle_router(
    coordinator: SessionCoordinator<HttpEvaluationClient, TelegramBroadcaster>,
) -> Router {
    battle_router_generic(coordinator)
}

/// Create a battle router for any collaborator implementations
pub fn battle_router_generic<E, B>(coordinator: SessionCoordinator<E, B>) -> Router
where
    E: EvaluationClient + Sync + 'static,
    B: ResultBroadcaster + Sync + 'static,
{
    let state = BattleAppState { coordinator };

    Router::new()
        .route("/register", post(handlers::register::<E, B>))
        .route("/submit", post(handlers::submit::<E, B>))
        .route("/status", get(handlers::status::<E, B>))
        .with_state(state)
}
