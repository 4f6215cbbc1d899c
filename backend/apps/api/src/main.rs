//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use anyhow::Context;
use axum::Router;
use battle::{
    BattleConfig, EvaluationClientConfig, HttpEvaluationClient, SessionCoordinator,
    TelegramBroadcaster, TelegramConfig, battle_router,
};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult, OptionExt, ResultExt},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,battle=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Battle configuration
    let mut battle_config = if cfg!(debug_assertions) {
        BattleConfig::development()
    } else {
        BattleConfig::default()
    };
    if let Ok(secs) = env::var("BATTLE_WINDOW_SECS") {
        let secs: u64 = secs
            .trim()
            .parse()
            .context("BATTLE_WINDOW_SECS must be a whole number of seconds")?;
        battle_config.window = Duration::from_secs(secs);
    }
    battle_config.validate()?;
    tracing::info!(window_secs = battle_config.window_secs(), "Battle window configured");

    // Collaborators
    let evaluation_url = env::var("EVALUATION_API_URL").map_app_err(
        ErrorKind::InternalServerError,
        "EVALUATION_API_URL must be set in environment",
    )?;
    let evaluator = HttpEvaluationClient::new(EvaluationClientConfig::new(
        evaluation_url,
        &battle_config,
    ))?;

    let bot_token = env::var("TELEGRAM_BOT_TOKEN")
        .ok()
        .filter(|token| !token.trim().is_empty())
        .ok_or_app_err(
            ErrorKind::InternalServerError,
            "TELEGRAM_BOT_TOKEN must be set in environment",
        )?;
    let mut telegram_config = TelegramConfig::new(bot_token, &battle_config);
    if let Ok(api_base) = env::var("TELEGRAM_API_BASE") {
        telegram_config.api_base = api_base;
    }
    let broadcaster = TelegramBroadcaster::new(telegram_config)?;

    let coordinator = SessionCoordinator::new(evaluator, broadcaster, Arc::new(battle_config));

    // Build router
    let app = Router::new()
        .nest("/api/battle", battle_router(coordinator.clone()))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:31113".to_string())
        .parse()
        .context("BIND_ADDR must be a socket address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // An unfinished session is dropped with the process; nobody is notified.
    if coordinator.reset().await {
        tracing::warn!("Shut down with a battle in progress");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
