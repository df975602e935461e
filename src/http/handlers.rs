//! API handlers.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::config::TunnelConfig;
use crate::http::response::{ApiError, ControlRequest, ControlResponse, StatusResponse};
use crate::http::server::AppState;
use crate::i18n::{Translations, DEFAULT_LOCALE};
use crate::process::{PendingStop, RunnerError};
use crate::version::BuildInfo;

/// Delay before a detached stop begins, so the acknowledgement is written
/// out before the daemon carrying the client's connection goes away.
pub const STOP_FLUSH_DELAY: Duration = Duration::from_millis(100);

/// Decode a JSON body regardless of the declared content type.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}

pub async fn get_config(State(state): State<AppState>) -> Json<TunnelConfig> {
    Json(state.store.get())
}

pub async fn save_config(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let config: TunnelConfig = decode(&body)?;

    let store = state.store.clone();
    tokio::task::spawn_blocking(move || store.save(config))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(StatusCode::OK)
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let (running, error) = state.runner.status();
    Json(StatusResponse::from_check(running, error))
}

pub async fn control(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ControlResponse>, ApiError> {
    let request: ControlRequest = decode(&body)?;

    match request.action.as_str() {
        "start" => {
            state.runner.start().await?;
            Ok(Json(ControlResponse::started()))
        }
        "stop" => {
            spawn_detached_stop(state.runner.reserve_stop().await);
            Ok(Json(ControlResponse::stop_initiated()))
        }
        _ => Err(ApiError::UnsupportedAction(request.action)),
    }
}

/// Run a reserved stop in the background. The lifecycle lock is already
/// held, so starts arriving meanwhile queue behind this stop. Nothing keeps
/// the task handle; the only outlet for a failure is the log.
fn spawn_detached_stop(pending: PendingStop) {
    tokio::spawn(async move {
        tokio::time::sleep(STOP_FLUSH_DELAY).await;
        match pending.run().await {
            Ok(()) => {}
            Err(RunnerError::NotRunning) => tracing::info!("Stop requested but tunnel was not running"),
            Err(e) => tracing::error!(error = %e, "Error stopping tunnel"),
        }
    });
}

pub async fn get_translations(
    State(state): State<AppState>,
    Path(locale): Path<String>,
) -> Result<Json<Translations>, ApiError> {
    load_translations(&state, &locale)
}

pub async fn get_default_translations(
    State(state): State<AppState>,
) -> Result<Json<Translations>, ApiError> {
    load_translations(&state, DEFAULT_LOCALE)
}

fn load_translations(state: &AppState, locale: &str) -> Result<Json<Translations>, ApiError> {
    Ok(Json(state.translations.load(locale)?))
}

pub async fn get_version() -> Json<BuildInfo> {
    Json(BuildInfo::current())
}
