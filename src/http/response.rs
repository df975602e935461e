//! Response bodies and error mapping.
//!
//! Component errors are mapped to status codes here and nowhere else:
//! - 400: malformed body, invalid configuration, unsupported action
//! - 404: unknown locale
//! - 500: persistence, process control, translation parse failures
//!
//! Error bodies are plain text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigStoreError;
use crate::i18n::I18nError;
use crate::process::RunnerError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    Decode(String),
    #[error("Invalid action: {0:?}")]
    UnsupportedAction(String),
    #[error(transparent)]
    Config(#[from] ConfigStoreError),
    #[error(transparent)]
    Runner(#[from] RunnerError),
    #[error(transparent)]
    I18n(#[from] I18nError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Decode(_) | ApiError::UnsupportedAction(_) => StatusCode::BAD_REQUEST,
            ApiError::Config(ConfigStoreError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Runner(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::I18n(I18nError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::I18n(I18nError::Parse { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

/// Body of `GET /api/status`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub running: bool,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn from_check(running: bool, error: Option<RunnerError>) -> Self {
        match error {
            Some(e) => Self {
                running,
                status: "error".to_string(),
                error: Some(e.to_string()),
            },
            None => Self {
                running,
                status: if running { "running" } else { "stopped" }.to_string(),
                error: None,
            },
        }
    }
}

/// Body of `POST /api/control`.
#[derive(Debug, Deserialize, Serialize)]
pub struct ControlRequest {
    pub action: String,
}

/// Acknowledgement returned by `POST /api/control`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControlResponse {
    pub success: bool,
    pub action: String,
    pub message: String,
}

impl ControlResponse {
    pub fn started() -> Self {
        Self {
            success: true,
            action: "start".to_string(),
            message: "Tunnel started successfully".to_string(),
        }
    }

    pub fn stop_initiated() -> Self {
        Self {
            success: true,
            action: "stop".to_string(),
            message: "Tunnel stop initiated".to_string(),
        }
    }
}
