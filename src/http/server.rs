//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router for the API and the bundled frontend
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve on a listener until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderName, Request};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ConfigStore, PanelSettings};
use crate::http::assets::serve_asset;
use crate::http::handlers::*;
use crate::http::request::{request_id_of, MakeRequestUuidV4, X_REQUEST_ID};
use crate::i18n::TranslationLoader;
use crate::lifecycle::shutdown::wait_for;
use crate::process::ProcessRunner;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConfigStore>,
    pub runner: Arc<ProcessRunner>,
    pub translations: Arc<TranslationLoader>,
}

/// HTTP server for the control panel.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(settings: &PanelSettings, state: AppState) -> Self {
        let timeout = Duration::from_secs(settings.timeouts.request_secs);
        Self {
            router: build_router(state, timeout),
        }
    }

    /// Run the server, accepting connections on the given listener until a
    /// shutdown is broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let api = Router::new()
        .route("/api/config", get(get_config).post(save_config))
        .route("/api/status", get(get_status))
        .route("/api/control", post(control))
        .route("/api/i18n", get(get_default_translations))
        .route("/api/i18n/", get(get_default_translations))
        .route("/api/i18n/{locale}", get(get_translations))
        .route("/api/version", get(get_version));

    api.fallback(serve_asset)
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %request_id_of(request),
            )
        }))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(X_REQUEST_ID),
            MakeRequestUuidV4,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TunnelConfig;
    use crate::process::{Launch, RunnerError, RunnerOptions};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    struct NoopLauncher;

    impl Launch for NoopLauncher {
        fn command(&self, _config: &TunnelConfig) -> Result<tokio::process::Command, RunnerError> {
            Err(RunnerError::Launch("launching disabled in tests".into()))
        }
    }

    fn test_app() -> (Router, AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ConfigStore::open(dir.path()));
        let runner = Arc::new(ProcessRunner::new(
            store.clone(),
            Box::new(NoopLauncher),
            RunnerOptions::default(),
        ));
        let state = AppState {
            store,
            runner,
            translations: Arc::new(TranslationLoader::embedded()),
        };
        (build_router(state.clone(), Duration::from_secs(5)), state, dir)
    }

    async fn send(app: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_get_config_returns_default() {
        let (app, _, _dir) = test_app();
        let (status, body) = send(app, "GET", "/api/config", "").await;

        assert_eq!(status, StatusCode::OK);
        let config: TunnelConfig = serde_json::from_slice(&body).unwrap();
        assert_eq!(config, TunnelConfig::default());
    }

    #[tokio::test]
    async fn test_post_config_persists_without_content_type() {
        let (app, state, _dir) = test_app();
        let (status, body) = send(app, "POST", "/api/config", r#"{"token":"abc","protocol":"quic"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert_eq!(state.store.get().token, "abc");
        assert_eq!(state.store.get().protocol, "quic");
    }

    #[tokio::test]
    async fn test_post_malformed_config_keeps_previous() {
        let (app, state, _dir) = test_app();
        let previous = TunnelConfig {
            token: "keep-me".into(),
            ..TunnelConfig::default()
        };
        state.store.save(previous.clone()).unwrap();

        let (status, _) = send(app.clone(), "POST", "/api/config", "{\"token\":").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app, "POST", "/api/config", r#"{"protocol":"smoke-signals"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(state.store.get(), previous);
    }

    #[tokio::test]
    async fn test_config_rejects_other_methods() {
        let (app, _, _dir) = test_app();
        let (status, _) = send(app, "DELETE", "/api/config", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_status_when_stopped() {
        let (app, _, _dir) = test_app();
        let (status, body) = send(app, "GET", "/api/status", "").await;

        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, serde_json::json!({"running": false, "status": "stopped"}));
    }

    #[tokio::test]
    async fn test_control_unknown_action_is_bad_request() {
        let (app, _, _dir) = test_app();
        let (status, _) = send(app, "POST", "/api/control", r#"{"action":"bogus"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_control_malformed_body_is_bad_request() {
        let (app, _, _dir) = test_app();
        let (status, _) = send(app, "POST", "/api/control", "start").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_control_start_failure_is_server_error() {
        let (app, _, _dir) = test_app();
        let (status, body) = send(app, "POST", "/api/control", r#"{"action":"start"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(String::from_utf8(body).unwrap().contains("launching disabled"));
    }

    #[tokio::test]
    async fn test_control_stop_acknowledges_immediately() {
        let (app, _, _dir) = test_app();
        let (status, body) = send(app, "POST", "/api/control", r#"{"action":"stop"}"#).await;

        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"success": true, "action": "stop", "message": "Tunnel stop initiated"})
        );
    }

    #[tokio::test]
    async fn test_i18n_routes() {
        let (app, _, _dir) = test_app();

        let (status, body) = send(app.clone(), "GET", "/api/i18n/", "").await;
        assert_eq!(status, StatusCode::OK);
        let default: std::collections::BTreeMap<String, String> = serde_json::from_slice(&body).unwrap();

        let (_, body) = send(app.clone(), "GET", "/api/i18n/en", "").await;
        let english: std::collections::BTreeMap<String, String> = serde_json::from_slice(&body).unwrap();
        assert_eq!(default, english);

        let (status, _) = send(app, "GET", "/api/i18n/xx", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_assets() {
        let (app, _, _dir) = test_app();

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[axum::http::header::CONTENT_TYPE], "text/html");
        assert!(response.headers().contains_key(X_REQUEST_ID));

        let (status, _) = send(app.clone(), "GET", "/missing.js", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(app, "GET", "/api/unknown", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_version_endpoint() {
        let (app, _, _dir) = test_app();
        let (status, body) = send(app, "GET", "/api/version", "").await;

        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["version"], crate::version::version());
    }
}
