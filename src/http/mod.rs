//! HTTP gateway.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, request ID, tracing, timeout)
//!     → handlers.rs (/api/*: config store, process runner, translations)
//!       or assets.rs (everything else: bundled frontend)
//!     → response.rs (JSON bodies, error → status mapping)
//! ```

pub mod assets;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::{ApiError, ControlRequest, ControlResponse, StatusResponse};
pub use server::{build_router, AppState, HttpServer};
