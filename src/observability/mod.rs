//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! handlers, store, runner  → tracing events with structured fields
//! daemon stdout/stderr     → tracing events under the `daemon` target
//! every HTTP request       → TraceLayer span carrying x-request-id
//!     → logging.rs subscriber (pretty or JSON) → stdout
//! ```

pub mod logging;

pub use logging::init_logging;
