//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! panel settings (TOML, read once)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → PanelSettings (immutable for the process lifetime)
//!
//! tunnel configuration (JSON, read/write over HTTP)
//!     → store.rs open (default when missing)
//!     → POST /api/config → validation.rs → atomic file replace
//!     → ArcSwap snapshot observed by GET /api/config and the runner
//! ```
//!
//! # Design Decisions
//! - The tunnel record is replaced whole; there is no partial merge
//! - All fields have defaults to allow minimal documents
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod store;
pub mod validation;

pub use loader::{load_settings, ConfigError};
pub use schema::{LogFormat, PanelSettings, TunnelConfig};
pub use store::{ConfigStore, ConfigStoreError};
pub use validation::ValidationError;
