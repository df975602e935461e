//! Local control panel for a tunnel daemon.
//!
//! Serves an HTTP API to read and replace the daemon configuration, query
//! its status, and start or stop it, alongside a bundled web frontend and
//! its translations.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!   Browser / CLI    │                  TUNNEL PANEL                    │
//!  ─────────────────▶│  ┌─────────┐   ┌──────────────┐                  │
//!                    │  │  http   │──▶│ config store │──▶ config.json   │
//!                    │  │ gateway │   └──────────────┘                  │
//!                    │  │         │   ┌──────────────┐                  │
//!                    │  │         │──▶│process runner│──▶ cloudflared   │
//!                    │  │         │   └──────────────┘                  │
//!                    │  │         │   ┌──────────────┐                  │
//!                    │  │         │──▶│    i18n      │──▶ locales/*.toml│
//!                    │  └─────────┘   └──────────────┘                  │
//!                    │  cross-cutting: observability, lifecycle         │
//!                    └──────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod i18n;
pub mod process;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod version;

pub use config::{ConfigStore, PanelSettings, TunnelConfig};
pub use http::{AppState, HttpServer};
pub use i18n::TranslationLoader;
pub use lifecycle::Shutdown;
pub use process::ProcessRunner;
