//! Configuration schema definitions.
//!
//! Two documents live here:
//! - [`TunnelConfig`]: the single persisted record that drives the daemon.
//!   It is read and replaced through the HTTP API.
//! - [`PanelSettings`]: how the panel itself runs (listen address, data
//!   directory, daemon timing, logging). Loaded once from TOML at startup.
//!
//! All types derive Serde traits; every field has a default so partial
//! documents are accepted.

use serde::{Deserialize, Serialize};

/// Persisted settings for the tunnel daemon.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TunnelConfig {
    /// Tunnel token, handed to the daemon through its environment.
    pub token: String,

    /// Daemon executable, resolved through `PATH` when not absolute.
    pub binary_path: String,

    /// Transport protocol (`auto`, `quic`, `http2`).
    pub protocol: String,

    /// Edge IP version (`auto`, `4`, `6`).
    pub edge_ip_version: String,

    /// Edge region; empty selects the global region.
    pub region: String,

    /// Daemon log level.
    pub log_level: String,

    /// Disable the daemon's self-update.
    pub no_autoupdate: bool,

    /// Start the daemon when the panel starts.
    pub auto_start: bool,

    /// Extra arguments placed after the generated flags, before `run`.
    pub extra_args: Vec<String>,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            binary_path: "cloudflared".to_string(),
            protocol: "auto".to_string(),
            edge_ip_version: "auto".to_string(),
            region: String::new(),
            log_level: "info".to_string(),
            no_autoupdate: true,
            auto_start: false,
            extra_args: Vec::new(),
        }
    }
}

/// Root settings for the panel process.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PanelSettings {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Where the tunnel configuration is persisted.
    pub storage: StorageConfig,

    /// Daemon supervision timing.
    pub daemon: DaemonConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Overrides for bundled resources.
    pub assets: AssetsConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:14333").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:14333".to_string(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `config.json`.
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

/// Daemon supervision configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Seconds to wait for a graceful exit before killing the daemon.
    pub stop_grace_secs: u64,

    /// Interval between liveness polls while stopping, in milliseconds.
    pub stop_poll_ms: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            stop_grace_secs: 10,
            stop_poll_ms: 100,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Bundled resource overrides.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AssetsConfig {
    /// Read `<locale>.toml` bundles from this directory instead of the
    /// ones compiled into the binary.
    pub locales_dir: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_tunnel_config_uses_defaults() {
        let config: TunnelConfig = serde_json::from_str(r#"{"token":"abc"}"#).unwrap();
        assert_eq!(config.token, "abc");
        assert_eq!(config.binary_path, "cloudflared");
        assert!(config.no_autoupdate);
        assert!(config.extra_args.is_empty());
    }

    #[test]
    fn test_partial_settings_from_toml() {
        let settings: PanelSettings = toml::from_str(
            r#"
            [listener]
            bind_address = "0.0.0.0:9000"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(settings.listener.bind_address, "0.0.0.0:9000");
        assert_eq!(settings.observability.log_format, LogFormat::Json);
        assert_eq!(settings.observability.log_level, "info");
        assert_eq!(settings.daemon.stop_grace_secs, 10);
    }
}
