//! Configuration validation.
//!
//! Serde handles syntax; these functions check semantics. Every problem is
//! reported, not just the first, and validation is a pure function of the
//! document.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{PanelSettings, TunnelConfig};

pub const PROTOCOLS: &[&str] = &["auto", "quic", "http2"];
pub const EDGE_IP_VERSIONS: &[&str] = &["auto", "4", "6"];
pub const REGIONS: &[&str] = &["", "us"];
pub const LOG_LEVELS: &[&str] = &["debug", "info", "warn", "error", "fatal"];

pub const MAX_STOP_GRACE_SECS: u64 = 3600;
pub const MAX_STOP_POLL_MS: u64 = 60_000;
pub const MAX_REQUEST_SECS: u64 = 3600;

/// A single semantic problem with a configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub(crate) fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn one_of(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    value: &str,
    allowed: &[&str],
) {
    if !allowed.contains(&value) {
        errors.push(ValidationError::new(
            field,
            format!("unsupported value {:?}, expected one of {:?}", value, allowed),
        ));
    }
}

fn in_range(errors: &mut Vec<ValidationError>, field: &'static str, value: u64, max: u64) {
    if value == 0 || value > max {
        errors.push(ValidationError::new(
            field,
            format!("must be between 1 and {}, got {}", max, value),
        ));
    }
}

/// Validate a tunnel configuration record before it is persisted.
pub fn validate_tunnel_config(config: &TunnelConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.binary_path.trim().is_empty() {
        errors.push(ValidationError::new("binary_path", "must not be empty"));
    }
    if config.token.chars().any(char::is_whitespace) {
        errors.push(ValidationError::new("token", "must not contain whitespace"));
    }
    one_of(&mut errors, "protocol", &config.protocol, PROTOCOLS);
    one_of(&mut errors, "edge_ip_version", &config.edge_ip_version, EDGE_IP_VERSIONS);
    one_of(&mut errors, "region", &config.region, REGIONS);
    one_of(&mut errors, "log_level", &config.log_level, LOG_LEVELS);

    if config.extra_args.iter().any(|arg| arg.is_empty()) {
        errors.push(ValidationError::new("extra_args", "must not contain empty arguments"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate panel settings loaded at startup.
pub fn validate_settings(settings: &PanelSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("{:?} is not a socket address", settings.listener.bind_address),
        ));
    }
    if settings.storage.data_dir.trim().is_empty() {
        errors.push(ValidationError::new("storage.data_dir", "must not be empty"));
    }
    in_range(&mut errors, "daemon.stop_grace_secs", settings.daemon.stop_grace_secs, MAX_STOP_GRACE_SECS);
    in_range(&mut errors, "daemon.stop_poll_ms", settings.daemon.stop_poll_ms, MAX_STOP_POLL_MS);
    in_range(&mut errors, "timeouts.request_secs", settings.timeouts.request_secs, MAX_REQUEST_SECS);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
