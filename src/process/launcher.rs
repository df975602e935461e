//! Daemon command construction.

use tokio::process::Command;

use crate::config::TunnelConfig;
use crate::process::RunnerError;

/// Environment variable the daemon reads its tunnel token from.
pub const TOKEN_ENV: &str = "TUNNEL_TOKEN";

/// Builds the command that launches the daemon for a configuration.
///
/// The runner applies stdio, process-group and kill-on-drop settings on top
/// of whatever is returned here.
pub trait Launch: Send + Sync {
    fn command(&self, config: &TunnelConfig) -> Result<Command, RunnerError>;
}

/// Launches `cloudflared tunnel run` with the token passed via environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloudflaredLauncher;

impl Launch for CloudflaredLauncher {
    fn command(&self, config: &TunnelConfig) -> Result<Command, RunnerError> {
        if config.token.is_empty() {
            return Err(RunnerError::Launch("tunnel token is not configured".to_string()));
        }

        let mut command = Command::new(&config.binary_path);
        command.args(tunnel_args(config));
        command.env(TOKEN_ENV, &config.token);
        Ok(command)
    }
}

/// Arguments for `cloudflared`, excluding the program itself.
pub fn tunnel_args(config: &TunnelConfig) -> Vec<String> {
    let mut args = vec!["tunnel".to_string()];
    if config.no_autoupdate {
        args.push("--no-autoupdate".to_string());
    }
    args.extend([
        "--loglevel".to_string(),
        config.log_level.clone(),
        "--protocol".to_string(),
        config.protocol.clone(),
        "--edge-ip-version".to_string(),
        config.edge_ip_version.clone(),
    ]);
    if !config.region.is_empty() {
        args.push("--region".to_string());
        args.push(config.region.clone());
    }
    args.extend(config.extra_args.iter().cloned());
    args.push("run".to_string());
    args
}
