use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use tunnel_panel::config::validation::validate_settings;
use tunnel_panel::config::{load_settings, ConfigError, PanelSettings};
use tunnel_panel::http::HttpServer;
use tunnel_panel::lifecycle::{startup, Shutdown};
use tunnel_panel::observability::init_logging;
use tunnel_panel::version;

#[derive(Parser)]
#[command(name = "tunnel-panel")]
#[command(version = version::VERSION)]
#[command(about = "Web control panel for a cloudflared tunnel", long_about = None)]
struct Cli {
    /// Panel settings file (TOML).
    #[arg(short, long, env = "TUNNEL_PANEL_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding the settings file.
    #[arg(short, long, env = "TUNNEL_PANEL_LISTEN")]
    listen: Option<String>,

    /// Data directory, overriding the settings file.
    #[arg(short, long, env = "TUNNEL_PANEL_DATA_DIR")]
    data_dir: Option<String>,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<PanelSettings> {
        let mut settings = match &self.config {
            Some(path) => load_settings(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => PanelSettings::default(),
        };
        if let Some(listen) = &self.listen {
            settings.listener.bind_address = listen.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            settings.storage.data_dir = data_dir.clone();
        }
        validate_settings(&settings).map_err(ConfigError::Validation)?;
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings()?;

    init_logging(&settings.observability).context("failed to initialize logging")?;

    tracing::info!(version = %version::full_version(), "tunnel-panel starting");
    tracing::info!(
        bind_address = %settings.listener.bind_address,
        data_dir = %settings.storage.data_dir,
        stop_grace_secs = settings.daemon.stop_grace_secs,
        "Settings loaded"
    );

    let state = startup::build_state(&settings);
    startup::auto_start(&state).await;

    let listener = TcpListener::bind(&settings.listener.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", settings.listener.bind_address))?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let runner = state.runner.clone();
    let server = HttpServer::new(&settings, state);
    server.run(listener, shutdown.subscribe()).await?;

    runner.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
