//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::process::Command;

use tunnel_panel::config::{ConfigStore, PanelSettings, TunnelConfig};
use tunnel_panel::http::{AppState, HttpServer};
use tunnel_panel::i18n::TranslationLoader;
use tunnel_panel::lifecycle::Shutdown;
use tunnel_panel::process::{Launch, ProcessRunner, RunnerError, RunnerOptions};

/// Launches `/bin/sh -c <script>` in place of the daemon.
pub struct ScriptLauncher(pub &'static str);

impl Launch for ScriptLauncher {
    fn command(&self, _config: &TunnelConfig) -> Result<Command, RunnerError> {
        let mut command = Command::new("/bin/sh");
        command.arg("-c").arg(self.0);
        Ok(command)
    }
}

/// A panel serving on a random loopback port.
pub struct TestPanel {
    pub addr: SocketAddr,
    pub state: AppState,
    pub data_dir: TempDir,
    shutdown: Shutdown,
}

impl TestPanel {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestPanel {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a panel whose runner launches `script`.
pub async fn start_panel(script: &'static str) -> TestPanel {
    let data_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ConfigStore::open(data_dir.path()));
    let runner = Arc::new(ProcessRunner::new(
        store.clone(),
        Box::new(ScriptLauncher(script)),
        RunnerOptions {
            grace_period: Duration::from_secs(2),
            poll_interval: Duration::from_millis(20),
        },
    ));
    let state = AppState {
        store,
        runner,
        translations: Arc::new(TranslationLoader::embedded()),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(&PanelSettings::default(), state.clone());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestPanel {
        addr,
        state,
        data_dir,
        shutdown,
    }
}

/// Poll `/api/status` until `status` matches or the timeout expires.
pub async fn wait_for_status(client: &reqwest::Client, panel: &TestPanel, status: &str) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        let body: serde_json::Value = client
            .get(panel.url("/api/status"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if body["status"] == status {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

/// HTTP client that never goes through an environment proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}
