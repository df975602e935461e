//! Startup orchestration.
//!
//! Components are built in dependency order: the config store first, then
//! the runner that reads it, then the translation loader. Nothing is global;
//! the resulting handles are passed to the HTTP layer explicitly.

use std::sync::Arc;

use crate::config::{ConfigStore, PanelSettings};
use crate::http::AppState;
use crate::i18n::TranslationLoader;
use crate::process::{ProcessRunner, RunnerOptions};

/// Build the shared components described by `settings`.
pub fn build_state(settings: &PanelSettings) -> AppState {
    let store = Arc::new(ConfigStore::open(&settings.storage.data_dir));
    let runner = Arc::new(ProcessRunner::cloudflared(
        store.clone(),
        RunnerOptions::from(&settings.daemon),
    ));
    let translations = Arc::new(match &settings.assets.locales_dir {
        Some(dir) => TranslationLoader::from_dir(dir),
        None => TranslationLoader::embedded(),
    });

    AppState {
        store,
        runner,
        translations,
    }
}

/// Start the daemon if the saved configuration asks for it. Failures are
/// logged; the panel keeps running so the configuration can be fixed.
pub async fn auto_start(state: &AppState) {
    if !state.store.get().auto_start {
        return;
    }

    tracing::info!("Auto-starting tunnel");
    if let Err(e) = state.runner.start().await {
        tracing::error!(error = %e, "Tunnel auto-start failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TunnelConfig;

    #[tokio::test]
    async fn test_auto_start_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = PanelSettings::default();
        settings.storage.data_dir = dir.path().to_string_lossy().into_owned();

        let state = build_state(&settings);
        state
            .store
            .save(TunnelConfig {
                token: "abc".into(),
                binary_path: "/nonexistent/cloudflared".into(),
                auto_start: true,
                ..TunnelConfig::default()
            })
            .unwrap();

        auto_start(&state).await;
        assert!(!state.runner.status().0);
    }

    #[test]
    fn test_build_state_reads_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let saved = TunnelConfig {
            token: "persisted".into(),
            ..TunnelConfig::default()
        };
        ConfigStore::open(dir.path()).save(saved.clone()).unwrap();

        let mut settings = PanelSettings::default();
        settings.storage.data_dir = dir.path().to_string_lossy().into_owned();
        assert_eq!(build_state(&settings).store.get(), saved);
    }
}
