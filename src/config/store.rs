//! Durable storage for the single [`TunnelConfig`] record.
//!
//! Readers get a lock-free snapshot from an [`ArcSwap`]; writers are
//! serialized by a mutex and replace the file with write-to-temp + rename,
//! so neither a crash nor a concurrent reader can observe a half-written
//! record. The in-memory snapshot is swapped only after the rename succeeds.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::config::schema::TunnelConfig;
use crate::config::validation::{join_errors, validate_tunnel_config, ValidationError};

pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("invalid configuration: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
    #[error("failed to persist configuration: {0}")]
    Persistence(#[from] io::Error),
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct ConfigStore {
    path: PathBuf,
    current: ArcSwap<TunnelConfig>,
    write_lock: Mutex<()>,
}

impl ConfigStore {
    /// Open the store rooted at `data_dir`.
    ///
    /// A missing file yields the default record. An unreadable or malformed
    /// file is logged and also replaced by the default in memory; the file
    /// itself is left alone until the next successful save.
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        let path = data_dir.as_ref().join(CONFIG_FILE);
        let config = match read_config_file(&path) {
            Ok(Some(config)) => {
                tracing::info!(path = %path.display(), "Loaded tunnel configuration");
                config
            }
            Ok(None) => {
                tracing::info!(path = %path.display(), "No tunnel configuration found, using defaults");
                TunnelConfig::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable tunnel configuration");
                TunnelConfig::default()
            }
        };

        Self {
            path,
            current: ArcSwap::from_pointee(config),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current configuration snapshot.
    pub fn get(&self) -> TunnelConfig {
        self.current.load_full().as_ref().clone()
    }

    /// Validate and atomically persist `config`, replacing the previous record.
    pub fn save(&self, config: TunnelConfig) -> Result<(), ConfigStoreError> {
        validate_tunnel_config(&config).map_err(ConfigStoreError::Validation)?;
        let payload = serde_json::to_vec_pretty(&config)?;

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        write_atomic(&self.path, &payload)?;
        self.current.store(Arc::new(config));

        tracing::info!(path = %self.path.display(), "Tunnel configuration saved");
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<Option<TunnelConfig>, ConfigStoreError> {
    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let config: TunnelConfig = serde_json::from_slice(&contents)?;
    validate_tunnel_config(&config).map_err(ConfigStoreError::Validation)?;
    Ok(Some(config))
}

fn write_atomic(path: &Path, payload: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let result = (|| {
        let mut file = File::create(&tmp_path)?;
        file.write_all(payload)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}
