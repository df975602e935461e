//! Supervision of the tunnel daemon subprocess.
//!
//! # State Machine
//! ```text
//! Stopped --start--> Running --stop--> Stopped
//! Running --daemon exits on its own--> Stopped   (noticed at next poll)
//! ```
//!
//! # Design Decisions
//! - Status is derived from a live `try_wait`, never from a cached flag
//! - One daemon at most; start/stop are serialized
//! - Stop escalates SIGTERM → SIGKILL after a grace period

pub mod launcher;
mod output;
pub mod runner;

use thiserror::Error;

pub use launcher::{CloudflaredLauncher, Launch};
pub use runner::{PendingStop, ProcessRunner, RunnerOptions};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("tunnel is already running")]
    AlreadyRunning,
    #[error("tunnel is not running")]
    NotRunning,
    #[error("failed to launch tunnel: {0}")]
    Launch(String),
    #[error("failed to stop tunnel: {0}")]
    Shutdown(String),
    #[error("failed to check tunnel process: {0}")]
    Liveness(#[source] std::io::Error),
}
