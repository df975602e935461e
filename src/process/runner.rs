//! Exclusive lifecycle control of the tunnel daemon.
//!
//! # Locking
//! - `lifecycle` (async) serializes `start` and `stop`; concurrent callers
//!   queue behind it. A deferred stop holds it from the moment it is
//!   reserved, so a later `start` cannot slip in before the stop runs.
//! - `daemon` (sync) guards the child handle and is only held for a single
//!   non-blocking `try_wait`, so `status` never waits on an in-flight stop.

use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::process::Child;
use tokio::sync::OwnedMutexGuard;
use tokio::time::Instant;

use crate::config::schema::DaemonConfig;
use crate::config::ConfigStore;
use crate::process::launcher::{CloudflaredLauncher, Launch};
use crate::process::output::forward_output;
use crate::process::RunnerError;

/// Upper bound on waiting for a killed daemon to be reaped.
const KILL_WAIT: Duration = Duration::from_secs(5);

/// Timing for graceful shutdown.
#[derive(Debug, Clone, Copy)]
pub struct RunnerOptions {
    pub grace_period: Duration,
    pub poll_interval: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self::from(&DaemonConfig::default())
    }
}

impl From<&DaemonConfig> for RunnerOptions {
    fn from(config: &DaemonConfig) -> Self {
        Self {
            grace_period: Duration::from_secs(config.stop_grace_secs),
            poll_interval: Duration::from_millis(config.stop_poll_ms),
        }
    }
}

struct Daemon {
    child: Child,
    pid: Option<u32>,
}

pub struct ProcessRunner {
    config: Arc<ConfigStore>,
    launcher: Box<dyn Launch>,
    options: RunnerOptions,
    lifecycle: Arc<tokio::sync::Mutex<()>>,
    daemon: Mutex<Option<Daemon>>,
}

impl ProcessRunner {
    pub fn new(config: Arc<ConfigStore>, launcher: Box<dyn Launch>, options: RunnerOptions) -> Self {
        Self {
            config,
            launcher,
            options,
            lifecycle: Arc::new(tokio::sync::Mutex::new(())),
            daemon: Mutex::new(None),
        }
    }

    /// Runner that launches `cloudflared`.
    pub fn cloudflared(config: Arc<ConfigStore>, options: RunnerOptions) -> Self {
        Self::new(config, Box::new(CloudflaredLauncher), options)
    }

    fn slot(&self) -> MutexGuard<'_, Option<Daemon>> {
        self.daemon.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Non-blocking liveness check. Reaps and releases the handle if the
    /// daemon has exited.
    fn poll_alive(&self) -> Result<bool, RunnerError> {
        let mut slot = self.slot();
        let Some(daemon) = slot.as_mut() else {
            return Ok(false);
        };

        match daemon.child.try_wait() {
            Ok(None) => Ok(true),
            Ok(Some(exit)) => {
                tracing::info!(pid = daemon.pid, status = %exit, "Tunnel daemon exited");
                *slot = None;
                Ok(false)
            }
            Err(e) => Err(RunnerError::Liveness(e)),
        }
    }

    /// Live status of the daemon.
    ///
    /// The error is set only when the liveness check itself failed; in that
    /// case the running flag is `false` because nothing could be confirmed.
    pub fn status(&self) -> (bool, Option<RunnerError>) {
        match self.poll_alive() {
            Ok(running) => (running, None),
            Err(e) => {
                tracing::warn!(error = %e, "Tunnel liveness check failed");
                (false, Some(e))
            }
        }
    }

    /// PID of the supervised daemon, if one is held.
    pub fn pid(&self) -> Option<u32> {
        self.slot().as_ref().and_then(|daemon| daemon.pid)
    }

    /// Launch the daemon with the current configuration.
    pub async fn start(&self) -> Result<(), RunnerError> {
        let _lifecycle = self.lifecycle.lock().await;

        if self.poll_alive()? {
            return Err(RunnerError::AlreadyRunning);
        }

        let config = self.config.get();
        let mut command = self.launcher.command(&config)?;
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let program = command.as_std().get_program().to_string_lossy().into_owned();
        let mut child = command
            .spawn()
            .map_err(|e| RunnerError::Launch(format!("failed to spawn {}: {}", program, e)))?;

        let pid = child.id();
        forward_output(&mut child, pid);
        tracing::info!(pid, program = %program, "Tunnel daemon started");

        *self.slot() = Some(Daemon { child, pid });
        Ok(())
    }

    /// Terminate the daemon, escalating to a forced kill after the grace
    /// period. The runner is stopped when this returns, whatever the result.
    pub async fn stop(&self) -> Result<(), RunnerError> {
        let _lifecycle = self.lifecycle.lock().await;
        self.stop_locked().await
    }

    /// Take the lifecycle lock now for a stop that runs later.
    ///
    /// Starts issued after this returns wait until the deferred stop has
    /// finished, so the stop only ever targets the daemon present at the
    /// time of the request.
    pub async fn reserve_stop(self: &Arc<Self>) -> PendingStop {
        let guard = self.lifecycle.clone().lock_owned().await;
        PendingStop {
            runner: self.clone(),
            _lifecycle: guard,
        }
    }

    async fn stop_locked(&self) -> Result<(), RunnerError> {
        if !self.poll_alive()? {
            return Err(RunnerError::NotRunning);
        }

        self.terminate()?;

        // An unrepresentable deadline means waiting for as long as it takes.
        let deadline = Instant::now().checked_add(self.options.grace_period);
        loop {
            if !self.poll_alive()? {
                tracing::info!("Tunnel daemon stopped");
                return Ok(());
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                break;
            }
            tokio::time::sleep(self.options.poll_interval).await;
        }

        tracing::warn!(
            grace_period = ?self.options.grace_period,
            "Tunnel daemon ignored termination, killing"
        );
        self.kill().await;
        Err(RunnerError::Shutdown(format!(
            "daemon did not exit within {:?} and was killed",
            self.options.grace_period
        )))
    }

    /// Stop the daemon if one is running. Used on panel shutdown.
    pub async fn shutdown(&self) {
        match self.stop().await {
            Ok(()) | Err(RunnerError::NotRunning) => {}
            Err(e) => tracing::error!(error = %e, "Error stopping tunnel during shutdown"),
        }
    }

    #[cfg(unix)]
    fn terminate(&self) -> Result<(), RunnerError> {
        use nix::errno::Errno;
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        let Some(pid) = self.pid() else {
            return Ok(());
        };
        match killpg(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            Ok(()) => {
                tracing::debug!(pid, "Sent SIGTERM to tunnel daemon");
                Ok(())
            }
            // Already gone; the next poll reaps it.
            Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(RunnerError::Shutdown(format!("SIGTERM failed: {}", e))),
        }
    }

    #[cfg(not(unix))]
    fn terminate(&self) -> Result<(), RunnerError> {
        if let Some(daemon) = self.slot().as_mut() {
            daemon
                .child
                .start_kill()
                .map_err(|e| RunnerError::Shutdown(format!("terminate failed: {}", e)))?;
        }
        Ok(())
    }

    /// Release the handle and force the daemon (and its process group) down.
    async fn kill(&self) {
        let Some(mut daemon) = self.slot().take() else {
            return;
        };

        if let Some(pid) = daemon.pid {
            kill_process_group(pid);
        }
        if let Err(e) = daemon.child.start_kill() {
            tracing::debug!(pid = daemon.pid, error = %e, "start_kill failed");
        }

        match tokio::time::timeout(KILL_WAIT, daemon.child.wait()).await {
            Ok(Ok(exit)) => tracing::info!(pid = daemon.pid, status = %exit, "Tunnel daemon killed"),
            Ok(Err(e)) => tracing::error!(pid = daemon.pid, error = %e, "Failed to reap killed tunnel daemon"),
            Err(_) => tracing::error!(pid = daemon.pid, "Timed out reaping killed tunnel daemon"),
        }
    }
}

/// A stop that owns the lifecycle lock but has not run yet.
pub struct PendingStop {
    runner: Arc<ProcessRunner>,
    _lifecycle: OwnedMutexGuard<()>,
}

impl PendingStop {
    /// Run the stop, releasing the lifecycle lock when done.
    pub async fn run(self) -> Result<(), RunnerError> {
        self.runner.stop_locked().await
    }
}

/// SIGKILL the daemon's process group so helpers it forked go down too.
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        tracing::debug!(pid, error = %e, "SIGKILL to process group failed");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}
