//! Bypass process lifecycle.
//!
//! # Lifecycle
//! ```text
//! BypassProcess::start(exe, strategy, warmup)
//!   → spawns `exe <strategy>` (stdio discarded, kill-on-drop)
//!   → sleeps the warm-up delay, no readiness handshake
//!
//! process.stop()
//!   → kills the child and reaps it
//! ```

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, error};

/// Default pause between spawning the bypass program and probing.
///
/// A best-effort guess at initialization time, not a readiness guarantee.
pub const DEFAULT_WARMUP: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("unknown provider '{0}'")]
    UnknownProvider(String),

    #[error("failed to start {}: {source}", .exe.display())]
    Spawn {
        exe: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A running bypass program configured with one strategy.
#[derive(Debug)]
pub struct BypassProcess {
    exe: PathBuf,
    child: Child,
}

impl BypassProcess {
    /// Spawn `exe` with `strategy` as its only argument, then wait `warmup`.
    ///
    /// The strategy string is passed verbatim as a single argv entry.
    pub async fn start(
        exe: &Path,
        strategy: &str,
        warmup: Duration,
    ) -> Result<Self, HarnessError> {
        let child = Command::new(exe)
            .arg(strategy)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| HarnessError::Spawn {
                exe: exe.to_path_buf(),
                source,
            })?;

        debug!(
            "started {} (pid {:?}) with strategy {strategy}",
            exe.display(),
            child.id()
        );

        if !warmup.is_zero() {
            tokio::time::sleep(warmup).await;
        }

        Ok(Self {
            exe: exe.to_path_buf(),
            child,
        })
    }

    /// Kill the process. Failures are logged, never returned.
    pub async fn stop(mut self) {
        match self.kill().await {
            Ok(()) => debug!("stopped {}", self.exe.display()),
            Err(e) => error!("Failed to stop process {}: {e}", self.exe.display()),
        }
    }

    /// Send the kill signal and reap the child.
    async fn kill(&mut self) -> std::io::Result<()> {
        self.child.kill().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let err = BypassProcess::start(
            Path::new("/nonexistent/goodbyedpi.exe"),
            "-5",
            Duration::ZERO,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, HarnessError::Spawn { .. }));
        assert!(err.to_string().contains("/nonexistent/goodbyedpi.exe"));
    }

    #[test]
    fn unknown_provider_message() {
        let err = HarnessError::UnknownProvider("xyz".into());
        assert_eq!(err.to_string(), "unknown provider 'xyz'");
    }

    #[cfg(unix)]
    fn pid_alive(pid: u32) -> bool {
        std::process::Command::new("sh")
            .arg("-c")
            .arg(format!("kill -0 {pid} 2>/dev/null"))
            .status()
            .unwrap()
            .success()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn start_then_stop_kills_child() {
        // `sleep 30` stands in for a long-running bypass program.
        let mut process = BypassProcess::start(Path::new("sleep"), "30", Duration::ZERO)
            .await
            .unwrap();
        let pid = process.child.id().unwrap();
        assert!(matches!(process.child.try_wait(), Ok(None)));
        assert!(pid_alive(pid));

        process.stop().await;

        assert!(!pid_alive(pid));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn warmup_delays_return() {
        let started = std::time::Instant::now();
        let process = BypassProcess::start(Path::new("sleep"), "30", Duration::from_millis(200))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(200));
        process.stop().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stopping_an_exited_process_does_not_panic() {
        let process = BypassProcess::start(Path::new("true"), "ignored", Duration::from_millis(100))
            .await
            .unwrap();
        process.stop().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn kill_failure_on_reaped_child_is_only_logged() {
        let mut process = BypassProcess::start(Path::new("true"), "ignored", Duration::ZERO)
            .await
            .unwrap();
        // Reap the child so the kill has nothing left to signal.
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while process.child.try_wait().unwrap().is_none() {
            assert!(std::time::Instant::now() < deadline, "`true` did not exit");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(process.kill().await.is_err());
        process.stop().await;
    }
}
