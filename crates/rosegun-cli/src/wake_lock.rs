//! Stay-awake hint for the interactive loop.
//!
//! On Linux this holds a `systemd-inhibit` idle inhibitor for as long as the
//! countdown runs. Elsewhere, or when disabled in config, it does nothing.

use std::process::{Child, Command, Stdio};

use rosegun_core::storage::WakeLockConfig;
use rosegun_core::{NoWakeLock, WakeLock, WakeLockError};

pub fn disabled() -> Box<dyn WakeLock> {
    Box::new(NoWakeLock)
}

pub fn from_config(config: &WakeLockConfig) -> Box<dyn WakeLock> {
    if config.enabled && cfg!(target_os = "linux") {
        Box::new(InhibitLock::default())
    } else {
        disabled()
    }
}

#[derive(Debug, Default)]
pub struct InhibitLock {
    child: Option<Child>,
}

impl WakeLock for InhibitLock {
    fn acquire(&mut self) -> Result<(), WakeLockError> {
        if self.child.is_some() {
            return Ok(());
        }
        let child = Command::new("systemd-inhibit")
            .args([
                "--what=idle",
                "--who=rosegun",
                "--why=Focus session in progress",
                "--mode=block",
                "sleep",
                "infinity",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| WakeLockError::Unavailable(e.to_string()))?;
        self.child = Some(child);
        Ok(())
    }

    fn release(&mut self) -> Result<(), WakeLockError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        child
            .kill()
            .map_err(|e| WakeLockError::ReleaseFailed(e.to_string()))?;
        child
            .wait()
            .map_err(|e| WakeLockError::ReleaseFailed(e.to_string()))?;
        Ok(())
    }
}

impl Drop for InhibitLock {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "failed to stop inhibitor");
        }
    }
}
