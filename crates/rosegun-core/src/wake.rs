//! Best-effort "keep the display awake" hint.
//!
//! The host may not support it at all. Failures are logged and otherwise
//! ignored; the countdown never depends on the hint.

use crate::error::WakeLockError;

/// Host capability that suppresses display sleep.
pub trait WakeLock {
    fn acquire(&mut self) -> Result<(), WakeLockError>;
    fn release(&mut self) -> Result<(), WakeLockError>;
}

/// For hosts without the capability, or when it is disabled in config.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWakeLock;

impl WakeLock for NoWakeLock {
    fn acquire(&mut self) -> Result<(), WakeLockError> {
        Ok(())
    }

    fn release(&mut self) -> Result<(), WakeLockError> {
        Ok(())
    }
}

impl<W: WakeLock + ?Sized> WakeLock for Box<W> {
    fn acquire(&mut self) -> Result<(), WakeLockError> {
        (**self).acquire()
    }

    fn release(&mut self) -> Result<(), WakeLockError> {
        (**self).release()
    }
}

/// Pairs every successful acquire with exactly one release.
///
/// Acquiring while held and releasing while not held are no-ops. Dropping a
/// guard that still holds the hint releases it.
#[derive(Debug)]
pub struct WakeGuard<W: WakeLock> {
    lock: W,
    held: bool,
}

impl<W: WakeLock> WakeGuard<W> {
    pub fn new(lock: W) -> Self {
        Self { lock, held: false }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn lock(&self) -> &W {
        &self.lock
    }

    pub fn acquire(&mut self) {
        if self.held {
            return;
        }
        match self.lock.acquire() {
            Ok(()) => {
                self.held = true;
                tracing::debug!("stay-awake hint acquired");
            }
            Err(e) => tracing::warn!(error = %e, "stay-awake hint unavailable"),
        }
    }

    pub fn release(&mut self) {
        if !self.held {
            return;
        }
        self.held = false;
        match self.lock.release() {
            Ok(()) => tracing::debug!("stay-awake hint released"),
            Err(e) => tracing::warn!(error = %e, "stay-awake hint release failed"),
        }
    }
}

impl<W: WakeLock> Drop for WakeGuard<W> {
    fn drop(&mut self) {
        self.release();
    }
}
