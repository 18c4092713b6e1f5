//! Best-effort stay-awake lock.
//!
//! A missing or failing platform lock must never affect the timer, so
//! every failure here is logged and swallowed.

/// Platform wake-lock seam. Hosts with nothing to offer use
/// [`NoopWakeLock`].
pub trait WakeLock {
    fn acquire(&mut self) -> Result<(), Box<dyn std::error::Error>>;
    fn release(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}

/// No-op lock for hosts without a wake-lock capability.
#[derive(Debug, Default)]
pub struct NoopWakeLock;

impl WakeLock for NoopWakeLock {
    fn acquire(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    fn release(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

/// Scoped owner of a [`WakeLock`].
///
/// `acquire` and `release` are idempotent, and `Drop` releases, so the
/// lock cannot outlive its session on any exit path.
pub struct ResourceGuard {
    lock: Box<dyn WakeLock>,
    held: bool,
}

impl ResourceGuard {
    pub fn new(lock: Box<dyn WakeLock>) -> Self {
        Self { lock, held: false }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn acquire(&mut self) {
        if self.held {
            return;
        }
        match self.lock.acquire() {
            Ok(()) => self.held = true,
            Err(e) => log::warn!("wake lock unavailable: {e}"),
        }
    }

    pub fn release(&mut self) {
        if !self.held {
            return;
        }
        self.held = false;
        if let Err(e) = self.lock.release() {
            log::warn!("wake lock release failed: {e}");
        }
    }
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ResourceGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceGuard")
            .field("held", &self.held)
            .finish()
    }
}
