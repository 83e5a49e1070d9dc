//! Cooperative cancellation.
//!
//! The wait loop never blocks on a cancellation signal; it asks
//! [`Cancellation::check`] once per iteration and stops when it reports a
//! reason.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Why a wait was cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Cancelled {
    #[error("wait cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Non-blocking "is it done" check.
pub trait Cancellation {
    /// `Ok(())` while the wait may continue, the reason once it must stop.
    fn check(&self) -> Result<(), Cancelled>;
}

/// Cancel flag plus optional deadline. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct WaitContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl WaitContext {
    /// Context with no deadline; only [`WaitContext::cancel`] stops it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context expiring `timeout` from now. A timeout too large to represent
    /// as an `Instant` leaves the context without a deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// Derived context: cancelled together with `self`, expiring at whichever
    /// deadline comes first.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let own = Instant::now().checked_add(timeout);
        let deadline = match (self.deadline, own) {
            (Some(parent), Some(own)) => Some(parent.min(own)),
            (parent, own) => parent.or(own),
        };
        Self {
            cancelled: self.cancelled.clone(),
            deadline,
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl Cancellation for WaitContext {
    fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            return Err(Cancelled::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Cancelled::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

impl Cancellation for AtomicBool {
    fn check(&self) -> Result<(), Cancelled> {
        if self.load(Ordering::Relaxed) {
            Err(Cancelled::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Cancellation for CancellationToken {
    fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl<T: Cancellation + ?Sized> Cancellation for Arc<T> {
    fn check(&self) -> Result<(), Cancelled> {
        (**self).check()
    }
}

impl<T: Cancellation + ?Sized> Cancellation for &T {
    fn check(&self) -> Result<(), Cancelled> {
        (**self).check()
    }
}
