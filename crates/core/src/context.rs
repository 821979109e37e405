use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use crate::{Error, Result};

/// Cancellation and deadline signal handed to every catalog query and
/// statement submission.
///
/// The context is only consulted before work is submitted. Statements already
/// running when the signal fires are left to the database.
#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    cancelled: Option<Arc<AtomicBool>>,
    deadline: Option<Instant>,
}

/// Caller-side handle that flips the cancellation flag of the contexts it was
/// created with.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl ExecContext {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let flag = Arc::new(AtomicBool::new(false));
        self.cancelled = Some(Arc::clone(&flag));
        (self, CancelHandle { flag })
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Time left before the deadline, `None` when no deadline is set.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn ensure_active(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if self.remaining().is_some_and(|remaining| remaining.is_zero()) {
            return Err(Error::DeadlineExceeded);
        }
        Ok(())
    }
}
