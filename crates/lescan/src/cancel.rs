//! Single-shot cancellation for the scan loop.
//!
//! One token per session: it becomes signalled either when its armed
//! deadline elapses or when an external cancellation request arrives
//! (typically SIGINT forwarded by the front end). The scan loop's bounded
//! reads guarantee the signal is observed within one read slice.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Why a signalled token fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// The armed deadline elapsed.
    DeadlineExpired,
    /// An external cancellation request arrived.
    Cancelled,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    deadline: Mutex<Option<Instant>>,
}

/// Shareable single-shot cancellation token.
///
/// Clones share state, so one clone can be handed to a signal watcher while
/// the session polls another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the deadline. Only one may be in flight: arming while a deadline
    /// is already pending is ignored.
    pub fn arm(&self, timeout: Duration) {
        let mut deadline = self.inner.deadline.lock().unwrap();
        if deadline.is_some() {
            log::debug!("cancellation deadline already armed, ignoring");
            return;
        }
        *deadline = Some(Instant::now() + timeout);
    }

    /// Replace the pending deadline, pushing it out from now. Used for the
    /// optional inactivity-timeout behavior.
    pub fn rearm(&self, timeout: Duration) {
        *self.inner.deadline.lock().unwrap() = Some(Instant::now() + timeout);
    }

    /// Request cancellation from outside the scan loop.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether the token has fired, and why. External cancellation takes
    /// precedence over a simultaneously expired deadline.
    pub fn status(&self) -> Option<StopCause> {
        if self.inner.cancelled.load(Ordering::SeqCst) {
            return Some(StopCause::Cancelled);
        }
        let deadline = self.inner.deadline.lock().unwrap();
        match *deadline {
            Some(at) if Instant::now() >= at => Some(StopCause::DeadlineExpired),
            _ => None,
        }
    }

    /// Time left until the pending deadline, if one is armed.
    pub fn time_remaining(&self) -> Option<Duration> {
        let deadline = self.inner.deadline.lock().unwrap();
        deadline.map(|at| at.saturating_duration_since(Instant::now()))
    }
}
