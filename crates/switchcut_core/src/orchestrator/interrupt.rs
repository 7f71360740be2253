//! Cancellation and deadline tracking for a run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Handle for cancelling a running pipeline.
///
/// Clones share the same flag, so the transport shell can keep one clone
/// and cancel when its client disconnects.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the run.
    ///
    /// In-flight tool processes are killed and no further segment starts.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Why a run (or a tool invocation within it) was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptReason {
    /// The caller cancelled.
    Cancelled,
    /// The run's deadline passed.
    DeadlineExceeded,
    /// A sibling trim failed and the batch is being torn down.
    Aborted,
}

impl std::fmt::Display for InterruptReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterruptReason::Cancelled => write!(f, "cancelled"),
            InterruptReason::DeadlineExceeded => write!(f, "deadline exceeded"),
            InterruptReason::Aborted => write!(f, "aborted after sibling failure"),
        }
    }
}

/// Everything that can stop a run early: caller cancellation, the
/// deadline, and the abort flag of the current trim batch.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    cancel: CancelHandle,
    abort: CancelHandle,
    deadline: Option<Instant>,
}

impl Interrupt {
    /// Interrupt tied to the caller's cancel handle and optional timeout.
    pub fn new(cancel: CancelHandle, timeout: Option<Duration>) -> Self {
        Self {
            cancel,
            abort: CancelHandle::new(),
            deadline: timeout.map(|t| Instant::now() + t),
        }
    }

    /// An interrupt that never fires.
    pub fn none() -> Self {
        Self::default()
    }

    /// Same cancel handle and deadline with a fresh abort flag.
    ///
    /// Used for a batch of sibling tool runs: aborting the scope stops
    /// the siblings without cancelling the run as a whole.
    pub fn scoped(&self) -> Self {
        Self {
            cancel: self.cancel.clone(),
            abort: CancelHandle::new(),
            deadline: self.deadline,
        }
    }

    /// Stop every tool run sharing this scope.
    pub fn abort(&self) {
        self.abort.cancel();
    }

    /// First reason this run should stop, if any.
    ///
    /// Caller cancellation takes precedence over the deadline, which takes
    /// precedence over a scope abort.
    pub fn reason(&self) -> Option<InterruptReason> {
        if self.cancel.is_cancelled() {
            return Some(InterruptReason::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Some(InterruptReason::DeadlineExceeded);
            }
        }
        if self.abort.is_cancelled() {
            return Some(InterruptReason::Aborted);
        }
        None
    }
}
