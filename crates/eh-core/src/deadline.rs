//! Deadline harness: bound arbitrary work by wall-clock seconds.
//!
//! This is orthogonal to subprocess execution. It bounds whatever a
//! concrete runner chooses to wrap, typically a connect or an API call made
//! before (or instead of) shelling out. On expiry the in-flight work is
//! abandoned on its worker thread and the caller gets a distinct error
//! carrying the configured message.
//!
//! At most one deadline scope may be active per process. Nesting is an
//! explicit error rather than silent misbehavior, and the active-scope
//! marker is released on every exit path so a later, unrelated deadline
//! starts from clean state.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use thiserror::Error;

static DEADLINE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Errors from the deadline harness.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeadlineError {
    #[error("deadline of {seconds}s expired: {message}")]
    Expired { seconds: u64, message: String },

    #[error("a deadline scope is already active in this process")]
    Nested,
}

struct ScopeGuard;

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        DEADLINE_ACTIVE.store(false, Ordering::SeqCst);
    }
}

/// Run `work` with a deadline of `seconds` whole seconds.
///
/// Returns the work's value, or [`DeadlineError::Expired`] carrying
/// `message` once the deadline passes. A panic inside `work` resumes on
/// the caller after the scope marker is released.
pub fn run_with_deadline<T, F>(
    seconds: u64,
    message: impl Into<String>,
    work: F,
) -> Result<T, DeadlineError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    if DEADLINE_ACTIVE
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(DeadlineError::Nested);
    }
    let _guard = ScopeGuard;

    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        let _ = tx.send(std::panic::catch_unwind(AssertUnwindSafe(work)));
    });

    match rx.recv_timeout(Duration::from_secs(seconds)) {
        Ok(Ok(value)) => {
            let _ = handle.join();
            Ok(value)
        }
        Ok(Err(panic)) => {
            let _ = handle.join();
            std::panic::resume_unwind(panic)
        }
        // Timeout; the worker thread is abandoned with its in-flight work.
        Err(_) => Err(DeadlineError::Expired {
            seconds,
            message: message.into(),
        }),
    }
}
