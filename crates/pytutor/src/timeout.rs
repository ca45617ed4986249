//! Hard wall-clock bound for a unit of work.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Run `work` on a fresh thread and wait at most `limit` for it to finish.
///
/// Returns `Some(T)` if `work` completed in time, `None` on deadline or if the
/// thread panicked. On deadline the thread is abandoned, not joined: there is
/// no portable way to interrupt a tight interpreter loop that never yields, so
/// the request is cut loose and the thread exits on its own whenever (if ever)
/// the work finishes. Anything the abandoned thread still references is
/// reference-counted, so the caller's view of shared state stays valid.
pub fn run_bounded<F, T>(work: F, limit: Duration) -> Option<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel::<T>();

    let _detached = thread::Builder::new()
        .name("pytutor-exec".to_string())
        .spawn(move || {
            let value = work();
            // Send fails when the receiver already gave up. Nothing to do.
            let _ = tx.send(value);
        })
        .expect("failed to spawn execution thread");

    match rx.recv_timeout(limit) {
        Ok(value) => Some(value),
        Err(mpsc::RecvTimeoutError::Timeout) => None,
        // Sender dropped without sending: the work thread panicked.
        Err(mpsc::RecvTimeoutError::Disconnected) => None,
    }
}
