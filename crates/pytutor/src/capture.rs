//! Thread-safe capture buffer for snippet output.
//!
//! [`CaptureBuffer`] accumulates the bytes a running snippet writes to stdout
//! and stderr, enforcing a combined byte budget. One buffer exists per
//! execution request and is never shared between requests; within a request it
//! is shared between the calling thread (which reads the result) and the VM
//! thread (which writes during the run) via `Arc<Mutex<_>>`.
//!
//! When a run is abandoned at its deadline the VM thread may still hold a
//! clone of the buffer. [`CaptureBuffer::drain`] handles that: it unwraps the
//! `Arc` when it is the sole owner and otherwise locks and copies, so the
//! caller always recovers whatever partial output the snippet produced.

use std::sync::{Arc, Mutex};

/// Which stream a write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

#[derive(Debug)]
struct Captured {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    budget: usize,
    truncated: bool,
}

/// Byte-budgeted capture of a snippet's stdout and stderr.
///
/// Cheap to clone — all clones share the same underlying data.
#[derive(Clone)]
pub struct CaptureBuffer {
    inner: Arc<Mutex<Captured>>,
}

impl CaptureBuffer {
    /// Creates a buffer that accepts up to `budget` bytes combined across both
    /// streams.
    pub fn with_budget(budget: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Captured {
                stdout: Vec::new(),
                stderr: Vec::new(),
                budget,
                truncated: false,
            })),
        }
    }

    /// Appends `bytes` to `stream`.
    ///
    /// Returns `Err(budget)` if accepting the write would push the combined
    /// total over the budget. A rejected write leaves the buffer unchanged and
    /// latches [`truncated`](Self::truncated).
    pub fn push(&self, stream: Stream, bytes: &[u8]) -> Result<(), usize> {
        let mut captured = self.inner.lock().expect("capture mutex poisoned");
        let used = captured.stdout.len() + captured.stderr.len();
        if used + bytes.len() > captured.budget {
            captured.truncated = true;
            return Err(captured.budget);
        }
        match stream {
            Stream::Stdout => captured.stdout.extend_from_slice(bytes),
            Stream::Stderr => captured.stderr.extend_from_slice(bytes),
        }
        Ok(())
    }

    /// `true` once any write has been rejected for exceeding the budget.
    pub fn truncated(&self) -> bool {
        self.inner.lock().expect("capture mutex poisoned").truncated
    }

    /// Consumes this handle and returns `(stdout, stderr)` as UTF-8 strings.
    ///
    /// Invalid UTF-8 is replaced with `\u{FFFD}`. If another clone is still
    /// alive (abandoned VM thread after a timeout), the data is copied out
    /// under the lock instead of unwrapping the `Arc`.
    pub fn drain(self) -> (String, String) {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => {
                let captured = mutex.into_inner().expect("capture mutex poisoned");
                (
                    String::from_utf8_lossy(&captured.stdout).into_owned(),
                    String::from_utf8_lossy(&captured.stderr).into_owned(),
                )
            }
            Err(arc) => {
                let captured = arc.lock().expect("capture mutex poisoned");
                (
                    String::from_utf8_lossy(&captured.stdout).into_owned(),
                    String::from_utf8_lossy(&captured.stderr).into_owned(),
                )
            }
        }
    }
}
