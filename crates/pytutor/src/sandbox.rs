//! Execute learner-supplied source and report its output — safely.
//!
//! This is the top-level orchestrator for a single snippet run:
//! 1. Checks the [`ResultCache`] for a completed run of the same
//!    (source, settings) pair.
//! 2. Creates a fresh [`CaptureBuffer`] sized to `settings.max_output_bytes`.
//! 3. Hands the run to the [`WarmSlot`] and waits out the deadline.
//!    If no slot thread is available, falls back to a cold interpreter on a
//!    fresh bounded thread.
//! 4. Maps the raw VM outcome into an [`ExecutionResult`]: output-budget
//!    overruns take precedence over whatever error the VM saw internally,
//!    deadline expiry yields `TimedOut` with partial output attached, and
//!    completed runs are recorded in the cache.
//!
//! Nothing escapes as a panic or a Rust-level error: arbitrary input text in,
//! structured result out. That contract is what the rest of the tutor leans
//! on — a fault is display data, not a failure of the tutor itself.

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use crate::cache::{run_digest, ResultCache};
use crate::capture::CaptureBuffer;
use crate::imports::allowed_set;
use crate::slot::{SlotRun, WarmSlot};
use crate::timeout::run_bounded;
use crate::types::{ExecutionOutcome, ExecutionResult, ExecutionSettings, Fault};
use crate::vm::{build_vm, run_snippet, VmRun};

/// A sandbox: one warm interpreter slot plus a result cache.
///
/// Requests serialize on the slot — one execution at a time, each with its own
/// capture buffer. Construction is cheap; the interpreter is built on first
/// [`execute`](Self::execute).
pub struct Sandbox {
    slot: WarmSlot,
    cache: ResultCache,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            slot: WarmSlot::new(),
            cache: ResultCache::from_env(),
        }
    }

    /// The process-wide sandbox used by [`execute`].
    pub fn global() -> &'static Sandbox {
        static INSTANCE: OnceLock<Sandbox> = OnceLock::new();
        INSTANCE.get_or_init(Sandbox::new)
    }

    /// Execute `source` under `settings` and return a structured result.
    ///
    /// Never panics and never returns a Rust error for bad input: syntax
    /// errors, runtime exceptions, denied imports, output overruns, and
    /// deadline expiry all come back as data on the [`ExecutionResult`].
    pub fn execute(&self, source: &str, settings: &ExecutionSettings) -> ExecutionResult {
        let started = Instant::now();
        let digest = run_digest(source, settings);

        if let Some((stdout, stderr)) = self.cache.lookup(&digest) {
            tracing::debug!("result cache hit, skipping VM");
            return ExecutionResult {
                stdout,
                stderr,
                outcome: ExecutionOutcome::Completed,
                duration_ms: started.elapsed().as_millis() as u64,
            };
        }

        let capture = CaptureBuffer::with_budget(settings.max_output_bytes);
        let allowed = Arc::new(allowed_set(settings));
        let limit = Duration::from_millis(settings.timeout_ms);

        let slot_run = self.slot.run(
            source.to_owned(),
            capture.clone(),
            Arc::clone(&allowed),
            limit,
        );

        let run: Option<VmRun> = match slot_run {
            SlotRun::Finished(run) => Some(run),
            SlotRun::Deadline => None,
            SlotRun::Unavailable => {
                // Cold path: fresh interpreter on a bounded thread.
                tracing::warn!("warm slot unavailable, executing on a cold interpreter");
                let cold_capture = capture.clone();
                let cold_source = source.to_owned();
                run_bounded(
                    move || {
                        let vm = build_vm((*allowed).clone());
                        run_snippet(&vm, &cold_source, cold_capture)
                    },
                    limit,
                )
            }
        };

        let duration_ms = started.elapsed().as_millis() as u64;

        match run {
            Some(run) => {
                // Budget overruns win over the runtime error the writer raised
                // inside the VM to halt the snippet.
                let outcome = if capture.truncated() {
                    ExecutionOutcome::Faulted {
                        fault: Fault::OutputLimit {
                            limit_bytes: settings.max_output_bytes,
                        },
                    }
                } else {
                    match run.fault {
                        Some(fault) => ExecutionOutcome::Faulted { fault },
                        None => {
                            self.cache.store(digest, &run.stdout, &run.stderr);
                            ExecutionOutcome::Completed
                        }
                    }
                };
                ExecutionResult {
                    stdout: run.stdout,
                    stderr: run.stderr,
                    outcome,
                    duration_ms,
                }
            }
            None => {
                // Deadline: recover whatever the snippet printed before the cut.
                let (stdout, stderr) = capture.drain();
                ExecutionResult {
                    stdout,
                    stderr,
                    outcome: ExecutionOutcome::TimedOut {
                        limit_ms: settings.timeout_ms,
                    },
                    duration_ms,
                }
            }
        }
    }

    /// The sandbox's result cache (exposed for inspection and test setup).
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Execute `source` on the process-wide [`Sandbox`].
pub fn execute(source: &str, settings: &ExecutionSettings) -> ExecutionResult {
    Sandbox::global().execute(source, settings)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
