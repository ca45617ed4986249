//! The warm interpreter slot: one pre-built VM on a dedicated thread.
//!
//! Interpreter construction is the expensive part of running a snippet, so the
//! sandbox keeps a single interpreter warm between requests. The interpreter
//! never crosses a thread boundary — [`SnippetVm`] is not `Send` — so the slot
//! is an actor: a dedicated OS thread owns the VM, blocks on a work channel,
//! and answers each [`WorkItem`] over the item's one-shot reply channel.
//!
//! One slot, one request at a time: callers serialize on the slot's mutex, so
//! a capture buffer is never shared between concurrent runs.
//!
//! Each run executes in a fresh top-level scope, so variables never leak
//! between requests. `sys.modules` is intentionally left warm — re-importing
//! an allowed module on the next request is the point of keeping the slot
//! alive, and every import is re-gated regardless of the module cache.
//!
//! ## Deadline handling
//!
//! If the caller's wait on the reply channel hits the deadline, the slot
//! thread is still executing — possibly forever (`while True: pass`). The
//! slot is torn down: its work sender is dropped and a replacement thread is
//! warmed. The abandoned thread finds its reply receiver gone when (if) the
//! run finishes, then exits its loop because the work channel is closed. A
//! truly non-terminating snippet leaks that one thread; without out-of-process
//! isolation there is no safe way to kill it, and the leak is bounded by one
//! thread per timed-out request.

use std::collections::HashSet;
use std::sync::mpsc::{self, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::capture::CaptureBuffer;
use crate::vm::{build_vm, run_snippet, VmRun};

// ── Work items ───────────────────────────────────────────────────────────────

/// One snippet run, handed from the caller to the slot thread.
/// Every field is `Send`; the VM itself never moves.
pub(crate) struct WorkItem {
    pub source: String,
    pub capture: CaptureBuffer,
    pub allowed: Arc<HashSet<String>>,
    pub reply: SyncSender<VmRun>,
}

/// Outcome of handing a run to the slot.
pub(crate) enum SlotRun {
    /// The VM finished within the deadline.
    Finished(VmRun),
    /// The deadline passed; the slot has been torn down and replaced.
    Deadline,
    /// No slot thread would accept the work (spawn or thread failure).
    Unavailable,
}

// ── Slot state ───────────────────────────────────────────────────────────────

struct SlotState {
    sender: Option<SyncSender<WorkItem>>,
    generation: u64,
}

impl SlotState {
    /// The current work sender, warming the first slot thread on demand.
    fn sender(&mut self) -> Option<SyncSender<WorkItem>> {
        if self.sender.is_none() {
            self.sender = spawn_slot_thread(self.generation);
        }
        self.sender.clone()
    }

    /// Drop the current slot and warm a replacement.
    fn respawn(&mut self) {
        self.generation += 1;
        self.sender = spawn_slot_thread(self.generation);
    }
}

/// The sandbox's single warm interpreter slot.
///
/// Construction is cheap; the slot thread is spawned (and its VM built) on
/// first use, so catalog- and generator-only callers never pay for a VM.
pub(crate) struct WarmSlot {
    state: Mutex<SlotState>,
}

impl WarmSlot {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                sender: None,
                generation: 0,
            }),
        }
    }

    /// Run `source` on the warm interpreter, waiting at most `limit`.
    ///
    /// Blocks while another request holds the slot. On [`SlotRun::Deadline`]
    /// the slot has already been respawned; the caller reads partial output
    /// from its own `capture` handle.
    pub(crate) fn run(
        &self,
        source: String,
        capture: CaptureBuffer,
        allowed: Arc<HashSet<String>>,
        limit: Duration,
    ) -> SlotRun {
        let mut state = self.state.lock().expect("slot mutex poisoned");

        let Some(sender) = state.sender() else {
            return SlotRun::Unavailable;
        };

        let (reply_tx, reply_rx) = mpsc::sync_channel::<VmRun>(1);
        let mut item = WorkItem {
            source,
            capture,
            allowed,
            reply: reply_tx,
        };

        if let Err(mpsc::SendError(returned)) = sender.send(item) {
            // The slot thread died (panic during a previous run). Replace it
            // and hand the work to the fresh thread.
            tracing::warn!(generation = state.generation, "interpreter slot thread gone, respawning");
            state.respawn();
            let Some(sender) = state.sender() else {
                return SlotRun::Unavailable;
            };
            item = returned;
            if sender.send(item).is_err() {
                return SlotRun::Unavailable;
            }
        }

        match reply_rx.recv_timeout(limit) {
            Ok(run) => SlotRun::Finished(run),
            Err(_) => {
                tracing::warn!(
                    generation = state.generation,
                    limit_ms = limit.as_millis() as u64,
                    "snippet exceeded deadline, tearing down interpreter slot"
                );
                state.respawn();
                SlotRun::Deadline
            }
        }
    }
}

// ── Slot thread ──────────────────────────────────────────────────────────────

/// Spawn a slot thread and block until its interpreter is warm.
///
/// Returns `None` if the thread could not be spawned or died during warm-up.
fn spawn_slot_thread(generation: u64) -> Option<SyncSender<WorkItem>> {
    // Capacity 1: the slot serves one item at a time.
    let (work_tx, work_rx) = mpsc::sync_channel::<WorkItem>(1);
    let (ready_tx, ready_rx) = mpsc::channel::<()>();

    let spawned = thread::Builder::new()
        .name(format!("pytutor-slot-{generation}"))
        .spawn(move || {
            let mut vm = build_vm(HashSet::new());
            let _ = ready_tx.send(());

            while let Ok(item) = work_rx.recv() {
                vm.set_allowed((*item.allowed).clone());
                let run = run_snippet(&vm, &item.source, item.capture);
                // A send error means the caller hit its deadline and left.
                let _ = item.reply.send(run);
            }
            // Work channel closed: this slot was replaced. Let the VM drop here.
        });

    if spawned.is_err() {
        tracing::error!("failed to spawn interpreter slot thread");
        return None;
    }

    match ready_rx.recv() {
        Ok(()) => {
            tracing::debug!(generation, "interpreter slot warm");
            Some(work_tx)
        }
        Err(_) => {
            tracing::error!(generation, "interpreter slot died during warm-up");
            None
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
