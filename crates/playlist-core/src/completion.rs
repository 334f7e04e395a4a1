//! Single-resolution completion signal
//!
//! Every action owns one [`Completion`]. The first call to
//! [`Completion::complete`] or [`Completion::fail`] settles it; any later call
//! is ignored. Clones share the same signal, so an action can hand a clone to
//! a spawned timer task and settle from there.

use crate::error::{ActionError, ActionResult};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::trace;

type Outcome = ActionResult<Value>;

struct CompletionInner {
    sender: Mutex<Option<oneshot::Sender<Outcome>>>,
    receiver: Mutex<Option<oneshot::Receiver<Outcome>>>,
}

/// The completion signal of one action instance
#[derive(Clone)]
pub struct Completion {
    inner: Arc<CompletionInner>,
}

impl Completion {
    /// Create a fresh, unsettled completion
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            inner: Arc::new(CompletionInner {
                sender: Mutex::new(Some(tx)),
                receiver: Mutex::new(Some(rx)),
            }),
        }
    }

    /// Resolve with a result value
    ///
    /// Returns `false` if the completion was already settled.
    pub fn complete(&self, result: Value) -> bool {
        self.settle(Ok(result))
    }

    /// Reject with an error
    ///
    /// Returns `false` if the completion was already settled.
    pub fn fail(&self, error: ActionError) -> bool {
        self.settle(Err(error))
    }

    /// Whether `complete` or `fail` has already taken effect
    pub fn is_settled(&self) -> bool {
        lock(&self.inner.sender).is_none()
    }

    /// Take the receiving side; only the first caller gets it
    pub(crate) fn take_receiver(&self) -> Option<oneshot::Receiver<Outcome>> {
        lock(&self.inner.receiver).take()
    }

    fn settle(&self, outcome: Outcome) -> bool {
        let Some(sender) = lock(&self.inner.sender).take() else {
            trace!(ok = outcome.is_ok(), "Ignoring settlement of an already settled completion");
            return false;
        };
        // The receiver may be gone when nobody waits any more (e.g. a parallel
        // group that already failed); settling still counts.
        let _ = sender.send(outcome);
        true
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("settled", &self.is_settled())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
