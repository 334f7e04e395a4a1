//! Signal actions
//!
//! `awaitSignal` lets code outside the playlist decide when a step is done:
//! it completes with the payload of a `complete` signal and fails with the
//! reason of a `fail` signal. `emitSignal` publishes one and moves on, which
//! lets one parallel branch release another.

use crate::parse_options;
use playlist_core::{Action, ActionError, ActionResult, Completion};
use playlist_signals::{SharedSignalBus, Signal, SignalKind};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Mutex;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, Deserialize)]
struct AwaitSignalOptions {
    signal: String,
}

/// Waits for a named signal on the bus
pub struct AwaitSignalAction {
    completion: Completion,
    bus: SharedSignalBus,
    signal: String,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl AwaitSignalAction {
    pub fn new(bus: SharedSignalBus, signal: impl Into<String>) -> Self {
        Self {
            completion: Completion::new(),
            bus,
            signal: signal.into(),
            listener: Mutex::new(None),
        }
    }

    /// Build from descriptor options
    pub fn from_options(bus: SharedSignalBus, options: Value) -> ActionResult<Self> {
        let options: AwaitSignalOptions = parse_options(options)?;
        Ok(Self::new(bus, options.signal))
    }

    /// Name of the awaited signal
    pub fn signal(&self) -> &str {
        &self.signal
    }
}

impl Action for AwaitSignalAction {
    fn completion(&self) -> &Completion {
        &self.completion
    }

    fn begin(&self, _input: Value) {
        // Subscribe before returning so a signal sent right after begin is seen
        let mut rx = self.bus.subscribe(self.signal.clone());
        let completion = self.completion.clone();
        let name = self.signal.clone();

        debug!(signal = %name, "Awaiting signal");
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(signal) => {
                        match signal.kind {
                            SignalKind::Complete { payload } => completion.complete(payload),
                            SignalKind::Fail { reason } => {
                                completion.fail(ActionError::failed(reason))
                            }
                        };
                        break;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(signal = %name, skipped, "Signal listener lagged");
                    }
                    Err(RecvError::Closed) => {
                        completion.fail(ActionError::failed(format!(
                            "signal bus closed while awaiting {name}"
                        )));
                        break;
                    }
                }
            }
        });

        let mut listener = self
            .listener
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *listener = Some(handle);
    }

    /// Stop listening; the action stays unsettled if no signal arrived
    fn end(&self) {
        let handle = self
            .listener
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct EmitSignalOptions {
    signal: String,
    #[serde(default)]
    payload: Value,
    #[serde(default)]
    fail: Option<String>,
}

/// Publishes a signal and completes with its input
pub struct EmitSignalAction {
    completion: Completion,
    bus: SharedSignalBus,
    signal: Signal,
}

impl EmitSignalAction {
    pub fn new(bus: SharedSignalBus, signal: Signal) -> Self {
        Self {
            completion: Completion::new(),
            bus,
            signal,
        }
    }

    /// Build from descriptor options
    ///
    /// A `fail` reason turns the signal into a failure signal; otherwise it
    /// completes listeners with `payload`.
    pub fn from_options(bus: SharedSignalBus, options: Value) -> ActionResult<Self> {
        let options: EmitSignalOptions = parse_options(options)?;
        let signal = match options.fail {
            Some(reason) => Signal::fail(options.signal, reason),
            None => Signal::complete(options.signal, options.payload),
        };
        Ok(Self::new(bus, signal))
    }
}

impl Action for EmitSignalAction {
    fn completion(&self) -> &Completion {
        &self.completion
    }

    fn begin(&self, input: Value) {
        let delivered = self.bus.emit(self.signal.clone());
        if delivered == 0 {
            debug!(signal = %self.signal.name, "Signal had no listeners");
        }
        self.complete(input);
    }
}
