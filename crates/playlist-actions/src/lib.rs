//! Built-in actions
//!
//! UI-free actions that are useful in any playlist:
//!
//! - `wait` - complete after a delay
//! - `stop` - fail immediately with a reason
//! - `awaitSignal` - complete or fail when a named signal arrives
//! - `emitSignal` - publish a named signal and move on
//!
//! Widgets (modals, popovers, notices) live with the UI layer and register
//! themselves the same way.

pub mod signal;
pub mod stop;
pub mod wait;

pub use signal::{AwaitSignalAction, EmitSignalAction};
pub use stop::StopAction;
pub use wait::WaitAction;

use playlist_core::{ActionError, ActionResult};
use playlist_registry::ActionRegistry;
use playlist_signals::SharedSignalBus;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Registration names of the built-in actions
pub mod names {
    pub const WAIT: &str = "wait";
    pub const STOP: &str = "stop";
    pub const AWAIT_SIGNAL: &str = "awaitSignal";
    pub const EMIT_SIGNAL: &str = "emitSignal";
}

/// Register every built-in action on `registry`
///
/// The signal actions are bound to `bus`.
pub fn register_builtins(registry: &ActionRegistry, bus: SharedSignalBus) {
    registry.register(names::WAIT, WaitAction::from_options);
    registry.register(names::STOP, StopAction::from_options);

    let await_bus = bus.clone();
    registry.register(names::AWAIT_SIGNAL, move |options| {
        AwaitSignalAction::from_options(await_bus.clone(), options)
    });
    registry.register(names::EMIT_SIGNAL, move |options| {
        EmitSignalAction::from_options(bus.clone(), options)
    });
}

/// Deserialize action options, mapping failures to `InvalidOptions`
pub(crate) fn parse_options<T: DeserializeOwned>(options: Value) -> ActionResult<T> {
    serde_json::from_value(options).map_err(|e| ActionError::invalid_options(e.to_string()))
}
