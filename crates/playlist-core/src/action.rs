//! The Action contract
//!
//! Actions are the leaves of a playlist. Each one wraps a [`Completion`] and
//! implements [`Action::begin`]; everything else has a default.

use crate::completion::Completion;
use crate::error::{ActionError, ActionResult};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::trace;

/// Future returned by [`do_action`]
pub type ActionFuture = Pin<Box<dyn Future<Output = ActionResult<Value>> + Send>>;

/// Shared, type-erased action instance
pub type SharedAction = Arc<dyn Action>;

/// A unit of asynchronous work with a begin/complete/fail lifecycle
///
/// # Contract
///
/// - Construction may prepare state but must not start visible work.
/// - `begin` is called exactly once by the engine. It must not block; work
///   that takes time is spawned and settles the completion later.
/// - Exactly one of `complete`/`fail` takes effect; later calls are ignored.
/// - `end` is a cleanup hook the engine never calls on its own.
///
/// # Example
///
/// ```
/// use playlist_core::{Action, Completion, Value};
///
/// struct Echo {
///     completion: Completion,
/// }
///
/// impl Action for Echo {
///     fn completion(&self) -> &Completion {
///         &self.completion
///     }
///
///     fn begin(&self, input: Value) {
///         self.complete(input);
///     }
/// }
/// ```
pub trait Action: Send + Sync {
    /// The completion signal this action settles
    fn completion(&self) -> &Completion;

    /// Start the action's work
    ///
    /// `input` is the previous sequential step's result, or `Value::Null`.
    fn begin(&self, input: Value);

    /// Resolve the action with a result value
    fn complete(&self, result: Value) {
        self.completion().complete(result);
    }

    /// Reject the action
    fn fail(&self, error: ActionError) {
        self.completion().fail(error);
    }

    /// Revert whatever the action applied
    fn end(&self) {}
}

/// Begin an action and wait for it to settle
///
/// `begin` runs synchronously inside this call, before the future is
/// returned. A second call on the same instance yields
/// [`ActionError::AlreadyStarted`] and does not call `begin` again.
pub fn do_action(action: &dyn Action, input: Value) -> ActionFuture {
    let Some(receiver) = action.completion().take_receiver() else {
        return Box::pin(std::future::ready(Err(ActionError::AlreadyStarted)));
    };

    trace!("Beginning action");
    action.begin(input);

    Box::pin(async move { receiver.await.unwrap_or(Err(ActionError::Abandoned)) })
}
