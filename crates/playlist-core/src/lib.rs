//! Core types for the playlist engine
//!
//! This crate provides the types every other playlist crate builds on:
//! the [`Action`] contract, the single-resolution [`Completion`] signal an
//! action settles, and [`ActionError`].
//!
//! An action is a unit of asynchronous work. The engine calls
//! [`Action::begin`] exactly once; the action later calls
//! [`Action::complete`] or [`Action::fail`] from wherever its work finishes
//! (a timer, a user dismissing a dialog, a signal).

mod action;
mod completion;
mod error;

pub use action::{do_action, Action, ActionFuture, SharedAction};
pub use completion::Completion;
pub use error::{ActionError, ActionResult};

/// Re-exported so action implementations don't need a direct serde_json dependency
pub use serde_json::Value;
