//! Playlist Engine
//!
//! This crate compiles declarative playlist descriptors into runnable
//! playlists. A descriptor is a tree of actions: arrays run their nodes one
//! after another, objects start all of their nodes together, and either kind
//! can nest inside the other.
//!
//! ```no_run
//! use playlist_engine::{create_playlist, Descriptor};
//! use serde_json::json;
//!
//! # async fn run() -> playlist_engine::PlaylistResult<()> {
//! let descriptor = Descriptor::from_value(&json!([
//!     {"actionName": "wait", "options": {"timeout": 10}},
//!     {"a": {"actionName": "wait", "options": {"timeout": 20}}}
//! ]))?;
//!
//! let playlist = create_playlist(&descriptor)?;
//! playlist.play()?;
//! let _result = playlist.completion().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Key Types
//!
//! - [`Descriptor`] - The declarative tree
//! - [`PlaylistCompiler`] - Builds playlists against a registry
//! - [`PlaylistHandle`] - Start trigger plus aggregate completion
//! - [`EngineConfig`] - Parallel failure policy and nesting limit

pub mod compiler;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod handle;
pub mod interpreter;
pub mod playlist;

pub use compiler::PlaylistCompiler;
pub use config::{ConfigError, ConfigResult, EngineConfig, ParallelFailure, DEFAULT_MAX_DEPTH};
pub use descriptor::{ActionRef, Descriptor, NodeKind};
pub use error::{PlaylistError, PlaylistResult, SyntaxError};
pub use handle::{PlaylistCompletion, PlaylistHandle, PlaylistState};
pub use interpreter::{classify, instantiate};
pub use playlist::Playlist;

pub use playlist_core::{do_action, Action, ActionError, ActionResult, Completion, SharedAction};
pub use playlist_registry::{ActionConstructor, ActionRegistry, RegistryError};

use serde_json::Value;
use std::collections::HashMap;

/// Compile a descriptor against the process-wide registry
pub fn create_playlist(descriptor: &Descriptor) -> PlaylistResult<PlaylistHandle> {
    PlaylistCompiler::global().compile(descriptor)
}

/// Compile a serialized descriptor against the process-wide registry
pub fn create_playlist_from_value(value: &Value) -> PlaylistResult<PlaylistHandle> {
    PlaylistCompiler::global().compile_value(value)
}

/// Register an action constructor on the process-wide registry
pub fn register_action<F, A>(name: impl Into<String>, constructor: F)
where
    F: Fn(Value) -> ActionResult<A> + Send + Sync + 'static,
    A: Action + 'static,
{
    ActionRegistry::global().register(name, constructor);
}

/// Snapshot of the process-wide registry
pub fn get_actions() -> HashMap<String, ActionConstructor> {
    ActionRegistry::global().list_registered()
}
