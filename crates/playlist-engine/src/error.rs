//! Error types for compiling and running playlists

use playlist_core::ActionError;
use thiserror::Error;

/// Result type for playlist operations
pub type PlaylistResult<T> = Result<T, PlaylistError>;

/// A descriptor that cannot be turned into a playlist
///
/// Every variant that points at a node carries its path from the root,
/// e.g. `$[1].intro`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("incorrect syntax at {path}: action {name} is not registered")]
    UnknownAction { path: String, name: String },

    #[error("incorrect syntax at {path}: actionName must be a string")]
    InvalidActionName { path: String },

    #[error("incorrect syntax at {path}: invalid options for {name}: {reason}")]
    InvalidOptions {
        path: String,
        name: String,
        reason: String,
    },

    #[error("incorrect syntax at {path}: expected an action, array or object, found {found}")]
    Unclassifiable { path: String, found: String },

    #[error("incorrect syntax at {path}: nesting deeper than {max_depth} levels")]
    TooDeep { path: String, max_depth: usize },

    #[error("incorrect syntax: {reason}")]
    Parse { reason: String },
}

/// Errors from compiling or playing a playlist
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaylistError {
    /// The descriptor could not be compiled
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// An action failed; the first failure wins
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("playlist already played")]
    AlreadyPlayed,

    #[error("play() requires a running tokio runtime")]
    NoRuntime,

    #[error("playlist was dropped before it was played")]
    NeverStarted,
}

impl PlaylistError {
    /// Whether this is a compile-time syntax error
    pub fn is_syntax(&self) -> bool {
        matches!(self, PlaylistError::Syntax(_))
    }
}
