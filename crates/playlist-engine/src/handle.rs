//! Playlist handles
//!
//! The handle is what callers hold: a single-fire start trigger and a
//! completion future for the whole tree. Nested groups are handles too; their
//! parent plays them and awaits their completion like any other step.

use crate::descriptor::Descriptor;
use crate::error::{PlaylistError, PlaylistResult};
use crate::playlist::Playlist;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::debug;

/// Future resolving with a playlist's aggregate result
///
/// Cloneable; every clone observes the same outcome.
pub type PlaylistCompletion = Shared<BoxFuture<'static, PlaylistResult<Value>>>;

/// Lifecycle of a playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistState {
    /// Compiled, not played yet
    Created,
    /// Played, work outstanding
    Running,
    /// Every step completed
    Completed,
    /// A step failed
    Failed,
}

impl PlaylistState {
    /// Whether no further transition can happen
    pub fn is_terminal(self) -> bool {
        matches!(self, PlaylistState::Completed | PlaylistState::Failed)
    }
}

struct HandleInner {
    playlist: Arc<Playlist>,
    state: Arc<Mutex<PlaylistState>>,
    start: Mutex<Option<oneshot::Sender<Value>>>,
    completion: PlaylistCompletion,
}

/// Externally visible handle of a compiled playlist
///
/// Cloning the handle shares the same playlist; it does not compile a new
/// one. To replay a descriptor, compile it again.
#[derive(Clone)]
pub struct PlaylistHandle {
    inner: Arc<HandleInner>,
}

impl PlaylistHandle {
    pub(crate) fn new(playlist: Playlist) -> Self {
        let playlist = Arc::new(playlist);
        let state = Arc::new(Mutex::new(PlaylistState::Created));
        let (start_tx, start_rx) = oneshot::channel::<Value>();

        let driver = {
            let playlist = playlist.clone();
            let state = state.clone();
            async move {
                let input = start_rx.await.map_err(|_| PlaylistError::NeverStarted)?;
                let outcome = playlist.run(input).await;

                let finished = if outcome.is_ok() {
                    PlaylistState::Completed
                } else {
                    PlaylistState::Failed
                };
                *lock(&state) = finished;
                debug!(playlist = %playlist.id(), state = ?finished, "Playlist finished");

                outcome
            }
        };

        Self {
            inner: Arc::new(HandleInner {
                playlist,
                state,
                start: Mutex::new(Some(start_tx)),
                completion: driver.boxed().shared(),
            }),
        }
    }

    /// Start the playlist with `Value::Null` as input
    ///
    /// Execution is spawned on the current tokio runtime; observe the outcome
    /// through [`PlaylistHandle::completion`].
    pub fn play(&self) -> PlaylistResult<()> {
        self.play_with(Value::Null)
    }

    /// Start the playlist, handing `input` to its first step(s)
    pub fn play_with(&self, input: Value) -> PlaylistResult<()> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| PlaylistError::NoRuntime)?;
        let start = lock(&self.inner.start)
            .take()
            .ok_or(PlaylistError::AlreadyPlayed)?;

        *lock(&self.inner.state) = PlaylistState::Running;
        debug!(playlist = %self.id(), "Playing playlist");

        // The receiver lives in the driver, which this handle keeps alive
        let _ = start.send(input);
        runtime.spawn(self.inner.completion.clone());

        Ok(())
    }

    /// Future of the aggregate result
    pub fn completion(&self) -> PlaylistCompletion {
        self.inner.completion.clone()
    }

    /// Current lifecycle state
    pub fn state(&self) -> PlaylistState {
        *lock(&self.inner.state)
    }

    /// Unique id of the root playlist
    pub fn id(&self) -> &str {
        self.inner.playlist.id()
    }

    /// Source descriptor, for diagnostics
    pub fn descriptor(&self) -> &Descriptor {
        self.inner.playlist.descriptor()
    }

    /// The compiled playlist behind this handle
    pub fn playlist(&self) -> &Playlist {
        &self.inner.playlist
    }
}

impl std::fmt::Debug for PlaylistHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaylistHandle")
            .field("id", &self.id())
            .field("state", &self.state())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
