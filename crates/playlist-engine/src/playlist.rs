//! Compiled playlists and their execution
//!
//! A [`Playlist`] is the executable form of one descriptor group. Its steps
//! are either leaf actions or nested playlists; a sequence awaits each step
//! before launching the next, a parallel group launches every step up front.

use crate::config::ParallelFailure;
use crate::descriptor::Descriptor;
use crate::error::{PlaylistError, PlaylistResult};
use crate::handle::PlaylistHandle;
use futures::future::{self, BoxFuture, FutureExt, TryFutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use playlist_core::{do_action, SharedAction};
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};
use ulid::Ulid;

/// One runnable unit inside a group
pub(crate) enum Step {
    /// Leaf action, labelled with its registered name for logs
    Action { action: SharedAction, label: String },

    /// Nested group, played and awaited as a single step
    Nested(PlaylistHandle),
}

impl Step {
    fn label(&self) -> &str {
        match self {
            Step::Action { label, .. } => label,
            Step::Nested(_) => "playlist",
        }
    }

    /// Start the step now and return a future of its outcome
    ///
    /// For a leaf, `begin` has already run when this returns.
    fn launch(&self, input: Value) -> BoxFuture<'static, PlaylistResult<Value>> {
        match self {
            Step::Action { action, label } => {
                let label = label.clone();
                do_action(action.as_ref(), input)
                    .map_err(move |e| {
                        warn!(action = %label, error = %e, "Action failed");
                        PlaylistError::from(e)
                    })
                    .boxed()
            }
            Step::Nested(playlist) => match playlist.play_with(input) {
                Ok(()) => playlist.completion().boxed(),
                Err(e) => future::ready(Err(e)).boxed(),
            },
        }
    }
}

/// Body of a compiled group
pub(crate) enum Body {
    Sequence(Vec<Step>),
    Parallel {
        branches: Vec<(String, Step)>,
        policy: ParallelFailure,
    },
}

/// Compiled, executable counterpart of a descriptor subtree
pub struct Playlist {
    id: String,
    descriptor: Descriptor,
    body: Body,
}

impl Playlist {
    pub(crate) fn new(descriptor: Descriptor, body: Body) -> Self {
        Self {
            id: Ulid::new().to_string(),
            descriptor,
            body,
        }
    }

    /// Unique id (ULID) used in log fields
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The descriptor this playlist was compiled from
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Number of direct steps
    pub fn step_count(&self) -> usize {
        match &self.body {
            Body::Sequence(steps) => steps.len(),
            Body::Parallel { branches, .. } => branches.len(),
        }
    }

    /// Run every step to completion
    pub(crate) async fn run(&self, input: Value) -> PlaylistResult<Value> {
        match &self.body {
            Body::Sequence(steps) => self.run_sequence(steps, input).await,
            Body::Parallel { branches, policy } => match policy {
                ParallelFailure::FailFast => self.run_fail_fast(branches, input).await,
                ParallelFailure::SettleAll => self.run_settle_all(branches, input).await,
            },
        }
    }

    async fn run_sequence(&self, steps: &[Step], input: Value) -> PlaylistResult<Value> {
        debug!(playlist = %self.id, steps = steps.len(), "Running sequence");

        let mut value = input;
        for (index, step) in steps.iter().enumerate() {
            trace!(playlist = %self.id, index, step = %step.label(), "Launching step");
            value = step.launch(value).await?;
        }

        Ok(value)
    }

    /// Launch every branch with the same input before awaiting any
    fn launch_all(
        &self,
        branches: &[(String, Step)],
        input: &Value,
    ) -> Vec<BoxFuture<'static, PlaylistResult<(String, Value)>>> {
        branches
            .iter()
            .map(|(key, step)| {
                trace!(playlist = %self.id, branch = %key, step = %step.label(), "Launching branch");
                let key = key.clone();
                step.launch(input.clone())
                    .map_ok(move |value| (key, value))
                    .boxed()
            })
            .collect()
    }

    async fn run_fail_fast(
        &self,
        branches: &[(String, Step)],
        input: Value,
    ) -> PlaylistResult<Value> {
        debug!(playlist = %self.id, branches = branches.len(), "Running parallel group");

        let launched = self.launch_all(branches, &input);
        let results = future::try_join_all(launched).await?;

        Ok(Value::Object(results.into_iter().collect()))
    }

    async fn run_settle_all(
        &self,
        branches: &[(String, Step)],
        input: Value,
    ) -> PlaylistResult<Value> {
        debug!(
            playlist = %self.id,
            branches = branches.len(),
            "Running parallel group (settle all)"
        );

        let mut pending: FuturesUnordered<_> =
            self.launch_all(branches, &input).into_iter().collect();
        let mut results = Map::new();
        let mut first_error = None;

        while let Some(outcome) = pending.next().await {
            match outcome {
                Ok((key, value)) => {
                    results.insert(key, value);
                }
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(Value::Object(results)),
        }
    }
}

impl std::fmt::Debug for Playlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Playlist")
            .field("id", &self.id)
            .field("steps", &self.step_count())
            .field("descriptor", &self.descriptor)
            .finish()
    }
}
