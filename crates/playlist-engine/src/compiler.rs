//! Playlist compiler
//!
//! Turns a [`Descriptor`] into a [`PlaylistHandle`]. Compilation is
//! synchronous and eager: every action in the tree is constructed before
//! anything runs, and any syntax error aborts the whole compile.

use crate::config::EngineConfig;
use crate::descriptor::{index_path, key_path, Descriptor, ROOT_PATH};
use crate::error::{PlaylistResult, SyntaxError};
use crate::handle::PlaylistHandle;
use crate::interpreter;
use crate::playlist::{Body, Playlist, Step};
use playlist_registry::{ActionRegistry, SharedActionRegistry};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Compiles descriptors against one action registry
#[derive(Debug, Clone)]
pub struct PlaylistCompiler {
    registry: SharedActionRegistry,
    config: EngineConfig,
}

impl PlaylistCompiler {
    /// Create a compiler resolving actions through `registry`
    pub fn new(registry: SharedActionRegistry) -> Self {
        Self {
            registry,
            config: EngineConfig::default(),
        }
    }

    /// Compiler over the process-wide registry
    pub fn global() -> Self {
        Self::new(Arc::clone(ActionRegistry::global()))
    }

    /// Replace the engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &SharedActionRegistry {
        &self.registry
    }

    /// Compile a descriptor into a playable handle
    pub fn compile(&self, descriptor: &Descriptor) -> PlaylistResult<PlaylistHandle> {
        let handle = self.compile_group(descriptor, ROOT_PATH, 1)?;
        debug!(
            playlist = %handle.id(),
            actions = descriptor.action_count(),
            "Compiled playlist"
        );
        Ok(handle)
    }

    /// Classify a serialized descriptor, then compile it
    pub fn compile_value(&self, value: &Value) -> PlaylistResult<PlaylistHandle> {
        let descriptor = Descriptor::from_value_with_limit(value, self.config.max_depth)?;
        self.compile(&descriptor)
    }

    fn compile_group(
        &self,
        descriptor: &Descriptor,
        path: &str,
        depth: usize,
    ) -> Result<PlaylistHandle, SyntaxError> {
        if depth > self.config.max_depth {
            return Err(SyntaxError::TooDeep {
                path: path.to_string(),
                max_depth: self.config.max_depth,
            });
        }

        let body = match descriptor {
            // A bare action at the root runs as a one-step sequence
            Descriptor::Action(_) | Descriptor::Instance(_) => {
                Body::Sequence(vec![self.compile_step(descriptor, path, depth)?])
            }
            Descriptor::Sequence(nodes) => Body::Sequence(
                nodes
                    .iter()
                    .enumerate()
                    .map(|(i, node)| self.compile_step(node, &index_path(path, i), depth))
                    .collect::<Result<Vec<_>, SyntaxError>>()?,
            ),
            Descriptor::Parallel(nodes) => Body::Parallel {
                branches: nodes
                    .iter()
                    .map(|(key, node)| {
                        let step = self.compile_step(node, &key_path(path, key), depth)?;
                        Ok((key.clone(), step))
                    })
                    .collect::<Result<Vec<_>, SyntaxError>>()?,
                policy: self.config.parallel_failure,
            },
        };

        debug!(path = %path, kind = ?descriptor.kind(), "Compiled group");
        Ok(PlaylistHandle::new(Playlist::new(descriptor.clone(), body)))
    }

    fn compile_step(
        &self,
        descriptor: &Descriptor,
        path: &str,
        depth: usize,
    ) -> Result<Step, SyntaxError> {
        match descriptor {
            Descriptor::Action(action) => Ok(Step::Action {
                action: interpreter::instantiate(action, &self.registry, path)?,
                label: action.action_name.clone(),
            }),
            Descriptor::Instance(action) => Ok(Step::Action {
                action: Arc::clone(action),
                label: "instance".to_string(),
            }),
            Descriptor::Sequence(_) | Descriptor::Parallel(_) => Ok(Step::Nested(
                self.compile_group(descriptor, path, depth + 1)?,
            )),
        }
    }
}

impl Default for PlaylistCompiler {
    fn default() -> Self {
        Self::global()
    }
}
