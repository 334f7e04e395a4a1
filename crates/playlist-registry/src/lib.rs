//! Action registry for the playlist engine
//!
//! This crate provides the ActionRegistry, which associates a stable name
//! with an action constructor so serialized descriptors
//! (`{"actionName": "wait", "options": {...}}`) can be turned into running
//! actions without the caller importing the implementation.

use dashmap::DashMap;
use playlist_core::{Action, ActionError, ActionResult, SharedAction};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Constructor function type: options in, shared action out
pub type ActionConstructor = Arc<dyn Fn(Value) -> ActionResult<SharedAction> + Send + Sync>;

/// Errors that can occur when constructing actions by name
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("action not registered: {name}")]
    NotFound { name: String },

    #[error("failed to construct action {name}: {source}")]
    Construction {
        name: String,
        #[source]
        source: ActionError,
    },
}

static GLOBAL: OnceLock<Arc<ActionRegistry>> = OnceLock::new();

/// The action registry manages every registered action constructor
///
/// The ActionRegistry is responsible for:
/// - Registering constructors under a name (last writer wins)
/// - Resolving names to constructors
/// - Providing snapshots of what is registered
///
/// Registries are plain values so tests can build isolated ones;
/// [`ActionRegistry::global`] is the process-wide default.
pub struct ActionRegistry {
    /// Constructors indexed by action name
    constructors: DashMap<String, ActionConstructor>,
}

impl ActionRegistry {
    /// Create a new empty action registry
    pub fn new() -> Self {
        Self {
            constructors: DashMap::new(),
        }
    }

    /// The process-wide registry, created empty on first use
    pub fn global() -> &'static Arc<ActionRegistry> {
        GLOBAL.get_or_init(|| Arc::new(ActionRegistry::new()))
    }

    /// Register an action constructor
    ///
    /// Registering a name twice replaces the earlier constructor. Playlists
    /// that were already compiled keep the instances they built.
    ///
    /// # Arguments
    /// * `name` - The name descriptors refer to (e.g., "wait")
    /// * `constructor` - Builds an action from its options
    #[instrument(skip(self, name, constructor))]
    pub fn register<F, A>(&self, name: impl Into<String>, constructor: F)
    where
        F: Fn(Value) -> ActionResult<A> + Send + Sync + 'static,
        A: Action + 'static,
    {
        let constructor: ActionConstructor =
            Arc::new(move |options: Value| -> ActionResult<SharedAction> {
                Ok(Arc::new(constructor(options)?))
            });
        self.register_constructor(name, constructor);
    }

    /// Register an already type-erased constructor
    pub fn register_constructor(&self, name: impl Into<String>, constructor: ActionConstructor) {
        let name = name.into();
        if self.constructors.insert(name.clone(), constructor).is_some() {
            debug!(action = %name, "Replaced registered action");
        } else {
            debug!(action = %name, "Registered action");
        }
    }

    /// Look up the constructor registered under `name`
    pub fn resolve(&self, name: &str) -> Option<ActionConstructor> {
        self.constructors.get(name).map(|c| c.value().clone())
    }

    /// Resolve `name` and build an instance from `options`
    pub fn construct(&self, name: &str, options: Value) -> Result<SharedAction, RegistryError> {
        let constructor = self.resolve(name).ok_or_else(|| {
            warn!(action = %name, "Action not registered");
            RegistryError::NotFound {
                name: name.to_string(),
            }
        })?;

        constructor(options).map_err(|source| RegistryError::Construction {
            name: name.to_string(),
            source,
        })
    }

    /// Snapshot of every registered constructor
    pub fn list_registered(&self) -> HashMap<String, ActionConstructor> {
        self.constructors
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.constructors.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Check if an action name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Remove a registration
    #[instrument(skip(self))]
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.constructors.remove(name).is_some();

        if removed {
            debug!(action = %name, "Unregistered action");
        }

        removed
    }

    /// Get total number of registered actions
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}

/// Thread-safe wrapper for ActionRegistry
pub type SharedActionRegistry = Arc<ActionRegistry>;
