//! Playlist descriptors
//!
//! A descriptor is the declarative tree a caller hands to the compiler:
//!
//! - an action reference `{"actionName": "wait", "options": {"timeout": 10}}`
//!   or an already constructed action,
//! - an array, whose nodes run one after another,
//! - an object, whose nodes all start together.
//!
//! Serialized descriptors are classified once, here at the boundary; the rest
//! of the engine only sees the typed tree.

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::SyntaxError;
use crate::interpreter;
use indexmap::IndexMap;
use playlist_core::SharedAction;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Reference to a registered action by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRef {
    /// Name the action was registered under
    #[serde(rename = "actionName")]
    pub action_name: String,

    /// Options passed to the constructor
    #[serde(default)]
    pub options: Value,
}

impl ActionRef {
    pub fn new(action_name: impl Into<String>, options: Value) -> Self {
        Self {
            action_name: action_name.into(),
            options,
        }
    }
}

/// A node of a playlist descriptor
#[derive(Clone)]
pub enum Descriptor {
    /// Action to construct through the registry
    Action(ActionRef),

    /// Already constructed action
    Instance(SharedAction),

    /// Nodes executed in order
    Sequence(Vec<Descriptor>),

    /// Nodes started together, keyed by name
    Parallel(IndexMap<String, Descriptor>),
}

/// What kind of node a descriptor is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Action,
    Sequential,
    Parallel,
}

impl Descriptor {
    /// Action reference node
    pub fn action(action_name: impl Into<String>, options: Value) -> Self {
        Descriptor::Action(ActionRef::new(action_name, options))
    }

    /// Already constructed action node
    pub fn instance(action: SharedAction) -> Self {
        Descriptor::Instance(action)
    }

    /// Sequential group
    pub fn sequence(nodes: impl IntoIterator<Item = Descriptor>) -> Self {
        Descriptor::Sequence(nodes.into_iter().collect())
    }

    /// Parallel group
    pub fn parallel<K: Into<String>>(nodes: impl IntoIterator<Item = (K, Descriptor)>) -> Self {
        Descriptor::Parallel(nodes.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Classify and convert a serialized descriptor
    ///
    /// Nesting is limited to [`DEFAULT_MAX_DEPTH`] groups.
    pub fn from_value(value: &Value) -> Result<Self, SyntaxError> {
        Self::from_value_with_limit(value, DEFAULT_MAX_DEPTH)
    }

    /// Classify and convert a serialized descriptor nested at most
    /// `max_depth` groups deep
    pub fn from_value_with_limit(value: &Value, max_depth: usize) -> Result<Self, SyntaxError> {
        interpreter::parse(value, ROOT_PATH, 1, max_depth)
    }

    /// Parse a JSON descriptor
    pub fn from_json_str(content: &str) -> Result<Self, SyntaxError> {
        let value: Value = serde_json::from_str(content).map_err(|e| SyntaxError::Parse {
            reason: e.to_string(),
        })?;
        Self::from_value(&value)
    }

    /// Parse a YAML descriptor
    pub fn from_yaml_str(content: &str) -> Result<Self, SyntaxError> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| SyntaxError::Parse {
            reason: e.to_string(),
        })?;
        Self::from_value(&value)
    }

    /// Kind of this node
    pub fn kind(&self) -> NodeKind {
        match self {
            Descriptor::Action(_) | Descriptor::Instance(_) => NodeKind::Action,
            Descriptor::Sequence(_) => NodeKind::Sequential,
            Descriptor::Parallel(_) => NodeKind::Parallel,
        }
    }

    /// Number of leaf actions in this subtree
    pub fn action_count(&self) -> usize {
        match self {
            Descriptor::Action(_) | Descriptor::Instance(_) => 1,
            Descriptor::Sequence(nodes) => nodes.iter().map(Descriptor::action_count).sum(),
            Descriptor::Parallel(nodes) => nodes.values().map(Descriptor::action_count).sum(),
        }
    }
}

impl std::fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Descriptor::Action(action) => f.debug_tuple("Action").field(action).finish(),
            Descriptor::Instance(_) => f.write_str("Instance(..)"),
            Descriptor::Sequence(nodes) => f.debug_tuple("Sequence").field(nodes).finish(),
            Descriptor::Parallel(nodes) => f.debug_tuple("Parallel").field(nodes).finish(),
        }
    }
}

impl From<ActionRef> for Descriptor {
    fn from(action: ActionRef) -> Self {
        Descriptor::Action(action)
    }
}

impl From<SharedAction> for Descriptor {
    fn from(action: SharedAction) -> Self {
        Descriptor::Instance(action)
    }
}

impl<'de> Deserialize<'de> for Descriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Descriptor::from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// Path of the root node in error messages
pub(crate) const ROOT_PATH: &str = "$";

pub(crate) fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

pub(crate) fn key_path(parent: &str, key: &str) -> String {
    format!("{parent}.{key}")
}
