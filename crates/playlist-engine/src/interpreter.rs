//! Descriptor interpreter
//!
//! Classifies serialized nodes and turns action references into instances.
//! Classification order matters: an object carrying `actionName` is an
//! action reference even though it is also a map.

use crate::descriptor::{index_path, key_path, ActionRef, Descriptor, NodeKind};
use crate::error::SyntaxError;
use indexmap::IndexMap;
use playlist_core::SharedAction;
use playlist_registry::{ActionRegistry, RegistryError};
use serde_json::Value;
use tracing::trace;

/// Key naming the registered action in a serialized node
pub const ACTION_NAME_KEY: &str = "actionName";

/// Key holding constructor options in a serialized node
pub const OPTIONS_KEY: &str = "options";

/// Classify a serialized node without descending into it
///
/// Returns `None` for scalars and null, which can never be nodes.
pub fn classify(value: &Value) -> Option<NodeKind> {
    match value {
        Value::Object(map) if map.contains_key(ACTION_NAME_KEY) => Some(NodeKind::Action),
        Value::Array(_) => Some(NodeKind::Sequential),
        Value::Object(_) => Some(NodeKind::Parallel),
        _ => None,
    }
}

/// Convert a serialized node (and everything below it) into a descriptor
///
/// `depth` is the group nesting level of `value` (the root group is 1).
/// Groups nested deeper than `max_depth` are rejected before descending.
pub(crate) fn parse(
    value: &Value,
    path: &str,
    depth: usize,
    max_depth: usize,
) -> Result<Descriptor, SyntaxError> {
    let Some(kind) = classify(value) else {
        return Err(SyntaxError::Unclassifiable {
            path: path.to_string(),
            found: value_kind(value).to_string(),
        });
    };

    if kind != NodeKind::Action && depth > max_depth {
        return Err(SyntaxError::TooDeep {
            path: path.to_string(),
            max_depth,
        });
    }

    match (kind, value) {
        (NodeKind::Action, Value::Object(map)) => {
            let Some(Value::String(name)) = map.get(ACTION_NAME_KEY) else {
                return Err(SyntaxError::InvalidActionName {
                    path: path.to_string(),
                });
            };
            let options = map.get(OPTIONS_KEY).cloned().unwrap_or(Value::Null);
            Ok(Descriptor::Action(ActionRef::new(name.clone(), options)))
        }
        (NodeKind::Sequential, Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| parse(item, &index_path(path, i), depth + 1, max_depth))
            .collect::<Result<Vec<_>, _>>()
            .map(Descriptor::Sequence),
        (NodeKind::Parallel, Value::Object(map)) => map
            .iter()
            .map(|(key, item)| {
                let node = parse(item, &key_path(path, key), depth + 1, max_depth)?;
                Ok((key.clone(), node))
            })
            .collect::<Result<IndexMap<_, _>, SyntaxError>>()
            .map(Descriptor::Parallel),
        _ => Err(SyntaxError::Unclassifiable {
            path: path.to_string(),
            found: value_kind(value).to_string(),
        }),
    }
}

/// Construct the action an [`ActionRef`] names
///
/// Resolution happens now, so a later re-registration does not affect
/// instances built here.
pub fn instantiate(
    action: &ActionRef,
    registry: &ActionRegistry,
    path: &str,
) -> Result<SharedAction, SyntaxError> {
    trace!(path = %path, action = %action.action_name, "Instantiating action");

    registry
        .construct(&action.action_name, action.options.clone())
        .map_err(|e| match e {
            RegistryError::NotFound { name } => SyntaxError::UnknownAction {
                path: path.to_string(),
                name,
            },
            RegistryError::Construction { name, source } => SyntaxError::InvalidOptions {
                path: path.to_string(),
                name,
                reason: source.to_string(),
            },
        })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
