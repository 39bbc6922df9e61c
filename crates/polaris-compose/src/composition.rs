//! Persisted composition payload
//!
//! The `data` map of a `Composition` governance object. The payload owns a
//! snapshot of ids only; referenced objects stay in the store.

use crate::edge::TypedEdge;
use crate::error::ComposeError;
use polaris_memory::{GovernanceObject, ObjectType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One persisted edge, in any historical encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeEncoding {
    /// Legacy `[from, to]` pair, read as a dependency edge
    Legacy(String, String),
    /// Full typed edge record
    Typed(TypedEdge),
    /// Anything else, kept verbatim
    Unrecognized(Value),
}

impl EdgeEncoding {
    /// Typed edge for this encoding, if it has one
    #[must_use]
    pub fn typed_edge(&self) -> Option<TypedEdge> {
        match self {
            Self::Legacy(from, to) => Some(TypedEdge::dependency(from, to)),
            Self::Typed(edge) => Some(edge.clone()),
            Self::Unrecognized(_) => None,
        }
    }

    /// `(from, to)` identity of the edge
    ///
    /// Also recovers endpoints from a record whose other fields are
    /// unreadable, so structural checks can still count it.
    #[must_use]
    pub fn endpoints(&self) -> Option<(&str, &str)> {
        match self {
            Self::Legacy(from, to) => Some((from, to)),
            Self::Typed(edge) => Some(edge.endpoints()),
            Self::Unrecognized(value) => {
                let from = value.get("from_node")?.as_str()?;
                let to = value.get("to_node")?.as_str()?;
                Some((from, to))
            }
        }
    }
}

impl From<TypedEdge> for EdgeEncoding {
    fn from(edge: TypedEdge) -> Self {
        Self::Typed(edge)
    }
}

/// Payload of a `Composition` object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionPayload {
    /// Title
    pub title: Option<String>,
    /// Jurisdiction
    pub jurisdiction: Option<String>,
    /// Module ids
    pub modules: Vec<String>,
    /// Edges
    pub edges: Vec<EdgeEncoding>,
    /// Attached `SymbolicScaffold` ids
    pub symbolic_scaffolds: Vec<String>,
    /// Attached `OverrideProtocol` ids
    pub override_protocols: Vec<String>,
    /// Attached `FeedbackLoop` ids
    pub feedback_loops: Vec<String>,
    /// Attached `FailureEvent` ids
    pub failure_events: Vec<String>,
    /// Creator
    pub created_by: Option<String>,
}

impl CompositionPayload {
    /// Read the payload of a composition object
    ///
    /// A payload nested one level deeper under `data` is accepted.
    ///
    /// # Errors
    /// Returns [`ComposeError::NotAComposition`] for other object types and
    /// [`ComposeError::MalformedPayload`] if the payload does not parse
    pub fn from_object(object: &GovernanceObject) -> Result<Self, ComposeError> {
        if !object.is(&ObjectType::Composition) {
            return Err(ComposeError::NotAComposition {
                id: object.id.clone(),
                actual: object.object_type.to_string(),
            });
        }

        let data = match object.data.get("data") {
            Some(Value::Object(inner)) if !object.data.contains_key("modules") => inner.clone(),
            _ => object.data.clone(),
        };
        serde_json::from_value(Value::Object(data)).map_err(|source| {
            ComposeError::MalformedPayload {
                id: object.id.clone(),
                source,
            }
        })
    }

    /// Encode as a `data` map
    ///
    /// # Errors
    /// Returns [`ComposeError::Encode`] if serialization fails
    pub fn to_data(&self) -> Result<Map<String, Value>, ComposeError> {
        match serde_json::to_value(self).map_err(ComposeError::Encode)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    /// Every linked semantic/control id, in field order
    pub fn linked_ids(&self) -> impl Iterator<Item = &str> {
        self.symbolic_scaffolds
            .iter()
            .chain(&self.override_protocols)
            .chain(&self.feedback_loops)
            .chain(&self.failure_events)
            .map(String::as_str)
    }
}
