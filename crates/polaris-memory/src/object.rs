//! Governance object model
//!
//! Every domain record (permitting modules, scaffolds, override protocols,
//! feedback loops, failure events, compositions) travels as a
//! [`GovernanceObject`] envelope with a type-specific `data` payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Discriminator for governance objects
///
/// The known variants are the ones the engine reasons about; anything else
/// is carried through as [`ObjectType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ObjectType {
    /// A single step of a permitting workflow
    PermittingModule,
    /// Symbolic meaning attached to a module
    SymbolicScaffold,
    /// Rule allowing a module to be overridden
    OverrideProtocol,
    /// Rework loop triggered by a module
    FeedbackLoop,
    /// Recorded historical failure of a module
    FailureEvent,
    /// Exported workflow DAG
    Composition,
    /// Any other record type
    Other(String),
}

impl ObjectType {
    /// Wire name of this type
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::PermittingModule => "PermittingModule",
            Self::SymbolicScaffold => "SymbolicScaffold",
            Self::OverrideProtocol => "OverrideProtocol",
            Self::FeedbackLoop => "FeedbackLoop",
            Self::FailureEvent => "FailureEvent",
            Self::Composition => "Composition",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for ObjectType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PermittingModule" => Self::PermittingModule,
            "SymbolicScaffold" => Self::SymbolicScaffold,
            "OverrideProtocol" => Self::OverrideProtocol,
            "FeedbackLoop" => Self::FeedbackLoop,
            "FailureEvent" => Self::FailureEvent,
            "Composition" => Self::Composition,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for ObjectType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ObjectType> for String {
    fn from(value: ObjectType) -> Self {
        match value {
            ObjectType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generic typed, tagged, versioned record
///
/// `previous_version` is a back-reference only. Tags have set semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceObject {
    /// Stable unique id
    pub id: String,
    /// Type discriminator
    pub object_type: ObjectType,
    /// Owning jurisdiction
    #[serde(default)]
    pub jurisdiction: Option<String>,
    /// Jurisdiction version (e.g. `v1`)
    #[serde(default)]
    pub version: Option<String>,
    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_on: DateTime<Utc>,
    /// Creator
    #[serde(default)]
    pub created_by: Option<String>,
    /// Id of the object this one was cloned from
    #[serde(default)]
    pub previous_version: Option<String>,
    /// Free-form tags
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Type-specific payload
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl GovernanceObject {
    /// Create an object with an empty payload
    #[must_use]
    pub fn new(id: impl Into<String>, object_type: ObjectType) -> Self {
        Self {
            id: id.into(),
            object_type,
            jurisdiction: None,
            version: None,
            created_on: Utc::now(),
            created_by: None,
            previous_version: None,
            tags: BTreeSet::new(),
            data: Map::new(),
        }
    }

    /// With jurisdiction
    #[inline]
    #[must_use]
    pub fn with_jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.jurisdiction = Some(jurisdiction.into());
        self
    }

    /// With version
    #[inline]
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// With creator
    #[inline]
    #[must_use]
    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    /// With payload
    #[inline]
    #[must_use]
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// With a single payload field
    #[inline]
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Add a tag; returns false if already present
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        self.tags.insert(tag.into())
    }

    /// Remove a tag; returns false if absent
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Payload field as a string
    #[must_use]
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Whether this object's type matches
    #[inline]
    #[must_use]
    pub fn is(&self, object_type: &ObjectType) -> bool {
        &self.object_type == object_type
    }

    /// Clone into a new version with new payload
    ///
    /// The clone gets a fresh id, points back at this object through
    /// `previous_version`, and keeps type, jurisdiction, version and tags.
    #[must_use]
    pub fn clone_into_new_version(
        &self,
        data: Map<String, Value>,
        created_by: Option<String>,
    ) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self {
            id: format!("{}:{}", self.object_type, &suffix[..8]),
            object_type: self.object_type.clone(),
            jurisdiction: self.jurisdiction.clone(),
            version: self.version.clone(),
            created_on: Utc::now(),
            created_by,
            previous_version: Some(self.id.clone()),
            tags: self.tags.clone(),
            data,
        }
    }
}
