//! Typed edge model
//!
//! A [`TypedEdge`] is the single relation between two module ids. Its
//! [`EdgeKind`] is a closed sum type: each variant carries only the fields
//! meaningful for that edge type. On the wire an edge is one flat record
//! (`from_node`, `to_node`, `type`, `label`, `tags`, plus every optional
//! field); fields that do not belong to the active type are kept aside and
//! written back unchanged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Edge type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Module depends on another module's output
    Dependency,
    /// Scheduling relation between modules
    Temporal,
    /// Edge taken only under a condition
    Conditional,
    /// Edge created by an override protocol
    Override,
    /// Shared semantic tag between modules
    SemanticLink,
    /// Transition requires a specific actor
    ActorConstraint,
    /// Rework loop back-reference
    FeedbackLoop,
}

impl EdgeType {
    /// All edge types
    pub const ALL: [EdgeType; 7] = [
        Self::Dependency,
        Self::Temporal,
        Self::Conditional,
        Self::Override,
        Self::SemanticLink,
        Self::ActorConstraint,
        Self::FeedbackLoop,
    ];

    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dependency => "dependency",
            Self::Temporal => "temporal",
            Self::Conditional => "conditional",
            Self::Override => "override",
            Self::SemanticLink => "semantic_link",
            Self::ActorConstraint => "actor_constraint",
            Self::FeedbackLoop => "feedback_loop",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relation carried by a temporal edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalRelation {
    /// Source must finish before target starts
    MustFinishBefore,
    /// Target must happen within a number of days
    WithinDays,
    /// Target may not start earlier than a date
    NoEarlierThan,
}

/// Type-specific payload of an edge
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeKind {
    /// `dependency`
    Dependency,
    /// `temporal`
    Temporal {
        /// Scheduling relation
        relation: Option<TemporalRelation>,
        /// Why the relation holds
        rationale: Option<String>,
    },
    /// `conditional`
    Conditional {
        /// Condition under which the edge is taken
        condition: Option<String>,
    },
    /// `override`
    Override {
        /// Override protocol id
        override_id: Option<String>,
        /// When the override fires
        trigger_condition: Option<String>,
        /// What the override does (e.g. `skip_step`)
        override_action: Option<String>,
    },
    /// `semantic_link`
    SemanticLink {
        /// Shared tag, e.g. `#Permit`
        tag: Option<String>,
    },
    /// `actor_constraint`
    ActorConstraint {
        /// Actor required for the transition
        required_actor: Option<String>,
    },
    /// `feedback_loop`
    FeedbackLoop,
}

impl EdgeKind {
    /// Discriminator of this kind
    #[must_use]
    pub fn edge_type(&self) -> EdgeType {
        match self {
            Self::Dependency => EdgeType::Dependency,
            Self::Temporal { .. } => EdgeType::Temporal,
            Self::Conditional { .. } => EdgeType::Conditional,
            Self::Override { .. } => EdgeType::Override,
            Self::SemanticLink { .. } => EdgeType::SemanticLink,
            Self::ActorConstraint { .. } => EdgeType::ActorConstraint,
            Self::FeedbackLoop => EdgeType::FeedbackLoop,
        }
    }
}

/// Provenance of an edge, valid for any edge type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Provenance {
    /// Tool or agent that produced the edge
    pub generated_by: Option<String>,
    /// Producer's confidence
    pub confidence: Option<f64>,
}

/// Directed typed relation between two modules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EdgeRecord", into = "EdgeRecord")]
pub struct TypedEdge {
    /// Source module id
    pub from_node: String,
    /// Target module id
    pub to_node: String,
    /// Free-text label
    pub label: Option<String>,
    /// Free-form tags
    pub tags: BTreeSet<String>,
    /// Type and type-specific fields
    pub kind: EdgeKind,
    /// Provenance
    pub provenance: Provenance,
    dormant: VariantFields,
}

impl TypedEdge {
    /// Create an edge of a given kind
    #[must_use]
    pub fn new(from_node: impl Into<String>, to_node: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            from_node: from_node.into(),
            to_node: to_node.into(),
            label: None,
            tags: BTreeSet::new(),
            kind,
            provenance: Provenance::default(),
            dormant: VariantFields::default(),
        }
    }

    /// Plain dependency edge
    #[inline]
    #[must_use]
    pub fn dependency(from_node: impl Into<String>, to_node: impl Into<String>) -> Self {
        Self::new(from_node, to_node, EdgeKind::Dependency)
    }

    /// Temporal edge with a relation
    #[inline]
    #[must_use]
    pub fn temporal(
        from_node: impl Into<String>,
        to_node: impl Into<String>,
        relation: TemporalRelation,
    ) -> Self {
        Self::new(
            from_node,
            to_node,
            EdgeKind::Temporal {
                relation: Some(relation),
                rationale: None,
            },
        )
    }

    /// With label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// With an extra tag
    #[inline]
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// With provenance
    #[inline]
    #[must_use]
    pub fn with_provenance(mut self, generated_by: impl Into<String>, confidence: f64) -> Self {
        self.provenance = Provenance {
            generated_by: Some(generated_by.into()),
            confidence: Some(confidence),
        };
        self
    }

    /// Discriminator of this edge
    #[inline]
    #[must_use]
    pub fn edge_type(&self) -> EdgeType {
        self.kind.edge_type()
    }

    /// `(from, to)` pair
    #[inline]
    #[must_use]
    pub fn endpoints(&self) -> (&str, &str) {
        (&self.from_node, &self.to_node)
    }

    /// `override_action` of an override edge
    #[must_use]
    pub fn override_action(&self) -> Option<&str> {
        match &self.kind {
            EdgeKind::Override {
                override_action, ..
            } => override_action.as_deref(),
            _ => None,
        }
    }

    /// Whether fields outside the active type are being carried
    #[must_use]
    pub fn has_dormant_fields(&self) -> bool {
        self.dormant != VariantFields::default()
    }
}

/// Every type-specific field of the flat wire record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct VariantFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    relation: Option<TemporalRelation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rationale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    override_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trigger_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    override_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    required_actor: Option<String>,
}

/// Flat wire shape of a typed edge
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EdgeRecord {
    from_node: String,
    to_node: String,
    #[serde(rename = "type")]
    edge_type: EdgeType,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    tags: Option<BTreeSet<String>>,
    #[serde(flatten)]
    fields: VariantFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
}

impl From<EdgeRecord> for TypedEdge {
    fn from(record: EdgeRecord) -> Self {
        let mut fields = record.fields;
        let kind = match record.edge_type {
            EdgeType::Dependency => EdgeKind::Dependency,
            EdgeType::Temporal => EdgeKind::Temporal {
                relation: fields.relation.take(),
                rationale: fields.rationale.take(),
            },
            EdgeType::Conditional => EdgeKind::Conditional {
                condition: fields.condition.take(),
            },
            EdgeType::Override => EdgeKind::Override {
                override_id: fields.override_id.take(),
                trigger_condition: fields.trigger_condition.take(),
                override_action: fields.override_action.take(),
            },
            EdgeType::SemanticLink => EdgeKind::SemanticLink {
                tag: fields.tag.take(),
            },
            EdgeType::ActorConstraint => EdgeKind::ActorConstraint {
                required_actor: fields.required_actor.take(),
            },
            EdgeType::FeedbackLoop => EdgeKind::FeedbackLoop,
        };

        Self {
            from_node: record.from_node,
            to_node: record.to_node,
            label: record.label,
            tags: record.tags.unwrap_or_default(),
            kind,
            provenance: Provenance {
                generated_by: record.generated_by,
                confidence: record.confidence,
            },
            dormant: fields,
        }
    }
}

impl From<TypedEdge> for EdgeRecord {
    fn from(edge: TypedEdge) -> Self {
        let edge_type = edge.edge_type();
        let mut fields = edge.dormant;
        match edge.kind {
            EdgeKind::Dependency | EdgeKind::FeedbackLoop => {}
            EdgeKind::Temporal {
                relation,
                rationale,
            } => {
                fields.relation = relation;
                fields.rationale = rationale;
            }
            EdgeKind::Conditional { condition } => fields.condition = condition,
            EdgeKind::Override {
                override_id,
                trigger_condition,
                override_action,
            } => {
                fields.override_id = override_id;
                fields.trigger_condition = trigger_condition;
                fields.override_action = override_action;
            }
            EdgeKind::SemanticLink { tag } => fields.tag = tag,
            EdgeKind::ActorConstraint { required_actor } => fields.required_actor = required_actor,
        }

        Self {
            from_node: edge.from_node,
            to_node: edge.to_node,
            edge_type,
            label: edge.label,
            tags: Some(edge.tags),
            fields,
            generated_by: edge.provenance.generated_by,
            confidence: edge.provenance.confidence,
        }
    }
}
