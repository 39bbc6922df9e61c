//! Error types for the composition engine
//!
//! Fatal conditions only. Advisory conditions go to
//! [`Diagnostics`](crate::Diagnostics) and never abort a stage.

use std::fmt;
use std::path::PathBuf;

/// Main composition error type
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// Temporal constraint document is not valid JSON
    #[error("temporal constraints are not valid json: {0}")]
    ConstraintParse(#[source] serde_json::Error),

    /// IO error reading an input document
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structural validation failed
    #[error("graph validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Object handed to the loader is not a composition
    #[error("object {id} is a {actual}, expected a Composition")]
    NotAComposition { id: String, actual: String },

    /// Composition payload cannot be read
    #[error("composition {id} has an unreadable payload: {source}")]
    MalformedPayload {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Composition payload cannot be encoded
    #[error("composition payload could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ComposeError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is a structural validation failure
    #[inline]
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// A single structural rule broken by a composition graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum StructuralViolation {
    /// The graph admits no topological order
    #[error("composition graph contains cycles")]
    CycleDetected,

    /// Isolated module not flagged optional
    #[error("disconnected non-optional module: {0}")]
    DisconnectedModule(String),

    /// No node with in-degree 0
    #[error("graph must have at least one start node")]
    MissingStartNode,

    /// No node with out-degree 0
    #[error("graph must have at least one terminal node")]
    MissingTerminalNode,
}

/// Every structural violation found in one validation pass
///
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<StructuralViolation>,
}

impl ValidationError {
    /// Wrap a non-empty list of violations
    #[must_use]
    pub fn new(violations: Vec<StructuralViolation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self { violations })
        }
    }

    /// All violations, in check order
    #[inline]
    #[must_use]
    pub fn violations(&self) -> &[StructuralViolation] {
        &self.violations
    }

    /// Whether a specific violation was found
    #[inline]
    #[must_use]
    pub fn contains(&self, violation: &StructuralViolation) -> bool {
        self.violations.contains(violation)
    }

    /// Whether the graph was rejected for a cycle
    #[inline]
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        self.contains(&StructuralViolation::CycleDetected)
    }
}

impl From<StructuralViolation> for ValidationError {
    fn from(violation: StructuralViolation) -> Self {
        Self {
            violations: vec![violation],
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
