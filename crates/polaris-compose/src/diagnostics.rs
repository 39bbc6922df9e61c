//! Structured diagnostics sink
//!
//! Stages record advisory conditions here instead of failing. Each record is
//! machine-inspectable (`level`, `code`) and is mirrored to `tracing`. Fatal
//! conditions never land here; they are the stage's typed error.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticLevel {
    /// Informational, nothing dropped
    Info,
    /// Something was dropped or skipped
    Warning,
}

/// Closed set of diagnostic conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// Module dependency names a module outside the loaded set
    UnresolvedDependency,
    /// Temporal constraint endpoint outside the loaded set
    UnresolvedConstraintEndpoint,
    /// Temporal constraint record has the wrong shape
    MalformedConstraint,
    /// Supplied typed edge names a node outside the loaded set
    UnresolvedEdgeEndpoint,
    /// Persisted edge is neither a pair nor a typed record
    UnrecognizedEdgeShape,
    /// Composition module id no longer resolves in the store
    UnresolvedModule,
    /// Linked semantic/control object id no longer resolves
    UnresolvedLink,
    /// Module absent from the store or not a permitting module
    ModuleNotInStore,
    /// Edge touches a module outside the working set
    EdgeOutsideModules,
    /// Edge metadata replaced by a later insertion of the same pair
    DuplicateEdgeOverwritten,
}

impl DiagnosticCode {
    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnresolvedDependency => "unresolved_dependency",
            Self::UnresolvedConstraintEndpoint => "unresolved_constraint_endpoint",
            Self::MalformedConstraint => "malformed_constraint",
            Self::UnresolvedEdgeEndpoint => "unresolved_edge_endpoint",
            Self::UnrecognizedEdgeShape => "unrecognized_edge_shape",
            Self::UnresolvedModule => "unresolved_module",
            Self::UnresolvedLink => "unresolved_link",
            Self::ModuleNotInStore => "module_not_in_store",
            Self::EdgeOutsideModules => "edge_outside_modules",
            Self::DuplicateEdgeOverwritten => "duplicate_edge_overwritten",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One diagnostic record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity
    pub level: DiagnosticLevel,
    /// Condition
    pub code: DiagnosticCode,
    /// Human-readable message
    pub message: String,
    /// Key-value context (ids involved)
    pub context: BTreeMap<String, String>,
}

impl Diagnostic {
    /// Create a diagnostic
    #[must_use]
    pub fn new(level: DiagnosticLevel, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            level,
            code,
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    /// Info-level diagnostic
    #[inline]
    #[must_use]
    pub fn info(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, code, message)
    }

    /// Warning-level diagnostic
    #[inline]
    #[must_use]
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warning, code, message)
    }

    /// Add a context entry
    #[inline]
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Ordered collection of diagnostics produced by a stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create empty sink
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and mirror it to `tracing`
    pub fn record(&mut self, diagnostic: Diagnostic) {
        let code = diagnostic.code.as_str();
        match diagnostic.level {
            DiagnosticLevel::Info => {
                tracing::info!(code, context = ?diagnostic.context, "{}", diagnostic.message);
            }
            DiagnosticLevel::Warning => {
                tracing::warn!(code, context = ?diagnostic.context, "{}", diagnostic.message);
            }
        }
        self.entries.push(diagnostic);
    }

    /// Append another stage's diagnostics
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Iterate in record order
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Diagnostics with a given code
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.code == code)
    }

    /// Whether any diagnostic has this code
    #[must_use]
    pub fn has(&self, code: DiagnosticCode) -> bool {
        self.with_code(code).next().is_some()
    }

    /// Number of diagnostics
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume into the underlying records
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
