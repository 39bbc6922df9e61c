//! End-to-end composition pipeline
//!
//! Loader, constraint parse, Builder, Validator and Exporter chained as pure
//! stages. Nothing is saved; the caller decides what to do with the result.

use crate::constraint::{parse_constraints, TemporalConstraint};
use crate::construction::{GraphBuilder, GraphValidator, ValidatedGraph};
use crate::diagnostics::Diagnostics;
use crate::edge::TypedEdge;
use crate::error::ComposeError;
use crate::export::{CompositionExporter, ExportRequest};
use crate::module::{load_modules, ModuleSet, DEFAULT_VERSION};
use polaris_memory::{GovernanceObject, ObjectStore};

const DEFAULT_CREATOR: &str = "system:compose";

/// Inputs of one composition run
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    /// Jurisdiction to select modules from
    pub jurisdiction: String,
    /// Module version to select
    pub version: String,
    /// Composition title
    pub title: String,
    /// Creator recorded on the composition
    pub created_by: String,
    /// Temporal constraints
    pub constraints: Vec<TemporalConstraint>,
    /// Extra typed edges from composition tooling
    pub edges: Vec<TypedEdge>,
}

impl ComposeRequest {
    /// Request for a jurisdiction and title, version `v1`
    #[must_use]
    pub fn new(jurisdiction: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            jurisdiction: jurisdiction.into(),
            version: DEFAULT_VERSION.to_string(),
            title: title.into(),
            created_by: DEFAULT_CREATOR.to_string(),
            constraints: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// With module version
    #[inline]
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// With creator
    #[inline]
    #[must_use]
    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = created_by.into();
        self
    }

    /// With parsed temporal constraints
    #[inline]
    #[must_use]
    pub fn with_constraints(mut self, constraints: Vec<TemporalConstraint>) -> Self {
        self.constraints = constraints;
        self
    }

    /// With temporal constraints parsed from a JSON document
    ///
    /// # Errors
    /// Returns [`ComposeError::ConstraintParse`] if the document is invalid
    pub fn with_constraints_json(self, text: &str) -> Result<Self, ComposeError> {
        Ok(self.with_constraints(parse_constraints(text)?))
    }

    /// With extra typed edges
    #[inline]
    #[must_use]
    pub fn with_edges(mut self, edges: Vec<TypedEdge>) -> Self {
        self.edges = edges;
        self
    }
}

/// Result of a successful composition run
#[derive(Debug, Clone)]
pub struct ComposeOutcome {
    /// Exported composition, not yet saved
    pub composition: GovernanceObject,
    /// Graph that passed validation
    pub validated: ValidatedGraph,
    /// Modules the graph was built from
    pub modules: ModuleSet,
    /// Advisory diagnostics from every stage
    pub diagnostics: Diagnostics,
}

/// Run the full composition pipeline
///
/// # Errors
/// Returns [`ComposeError::Validation`] if the built graph is structurally
/// unsound, or [`ComposeError::Encode`] if export fails
pub fn compose(store: &dyn ObjectStore, request: &ComposeRequest) -> Result<ComposeOutcome, ComposeError> {
    let modules = load_modules(store, &request.jurisdiction, &request.version);

    let built = GraphBuilder::new(&modules)
        .with_constraints(request.constraints.clone())
        .with_edges(request.edges.clone())
        .build();
    let diagnostics = built.diagnostics;

    let validated = GraphValidator::validate(built.graph, &modules)?;

    let composition = CompositionExporter::new(store).export(
        &validated,
        &ExportRequest {
            title: request.title.clone(),
            created_by: request.created_by.clone(),
            jurisdiction: request.jurisdiction.clone(),
        },
    )?;

    Ok(ComposeOutcome {
        composition,
        validated,
        modules,
        diagnostics,
    })
}
