//! Graph Validator
//!
//! Structural checks on a built graph:
//!
//! 1. acyclicity (Kahn's algorithm)
//! 2. isolated nodes must be flagged `optional`
//! 3. at least one node with in-degree 0
//! 4. at least one node with out-degree 0
//!
//! A cycle is reported alone. Otherwise checks 2 to 4 all run and every
//! violation is returned together.

use crate::error::{StructuralViolation, ValidationError};
use crate::graph::CompositionGraph;
use crate::module::ModuleSet;

/// A composition graph that passed structural validation
///
/// Sealed: only [`GraphValidator::validate`] constructs one.
#[derive(Debug, Clone)]
pub struct ValidatedGraph {
    graph: CompositionGraph,
    order: Vec<String>,
}

impl ValidatedGraph {
    /// The validated graph
    #[inline]
    #[must_use]
    pub fn graph(&self) -> &CompositionGraph {
        &self.graph
    }

    /// Topological order computed during validation
    #[inline]
    #[must_use]
    pub fn topological_order(&self) -> &[String] {
        &self.order
    }

    /// Release the graph
    #[must_use]
    pub fn into_graph(self) -> CompositionGraph {
        self.graph
    }
}

/// Stateless structural validator
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphValidator;

impl GraphValidator {
    /// Validate a graph against the module set's optional flags
    ///
    /// Nodes not present in `modules` count as non-optional.
    ///
    /// # Errors
    /// Returns [`ValidationError`] listing every violation found
    pub fn validate(
        graph: CompositionGraph,
        modules: &ModuleSet,
    ) -> Result<ValidatedGraph, ValidationError> {
        let order = match graph.topological_order() {
            Ok(order) => order,
            Err(cycle) => {
                tracing::warn!(unresolved = ?cycle.unresolved, "composition graph contains cycles");
                return Err(StructuralViolation::CycleDetected.into());
            }
        };

        if let Some(err) = ValidationError::new(Self::structural_violations(&graph, modules)) {
            return Err(err);
        }

        tracing::debug!(nodes = graph.node_count(), "composition graph validated");
        Ok(ValidatedGraph { graph, order })
    }

    /// Checks 2 to 4, without the acyclicity check
    #[must_use]
    pub fn structural_violations(
        graph: &CompositionGraph,
        modules: &ModuleSet,
    ) -> Vec<StructuralViolation> {
        let mut violations: Vec<StructuralViolation> = graph
            .isolates()
            .into_iter()
            .filter(|id| !modules.is_optional(id))
            .map(|id| StructuralViolation::DisconnectedModule(id.to_string()))
            .collect();

        if graph.entry_nodes().is_empty() {
            violations.push(StructuralViolation::MissingStartNode);
        }
        if graph.exit_nodes().is_empty() {
            violations.push(StructuralViolation::MissingTerminalNode);
        }
        violations
    }
}
