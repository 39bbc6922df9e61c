//! Simulation input graph
//!
//! Nodes are the composition's modules that still resolve to permitting
//! modules in the store. The traversal order is fixed once, at construction.

use crate::error::SimulationError;
use polaris_compose::{
    readable_edges, CompositionGraph, CompositionPayload, Diagnostic, DiagnosticCode, Diagnostics,
    TypedEdge,
};
use polaris_memory::{GovernanceObject, ObjectStore, ObjectType};

/// Immutable graph shared by every simulation run
#[derive(Debug, Clone)]
pub struct SimulationGraph {
    order: Vec<String>,
    edge_count: usize,
    diagnostics: Diagnostics,
}

impl SimulationGraph {
    /// Graph over the given modules; edges touching other nodes are dropped
    ///
    /// # Errors
    /// Returns [`SimulationError::Cycle`] if the graph has no topological order
    pub fn new(modules: &[String], edges: Vec<TypedEdge>) -> Result<Self, SimulationError> {
        Self::assemble(modules, edges, Diagnostics::new())
    }

    /// Build from a persisted composition
    ///
    /// Modules that are absent from the store, or are not permitting
    /// modules, are dropped with a diagnostic.
    ///
    /// # Errors
    /// Returns [`SimulationError::NoValidModules`] if nothing remains,
    /// [`SimulationError::Cycle`] for a cyclic graph, or
    /// [`SimulationError::Compose`] if the payload cannot be read
    pub fn from_composition(
        composition: &GovernanceObject,
        store: &dyn ObjectStore,
    ) -> Result<Self, SimulationError> {
        let payload = CompositionPayload::from_object(composition)?;
        let mut diagnostics = Diagnostics::new();

        let mut modules = Vec::with_capacity(payload.modules.len());
        for id in &payload.modules {
            let is_module = store
                .get_by_id(id)
                .is_some_and(|obj| obj.is(&ObjectType::PermittingModule));
            if is_module {
                modules.push(id.clone());
            } else {
                diagnostics.record(
                    Diagnostic::warning(
                        DiagnosticCode::ModuleNotInStore,
                        format!("module {id} is missing or not a permitting module"),
                    )
                    .with_context("module", id),
                );
            }
        }

        if modules.is_empty() {
            return Err(SimulationError::NoValidModules {
                composition: composition.id.clone(),
            });
        }

        let edges = readable_edges(&payload.edges, &mut diagnostics);
        Self::assemble(&modules, edges, diagnostics)
    }

    fn assemble(
        modules: &[String],
        edges: Vec<TypedEdge>,
        mut diagnostics: Diagnostics,
    ) -> Result<Self, SimulationError> {
        let mut graph = CompositionGraph::new();
        for id in modules {
            graph.add_node(id.as_str());
        }
        for edge in edges {
            let (from, to) = edge.endpoints();
            if graph.contains_node(from) && graph.contains_node(to) {
                graph.add_edge(edge);
            } else {
                diagnostics.record(
                    Diagnostic::warning(
                        DiagnosticCode::EdgeOutsideModules,
                        format!("edge {from} -> {to} touches a module outside the simulation"),
                    )
                    .with_context("from", from)
                    .with_context("to", to),
                );
            }
        }

        let order = graph
            .topological_order()
            .map_err(|cycle| SimulationError::Cycle {
                unresolved: cycle.unresolved,
            })?;

        Ok(Self {
            order,
            edge_count: graph.edge_count(),
            diagnostics,
        })
    }

    /// Modules in traversal order
    #[inline]
    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Number of modules
    #[inline]
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.order.len()
    }

    /// Number of kept edges
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// What was dropped while building
    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}
