//! Graph Builder
//!
//! Assembles a [`CompositionGraph`] from a loaded [`ModuleSet`]:
//!
//! 1. one node per module, in load order
//! 2. `dependency` edges from each declared dependency to its module
//! 3. `temporal` edges from `must_finish_before` constraints
//! 4. caller-supplied typed edges
//!
//! References to modules outside the set are dropped with a diagnostic.
//! Re-inserting an existing `(from, to)` pair replaces its metadata.

use crate::constraint::{check_shape, TemporalConstraint};
use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::edge::{TemporalRelation, TypedEdge};
use crate::graph::CompositionGraph;
use crate::module::ModuleSet;

/// Builder output: the graph plus everything dropped along the way
#[derive(Debug, Clone)]
pub struct BuiltGraph {
    /// Constructed graph
    pub graph: CompositionGraph,
    /// Advisory diagnostics
    pub diagnostics: Diagnostics,
}

/// Consuming builder for composition graphs
///
/// ```rust,ignore
/// let built = GraphBuilder::new(&modules)
///     .with_constraints(constraints)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct GraphBuilder<'a> {
    modules: &'a ModuleSet,
    constraints: Vec<TemporalConstraint>,
    edges: Vec<TypedEdge>,
}

impl<'a> GraphBuilder<'a> {
    /// Start from a loaded module set
    #[must_use]
    pub fn new(modules: &'a ModuleSet) -> Self {
        Self {
            modules,
            constraints: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// With temporal constraints
    #[inline]
    #[must_use]
    pub fn with_constraints(mut self, constraints: Vec<TemporalConstraint>) -> Self {
        self.constraints = constraints;
        self
    }

    /// With explicit typed edges, inserted after constraint edges
    #[inline]
    #[must_use]
    pub fn with_edges(mut self, edges: Vec<TypedEdge>) -> Self {
        self.edges = edges;
        self
    }

    /// Build the graph
    #[must_use]
    pub fn build(self) -> BuiltGraph {
        let mut graph = CompositionGraph::new();
        let mut diagnostics = Diagnostics::new();

        for id in self.modules.ids() {
            graph.add_node(id);
        }

        for module in self.modules.iter() {
            for dep in &module.dependencies {
                if self.modules.contains(dep) {
                    insert(&mut graph, TypedEdge::dependency(dep, &module.id), &mut diagnostics);
                } else {
                    diagnostics.record(
                        Diagnostic::warning(
                            DiagnosticCode::UnresolvedDependency,
                            format!("dependency {dep} not found for {}", module.id),
                        )
                        .with_context("module", &module.id)
                        .with_context("dependency", dep),
                    );
                }
            }
        }

        check_shape(&self.constraints, &mut diagnostics);
        for (src, tgt) in self.constraints.iter().filter_map(TemporalConstraint::ordering) {
            if self.modules.contains(src) && self.modules.contains(tgt) {
                let edge = TypedEdge::temporal(src, tgt, TemporalRelation::MustFinishBefore);
                insert(&mut graph, edge, &mut diagnostics);
            } else {
                diagnostics.record(
                    Diagnostic::warning(
                        DiagnosticCode::UnresolvedConstraintEndpoint,
                        format!("constraint skipped: {src} -> {tgt} (missing)"),
                    )
                    .with_context("from", src)
                    .with_context("to", tgt),
                );
            }
        }

        for edge in self.edges {
            let (from, to) = edge.endpoints();
            if self.modules.contains(from) && self.modules.contains(to) {
                insert(&mut graph, edge, &mut diagnostics);
            } else {
                diagnostics.record(
                    Diagnostic::warning(
                        DiagnosticCode::UnresolvedEdgeEndpoint,
                        format!("{} edge {from} -> {to} names an unloaded module", edge.edge_type()),
                    )
                    .with_context("from", from)
                    .with_context("to", to),
                );
            }
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            dropped = diagnostics.len(),
            "composition graph built"
        );
        BuiltGraph { graph, diagnostics }
    }
}

fn insert(graph: &mut CompositionGraph, edge: TypedEdge, diagnostics: &mut Diagnostics) {
    let replacement = edge.edge_type();
    if let Some(previous) = graph.add_edge(edge) {
        let (from, to) = previous.endpoints();
        diagnostics.record(
            Diagnostic::info(
                DiagnosticCode::DuplicateEdgeOverwritten,
                format!(
                    "edge {from} -> {to} re-inserted, {} metadata replaced by {replacement}",
                    previous.edge_type()
                ),
            )
            .with_context("from", from)
            .with_context("to", to),
        );
    }
}
