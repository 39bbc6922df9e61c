//! Interpretation of a persisted composition
//!
//! An advisory pass, separate from the exporter's strict validator: cycles
//! and missing entry/exit nodes are errors, disconnected modules are only
//! warnings, so a composition can be "usable with caveats".

use crate::tags::{fragile_paths, tag_modules, ModuleTags, SemanticTag};
use polaris_compose::{ComposeError, CompositionGraph, CompositionPayload, TypedEdge};
use polaris_memory::{GovernanceObject, ObjectStore};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Hard structural problem found by interpretation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterpretationIssue {
    /// No topological order exists
    #[error("Graph contains cycles.")]
    Cycle,
    /// No node with in-degree 0
    #[error("No start node found (no node with in-degree 0).")]
    NoStartNode,
    /// No node with out-degree 0
    #[error("No terminal node found (no node with out-degree 0).")]
    NoTerminalNode,
}

/// Soft problem found by interpretation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterpretationWarning {
    /// Isolated module that is not flagged optional
    #[error("Disconnected module (not marked optional): {0}")]
    Disconnected(String),
}

impl Serialize for InterpretationIssue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Serialize for InterpretationWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Counts and highlights of an interpretation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterpretationSummary {
    /// Modules listed by the composition
    pub module_count: usize,
    /// Edges with readable endpoints
    pub edge_count: usize,
    /// Modules tagged symbolic
    pub symbolic_modules: Vec<String>,
    /// Fragile `(from, to)` edges
    pub fragile_paths: Vec<(String, String)>,
    /// Isolated nodes, optional or not
    pub disconnected_modules: Vec<String>,
}

/// Interpretation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interpretation {
    /// No hard errors were found
    pub valid: bool,
    /// Hard errors
    pub errors: Vec<InterpretationIssue>,
    /// Advisory warnings
    pub warnings: Vec<InterpretationWarning>,
    /// Summary figures
    pub summary: InterpretationSummary,
    /// Semantic tags per module
    pub tags: ModuleTags,
}

/// Interpret a composition against the store
///
/// Only node and edge identity is used; legacy pairs and typed records both
/// count as edges.
///
/// # Errors
/// Returns [`ComposeError`] if the object is not a readable composition
pub fn interpret(
    composition: &GovernanceObject,
    store: &dyn ObjectStore,
) -> Result<Interpretation, ComposeError> {
    let payload = CompositionPayload::from_object(composition)?;
    let pairs: Vec<(&str, &str)> = payload
        .edges
        .iter()
        .filter_map(|encoding| encoding.endpoints())
        .collect();
    let graph = identity_graph(&payload.modules, &pairs);

    let errors = structural_errors(&graph);

    let disconnected: Vec<String> = graph.isolates().into_iter().map(str::to_string).collect();
    let warnings = disconnected
        .iter()
        .filter(|id| !is_optional_in_store(store, id))
        .map(|id| InterpretationWarning::Disconnected(id.clone()))
        .collect();

    let tags = tag_modules(payload.modules.iter().map(String::as_str), store);
    let fragile = fragile_paths(&graph, &tags);
    let symbolic_modules = tags
        .iter()
        .filter(|(_, t)| t.contains(&SemanticTag::Symbolic))
        .map(|(id, _)| id.clone())
        .collect();

    let interpretation = Interpretation {
        valid: errors.is_empty(),
        errors,
        warnings,
        summary: InterpretationSummary {
            module_count: payload.modules.len(),
            edge_count: pairs.len(),
            symbolic_modules,
            fragile_paths: fragile,
            disconnected_modules: disconnected,
        },
        tags,
    };

    tracing::info!(
        id = %composition.id,
        valid = interpretation.valid,
        errors = interpretation.errors.len(),
        warnings = interpretation.warnings.len(),
        "composition interpreted"
    );
    Ok(interpretation)
}

/// Graph over module ids plus edge endpoints, carrying no edge metadata
pub(crate) fn identity_graph(modules: &[String], pairs: &[(&str, &str)]) -> CompositionGraph {
    let mut graph = CompositionGraph::new();
    for id in modules {
        graph.add_node(id.as_str());
    }
    for (from, to) in pairs {
        graph.add_edge(TypedEdge::dependency(*from, *to));
    }
    graph
}

fn structural_errors(graph: &CompositionGraph) -> Vec<InterpretationIssue> {
    if !graph.is_acyclic() {
        return vec![InterpretationIssue::Cycle];
    }
    let mut errors = Vec::new();
    if graph.entry_nodes().is_empty() {
        errors.push(InterpretationIssue::NoStartNode);
    }
    if graph.exit_nodes().is_empty() {
        errors.push(InterpretationIssue::NoTerminalNode);
    }
    errors
}

/// Whether the id resolves in the store with a truthy `optional` flag
pub(crate) fn is_optional_in_store(store: &dyn ObjectStore, id: &str) -> bool {
    store
        .get_by_id(id)
        .is_some_and(|obj| obj.data.get("optional").and_then(Value::as_bool) == Some(true))
}
