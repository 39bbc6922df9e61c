//! Composition Loader
//!
//! Reverse of the exporter: rebuilds a live graph from a persisted
//! composition and resolves its linked ids against the store. Resolution is
//! best-effort; whatever no longer resolves is left out and reported.

use crate::composition::{CompositionPayload, EdgeEncoding};
use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::edge::TypedEdge;
use crate::error::ComposeError;
use crate::graph::CompositionGraph;
use crate::module::{ModuleSet, PermittingModule};
use polaris_memory::{GovernanceObject, ObjectStore};

/// A persisted composition brought back to life
#[derive(Debug, Clone)]
pub struct LoadedComposition {
    /// Composition object id
    pub id: String,
    /// Title
    pub title: Option<String>,
    /// Creator
    pub created_by: Option<String>,
    /// Jurisdiction
    pub jurisdiction: Option<String>,
    /// Graph over module ids and readable edges
    pub graph: CompositionGraph,
    /// Module ids listed by the composition, in stored order
    pub module_ids: Vec<String>,
    /// Listed modules that still resolve to permitting modules
    pub modules: ModuleSet,
    /// Readable edges, in stored order
    pub edges: Vec<TypedEdge>,
    /// Resolved `SymbolicScaffold` objects
    pub symbolic_scaffolds: Vec<GovernanceObject>,
    /// Resolved `OverrideProtocol` objects
    pub override_protocols: Vec<GovernanceObject>,
    /// Resolved `FeedbackLoop` objects
    pub feedback_loops: Vec<GovernanceObject>,
    /// Resolved `FailureEvent` objects
    pub failure_events: Vec<GovernanceObject>,
    /// Everything dropped while loading
    pub diagnostics: Diagnostics,
}

/// Load a persisted composition
///
/// Legacy `[from, to]` edges load as `dependency` edges. Unrecognized edge
/// shapes are dropped with a diagnostic.
///
/// # Errors
/// Returns [`ComposeError::NotAComposition`] or
/// [`ComposeError::MalformedPayload`] if the payload cannot be read
pub fn load_composition(
    composition: &GovernanceObject,
    store: &dyn ObjectStore,
) -> Result<LoadedComposition, ComposeError> {
    let payload = CompositionPayload::from_object(composition)?;
    let mut diagnostics = Diagnostics::new();

    let mut graph = CompositionGraph::new();
    for id in &payload.modules {
        graph.add_node(id.as_str());
    }

    let edges = readable_edges(&payload.edges, &mut diagnostics);
    for edge in &edges {
        graph.add_edge(edge.clone());
    }

    let mut modules = ModuleSet::new();
    for id in &payload.modules {
        match store.get_by_id(id).and_then(PermittingModule::from_object) {
            Some(module) => modules.insert(module),
            None => diagnostics.record(
                Diagnostic::warning(
                    DiagnosticCode::UnresolvedModule,
                    format!("module {id} does not resolve to a permitting module"),
                )
                .with_context("module", id),
            ),
        }
    }

    let mut resolve = |field: &str, ids: &[String]| -> Vec<GovernanceObject> {
        ids.iter()
            .filter_map(|id| {
                let found = store.get_by_id(id);
                if found.is_none() {
                    diagnostics.record(
                        Diagnostic::warning(
                            DiagnosticCode::UnresolvedLink,
                            format!("{field} entry {id} no longer resolves"),
                        )
                        .with_context("field", field)
                        .with_context("id", id),
                    );
                }
                found
            })
            .collect()
    };
    let symbolic_scaffolds = resolve("symbolic_scaffolds", &payload.symbolic_scaffolds);
    let override_protocols = resolve("override_protocols", &payload.override_protocols);
    let feedback_loops = resolve("feedback_loops", &payload.feedback_loops);
    let failure_events = resolve("failure_events", &payload.failure_events);

    tracing::info!(
        id = %composition.id,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        dropped = diagnostics.len(),
        "composition loaded"
    );

    Ok(LoadedComposition {
        id: composition.id.clone(),
        title: payload.title,
        created_by: payload.created_by,
        jurisdiction: payload.jurisdiction,
        graph,
        module_ids: payload.modules,
        modules,
        edges,
        symbolic_scaffolds,
        override_protocols,
        feedback_loops,
        failure_events,
        diagnostics,
    })
}

/// Typed edges of a payload, reporting every unreadable one
pub fn readable_edges(encodings: &[EdgeEncoding], diagnostics: &mut Diagnostics) -> Vec<TypedEdge> {
    encodings
        .iter()
        .enumerate()
        .filter_map(|(index, encoding)| {
            let edge = encoding.typed_edge();
            if edge.is_none() {
                let shape = match encoding {
                    EdgeEncoding::Unrecognized(value) => value.to_string(),
                    _ => String::new(),
                };
                diagnostics.record(
                    Diagnostic::warning(
                        DiagnosticCode::UnrecognizedEdgeShape,
                        format!("invalid edge format: {shape}"),
                    )
                    .with_context("index", index.to_string()),
                );
            }
            edge
        })
        .collect()
}
