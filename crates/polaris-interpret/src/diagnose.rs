//! Structural diagnosis
//!
//! A lighter check than interpretation, meant for inspecting a module/edge
//! list while a composition is being drafted.

use crate::interpretation::{identity_graph, is_optional_in_store};
use polaris_compose::{ComposeError, CompositionPayload};
use polaris_memory::{GovernanceObject, ObjectStore, ObjectType};
use serde::Serialize;

/// Diagnosis of a module/edge list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosisReport {
    /// Whether the edges form a cycle
    pub has_cycle: bool,
    /// Modules without any edge
    pub disconnected: Vec<String>,
    /// Disconnected modules that exist in the store and are not optional
    pub orphan_non_optional: Vec<String>,
    /// Feedback loops triggered by one of the modules
    pub feedback_loops: Vec<String>,
}

/// Diagnose modules and `(from, to)` edges against the store
///
/// Disconnected ids that do not resolve in the store are not counted as
/// orphans. Feedback loops are named by `loop_id`, falling back to the
/// object id.
pub fn diagnose(
    modules: &[String],
    edges: &[(String, String)],
    store: &dyn ObjectStore,
) -> DiagnosisReport {
    let pairs: Vec<(&str, &str)> = edges
        .iter()
        .map(|(from, to)| (from.as_str(), to.as_str()))
        .collect();
    let graph = identity_graph(modules, &pairs);

    let disconnected: Vec<String> = graph.isolates().into_iter().map(str::to_string).collect();
    let orphan_non_optional = disconnected
        .iter()
        .filter(|id| store.get_by_id(id).is_some() && !is_optional_in_store(store, id))
        .cloned()
        .collect();

    let feedback_loops = store
        .get_by_type(&ObjectType::FeedbackLoop)
        .into_iter()
        .filter(|obj| {
            obj.field_str("trigger_module_id")
                .is_some_and(|trigger| modules.iter().any(|m| m == trigger))
        })
        .map(|obj| loop_label(&obj))
        .collect();

    let report = DiagnosisReport {
        has_cycle: !graph.is_acyclic(),
        disconnected,
        orphan_non_optional,
        feedback_loops,
    };
    tracing::debug!(
        has_cycle = report.has_cycle,
        disconnected = report.disconnected.len(),
        loops = report.feedback_loops.len(),
        "structural diagnosis complete"
    );
    report
}

/// Diagnose a persisted composition
///
/// # Errors
/// Returns [`ComposeError`] if the object is not a readable composition
pub fn diagnose_composition(
    composition: &GovernanceObject,
    store: &dyn ObjectStore,
) -> Result<DiagnosisReport, ComposeError> {
    let payload = CompositionPayload::from_object(composition)?;
    let edges: Vec<(String, String)> = payload
        .edges
        .iter()
        .filter_map(|encoding| encoding.endpoints())
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();
    Ok(diagnose(&payload.modules, &edges, store))
}

fn loop_label(obj: &GovernanceObject) -> String {
    obj.field_str("loop_id").unwrap_or(obj.id.as_str()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polaris_memory::MemoryStore;
    use polaris_test_utils::{feedback_loop, module, optional_module, StoreBuilder};

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn edge(from: &str, to: &str) -> (String, String) {
        (from.to_string(), to.to_string())
    }

    #[test]
    fn orphans_exclude_optional_and_unknown_modules() {
        let store = StoreBuilder::new()
            .with(module("A", &[]))
            .with(module("B", &["A"]))
            .with(module("lonely", &[]))
            .with(optional_module("opt"))
            .build();

        let report = diagnose(
            &ids(&["A", "B", "lonely", "opt", "unknown"]),
            &[edge("A", "B")],
            &store,
        );

        assert!(!report.has_cycle);
        assert_eq!(report.disconnected, ids(&["lonely", "opt", "unknown"]));
        assert_eq!(report.orphan_non_optional, ids(&["lonely"]));
    }

    #[test]
    fn loops_use_loop_id_then_object_id() {
        let store = StoreBuilder::new()
            .with(feedback_loop("loop-grid", "A"))
            .with(
                GovernanceObject::new("loop-obj", ObjectType::FeedbackLoop)
                    .with_field("trigger_module_id", "B"),
            )
            .with(feedback_loop("loop-elsewhere", "Z"))
            .build();

        let report = diagnose(&ids(&["A", "B"]), &[edge("A", "B")], &store);
        assert_eq!(report.feedback_loops, ids(&["loop-grid", "loop-obj"]));
    }

    #[test]
    fn cycle_is_flagged() {
        let report = diagnose(
            &ids(&["A", "B"]),
            &[edge("A", "B"), edge("B", "A")],
            &MemoryStore::new(),
        );
        assert!(report.has_cycle);
        assert!(report.disconnected.is_empty());
    }
}
