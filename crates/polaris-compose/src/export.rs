//! Composition Exporter
//!
//! Packages a [`ValidatedGraph`] into a `Composition` governance object and
//! attaches every semantic/control object in the store that references one
//! of its modules.

use crate::composition::{CompositionPayload, EdgeEncoding};
use crate::construction::ValidatedGraph;
use crate::error::ComposeError;
use polaris_memory::{GovernanceObject, ObjectStore, ObjectType};
use std::collections::{BTreeSet, HashSet};

/// Version stamped on exported compositions
pub const COMPOSITION_VERSION: &str = "v1";

/// Deterministic composition id for a jurisdiction and title
///
/// Re-exporting the same pair yields the same id, so a later save replaces
/// the earlier composition.
#[must_use]
pub fn composition_id(jurisdiction: &str, title: &str) -> String {
    format!("composition-{}-{}", slug(jurisdiction), slug(title))
}

fn slug(text: &str) -> String {
    text.to_lowercase().replace(' ', "_")
}

/// Caller-supplied export metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    /// Composition title
    pub title: String,
    /// Creator
    pub created_by: String,
    /// Jurisdiction
    pub jurisdiction: String,
}

/// Exporter bound to a store for link resolution
#[derive(Clone, Copy)]
pub struct CompositionExporter<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> CompositionExporter<'a> {
    /// Create exporter
    #[must_use]
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self { store }
    }

    /// Build the composition object
    ///
    /// # Errors
    /// Returns [`ComposeError::Encode`] if the payload cannot be encoded
    pub fn export(
        &self,
        validated: &ValidatedGraph,
        request: &ExportRequest,
    ) -> Result<GovernanceObject, ComposeError> {
        let graph = validated.graph();
        let module_ids: HashSet<&str> = graph.nodes().collect();

        let payload = CompositionPayload {
            title: Some(request.title.clone()),
            jurisdiction: Some(request.jurisdiction.clone()),
            modules: graph.nodes().map(str::to_string).collect(),
            edges: graph.edges().cloned().map(EdgeEncoding::from).collect(),
            symbolic_scaffolds: self.linked(
                &ObjectType::SymbolicScaffold,
                "module_id",
                None,
                &module_ids,
            ),
            override_protocols: self.linked(
                &ObjectType::OverrideProtocol,
                "module_id",
                Some("override_id"),
                &module_ids,
            ),
            feedback_loops: self.linked(
                &ObjectType::FeedbackLoop,
                "trigger_module_id",
                Some("loop_id"),
                &module_ids,
            ),
            failure_events: self.linked(
                &ObjectType::FailureEvent,
                "module_id",
                Some("failure_id"),
                &module_ids,
            ),
            created_by: Some(request.created_by.clone()),
        };

        let id = composition_id(&request.jurisdiction, &request.title);
        tracing::info!(
            id = %id,
            modules = payload.modules.len(),
            edges = payload.edges.len(),
            links = payload.linked_ids().count(),
            "composition exported"
        );

        Ok(GovernanceObject::new(id, ObjectType::Composition)
            .with_jurisdiction(&request.jurisdiction)
            .with_version(COMPOSITION_VERSION)
            .with_created_by(&request.created_by)
            .with_data(payload.to_data()?))
    }

    /// Sorted, de-duplicated ids of `object_type` objects whose `module_field`
    /// names a graph node; `id_field` overrides the object id when present
    fn linked(
        &self,
        object_type: &ObjectType,
        module_field: &str,
        id_field: Option<&str>,
        module_ids: &HashSet<&str>,
    ) -> Vec<String> {
        self.store
            .get_by_type(object_type)
            .iter()
            .filter(|obj| {
                obj.field_str(module_field)
                    .is_some_and(|m| module_ids.contains(m))
            })
            .map(|obj| {
                id_field
                    .and_then(|field| obj.field_str(field))
                    .filter(|id| !id.is_empty())
                    .unwrap_or(obj.id.as_str())
                    .to_string()
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::{GraphBuilder, GraphValidator};
    use crate::module::load_modules;
    use polaris_memory::MemoryStore;
    use serde_json::json;

    fn store() -> MemoryStore {
        let module = |id: &str, deps: serde_json::Value| {
            GovernanceObject::new(id, ObjectType::PermittingModule)
                .with_jurisdiction("Denpasar")
                .with_version("v1")
                .with_field("dependencies", deps)
        };
        MemoryStore::from_objects([
            module("mod-a", json!([])),
            module("mod-b", json!(["mod-a"])),
            GovernanceObject::new("scaf-1", ObjectType::SymbolicScaffold)
                .with_field("module_id", "mod-a"),
            GovernanceObject::new("scaf-far", ObjectType::SymbolicScaffold)
                .with_field("module_id", "mod-elsewhere"),
            GovernanceObject::new("ovr-obj", ObjectType::OverrideProtocol)
                .with_field("module_id", "mod-b")
                .with_field("override_id", "ovr-1"),
            GovernanceObject::new("ovr-obj-2", ObjectType::OverrideProtocol)
                .with_field("module_id", "mod-a")
                .with_field("override_id", "ovr-1"),
            GovernanceObject::new("loop-obj", ObjectType::FeedbackLoop)
                .with_field("trigger_module_id", "mod-b"),
            GovernanceObject::new("fail-1", ObjectType::FailureEvent)
                .with_field("module_id", "mod-b")
                .with_field("failure_id", "fail-1"),
        ])
    }

    fn export(store: &MemoryStore) -> GovernanceObject {
        let modules = load_modules(store, "Denpasar", "v1");
        let built = GraphBuilder::new(&modules).build();
        let validated = GraphValidator::validate(built.graph, &modules).unwrap();
        CompositionExporter::new(store)
            .export(
                &validated,
                &ExportRequest {
                    title: "Solar Permit Flow".to_string(),
                    created_by: "planner".to_string(),
                    jurisdiction: "Denpasar".to_string(),
                },
            )
            .unwrap()
    }

    #[test]
    fn id_is_slug_of_jurisdiction_and_title() {
        assert_eq!(
            composition_id("Denpasar", "Solar Permit Flow"),
            "composition-denpasar-solar_permit_flow"
        );
    }

    #[test]
    fn export_attaches_links_as_sets() {
        let store = store();
        let obj = export(&store);
        let payload = CompositionPayload::from_object(&obj).unwrap();

        assert_eq!(obj.id, "composition-denpasar-solar_permit_flow");
        assert_eq!(obj.version.as_deref(), Some(COMPOSITION_VERSION));
        assert_eq!(payload.modules, vec!["mod-a", "mod-b"]);
        assert_eq!(payload.symbolic_scaffolds, vec!["scaf-1"]);
        assert_eq!(payload.override_protocols, vec!["ovr-1"]);
        assert_eq!(payload.feedback_loops, vec!["loop-obj"]);
        assert_eq!(payload.failure_events, vec!["fail-1"]);
        assert_eq!(payload.created_by.as_deref(), Some("planner"));
    }

    #[test]
    fn export_is_deterministic() {
        let store = store();
        assert_eq!(export(&store).data, export(&store).data);
    }
}
