use polaris_compose::{
    compose, load_composition, ComposeError, ComposeRequest, CompositionPayload, DiagnosticCode,
    EdgeKind, EdgeType, TypedEdge,
};
use polaris_memory::ObjectStore;
use polaris_test_utils::{
    composition, failure_event, feedback_loop, module, optional_module, override_protocol,
    scaffold, StoreBuilder, JURISDICTION,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeSet;

fn triples(edges: &[TypedEdge]) -> BTreeSet<(String, String, EdgeType)> {
    edges
        .iter()
        .map(|e| (e.from_node.clone(), e.to_node.clone(), e.edge_type()))
        .collect()
}

#[test]
fn export_then_reload_preserves_nodes_and_typed_edges() {
    let store = StoreBuilder::new()
        .with_module("mod-A", &[])
        .with_module("mod-B", &["mod-A"])
        .with_module("mod-C", &["mod-B"])
        .with(optional_module("mod-extra"))
        .with(scaffold("scaf-1", "mod-A"))
        .with(override_protocol("ovr-1", "mod-C"))
        .with(feedback_loop("loop-1", "mod-B"))
        .with(failure_event("fail-1", "mod-B"))
        .build();

    let request = ComposeRequest::new(JURISDICTION, "Solar Permit Flow")
        .with_constraints_json(
            r#"[{"type": "must_finish_before", "module_ids": ["mod-A", "mod-C"]}]"#,
        )
        .unwrap()
        .with_created_by("planner");
    let outcome = compose(&store, &request).unwrap();
    let exported: Vec<TypedEdge> = outcome.validated.graph().edges().cloned().collect();

    store.save(outcome.composition.clone());
    let saved = store
        .get_by_id("composition-denpasar-solar_permit_flow")
        .unwrap();
    let loaded = load_composition(&saved, &store).unwrap();

    let original_nodes: BTreeSet<&str> = outcome.validated.graph().nodes().collect();
    let reloaded_nodes: BTreeSet<&str> = loaded.graph.nodes().collect();
    assert_eq!(original_nodes, reloaded_nodes);
    assert_eq!(triples(&exported), triples(&loaded.edges));

    assert_eq!(loaded.symbolic_scaffolds[0].id, "scaf-1");
    assert_eq!(loaded.override_protocols[0].id, "ovr-1");
    assert_eq!(loaded.feedback_loops[0].id, "loop-1");
    assert_eq!(loaded.failure_events[0].id, "fail-1");
    assert_eq!(loaded.created_by.as_deref(), Some("planner"));
    assert!(loaded.diagnostics.is_empty());
}

#[test]
fn override_edge_survives_export_and_reload() {
    let store = StoreBuilder::new()
        .with_module("A", &[])
        .with_module("B", &[])
        .with_module("C", &[])
        .build();

    let request = ComposeRequest::new(JURISDICTION, "Override Flow").with_edges(vec![
        TypedEdge::new(
            "A",
            "C",
            EdgeKind::Override {
                override_id: Some("ovr-fast-track".to_string()),
                trigger_condition: Some("grid review exceeds 30 days".to_string()),
                override_action: Some("skip_step".to_string()),
            },
        ),
        TypedEdge::dependency("A", "B"),
        TypedEdge::new(
            "B",
            "C",
            EdgeKind::Conditional {
                condition: Some("capacity > 5kW".to_string()),
            },
        ),
    ]);
    let outcome = compose(&store, &request).unwrap();

    let text = serde_json::to_string(&outcome.composition).unwrap();
    let persisted = serde_json::from_str(&text).unwrap();
    let loaded = load_composition(&persisted, &store).unwrap();

    let overrides: Vec<&TypedEdge> = loaded
        .edges
        .iter()
        .filter(|e| e.edge_type() == EdgeType::Override)
        .collect();
    assert_eq!(overrides.len(), 1);
    assert_eq!(overrides[0].override_action(), Some("skip_step"));
    assert_eq!(loaded.edges.len(), 3);
}

#[test]
fn legacy_pair_reloads_as_dependency() {
    let store = StoreBuilder::new()
        .with_module("mod-A", &[])
        .with_module("mod-B", &[])
        .build();
    let obj = composition(
        "composition-denpasar-legacy",
        json!({"modules": ["mod-A", "mod-B"], "edges": [["mod-A", "mod-B"]]}),
    );

    let loaded = load_composition(&obj, &store).unwrap();
    assert_eq!(loaded.edges, vec![TypedEdge::dependency("mod-A", "mod-B")]);
}

#[test]
fn legacy_and_typed_edges_reserialize_as_stored() {
    let data = json!({
        "title": "Mixed",
        "modules": ["mod-A", "mod-B", "mod-C"],
        "edges": [
            ["mod-A", "mod-B"],
            {"from_node": "mod-B", "to_node": "mod-C", "type": "semantic_link", "tag": "#Permit", "label": null, "tags": []}
        ]
    });
    let payload = CompositionPayload::from_object(&composition("composition-x", data.clone())).unwrap();
    assert_eq!(payload.to_data().unwrap()["edges"], data["edges"]);
}

#[test]
fn cycle_aborts_composition() {
    let store = StoreBuilder::new()
        .with_module("A", &["B"])
        .with_module("B", &["A"])
        .build();
    let err = compose(&store, &ComposeRequest::new(JURISDICTION, "Loop")).unwrap_err();
    match err {
        ComposeError::Validation(validation) => assert!(validation.is_cycle()),
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn bad_constraint_document_is_fatal() {
    let result = ComposeRequest::new(JURISDICTION, "Broken").with_constraints_json("{oops");
    assert!(matches!(result, Err(ComposeError::ConstraintParse(_))));
}

#[test]
fn unknown_dependency_is_advisory() {
    let store = StoreBuilder::new()
        .with_module("A", &[])
        .with(module("B", &["A", "retired-module"]))
        .build();
    let outcome = compose(&store, &ComposeRequest::new(JURISDICTION, "Advisory")).unwrap();
    assert!(outcome.diagnostics.has(DiagnosticCode::UnresolvedDependency));
    assert_eq!(outcome.validated.graph().edge_count(), 1);
}

#[test]
fn empty_jurisdiction_fails_validation() {
    let store = StoreBuilder::new().with_module("A", &[]).build();
    let err = compose(&store, &ComposeRequest::new("Atlantis", "Nothing")).unwrap_err();
    assert!(err.is_structural());
}
