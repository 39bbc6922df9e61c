use polaris_compose::{compose, ComposeRequest, EdgeKind, TypedEdge};
use polaris_interpret::{diagnose_composition, interpret, InterpretationIssue, SemanticTag};
use polaris_test_utils::{
    composition, feedback_loop, override_protocol, scaffold, StoreBuilder, JURISDICTION,
};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn symbolic_source_makes_edge_fragile() {
    let store = StoreBuilder::new()
        .with_module("A", &[])
        .with_module("B", &["A"])
        .with(scaffold("scaf-a", "A"))
        .build();
    let obj = composition(
        "composition-denpasar-fragile",
        json!({"modules": ["A", "B"], "edges": [["A", "B"]]}),
    );

    let result = interpret(&obj, &store).unwrap();
    assert!(result.valid);
    assert_eq!(result.tags["A"], vec![SemanticTag::Symbolic]);
    assert!(result
        .summary
        .fragile_paths
        .contains(&("A".to_string(), "B".to_string())));
}

#[test]
fn interprets_a_composed_flow() {
    let store = StoreBuilder::new()
        .with_module("A", &[])
        .with_module("B", &["A"])
        .with_module("C", &["B"])
        .with(override_protocol("ovr-c", "C"))
        .with(feedback_loop("loop-b", "B"))
        .build();
    let outcome = compose(
        &store,
        &ComposeRequest::new(JURISDICTION, "Flow").with_edges(vec![TypedEdge::new(
            "A",
            "C",
            EdgeKind::Override {
                override_id: Some("ovr-c".to_string()),
                trigger_condition: None,
                override_action: Some("skip_step".to_string()),
            },
        )]),
    )
    .unwrap();

    let result = interpret(&outcome.composition, &store).unwrap();
    assert!(result.valid);
    assert_eq!(result.summary.module_count, 3);
    assert_eq!(result.summary.edge_count, 3);
    assert_eq!(
        result.summary.fragile_paths,
        vec![
            ("B".to_string(), "C".to_string()),
            ("A".to_string(), "C".to_string())
        ]
    );
    assert_eq!(result.tags["B"], vec![SemanticTag::FeedbackTrigger]);

    let report = diagnose_composition(&outcome.composition, &store).unwrap();
    assert_eq!(report.feedback_loops, vec!["loop-b"]);
    assert!(!report.has_cycle);
}

#[test]
fn cyclic_composition_is_invalid_but_interpreted() {
    let store = StoreBuilder::new().build();
    let obj = composition(
        "composition-denpasar-loop",
        json!({
            "modules": ["A", "B"],
            "edges": [
                {"from_node": "A", "to_node": "B", "type": "dependency"},
                {"from_node": "B", "to_node": "A", "type": "feedback_loop"}
            ]
        }),
    );

    let result = interpret(&obj, &store).unwrap();
    assert!(!result.valid);
    assert_eq!(result.errors, vec![InterpretationIssue::Cycle]);

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["errors"], json!(["Graph contains cycles."]));
    assert_eq!(value["summary"]["edge_count"], 2);
}
