use polaris_compose::{
    GraphBuilder, GraphValidator, ModuleSet, PermittingModule, StructuralViolation,
    TemporalConstraint,
};
use polaris_memory::GovernanceObject;
use polaris_test_utils::module;
use proptest::prelude::*;
use std::collections::HashMap;

fn modules_from(node_count: usize, deps: &[(usize, usize)]) -> ModuleSet {
    let names: Vec<String> = (0..node_count).map(|i| format!("mod-{i:02}")).collect();
    (0..node_count)
        .map(|i| {
            let my_deps: Vec<&str> = deps
                .iter()
                .filter(|(_, to)| *to == i)
                .map(|(from, _)| names[*from].as_str())
                .collect();
            module(&names[i], &my_deps)
        })
        .filter_map(PermittingModule::from_object)
        .collect()
}

/// Depth-first cycle search, independent of Kahn
fn has_cycle(adjacency: &HashMap<String, Vec<String>>) -> bool {
    fn visit(
        node: &str,
        adjacency: &HashMap<String, Vec<String>>,
        state: &mut HashMap<String, u8>,
    ) -> bool {
        match state.get(node) {
            Some(1) => return true,
            Some(2) => return false,
            _ => {}
        }
        state.insert(node.to_string(), 1);
        for next in adjacency.get(node).into_iter().flatten() {
            if visit(next, adjacency, state) {
                return true;
            }
        }
        state.insert(node.to_string(), 2);
        false
    }

    let mut state = HashMap::new();
    adjacency.keys().any(|node| visit(node, adjacency, &mut state))
}

proptest! {
    #[test]
    fn prop_validator_rejects_cycle_iff_dfs_finds_one(
        node_count in 1..15usize,
        deps in proptest::collection::vec((0..15usize, 0..15usize), 0..40),
        constraints in proptest::collection::vec((0..15usize, 0..15usize), 0..10),
    ) {
        let deps: Vec<(usize, usize)> = deps
            .into_iter()
            .filter(|(f, t)| *f < node_count && *t < node_count)
            .collect();
        let modules = modules_from(node_count, &deps);
        let constraints = constraints
            .into_iter()
            .map(|(f, t)| TemporalConstraint::must_finish_before(format!("mod-{f:02}"), format!("mod-{t:02}")))
            .collect();

        let built = GraphBuilder::new(&modules).with_constraints(constraints).build();
        let graph = built.graph;

        let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
        for (from, to) in graph.edge_pairs() {
            prop_assert!(modules.contains(from) && modules.contains(to));
            adjacency.entry(from.to_string()).or_default().push(to.to_string());
        }

        let cyclic = has_cycle(&adjacency);
        prop_assert_eq!(graph.topological_order().is_err(), cyclic);

        match GraphValidator::validate(graph.clone(), &modules) {
            Ok(validated) => {
                prop_assert!(!cyclic);
                let position: HashMap<&str, usize> = validated
                    .topological_order()
                    .iter()
                    .enumerate()
                    .map(|(i, id)| (id.as_str(), i))
                    .collect();
                for (from, to) in graph.edge_pairs() {
                    prop_assert!(position[from] < position[to]);
                }
            }
            Err(err) => prop_assert_eq!(err.is_cycle(), cyclic),
        }
    }

    #[test]
    fn prop_builder_never_adds_unloaded_nodes(
        node_count in 1..10usize,
        ghost_deps in proptest::collection::vec(0..10usize, 0..10),
    ) {
        let mut objects: Vec<GovernanceObject> = (0..node_count)
            .map(|i| module(&format!("mod-{i}"), &[]))
            .collect();
        for (i, ghost) in ghost_deps.iter().enumerate() {
            if let Some(obj) = objects.get_mut(i % node_count) {
                obj.data.insert("dependencies".to_string(), serde_json::json!([format!("ghost-{ghost}")]));
            }
        }
        let modules: ModuleSet = objects.into_iter().filter_map(PermittingModule::from_object).collect();
        let built = GraphBuilder::new(&modules).build();

        prop_assert_eq!(built.graph.node_count(), node_count);
        prop_assert_eq!(built.graph.edge_count(), 0);
    }
}

#[test]
fn optional_flag_decides_isolated_module() {
    let build = |optional: bool| {
        let modules: ModuleSet = [
            module("mod-A", &[]),
            module("mod-B", &["mod-A"]),
            module("mod-lonely", &[]).with_field("optional", optional),
        ]
        .into_iter()
        .filter_map(PermittingModule::from_object)
        .collect();
        let built = GraphBuilder::new(&modules).build();
        GraphValidator::validate(built.graph, &modules)
    };

    assert!(build(true).is_ok());

    let err = build(false).unwrap_err();
    assert_eq!(
        err.violations(),
        [StructuralViolation::DisconnectedModule("mod-lonely".to_string())]
    );
    assert!(err.to_string().contains("mod-lonely"));
}
