//! Semantic tags and fragile-path detection

use indexmap::IndexMap;
use polaris_compose::CompositionGraph;
use polaris_memory::{ObjectStore, ObjectType};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Semantic property of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticTag {
    /// Referenced by a `SymbolicScaffold`
    Symbolic,
    /// Referenced by an `OverrideProtocol`
    OverrideRisk,
    /// Triggers a `FeedbackLoop`
    FeedbackTrigger,
}

impl SemanticTag {
    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Symbolic => "symbolic",
            Self::OverrideRisk => "override_risk",
            Self::FeedbackTrigger => "feedback_trigger",
        }
    }
}

impl fmt::Display for SemanticTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags per module, in module order; untagged modules map to an empty list
pub type ModuleTags = IndexMap<String, Vec<SemanticTag>>;

/// Tag every module from the store's scaffolds, overrides and loops
pub fn tag_modules<'a>(
    modules: impl IntoIterator<Item = &'a str>,
    store: &dyn ObjectStore,
) -> ModuleTags {
    let referenced = |object_type: ObjectType, field: &str| -> HashSet<String> {
        store
            .get_by_type(&object_type)
            .iter()
            .filter_map(|obj| obj.field_str(field).map(str::to_string))
            .collect()
    };
    let symbolic = referenced(ObjectType::SymbolicScaffold, "module_id");
    let overrides = referenced(ObjectType::OverrideProtocol, "module_id");
    let triggers = referenced(ObjectType::FeedbackLoop, "trigger_module_id");

    modules
        .into_iter()
        .map(|id| {
            let tags = [
                (SemanticTag::Symbolic, &symbolic),
                (SemanticTag::OverrideRisk, &overrides),
                (SemanticTag::FeedbackTrigger, &triggers),
            ]
            .into_iter()
            .filter(|(_, ids)| ids.contains(id))
            .map(|(tag, _)| tag)
            .collect();
            (id.to_string(), tags)
        })
        .collect()
}

/// Edges leaving a symbolic module or entering an override-risk module
///
/// A heuristic marker for narratively sensitive steps feeding override-prone
/// ones, not a risk score.
#[must_use]
pub fn fragile_paths(graph: &CompositionGraph, tags: &ModuleTags) -> Vec<(String, String)> {
    let has = |id: &str, tag: SemanticTag| tags.get(id).is_some_and(|t| t.contains(&tag));
    graph
        .edge_pairs()
        .filter(|(from, to)| has(from, SemanticTag::Symbolic) || has(to, SemanticTag::OverrideRisk))
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polaris_compose::TypedEdge;
    use polaris_test_utils::{feedback_loop, override_protocol, scaffold, StoreBuilder};

    #[test]
    fn tags_follow_store_references() {
        let store = StoreBuilder::new()
            .with(scaffold("scaf-1", "A"))
            .with(override_protocol("ovr-1", "A"))
            .with(feedback_loop("loop-1", "B"))
            .build();
        let tags = tag_modules(["A", "B", "C"], &store);

        assert_eq!(tags["A"], vec![SemanticTag::Symbolic, SemanticTag::OverrideRisk]);
        assert_eq!(tags["B"], vec![SemanticTag::FeedbackTrigger]);
        assert!(tags["C"].is_empty());
        assert_eq!(tags.keys().collect::<Vec<_>>(), ["A", "B", "C"]);
    }

    #[test]
    fn symbolic_source_or_override_target_is_fragile() {
        let mut graph = CompositionGraph::new();
        graph.add_edge(TypedEdge::dependency("A", "B"));
        graph.add_edge(TypedEdge::dependency("B", "C"));
        graph.add_edge(TypedEdge::dependency("C", "D"));

        let tags: ModuleTags = [
            ("A".to_string(), vec![SemanticTag::Symbolic]),
            ("B".to_string(), vec![]),
            ("C".to_string(), vec![]),
            ("D".to_string(), vec![SemanticTag::OverrideRisk]),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            fragile_paths(&graph, &tags),
            vec![
                ("A".to_string(), "B".to_string()),
                ("C".to_string(), "D".to_string())
            ]
        );
    }
}
