//! Testing utilities for the Polaris workspace
//!
//! Fixture builders for governance objects and pre-filled stores.

#![allow(missing_docs)]

use polaris_memory::{GovernanceObject, MemoryStore, ObjectType};
use serde_json::{json, Map, Value};

pub const JURISDICTION: &str = "Denpasar";
pub const VERSION: &str = "v1";

/// Permitting module in the fixture jurisdiction
pub fn module(id: &str, dependencies: &[&str]) -> GovernanceObject {
    GovernanceObject::new(id, ObjectType::PermittingModule)
        .with_jurisdiction(JURISDICTION)
        .with_version(VERSION)
        .with_field("module_name", format!("Module {id}"))
        .with_field("dependencies", json!(dependencies))
        .with_field("optional", false)
}

pub fn optional_module(id: &str) -> GovernanceObject {
    module(id, &[]).with_field("optional", true)
}

pub fn scaffold(id: &str, module_id: &str) -> GovernanceObject {
    GovernanceObject::new(id, ObjectType::SymbolicScaffold)
        .with_jurisdiction(JURISDICTION)
        .with_field("scaffold_id", id)
        .with_field("module_id", module_id)
}

pub fn override_protocol(id: &str, module_id: &str) -> GovernanceObject {
    GovernanceObject::new(id, ObjectType::OverrideProtocol)
        .with_jurisdiction(JURISDICTION)
        .with_field("override_id", id)
        .with_field("module_id", module_id)
}

pub fn feedback_loop(id: &str, trigger_module_id: &str) -> GovernanceObject {
    GovernanceObject::new(id, ObjectType::FeedbackLoop)
        .with_jurisdiction(JURISDICTION)
        .with_field("loop_id", id)
        .with_field("trigger_module_id", trigger_module_id)
}

pub fn failure_event(id: &str, module_id: &str) -> GovernanceObject {
    GovernanceObject::new(id, ObjectType::FailureEvent)
        .with_jurisdiction(JURISDICTION)
        .with_field("failure_id", id)
        .with_field("module_id", module_id)
}

/// Composition object with a raw payload
pub fn composition(id: &str, data: Value) -> GovernanceObject {
    let payload = match data {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    GovernanceObject::new(id, ObjectType::Composition)
        .with_jurisdiction(JURISDICTION)
        .with_version(VERSION)
        .with_data(payload)
}

/// `A`, `B` depends on `A`, `C` depends on `B`
pub fn chain_store() -> MemoryStore {
    MemoryStore::from_objects([
        module("A", &[]),
        module("B", &["A"]),
        module("C", &["B"]),
    ])
}

/// Incremental store builder
#[derive(Debug, Default)]
pub struct StoreBuilder {
    objects: Vec<GovernanceObject>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, object: GovernanceObject) -> Self {
        self.objects.push(object);
        self
    }

    #[must_use]
    pub fn with_module(self, id: &str, dependencies: &[&str]) -> Self {
        self.with(module(id, dependencies))
    }

    pub fn build(self) -> MemoryStore {
        MemoryStore::from_objects(self.objects)
    }
}
