//! Permitting modules and the module loader

use indexmap::IndexMap;
use polaris_memory::{GovernanceObject, ObjectStore, ObjectType};
use serde_json::Value;

/// Version selected when the caller does not name one
pub const DEFAULT_VERSION: &str = "v1";

/// Typed view of a `PermittingModule` governance object
///
/// Malformed payload fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct PermittingModule {
    /// Module id (same as the object id)
    pub id: String,
    /// Display name
    pub module_name: Option<String>,
    /// Ids of modules that must run first
    pub dependencies: Vec<String>,
    /// May stay disconnected from the flow
    pub optional: bool,
    /// Underlying object
    pub object: GovernanceObject,
}

impl PermittingModule {
    /// Parse a module view; `None` if the object is not a `PermittingModule`
    #[must_use]
    pub fn from_object(object: GovernanceObject) -> Option<Self> {
        if !object.is(&ObjectType::PermittingModule) {
            return None;
        }

        let dependencies = object
            .data
            .get("dependencies")
            .and_then(Value::as_array)
            .map(|deps| {
                deps.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let optional = object
            .data
            .get("optional")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Some(Self {
            id: object.id.clone(),
            module_name: object.field_str("module_name").map(str::to_string),
            dependencies,
            optional,
            object,
        })
    }
}

/// Loaded modules keyed by id, in load order
#[derive(Debug, Clone, Default)]
pub struct ModuleSet {
    modules: IndexMap<String, PermittingModule>,
}

impl ModuleSet {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a module, replacing any with the same id
    pub fn insert(&mut self, module: PermittingModule) {
        self.modules.insert(module.id.clone(), module);
    }

    /// Module by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PermittingModule> {
        self.modules.get(id)
    }

    /// Whether the id is loaded
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.modules.contains_key(id)
    }

    /// Whether the module is loaded and flagged optional
    #[must_use]
    pub fn is_optional(&self, id: &str) -> bool {
        self.get(id).is_some_and(|m| m.optional)
    }

    /// Ids in load order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Modules in load order
    pub fn iter(&self) -> impl Iterator<Item = &PermittingModule> {
        self.modules.values()
    }

    /// Number of modules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether no module is loaded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl FromIterator<PermittingModule> for ModuleSet {
    fn from_iter<I: IntoIterator<Item = PermittingModule>>(iter: I) -> Self {
        let mut set = Self::new();
        for module in iter {
            set.insert(module);
        }
        set
    }
}

/// Select every `PermittingModule` of a jurisdiction and version
///
/// Both are matched case-insensitively. Modules are returned sorted by id.
/// An empty result is not an error here.
pub fn load_modules(store: &dyn ObjectStore, jurisdiction: &str, version: &str) -> ModuleSet {
    let matches = |value: Option<&str>, wanted: &str| {
        value.is_some_and(|v| v.to_lowercase() == wanted.to_lowercase())
    };

    let modules: ModuleSet = store
        .get_by_type(&ObjectType::PermittingModule)
        .into_iter()
        .filter(|obj| {
            matches(obj.jurisdiction.as_deref(), jurisdiction)
                && matches(obj.version.as_deref(), version)
        })
        .filter_map(PermittingModule::from_object)
        .collect();

    tracing::debug!(
        jurisdiction,
        version,
        count = modules.len(),
        "permitting modules loaded"
    );
    modules
}

#[cfg(test)]
mod tests {
    use super::*;
    use polaris_memory::MemoryStore;
    use serde_json::json;

    fn module(id: &str, jurisdiction: &str, version: &str) -> GovernanceObject {
        GovernanceObject::new(id, ObjectType::PermittingModule)
            .with_jurisdiction(jurisdiction)
            .with_version(version)
    }

    #[test]
    fn parses_payload_fields() {
        let obj = module("mod-b", "Denpasar", "v1")
            .with_field("module_name", "Grid review")
            .with_field("dependencies", json!(["mod-a", 7]))
            .with_field("optional", true);
        let parsed = PermittingModule::from_object(obj).unwrap();

        assert_eq!(parsed.module_name.as_deref(), Some("Grid review"));
        assert_eq!(parsed.dependencies, vec!["mod-a"]);
        assert!(parsed.optional);
    }

    #[test]
    fn malformed_fields_default() {
        let obj = module("mod-b", "Denpasar", "v1")
            .with_field("dependencies", "mod-a")
            .with_field("optional", "yes");
        let parsed = PermittingModule::from_object(obj).unwrap();
        assert!(parsed.dependencies.is_empty());
        assert!(!parsed.optional);
    }

    #[test]
    fn other_types_are_not_modules() {
        let obj = GovernanceObject::new("scaf-1", ObjectType::SymbolicScaffold);
        assert!(PermittingModule::from_object(obj).is_none());
    }

    #[test]
    fn loader_matches_case_insensitively_and_sorts() {
        let store = MemoryStore::from_objects([
            module("mod-c", "denpasar", "V1"),
            module("mod-a", "DENPASAR", "v1"),
            module("mod-x", "Jakarta", "v1"),
            module("mod-old", "Denpasar", "v0"),
            GovernanceObject::new("mod-none", ObjectType::PermittingModule),
        ]);

        let modules = load_modules(&store, "Denpasar", DEFAULT_VERSION);
        assert_eq!(modules.ids().collect::<Vec<_>>(), vec!["mod-a", "mod-c"]);
    }

    #[test]
    fn empty_selection_is_empty_set() {
        let store = MemoryStore::new();
        assert!(load_modules(&store, "Nowhere", "v1").is_empty());
    }
}
