//! Object store contract and in-memory reference store

use crate::error::StoreError;
use crate::object::{GovernanceObject, ObjectType};
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Read/write contract of the external governance object store
///
/// The composition engine only ever talks to a store through this trait;
/// it never touches the store's backing files.
pub trait ObjectStore: Send + Sync {
    /// Look up one object by id
    fn get_by_id(&self, id: &str) -> Option<GovernanceObject>;

    /// All objects of a type, ordered by id
    fn get_by_type(&self, object_type: &ObjectType) -> Vec<GovernanceObject>;

    /// Upsert by id
    fn save(&self, object: GovernanceObject);

    /// All objects carrying a tag, ordered by id
    fn query_by_tag(&self, tag: &str) -> Vec<GovernanceObject>;
}

/// In-memory store with a tag index
///
/// Thread-safe; concurrent reads go through `DashMap` shards.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: DashMap<String, GovernanceObject>,
    tag_index: DashMap<String, BTreeSet<String>>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from objects, later objects overwriting earlier ones
    #[must_use]
    pub fn from_objects(objects: impl IntoIterator<Item = GovernanceObject>) -> Self {
        let store = Self::new();
        for object in objects {
            store.save(object);
        }
        store
    }

    /// Number of stored objects
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Insert during ingestion
    ///
    /// The first record for an id wins, except that a `PermittingModule`
    /// always replaces whatever was there. Returns whether it was stored.
    pub fn ingest(&self, object: GovernanceObject) -> bool {
        let replace = object.is(&ObjectType::PermittingModule)
            || !self.objects.contains_key(&object.id);
        if replace {
            self.save(object);
        } else {
            tracing::debug!(id = %object.id, "duplicate id ignored during ingestion");
        }
        replace
    }

    /// Add a tag to a stored object
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if no object has this id
    pub fn add_tag(&self, id: &str, tag: &str) -> Result<(), StoreError> {
        {
            let mut entry = self
                .objects
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            entry.add_tag(tag);
        }
        self.tag_index
            .entry(tag.to_string())
            .or_default()
            .insert(id.to_string());
        Ok(())
    }

    /// Remove a tag from a stored object
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if no object has this id
    pub fn remove_tag(&self, id: &str, tag: &str) -> Result<(), StoreError> {
        {
            let mut entry = self
                .objects
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            entry.remove_tag(tag);
        }
        if let Some(mut ids) = self.tag_index.get_mut(tag) {
            ids.remove(id);
        }
        Ok(())
    }

    /// Clone an object into a new version, save it, and return it
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if the base object does not exist
    pub fn create_version(
        &self,
        base_id: &str,
        data: Map<String, Value>,
        created_by: Option<String>,
    ) -> Result<GovernanceObject, StoreError> {
        let base = self
            .get_by_id(base_id)
            .ok_or_else(|| StoreError::NotFound(base_id.to_string()))?;
        let next = base.clone_into_new_version(data, created_by);
        self.save(next.clone());
        Ok(next)
    }

    /// All objects matching a predicate, ordered by id
    pub fn query<F>(&self, predicate: F) -> Vec<GovernanceObject>
    where
        F: Fn(&GovernanceObject) -> bool,
    {
        let mut found: Vec<_> = self
            .objects
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    /// All stored objects, ordered by id
    #[must_use]
    pub fn all(&self) -> Vec<GovernanceObject> {
        self.query(|_| true)
    }

    fn unindex(&self, object: &GovernanceObject) {
        for tag in &object.tags {
            if let Some(mut ids) = self.tag_index.get_mut(tag) {
                ids.remove(&object.id);
            }
        }
    }

    fn index(&self, object: &GovernanceObject) {
        for tag in &object.tags {
            self.tag_index
                .entry(tag.clone())
                .or_default()
                .insert(object.id.clone());
        }
    }
}

impl ObjectStore for MemoryStore {
    fn get_by_id(&self, id: &str) -> Option<GovernanceObject> {
        self.objects.get(id).map(|entry| entry.value().clone())
    }

    fn get_by_type(&self, object_type: &ObjectType) -> Vec<GovernanceObject> {
        self.query(|object| object.is(object_type))
    }

    fn save(&self, object: GovernanceObject) {
        if let Some(previous) = self.objects.insert(object.id.clone(), object.clone()) {
            self.unindex(&previous);
        }
        self.index(&object);
    }

    fn query_by_tag(&self, tag: &str) -> Vec<GovernanceObject> {
        let ids: Vec<String> = self
            .tag_index
            .get(tag)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default();
        // the index can briefly lag a concurrent save of the same id
        ids.iter()
            .filter_map(|id| self.get_by_id(id))
            .filter(|object| object.tags.contains(tag))
            .collect()
    }
}
