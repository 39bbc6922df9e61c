//! JSON directory ingestion
//!
//! Reads every `*.json` file in a directory. A file holds one record or an
//! array of records. A record is either a full [`GovernanceObject`] envelope
//! (as written by [`write_object`]) or a raw domain record that gets wrapped.

use crate::error::StoreError;
use crate::object::{GovernanceObject, ObjectType};
use crate::store::MemoryStore;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw-record fields tried, in order, to find an object id
const ID_FIELDS: &[&str] = &[
    "id",
    "module_id",
    "failure_id",
    "loop_id",
    "reform_id",
    "override_id",
    "jurisdiction_id",
    "actor_map_id",
    "scaffold_id",
    "term",
];

const BOOTSTRAP_CREATOR: &str = "system:bootstrap";

/// Load a directory of JSON records into a fresh [`MemoryStore`]
///
/// Files are read in name order. A file that cannot be read or parsed is
/// logged and skipped.
///
/// # Errors
/// Returns [`StoreError::Io`] if the directory itself cannot be listed
pub fn load_dir(dir: &Path) -> Result<MemoryStore, StoreError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| StoreError::io_error(dir, e))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    let store = MemoryStore::new();
    for file in &files {
        match read_records(file) {
            Ok(records) => {
                for record in records {
                    store.ingest(record);
                }
            }
            Err(e) => tracing::warn!(file = %file.display(), error = %e, "skipping unreadable file"),
        }
    }

    tracing::info!(
        dir = %dir.display(),
        files = files.len(),
        objects = store.len(),
        "memory directory loaded"
    );
    Ok(store)
}

fn read_records(path: &Path) -> Result<Vec<GovernanceObject>, StoreError> {
    let text = fs::read_to_string(path).map_err(|e| StoreError::io_error(path, e))?;
    let value: Value = serde_json::from_str(&text).map_err(|e| StoreError::json_error(path, e))?;
    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(raw) => Some(wrap_raw_record(raw)),
            other => {
                tracing::warn!(file = %path.display(), value = %other, "non-object record skipped");
                None
            }
        })
        .collect())
}

/// Turn a raw JSON record into a [`GovernanceObject`]
///
/// Envelopes (records with `id`, `object_type` and an object `data`) are
/// taken as-is. Anything else becomes the `data` of a new envelope whose id
/// comes from the first present id-like field.
#[must_use]
pub fn wrap_raw_record(raw: Map<String, Value>) -> GovernanceObject {
    let is_envelope = raw.contains_key("id")
        && raw.contains_key("object_type")
        && raw.get("data").is_some_and(Value::is_object);
    if is_envelope {
        match serde_json::from_value::<GovernanceObject>(Value::Object(raw.clone())) {
            Ok(object) => return object,
            Err(e) => tracing::debug!(error = %e, "envelope-shaped record wrapped as raw"),
        }
    }

    let text = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
    let id = ID_FIELDS.iter().find_map(|key| text(key)).unwrap_or_else(|| {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("auto-{}", &suffix[..8])
    });

    GovernanceObject {
        id,
        object_type: ObjectType::from(text("object_type").unwrap_or_else(|| "Unknown".to_string())),
        jurisdiction: text("jurisdiction"),
        version: Some(text("jurisdiction_version").unwrap_or_else(|| "v1".to_string())),
        created_on: Utc::now(),
        created_by: Some(BOOTSTRAP_CREATOR.to_string()),
        previous_version: None,
        tags: BTreeSet::new(),
        data: raw,
    }
}

/// Write one object as `<dir>/<id>.json`
///
/// # Errors
/// Returns [`StoreError`] if serialization or the write fails
pub fn write_object(dir: &Path, object: &GovernanceObject) -> Result<PathBuf, StoreError> {
    let safe_id: String = object
        .id
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    let path = dir.join(format!("{safe_id}.json"));
    let text = serde_json::to_string_pretty(object).map_err(|e| StoreError::json_error(&path, e))?;
    fs::write(&path, text).map_err(|e| StoreError::io_error(&path, e))?;
    tracing::info!(id = %object.id, path = %path.display(), "object written");
    Ok(path)
}
