//! Polaris Memory
//!
//! The governance object model shared by every Polaris crate, and the object
//! store contract the composition engine reads from.
//!
//! # Core Concepts
//!
//! - [`GovernanceObject`]: generic typed, tagged, versioned record
//! - [`ObjectType`]: discriminator (`PermittingModule`, `SymbolicScaffold`, ...)
//! - [`ObjectStore`]: `get_by_id` / `get_by_type` / `save` / `query_by_tag`
//! - [`MemoryStore`]: in-memory reference store backed by `DashMap`
//! - [`load_dir`]: ingest a directory of JSON governance records
//!
//! # Example
//!
//! ```rust,ignore
//! use polaris_memory::{GovernanceObject, MemoryStore, ObjectStore, ObjectType};
//!
//! let store = MemoryStore::new();
//! store.save(GovernanceObject::new("mod-a", ObjectType::PermittingModule));
//! assert!(store.get_by_id("mod-a").is_some());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod ingest;
mod object;
mod store;

pub use error::StoreError;
pub use ingest::{load_dir, wrap_raw_record, write_object};
pub use object::{GovernanceObject, ObjectType};
pub use store::{MemoryStore, ObjectStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
