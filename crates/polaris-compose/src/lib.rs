//! Polaris Composition Engine
//!
//! Turns permitting modules held in an object store into a validated,
//! persistable workflow DAG, and reads such a DAG back.
//!
//! # Core Concepts
//!
//! - [`TypedEdge`]: closed sum type over the seven edge kinds
//! - [`CompositionGraph`]: adjacency lists with Kahn's topological sort
//! - [`load_modules`]: select modules by jurisdiction and version
//! - [`GraphBuilder`]: modules, dependencies and constraints into a graph
//! - [`GraphValidator`]: structural checks yielding a sealed [`ValidatedGraph`]
//! - [`CompositionExporter`]: package a validated graph plus linked objects
//! - [`load_composition`]: rebuild a graph from a persisted composition
//! - [`Diagnostics`]: advisory conditions, never fatal
//!
//! # Example
//!
//! ```rust,ignore
//! use polaris_compose::{compose, ComposeRequest};
//!
//! let request = ComposeRequest::new("Denpasar", "Solar Permit Flow")
//!     .with_constraints_json(&std::fs::read_to_string("constraints.json")?)?;
//! let outcome = compose(&store, &request)?;
//! store.save(outcome.composition);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod composition;
mod constraint;
mod construction;
mod diagnostics;
mod edge;
mod error;
mod export;
mod graph;
mod module;
mod pipeline;
mod reload;

pub use composition::{CompositionPayload, EdgeEncoding};
pub use constraint::{parse_constraints, read_constraints, TemporalConstraint, MUST_FINISH_BEFORE};
pub use construction::{BuiltGraph, GraphBuilder, GraphValidator, ValidatedGraph};
pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticLevel, Diagnostics};
pub use edge::{EdgeKind, EdgeType, Provenance, TemporalRelation, TypedEdge};
pub use error::{ComposeError, StructuralViolation, ValidationError};
pub use export::{composition_id, CompositionExporter, ExportRequest, COMPOSITION_VERSION};
pub use graph::{CompositionGraph, CycleError};
pub use module::{load_modules, ModuleSet, PermittingModule, DEFAULT_VERSION};
pub use pipeline::{compose, ComposeOutcome, ComposeRequest};
pub use reload::{load_composition, readable_edges, LoadedComposition};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
