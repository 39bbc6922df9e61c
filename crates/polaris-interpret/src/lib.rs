//! Polaris Interpretation Engine
//!
//! Advisory analysis of persisted compositions.
//!
//! # Core Concepts
//!
//! - [`interpret`]: hard errors (cycles, entry/exit) separated from soft
//!   warnings (disconnected modules), plus semantic tags and fragile paths
//! - [`SemanticTag`]: `symbolic`, `override_risk`, `feedback_trigger`
//! - [`fragile_paths`]: edges out of symbolic modules or into override-risk ones
//! - [`diagnose`]: cycle, orphan and feedback-loop report over a module/edge list

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod diagnose;
mod interpretation;
mod tags;

pub use diagnose::{diagnose, diagnose_composition, DiagnosisReport};
pub use interpretation::{
    interpret, Interpretation, InterpretationIssue, InterpretationSummary, InterpretationWarning,
};
pub use tags::{fragile_paths, tag_modules, ModuleTags, SemanticTag};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
