//! Construction phase
//!
//! Two steps, each taking the previous step's output by value or reference
//! and returning a new value:
//!
//! 1. [`GraphBuilder`]: modules, dependencies, temporal constraints and
//!    supplied typed edges become a [`CompositionGraph`](crate::CompositionGraph)
//! 2. [`GraphValidator`]: structural checks, producing a [`ValidatedGraph`]
//!
//! Only a [`ValidatedGraph`] can be exported.

mod builder;
mod validator;

pub use builder::{BuiltGraph, GraphBuilder};
pub use validator::{GraphValidator, ValidatedGraph};
