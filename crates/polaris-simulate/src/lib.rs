//! Polaris Simulation Engine
//!
//! Monte-Carlo estimate of end-to-end duration and rework risk for a
//! composition.
//!
//! # Core Concepts
//!
//! - [`SimulationGraph`]: modules that resolve in the store, in topological order
//! - [`SimulationParams`]: duration range, failure rate, rework bound
//! - [`simulate_run`]: one pass, generic over the random source
//! - [`SimulationEngine`]: seeded, parallel runs reduced into a [`SimulationResult`]
//!
//! # Example
//!
//! ```rust,ignore
//! use polaris_simulate::{SimulationEngine, SimulationParams};
//!
//! let result = SimulationEngine::new(SimulationParams::default())
//!     .with_runs(500)
//!     .with_seed(7)
//!     .run_composition(&composition, &store)?;
//! println!("{:.1} days on average", result.avg_duration);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod engine;
mod error;
mod graph;
mod params;

pub use engine::{simulate_run, RunOutcome, SimulationEngine, SimulationResult, DEFAULT_RUNS};
pub use error::SimulationError;
pub use graph::SimulationGraph;
pub use params::SimulationParams;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
