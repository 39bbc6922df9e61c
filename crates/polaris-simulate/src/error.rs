//! Error types for the simulation engine

use polaris_compose::ComposeError;

/// Main simulation error type
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// Parameters outside their valid range
    #[error("invalid simulation parameters: {0}")]
    InvalidParams(String),

    /// No composition module resolves to a permitting module in the store
    #[error("no valid modules found in memory for composition {composition}")]
    NoValidModules { composition: String },

    /// The simulation graph has no topological order
    #[error("simulation graph contains cycles (unresolved: {unresolved:?})")]
    Cycle { unresolved: Vec<String> },

    /// Composition could not be read
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

impl SimulationError {
    /// Create invalid-params error
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }
}
