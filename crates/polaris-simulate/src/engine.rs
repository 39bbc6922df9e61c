//! Monte-Carlo engine
//!
//! Each run walks the modules in topological order. A module takes one
//! uniform duration draw, then reworks (another draw) while a Bernoulli
//! failure keeps firing, at most `max_feedback_loops` times. Runs are
//! independent and execute in parallel; each one owns a `StdRng` seeded from
//! the engine's base seed and the run index, so results depend on the seed
//! but not on the thread count.

use crate::error::SimulationError;
use crate::graph::SimulationGraph;
use crate::params::SimulationParams;
use polaris_memory::{GovernanceObject, ObjectStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Runs per simulation unless configured otherwise
pub const DEFAULT_RUNS: usize = 1000;

/// Outcome of one run, aligned with the traversal order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Final duration per module
    pub durations: Vec<u64>,
    /// Rework loops per module
    pub rework: Vec<u32>,
}

impl RunOutcome {
    /// Sum of module durations, saturating at `u64::MAX`
    #[must_use]
    pub fn total_duration(&self) -> u64 {
        self.durations
            .iter()
            .fold(0, |total, &duration| total.saturating_add(duration))
    }
}

/// Aggregate over all runs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// Mean total duration
    pub avg_duration: f64,
    /// Number of runs
    pub runs: usize,
    /// Runs in which each module reworked at least once
    pub failures: BTreeMap<String, u64>,
    /// Base seed the runs were derived from
    #[serde(skip)]
    pub seed: u64,
}

impl SimulationResult {
    /// Fraction of runs in which a module reworked
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn failure_rate_of(&self, module: &str) -> Option<f64> {
        self.failures
            .get(module)
            .map(|&count| count as f64 / self.runs as f64)
    }
}

/// One simulated pass over the modules
///
/// Generic over the random source so callers can substitute their own.
/// Durations saturate rather than wrap; [`SimulationEngine::run`] rejects
/// ranges that could reach the limit.
pub fn simulate_run<R: Rng + ?Sized>(
    order: &[String],
    params: &SimulationParams,
    rng: &mut R,
) -> RunOutcome {
    let (min, max) = params.task_duration_range;
    let mut durations = Vec::with_capacity(order.len());
    let mut rework = Vec::with_capacity(order.len());

    for _ in order {
        let mut duration = rng.random_range(min..=max);
        let mut failed = rng.random_bool(params.failure_rate);
        let mut loops = 0;
        while failed && loops < params.max_feedback_loops {
            loops += 1;
            duration = duration.saturating_add(rng.random_range(min..=max));
            failed = rng.random_bool(params.failure_rate);
        }
        durations.push(duration);
        rework.push(loops);
    }

    RunOutcome { durations, rework }
}

/// Configured Monte-Carlo engine
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    params: SimulationParams,
    runs: usize,
    seed: Option<u64>,
}

impl SimulationEngine {
    /// Engine with default run count and a fresh seed per simulation
    #[must_use]
    pub fn new(params: SimulationParams) -> Self {
        Self {
            params,
            runs: DEFAULT_RUNS,
            seed: None,
        }
    }

    /// With run count
    #[inline]
    #[must_use]
    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    /// With a fixed base seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parameters in use
    #[inline]
    #[must_use]
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Run the simulation
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidParams`] for bad parameters or a
    /// zero run count
    pub fn run(&self, graph: &SimulationGraph) -> Result<SimulationResult, SimulationError> {
        self.params.validate()?;
        if self.runs == 0 {
            return Err(SimulationError::invalid_params("runs must be greater than 0"));
        }
        self.params.check_total_bound(graph.module_count())?;

        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        tracing::info!(
            seed,
            runs = self.runs,
            modules = graph.module_count(),
            "simulation started"
        );

        let order = graph.order();
        let tally = (0..self.runs)
            .into_par_iter()
            .map(|index| {
                let mut rng = StdRng::seed_from_u64(run_seed(seed, index));
                simulate_run(order, &self.params, &mut rng)
            })
            .fold(|| Tally::new(order.len()), Tally::add)
            .reduce(|| Tally::new(order.len()), Tally::merge);

        #[allow(clippy::cast_precision_loss)]
        let avg_duration = tally.total_duration as f64 / self.runs as f64;
        let failures = order
            .iter()
            .cloned()
            .zip(tally.reworked_runs)
            .collect();

        tracing::info!(avg_duration, "simulation finished");
        Ok(SimulationResult {
            avg_duration,
            runs: self.runs,
            failures,
            seed,
        })
    }

    /// Build the graph of a persisted composition and run it
    ///
    /// # Errors
    /// Propagates [`SimulationGraph::from_composition`] and [`Self::run`] errors
    pub fn run_composition(
        &self,
        composition: &GovernanceObject,
        store: &dyn ObjectStore,
    ) -> Result<SimulationResult, SimulationError> {
        let graph = SimulationGraph::from_composition(composition, store)?;
        self.run(&graph)
    }
}

/// Seed of run `index`
fn run_seed(base: u64, index: usize) -> u64 {
    base ^ (index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Partial aggregate folded per worker
struct Tally {
    total_duration: u128,
    reworked_runs: Vec<u64>,
}

impl Tally {
    fn new(modules: usize) -> Self {
        Self {
            total_duration: 0,
            reworked_runs: vec![0; modules],
        }
    }

    fn add(mut self, outcome: RunOutcome) -> Self {
        self.total_duration += u128::from(outcome.total_duration());
        for (count, loops) in self.reworked_runs.iter_mut().zip(&outcome.rework) {
            if *loops > 0 {
                *count += 1;
            }
        }
        self
    }

    fn merge(mut self, other: Self) -> Self {
        self.total_duration += other.total_duration;
        for (count, more) in self.reworked_runs.iter_mut().zip(other.reworked_runs) {
            *count += more;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn fixed_duration_without_failures() {
        let params = SimulationParams::default()
            .with_duration_range(5, 5)
            .with_failure_rate(0.0);
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = simulate_run(&order(&["A", "B", "C"]), &params, &mut rng);

        assert_eq!(outcome.durations, vec![5, 5, 5]);
        assert_eq!(outcome.rework, vec![0, 0, 0]);
        assert_eq!(outcome.total_duration(), 15);
    }

    #[test]
    fn certain_failure_exhausts_loop_budget() {
        let params = SimulationParams::default()
            .with_duration_range(2, 2)
            .with_failure_rate(1.0)
            .with_max_feedback_loops(3);
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = simulate_run(&order(&["A"]), &params, &mut rng);

        assert_eq!(outcome.rework, vec![3]);
        assert_eq!(outcome.durations, vec![8]);
    }

    #[test]
    fn zero_runs_is_rejected() {
        let graph = SimulationGraph::new(&order(&["A"]), Vec::new()).unwrap();
        let err = SimulationEngine::new(SimulationParams::default())
            .with_runs(0)
            .run(&graph)
            .unwrap_err();
        assert!(matches!(err, SimulationError::InvalidParams(_)));
    }

    #[test]
    fn durations_saturate_instead_of_wrapping() {
        let params = SimulationParams::default()
            .with_duration_range(u64::MAX / 2, u64::MAX)
            .with_failure_rate(1.0)
            .with_max_feedback_loops(2);
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = simulate_run(&order(&["A", "B", "C"]), &params, &mut rng);

        assert_eq!(outcome.durations, vec![u64::MAX; 3]);
        assert_eq!(outcome.total_duration(), u64::MAX);
    }

    #[test]
    fn run_seeds_differ_per_index() {
        assert_ne!(run_seed(42, 0), run_seed(42, 1));
        assert_ne!(run_seed(42, 0), 42);
    }

    #[test]
    fn tally_merge_adds_counts() {
        let a = Tally::new(2).add(RunOutcome {
            durations: vec![1, 2],
            rework: vec![1, 0],
        });
        let b = Tally::new(2).add(RunOutcome {
            durations: vec![3, 4],
            rework: vec![2, 1],
        });
        let merged = a.merge(b);
        assert_eq!(merged.total_duration, 10);
        assert_eq!(merged.reworked_runs, vec![2, 1]);
    }
}
