//! Subcommand handlers
//!
//! Every handler returns the JSON document to print; `main` owns stdout.

use crate::cli::{ComposeArgs, CompositionArg, SimulateArgs};
use crate::config::PolarisConfig;
use anyhow::{bail, Context};
use polaris_compose::{compose, ComposeRequest};
use polaris_interpret::{diagnose_composition, interpret};
use polaris_memory::{load_dir, write_object, GovernanceObject, MemoryStore, ObjectStore};
use polaris_simulate::{SimulationEngine, SimulationGraph};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

fn open_store(dir: &Path) -> anyhow::Result<MemoryStore> {
    let store =
        load_dir(dir).with_context(|| format!("failed to load memory from {}", dir.display()))?;
    tracing::info!(dir = %dir.display(), objects = store.len(), "memory loaded");
    Ok(store)
}

fn fetch(store: &dyn ObjectStore, id: &str) -> anyhow::Result<GovernanceObject> {
    match store.get_by_id(id) {
        Some(obj) => Ok(obj),
        None => bail!("object {id} not found in memory"),
    }
}

pub(crate) fn run_compose(config: &PolarisConfig, args: &ComposeArgs) -> anyhow::Result<Value> {
    let store = open_store(&config.memory_dir)?;
    let constraints = fs::read_to_string(&args.constraints).with_context(|| {
        format!("failed to read constraints {}", args.constraints.display())
    })?;

    let version = args
        .version
        .clone()
        .unwrap_or_else(|| config.default_version.clone());
    let request = ComposeRequest::new(&args.jurisdiction, &args.title)
        .with_version(version)
        .with_created_by(&args.created_by)
        .with_constraints_json(&constraints)?;

    let outcome = compose(&store, &request)?;
    for diagnostic in outcome.diagnostics.iter() {
        tracing::debug!(?diagnostic, "compose diagnostic");
    }

    if args.save {
        let path = write_object(&config.memory_dir, &outcome.composition)?;
        tracing::info!(path = %path.display(), "composition saved");
    }

    Ok(json!({
        "composition": outcome.composition,
        "order": outcome.validated.topological_order(),
        "diagnostics": outcome.diagnostics,
    }))
}

pub(crate) fn run_interpret(config: &PolarisConfig, args: &CompositionArg) -> anyhow::Result<Value> {
    let store = open_store(&config.memory_dir)?;
    let composition = fetch(&store, &args.composition)?;
    let interpretation = interpret(&composition, &store)?;
    Ok(serde_json::to_value(interpretation)?)
}

pub(crate) fn run_diagnose(config: &PolarisConfig, args: &CompositionArg) -> anyhow::Result<Value> {
    let store = open_store(&config.memory_dir)?;
    let composition = fetch(&store, &args.composition)?;
    let report = diagnose_composition(&composition, &store)?;
    Ok(serde_json::to_value(report)?)
}

pub(crate) fn run_simulate(config: &PolarisConfig, args: &SimulateArgs) -> anyhow::Result<Value> {
    let store = open_store(&config.memory_dir)?;
    let composition = fetch(&store, &args.composition)?;

    let defaults = &config.simulation;
    let mut params = defaults.params;
    let (min, max) = params.task_duration_range;
    params = params.with_duration_range(args.min.unwrap_or(min), args.max.unwrap_or(max));
    if let Some(rate) = args.failure_rate {
        params = params.with_failure_rate(rate);
    }
    if let Some(loops) = args.max_loops {
        params = params.with_max_feedback_loops(loops);
    }

    let mut engine =
        SimulationEngine::new(params).with_runs(args.runs.unwrap_or(defaults.runs));
    if let Some(seed) = args.seed.or(defaults.seed) {
        engine = engine.with_seed(seed);
    }

    let graph = SimulationGraph::from_composition(&composition, &store)?;
    for diagnostic in graph.diagnostics().iter() {
        tracing::warn!(?diagnostic, "simulation input adjusted");
    }
    let result = engine.run(&graph)?;
    tracing::info!(seed = result.seed, "rerun with --seed to reproduce");
    Ok(serde_json::to_value(result)?)
}
