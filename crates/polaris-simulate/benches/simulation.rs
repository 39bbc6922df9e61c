use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use polaris_compose::TypedEdge;
use polaris_simulate::{simulate_run, SimulationEngine, SimulationGraph, SimulationParams};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

fn layered_graph(width: usize, depth: usize) -> SimulationGraph {
    let id = |layer: usize, i: usize| format!("mod-{layer}-{i}");
    let modules: Vec<String> = (0..depth)
        .flat_map(|layer| (0..width).map(move |i| id(layer, i)))
        .collect();
    let edges = (1..depth)
        .flat_map(|layer| {
            (0..width).map(move |i| TypedEdge::dependency(id(layer - 1, i), id(layer, (i + 1) % width)))
        })
        .collect();
    SimulationGraph::new(&modules, edges).expect("layered graph is acyclic")
}

fn bench_single_run(c: &mut Criterion) {
    let graph = layered_graph(10, 10);
    let params = SimulationParams::default();
    let mut rng = StdRng::seed_from_u64(1);
    c.bench_function("simulate_run_100_modules", |b| {
        b.iter(|| black_box(simulate_run(graph.order(), &params, &mut rng)));
    });
}

fn bench_engine(c: &mut Criterion) {
    let graph = layered_graph(10, 10);
    let mut group = c.benchmark_group("engine");
    for runs in [100usize, 1000] {
        let engine = SimulationEngine::new(SimulationParams::default())
            .with_runs(runs)
            .with_seed(7);
        group.bench_function(BenchmarkId::from_parameter(runs), |b| {
            b.iter(|| black_box(engine.run(&graph).expect("valid params")));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_run, bench_engine);
criterion_main!(benches);
