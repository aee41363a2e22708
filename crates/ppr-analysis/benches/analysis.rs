use criterion::{Criterion, criterion_group, criterion_main};
use ppr_analysis::graph::{DirectedGraph, build_from_store};
use ppr_analysis::query::shortest_path;
use ppr_analysis::recurrence::{recurring_components, strongly_connected_components};
use ppr_analysis::utilization::{UtilizationTarget, utilization_for};
use ppr_core::config::IntegrityMode;
use ppr_core::model::{Edge, Node, NodeType, ProductLine, RelationKind};
use ppr_core::store::EntityStore;
use std::hint::black_box;

/// A plant with one product feeding a chain of processes, each process
/// executed by a resource and looping back every tenth step.
fn build_plant(processes: usize) -> EntityStore {
    let mut nodes = vec![Node::new("product", NodeType::Product1)];
    let mut edges = Vec::new();

    for i in 0..processes {
        nodes.push(Node::new(format!("process_{}", i), NodeType::Process));
        nodes.push(Node::new(format!("resource_{}", i % 50), NodeType::Resource));
    }
    nodes.sort_by(|a, b| a.name.cmp(&b.name));
    nodes.dedup_by(|a, b| a.name == b.name);

    edges.push(Edge::new("product", RelationKind::InputFor, "process_0"));
    for i in 0..processes {
        let process = format!("process_{}", i);
        edges.push(Edge::new(
            process.clone(),
            RelationKind::ExecutedBy,
            format!("resource_{}", i % 50),
        ));
        if i + 1 < processes {
            edges.push(Edge::new(
                process.clone(),
                RelationKind::ConnectedTo,
                format!("process_{}", i + 1),
            ));
        }
        if i % 10 == 9 {
            edges.push(Edge::new(
                process,
                RelationKind::ConnectedTo,
                format!("process_{}", i - 9),
            ));
        }
    }

    EntityStore::from_parts(nodes, edges, Vec::new())
}

fn graph_of(store: &EntityStore) -> DirectedGraph {
    build_from_store(store, ProductLine::One, IntegrityMode::Strict)
        .unwrap_or_else(|e| panic!("bench plant is consistent: {e}"))
}

fn bench_build(c: &mut Criterion) {
    let store = build_plant(2000);

    c.bench_function("build_2000_processes", |b| {
        b.iter(|| build_from_store(black_box(&store), ProductLine::One, IntegrityMode::Strict))
    });
}

fn bench_shortest_path(c: &mut Criterion) {
    let store = build_plant(2000);
    let graph = graph_of(&store);

    c.bench_function("shortest_path_2000_processes", |b| {
        b.iter(|| shortest_path(black_box(&graph), "product", "process_1999"))
    });
}

fn bench_scc(c: &mut Criterion) {
    let store = build_plant(2000);
    let graph = graph_of(&store);

    c.bench_function("scc_2000_processes", |b| {
        b.iter(|| strongly_connected_components(black_box(&graph)))
    });
}

fn bench_recurring(c: &mut Criterion) {
    let store = build_plant(2000);
    let graph = graph_of(&store);

    c.bench_function("recurring_2000_processes", |b| {
        b.iter(|| recurring_components(black_box(&graph), "product"))
    });
}

fn bench_utilization(c: &mut Criterion) {
    let store = build_plant(2000);

    c.bench_function("resource_utilization_2000_processes", |b| {
        b.iter(|| {
            utilization_for(
                black_box(&store),
                ProductLine::One,
                UtilizationTarget::Resource,
            )
        })
    });
}

criterion_group!(
    benches,
    bench_build,
    bench_shortest_path,
    bench_scc,
    bench_recurring,
    bench_utilization,
);
criterion_main!(benches);
