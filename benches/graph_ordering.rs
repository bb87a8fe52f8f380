//! Namespace graph benchmarks.
//!
//! Measures load-order computation and route relevance on layered catalogs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use lexiload::catalog::{GraphRoles, Namespace, NamespaceGraph, Priority};

/// Layered catalog: every namespace depends on the first two namespaces of
/// the previous layer of eight.
fn layered_graph(size: usize) -> NamespaceGraph {
    let names: Vec<String> = (0..size).map(|i| format!("ns{i}")).collect();
    let mut namespaces = vec![Namespace::new(&names[0], Priority::Critical)];
    for i in 1..size {
        let priority = match i % 4 {
            0 => Priority::Critical,
            1 => Priority::High,
            2 => Priority::Normal,
            _ => Priority::Low,
        };
        let layer_start = (i / 8).saturating_sub(1) * 8;
        let mut deps = vec![names[layer_start].as_str()];
        if layer_start + 1 < i {
            deps.push(names[layer_start + 1].as_str());
        }
        let pattern = format!("/section{}*", i % 16);
        namespaces.push(
            Namespace::new(&names[i], priority)
                .depends_on(&deps)
                .with_routes(&[pattern.as_str()])
                .expect("valid pattern")
                .with_size(1024),
        );
    }
    let roles = GraphRoles {
        base: names[0].clone(),
        auth: names.get(1).cloned(),
    };
    NamespaceGraph::new(namespaces, roles).expect("acyclic catalog")
}

fn bench_load_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimized_load_order");

    for size in [16usize, 128, 1024] {
        let graph = layered_graph(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::new("namespaces", size), |b| {
            b.iter(|| black_box(graph.optimized_load_order(black_box(true))))
        });
    }

    group.finish();
}

fn bench_relevant_namespaces(c: &mut Criterion) {
    let mut group = c.benchmark_group("relevant_namespaces");

    for size in [16usize, 128, 1024] {
        let graph = layered_graph(size);
        group.bench_function(BenchmarkId::new("namespaces", size), |b| {
            b.iter(|| black_box(graph.relevant_namespaces(black_box("/section7/detail"))))
        });
    }

    group.finish();
}

fn bench_graph_construction(c: &mut Criterion) {
    c.bench_function("graph_construction_256", |b| {
        b.iter(|| black_box(layered_graph(256)))
    });
}

criterion_group!(
    benches,
    bench_load_order,
    bench_relevant_namespaces,
    bench_graph_construction
);
criterion_main!(benches);
