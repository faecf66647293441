use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use nodegate_core::{CircuitGraph, Evaluator, NodeId, NodeKind, SocketId};

/// An Input followed by `length` NOT gates and an Output.
fn not_chain(length: usize) -> (CircuitGraph, NodeId) {
    let mut graph = CircuitGraph::new();
    let mut previous = graph.add_node(NodeKind::Input, 0.0, 0.0);
    for step in 1..=length {
        let not = graph.add_node(NodeKind::Not, step as f64 * 150.0, 0.0);
        graph
            .connect(SocketId::output(previous), SocketId::input(not, 0))
            .unwrap_or_else(|err| panic!("chain wiring failed: {err}"));
        previous = not;
    }
    let out = graph.add_node(NodeKind::Output, (length + 1) as f64 * 150.0, 0.0);
    graph
        .connect(SocketId::output(previous), SocketId::input(out, 0))
        .unwrap_or_else(|err| panic!("chain wiring failed: {err}"));
    (graph, out)
}

fn resolve_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_not_chain");
    for length in [16, 128, 1024] {
        let (graph, out) = not_chain(length);
        group.bench_with_input(BenchmarkId::from_parameter(length), &out, |b, &out| {
            b.iter(|| Evaluator::new(&graph).display(black_box(out)))
        });
    }
    group.finish();
}

fn downstream_chain(c: &mut Criterion) {
    let (graph, _) = not_chain(1024);
    let root = [NodeId::from(0)];
    c.bench_function("downstream_not_chain_1024", |b| b.iter(|| graph.downstream(black_box(&root))));
}

criterion_group!(benches, resolve_chain, downstream_chain);
criterion_main!(benches);
