use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use dbnet::{DynamicBayesianNetwork, Node, TabularCpd};

type EdgeSpec = ((String, i64), (String, i64));

/// Chain X0 -> X1 -> ... within the slice.
fn intra_chain(len: usize) -> Vec<EdgeSpec> {
    (1..len)
        .map(|i| ((format!("X{}", i - 1), 0), (format!("X{i}"), 0)))
        .collect()
}

/// Intra-slice chain plus a persistence edge per variable.
fn chain_edges(len: usize) -> Vec<EdgeSpec> {
    let mut edges = intra_chain(len);
    edges.extend((0..len).map(|i| ((format!("X{i}"), 0), (format!("X{i}"), 1))));
    edges
}

fn bench_admission(c: &mut Criterion) {
    let mut group = c.benchmark_group("structure/add_edges_from");
    for len in [16usize, 64, 256] {
        let edges = chain_edges(len);
        group.throughput(Throughput::Elements(edges.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &edges, |b, edges| {
            b.iter(|| {
                let dbn = DynamicBayesianNetwork::from_edges(edges.iter().cloned()).unwrap();
                black_box(dbn.edge_count())
            });
        });
    }
    group.finish();
}

fn bench_moralize(c: &mut Criterion) {
    let mut group = c.benchmark_group("structure/moralize");
    for len in [16usize, 64, 256] {
        let dbn = DynamicBayesianNetwork::from_edges(chain_edges(len)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(len), &dbn, |b, dbn| {
            b.iter(|| black_box(dbn.moralize().edge_count()));
        });
    }
    group.finish();
}

fn bench_completion(c: &mut Criterion) {
    c.bench_function("structure/initialize_initial_state/64", |b| {
        b.iter_batched(
            || {
                let mut dbn = DynamicBayesianNetwork::from_edges(intra_chain(64)).unwrap();
                dbn.add_cpd(TabularCpd::prior(Node::current("X0"), vec![0.5, 0.5]).unwrap())
                    .unwrap();
                for i in 1..64 {
                    let cpd = TabularCpd::new(
                        Node::current(format!("X{i}")),
                        2,
                        vec![vec![0.9, 0.2], vec![0.1, 0.8]],
                        vec![Node::current(format!("X{}", i - 1))],
                        vec![2],
                    )
                    .unwrap();
                    dbn.add_cpd(cpd).unwrap();
                }
                dbn
            },
            |mut dbn| black_box(dbn.initialize_initial_state().unwrap().len()),
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_admission, bench_moralize, bench_completion);
criterion_main!(benches);
