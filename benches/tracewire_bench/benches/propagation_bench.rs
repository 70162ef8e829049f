//! Identifier generation and metadata propagation benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tracewire_core::{
    collapse_multi_value, extract_b3, CallContext, EchoService, HelloRequest, HelloService,
    IdGenerator, MetadataBundle, RandomIdGenerator, RandomStrategy, SequentialIdGenerator,
    SharedIdGenerator, TraceId,
};

fn bundle(keys: usize, values_per_key: usize) -> MetadataBundle {
    let mut md = MetadataBundle::new();
    for k in 0..keys {
        for v in 0..values_per_key {
            md.append(format!("x-key-{}", k), format!("value-{}", v));
        }
    }
    md
}

/// Benchmark one trace + span draw per strategy
fn bench_generators(c: &mut Criterion) {
    let mut group = c.benchmark_group("id_generation");

    group.bench_function("sequential", |b| {
        let mut ids = SequentialIdGenerator::new();
        b.iter(|| {
            let trace = ids.next_trace_id();
            black_box(ids.next_span_id(trace))
        })
    });

    for strategy in [
        RandomStrategy::Random64,
        RandomStrategy::Random128,
        RandomStrategy::Timestamped,
    ] {
        group.bench_function(format!("{:?}", strategy).to_lowercase(), |b| {
            let mut ids = RandomIdGenerator::with_seed(strategy, 1);
            b.iter(|| {
                let trace = ids.next_trace_id();
                black_box(ids.next_span_id(trace))
            })
        });
    }

    group.bench_function("shared_sequential", |b| {
        let ids = SharedIdGenerator::new(SequentialIdGenerator::new());
        b.iter(|| black_box(ids.next_span_id(TraceId::default())))
    });

    group.finish();
}

/// Benchmark collapsing bundles of increasing size
fn bench_collapse(c: &mut Criterion) {
    let mut group = c.benchmark_group("collapse_multi_value");

    for keys in [1, 8, 32].iter() {
        let md = bundle(*keys, 3);
        group.bench_with_input(BenchmarkId::new("keys", keys), &md, |b, md| {
            b.iter(|| collapse_multi_value(black_box(md)))
        });
    }

    group.finish();
}

/// Benchmark the full handler path and B3 extraction
fn bench_handler(c: &mut Criterion) {
    let mut group = c.benchmark_group("handler");

    let mut md = bundle(8, 2);
    md.insert("x-b3-traceid", "463ac35c9f6413ad48485a3953bb6124");
    md.insert("x-b3-spanid", "a2fb4a1d1a96d312");
    md.insert("x-b3-sampled", "1");

    group.bench_function("extract_b3", |b| b.iter(|| extract_b3(black_box(&md))));

    let ctx = CallContext::with_metadata(md.clone());
    group.bench_function("echo", |b| {
        b.iter(|| EchoService.hello(black_box(&ctx), HelloRequest::new("hi")))
    });

    group.finish();
}

criterion_group!(benches, bench_generators, bench_collapse, bench_handler);
criterion_main!(benches);
