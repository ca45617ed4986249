// crates/pytutor/benches/generator_bench.rs
//
// Two Criterion benchmark groups:
//   generate    — single-example generation per topic and complexity
//   batch       — the five-example batch a topic selection produces

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pytutor::{generate, generate_batch, GENERATOR_TOPICS};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn single_examples(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for topic in GENERATOR_TOPICS {
        for complexity in [1u8, 2] {
            group.bench_function(format!("{topic}_c{complexity}"), |b| {
                let mut rng = StdRng::seed_from_u64(0);
                b.iter(|| generate(&mut rng, black_box(topic), black_box(complexity)));
            });
        }
    }
    group.finish();
}

fn topic_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    for topic in GENERATOR_TOPICS {
        group.bench_function(format!("{topic}_x5"), |b| {
            let mut rng = StdRng::seed_from_u64(0);
            b.iter(|| generate_batch(&mut rng, black_box(topic), black_box(5)));
        });
    }
    group.finish();
}

criterion_group!(benches, single_examples, topic_batches);
criterion_main!(benches);
