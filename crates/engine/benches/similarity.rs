//! Benchmarks for the similarity engine and scoring path.
//!
//! Run with: cargo bench --package engine
//!
//! Uses a synthetic basket history (seeded, so runs are comparable)
//! sized like a mid-size retail catalog.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use data_loader::PurchaseEvent;
use engine::{InteractionMatrixBuilder, RecommendationScorer, SimilarityEngine, Snapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const NUM_CUSTOMERS: u32 = 2_000;
const NUM_ITEMS: u32 = 500;
const BASKET_SIZE: usize = 20;

fn synthetic_events() -> Vec<PurchaseEvent> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut events = Vec::with_capacity(NUM_CUSTOMERS as usize * BASKET_SIZE);

    for customer in 1..=NUM_CUSTOMERS {
        for _ in 0..BASKET_SIZE {
            let item = rng.gen_range(0..NUM_ITEMS);
            events.push(PurchaseEvent::new(customer, format!("{item:05}"), 1));
        }
    }
    events
}

fn bench_similarity_compute(c: &mut Criterion) {
    let events = synthetic_events();
    let matrix = InteractionMatrixBuilder::build(&events);
    let engine = SimilarityEngine::new();

    c.bench_function("similarity_compute", |b| {
        b.iter(|| {
            let similarity = engine.compute(black_box(&matrix));
            black_box(similarity)
        })
    });
}

fn bench_matrix_build(c: &mut Criterion) {
    let events = synthetic_events();

    c.bench_function("interaction_matrix_build", |b| {
        b.iter(|| {
            let matrix = InteractionMatrixBuilder::build(black_box(&events));
            black_box(matrix)
        })
    });
}

fn bench_recommend(c: &mut Criterion) {
    let events = synthetic_events();
    let snapshot = Snapshot::build(&events);

    c.bench_function("recommend_top_10", |b| {
        b.iter(|| {
            let recs = RecommendationScorer::recommend(
                black_box(1),
                snapshot.interactions(),
                snapshot.similarity(),
                black_box(10),
            )
            .unwrap();
            black_box(recs)
        })
    });
}

criterion_group!(
    benches,
    bench_similarity_compute,
    bench_matrix_build,
    bench_recommend
);
criterion_main!(benches);
