//! Benchmarks for relational filter evaluation.
//!
//! Measures:
//! - Memoized evaluation vs resolving the referent on every subject
//! - Compiled composite expressions vs per-fragment closure chains

use cadfilter::model::{Drawing, Entity, EntityKind, Layer};
use cadfilter::{Expr, KeySelector, ObjectFilter, Resolve};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::rc::Rc;

const LAYER_COUNT: u64 = 8;

/// A drawing with a handful of layers and many entities spread across them
fn build_drawing(entity_count: usize) -> Rc<Drawing> {
    let mut drawing = Drawing::new();
    let mut handles = Vec::new();
    for i in 0..LAYER_COUNT {
        let mut layer = Layer::new(format!("L{}", i));
        if i % 2 == 0 {
            layer.lock();
        }
        handles.push(drawing.add_layer(layer).unwrap());
    }
    for i in 0..entity_count {
        let layer = handles[i % handles.len()];
        drawing.add_entity(Entity::new(EntityKind::Line).on_layer(layer));
    }
    Rc::new(drawing)
}

fn layer_key() -> KeySelector<Entity> {
    KeySelector::new("entity.layer", |e: &Entity| e.layer)
}

fn bench_memoized_vs_direct(c: &mut Criterion) {
    let mut group = c.benchmark_group("layer_predicate");
    for entity_count in [100usize, 1_000, 10_000] {
        let drawing = build_drawing(entity_count);

        group.bench_with_input(
            BenchmarkId::new("memoized", entity_count),
            &entity_count,
            |b, _| {
                b.iter(|| {
                    let filter = ObjectFilter::new(
                        Rc::clone(&drawing),
                        layer_key(),
                        Expr::new(|layer: &Layer| !layer.is_locked()),
                    )
                    .unwrap();
                    let mut matched = 0usize;
                    for e in drawing.entities() {
                        if filter.is_match(black_box(e)).unwrap() {
                            matched += 1;
                        }
                    }
                    black_box(matched)
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("direct", entity_count),
            &entity_count,
            |b, _| {
                b.iter(|| {
                    let mut matched = 0usize;
                    for e in drawing.entities() {
                        let layer: Layer = drawing.resolve(black_box(&e.layer)).unwrap();
                        if !layer.is_locked() {
                            matched += 1;
                        }
                    }
                    black_box(matched)
                })
            },
        );
    }
    group.finish();
}

fn bench_compiled_composition(c: &mut Criterion) {
    let drawing = build_drawing(1_000);

    c.bench_function("compiled_composite_of_8_fragments", |b| {
        b.iter(|| {
            let filter = ObjectFilter::new(
                Rc::clone(&drawing),
                layer_key(),
                Expr::new(|layer: &Layer| !layer.is_locked()),
            )
            .unwrap();
            for i in 0..8u8 {
                filter
                    .and(Expr::new(move |e: &Entity| e.handle.value() as u8 != i))
                    .unwrap();
            }
            let mut matched = 0usize;
            for e in drawing.entities() {
                if filter.is_match(black_box(e)).unwrap() {
                    matched += 1;
                }
            }
            black_box(matched)
        })
    });
}

criterion_group!(benches, bench_memoized_vs_direct, bench_compiled_composition);
criterion_main!(benches);
