//! Cache-hit revalidation cost of a memoized reference.
//!
//! The hot path of the engine is not recomputation but deciding that no
//! recomputation is needed: one combinator walk plus an integer compare.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};

use vigil_core::object::{Object, Shape, Value};
use vigil_core::reference::MemoizedReference;
use vigil_core::track::TrackedStorage;

const KEYS: [&str; 4] = ["a", "b", "c", "d"];

fn revalidate_hit(c: &mut Criterion) {
    let storage = Arc::new(TrackedStorage::new());
    let mut shape = Shape::new();
    for key in KEYS {
        shape.mark_tracked(key);
    }
    let object = Object::new(Arc::clone(&storage), Arc::new(shape));
    for key in KEYS {
        object.set(key, Value::Int(1));
    }

    let subject = object.clone();
    let sum = MemoizedReference::new(move || {
        KEYS.into_iter()
            .map(|key| match subject.get(key) {
                Value::Int(n) => n,
                _ => 0,
            })
            .sum::<i64>()
    });
    sum.value();

    c.bench_function("memo_cache_hit", |b| b.iter(|| black_box(sum.value())));

    c.bench_function("memo_invalidate_and_recompute", |b| {
        b.iter(|| {
            object.set("a", Value::Int(2));
            black_box(sum.value())
        })
    });
}

criterion_group!(benches, revalidate_hit);
criterion_main!(benches);
