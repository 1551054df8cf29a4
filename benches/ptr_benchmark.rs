use criterion::{black_box, criterion_group, criterion_main, Criterion};
use custody::{ExclusivePtr, SharedPtr};
use std::sync::Arc;

fn bench_exclusive_ownership(c: &mut Criterion) {
    let mut group = c.benchmark_group("Exclusive Ownership");

    // std baseline
    group.bench_function("Box allocate+drop", |b| {
        b.iter(|| drop(black_box(Box::new(42u64))));
    });

    group.bench_function("ExclusivePtr allocate+drop", |b| {
        b.iter(|| drop(black_box(ExclusivePtr::new(42u64))));
    });

    group.bench_function("ExclusivePtr deref", |b| {
        let owner = ExclusivePtr::new(42u64);
        b.iter(|| {
            // Safety: owner is non-empty for the whole run
            unsafe { *black_box(&owner).deref() }
        });
    });

    group.bench_function("ExclusivePtr swap", |b| {
        let mut left = ExclusivePtr::new(1u64);
        let mut right = ExclusivePtr::new(2u64);
        b.iter(|| {
            left.swap(black_box(&mut right));
        });
    });

    group.finish();
}

fn bench_shared_ownership(c: &mut Criterion) {
    let mut group = c.benchmark_group("Shared Ownership");

    // std baseline
    group.bench_function("Arc clone+drop", |b| {
        let origin = Arc::new(42u64);
        b.iter(|| drop(black_box(origin.clone())));
    });

    group.bench_function("SharedPtr clone+drop", |b| {
        let origin = SharedPtr::new(42u64);
        b.iter(|| drop(black_box(origin.clone())));
    });

    group.bench_function("SharedPtr owner_count", |b| {
        let origin = SharedPtr::new(42u64);
        let _witness = origin.clone();
        b.iter(|| black_box(origin.owner_count()));
    });

    group.bench_function("SharedPtr allocate+drop", |b| {
        b.iter(|| drop(black_box(SharedPtr::new(42u64))));
    });

    group.finish();
}

criterion_group!(benches, bench_exclusive_ownership, bench_shared_ownership);
criterion_main!(benches);
