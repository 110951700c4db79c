use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use library_catalog::{Catalog, Queue, Sequence, Stack};
use rand::{Rng, SeedableRng, distr::Alphanumeric, rngs::StdRng};

fn random_titles(count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count).map(|_| (0..12).map(|_| char::from(rng.sample(Alphanumeric))).collect()).collect()
}

fn catalog_with(titles: &[String]) -> Catalog {
    let mut catalog = Catalog::new();
    for title in titles {
        assert!(catalog.add_book(title, "Benchmark Author").is_ok());
    }
    catalog
}

fn bench_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog");

    for size in [100, 1_000, 10_000] {
        let titles = random_titles(size);

        group.bench_with_input(BenchmarkId::new("add_book", size), &titles, |b, titles| {
            b.iter(|| catalog_with(black_box(titles)));
        });

        let catalog = catalog_with(&titles);
        group.bench_with_input(BenchmarkId::new("find_by_title", size), &titles, |b, titles| {
            let mut rng = StdRng::seed_from_u64(7);
            b.iter(|| {
                let title = &titles[rng.random_range(0..titles.len())];
                black_box(catalog.find_by_title(title))
            });
        });

        group.bench_with_input(BenchmarkId::new("find_by_id", size), &catalog, |b, catalog| {
            let mut rng = StdRng::seed_from_u64(7);
            let upper = u32::try_from(size).unwrap_or(u32::MAX);
            b.iter(|| black_box(catalog.find_by_id(rng.random_range(1..=upper))));
        });

        group.bench_with_input(BenchmarkId::new("list_by_title", size), &catalog, |b, catalog| {
            b.iter(|| black_box(catalog.list_by_title()));
        });
    }

    group.finish();
}

fn bench_lending(c: &mut Criterion) {
    let mut group = c.benchmark_group("lending");

    group.bench_function("borrow_return_undo", |b| {
        let mut catalog = catalog_with(&random_titles(1_000));
        let mut rng = StdRng::seed_from_u64(11);
        b.iter(|| {
            let id = rng.random_range(1..=1_000);
            if catalog.borrow_now("reader", id).is_err() {
                drop(catalog.return_now("reader", id));
            }
            if rng.random::<bool>() {
                drop(catalog.undo_last());
            }
        });
    });

    group.bench_function("request_and_process", |b| {
        let mut catalog = catalog_with(&random_titles(1_000));
        let mut rng = StdRng::seed_from_u64(13);
        b.iter(|| {
            drop(catalog.request_borrow("reader", rng.random_range(1..=1_000)));
            black_box(catalog.process_next_request())
        });
    });

    group.finish();
}

fn bench_containers(c: &mut Criterion) {
    let mut group = c.benchmark_group("containers");

    group.bench_function("sequence_push_remove_front", |b| {
        b.iter(|| {
            let mut sequence: Sequence<u32> = (0..1_000).collect();
            while sequence.remove(0).is_ok() {}
            black_box(sequence.capacity())
        });
    });

    group.bench_function("queue_enqueue_dequeue", |b| {
        let mut queue = Queue::new();
        b.iter(|| {
            queue.enqueue(1);
            black_box(queue.dequeue())
        });
    });

    group.bench_function("stack_push_pop", |b| {
        let mut stack = Stack::new();
        b.iter(|| {
            stack.push(1);
            black_box(stack.pop())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_catalog, bench_lending, bench_containers);
criterion_main!(benches);
