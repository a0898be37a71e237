use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use engine::Engine;
use tempfile::tempdir;

const N_KEYS: usize = 1_000;
const VALUE_SIZE: usize = 100;

fn filled_engine(dir: &std::path::Path) -> Engine {
    let mut engine = Engine::open(dir, false).unwrap();
    engine.set_merge_trigger(0);
    for i in 0..N_KEYS {
        engine
            .put(format!("todo_{}", i).into_bytes(), vec![b'x'; VALUE_SIZE])
            .unwrap();
    }
    engine
}

fn put_benchmark(c: &mut Criterion) {
    c.bench_function("engine_put_1k_unsynced", |b| {
        b.iter_batched(
            || tempdir().unwrap(),
            |dir| {
                let _engine = filled_engine(dir.path());
            },
            BatchSize::SmallInput,
        );
    });
}

fn get_benchmark(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let engine = filled_engine(dir.path());

    c.bench_function("engine_get_hit_1k", |b| {
        let mut i = 0usize;
        b.iter(|| {
            let key = format!("todo_{}", i % N_KEYS);
            i += 1;
            engine.get(key.as_bytes()).unwrap()
        });
    });
}

fn reopen_benchmark(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    drop(filled_engine(dir.path()));

    c.bench_function("engine_reopen_replay_1k", |b| {
        b.iter(|| Engine::open(dir.path(), false).unwrap());
    });
}

criterion_group!(benches, put_benchmark, get_benchmark, reopen_benchmark);
criterion_main!(benches);
