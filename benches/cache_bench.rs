use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fetchnet::http::responsebody::ResponseBody;
use fetchnet::{CacheTag, ResponseCache, ResponseValue};
use std::time::Duration;

fn populated(count: usize) -> ResponseCache {
    let cache = ResponseCache::new(None);
    let ttl = Duration::from_secs(600);
    for i in 0..count {
        let tags: Vec<CacheTag> = vec!["users".into(), format!("user:{i}").into()];
        cache.set(
            format!("/api/users/{i}"),
            ResponseValue::Body(ResponseBody::Text(format!("user {i}"))),
            &tags,
            ttl,
        );
    }
    cache
}

fn benchmark_cache_get(c: &mut Criterion) {
    let cache = populated(1000);

    c.bench_function("cache_get_hit", |b| {
        b.iter(|| cache.get(black_box("/api/users/500")))
    });
    c.bench_function("cache_get_miss", |b| {
        b.iter(|| cache.get(black_box("/api/users/missing")))
    });
}

fn benchmark_cache_invalidate(c: &mut Criterion) {
    let literal: Vec<CacheTag> = vec!["user:500".into()];
    let pattern = vec![CacheTag::pattern("^user:5\\d\\d$").unwrap()];

    c.bench_function("cache_delete_by_literal_tag", |b| {
        b.iter_batched(
            || populated(1000),
            |cache| cache.delete_by_tags(black_box(&literal)),
            criterion::BatchSize::SmallInput,
        )
    });
    c.bench_function("cache_delete_by_pattern_tag", |b| {
        b.iter_batched(
            || populated(1000),
            |cache| cache.delete_by_tags(black_box(&pattern)),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, benchmark_cache_get, benchmark_cache_invalidate);
criterion_main!(benches);
