//! Benchmarks for the resolver and the function cache.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ftl_par::parse_default;
use ftl_rt::{Bundle, FluentArgs, LruFunctionCache, NullFunctionCache};
use std::sync::Arc;

fn bundle(cache_on: bool) -> Bundle {
    let ftl = "\
simple = A plain value\n\
interpolated = Hello there, { $name }!\n\
plural = { $count ->\n    [one] one item\n   *[other] { $count } items\n}\n\
tuned = { NUMBER($count, minimumFractionDigits: 2) } units\n\
-brand = { $case ->\n   *[nominative] Example\n    [genitive] Example's\n}\n\
nested = Welcome to { -brand(case: \"genitive\") } world\n";
    let resource = parse_default(ftl.as_bytes());
    assert!(resource.errors.is_empty(), "{:?}", resource.errors);
    let mut builder = Bundle::builder().locale("en-US".parse().unwrap());
    if cache_on {
        builder = builder.cache(Arc::new(LruFunctionCache::default()));
    } else {
        builder = builder.cache(Arc::new(NullFunctionCache));
    }
    builder.add_resource(&resource).unwrap();
    builder.build()
}

fn bench_format_paths(c: &mut Criterion) {
    let bundle = bundle(true);
    let mut args = FluentArgs::new();
    args.set("name", "Billy");
    args.set("count", 5);

    let mut group = c.benchmark_group("format");
    group.bench_function("simple", |b| {
        b.iter(|| bundle.format(black_box("simple"), &args))
    });
    group.bench_function("interpolated", |b| {
        b.iter(|| bundle.format(black_box("interpolated"), &args))
    });
    group.bench_function("plural_select", |b| {
        b.iter(|| bundle.format(black_box("plural"), &args))
    });
    group.bench_function("term_with_args", |b| {
        b.iter(|| bundle.format(black_box("nested"), &args))
    });
    group.finish();
}

fn bench_cache_effect(c: &mut Criterion) {
    let cached = bundle(true);
    let uncached = bundle(false);
    let mut args = FluentArgs::new();
    args.set("count", 3);

    let mut group = c.benchmark_group("function_cache");
    group.bench_function("lru", |b| {
        b.iter(|| cached.format(black_box("tuned"), &args))
    });
    group.bench_function("null", |b| {
        b.iter(|| uncached.format(black_box("tuned"), &args))
    });
    group.finish();
}

criterion_group!(benches, bench_format_paths, bench_cache_effect);
criterion_main!(benches);
