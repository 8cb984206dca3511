//! Hot-path benchmarks: key resolution and repeated field reads.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use untui_core::{Event, Store};
use untui_runtime::{ComponentScope, Shape, ShapeBinding, ShapeMap, resolve_key};

fn wide_map() -> ShapeMap {
    let mut map = ShapeMap::new();
    for i in 0..32 {
        map = map.with_unit(format!("$store{i}"), &Store::new(i as i64));
    }
    map = map.with_unit("clicked", &Event::<()>::new());
    map.with_value("limit", 99u32)
}

fn bench_resolve_key(c: &mut Criterion) {
    let map = wide_map();
    c.bench_function("resolve_key/literal", |b| {
        b.iter(|| black_box(resolve_key(&map, black_box("clicked"))));
    });
    c.bench_function("resolve_key/sigil_alias", |b| {
        b.iter(|| black_box(resolve_key(&map, black_box("store17"))));
    });
    c.bench_function("resolve_key/missing", |b| {
        b.iter(|| black_box(resolve_key(&map, black_box("absent"))));
    });
}

fn bench_field_reads(c: &mut Criterion) {
    let scope = ComponentScope::detached();
    let binding = ShapeBinding::new(&scope);
    let shape = Shape::map(wide_map());
    let view = binding.resolve(&shape).map().expect("map shape");

    // First read wires the field; steady-state reads only re-read the value.
    let _ = view.get("store0");
    c.bench_function("bound_shape/wired_store_read", |b| {
        b.iter(|| black_box(view.get(black_box("store0")).value::<i64>()));
    });
    c.bench_function("bound_shape/missing_read", |b| {
        b.iter(|| black_box(view.get(black_box("absent")).is_missing()));
    });
}

fn bench_resolve(c: &mut Criterion) {
    let scope = ComponentScope::detached();
    let binding = ShapeBinding::new(&scope);
    let shape = Shape::map(wide_map());
    let _ = binding.resolve(&shape);

    c.bench_function("shape_binding/resolve_memoized", |b| {
        b.iter(|| black_box(binding.resolve(black_box(&shape)).map().is_some()));
    });
}

criterion_group!(benches, bench_resolve_key, bench_field_reads, bench_resolve);
criterion_main!(benches);
