use std::{hint::black_box, time::Duration};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glyphic::{Lookup, OffsetLookup, RangeTable, TranslationMap};

fn wide_map() -> TranslationMap {
    (0x21u32..=0x7E)
        .filter_map(|cp| char::from_u32(cp + 0xFEE0).map(|c| (cp, c.to_string())))
        .collect()
}

fn bench_single_lookups(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    let offset = OffsetLookup::new(0x21, 0x7E, 0xFEE0).unwrap();
    let map = wide_map();
    let keys: Vec<u32> = (0x20..=0x7F).collect();

    group.bench_function("offset", |b| {
        b.iter(|| {
            for &k in &keys {
                let _ = black_box(offset.lookup(black_box(k)));
            }
        })
    });
    group.bench_function("map", |b| {
        b.iter(|| {
            for &k in &keys {
                black_box(map.get_code_point(black_box(k)));
            }
        })
    });
    group.finish();
}

fn bench_range_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_table");
    for ranges in [4usize, 64, 1024] {
        let bounds: Vec<u32> = (0..ranges as u32).flat_map(|i| [i * 10, i * 10 + 5]).collect();
        let table = RangeTable::with_default(bounds, "\u{FFFC}\u{20DE}".to_string())
            .unwrap()
            .with_copy_key(true);
        let top = ranges as u32 * 10;
        group.bench_with_input(BenchmarkId::new("lookup", ranges), &table, |b, t| {
            b.iter(|| {
                for k in (0..top).step_by(3) {
                    let _ = black_box(t.lookup(black_box(k)));
                }
            })
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(2))
        .warm_up_time(Duration::from_secs(1));
    targets = bench_single_lookups, bench_range_tables
);
criterion_main!(benches);
