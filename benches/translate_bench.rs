use std::{borrow::Cow, hint::black_box, time::Duration};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use glyphic::{Composer, preset};

const SAMPLES: &[(&str, &str)] = &[
    ("ascii", "The quick brown fox jumps over the lazy dog. 0123456789"),
    ("mixed", "Grüße aus Köln! Ελληνικά, русский, 日本語 and emoji 🇳🇿🎉"),
    ("cjk", "東京都渋谷区神南一丁目の天気は晴れのち曇りです"),
    ("punctuation", "wait... what?! (really) [yes] {no} <maybe> ~ok~"),
];

fn composer_for(bundles: &[&str], flatten: bool) -> Composer {
    let mut composer = Composer::builder()
        .repository("builtin", preset::repository())
        .flatten(flatten)
        .build();
    for name in bundles {
        let key = composer.load(name, 0).unwrap();
        composer.push_op(&key, None).unwrap();
    }
    composer
}

fn bench_presets(c: &mut Criterion) {
    for preset in ["wide", "circled", "strike", "boxed", "flip"] {
        let mut group = c.benchmark_group(preset);
        let composer = composer_for(&[preset], true);
        for &(label, text) in SAMPLES {
            group.throughput(Throughput::Bytes(text.len() as u64));
            group.bench_with_input(BenchmarkId::new("translate", label), text, |b, t| {
                b.iter(|| composer.translate(black_box(t)).unwrap())
            });
        }
        group.finish();
    }
}

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");
    let text = SAMPLES[0].1;
    for flatten in [true, false] {
        let composer = composer_for(&["circled", "wide"], flatten);
        group.bench_function(BenchmarkId::new("circled+wide", flatten), |b| {
            b.iter(|| composer.translate(black_box(text)).unwrap())
        });
    }
    group.finish();
}

fn bench_zero_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("zero_copy");
    let composer = composer_for(&["circled"], true);
    let text = "日本語のテキストだけ";
    let mut zero_copy_hits = 0usize;
    let mut total = 0usize;
    group.bench_function("untouched", |b| {
        b.iter(|| {
            total += 1;
            let result = composer.translate(black_box(text)).unwrap();
            if matches!(result, Cow::Borrowed(s) if s.as_ptr() == text.as_ptr()) {
                zero_copy_hits += 1;
            }
        })
    });
    println!("   ZERO-COPY {zero_copy_hits}/{total}");
    group.finish();
}

fn bench_load(c: &mut Criterion) {
    c.bench_function("load_flip_uncached", |b| {
        b.iter(|| {
            let mut composer = composer_for(&[], true);
            composer.load(black_box("flip"), 0).unwrap()
        })
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(2))
        .warm_up_time(Duration::from_secs(1));
    targets = bench_presets, bench_flatten, bench_zero_copy, bench_load
);
criterion_main!(benches);
