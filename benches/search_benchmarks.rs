//! Benchmarks for find and replace.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ted_buffer::TextBuffer;
use ted_core::search::{self, SearchFlags};

/// Generates a large text string for benchmarking.
fn generate_large_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("Line {}: This is a sample line of text for benchmarking purposes.\n", i))
        .collect()
}

/// Benchmarks a find that has to wrap around.
fn bench_find_with_wrap(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_with_wrap");

    for size in [100, 1000, 10000].iter() {
        let buffer = TextBuffer::from(generate_large_text(*size));
        let near_end = buffer.len_chars() - 10;

        group.bench_with_input(BenchmarkId::new("match_case", size), &buffer, |b, buffer| {
            let flags = SearchFlags {
                match_case: true,
                whole_word: false,
            };
            b.iter(|| search::find_with_wrap(buffer, black_box("sample"), flags, near_end))
        });

        group.bench_with_input(BenchmarkId::new("ignore_case", size), &buffer, |b, buffer| {
            b.iter(|| {
                search::find_with_wrap(buffer, black_box("SAMPLE"), SearchFlags::default(), near_end)
            })
        });
    }

    group.finish();
}

/// Benchmarks a find that never matches.
fn bench_not_found(c: &mut Criterion) {
    let buffer = TextBuffer::from(generate_large_text(10000));
    let flags = SearchFlags {
        match_case: false,
        whole_word: true,
    };

    c.bench_function("find_not_found_whole_word", |b| {
        b.iter(|| search::find_with_wrap(&buffer, black_box("absent"), flags, 0))
    });
}

/// Benchmarks replace-all with growing and shrinking replacements.
fn bench_replace_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("replace_all");
    let base_text = generate_large_text(1000);

    for (name, replacement) in [("shrink", "L"), ("grow", "Line Line")] {
        group.bench_function(name, |b| {
            b.iter_with_setup(
                || TextBuffer::from(base_text.as_str()),
                |mut buffer| {
                    let result =
                        search::replace_all(&mut buffer, "Line", replacement, SearchFlags::default())
                            .unwrap();
                    black_box(result)
                },
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_find_with_wrap, bench_not_found, bench_replace_all);

criterion_main!(benches);
