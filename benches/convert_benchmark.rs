//! Benchmarks for bidocx conversion performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic mixed-script documents.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bidocx::text::TextNormalizer;
use bidocx::{convert, convert_many, render, RenderConfig};

/// Creates a synthetic document with the given number of sections.
fn create_test_text(sections: usize) -> String {
    let mut text = String::new();

    for i in 0..sections {
        text.push_str(&format!("## بخش {}\n", i + 1));
        text.push_str("این یک **پاراگراف** نمونه با کلمات English و عدد ۱۲۳ است.\n");
        text.push_str("می خواهم مقدار $\\alpha + \\beta$ را حساب کنم.\n");
        text.push_str("| نام | مقدار | واحد |\n|---|---|---|\n");
        for row in 0..5 {
            text.push_str(&format!("| ردیف {} | {} | kg |\n", row, row * 10));
        }
        text.push_str(&format!("جدول {}: نتایج\n\n", i + 1));
        text.push_str("$$\\frac{1}{2} x^2 \\leq y$$\n\n");
    }

    text
}

/// Benchmark normalization of a single long line.
fn bench_normalize(c: &mut Criterion) {
    let config = RenderConfig::default();
    let normalizer = TextNormalizer::new(&config);
    let line = "مي خواهم  كتاب را ببينم ، و English text ".repeat(20);

    c.bench_function("normalize_line", |b| {
        b.iter(|| normalizer.normalize(black_box(&line)));
    });
}

/// Benchmark assembly at various sizes.
fn bench_convert(c: &mut Criterion) {
    let config = RenderConfig::default();
    let mut group = c.benchmark_group("convert");

    for sections in [1, 10, 50].iter() {
        let text = create_test_text(*sections);

        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter(|| convert(black_box(&text), &config).unwrap());
        });
    }

    group.finish();
}

/// Benchmark package serialization.
fn bench_docx(c: &mut Criterion) {
    let config = RenderConfig::default();
    let conversion = convert(&create_test_text(10), &config).unwrap();

    c.bench_function("docx_10_sections", |b| {
        b.iter(|| render::to_docx_bytes(black_box(&conversion.tree), &config).unwrap());
    });
}

/// Benchmark parallel batch conversion.
fn bench_batch(c: &mut Criterion) {
    let config = RenderConfig::default();
    let inputs: Vec<String> = (0..16).map(|_| create_test_text(5)).collect();

    c.bench_function("convert_many_16", |b| {
        b.iter(|| convert_many(black_box(&inputs), &config));
    });
}

criterion_group!(benches, bench_normalize, bench_convert, bench_docx, bench_batch);
criterion_main!(benches);
