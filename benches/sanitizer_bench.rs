/// Sanitizer throughput benchmarks
/// Measures each sink on benign text and on attack-heavy payloads
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lexguard::api::middleware::input_sanitization::{MarkupLevel, SanitizationContext, Sanitizer};
use serde_json::json;
use std::hint::black_box;
use std::time::Duration;

fn benign_text(size: usize) -> String {
    "The client requests a review of the estate plan. "
        .chars()
        .cycle()
        .take(size)
        .collect()
}

fn hostile_text(size: usize) -> String {
    "<script>alert(1)</script><img src=x onerror=alert(1)><a href=\"javascript:void(0)\">x</a>"
        .chars()
        .cycle()
        .take(size)
        .collect()
}

fn markup_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("markup");
    group.measurement_time(Duration::from_secs(5));

    for size in [256, 4 * 1024, 64 * 1024].iter() {
        let size = *size;
        group.throughput(Throughput::Bytes(size as u64));

        let benign = benign_text(size);
        let hostile = hostile_text(size);

        for level in [MarkupLevel::Strict, MarkupLevel::Basic, MarkupLevel::Rich] {
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}/benign", level), size),
                &benign,
                |b, input| b.iter(|| Sanitizer::sanitize_markup(black_box(input), level)),
            );
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}/hostile", level), size),
                &hostile,
                |b, input| b.iter(|| Sanitizer::sanitize_markup(black_box(input), level)),
            );
        }
    }

    group.finish();
}

fn context_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("contexts");
    let input = format!("{} john.doe+x@gmail.com https://firm.example/a?b=1", hostile_text(512));

    for context in SanitizationContext::ALL {
        group.bench_with_input(
            BenchmarkId::new("sanitize", format!("{:?}", context)),
            &input,
            |b, input| b.iter(|| Sanitizer::sanitize(black_box(input), *context)),
        );
    }

    group.finish();
}

fn structured_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("structured");

    let document = json!({
        "client": { "name": "<b>Jane</b> Roe", "notes": hostile_text(1024) },
        "matters": (0..50)
            .map(|i| json!({ "id": i, "summary": benign_text(128) }))
            .collect::<Vec<_>>(),
    });

    group.bench_function("sanitize_deep", |b| {
        b.iter(|| Sanitizer::sanitize_deep(black_box(document.clone()), 0))
    });

    let serialized = document.to_string();
    group.bench_function("sanitize_json", |b| {
        b.iter(|| Sanitizer::sanitize_json(black_box(&serialized)))
    });

    group.bench_function("search_query", |b| {
        b.iter(|| {
            Sanitizer::sanitize_search_query(black_box(
                "estate'; DROP TABLE cases; -- /* planning */ union select",
            ))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    markup_benchmarks,
    context_benchmarks,
    structured_benchmarks
);
criterion_main!(benches);
