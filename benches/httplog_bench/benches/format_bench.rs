//! Format chain benchmarks
//!
//! Measures the per-record cost of the HTTP, filter and mask formats.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use httplog_formats::format::{FilterOptions, HttpOptions, MaskOptions};
use httplog_formats::mask::{MaskEngine, MaskPolicy, Severity};
use httplog_formats::{FilterFormat, Format, FormatChain, HttpFormat, LogRecord, MaskFormat};
use serde_json::{json, Value};

fn response_record() -> LogRecord {
    LogRecord::with_message(
        "debug",
        json!({
            "status": 200,
            "statusText": "OK",
            "headers": {"content-type": "application/json", "content-length": "3513"},
            "data": {"items": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]},
            "config": {
                "url": "/items",
                "method": "get",
                "baseURL": "https://api.example.com/",
                "headers": {"Accept": "application/json", "User-Agent": "axios/1.3.3"}
            },
            "responseTime": 42,
            "isAxiosResponse": true
        }),
    )
}

/// Nested object `depth` levels deep with `width` string leaves per level
fn nested(depth: usize, width: usize) -> Value {
    let mut node = serde_json::Map::new();
    for i in 0..width {
        node.insert(format!("field{i}"), json!(format!("value-{i}-secret")));
    }
    if depth > 0 {
        node.insert("child".to_string(), nested(depth - 1, width));
    }
    Value::Object(node)
}

fn bench_http_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("http_format");

    let summary_only = HttpFormat::default();
    group.bench_function("summary_only", |b| {
        b.iter(|| summary_only.transform(black_box(response_record())))
    });

    let with_meta = HttpFormat::new(HttpOptions::default().meta(true));
    group.bench_function("with_meta", |b| {
        b.iter(|| with_meta.transform(black_box(response_record())))
    });

    group.finish();
}

fn bench_mask_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask_engine");

    for depth in [1, 4, 8] {
        let tree = nested(depth, 8);
        for severity in [Severity::Partial, Severity::Strict] {
            let engine = MaskEngine::new(MaskPolicy::new(severity).white_list(["field0"]));
            group.bench_with_input(
                BenchmarkId::new(severity.as_str(), depth),
                &tree,
                |b, tree| b.iter(|| engine.mask(black_box(tree.clone()))),
            );
        }
    }

    group.finish();
}

fn bench_full_chain(c: &mut Criterion) {
    let chain = FormatChain::new()
        .with(HttpFormat::new(HttpOptions::default().meta(true)))
        .with(FilterFormat::new(
            FilterOptions::default().black_list(["req.headers", "res.data"]),
        ))
        .with(MaskFormat::new(
            MaskOptions::default().white_list(["req.url", "req.method", "res.status"]),
        ));

    c.bench_function("full_chain", |b| {
        b.iter(|| chain.transform(black_box(response_record())))
    });
}

criterion_group!(benches, bench_http_format, bench_mask_engine, bench_full_chain);
criterion_main!(benches);
