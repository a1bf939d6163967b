//! Benchmarks comparing Telegram HTML conversion vs pulldown-cmark HTML rendering
//!
//! Run with: cargo bench -p telemark-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pulldown_cmark::{html, Options, Parser as MdParser};
use telemark_core::inline::{convert_style, Style};
use telemark_core::link::convert_links;
use telemark_core::Converter;

/// A typical assistant answer
const ANSWER_SAMPLE: &str = r#"# Introduction

This is a paragraph with *emphasis*, **strong text**, and `inline code`.
It demonstrates the ||usual|| mix of ~~old~~ new formatting.

## Lists

- First item with some content
- Second item with __underlined__ content
  * Nested item concluding the list

1. Step one of the process
2. Step two continues

## Code Example

```rust
fn fibonacci(n: u64) -> u64 {
    match n {
        0 => 0,
        1 => 1,
        _ => fibonacci(n - 1) + fibonacci(n - 2),
    }
}
```

## Quote

> The best code is no code at all.
> Every line of code you write is a liability.

**>Expandable details
>hidden by default

See [the docs [v2]](https://example.com/docs?a=1&b=2) for more, and note that 2 * 3 = 6.【4:0†source】
"#;

fn render_markdown(input: &str) -> String {
    let parser = MdParser::new_ext(input, Options::all());
    let mut out = String::with_capacity(input.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    let converter = Converter::new();

    group.throughput(Throughput::Bytes(ANSWER_SAMPLE.len() as u64));

    group.bench_function("telemark", |b| {
        b.iter(|| {
            let html = converter.convert(black_box(ANSWER_SAMPLE)).unwrap();
            black_box(html.len())
        })
    });

    group.bench_function("markdown_pulldown", |b| {
        b.iter(|| {
            let html = render_markdown(black_box(ANSWER_SAMPLE));
            black_box(html.len())
        })
    });

    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");
    let converter = Converter::new();

    for size in [1, 5, 10, 20].iter() {
        let content: String = ANSWER_SAMPLE.repeat(*size);

        group.throughput(Throughput::Bytes(content.len() as u64));

        group.bench_with_input(BenchmarkId::new("telemark", size), &content, |b, content| {
            b.iter(|| {
                let html = converter.convert(black_box(content)).unwrap();
                black_box(html.len())
            })
        });

        group.bench_with_input(BenchmarkId::new("markdown", size), &content, |b, content| {
            b.iter(|| {
                let html = render_markdown(black_box(content));
                black_box(html.len())
            })
        });
    }

    group.finish();
}

fn bench_inline(c: &mut Criterion) {
    let mut group = c.benchmark_group("inline");

    let inline = "This has *emphasis*, **strong**, `code`, [link](https://example.com), and ~~strike~~.";

    group.bench_function("telemark_bold", |b| {
        b.iter(|| black_box(convert_style(black_box(inline), Style::Bold).len()))
    });

    group.bench_function("telemark_links", |b| {
        b.iter(|| black_box(convert_links(black_box(inline)).len()))
    });

    group.bench_function("telemark_full", |b| {
        b.iter(|| black_box(telemark_core::convert(black_box(inline)).len()))
    });

    group.bench_function("markdown_inline", |b| {
        b.iter(|| black_box(render_markdown(black_box(inline)).len()))
    });

    group.finish();
}

fn bench_pathological(c: &mut Criterion) {
    let mut group = c.benchmark_group("pathological");

    let unclosed = "*a ".repeat(10_000);
    let brackets = "[[]".repeat(10_000);

    group.throughput(Throughput::Bytes(unclosed.len() as u64));
    group.bench_function("unclosed_italic", |b| {
        b.iter(|| black_box(telemark_core::convert(black_box(&unclosed)).len()))
    });

    group.throughput(Throughput::Bytes(brackets.len() as u64));
    group.bench_function("bracket_soup", |b| {
        b.iter(|| black_box(telemark_core::convert(black_box(&brackets)).len()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_convert,
    bench_scaling,
    bench_inline,
    bench_pathological
);
criterion_main!(benches);
