use criterion::{black_box, criterion_group, criterion_main, Criterion};
use video_tldr::llm::summary::parse_summary_response;
use video_tldr::normalize;

/// Build a transcript resembling a scraped panel: cue lines with annotations
fn sample_transcript(lines: usize) -> String {
    (0..lines)
        .map(|i| match i % 7 {
            0 => "[Music]".to_string(),
            3 => format!("so at step {} we  borrow the [Applause] value", i),
            _ => format!("line {} talks about ownership and lifetimes\n", i),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Benchmark transcript normalization on short and long transcripts
fn bench_normalize(c: &mut Criterion) {
    for lines in [100, 5_000] {
        let transcript = sample_transcript(lines);
        c.bench_function(&format!("normalize_{}_lines", lines), |b| {
            b.iter(|| normalize(black_box(&transcript)))
        });
    }
}

/// Benchmark parsing of generated TLDR responses
fn bench_parse_summary(c: &mut Criterion) {
    let response = "TLDR: Rust ownership moves values; borrowing lends them without copies.\n\
                    Keywords: ownership, borrowing, moves, lifetimes, references.";
    let cjk = "TLDR: 所有权规则保证内存安全。\nKeywords: 所有权，内存安全、借用";

    c.bench_function("parse_summary_ascii", |b| {
        b.iter(|| parse_summary_response(black_box(response)))
    });
    c.bench_function("parse_summary_cjk", |b| b.iter(|| parse_summary_response(black_box(cjk))));
}

criterion_group!(benches, bench_normalize, bench_parse_summary);
criterion_main!(benches);
