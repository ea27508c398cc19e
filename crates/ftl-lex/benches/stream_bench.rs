//! Benchmarks for the stream cursor over realistic FTL input.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ftl_lex::Stream;
use ftl_util::accel::{AccelChoice, SliceTerm, Source};

fn corpus() -> String {
    let mut s = String::new();
    for i in 0..300 {
        s.push_str(&format!(
            "entry-{i} = Some text before {{ $arg }} and after\n    continuation line {i}\n\n"
        ));
    }
    s
}

fn walk_slices(src: &Source, choice: AccelChoice) -> usize {
    let mut stream = Stream::new(src, choice);
    let mut slices = 0;
    while stream.has_remaining() {
        match stream.text_slice() {
            Ok(slice) => {
                if slice.term == SliceTerm::OpenBrace {
                    stream.inc();
                }
                slices += 1;
            }
            Err(_) => stream.inc(),
        }
    }
    slices
}

fn bench_text_slices(c: &mut Criterion) {
    let text = corpus();
    let src = Source::new(text.as_bytes());
    let mut group = c.benchmark_group("stream_text_slices");
    for (label, choice) in [
        ("scalar", AccelChoice::Scalar),
        ("simd", AccelChoice::Simd),
        ("auto", AccelChoice::Auto),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(label), &src, |b, src| {
            b.iter(|| walk_slices(black_box(src), choice))
        });
    }
    group.finish();
}

fn bench_blank_blocks(c: &mut Criterion) {
    let mut text = String::new();
    for _ in 0..200 {
        text.push_str("   \n\n  \r\nx\n");
    }
    let src = Source::new(text.as_bytes());
    let mut group = c.benchmark_group("stream_blank_blocks");
    for (label, choice) in [("scalar", AccelChoice::Scalar), ("auto", AccelChoice::Auto)] {
        group.bench_with_input(BenchmarkId::from_parameter(label), &src, |b, src| {
            b.iter(|| {
                let mut stream = Stream::new(black_box(src), choice);
                let mut blanks = 0usize;
                while stream.has_remaining() {
                    blanks += stream.skip_blank_block();
                    stream.skip_to_eol();
                    stream.skip_eol();
                }
                blanks
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_text_slices, bench_blank_blocks);
criterion_main!(benches);
