use chaos_box::halfwidth::{convert_line, convert_text};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

const SAMPLE: &str = "他说：“你好（朋友）…”，然后走了。【注意】这里有《书名》！真的吗？\n";
const PLAIN: &str = "A line of plain ASCII prose, with nothing for the converter to do.\n";

fn bench_convert_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_line");
    for (name, line) in [("punctuated", SAMPLE), ("plain", PLAIN)] {
        group.throughput(Throughput::Bytes(line.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &line, |b, line| {
            b.iter(|| convert_line(black_box(line)));
        });
    }
    group.finish();
}

fn bench_convert_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_text");
    for lines in [16, 256, 4096] {
        let text = SAMPLE.repeat(lines);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &text, |b, text| {
            b.iter(|| convert_text(black_box(text)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_convert_line, bench_convert_text);
criterion_main!(benches);
