use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jass_core::codec::Codec;

const CODECS: [Codec; 11] = [
    Codec::VByte,
    Codec::StreamVByte,
    Codec::Simple9,
    Codec::Simple16,
    Codec::RelativeTen,
    Codec::Carryover12,
    Codec::Carry8b,
    Codec::EliasGamma,
    Codec::EliasDelta,
    Codec::BitPack32,
    Codec::Qmx,
];

/// Small ascending gaps, representative of D-gap-encoded DocID lists.
fn gap_sequence(n: usize) -> Vec<u32> {
    (1..=n as u32).map(|i| 1 + (i % 7)).collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_encode");
    let xs = gap_sequence(1024);
    for codec in CODECS {
        group.bench_with_input(BenchmarkId::from_parameter(codec.name()), &xs, |b, xs| {
            let mut buf = vec![0u8; xs.len() * 5 + 64];
            b.iter(|| {
                black_box(codec.encode(&mut buf, black_box(xs)));
            });
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_decode");
    let xs = gap_sequence(1024);
    for codec in CODECS {
        let mut buf = vec![0u8; xs.len() * 5 + 64];
        let written = codec.encode(&mut buf, &xs);
        buf.truncate(written);
        group.bench_with_input(BenchmarkId::from_parameter(codec.name()), &buf, |b, buf| {
            let mut dst = vec![0u32; xs.len()];
            b.iter(|| {
                black_box(codec.decode(&mut dst, black_box(buf)).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
