use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jetpack_sourcemap::{vlq, MappingItem, OriginalLocation, SourceMapGenerator};

fn encode_values(c: &mut Criterion) {
  c.bench_function("vlq encode", |b| {
    let mut out = String::with_capacity(1 << 16);
    b.iter(|| {
      out.clear();
      for value in -2048..2048 {
        vlq::write_vlq(&mut out, black_box(value));
      }
    })
  });
}

fn encode_mappings(c: &mut Criterion) {
  let mut generator = SourceMapGenerator::new("bench.js");
  generator.add_source("bench-source.js", "");
  generator.add_items((0..50_000u32).map(|idx| MappingItem {
    name: String::new(),
    origin: OriginalLocation {
      file_id: 0,
      line: idx / 8,
      column: (idx % 8) * 6,
    },
    dist_line: idx / 10 + 1,
    dist_column: (idx % 10) * 4,
  }));
  c.bench_function("encode 50k mappings", |b| {
    b.iter(|| black_box(generator.encode_mappings()))
  });
}

criterion_group!(benches, encode_values, encode_mappings);
criterion_main!(benches);
