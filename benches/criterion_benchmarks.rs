use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use oxilcs::engine;
use oxilcs::lcs::varint;
use oxilcs::schema::{Alternative, FieldDef, Schema, Shape};
use oxilcs::value::Value;
use std::fs;
use std::path::Path;

fn gen_data(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.push((s >> 33) as u8);
    }
    out
}

fn transfer_schema() -> Schema {
    let mut b = Schema::builder();
    b.enumeration(
        "Argument",
        [
            Alternative::new("Uint64", 0, Shape::U64),
            Alternative::new("Bytes", 1, Shape::Bytes),
            Alternative::new("String", 2, Shape::String),
        ],
    )
    .unwrap();
    b.record(
        "Transfer",
        [
            FieldDef::new("sender", Shape::Bytes).fixed_len(32),
            FieldDef::new("sequence", Shape::U64),
            FieldDef::new("args", Shape::seq(Shape::named("Argument"))),
            FieldDef::new("memo", Shape::option(Shape::String)).optional(),
        ],
    )
    .unwrap();
    b.build().unwrap()
}

fn transfers(count: usize, seed: u64) -> Value {
    let noise = gen_data(count * 40, seed);
    let items = noise
        .chunks(40)
        .enumerate()
        .map(|(i, chunk)| {
            Value::record([
                ("sender", Value::from(&chunk[..32])),
                ("sequence", Value::U64(i as u64)),
                (
                    "args",
                    Value::Seq(vec![
                        Value::variant(0, Value::U64(u64::from(chunk[32]))),
                        Value::variant(1, Value::from(&chunk[33..])),
                        Value::variant(2, Value::String(format!("transfer-{i}"))),
                    ]),
                ),
                ("memo", if i % 3 == 0 { Value::from("memo") } else { Value::Null }),
            ])
        })
        .collect();
    Value::Seq(items)
}

fn write_size_snapshot() {
    let schema = transfer_schema();
    let shape = Shape::seq(Shape::named("Transfer"));
    let mut csv = String::from("records,encoded_bytes,bytes_per_record\n");
    for count in [1usize, 16, 256, 4096] {
        let bytes = engine::encode(&schema, &shape, &transfers(count, 7)).unwrap();
        csv.push_str(&format!("{count},{},{}\n", bytes.len(), bytes.len() as f64 / count as f64));
    }
    let out_dir = Path::new("target/criterion/custom_reports");
    let _ = fs::create_dir_all(out_dir);
    let _ = fs::write(out_dir.join("size_snapshot.csv"), csv);
}

fn bench_encode_records(c: &mut Criterion) {
    write_size_snapshot();
    let schema = transfer_schema();
    let shape = Shape::seq(Shape::named("Transfer"));
    let mut g = c.benchmark_group("encode_records");
    for count in [16usize, 256, 4096] {
        let value = transfers(count, 1);
        g.throughput(Throughput::Elements(count as u64));
        g.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let bytes = engine::encode(&schema, &shape, black_box(&value)).unwrap();
                black_box(bytes);
            });
        });
    }
    g.finish();
}

fn bench_decode_records(c: &mut Criterion) {
    let schema = transfer_schema();
    let shape = Shape::seq(Shape::named("Transfer"));
    let mut g = c.benchmark_group("decode_records");
    for count in [16usize, 256, 4096] {
        let bytes = engine::encode(&schema, &shape, &transfers(count, 2)).unwrap();
        g.throughput(Throughput::Bytes(bytes.len() as u64));
        g.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let value = engine::decode(&schema, &shape, black_box(&bytes)).unwrap();
                black_box(value);
            });
        });
    }
    g.finish();
}

fn bench_byte_blobs(c: &mut Criterion) {
    let schema = Schema::empty();
    let mut g = c.benchmark_group("byte_blob_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let value = Value::Bytes(gen_data(size, 3));
        let bytes = engine::encode(&schema, &Shape::Bytes, &value).unwrap();
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::new("encode", size), &size, |b, _| {
            b.iter(|| {
                black_box(engine::encode(&schema, &Shape::Bytes, black_box(&value)).unwrap())
            });
        });
        g.bench_with_input(BenchmarkId::new("decode", size), &size, |b, _| {
            b.iter(|| {
                black_box(engine::decode(&schema, &Shape::Bytes, black_box(&bytes)).unwrap())
            });
        });
    }
    g.finish();
}

fn bench_map_canonicalization(c: &mut Criterion) {
    let schema = Schema::empty();
    let shape = Shape::map(Shape::String, Shape::U64);
    let mut g = c.benchmark_group("map_canonicalization");
    for entries in [16usize, 256, 4096] {
        let noise = gen_data(entries * 8, 4);
        let map = Value::map(noise.chunks(8).enumerate().map(|(i, chunk)| {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            (Value::String(format!("k{i:x}")), Value::U64(u64::from_le_bytes(word)))
        }));
        g.throughput(Throughput::Elements(entries as u64));
        g.bench_with_input(BenchmarkId::from_parameter(entries), &entries, |b, _| {
            b.iter(|| black_box(engine::encode(&schema, &shape, black_box(&map)).unwrap()));
        });
    }
    g.finish();
}

fn bench_varint(c: &mut Criterion) {
    let mut g = c.benchmark_group("varint");
    let values: Vec<u64> = gen_data(8 * 4096, 5)
        .chunks(8)
        .enumerate()
        .map(|(i, chunk)| {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            u64::from_le_bytes(word) >> (i % 64)
        })
        .collect();
    let mut encoded = Vec::new();
    for &v in &values {
        varint::put_u64(&mut encoded, v);
    }
    g.throughput(Throughput::Elements(values.len() as u64));
    g.bench_function("put_u64", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(encoded.len());
            for &v in &values {
                varint::put_u64(&mut out, black_box(v));
            }
            black_box(out);
        });
    });
    g.bench_function("read_u64", |b| {
        b.iter(|| {
            let mut rest = black_box(encoded.as_slice());
            let mut sum = 0u64;
            while !rest.is_empty() {
                let (v, used) = varint::read_u64(rest).unwrap();
                sum = sum.wrapping_add(v);
                rest = &rest[used..];
            }
            black_box(sum);
        });
    });
    g.finish();
}

criterion_group!(
    benches,
    bench_encode_records,
    bench_decode_records,
    bench_byte_blobs,
    bench_map_canonicalization,
    bench_varint
);
criterion_main!(benches);
