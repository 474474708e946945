//! Benchmarks for name decoding and single-archive extraction.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use sjunzip_core::ExtractConfig;
use sjunzip_core::LegacyEncoding;
use sjunzip_core::NoopProgress;
use sjunzip_core::extraction::Extractor;
use sjunzip_core::formats::ZipSource;
use sjunzip_core::test_utils::LegacyZipBuilder;
use sjunzip_core::types::DestDir;
use std::hint::black_box;
use std::io::Cursor;
use tempfile::TempDir;

/// Creates an archive with many small files under Shift_JIS names.
fn create_many_small_files_zip(file_count: usize) -> Vec<u8> {
    (0..file_count)
        .fold(LegacyZipBuilder::new(), |builder, i| {
            builder.add_file(
                &format!("資料/ファイル{i:05}.txt"),
                format!("content{i}").as_bytes(),
                0o644,
            )
        })
        .build()
}

/// Creates an archive with a single large file.
fn create_large_file_zip(size_bytes: usize) -> Vec<u8> {
    LegacyZipBuilder::new()
        .add_file("大きい.bin", &vec![0xAB_u8; size_bytes], 0o644)
        .build()
}

fn extract_in_memory(data: &[u8]) {
    let temp = TempDir::new().unwrap();
    let dest = DestDir::new(temp.path()).unwrap();
    let source = ZipSource::new(Cursor::new(data)).unwrap();
    Extractor::new(source, dest, ExtractConfig::default())
        .run(&mut NoopProgress)
        .unwrap();
}

fn benchmark_decode(c: &mut Criterion) {
    let encoding = LegacyEncoding::shift_jis();
    let ascii = b"docs/manual/chapter01/section02.txt".to_vec();
    let sjis = encoding
        .encode("ドキュメント/説明書/第一章/表示ソフト.txt")
        .unwrap();

    let mut group = c.benchmark_group("decode_name");
    group.bench_function("ascii", |b| b.iter(|| encoding.decode(black_box(&ascii))));
    group.bench_function("shift_jis", |b| {
        b.iter(|| encoding.decode(black_box(&sjis)));
    });
    group.finish();
}

fn benchmark_many_small_files(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_small_files");

    for file_count in [100, 1000] {
        let zip_data = create_many_small_files_zip(file_count);
        group.throughput(Throughput::Elements(file_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(file_count),
            &zip_data,
            |b, data| b.iter(|| extract_in_memory(data)),
        );
    }

    group.finish();
}

fn benchmark_large_files(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_files");

    for size_mb in [1, 10] {
        let size_bytes = size_mb * 1024 * 1024;
        let zip_data = create_large_file_zip(size_bytes);
        group.throughput(Throughput::Bytes(size_bytes as u64));
        group.bench_with_input(
            BenchmarkId::new("size_mb", size_mb),
            &zip_data,
            |b, data| b.iter(|| extract_in_memory(data)),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_decode,
    benchmark_many_small_files,
    benchmark_large_files
);
criterion_main!(benches);
