use std::hint::black_box;
use std::io::Write;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tempfile::NamedTempFile;

use ply_reader::read_ply_vertices;

fn write_binary_ply(num_points: usize, with_timestamps: bool) -> NamedTempFile {
    let mut header = format!(
        "ply\nformat binary_little_endian 1.0\nelement vertex {num_points}\nproperty float x\nproperty float y\nproperty float z\nproperty uchar red\nproperty uchar green\nproperty uchar blue\n"
    );
    if with_timestamps {
        header.push_str("property double timestamp\n");
    }
    header.push_str("end_header\n");

    let mut bytes = header.into_bytes();
    for i in 0..num_points {
        let v = i as f32;
        for c in [v, v * 0.5, -v] {
            bytes.extend_from_slice(&c.to_le_bytes());
        }
        bytes.extend_from_slice(&[255, 128, 0]);
        if with_timestamps {
            bytes.extend_from_slice(&(i as f64 * 1e-4).to_le_bytes());
        }
    }

    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(&bytes).expect("write temp file");
    file
}

fn bench_read_ply_vertices(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_ply_vertices");

    for num_points in [10_000, 100_000, 1_000_000].iter() {
        group.throughput(criterion::Throughput::Elements(*num_points as u64));

        for with_timestamps in [false, true] {
            let file = write_binary_ply(*num_points, with_timestamps);
            let name = if with_timestamps { "xyzt" } else { "xyz" };
            group.bench_with_input(
                BenchmarkId::new(name, num_points),
                &file,
                |b, file| b.iter(|| black_box(read_ply_vertices(file.path()).expect("decode"))),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_read_ply_vertices);
criterion_main!(benches);
