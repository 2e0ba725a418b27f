use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use oxidump::diff::{DiffOptions, diff_streams};
use oxidump::dump::WordWidth;
use oxidump::stream::{DecodeOptions, DumpOptions, dump_stream, undump_stream};

fn gen_data(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.push((s >> 33) as u8);
    }
    out
}

fn dump_to_vec(data: &[u8], width: WordWidth) -> Vec<u8> {
    let opts = DumpOptions {
        width,
        ..Default::default()
    };
    let mut out = Vec::with_capacity(data.len() * 5);
    dump_stream(&mut &data[..], &mut out, &opts, None).unwrap();
    out
}

fn bench_dump(c: &mut Criterion) {
    let data = gen_data(1024 * 1024, 42);
    let mut group = c.benchmark_group("dump");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for width in WordWidth::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width:?}")),
            &data,
            |b, data| {
                b.iter(|| black_box(dump_to_vec(data, width)));
            },
        );
    }
    group.finish();
}

fn bench_undump(c: &mut Criterion) {
    let data = gen_data(1024 * 1024, 43);
    let mut group = c.benchmark_group("undump");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for width in WordWidth::ALL {
        let text = dump_to_vec(&data, width);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width:?}")),
            &text,
            |b, text| {
                b.iter(|| {
                    let mut out = Vec::with_capacity(data.len());
                    undump_stream(
                        &mut &text[..],
                        &mut out,
                        &DecodeOptions::default(),
                        None,
                    )
                    .unwrap();
                    black_box(out)
                });
            },
        );
    }
    group.finish();
}

fn bench_diff(c: &mut Criterion) {
    let a = gen_data(1024 * 1024, 44);
    let mut b_side = a.clone();
    for i in (0..b_side.len()).step_by(4096) {
        b_side[i] = b_side[i].wrapping_add(1);
    }
    let mut group = c.benchmark_group("diff");
    group.throughput(Throughput::Bytes(a.len() as u64));
    group.bench_function("sparse_changes", |bench| {
        bench.iter(|| {
            let mut out = Vec::new();
            diff_streams(
                &mut &a[..],
                &mut &b_side[..],
                &mut out,
                &DiffOptions::default(),
                None,
            )
            .unwrap();
            black_box(out)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_dump, bench_undump, bench_diff);
criterion_main!(benches);
