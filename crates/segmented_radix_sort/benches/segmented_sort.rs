use std::hint::black_box;
use std::time::{Duration, Instant};

use bench::{
    SegmentShape, apply_runtime_config_for, default_rng, random_below_bits, random_segment_offsets,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use segmented_radix_sort::{
    DoubleBuffer, SegmentedRadixSortConfig, Segments, SortOptions, Stream, TemporaryStorage,
    sort_keys_double_buffer, sort_pairs,
};

const SEGMENT_COUNTS: [usize; 3] = [256, 4096, 32768];

const SHAPES: [SegmentShape; 3] = [
    SegmentShape::Fixed(48),
    SegmentShape::Uniform { max: 256 },
    SegmentShape::Skewed {
        short_max: 32,
        long_len: 4096,
        long_every: 64,
    },
];

fn bench_pairs(c: &mut Criterion) {
    let stream = Stream::new();
    for &shape in &SHAPES {
        let mut group =
            c.benchmark_group(format!("segmented_sort/pairs_u32_u32/{}", shape.label()));
        for &segments in &SEGMENT_COUNTS {
            let mut rng = default_rng();
            let offsets = random_segment_offsets(&mut rng, segments, shape);
            let n = offsets[segments] as usize;
            let keys: Vec<u32> = (0..n)
                .map(|_| random_below_bits(&mut rng, 32) as u32)
                .collect();
            let values: Vec<u32> = (0..n as u32).collect();
            let segs = Segments::from_offsets(&offsets);
            apply_runtime_config_for(&mut group, n);

            let base = SegmentedRadixSortConfig::for_types::<u32, u32>();
            let variants = [
                ("classified", base.with_partitioning_threshold(1)),
                ("uniform", base.with_warp_sort(None)),
            ];
            for (label, config) in variants {
                let options = SortOptions::default().config(config);
                let mut size = 0;
                let mut keys_out = vec![0_u32; n];
                let mut values_out = vec![0_u32; n];
                let query = sort_pairs(
                    None,
                    &mut size,
                    &keys,
                    &mut keys_out,
                    &values,
                    &mut values_out,
                    &segs,
                    &options,
                    &stream,
                );
                if query.is_err() {
                    continue;
                }
                let mut storage = TemporaryStorage::allocate(size);

                group.bench_function(BenchmarkId::new(label, segments), |bencher| {
                    bencher.iter_custom(|iters| {
                        let mut total = Duration::ZERO;
                        for _ in 0..iters {
                            let start = Instant::now();
                            let result = sort_pairs(
                                Some(storage.as_bytes_mut()),
                                &mut size,
                                &keys,
                                &mut keys_out,
                                &values,
                                &mut values_out,
                                &segs,
                                &options,
                                &stream,
                            );
                            total += start.elapsed();
                            black_box((&result, &keys_out));
                        }
                        total
                    });
                });
            }
        }
        group.finish();
    }
}

fn bench_keys_double_buffer(c: &mut Criterion) {
    let stream = Stream::new();
    let mut group = c.benchmark_group("segmented_sort/keys_u64_double_buffer");
    for &segments in &SEGMENT_COUNTS {
        let mut rng = default_rng();
        let offsets =
            random_segment_offsets(&mut rng, segments, SegmentShape::Uniform { max: 128 });
        let n = offsets[segments] as usize;
        let base: Vec<u64> = (0..n).map(|_| random_below_bits(&mut rng, 40)).collect();
        let segs = Segments::from_offsets(&offsets);
        apply_runtime_config_for(&mut group, n);

        for bits in [20_u32, 40] {
            let options = SortOptions::default().bits(0..bits);
            let id = BenchmarkId::new(format!("bits_{bits}"), segments);
            group.bench_function(id, |bencher| {
                bencher.iter_custom(|iters| {
                    let mut total = Duration::ZERO;
                    let mut storage = TemporaryStorage::default();
                    for _ in 0..iters {
                        let mut current = base.clone();
                        let mut alternate = vec![0_u64; n];
                        let mut buffer = DoubleBuffer::new(&mut current, &mut alternate);
                        let mut size = 0;
                        let start = Instant::now();
                        let query = sort_keys_double_buffer(
                            None,
                            &mut size,
                            &mut buffer,
                            &segs,
                            &options,
                            &stream,
                        );
                        if query.is_ok() && storage.len() < size {
                            storage = TemporaryStorage::allocate(size);
                        }
                        let result = sort_keys_double_buffer(
                            Some(storage.as_bytes_mut()),
                            &mut size,
                            &mut buffer,
                            &segs,
                            &options,
                            &stream,
                        );
                        total += start.elapsed();
                        black_box((&result, buffer.current()));
                    }
                    total
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_pairs, bench_keys_double_buffer);
criterion_main!(benches);
