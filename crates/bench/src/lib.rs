use std::time::Duration;

use criterion::BenchmarkGroup;
use criterion::measurement::Measurement;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SMALL_RUNTIME_SAMPLE_SIZE: usize = 15;
const SMALL_RUNTIME_WARM_UP_MS: u64 = 100;
const SMALL_RUNTIME_MEASURE_MS: u64 = 200;
const MEDIUM_RUNTIME_SAMPLE_SIZE: usize = 15;
const MEDIUM_RUNTIME_WARM_UP_MS: u64 = 500;
const MEDIUM_RUNTIME_MEASURE_MS: u64 = 1000;
const LARGE_RUNTIME_SAMPLE_SIZE: usize = 10;
const LARGE_RUNTIME_WARM_UP_MS: u64 = 800;
const LARGE_RUNTIME_MEASURE_MS: u64 = 1500;
const RNG_SEED: u64 = 0x5EED_2026;

pub fn apply_small_runtime_config<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    group.sample_size(SMALL_RUNTIME_SAMPLE_SIZE);
    group.warm_up_time(Duration::from_millis(SMALL_RUNTIME_WARM_UP_MS));
    group.measurement_time(Duration::from_millis(SMALL_RUNTIME_MEASURE_MS));
}

pub fn apply_medium_runtime_config<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    group.sample_size(MEDIUM_RUNTIME_SAMPLE_SIZE);
    group.warm_up_time(Duration::from_millis(MEDIUM_RUNTIME_WARM_UP_MS));
    group.measurement_time(Duration::from_millis(MEDIUM_RUNTIME_MEASURE_MS));
}

pub fn apply_large_runtime_config<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    group.sample_size(LARGE_RUNTIME_SAMPLE_SIZE);
    group.warm_up_time(Duration::from_millis(LARGE_RUNTIME_WARM_UP_MS));
    group.measurement_time(Duration::from_millis(LARGE_RUNTIME_MEASURE_MS));
}

/// Picks a preset by the number of elements one iteration sorts.
pub fn apply_runtime_config_for<M: Measurement>(group: &mut BenchmarkGroup<'_, M>, items: usize) {
    match items {
        0..=65_536 => apply_small_runtime_config(group),
        65_537..=1_048_576 => apply_medium_runtime_config(group),
        _ => apply_large_runtime_config(group),
    }
}

pub fn default_rng() -> StdRng {
    StdRng::seed_from_u64(RNG_SEED)
}

/// Uniform value below `2^bits`.
pub fn random_below_bits<R: Rng + ?Sized>(rng: &mut R, bits: u32) -> u64 {
    match bits {
        0 => 0,
        bits if bits >= u64::BITS => rng.random(),
        bits => rng.random_range(0..1_u64 << bits),
    }
}

/// How segment lengths are drawn.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SegmentShape {
    /// Every segment has the same length.
    Fixed(u32),
    /// Lengths drawn uniformly from `0..=max`.
    Uniform { max: u32 },
    /// Mostly short segments with an occasional long one.
    Skewed {
        short_max: u32,
        long_len: u32,
        long_every: usize,
    },
}

impl SegmentShape {
    pub fn label(self) -> String {
        match self {
            Self::Fixed(len) => format!("fixed_{len}"),
            Self::Uniform { max } => format!("uniform_0_{max}"),
            Self::Skewed {
                short_max,
                long_len,
                long_every,
            } => format!("skewed_{short_max}_{long_len}_every_{long_every}"),
        }
    }
}

/// `segments + 1` ascending offsets starting at zero.
pub fn random_segment_offsets<R: Rng + ?Sized>(
    rng: &mut R,
    segments: usize,
    shape: SegmentShape,
) -> Vec<u32> {
    let mut offsets = Vec::with_capacity(segments + 1);
    let mut end = 0_u32;
    offsets.push(end);
    for i in 0..segments {
        let len = match shape {
            SegmentShape::Fixed(len) => len,
            SegmentShape::Uniform { max } => rng.random_range(0..=max),
            SegmentShape::Skewed {
                short_max,
                long_len,
                long_every,
            } => {
                if long_every != 0 && i % long_every == 0 {
                    long_len
                } else {
                    rng.random_range(0..=short_max)
                }
            }
        };
        end += len;
        offsets.push(end);
    }
    offsets
}
