use std::fmt;
use std::mem::size_of;
use std::ops::Range;

use bytemuck::Pod;

use crate::buffer::{DoubleBuffer, Placement, ResultLocation};
use crate::classify::SegmentClassifier;
use crate::config::SegmentedRadixSortConfig;
use crate::device::Stream;
use crate::error::{Result, SortError};
use crate::key::RadixKey;
use crate::partition::{DEFAULT_PARTITIONER, SegmentPartitioner};
use crate::schedule::RadixSchedule;
use crate::segment::{SegmentOffset, Segments};
use crate::storage::{Region, StorageLayout, StorageRequest, zero_sized_slice};
use crate::strategy::{
    LargeSegmentStrategy, RadixPasses, SegmentStrategy, SegmentView, SmallSegmentStrategy,
    UniformStrategy, segment_views,
};

/// Per-call knobs.
///
/// ```
/// use segmented_radix_sort::SortOptions;
///
/// let options = SortOptions::default().bits(0..12).debug_synchronous(true);
/// assert!(format!("{options:?}").contains("end_bit: Some(12)"));
/// ```
#[derive(Clone, Copy, Default)]
pub struct SortOptions<'p> {
    begin_bit: u32,
    end_bit: Option<u32>,
    debug_synchronous: bool,
    config: Option<SegmentedRadixSortConfig>,
    partitioner: Option<&'p dyn SegmentPartitioner>,
}

impl<'p> SortOptions<'p> {
    /// Sort only on the key bits in `range`; defaults to the whole key.
    pub fn bits(mut self, range: Range<u32>) -> Self {
        self.begin_bit = range.start;
        self.end_bit = Some(range.end);
        self
    }

    /// Synchronize after every dispatch and log parameters and timings.
    pub fn debug_synchronous(mut self, enabled: bool) -> Self {
        self.debug_synchronous = enabled;
        self
    }

    /// Overrides the tuned configuration for the key and value types.
    pub fn config(mut self, config: SegmentedRadixSortConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the stable partition used to classify segments.
    pub fn partitioner(mut self, partitioner: &'p dyn SegmentPartitioner) -> Self {
        self.partitioner = Some(partitioner);
        self
    }

    fn bit_range<K: RadixKey>(&self) -> Result<(u32, u32)> {
        let begin_bit = self.begin_bit;
        let end_bit = self.end_bit.unwrap_or(K::BITS);
        if begin_bit >= end_bit || end_bit > K::BITS {
            return Err(SortError::InvalidBitRange {
                begin_bit,
                end_bit,
                key_bits: K::BITS,
            });
        }
        if K::IS_FLOAT && (begin_bit != 0 || end_bit != K::BITS) {
            return Err(SortError::FloatBitRange { key_bits: K::BITS });
        }
        Ok((begin_bit, end_bit))
    }
}

impl fmt::Debug for SortOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortOptions")
            .field("begin_bit", &self.begin_bit)
            .field("end_bit", &self.end_bit)
            .field("debug_synchronous", &self.debug_synchronous)
            .field("config", &self.config)
            .field("custom_partitioner", &self.partitioner.is_some())
            .finish()
    }
}

/// The buffers one call reads and writes.
enum Operands<'a, K, V> {
    Separate {
        keys_in: &'a [K],
        keys_out: &'a mut [K],
        values_in: &'a [V],
        values_out: &'a mut [V],
    },
    /// `(current, alternate)` of the caller's double buffers.
    DoubleBuffer {
        keys: (&'a mut [K], &'a mut [K]),
        values: (&'a mut [V], &'a mut [V]),
    },
}

impl<K, V> Operands<'_, K, V> {
    fn len(&self) -> usize {
        match self {
            Operands::Separate { keys_in, .. } => keys_in.len(),
            Operands::DoubleBuffer { keys, .. } => keys.0.len(),
        }
    }

    fn is_double_buffer(&self) -> bool {
        matches!(self, Operands::DoubleBuffer { .. })
    }

    fn check_lengths(&self) -> Result<()> {
        let expected = self.len();
        let lengths = match self {
            Operands::Separate {
                keys_out,
                values_in,
                values_out,
                ..
            } => [
                ("keys_output", keys_out.len()),
                ("values_input", values_in.len()),
                ("values_output", values_out.len()),
            ],
            Operands::DoubleBuffer { keys, values } => [
                ("keys_alternate", keys.1.len()),
                ("values_current", values.0.len()),
                ("values_alternate", values.1.len()),
            ],
        };
        match lengths.into_iter().find(|&(_, actual)| actual != expected) {
            Some((buffer, actual)) => Err(SortError::LengthMismatch {
                buffer,
                expected,
                actual,
            }),
            None => Ok(()),
        }
    }
}

fn dispatch<K: RadixKey, V: Pod + Send + Sync>(
    strategy: &dyn SegmentStrategy<K, V>,
    stream: &Stream,
    views: Vec<SegmentView<'_, K, V>>,
    debug_synchronous: bool,
) -> Result<()> {
    if views.is_empty() {
        return Ok(());
    }
    log::debug!(
        "{}: {} segments, grid {}",
        strategy.name(),
        views.len(),
        strategy.grid_size(views.len())
    );
    strategy.dispatch(stream, views, debug_synchronous)
}

/// Sorts every segment and reports which physical buffer holds the result.
///
/// Returns `None` when nothing was sorted: the size query and the
/// zero-segment call.
fn segmented_radix_sort<K, V, O>(
    storage: Option<&mut [u8]>,
    storage_size: &mut usize,
    operands: Operands<'_, K, V>,
    segments: &Segments<'_, O>,
    options: &SortOptions<'_>,
    descending: bool,
    stream: &Stream,
) -> Result<Option<ResultLocation>>
where
    K: RadixKey,
    V: Pod + Send + Sync,
    O: SegmentOffset,
{
    let config = options
        .config
        .unwrap_or_else(SegmentedRadixSortConfig::for_types::<K, V>);
    config.validate()?;
    let (begin_bit, end_bit) = options.bit_range::<K>()?;
    operands.check_lengths()?;

    let count = operands.len();
    let with_double_buffer = operands.is_double_buffer();
    let schedule = RadixSchedule::from_config(begin_bit, end_bit, &config);
    let placement = Placement::new(schedule.iterations(), with_double_buffer);

    let partitioner = options.partitioner.unwrap_or(&DEFAULT_PARTITIONER);
    let classifier =
        SegmentClassifier::from_config(&config).filter(|c| c.is_worthwhile(segments.len()));
    let partition_bytes = classifier
        .map(|_| partitioner.storage_size(segments.len()))
        .transpose()?;
    let layout = StorageLayout::new(&StorageRequest {
        key_size: size_of::<K>(),
        value_size: size_of::<V>(),
        count,
        segments: segments.len(),
        with_double_buffer,
        partition_bytes,
    });

    let Some(storage) = storage else {
        *storage_size = layout.required_bytes();
        return Ok(None);
    };

    if segments.is_empty() {
        return Ok(None);
    }

    if options.debug_synchronous {
        log::info!(
            "begin_bit={begin_bit} end_bit={end_bit} bits={} segments={} radix_bits_diff={} \
             storage_size={} iterations={} long_iterations={} short_iterations={} \
             do_partitioning={} block_size={} items_per_thread={}",
            end_bit - begin_bit,
            segments.len(),
            schedule.radix_bits_diff(),
            layout.required_bytes(),
            schedule.iterations(),
            schedule.long_iterations,
            schedule.short_iterations,
            classifier.is_some(),
            config.sort.block_size,
            config.sort.items_per_thread,
        );
    }

    let map = segments.resolve(count)?;
    let mut carved = layout.carve(storage)?;
    let views = match operands {
        Operands::Separate {
            keys_in,
            keys_out,
            values_in,
            values_out,
        } => {
            let keys_tmp = carved.require_typed::<K>(Region::Keys, count)?;
            let values_tmp = carved.require_typed::<V>(Region::Values, count)?;
            segment_views(
                &map,
                Some((keys_in, values_in)),
                (keys_tmp, values_tmp),
                (keys_out, values_out),
            )
        }
        Operands::DoubleBuffer { keys, values } => {
            segment_views(&map, None, (keys.0, values.0), (keys.1, values.1))
        }
    };

    let passes = RadixPasses {
        schedule,
        placement,
        descending,
    };
    let debug_synchronous = options.debug_synchronous;

    match (classifier, config.warp_sort.as_ref()) {
        (Some(classifier), Some(warp_sort)) => {
            let indices = carved.require_typed::<u32>(Region::SegmentIndices, segments.len())?;
            let large_count = carved.require_typed::<u32>(Region::LargeSegmentCount, 1)?;
            let partition_storage = carved.take(Region::Partition).unwrap_or_default();
            let classification = classifier.classify(
                partitioner,
                partition_storage,
                segments,
                indices,
                &mut large_count[0],
                stream,
                debug_synchronous,
            )?;
            log::debug!(
                "classified {} large and {} small segments",
                classification.large.len(),
                classification.small.len()
            );

            let mut slots: Vec<Option<_>> = views.into_iter().map(Some).collect();
            let mut pick = |indices: &[u32]| {
                indices
                    .iter()
                    .map(|&i| {
                        let slot = slots.get_mut(i as usize).and_then(Option::take);
                        slot.ok_or_else(|| SortError::Partition(format!("bad segment index {i}")))
                    })
                    .collect::<Result<Vec<_>>>()
            };
            let large_views = pick(classification.large)?;
            let small_views = pick(classification.small)?;

            let large = LargeSegmentStrategy::new(passes);
            let small = SmallSegmentStrategy::new(
                warp_sort,
                begin_bit,
                end_bit,
                descending,
                placement.is_result_in_output(),
            );
            dispatch::<K, V>(&large, stream, large_views, debug_synchronous)?;
            dispatch::<K, V>(&small, stream, small_views, debug_synchronous)?;
        }
        _ => {
            let uniform = UniformStrategy::new(passes);
            dispatch::<K, V>(&uniform, stream, views, debug_synchronous)?;
        }
    }

    Ok(Some(placement.result))
}

#[allow(clippy::too_many_arguments)]
fn keys_only<K: RadixKey, O: SegmentOffset>(
    storage: Option<&mut [u8]>,
    storage_size: &mut usize,
    keys_in: &[K],
    keys_out: &mut [K],
    segments: &Segments<'_, O>,
    options: &SortOptions<'_>,
    descending: bool,
    stream: &Stream,
) -> Result<()> {
    let count = keys_in.len();
    let operands = Operands::Separate {
        keys_in,
        keys_out,
        values_in: zero_sized_slice::<()>(count),
        values_out: zero_sized_slice::<()>(count),
    };
    segmented_radix_sort(
        storage,
        storage_size,
        operands,
        segments,
        options,
        descending,
        stream,
    )?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn pairs<K: RadixKey, V: Pod + Send + Sync, O: SegmentOffset>(
    storage: Option<&mut [u8]>,
    storage_size: &mut usize,
    keys_in: &[K],
    keys_out: &mut [K],
    values_in: &[V],
    values_out: &mut [V],
    segments: &Segments<'_, O>,
    options: &SortOptions<'_>,
    descending: bool,
    stream: &Stream,
) -> Result<()> {
    let operands = Operands::Separate {
        keys_in,
        keys_out,
        values_in,
        values_out,
    };
    segmented_radix_sort(
        storage,
        storage_size,
        operands,
        segments,
        options,
        descending,
        stream,
    )?;
    Ok(())
}

fn keys_double_buffer<K: RadixKey, O: SegmentOffset>(
    storage: Option<&mut [u8]>,
    storage_size: &mut usize,
    keys: &mut DoubleBuffer<'_, K>,
    segments: &Segments<'_, O>,
    options: &SortOptions<'_>,
    descending: bool,
    stream: &Stream,
) -> Result<()> {
    let count = keys.len();
    let location = {
        let operands = Operands::DoubleBuffer {
            keys: keys.split_mut(),
            values: (zero_sized_slice::<()>(count), zero_sized_slice::<()>(count)),
        };
        segmented_radix_sort(
            storage,
            storage_size,
            operands,
            segments,
            options,
            descending,
            stream,
        )?
    };
    if let Some(location) = location {
        location.apply(keys);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn pairs_double_buffer<K: RadixKey, V: Pod + Send + Sync, O: SegmentOffset>(
    storage: Option<&mut [u8]>,
    storage_size: &mut usize,
    keys: &mut DoubleBuffer<'_, K>,
    values: &mut DoubleBuffer<'_, V>,
    segments: &Segments<'_, O>,
    options: &SortOptions<'_>,
    descending: bool,
    stream: &Stream,
) -> Result<()> {
    let location = {
        let operands = Operands::DoubleBuffer {
            keys: keys.split_mut(),
            values: values.split_mut(),
        };
        segmented_radix_sort(
            storage,
            storage_size,
            operands,
            segments,
            options,
            descending,
            stream,
        )?
    };
    if let Some(location) = location {
        location.apply(keys);
        location.apply(values);
    }
    Ok(())
}

/// Sorts the keys of every segment in ascending order into `keys_out`.
///
/// Elements outside every segment are left untouched in `keys_out`.
pub fn sort_keys<K: RadixKey, O: SegmentOffset>(
    storage: Option<&mut [u8]>,
    storage_size: &mut usize,
    keys_in: &[K],
    keys_out: &mut [K],
    segments: &Segments<'_, O>,
    options: &SortOptions<'_>,
    stream: &Stream,
) -> Result<()> {
    keys_only(
        storage,
        storage_size,
        keys_in,
        keys_out,
        segments,
        options,
        false,
        stream,
    )
}

pub fn sort_keys_desc<K: RadixKey, O: SegmentOffset>(
    storage: Option<&mut [u8]>,
    storage_size: &mut usize,
    keys_in: &[K],
    keys_out: &mut [K],
    segments: &Segments<'_, O>,
    options: &SortOptions<'_>,
    stream: &Stream,
) -> Result<()> {
    keys_only(
        storage,
        storage_size,
        keys_in,
        keys_out,
        segments,
        options,
        true,
        stream,
    )
}

/// Sorts keys ascending and moves each value along with its key.
#[allow(clippy::too_many_arguments)]
pub fn sort_pairs<K: RadixKey, V: Pod + Send + Sync, O: SegmentOffset>(
    storage: Option<&mut [u8]>,
    storage_size: &mut usize,
    keys_in: &[K],
    keys_out: &mut [K],
    values_in: &[V],
    values_out: &mut [V],
    segments: &Segments<'_, O>,
    options: &SortOptions<'_>,
    stream: &Stream,
) -> Result<()> {
    pairs(
        storage,
        storage_size,
        keys_in,
        keys_out,
        values_in,
        values_out,
        segments,
        options,
        false,
        stream,
    )
}

#[allow(clippy::too_many_arguments)]
pub fn sort_pairs_desc<K: RadixKey, V: Pod + Send + Sync, O: SegmentOffset>(
    storage: Option<&mut [u8]>,
    storage_size: &mut usize,
    keys_in: &[K],
    keys_out: &mut [K],
    values_in: &[V],
    values_out: &mut [V],
    segments: &Segments<'_, O>,
    options: &SortOptions<'_>,
    stream: &Stream,
) -> Result<()> {
    pairs(
        storage,
        storage_size,
        keys_in,
        keys_out,
        values_in,
        values_out,
        segments,
        options,
        true,
        stream,
    )
}

/// Sorts in place through a double buffer.
///
/// Needs less temporary storage than [`sort_keys`]; afterwards
/// `keys.current()` holds the sorted data, which may be either physical
/// buffer.
pub fn sort_keys_double_buffer<K: RadixKey, O: SegmentOffset>(
    storage: Option<&mut [u8]>,
    storage_size: &mut usize,
    keys: &mut DoubleBuffer<'_, K>,
    segments: &Segments<'_, O>,
    options: &SortOptions<'_>,
    stream: &Stream,
) -> Result<()> {
    keys_double_buffer(
        storage,
        storage_size,
        keys,
        segments,
        options,
        false,
        stream,
    )
}

pub fn sort_keys_desc_double_buffer<K: RadixKey, O: SegmentOffset>(
    storage: Option<&mut [u8]>,
    storage_size: &mut usize,
    keys: &mut DoubleBuffer<'_, K>,
    segments: &Segments<'_, O>,
    options: &SortOptions<'_>,
    stream: &Stream,
) -> Result<()> {
    keys_double_buffer(storage, storage_size, keys, segments, options, true, stream)
}

#[allow(clippy::too_many_arguments)]
pub fn sort_pairs_double_buffer<K: RadixKey, V: Pod + Send + Sync, O: SegmentOffset>(
    storage: Option<&mut [u8]>,
    storage_size: &mut usize,
    keys: &mut DoubleBuffer<'_, K>,
    values: &mut DoubleBuffer<'_, V>,
    segments: &Segments<'_, O>,
    options: &SortOptions<'_>,
    stream: &Stream,
) -> Result<()> {
    pairs_double_buffer(
        storage,
        storage_size,
        keys,
        values,
        segments,
        options,
        false,
        stream,
    )
}

#[allow(clippy::too_many_arguments)]
pub fn sort_pairs_desc_double_buffer<K: RadixKey, V: Pod + Send + Sync, O: SegmentOffset>(
    storage: Option<&mut [u8]>,
    storage_size: &mut usize,
    keys: &mut DoubleBuffer<'_, K>,
    values: &mut DoubleBuffer<'_, V>,
    segments: &Segments<'_, O>,
    options: &SortOptions<'_>,
    stream: &Stream,
) -> Result<()> {
    pairs_double_buffer(
        storage,
        storage_size,
        keys,
        values,
        segments,
        options,
        true,
        stream,
    )
}
