use std::mem::size_of;
use std::ops::Range;

use crate::device::Stream;
use crate::error::{Result, SortError};

/// Predicate deciding whether segment `i` belongs to the first group.
pub type SegmentPredicate<'a> = &'a (dyn Fn(usize) -> bool + Sync);

/// Stable partition over the index sequence `0..segments`.
///
/// Implementations write every selected index first and every rejected index
/// after it, each group in ascending index order, and store the number of
/// selected indices in `count_out`. Sizing and execution follow the same
/// two-phase protocol as the sort: `storage_size` is queried first and a
/// buffer of at least that size is handed to `partition`.
pub trait SegmentPartitioner: Sync {
    fn storage_size(&self, segments: usize) -> Result<usize>;

    #[allow(clippy::too_many_arguments)]
    fn partition(
        &self,
        storage: &mut [u8],
        segments: usize,
        selected: SegmentPredicate<'_>,
        indices_out: &mut [u32],
        count_out: &mut u32,
        stream: &Stream,
        debug_synchronous: bool,
    ) -> Result<()>;
}

/// Tile-based stable partition.
///
/// Each tile counts its selected indices into the scratch buffer; the
/// counts are scanned on the host to give every tile disjoint output windows
/// in both halves, then all tiles scatter in parallel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StablePartition {
    tile_size: usize,
}

pub const DEFAULT_PARTITION_TILE: usize = 2048;

pub(crate) static DEFAULT_PARTITIONER: StablePartition =
    StablePartition::new(DEFAULT_PARTITION_TILE);

impl Default for StablePartition {
    fn default() -> Self {
        Self::new(DEFAULT_PARTITION_TILE)
    }
}

impl StablePartition {
    pub const fn new(tile_size: usize) -> Self {
        let tile_size = if tile_size == 0 { 1 } else { tile_size };
        Self { tile_size }
    }

    #[inline]
    fn tiles(&self, segments: usize) -> usize {
        segments.div_ceil(self.tile_size)
    }

    fn tile_range(&self, tile: usize, segments: usize) -> Range<usize> {
        let start = tile * self.tile_size;
        start..(start + self.tile_size).min(segments)
    }
}

impl SegmentPartitioner for StablePartition {
    fn storage_size(&self, segments: usize) -> Result<usize> {
        Ok(self.tiles(segments) * size_of::<u32>())
    }

    fn partition(
        &self,
        storage: &mut [u8],
        segments: usize,
        selected: SegmentPredicate<'_>,
        indices_out: &mut [u32],
        count_out: &mut u32,
        stream: &Stream,
        debug_synchronous: bool,
    ) -> Result<()> {
        let tiles = self.tiles(segments);
        let required = self.storage_size(segments)?;
        if storage.len() < required {
            return Err(SortError::StorageTooSmall {
                required,
                provided: storage.len(),
            });
        }
        if indices_out.len() < segments {
            return Err(SortError::LengthMismatch {
                buffer: "segment_indices",
                expected: segments,
                actual: indices_out.len(),
            });
        }
        let tile_counts: &mut [u32] = bytemuck::try_cast_slice_mut(&mut storage[..required])
            .map_err(|_| SortError::MisalignedStorage {
                region: "partition",
            })?;

        let work: Vec<(usize, &mut u32)> = tile_counts.iter_mut().enumerate().collect();
        stream.launch(
            "partition:count_tiles",
            work,
            debug_synchronous,
            || (),
            |_, (tile, count)| {
                *count = self
                    .tile_range(tile, segments)
                    .filter(|&i| selected(i))
                    .count() as u32;
                Ok(())
            },
        )?;

        let total: usize = tile_counts.iter().map(|&c| c as usize).sum();
        let (mut selected_rest, mut rejected_rest) = indices_out[..segments].split_at_mut(total);
        let mut work = Vec::with_capacity(tiles);
        for (tile, &count) in tile_counts.iter().enumerate() {
            let range = self.tile_range(tile, segments);
            let count = count as usize;
            let (picked, tail) = std::mem::take(&mut selected_rest).split_at_mut(count);
            selected_rest = tail;
            let (rest, tail) = std::mem::take(&mut rejected_rest).split_at_mut(range.len() - count);
            rejected_rest = tail;
            work.push((range, picked, rest));
        }

        stream.launch(
            "partition:scatter",
            work,
            debug_synchronous,
            || (),
            |_, (range, picked, rest)| {
                let (mut p, mut r) = (0, 0);
                for i in range {
                    if selected(i) {
                        picked[p] = i as u32;
                        p += 1;
                    } else {
                        rest[r] = i as u32;
                        r += 1;
                    }
                }
                Ok(())
            },
        )?;

        *count_out = total as u32;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TemporaryStorage;

    fn run(
        partitioner: &StablePartition,
        segments: usize,
        pred: &(dyn Fn(usize) -> bool + Sync),
    ) -> (Vec<u32>, u32) {
        let stream = Stream::new();
        let mut storage = TemporaryStorage::allocate(partitioner.storage_size(segments).unwrap());
        let mut indices = vec![u32::MAX; segments];
        let mut count = 0;
        partitioner
            .partition(
                storage.as_bytes_mut(),
                segments,
                pred,
                &mut indices,
                &mut count,
                &stream,
                false,
            )
            .unwrap();
        (indices, count)
    }

    #[test]
    fn stable_within_both_groups() {
        let partitioner = StablePartition::new(4);
        let (indices, count) = run(&partitioner, 11, &|i| i % 3 == 0);
        assert_eq!(count, 4);
        assert_eq!(indices, vec![0, 3, 6, 9, 1, 2, 4, 5, 7, 8, 10]);
    }

    #[test]
    fn matches_sequential_partition_across_tiles() {
        let partitioner = StablePartition::new(7);
        let pred = |i: usize| (i * 2654435761) % 5 < 2;
        let (indices, count) = run(&partitioner, 1000, &pred);

        let (mut expected, rejected): (Vec<u32>, Vec<u32>) =
            (0..1000_u32).partition(|&i| pred(i as usize));
        assert_eq!(count as usize, expected.len());
        expected.extend(rejected);
        assert_eq!(indices, expected);
    }

    #[test]
    fn all_or_nothing_selected() {
        let partitioner = StablePartition::default();
        let (indices, count) = run(&partitioner, 5000, &|_| true);
        assert_eq!(count, 5000);
        assert!(indices.iter().enumerate().all(|(i, &v)| v == i as u32));

        let (_, count) = run(&partitioner, 5000, &|_| false);
        assert_eq!(count, 0);
    }

    #[test]
    fn rejects_short_storage() {
        let partitioner = StablePartition::new(16);
        let mut storage = TemporaryStorage::allocate(4);
        let mut indices = vec![0; 100];
        let mut count = 0;
        let err = partitioner
            .partition(
                storage.as_bytes_mut(),
                100,
                &|_| true,
                &mut indices,
                &mut count,
                &Stream::new(),
                false,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            SortError::StorageTooSmall {
                required: 28,
                provided: 4
            }
        ));
    }
}
