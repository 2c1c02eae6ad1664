use std::mem::size_of;

use crate::error::{Result, SortError};

/// Widest digit a single pass may extract; bounds the per-group histogram.
pub const MAX_RADIX_BITS: u32 = 16;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KernelConfig {
    pub block_size: u32,
    pub items_per_thread: u32,
}

/// Parameters of the short-segment strategy.
///
/// One logical warp sorts one segment of at most
/// `logical_warp_size * items_per_thread` items; a block holds
/// `block_size / logical_warp_size` such warps.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WarpSortConfig {
    pub logical_warp_size: u32,
    pub items_per_thread: u32,
    pub block_size: u32,
    /// Minimum segment count for which classification pays off.
    pub partitioning_threshold: usize,
}

impl WarpSortConfig {
    #[inline]
    pub const fn max_segment_length(&self) -> usize {
        (self.logical_warp_size * self.items_per_thread) as usize
    }

    #[inline]
    pub const fn segments_per_block(&self) -> usize {
        (self.block_size / self.logical_warp_size) as usize
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SegmentedRadixSortConfig {
    pub long_radix_bits: u32,
    pub short_radix_bits: u32,
    pub sort: KernelConfig,
    /// `None` disables classification; every call takes the uniform path.
    pub warp_sort: Option<WarpSortConfig>,
}

pub const DEFAULT_WARP_SORT: WarpSortConfig = WarpSortConfig {
    logical_warp_size: 8,
    items_per_thread: 8,
    block_size: 256,
    partitioning_threshold: 3000,
};

const fn tuned(long: u32, short: u32, items_per_thread: u32) -> SegmentedRadixSortConfig {
    SegmentedRadixSortConfig {
        long_radix_bits: long,
        short_radix_bits: short,
        sort: KernelConfig {
            block_size: 256,
            items_per_thread,
        },
        warp_sort: Some(DEFAULT_WARP_SORT),
    }
}

pub const TUNED_CONFIG_KEY8: SegmentedRadixSortConfig = tuned(8, 7, 10);
pub const TUNED_CONFIG_KEY16: SegmentedRadixSortConfig = tuned(8, 7, 10);
pub const TUNED_CONFIG_KEY32: SegmentedRadixSortConfig = tuned(7, 6, 15);
pub const TUNED_CONFIG_KEY64: SegmentedRadixSortConfig = tuned(7, 6, 13);

impl SegmentedRadixSortConfig {
    /// Tuned default for sorting `K` keys carrying `V` values.
    pub fn for_types<K, V>() -> Self {
        Self::for_sizes(size_of::<K>(), size_of::<V>())
    }

    pub fn for_sizes(key_size: usize, value_size: usize) -> Self {
        if value_size > 8 {
            let item_scale = key_size.max(value_size).div_ceil(size_of::<i32>()) as u32;
            return Self {
                long_radix_bits: 7,
                short_radix_bits: 6,
                sort: KernelConfig {
                    block_size: 256,
                    items_per_thread: (15 / item_scale).max(1),
                },
                warp_sort: None,
            };
        }
        match key_size {
            1 => TUNED_CONFIG_KEY8,
            2 => TUNED_CONFIG_KEY16,
            4 => TUNED_CONFIG_KEY32,
            _ => TUNED_CONFIG_KEY64,
        }
    }

    pub fn with_radix_bits(mut self, long: u32, short: u32) -> Self {
        self.long_radix_bits = long;
        self.short_radix_bits = short;
        self
    }

    pub fn with_warp_sort(mut self, warp_sort: Option<WarpSortConfig>) -> Self {
        self.warp_sort = warp_sort;
        self
    }

    pub fn with_partitioning_threshold(mut self, threshold: usize) -> Self {
        if let Some(warp_sort) = self.warp_sort.as_mut() {
            warp_sort.partitioning_threshold = threshold;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.long_radix_bits == 0 || self.long_radix_bits > MAX_RADIX_BITS {
            return Err(SortError::InvalidConfig("long_radix_bits must be in 1..=16"));
        }
        if self.short_radix_bits == 0 || self.short_radix_bits > self.long_radix_bits {
            return Err(SortError::InvalidConfig(
                "short_radix_bits must be in 1..=long_radix_bits",
            ));
        }
        if self.sort.block_size == 0 || self.sort.items_per_thread == 0 {
            return Err(SortError::InvalidConfig("sort kernel dimensions must be non-zero"));
        }
        if let Some(warp_sort) = &self.warp_sort {
            if warp_sort.logical_warp_size == 0
                || warp_sort.items_per_thread == 0
                || warp_sort.block_size < warp_sort.logical_warp_size
            {
                return Err(SortError::InvalidConfig(
                    "warp sort needs at least one non-empty logical warp per block",
                ));
            }
        }
        Ok(())
    }
}
