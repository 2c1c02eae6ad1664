use crate::config::SegmentedRadixSortConfig;
use crate::device::Stream;
use crate::error::{Result, SortError};
use crate::partition::SegmentPartitioner;
use crate::segment::{SegmentOffset, Segments};

/// Splits segment indices into those longer than what one logical warp can
/// sort and those that fit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SegmentClassifier {
    pub max_small_segment_length: usize,
    pub partitioning_threshold: usize,
}

/// Large indices first, then small ones, both in ascending segment order.
#[derive(Debug)]
pub struct Classification<'a> {
    pub large: &'a [u32],
    pub small: &'a [u32],
}

impl SegmentClassifier {
    /// `None` when the configuration has no short-segment backend.
    pub fn from_config(config: &SegmentedRadixSortConfig) -> Option<Self> {
        config.warp_sort.map(|warp_sort| Self {
            max_small_segment_length: warp_sort.max_segment_length(),
            partitioning_threshold: warp_sort.partitioning_threshold,
        })
    }

    /// Whether partitioning `segments` segments pays for itself.
    #[inline]
    pub fn is_worthwhile(&self, segments: usize) -> bool {
        segments >= self.partitioning_threshold && u32::try_from(segments).is_ok()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn classify<'a, O: SegmentOffset>(
        &self,
        partitioner: &dyn SegmentPartitioner,
        storage: &mut [u8],
        segments: &Segments<'_, O>,
        indices: &'a mut [u32],
        large_count: &mut u32,
        stream: &Stream,
        debug_synchronous: bool,
    ) -> Result<Classification<'a>> {
        let threshold = self.max_small_segment_length;
        let is_large = |i: usize| segments.segment_len(i) > threshold;
        partitioner.partition(
            storage,
            segments.len(),
            &is_large,
            indices,
            large_count,
            stream,
            debug_synchronous,
        )?;

        // Grid sizes of the next dispatches depend on this value.
        let large = stream.read_back(&*large_count)? as usize;
        if large > segments.len() {
            return Err(SortError::Partition(format!(
                "reported {large} large segments out of {}",
                segments.len()
            )));
        }

        let (large, small) = indices[..segments.len()].split_at(large);
        Ok(Classification { large, small })
    }
}
