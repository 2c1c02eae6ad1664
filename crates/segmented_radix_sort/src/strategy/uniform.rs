use bytemuck::Pod;

use super::large::RadixPasses;
use super::{SegmentStrategy, SegmentView};
use crate::device::Stream;
use crate::error::Result;
use crate::key::RadixKey;

/// Every segment through the multi-pass radix sort, one worker group each.
///
/// Used when classification is off or not worthwhile for the segment count.
#[derive(Clone, Copy, Debug)]
pub(crate) struct UniformStrategy {
    passes: RadixPasses,
}

impl UniformStrategy {
    pub fn new(passes: RadixPasses) -> Self {
        Self { passes }
    }
}

impl<K: RadixKey, V: Pod + Send + Sync> SegmentStrategy<K, V> for UniformStrategy {
    fn name(&self) -> &'static str {
        "segmented_sort"
    }

    fn grid_size(&self, segments: usize) -> usize {
        segments
    }

    fn dispatch<'a>(
        &self,
        stream: &Stream,
        segments: Vec<SegmentView<'a, K, V>>,
        debug_synchronous: bool,
    ) -> Result<()> {
        let histogram_len = self.passes.histogram_len();
        stream.launch(
            "segmented_sort",
            segments,
            debug_synchronous,
            || Vec::with_capacity(histogram_len),
            |counts, view| {
                self.passes.sort_segment(view, counts);
                Ok(())
            },
        )
    }
}
