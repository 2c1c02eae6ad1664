use bytemuck::Pod;

use super::{SegmentStrategy, SegmentView};
use crate::config::WarpSortConfig;
use crate::device::Stream;
use crate::error::{Result, SortError};
use crate::key::{RadixKey, masked, sort_bits};

/// Sorts segments that fit one logical warp in a single pass.
///
/// Several segments share a worker group. Each segment is staged into
/// worker-local memory, insertion sorted on the masked digit bits and written
/// straight to wherever the radix passes would have left their result, so
/// both strategies agree on the final location.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SmallSegmentStrategy {
    begin_bit: u32,
    end_bit: u32,
    descending: bool,
    result_in_output: bool,
    segments_per_block: usize,
    max_segment_length: usize,
}

impl SmallSegmentStrategy {
    pub fn new(
        warp_sort: &WarpSortConfig,
        begin_bit: u32,
        end_bit: u32,
        descending: bool,
        result_in_output: bool,
    ) -> Self {
        Self {
            begin_bit,
            end_bit,
            descending,
            result_in_output,
            segments_per_block: warp_sort.segments_per_block().max(1),
            max_segment_length: warp_sort.max_segment_length(),
        }
    }

    fn sort_segment<K: RadixKey, V: Pod>(
        &self,
        view: SegmentView<'_, K, V>,
        staged: &mut Vec<(u64, K, V)>,
    ) -> Result<()> {
        let len = view.len();
        if len > self.max_segment_length {
            return Err(SortError::Device {
                kernel: "segmented_sort:small_segments",
                reason: format!(
                    "segment of {len} items exceeds warp capacity {}",
                    self.max_segment_length
                ),
            });
        }
        if len == 0 {
            return Ok(());
        }

        let SegmentView {
            input,
            scratch,
            output,
        } = view;
        let src = match &input {
            Some(input) => *input,
            None => scratch.as_slice(),
        };
        staged.clear();
        for (&key, &value) in src.keys.iter().zip(src.values) {
            let encoded = sort_bits(key, self.descending);
            staged.push((masked(encoded, self.begin_bit, self.end_bit), key, value));
        }
        insertion_sort_by_bits(staged);

        let dst = if self.result_in_output {
            output
        } else {
            scratch
        };
        for (i, &(_, key, value)) in staged.iter().enumerate() {
            dst.keys[i] = key;
            dst.values[i] = value;
        }
        Ok(())
    }
}

/// Stable: an element only moves past strictly greater neighbours.
fn insertion_sort_by_bits<K: Copy, V: Copy>(data: &mut [(u64, K, V)]) {
    for i in 1..data.len() {
        let item = data[i];
        let mut j = i;
        while j > 0 && data[j - 1].0 > item.0 {
            data[j] = data[j - 1];
            j -= 1;
        }
        data[j] = item;
    }
}

impl<K: RadixKey, V: Pod + Send + Sync> SegmentStrategy<K, V> for SmallSegmentStrategy {
    fn name(&self) -> &'static str {
        "segmented_sort:small_segments"
    }

    fn grid_size(&self, segments: usize) -> usize {
        segments.div_ceil(self.segments_per_block)
    }

    fn dispatch<'a>(
        &self,
        stream: &Stream,
        segments: Vec<SegmentView<'a, K, V>>,
        debug_synchronous: bool,
    ) -> Result<()> {
        let mut blocks = Vec::with_capacity(segments.len().div_ceil(self.segments_per_block));
        let mut segments = segments.into_iter().peekable();
        while segments.peek().is_some() {
            let block: Vec<_> = segments.by_ref().take(self.segments_per_block).collect();
            blocks.push(block);
        }

        let capacity = self.max_segment_length;
        stream.launch(
            "segmented_sort:small_segments",
            blocks,
            debug_synchronous,
            || Vec::with_capacity(capacity),
            |staged, block| {
                block
                    .into_iter()
                    .try_for_each(|view| self.sort_segment(view, staged))
            },
        )
    }
}
