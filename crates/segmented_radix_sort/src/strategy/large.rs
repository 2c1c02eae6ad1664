use bytemuck::Pod;

use super::{SegmentSlice, SegmentSliceMut, SegmentStrategy, SegmentView};
use crate::buffer::Placement;
use crate::device::Stream;
use crate::digit_pass::scatter_digit;
use crate::error::Result;
use crate::key::RadixKey;
use crate::schedule::RadixSchedule;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Side {
    Input,
    Scratch,
    Output,
}

/// The per-segment multi-pass radix sort shared by the large and uniform
/// strategies.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RadixPasses {
    pub schedule: RadixSchedule,
    pub placement: Placement,
    pub descending: bool,
}

impl RadixPasses {
    pub fn histogram_len(&self) -> usize {
        1 << self.schedule.max_width()
    }

    /// Runs every scheduled pass over one segment, ping-ponging between the
    /// scratch and output buffers. Pass `k + 1` reads what pass `k` wrote.
    pub fn sort_segment<K: RadixKey, V: Pod>(
        &self,
        view: SegmentView<'_, K, V>,
        counts: &mut Vec<usize>,
    ) {
        if view.len() == 0 {
            return;
        }
        let SegmentView {
            input,
            mut scratch,
            mut output,
        } = view;

        let mut reads = if input.is_some() {
            Side::Input
        } else {
            Side::Scratch
        };
        for (index, pass) in self.schedule.passes().enumerate() {
            let to_output = self.placement.pass_writes_output(index as u32);
            let (src, dst): (SegmentSlice<'_, K, V>, &mut SegmentSliceMut<'_, K, V>) =
                match (reads, to_output, &input) {
                    (Side::Input, true, Some(src)) => (*src, &mut output),
                    (Side::Input, false, Some(src)) => (*src, &mut scratch),
                    (Side::Scratch, true, _) => (scratch.as_slice(), &mut output),
                    (Side::Output, false, _) => (output.as_slice(), &mut scratch),
                    _ => unreachable!("pass {index} would read and write the same buffer"),
                };
            scatter_digit(
                src.keys,
                src.values,
                dst.keys,
                dst.values,
                pass.bit,
                pass.width,
                self.descending,
                counts,
            );
            reads = if to_output {
                Side::Output
            } else {
                Side::Scratch
            };
        }
    }
}

/// One worker group per segment longer than the small-segment capacity.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LargeSegmentStrategy {
    passes: RadixPasses,
}

impl LargeSegmentStrategy {
    pub fn new(passes: RadixPasses) -> Self {
        Self { passes }
    }
}

impl<K: RadixKey, V: Pod + Send + Sync> SegmentStrategy<K, V> for LargeSegmentStrategy {
    fn name(&self) -> &'static str {
        "segmented_sort:large_segments"
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
            "segmented_sort:large_segments",
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

#[cfg(test)]
mod tests {
    use super::*;

    fn passes(begin_bit: u32, end_bit: u32, bits: u32, double_buffer: bool) -> RadixPasses {
        let schedule = RadixSchedule::new(begin_bit, end_bit, bits, bits);
        RadixPasses {
            schedule,
            placement: Placement::new(schedule.iterations(), double_buffer),
            descending: false,
        }
    }

    #[test]
    fn separate_output_lands_in_output() {
        for bits in [1, 2, 3, 4, 8] {
            let keys = [200_u8, 3, 77, 3, 150, 0];
            let values = [0_u32, 1, 2, 3, 4, 5];
            let mut scratch_keys = [0; 6];
            let mut scratch_values = [0; 6];
            let mut out_keys = [0; 6];
            let mut out_values = [0; 6];
            let view = SegmentView {
                input: Some(SegmentSlice {
                    keys: &keys,
                    values: &values,
                }),
                scratch: SegmentSliceMut {
                    keys: &mut scratch_keys,
                    values: &mut scratch_values,
                },
                output: SegmentSliceMut {
                    keys: &mut out_keys,
                    values: &mut out_values,
                },
            };
            passes(0, 8, bits, false).sort_segment(view, &mut Vec::new());
            assert_eq!(out_keys, [0, 3, 3, 77, 150, 200], "bits={bits}");
            assert_eq!(out_values, [5, 1, 3, 2, 4, 0], "bits={bits}");
        }
    }

    #[test]
    fn double_buffer_parity() {
        // 8 bits in 4-bit digits: two passes, result back in the primary buffer.
        // 8 bits in 3-bit digits: three passes, result in the alternate buffer.
        for (bits, in_alternate) in [(4, false), (3, true)] {
            let mut current = [9_u8, 250, 4, 4];
            let mut current_values = [(); 4];
            let mut alternate = [0_u8; 4];
            let mut alternate_values = [(); 4];
            let run = passes(0, 8, bits, true);
            assert_eq!(run.placement.is_result_in_output(), in_alternate);

            let view = SegmentView {
                input: None,
                scratch: SegmentSliceMut {
                    keys: &mut current,
                    values: &mut current_values,
                },
                output: SegmentSliceMut {
                    keys: &mut alternate,
                    values: &mut alternate_values,
                },
            };
            run.sort_segment(view, &mut Vec::new());
            let result = if in_alternate { alternate } else { current };
            assert_eq!(result, [4, 4, 9, 250], "bits={bits}");
        }
    }
}
