mod large;
mod small;
mod uniform;

use bytemuck::Pod;

use crate::device::Stream;
use crate::error::Result;
use crate::key::RadixKey;
use crate::segment::SegmentMap;

pub(crate) use large::{LargeSegmentStrategy, RadixPasses};
pub(crate) use small::SmallSegmentStrategy;
pub(crate) use uniform::UniformStrategy;

#[derive(Clone, Copy, Debug)]
pub(crate) struct SegmentSlice<'a, K, V> {
    pub keys: &'a [K],
    pub values: &'a [V],
}

#[derive(Debug)]
pub(crate) struct SegmentSliceMut<'a, K, V> {
    pub keys: &'a mut [K],
    pub values: &'a mut [V],
}

impl<K, V> SegmentSliceMut<'_, K, V> {
    #[inline]
    pub fn as_slice(&self) -> SegmentSlice<'_, K, V> {
        SegmentSlice {
            keys: &*self.keys,
            values: &*self.values,
        }
    }
}

/// One segment across the buffers a sort touches.
///
/// `input` is the caller's read-only data; it is `None` for double-buffer
/// calls, where the data already sits in `scratch` (the caller's `current`).
/// `output` is the caller's output slice or the double buffer's `alternate`.
#[derive(Debug)]
pub(crate) struct SegmentView<'a, K, V> {
    pub input: Option<SegmentSlice<'a, K, V>>,
    pub scratch: SegmentSliceMut<'a, K, V>,
    pub output: SegmentSliceMut<'a, K, V>,
}

impl<K, V> SegmentView<'_, K, V> {
    #[inline]
    pub fn len(&self) -> usize {
        self.output.keys.len()
    }
}

/// Cuts the physical buffers into one view per segment, in segment order.
pub(crate) fn segment_views<'a, K, V>(
    map: &SegmentMap,
    input: Option<(&'a [K], &'a [V])>,
    scratch: (&'a mut [K], &'a mut [V]),
    output: (&'a mut [K], &'a mut [V]),
) -> Vec<SegmentView<'a, K, V>> {
    let mut inputs = input.map(|(keys, values)| {
        let keys = map.split(keys);
        keys.into_iter().zip(map.split(values))
    });
    let scratch = split_pair_mut(map, scratch);
    let output = split_pair_mut(map, output);
    let mut views = Vec::with_capacity(map.len());
    for ((scratch_keys, scratch_values), (output_keys, output_values)) in scratch.zip(output) {
        views.push(SegmentView {
            input: inputs
                .as_mut()
                .and_then(|it| it.next())
                .map(|(keys, values)| SegmentSlice { keys, values }),
            scratch: SegmentSliceMut {
                keys: scratch_keys,
                values: scratch_values,
            },
            output: SegmentSliceMut {
                keys: output_keys,
                values: output_values,
            },
        });
    }
    views
}

fn split_pair_mut<'a, K, V>(
    map: &SegmentMap,
    (keys, values): (&'a mut [K], &'a mut [V]),
) -> impl Iterator<Item = (&'a mut [K], &'a mut [V])> {
    map.split_mut(keys).into_iter().zip(map.split_mut(values))
}

pub(crate) trait SegmentStrategy<K: RadixKey, V: Pod + Send + Sync>: Sync {
    fn name(&self) -> &'static str;

    /// Worker groups launched for `segments` segments.
    fn grid_size(&self, segments: usize) -> usize;

    fn dispatch<'a>(
        &self,
        stream: &Stream,
        segments: Vec<SegmentView<'a, K, V>>,
        debug_synchronous: bool,
    ) -> Result<()>;
}
