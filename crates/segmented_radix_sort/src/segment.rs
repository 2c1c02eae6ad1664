use std::ops::Range;

use crate::error::{Result, SortError};

/// Integer type usable as a segment offset.
pub trait SegmentOffset: Copy + Send + Sync {
    fn to_usize(self) -> usize;
}

impl SegmentOffset for u32 {
    #[inline(always)]
    fn to_usize(self) -> usize {
        self as usize
    }
}

impl SegmentOffset for u64 {
    #[inline(always)]
    fn to_usize(self) -> usize {
        usize::try_from(self).unwrap_or(usize::MAX)
    }
}

impl SegmentOffset for usize {
    #[inline(always)]
    fn to_usize(self) -> usize {
        self
    }
}

/// Segment `i` spans `[begin[i], end[i])`.
///
/// `begin` and `end` may be two views of one offsets array, see
/// [`Segments::from_offsets`].
#[derive(Clone, Copy, Debug)]
pub struct Segments<'a, O> {
    count: usize,
    begin: &'a [O],
    end: &'a [O],
}

impl<'a, O: SegmentOffset> Segments<'a, O> {
    pub fn new(count: usize, begin: &'a [O], end: &'a [O]) -> Self {
        Self { count, begin, end }
    }

    /// `count + 1` offsets where segment `i` spans `[offsets[i], offsets[i + 1])`.
    pub fn from_offsets(offsets: &'a [O]) -> Self {
        Self {
            count: offsets.len().saturating_sub(1),
            begin: offsets,
            end: offsets.get(1..).unwrap_or(&[]),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Length of segment `i`; a reversed pair counts as empty.
    #[inline]
    pub fn segment_len(&self, i: usize) -> usize {
        self.end[i].to_usize().saturating_sub(self.begin[i].to_usize())
    }

    fn check_offsets(&self) -> Result<()> {
        for (which, offsets) in [("begin", self.begin), ("end", self.end)] {
            if offsets.len() < self.count {
                return Err(SortError::OffsetsTooShort {
                    which,
                    segments: self.count,
                    required: self.count,
                    actual: offsets.len(),
                });
            }
        }
        Ok(())
    }

    /// Checks every segment against an array of `len` elements.
    pub(crate) fn resolve(&self, len: usize) -> Result<SegmentMap> {
        self.check_offsets()?;

        let mut ranges = Vec::with_capacity(self.count);
        for segment in 0..self.count {
            let begin = self.begin[segment].to_usize();
            let end = self.end[segment].to_usize();
            if begin > end || end > len {
                return Err(SortError::SegmentOutOfBounds {
                    segment,
                    begin,
                    end,
                    len,
                });
            }
            ranges.push(begin..end);
        }

        let mut order: Vec<usize> = (0..self.count).filter(|&i| !ranges[i].is_empty()).collect();
        if !order.is_sorted_by_key(|&i| ranges[i].start) {
            order.sort_unstable_by_key(|&i| ranges[i].start);
        }
        for pair in order.windows(2) {
            if ranges[pair[0]].end > ranges[pair[1]].start {
                let first = pair[0].min(pair[1]);
                let second = pair[0].max(pair[1]);
                return Err(SortError::OverlappingSegments { first, second });
            }
        }

        Ok(SegmentMap { ranges, order })
    }
}

/// Validated, pairwise disjoint segment ranges.
#[derive(Clone, Debug)]
pub(crate) struct SegmentMap {
    ranges: Vec<Range<usize>>,
    /// Non-empty segments by ascending start offset.
    order: Vec<usize>,
}

impl SegmentMap {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.ranges.len()
    }

    /// One shared slice per segment, in segment order.
    pub(crate) fn split<'a, T>(&self, data: &'a [T]) -> Vec<&'a [T]> {
        self.ranges.iter().map(|r| &data[r.clone()]).collect()
    }

    /// One mutable slice per segment, in segment order. Empty segments get
    /// empty slices.
    pub(crate) fn split_mut<'a, T>(&self, data: &'a mut [T]) -> Vec<&'a mut [T]> {
        let mut out: Vec<&'a mut [T]> =
            (0..self.ranges.len()).map(|_| Default::default()).collect();
        let mut rest = data;
        let mut cursor = 0;
        for &segment in &self.order {
            let range = &self.ranges[segment];
            let (_, tail) = std::mem::take(&mut rest).split_at_mut(range.start - cursor);
            let (slice, tail) = tail.split_at_mut(range.len());
            out[segment] = slice;
            rest = tail;
            cursor = range.end;
        }
        out
    }
}
