//! Temporary storage planning and carving.
//!
//! The scratch blob is described once, as an ordered list of regions, by
//! [`StorageLayout::new`]. The size query and the execute path both go through
//! that list, so the byte offsets computed while sizing are exactly the ones
//! used when the buffer is carved.

use std::mem::size_of;
use std::ptr::NonNull;

use bytemuck::Pod;

use crate::error::{Result, SortError};

pub const STORAGE_ALIGNMENT: usize = 256;

/// Reported instead of zero so a caller never allocates an empty blob and
/// passes it back as if storage had not been queried.
pub const EMPTY_STORAGE_SENTINEL: usize = 4;

#[inline]
pub const fn align_size(size: usize) -> usize {
    size.div_ceil(STORAGE_ALIGNMENT) * STORAGE_ALIGNMENT
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Region {
    Keys,
    Values,
    SegmentIndices,
    LargeSegmentCount,
    Partition,
}

impl Region {
    pub fn name(self) -> &'static str {
        match self {
            Region::Keys => "keys",
            Region::Values => "values",
            Region::SegmentIndices => "segment_indices",
            Region::LargeSegmentCount => "large_segment_count",
            Region::Partition => "partition",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RegionSpec {
    pub region: Region,
    pub offset: usize,
    pub bytes: usize,
}

/// Inputs that determine the layout; identical for both phases of a call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StorageRequest {
    pub key_size: usize,
    pub value_size: usize,
    pub count: usize,
    pub segments: usize,
    pub with_double_buffer: bool,
    /// Partition scratch size, `Some` only when classification will run.
    pub partition_bytes: Option<usize>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StorageLayout {
    regions: Vec<RegionSpec>,
    end: usize,
}

impl StorageLayout {
    pub fn new(request: &StorageRequest) -> Self {
        let mut layout = Self::default();
        if !request.with_double_buffer {
            layout.push(Region::Keys, align_size(request.count * request.key_size));
            layout.push(
                Region::Values,
                align_size(request.count * request.value_size),
            );
        }
        if let Some(partition_bytes) = request.partition_bytes {
            layout.push(
                Region::SegmentIndices,
                align_size(request.segments * size_of::<u32>()),
            );
            layout.push(Region::LargeSegmentCount, align_size(size_of::<u32>()));
            layout.push(Region::Partition, partition_bytes);
        }
        layout
    }

    fn push(&mut self, region: Region, bytes: usize) {
        self.regions.push(RegionSpec {
            region,
            offset: self.end,
            bytes,
        });
        self.end += bytes;
    }

    pub fn regions(&self) -> &[RegionSpec] {
        &self.regions
    }

    /// Bytes actually covered by the regions.
    #[inline]
    pub fn total_bytes(&self) -> usize {
        self.end
    }

    /// Size reported by the query phase.
    #[inline]
    pub fn required_bytes(&self) -> usize {
        if self.end == 0 {
            EMPTY_STORAGE_SENTINEL
        } else {
            self.end
        }
    }

    pub fn carve<'a>(&self, storage: &'a mut [u8]) -> Result<CarvedStorage<'a>> {
        if storage.len() < self.end {
            return Err(SortError::StorageTooSmall {
                required: self.end,
                provided: storage.len(),
            });
        }

        let mut rest = storage;
        let mut regions = Vec::with_capacity(self.regions.len());
        for spec in &self.regions {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(spec.bytes);
            regions.push((spec.region, head));
            rest = tail;
        }
        Ok(CarvedStorage { regions })
    }
}

/// Byte spans of a carved scratch blob, handed out once per region.
#[derive(Debug)]
pub struct CarvedStorage<'a> {
    regions: Vec<(Region, &'a mut [u8])>,
}

impl<'a> CarvedStorage<'a> {
    pub fn take(&mut self, region: Region) -> Option<&'a mut [u8]> {
        let pos = self.regions.iter().position(|(r, _)| *r == region)?;
        Some(self.regions.swap_remove(pos).1)
    }

    /// Takes `region` and views its first `len` elements as `T`.
    pub fn take_typed<T: Pod>(
        &mut self,
        region: Region,
        len: usize,
    ) -> Result<Option<&'a mut [T]>> {
        match self.take(region) {
            Some(bytes) => typed(bytes, len, region).map(Some),
            None => Ok(None),
        }
    }

    /// Like [`CarvedStorage::take_typed`], for regions the layout always contains.
    pub fn require_typed<T: Pod>(&mut self, region: Region, len: usize) -> Result<&'a mut [T]> {
        match self.take_typed(region, len)? {
            Some(slice) => Ok(slice),
            None => Err(SortError::StorageTooSmall {
                required: len * size_of::<T>(),
                provided: 0,
            }),
        }
    }
}

fn typed<T: Pod>(bytes: &mut [u8], len: usize, region: Region) -> Result<&mut [T]> {
    if size_of::<T>() == 0 {
        return Ok(zero_sized_slice(len));
    }
    if len == 0 {
        return Ok(&mut []);
    }
    let needed = len * size_of::<T>();
    if bytes.len() < needed {
        return Err(SortError::StorageTooSmall {
            required: needed,
            provided: bytes.len(),
        });
    }
    bytemuck::try_cast_slice_mut(&mut bytes[..needed]).map_err(|_| SortError::MisalignedStorage {
        region: region.name(),
    })
}

/// A slice of `len` zero-sized elements, e.g. the `()` values of a keys-only sort.
pub(crate) fn zero_sized_slice<'a, T>(len: usize) -> &'a mut [T] {
    debug_assert_eq!(size_of::<T>(), 0);
    // SAFETY: `T` occupies no memory, so a dangling, well-aligned pointer is
    // valid for reads and writes of any number of elements.
    unsafe { std::slice::from_raw_parts_mut(NonNull::<T>::dangling().as_ptr(), len) }
}

/// Host allocation whose base is aligned for every supported key and value type.
#[derive(Clone, Debug, Default)]
pub struct TemporaryStorage {
    words: Vec<u128>,
    bytes: usize,
}

impl TemporaryStorage {
    pub fn allocate(bytes: usize) -> Self {
        Self {
            words: vec![0; bytes.div_ceil(size_of::<u128>())],
            bytes,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes == 0
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut::<u128, u8>(&mut self.words)[..self.bytes]
    }
}
