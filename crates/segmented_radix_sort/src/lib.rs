//! Segmented radix sort.
//!
//! Sorts many independent, contiguous segments of one flat key (or key/value)
//! array by the radix digits of a fixed-width key. Segments are described by
//! begin/end offset pairs; every segment is sorted stably and independently.
//! Work runs on a [`Stream`], a data-parallel worker pool that plays the role
//! of an accelerator queue.
//!
//! Calls follow a two-phase protocol: first query the temporary storage size
//! with `storage == None`, then call again with a buffer of that size.
//!
//! ```
//! use segmented_radix_sort::{Segments, SortOptions, Stream, TemporaryStorage, sort_keys};
//!
//! let keys = [6_u32, 3, 5, 4, 2, 8, 1, 7];
//! let mut out = [0; 8];
//! let offsets = [0_u32, 2, 3, 8];
//! let segments = Segments::from_offsets(&offsets);
//! let (options, stream) = (SortOptions::default(), Stream::new());
//!
//! let mut size = 0;
//! sort_keys(None, &mut size, &keys, &mut out, &segments, &options, &stream)?;
//! let mut storage = TemporaryStorage::allocate(size);
//! let bytes = Some(storage.as_bytes_mut());
//! sort_keys(bytes, &mut size, &keys, &mut out, &segments, &options, &stream)?;
//! assert_eq!(out, [3, 6, 5, 1, 2, 4, 7, 8]);
//! # Ok::<(), segmented_radix_sort::SortError>(())
//! ```

mod buffer;
mod classify;
pub mod config;
mod device;
mod digit_pass;
mod error;
mod key;
mod partition;
mod schedule;
mod segment;
mod sort;
pub mod storage;
mod strategy;

pub use buffer::{DoubleBuffer, ResultLocation};
pub use config::SegmentedRadixSortConfig;
pub use device::Stream;
pub use error::{Result, SortError};
pub use key::RadixKey;
pub use partition::{DEFAULT_PARTITION_TILE, SegmentPartitioner, SegmentPredicate, StablePartition};
pub use schedule::{Pass, PassKind, RadixSchedule};
pub use segment::{SegmentOffset, Segments};
pub use sort::{
    SortOptions, sort_keys, sort_keys_desc, sort_keys_desc_double_buffer, sort_keys_double_buffer,
    sort_pairs, sort_pairs_desc, sort_pairs_desc_double_buffer, sort_pairs_double_buffer,
};
pub use storage::TemporaryStorage;
