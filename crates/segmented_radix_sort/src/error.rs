use thiserror::Error;

/// Device-side failures ([`SortError::Device`], [`SortError::Partition`]) are
/// forwarded unchanged; the other variants come from argument validation.
#[derive(Debug, Error)]
pub enum SortError {
    #[error("bit range [{begin_bit}, {end_bit}) is invalid for a {key_bits}-bit key")]
    InvalidBitRange {
        begin_bit: u32,
        end_bit: u32,
        key_bits: u32,
    },
    #[error("floating-point keys only support the full bit range [0, {key_bits})")]
    FloatBitRange { key_bits: u32 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("temporary storage holds {provided} bytes but {required} are required")]
    StorageTooSmall { required: usize, provided: usize },
    #[error("temporary storage region `{region}` is not aligned for its element type")]
    MisalignedStorage { region: &'static str },
    #[error("`{buffer}` holds {actual} elements, expected {expected}")]
    LengthMismatch {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{segments} segments need {required} {which} offsets, got {actual}")]
    OffsetsTooShort {
        which: &'static str,
        segments: usize,
        required: usize,
        actual: usize,
    },
    #[error("segment {segment} spans [{begin}, {end}) which is outside [0, {len})")]
    SegmentOutOfBounds {
        segment: usize,
        begin: usize,
        end: usize,
        len: usize,
    },
    #[error("segments {first} and {second} overlap")]
    OverlappingSegments { first: usize, second: usize },
    #[error("segment partition failed: {0}")]
    Partition(String),
    #[error("device fault in `{kernel}`: {reason}")]
    Device {
        kernel: &'static str,
        reason: String,
    },
    #[error("failed to start device worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, SortError>;
