use bytemuck::Pod;

/// A fixed-width arithmetic key that can be sorted digit by digit.
///
/// `to_radix` maps a key onto an unsigned integer whose natural order matches
/// the key's order, so every radix pass only has to look at raw bits.
pub trait RadixKey: Pod + Send + Sync {
    /// Width of the key in bits; also the default `end_bit`.
    const BITS: u32;
    /// Floating-point keys only support the full bit range.
    const IS_FLOAT: bool;

    fn to_radix(self) -> u64;
}

macro_rules! impl_unsigned_key {
    ($($t:ty),*) => {$(
        impl RadixKey for $t {
            const BITS: u32 = <$t>::BITS;
            const IS_FLOAT: bool = false;

            #[inline(always)]
            fn to_radix(self) -> u64 {
                self as u64
            }
        }
    )*};
}

macro_rules! impl_signed_key {
    ($($t:ty => $u:ty),*) => {$(
        impl RadixKey for $t {
            const BITS: u32 = <$t>::BITS;
            const IS_FLOAT: bool = false;

            #[inline(always)]
            fn to_radix(self) -> u64 {
                ((self as $u) ^ (1 << (<$u>::BITS - 1))) as u64
            }
        }
    )*};
}

macro_rules! impl_float_key {
    ($($t:ty => $u:ty),*) => {$(
        impl RadixKey for $t {
            const BITS: u32 = <$u>::BITS;
            const IS_FLOAT: bool = true;

            #[inline(always)]
            fn to_radix(self) -> u64 {
                const SIGN: $u = 1 << (<$u>::BITS - 1);
                // -0.0 and +0.0 share one encoding.
                let bits = if self == 0.0 { 0 } else { self.to_bits() };
                let mask = if bits & SIGN != 0 { <$u>::MAX } else { SIGN };
                (bits ^ mask) as u64
            }
        }
    )*};
}

impl_unsigned_key!(u8, u16, u32, u64);
impl_signed_key!(i8 => u8, i16 => u16, i32 => u32, i64 => u64);
impl_float_key!(f32 => u32, f64 => u64);

#[inline(always)]
pub(crate) fn low_mask(width: u32) -> u64 {
    if width >= u64::BITS {
        u64::MAX
    } else {
        (1_u64 << width) - 1
    }
}

/// Encoded key in the direction of the sort.
#[inline(always)]
pub(crate) fn sort_bits<K: RadixKey>(key: K, descending: bool) -> u64 {
    let encoded = key.to_radix();
    if descending { !encoded } else { encoded }
}

#[inline(always)]
pub(crate) fn digit(encoded: u64, bit: u32, width: u32) -> usize {
    ((encoded >> bit) & low_mask(width)) as usize
}

/// Only the bits in `[begin_bit, end_bit)`, shifted down to bit 0.
#[inline(always)]
pub(crate) fn masked(encoded: u64, begin_bit: u32, end_bit: u32) -> u64 {
    (encoded >> begin_bit) & low_mask(end_bit - begin_bit)
}
