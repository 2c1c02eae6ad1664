use crate::key::{RadixKey, digit, sort_bits};

/// Scatters `src` into `dst` ordered by the digit `[bit, bit + width)`.
///
/// Elements with equal digits keep their relative order, which is what makes
/// the LSD pass sequence stable. Values follow their keys.
#[allow(clippy::too_many_arguments)]
pub(crate) fn scatter_digit<K: RadixKey, V: Copy>(
    src_keys: &[K],
    src_values: &[V],
    dst_keys: &mut [K],
    dst_values: &mut [V],
    bit: u32,
    width: u32,
    descending: bool,
    counts: &mut Vec<usize>,
) {
    debug_assert_eq!(src_keys.len(), dst_keys.len());
    debug_assert_eq!(src_values.len(), dst_values.len());

    counts.clear();
    counts.resize(1 << width, 0);
    for &key in src_keys {
        counts[digit(sort_bits(key, descending), bit, width)] += 1;
    }
    prefix_sum(counts);

    for (i, &key) in src_keys.iter().enumerate() {
        let d = digit(sort_bits(key, descending), bit, width);
        let pos = counts[d];
        dst_keys[pos] = key;
        dst_values[pos] = src_values[i];
        counts[d] = pos + 1;
    }
}

#[inline]
fn prefix_sum(counts: &mut [usize]) {
    let mut sum = 0usize;
    for c in counts.iter_mut() {
        let old = *c;
        *c = sum;
        sum += old;
    }
}
