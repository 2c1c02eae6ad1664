use crate::config::SegmentedRadixSortConfig;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PassKind {
    Long,
    Short,
}

/// One digit-extraction pass over `[bit, bit + width)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pass {
    pub bit: u32,
    pub width: u32,
    pub kind: PassKind,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RadixSchedule {
    pub begin_bit: u32,
    pub end_bit: u32,
    pub long_radix_bits: u32,
    pub short_radix_bits: u32,
    pub long_iterations: u32,
    pub short_iterations: u32,
}

impl RadixSchedule {
    /// Requires `begin_bit < end_bit` and `1 <= short <= long`.
    pub fn new(begin_bit: u32, end_bit: u32, long_radix_bits: u32, short_radix_bits: u32) -> Self {
        debug_assert!(begin_bit < end_bit);
        debug_assert!(short_radix_bits >= 1 && short_radix_bits <= long_radix_bits);

        let bits = end_bit - begin_bit;
        let iterations = bits.div_ceil(long_radix_bits);
        let radix_bits_diff = long_radix_bits - short_radix_bits;
        // Truncating division; the pass count fixes the buffer parity.
        let short_iterations = if radix_bits_diff != 0 {
            iterations.min((long_radix_bits * iterations - bits) / radix_bits_diff)
        } else {
            0
        };

        Self {
            begin_bit,
            end_bit,
            long_radix_bits,
            short_radix_bits,
            long_iterations: iterations - short_iterations,
            short_iterations,
        }
    }

    pub fn from_config(begin_bit: u32, end_bit: u32, config: &SegmentedRadixSortConfig) -> Self {
        Self::new(
            begin_bit,
            end_bit,
            config.long_radix_bits,
            config.short_radix_bits,
        )
    }

    #[inline]
    pub fn iterations(&self) -> u32 {
        self.long_iterations + self.short_iterations
    }

    #[inline]
    pub fn radix_bits_diff(&self) -> u32 {
        self.long_radix_bits - self.short_radix_bits
    }

    /// Widest digit any pass extracts.
    #[inline]
    pub fn max_width(&self) -> u32 {
        self.long_radix_bits.min(self.end_bit - self.begin_bit)
    }

    /// Long passes first, then short ones; the last pass is clamped to `end_bit`.
    pub fn passes(&self) -> impl Iterator<Item = Pass> + '_ {
        let long = (0..self.long_iterations).map(|_| (PassKind::Long, self.long_radix_bits));
        let short = (0..self.short_iterations).map(|_| (PassKind::Short, self.short_radix_bits));
        long.chain(short).scan(self.begin_bit, |bit, (kind, nominal)| {
            let start = *bit;
            let width = nominal.min(self.end_bit.saturating_sub(start));
            *bit = start + nominal;
            Some(Pass {
                bit: start,
                width,
                kind,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers_range(schedule: &RadixSchedule) {
        let mut next = schedule.begin_bit;
        for pass in schedule.passes() {
            assert_eq!(pass.bit, next, "gap or overlap in {schedule:?}");
            assert!(pass.width > 0, "empty pass in {schedule:?}");
            next += pass.width;
        }
        assert_eq!(next, schedule.end_bit, "{schedule:?}");
        assert_eq!(schedule.passes().count() as u32, schedule.iterations());
    }

    #[test]
    fn formula_known_cases() {
        let s = RadixSchedule::new(0, 32, 7, 6);
        assert_eq!((s.long_iterations, s.short_iterations), (2, 3));

        let s = RadixSchedule::new(0, 64, 7, 6);
        assert_eq!((s.long_iterations, s.short_iterations), (4, 6));

        let s = RadixSchedule::new(0, 8, 8, 7);
        assert_eq!((s.long_iterations, s.short_iterations), (1, 0));

        let s = RadixSchedule::new(0, 16, 8, 7);
        assert_eq!((s.long_iterations, s.short_iterations), (2, 0));

        let s = RadixSchedule::new(0, 5, 7, 6);
        assert_eq!((s.long_iterations, s.short_iterations), (0, 1));

        let s = RadixSchedule::new(0, 20, 8, 8);
        assert_eq!((s.long_iterations, s.short_iterations), (3, 0));
    }

    #[test]
    fn exact_budget_when_widths_differ() {
        for long in 2..=8 {
            for short in 1..long {
                for bits in long..=64 {
                    let s = RadixSchedule::new(0, bits, long, short);
                    let total = s.long_iterations * long + s.short_iterations * short;
                    assert!(total >= bits, "long={long} short={short} bits={bits}");
                    assert_eq!(s.iterations(), bits.div_ceil(long));
                }
            }
        }
    }

    #[test]
    fn passes_cover_range_without_gaps() {
        for (begin, end) in [(0, 32), (0, 64), (3, 17), (0, 1), (60, 64), (5, 13)] {
            for (long, short) in [(8, 7), (7, 6), (4, 4), (8, 1), (16, 11)] {
                assert_covers_range(&RadixSchedule::new(begin, end, long, short));
            }
        }
    }

    #[test]
    fn last_pass_is_clamped() {
        let s = RadixSchedule::new(0, 20, 8, 8);
        let widths: Vec<u32> = s.passes().map(|p| p.width).collect();
        assert_eq!(widths, vec![8, 8, 4]);
        assert_eq!(s.max_width(), 8);

        let s = RadixSchedule::new(0, 3, 8, 8);
        assert_eq!(s.max_width(), 3);
    }
}
