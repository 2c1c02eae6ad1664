/// A pair of equally sized buffers with a swappable "current" role.
///
/// `current` always holds the logically valid data. Sorting into a double
/// buffer may leave the result in either physical buffer; the entry points
/// flip the roles afterwards so `current` holds the sorted output.
#[derive(Debug)]
pub struct DoubleBuffer<'a, T> {
    buffers: [&'a mut [T]; 2],
    selector: usize,
}

impl<'a, T> DoubleBuffer<'a, T> {
    pub fn new(current: &'a mut [T], alternate: &'a mut [T]) -> Self {
        Self {
            buffers: [current, alternate],
            selector: 0,
        }
    }

    #[inline]
    pub fn current(&self) -> &[T] {
        &*self.buffers[self.selector]
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut [T] {
        &mut *self.buffers[self.selector]
    }

    #[inline]
    pub fn alternate(&self) -> &[T] {
        &*self.buffers[self.selector ^ 1]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffers[self.selector].len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the physical buffer currently playing the "current" role.
    #[inline]
    pub fn selector(&self) -> usize {
        self.selector
    }

    #[inline]
    pub fn swap(&mut self) {
        self.selector ^= 1;
    }

    /// `(current, alternate)` borrowed mutably at the same time.
    pub(crate) fn split_mut(&mut self) -> (&mut [T], &mut [T]) {
        let [first, second] = &mut self.buffers;
        if self.selector == 0 {
            (&mut **first, &mut **second)
        } else {
            (&mut **second, &mut **first)
        }
    }
}

/// Physical buffer holding the result of a finished sort.
///
/// `Primary` is the buffer the data was read from when the caller supplied a
/// double buffer (its `current`); `Alternate` is the write target that is not
/// the input: the caller's output slice, or the double buffer's `alternate`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResultLocation {
    Primary,
    Alternate,
}

impl ResultLocation {
    /// Post-step for double-buffer calls: make `current` point at the result.
    pub fn apply<T>(self, buffer: &mut DoubleBuffer<'_, T>) {
        if self == ResultLocation::Alternate {
            buffer.swap();
        }
    }
}

/// Where each pass writes and where the final pass lands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Placement {
    /// Whether the first pass writes into the output buffer.
    pub to_output: bool,
    pub result: ResultLocation,
}

impl Placement {
    pub fn new(iterations: u32, with_double_buffer: bool) -> Self {
        debug_assert!(iterations > 0);
        let to_output = with_double_buffer || (iterations - 1) % 2 == 0;
        let is_result_in_output = (iterations % 2 == 0) != to_output;
        Self {
            to_output,
            result: if is_result_in_output {
                ResultLocation::Alternate
            } else {
                ResultLocation::Primary
            },
        }
    }

    #[inline]
    pub fn is_result_in_output(&self) -> bool {
        self.result == ResultLocation::Alternate
    }

    /// Whether pass number `pass` (0-based) writes into the output buffer.
    #[inline]
    pub fn pass_writes_output(&self, pass: u32) -> bool {
        self.to_output != (pass % 2 == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separate_output_always_ends_in_output() {
        for iterations in 1..=12 {
            let placement = Placement::new(iterations, false);
            assert!(placement.is_result_in_output(), "iterations={iterations}");
            assert!(placement.pass_writes_output(iterations - 1));
        }
    }

    #[test]
    fn double_buffer_follows_parity() {
        for iterations in 1..=12 {
            let placement = Placement::new(iterations, true);
            assert!(placement.to_output);
            let expected = if iterations % 2 == 1 {
                ResultLocation::Alternate
            } else {
                ResultLocation::Primary
            };
            assert_eq!(placement.result, expected, "iterations={iterations}");
            assert_eq!(
                placement.pass_writes_output(iterations - 1),
                placement.is_result_in_output()
            );
        }
    }

    #[test]
    fn passes_alternate_targets() {
        let placement = Placement::new(4, false);
        let targets: Vec<bool> = (0..4).map(|p| placement.pass_writes_output(p)).collect();
        assert_eq!(targets, vec![false, true, false, true]);
    }

    #[test]
    fn swap_applies_only_for_alternate() {
        let mut a = [1, 2, 3];
        let mut b = [4, 5, 6];
        let mut buffer = DoubleBuffer::new(&mut a, &mut b);

        ResultLocation::Primary.apply(&mut buffer);
        assert_eq!(buffer.current(), &[1, 2, 3]);

        ResultLocation::Alternate.apply(&mut buffer);
        assert_eq!(buffer.current(), &[4, 5, 6]);
        assert_eq!(buffer.alternate(), &[1, 2, 3]);
        assert_eq!(buffer.selector(), 1);

        let (current, alternate) = buffer.split_mut();
        current[0] = 40;
        alternate[0] = 10;
        assert_eq!(buffer.current(), &[40, 5, 6]);
        assert_eq!(buffer.alternate(), &[10, 2, 3]);
    }
}
