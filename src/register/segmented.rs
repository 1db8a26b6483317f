//! Segmented reductions and broadcasts.
//!
//! A register of width `N` is viewed as `N >> segbits` segments of
//! `1 << segbits` adjacent lanes. "Inner" operations work within a segment,
//! "outer" operations across segments on lanes with the same in-segment
//! position. Sums run the same butterfly exchanges as the full reduction, then
//! one permute compacts the per-segment totals into the requested output
//! segment.

use super::Register;
use crate::backend::RegisterBackend;
use crate::element::Element;

impl<T: Element, B: RegisterBackend<T>, const N: usize> Register<T, B, N> {
    #[inline(always)]
    fn check_segbits(segbits: u32) {
        debug_assert!(
            (1usize << segbits) <= N,
            "segment of {} lanes exceeds width {N}",
            1usize << segbits
        );
    }

    /// Sums each segment of `1 << segbits` adjacent lanes.
    ///
    /// The total of the segment containing lane `i` lands in lane
    /// `(i >> segbits) + (output_segment * N >> segbits)`. Every other lane is
    /// zero.
    ///
    /// ```
    /// use trueno_simt::backend::Warp;
    /// use trueno_simt::register::Register;
    ///
    /// let x = Register::<i32, Warp, 8>::from_lanes([1, 2, 3, 4, 5, 6, 7, 8]);
    /// assert_eq!(x.segmented_sum_inner(1, 0).to_lanes(), [3, 7, 11, 15, 0, 0, 0, 0]);
    /// assert_eq!(x.segmented_sum_inner(1, 1).to_lanes(), [0, 0, 0, 0, 3, 7, 11, 15]);
    /// ```
    #[inline]
    pub fn segmented_sum_inner(&self, segbits: u32, output_segment: usize) -> Self {
        Self::check_segbits(segbits);

        let mut acc = B::mask_lanes(self.value, T::ZERO, N);
        for level in 0..segbits {
            acc = B::add(acc, B::exchange(acc, 1 << level));
        }

        let offset = (output_segment * N) >> segbits;
        let segments = N.div_ceil(1 << segbits);
        Self::from_native(B::permute(acc, N, |lane| {
            let segment = lane.checked_sub(offset)?;
            (segment < segments).then_some(segment << segbits)
        }))
    }

    /// Sums the lanes that share an in-segment position.
    ///
    /// The total over every lane `j` with `j & mask == i & mask` (where
    /// `mask = (1 << segbits) - 1`) lands in lane
    /// `(i & mask) + (output_segment << segbits)`. Every other lane is zero.
    #[inline]
    pub fn segmented_sum_outer(&self, segbits: u32, output_segment: usize) -> Self {
        Self::check_segbits(segbits);

        let mut acc = B::mask_lanes(self.value, T::ZERO, N);
        let mut distance = 1 << segbits;
        while distance < N {
            acc = B::add(acc, B::exchange(acc, distance));
            distance <<= 1;
        }

        let width = 1 << segbits;
        let offset = output_segment << segbits;
        Self::from_native(B::permute(acc, N, |lane| {
            let position = lane.checked_sub(offset)?;
            (position < width).then_some(position)
        }))
    }

    /// Lane-wise product followed by [`Register::segmented_sum_inner`].
    #[inline]
    pub fn segmented_dot(&self, segbits: u32, output_segment: usize, other: &Self) -> Self {
        self.multiply(*other).segmented_sum_inner(segbits, output_segment)
    }

    /// Repeats segment `input_segment` across the whole register.
    ///
    /// Lane `i` receives lane `(i & mask) + (input_segment << segbits)`.
    #[inline]
    pub fn segmented_broadcast_inner(&self, segbits: u32, input_segment: usize) -> Self {
        Self::check_segbits(segbits);

        let mask = (1 << segbits) - 1;
        let offset = input_segment << segbits;
        Self::from_native(B::permute(self.value, N, |lane| {
            let source = (lane & mask) + offset;
            (source < N).then_some(source)
        }))
    }

    /// Spreads consecutive lanes of one input segment, each across a whole
    /// output segment.
    ///
    /// Lane `i` receives lane `(N >> segbits) * input_segment + (i >> segbits)`.
    #[inline]
    pub fn segmented_broadcast_outer(&self, segbits: u32, input_segment: usize) -> Self {
        Self::check_segbits(segbits);

        let offset = (N >> segbits) * input_segment;
        Self::from_native(B::permute(self.value, N, |lane| {
            let source = offset + (lane >> segbits);
            (source < N).then_some(source)
        }))
    }
}
