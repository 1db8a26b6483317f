//! Fixed-width SIMD/SIMT registers.
//!
//! [`Register<T, B, N>`] exposes `N` logical lanes of element type `T` on top of
//! one native register of backend `B`. The same kernel source compiles against
//! every backend: only the type parameter changes.
//!
//! ```
//! use trueno_simt::backend::Warp;
//! use trueno_simt::register::Register;
//!
//! let x = Register::<f32, Warp, 7>::from_lanes([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
//! assert_eq!(x.sum(), 28.0);
//! assert_eq!(x.max(), 7.0);
//! assert_eq!(x.min(), 1.0);
//! ```
//!
//! # Width
//!
//! `N` must lie in `1..=B::LANES`. The bound is checked at compile time: naming
//! a `Register<f32, Avx, 9>` and constructing it is a build error, not a
//! runtime panic.
//!
//! # Partial registers
//!
//! When `N < B::LANES` the physical lanes `N..` are zero after every load and
//! are never written by a store. Reductions replace them with the operator's
//! neutral value once before the butterfly, so they can never leak into a
//! result.
//!
//! # Safety
//!
//! The raw-pointer [`Register::load`] / [`Register::store`] family is `unsafe`:
//! the caller guarantees that every touched element is valid. The slice forms
//! check bounds and are safe.
#![allow(unsafe_code)]

mod ops;
mod segmented;

use crate::backend::RegisterBackend;
use crate::element::Element;
use std::fmt;
use std::marker::PhantomData;

/// `N` lanes of `T` held in one native register of backend `B`.
pub struct Register<T: Element, B: RegisterBackend<T>, const N: usize> {
    value: B::Native,
    _marker: PhantomData<T>,
}

impl<T: Element, B: RegisterBackend<T>, const N: usize> Clone for Register<T, B, N> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Element, B: RegisterBackend<T>, const N: usize> Copy for Register<T, B, N> {}

impl<T: Element, B: RegisterBackend<T>, const N: usize> Register<T, B, N> {
    const WIDTH_OK: () = assert!(
        N >= 1 && N <= B::LANES,
        "register width must be between 1 and the backend's physical lane count"
    );

    /// Logical lane count.
    pub const WIDTH: usize = N;

    /// Physical lane count of the backing register.
    pub const PHYSICAL_WIDTH: usize = B::LANES;

    /// Wraps a native register. Lanes `N..` are carried along untouched.
    #[inline(always)]
    pub fn from_native(value: B::Native) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::WIDTH_OK;
        Self {
            value,
            _marker: PhantomData,
        }
    }

    /// The underlying native register.
    #[inline(always)]
    pub fn native(&self) -> B::Native {
        self.value
    }

    /// All lanes zero.
    #[inline(always)]
    pub fn new() -> Self {
        Self::from_native(B::zero())
    }

    /// Every lane set to `value`.
    #[inline(always)]
    pub fn splat(value: T) -> Self {
        Self::from_native(B::splat(value))
    }

    /// Alias of [`Register::splat`].
    #[inline(always)]
    pub fn broadcast(value: T) -> Self {
        Self::splat(value)
    }

    /// Builds a register from its logical lanes.
    #[inline]
    pub fn from_lanes(lanes: [T; N]) -> Self {
        // SAFETY: `lanes` holds exactly `N` readable elements.
        unsafe { Self::load_packed_n(lanes.as_ptr(), N) }
    }

    /// Copies the logical lanes out.
    #[inline]
    pub fn to_lanes(&self) -> [T; N] {
        std::array::from_fn(|lane| B::extract(self.value, lane))
    }

    /// Overwrites every lane with `other`'s.
    #[inline(always)]
    pub fn copy_from(&mut self, other: &Self) -> &mut Self {
        self.value = other.value;
        self
    }

    /// Reads lane `lane`.
    #[inline(always)]
    pub fn get(&self, lane: usize) -> T {
        debug_assert!(lane < N, "lane {lane} out of range for width {N}");
        B::extract(self.value, lane)
    }

    /// Writes lane `lane`.
    #[inline(always)]
    pub fn set(&mut self, lane: usize, value: T) -> &mut Self {
        debug_assert!(lane < N, "lane {lane} out of range for width {N}");
        self.value = B::insert(self.value, lane, value);
        self
    }

    // ========================================================================
    // Memory
    // ========================================================================

    /// Loads `N` elements spaced `stride` apart.
    ///
    /// Stride 1 is one native load (masked when `N` is below the physical
    /// width); any other stride is an element-by-element gather.
    ///
    /// # Safety
    ///
    /// `ptr.offset(i * stride)` must be valid for reads for every `i < N`.
    #[inline(always)]
    pub unsafe fn load(ptr: *const T, stride: isize) -> Self {
        // SAFETY: forwarded caller contract with `n == N`.
        unsafe { Self::load_strided_n(ptr, stride, N) }
    }

    /// Loads the first `n` contiguous elements; lanes `n..` are zero.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `n` elements, and `n <= N`.
    #[inline(always)]
    pub unsafe fn load_packed_n(ptr: *const T, n: usize) -> Self {
        debug_assert!(n <= N, "partial load of {n} lanes exceeds width {N}");
        // SAFETY: forwarded caller contract.
        Self::from_native(unsafe { B::load_packed(ptr, n) })
    }

    /// Loads the first `n` elements spaced `stride` apart; lanes `n..` are zero.
    ///
    /// # Safety
    ///
    /// `ptr.offset(i * stride)` must be valid for reads for every `i < n`, and
    /// `n <= N`.
    #[inline(always)]
    pub unsafe fn load_strided_n(ptr: *const T, stride: isize, n: usize) -> Self {
        debug_assert!(n <= N, "partial load of {n} lanes exceeds width {N}");
        // SAFETY: forwarded caller contract.
        let value = unsafe {
            if stride == 1 {
                B::load_packed(ptr, n)
            } else {
                B::load_strided(ptr, stride, n)
            }
        };
        Self::from_native(value)
    }

    /// Stores the `N` lanes spaced `stride` apart.
    ///
    /// Memory between and beyond the touched elements is not written.
    ///
    /// # Safety
    ///
    /// `ptr.offset(i * stride)` must be valid for writes for every `i < N`.
    #[inline(always)]
    pub unsafe fn store(&self, ptr: *mut T, stride: isize) {
        // SAFETY: forwarded caller contract with `n == N`.
        unsafe { self.store_strided_n(ptr, stride, N) }
    }

    /// Stores the first `n` lanes contiguously.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writes of `n` elements, and `n <= N`.
    #[inline(always)]
    pub unsafe fn store_packed_n(&self, ptr: *mut T, n: usize) {
        debug_assert!(n <= N, "partial store of {n} lanes exceeds width {N}");
        // SAFETY: forwarded caller contract.
        unsafe { B::store_packed(self.value, ptr, n) }
    }

    /// Stores the first `n` lanes spaced `stride` apart.
    ///
    /// # Safety
    ///
    /// `ptr.offset(i * stride)` must be valid for writes for every `i < n`, and
    /// `n <= N`.
    #[inline(always)]
    pub unsafe fn store_strided_n(&self, ptr: *mut T, stride: isize, n: usize) {
        debug_assert!(n <= N, "partial store of {n} lanes exceeds width {N}");
        // SAFETY: forwarded caller contract.
        unsafe {
            if stride == 1 {
                B::store_packed(self.value, ptr, n);
            } else {
                B::store_strided(self.value, ptr, stride, n);
            }
        }
    }

    /// Loads the first `N` elements of `src`.
    ///
    /// # Panics
    ///
    /// If `src` is shorter than `N`.
    #[inline]
    pub fn load_slice(src: &[T]) -> Self {
        assert!(src.len() >= N, "slice of {} elements too short for width {N}", src.len());
        // SAFETY: the first `N` elements of `src` are readable.
        unsafe { Self::load_packed_n(src.as_ptr(), N) }
    }

    /// Loads `src[0], src[stride], …, src[(N-1) * stride]`.
    ///
    /// # Panics
    ///
    /// If `stride` is zero or the last touched index is out of bounds.
    #[inline]
    pub fn load_strided(src: &[T], stride: usize) -> Self {
        assert!(stride > 0, "stride must be positive");
        assert!(
            (N - 1) * stride < src.len(),
            "slice of {} elements too short for width {N} at stride {stride}",
            src.len()
        );
        // SAFETY: every index `i * stride` with `i < N` is in bounds.
        unsafe { Self::load_strided_n(src.as_ptr(), stride as isize, N) }
    }

    /// Stores the lanes into the first `N` elements of `dst`.
    ///
    /// # Panics
    ///
    /// If `dst` is shorter than `N`.
    #[inline]
    pub fn store_slice(&self, dst: &mut [T]) {
        assert!(dst.len() >= N, "slice of {} elements too short for width {N}", dst.len());
        // SAFETY: the first `N` elements of `dst` are writable.
        unsafe { self.store_packed_n(dst.as_mut_ptr(), N) }
    }

    /// Stores lane `i` into `dst[i * stride]`.
    ///
    /// # Panics
    ///
    /// If `stride` is zero or the last touched index is out of bounds.
    #[inline]
    pub fn store_strided(&self, dst: &mut [T], stride: usize) {
        assert!(stride > 0, "stride must be positive");
        assert!(
            (N - 1) * stride < dst.len(),
            "slice of {} elements too short for width {N} at stride {stride}",
            dst.len()
        );
        // SAFETY: every index `i * stride` with `i < N` is in bounds.
        unsafe { self.store_strided_n(dst.as_mut_ptr(), stride as isize, N) }
    }

    /// Lane `i` reads `src[offsets[i]]`.
    #[inline]
    pub fn gather(src: &[T], offsets: &[usize; N]) -> Self {
        Self::gather_n(src, offsets, N)
    }

    /// Gathers the first `n` lanes; lanes `n..` are zero.
    #[inline]
    pub fn gather_n(src: &[T], offsets: &[usize], n: usize) -> Self {
        debug_assert!(n <= N && n <= offsets.len());
        let mut value = B::zero();
        for (lane, &offset) in offsets.iter().take(n).enumerate() {
            value = B::insert(value, lane, src[offset]);
        }
        Self::from_native(value)
    }

    /// Writes lane `i` to `dst[offsets[i]]`.
    #[inline]
    pub fn scatter(&self, dst: &mut [T], offsets: &[usize; N]) {
        self.scatter_n(dst, offsets, N);
    }

    /// Scatters the first `n` lanes.
    #[inline]
    pub fn scatter_n(&self, dst: &mut [T], offsets: &[usize], n: usize) {
        debug_assert!(n <= N && n <= offsets.len());
        for (lane, &offset) in offsets.iter().take(n).enumerate() {
            dst[offset] = B::extract(self.value, lane);
        }
    }

    // ========================================================================
    // Element-wise arithmetic
    // ========================================================================

    /// Lane-wise `self + other`.
    #[inline(always)]
    pub fn add(self, other: Self) -> Self {
        Self::from_native(B::add(self.value, other.value))
    }

    /// Lane-wise `self - other`.
    #[inline(always)]
    pub fn subtract(self, other: Self) -> Self {
        Self::from_native(B::sub(self.value, other.value))
    }

    /// Lane-wise `self * other`.
    #[inline(always)]
    pub fn multiply(self, other: Self) -> Self {
        Self::from_native(B::mul(self.value, other.value))
    }

    /// Lane-wise `self / other`. Only the `N` logical lanes are divided.
    #[inline(always)]
    pub fn divide(self, other: Self) -> Self {
        Self::from_native(B::div(self.value, other.value, N))
    }

    /// `self * b + c` with two roundings.
    #[inline(always)]
    pub fn multiply_add(self, b: Self, c: Self) -> Self {
        self.multiply(b).add(c)
    }

    /// `self * b - c` with two roundings.
    #[inline(always)]
    pub fn multiply_subtract(self, b: Self, c: Self) -> Self {
        self.multiply(b).subtract(c)
    }

    /// `self * b + c`, one rounding on backends with a native FMA.
    #[inline(always)]
    pub fn fused_multiply_add(self, b: Self, c: Self) -> Self {
        Self::from_native(B::mul_add(self.value, b.value, c.value))
    }

    /// Lane-wise maximum.
    #[inline(always)]
    pub fn vmax(self, other: Self) -> Self {
        Self::from_native(B::max(self.value, other.value))
    }

    /// Lane-wise minimum.
    #[inline(always)]
    pub fn vmin(self, other: Self) -> Self {
        Self::from_native(B::min(self.value, other.value))
    }

    // ========================================================================
    // Reductions
    // ========================================================================

    /// Sum of the `N` lanes.
    #[inline]
    pub fn sum(&self) -> T {
        self.reduce(T::ZERO, B::add)
    }

    /// Largest of the `N` lanes.
    #[inline]
    pub fn max(&self) -> T {
        self.reduce(self.get(0), B::max)
    }

    /// Smallest of the `N` lanes.
    #[inline]
    pub fn min(&self) -> T {
        self.reduce(self.get(0), B::min)
    }

    /// Sum of lane-wise products.
    #[inline]
    pub fn dot(&self, other: &Self) -> T {
        self.multiply(*other).sum()
    }

    /// Butterfly reduction.
    ///
    /// Width 1 reads lane 0 and width 2 combines lane 0 with its neighbour.
    /// Any wider register first overwrites lanes `N..` with `neutral`, then
    /// runs `ceil(log2(N))` exchange-and-combine steps at distances 1, 2, 4, …
    /// after which lane 0 holds the result.
    #[inline(always)]
    fn reduce<F>(&self, neutral: T, op: F) -> T
    where
        F: Fn(B::Native, B::Native) -> B::Native,
    {
        match N {
            1 => B::extract(self.value, 0),
            2 => B::extract(op(self.value, B::exchange(self.value, 1)), 0),
            _ => {
                let mut acc = B::mask_lanes(self.value, neutral, N);
                let mut distance = 1;
                while distance < N {
                    acc = op(acc, B::exchange(acc, distance));
                    distance <<= 1;
                }
                B::extract(acc, 0)
            }
        }
    }
}

impl<T: Element, B: RegisterBackend<T>, const N: usize> Default for Register<T, B, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element, B: RegisterBackend<T>, const N: usize> PartialEq for Register<T, B, N> {
    /// Compares the logical lanes only.
    fn eq(&self, other: &Self) -> bool {
        (0..N).all(|lane| B::extract(self.value, lane) == B::extract(other.value, lane))
    }
}

impl<T: Element, B: RegisterBackend<T>, const N: usize> fmt::Debug for Register<T, B, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Register")
            .field("backend", &B::KIND)
            .field("lanes", &self.to_lanes())
            .finish()
    }
}

impl<T: Element, B: RegisterBackend<T>, const N: usize> fmt::Display for Register<T, B, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for lane in 0..N {
            if lane > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", self.get(lane))?;
        }
        f.write_str("]")
    }
}

impl<T: Element, B: RegisterBackend<T>, const N: usize> From<[T; N]> for Register<T, B, N> {
    fn from(lanes: [T; N]) -> Self {
        Self::from_lanes(lanes)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::backend::{Scalar, Warp};

    /// Runs `$check::<$backend, N>()` for every listed width.
    macro_rules! for_widths {
        ($check:ident, $backend:ty; $($n:literal)*) => {
            $( $check::<$backend, $n>(); )*
        };
    }
    pub(crate) use for_widths;

    fn sample<const N: usize>() -> [f64; N] {
        std::array::from_fn(|i| ((i * 7 + 3) % 11) as f64 - 4.0)
    }

    fn check_reductions<B: RegisterBackend<f64>, const N: usize>() {
        let lanes = sample::<N>();
        let x = Register::<f64, B, N>::from_lanes(lanes);

        let sum: f64 = lanes.iter().sum();
        let max = lanes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = lanes.iter().copied().fold(f64::INFINITY, f64::min);

        assert_eq!(x.sum(), sum, "sum at width {N}");
        assert_eq!(x.max(), max, "max at width {N}");
        assert_eq!(x.min(), min, "min at width {N}");
    }

    fn check_f32<B: RegisterBackend<f32>, const N: usize>() {
        let lanes: [f32; N] = std::array::from_fn(|i| (i as f32 - 3.0) * 1.5);
        let x = Register::<f32, B, N>::from_lanes(lanes);
        assert_eq!(x.sum(), lanes.iter().sum::<f32>(), "sum at width {N}");
        assert_eq!(x.max(), lanes.iter().copied().fold(f32::MIN, f32::max), "max at width {N}");
        assert_eq!(x.min(), lanes.iter().copied().fold(f32::MAX, f32::min), "min at width {N}");
    }

    fn check_strided_round_trip<B: RegisterBackend<f64>, const N: usize>() {
        for stride in 1..=4 {
            let src: Vec<f64> = (0..N * stride).map(|i| i as f64 + 0.5).collect();
            let x = Register::<f64, B, N>::load_strided(&src, stride);
            let mut dst = vec![-1.0; N * stride];
            x.store_strided(&mut dst, stride);
            for (i, (&d, &s)) in dst.iter().zip(&src).enumerate() {
                if i % stride == 0 {
                    assert_eq!(d, s, "width {N} stride {stride} index {i}");
                } else {
                    assert_eq!(d, -1.0, "untouched gap at width {N} stride {stride}");
                }
            }
        }
    }

    #[test]
    fn test_warp_reductions_every_width() {
        for_widths!(check_reductions, Warp;
            1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16
            17 18 19 20 21 22 23 24 25 26 27 28 29 30 31 32);
    }

    #[test]
    fn test_scalar_reductions() {
        check_reductions::<Scalar, 1>();
    }

    #[test]
    fn test_strided_round_trip() {
        for_widths!(check_strided_round_trip, Warp; 1 2 3 5 8 13 32);
        check_strided_round_trip::<Scalar, 1>();
    }

    #[test]
    fn test_seven_lane_scenario_warp() {
        let x = Register::<f32, Warp, 7>::from_lanes([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(x.sum(), 28.0);
        assert_eq!(x.max(), 7.0);
        assert_eq!(x.min(), 1.0);

        let mut out = [0.0f32; 8];
        x.store_slice(&mut out);
        assert_eq!(out[7], 0.0);
        assert_eq!(&out[..7], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_reductions_with_infinities() {
        let x = Register::<f64, Warp, 5>::from_lanes([
            f64::NEG_INFINITY,
            -3.0,
            f64::NEG_INFINITY,
            -7.0,
            f64::NEG_INFINITY,
        ]);
        assert_eq!(x.max(), -3.0);
        assert_eq!(x.min(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_get_set() {
        let mut x = Register::<i32, Warp, 4>::new();
        x.set(0, 10).set(3, -2);
        assert_eq!(x.to_lanes(), [10, 0, 0, -2]);
        assert_eq!(x.get(3), -2);
    }

    #[test]
    fn test_copy_from() {
        let a = Register::<i64, Warp, 3>::splat(9);
        let mut b = Register::<i64, Warp, 3>::default();
        b.copy_from(&a);
        assert_eq!(a, b);
    }

    #[test]
    fn test_partial_load_zeroes_remaining_lanes() {
        let src = [4.0f64, 5.0, 6.0];
        // SAFETY: `src` holds two readable elements.
        let x = unsafe { Register::<f64, Warp, 6>::load_packed_n(src.as_ptr(), 2) };
        assert_eq!(x.to_lanes(), [4.0, 5.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_partial_store_leaves_memory() {
        let x = Register::<f64, Warp, 6>::splat(1.0);
        let mut dst = [0.0f64; 6];
        // SAFETY: `dst` holds six elements, every fourth of which is touched.
        unsafe { x.store_strided_n(dst.as_mut_ptr(), 4, 2) };
        assert_eq!(dst, [1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_negative_stride_load() {
        let src = [1.0f32, 2.0, 3.0, 4.0];
        // SAFETY: offsets 3, 2, 1, 0 from `src[3]` walk back to `src[0]`.
        let x = unsafe { Register::<f32, Warp, 4>::load(src.as_ptr().add(3), -1) };
        assert_eq!(x.to_lanes(), [4.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_gather_scatter_round_trip() {
        let src: Vec<i32> = (0..20).map(|v| v * 10).collect();
        let offsets = [19, 0, 7, 7, 3];
        let x = Register::<i32, Warp, 5>::gather(&src, &offsets);
        assert_eq!(x.to_lanes(), [190, 0, 70, 70, 30]);

        let mut dst = vec![0i32; 20];
        let distinct = [4, 9, 1, 16, 2];
        x.scatter(&mut dst, &distinct);
        assert_eq!(Register::<i32, Warp, 5>::gather(&dst, &distinct), x);
    }

    #[test]
    fn test_gather_n_zero_tail() {
        let src = [1i64, 2, 3];
        let x = Register::<i64, Warp, 4>::gather_n(&src, &[2, 1, 0, 0], 2);
        assert_eq!(x.to_lanes(), [3, 2, 0, 0]);
    }

    #[test]
    fn test_elementwise_arithmetic() {
        let a = Register::<f64, Warp, 3>::from_lanes([6.0, 8.0, -2.0]);
        let b = Register::<f64, Warp, 3>::from_lanes([3.0, 2.0, 4.0]);
        assert_eq!(a.add(b).to_lanes(), [9.0, 10.0, 2.0]);
        assert_eq!(a.subtract(b).to_lanes(), [3.0, 6.0, -6.0]);
        assert_eq!(a.multiply(b).to_lanes(), [18.0, 16.0, -8.0]);
        assert_eq!(a.divide(b).to_lanes(), [2.0, 4.0, -0.5]);
        assert_eq!(a.vmax(b).to_lanes(), [6.0, 8.0, 4.0]);
        assert_eq!(a.vmin(b).to_lanes(), [3.0, 2.0, -2.0]);
        assert_eq!(a.dot(&b), 26.0);
    }

    #[test]
    fn test_integer_divide_ignores_inactive_lanes() {
        // Lanes 3.. of the divisor are zero; they must not be divided.
        let a = Register::<i32, Warp, 3>::from_lanes([9, 8, 7]);
        let b = Register::<i32, Warp, 3>::from_lanes([3, 2, 7]);
        assert_eq!(a.divide(b).to_lanes(), [3, 4, 1]);
    }

    #[test]
    fn test_fused_forms() {
        let a = Register::<f64, Warp, 2>::splat(0.1);
        let b = Register::<f64, Warp, 2>::splat(10.0);
        let c = Register::<f64, Warp, 2>::splat(1.0);
        assert_eq!(a.multiply_add(b, c).get(0), 0.1 * 10.0 + 1.0);
        assert_eq!(a.multiply_subtract(b, c).get(1), 0.1 * 10.0 - 1.0);
        assert_eq!(a.fused_multiply_add(b, c.multiply(Register::splat(-1.0))).get(0), 0.1f64.mul_add(10.0, -1.0));
    }

    #[test]
    fn test_display_and_debug() {
        let x = Register::<i32, Warp, 3>::from_lanes([1, -2, 3]);
        assert_eq!(x.to_string(), "[1, -2, 3]");
        let debug = format!("{x:?}");
        assert!(debug.contains("Warp"));
        assert!(debug.contains("[1, -2, 3]"));
    }

    #[test]
    fn test_equality_ignores_physical_tail() {
        let a = Register::<f32, Warp, 2>::from_lanes([1.0, 2.0]);
        let b = Register::<f32, Warp, 2>::from_native(
            <Warp as RegisterBackend<f32>>::insert(a.native(), 5, 99.0),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_width_constants() {
        assert_eq!(Register::<f32, Warp, 7>::WIDTH, 7);
        assert_eq!(Register::<f32, Warp, 7>::PHYSICAL_WIDTH, 32);
        assert_eq!(Register::<f64, Scalar, 1>::PHYSICAL_WIDTH, 1);
    }

    #[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
    mod avx {
        use super::*;
        use crate::backend::Avx;

        #[test]
        fn test_seven_lane_scenario() {
            let x = Register::<f32, Avx, 7>::from_lanes([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
            assert_eq!(x.sum(), 28.0);
            assert_eq!(x.max(), 7.0);
            assert_eq!(x.min(), 1.0);

            let mut out = [0.0f32; 8];
            // SAFETY: `out` holds eight writable elements.
            unsafe { x.store(out.as_mut_ptr(), 1) };
            assert_eq!(out, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 0.0]);
        }

        #[test]
        fn test_every_width() {
            for_widths!(check_reductions, Avx; 1 2 3 4);
            for_widths!(check_f32, Avx; 1 2 3 4 5 6 7 8);
            for_widths!(check_strided_round_trip, Avx; 1 2 3 4);
        }
    }

    #[cfg(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "fma"))]
    mod avx2 {
        use super::*;
        use crate::backend::Avx2;

        fn check_i32<const N: usize>() {
            let lanes: [i32; N] = std::array::from_fn(|i| (i as i32 * 37) % 13 - 6);
            let x = Register::<i32, Avx2, N>::from_lanes(lanes);
            assert_eq!(x.sum(), lanes.iter().sum::<i32>(), "sum at width {N}");
            assert_eq!(Some(x.max()), lanes.iter().copied().max());
            assert_eq!(Some(x.min()), lanes.iter().copied().min());
        }

        #[test]
        fn test_every_width() {
            for_widths!(check_reductions, Avx2; 1 2 3 4);
            check_i32::<1>();
            check_i32::<2>();
            check_i32::<3>();
            check_i32::<5>();
            check_i32::<7>();
            check_i32::<8>();
        }

        #[test]
        fn test_fma_single_rounding() {
            let a = Register::<f64, Avx2, 4>::splat(0.1);
            let b = Register::<f64, Avx2, 4>::splat(10.0);
            let c = Register::<f64, Avx2, 4>::splat(-1.0);
            assert_eq!(a.fused_multiply_add(b, c).get(3), 0.1f64.mul_add(10.0, -1.0));
        }
    }

    #[cfg(all(feature = "avx512", target_arch = "x86_64", target_feature = "avx512f"))]
    mod avx512 {
        use super::*;
        use crate::backend::Avx512;

        #[test]
        fn test_every_width() {
            for_widths!(check_reductions, Avx512; 1 2 3 4 5 6 7 8);
            for_widths!(check_f32, Avx512; 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16);
            for_widths!(check_strided_round_trip, Avx512; 1 3 8);
        }

        #[test]
        fn test_upper_half_reduction() {
            // Extremes sit in the upper 256 bits, so the 8-lane exchange must
            // carry them down.
            let mut lanes = [0.0f32; 16];
            lanes[12] = 40.0;
            lanes[9] = -25.0;
            let x = Register::<f32, Avx512, 16>::from_lanes(lanes);
            assert_eq!(x.sum(), 15.0);
            assert_eq!(x.max(), 40.0);
            assert_eq!(x.min(), -25.0);
        }

        #[test]
        fn test_partial_store_leaves_tail() {
            let x = Register::<f32, Avx512, 11>::splat(2.0);
            let mut out = [-1.0f32; 16];
            // SAFETY: `out` holds sixteen writable elements.
            unsafe { x.store(out.as_mut_ptr(), 1) };
            assert_eq!(out[..11], [2.0; 11]);
            assert_eq!(out[11..], [-1.0; 5]);

            let y = Register::<f64, Avx512, 5>::splat(3.0);
            let mut wide = [0.0f64; 8];
            // SAFETY: `wide` holds eight writable elements.
            unsafe { y.store(wide.as_mut_ptr(), 1) };
            assert_eq!(wide, [3.0, 3.0, 3.0, 3.0, 3.0, 0.0, 0.0, 0.0]);
        }
    }
}
