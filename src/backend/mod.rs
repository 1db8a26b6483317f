//! Register backends.
//!
//! A backend is a zero-sized policy type naming one instruction set. For every
//! element type it supports, it implements [`RegisterBackend`], which fixes the
//! native register type, its physical lane count, and the primitive operations
//! a [`Register`](crate::register::Register) is built from.
//!
//! Backend selection is a type parameter, so every call is monomorphized and
//! inlined; there is no runtime dispatch on the arithmetic path. The SIMD
//! backends only exist when the matching target features are enabled at build
//! time (`-C target-cpu=native` or `-C target-feature=+avx2,+fma`):
//!
//! | Backend | Requires | f32 lanes | f64 lanes |
//! |---------|----------|-----------|-----------|
//! | [`Scalar`] | nothing | 1 | 1 |
//! | [`Warp`] | nothing | 32 | 32 |
//! | `Avx` | `avx` | 8 | 4 |
//! | `Avx2` | `avx2` + `fma` | 8 | 4 |
//! | `Avx512` | `avx512f` + cargo feature `avx512` | 16 | 8 |
#![allow(unsafe_code)]

use crate::element::Element;
use std::fmt;

#[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
#[macro_use]
mod avx;
#[cfg(all(
    target_arch = "x86_64",
    target_feature = "avx2",
    target_feature = "fma"
))]
mod avx2;
#[cfg(all(
    feature = "avx512",
    target_arch = "x86_64",
    target_feature = "avx512f"
))]
mod avx512;
mod scalar;
pub mod warp;

#[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
pub use avx::Avx;
#[cfg(all(
    target_arch = "x86_64",
    target_feature = "avx2",
    target_feature = "fma"
))]
pub use avx2::Avx2;
#[cfg(all(
    feature = "avx512",
    target_arch = "x86_64",
    target_feature = "avx512f"
))]
pub use avx512::Avx512;
pub use scalar::Scalar;
pub use warp::{Warp, WARP_SIZE};

/// Instruction-set family of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// One lane, plain scalar code.
    Scalar,
    /// AVX (256-bit, Sandy Bridge 2011+).
    Avx,
    /// AVX2 with FMA (256-bit, Haswell 2013+).
    Avx2,
    /// AVX-512F (512-bit, Skylake-X 2017+).
    Avx512,
    /// GPU warp model (32 SIMT lanes).
    Warp,
}

impl BackendKind {
    /// Detects the widest CPU instruction set available on the running machine.
    ///
    /// This is for reporting only. Which backends a binary can use is decided
    /// at build time, see [`BackendKind::compiled`].
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx512f") {
                return Self::Avx512;
            }
            if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
                return Self::Avx2;
            }
            if is_x86_feature_detected!("avx") {
                return Self::Avx;
            }
        }

        Self::Scalar
    }

    /// Backends built into this binary, narrowest first.
    #[must_use]
    pub fn compiled() -> Vec<Self> {
        #[allow(unused_mut)]
        let mut kinds = vec![Self::Scalar];

        #[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
        kinds.push(Self::Avx);

        #[cfg(all(
            target_arch = "x86_64",
            target_feature = "avx2",
            target_feature = "fma"
        ))]
        kinds.push(Self::Avx2);

        #[cfg(all(
            feature = "avx512",
            target_arch = "x86_64",
            target_feature = "avx512f"
        ))]
        kinds.push(Self::Avx512);

        kinds.push(Self::Warp);
        kinds
    }

    /// Returns the register width in bits.
    #[must_use]
    pub const fn register_width_bits(&self) -> usize {
        match self {
            Self::Scalar => 64,
            Self::Avx | Self::Avx2 => 256,
            Self::Avx512 => 512,
            Self::Warp => 32 * 64,
        }
    }

    /// Returns the number of `T` lanes in one physical register.
    #[must_use]
    pub const fn lanes_for<T>(&self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Warp => WARP_SIZE,
            _ => self.register_width_bits() / (std::mem::size_of::<T>() * 8),
        }
    }

    /// Short lowercase name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Avx => "avx",
            Self::Avx2 => "avx2",
            Self::Avx512 => "avx512",
            Self::Warp => "warp",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Marker implemented by every backend policy type.
pub trait RegisterPolicy:
    Copy + Clone + Default + fmt::Debug + PartialEq + Eq + Send + Sync + 'static
{
    /// Instruction-set family.
    const KIND: BackendKind;
}

/// Native register operations of one backend for one element type.
///
/// Every `n` argument is the logical width of the calling register and is a
/// compile-time constant after monomorphization, so mask construction folds
/// away. Lanes at or beyond `n` are never read from or written to memory.
pub trait RegisterBackend<T: Element>: RegisterPolicy {
    /// Native register type.
    type Native: Copy + Send + Sync + 'static;

    /// Physical lane count of [`Self::Native`].
    const LANES: usize;

    /// Every lane set to `value`.
    fn splat(value: T) -> Self::Native;

    /// Every lane zero.
    #[inline]
    fn zero() -> Self::Native {
        Self::splat(T::ZERO)
    }

    /// Loads `n` contiguous elements; lanes `n..` are zero.
    ///
    /// Uses one full-width load when `n == LANES`, a masked load otherwise.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `n` elements.
    unsafe fn load_packed(ptr: *const T, n: usize) -> Self::Native;

    /// Stores the first `n` lanes to contiguous memory.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writes of `n` elements.
    unsafe fn store_packed(value: Self::Native, ptr: *mut T, n: usize);

    /// Loads `n` elements spaced `stride` apart; lanes `n..` are zero.
    ///
    /// # Safety
    ///
    /// `ptr.offset(i * stride)` must be valid for reads for every `i < n`.
    #[inline]
    unsafe fn load_strided(ptr: *const T, stride: isize, n: usize) -> Self::Native {
        let mut value = Self::zero();
        for i in 0..n {
            // SAFETY: the caller guarantees every strided offset below `n` is readable.
            value = Self::insert(value, i, unsafe { *ptr.offset(i as isize * stride) });
        }
        value
    }

    /// Stores the first `n` lanes spaced `stride` apart.
    ///
    /// # Safety
    ///
    /// `ptr.offset(i * stride)` must be valid for writes for every `i < n`.
    #[inline]
    unsafe fn store_strided(value: Self::Native, ptr: *mut T, stride: isize, n: usize) {
        for i in 0..n {
            // SAFETY: the caller guarantees every strided offset below `n` is writable.
            unsafe { *ptr.offset(i as isize * stride) = Self::extract(value, i) };
        }
    }

    /// Reads one lane.
    fn extract(value: Self::Native, lane: usize) -> T;

    /// Returns `value` with one lane replaced.
    fn insert(value: Self::Native, lane: usize, element: T) -> Self::Native;

    /// Lane-wise `a + b`.
    fn add(a: Self::Native, b: Self::Native) -> Self::Native;

    /// Lane-wise `a - b`.
    fn sub(a: Self::Native, b: Self::Native) -> Self::Native;

    /// Lane-wise `a * b`.
    fn mul(a: Self::Native, b: Self::Native) -> Self::Native;

    /// Lane-wise `a / b` over the first `n` lanes; the remaining lanes are
    /// unspecified.
    fn div(a: Self::Native, b: Self::Native, n: usize) -> Self::Native;

    /// Lane-wise maximum.
    fn max(a: Self::Native, b: Self::Native) -> Self::Native;

    /// Lane-wise minimum.
    fn min(a: Self::Native, b: Self::Native) -> Self::Native;

    /// Lane-wise `a * b + c`, fused when the instruction set has an FMA.
    fn mul_add(a: Self::Native, b: Self::Native, c: Self::Native) -> Self::Native;

    /// Butterfly exchange: lane `i` receives lane `i ^ distance`.
    ///
    /// `distance` is a power of two below `LANES`.
    fn exchange(value: Self::Native, distance: usize) -> Self::Native;

    /// Replaces lanes `n..` with `fill`.
    fn mask_lanes(value: Self::Native, fill: T, n: usize) -> Self::Native;

    /// General lane permutation over the first `n` lanes.
    ///
    /// Lane `i < n` receives lane `source(i)`, or zero when `source` returns
    /// `None`. Lanes `n..` are zero.
    #[inline]
    fn permute<F>(value: Self::Native, n: usize, source: F) -> Self::Native
    where
        F: Fn(usize) -> Option<usize>,
    {
        let mut out = Self::zero();
        for i in 0..n {
            if let Some(src) = source(i) {
                out = Self::insert(out, i, Self::extract(value, src));
            }
        }
        out
    }
}
