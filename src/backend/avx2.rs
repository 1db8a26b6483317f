//! AVX2 backend (256-bit registers with FMA and integer lanes).
//!
//! # Safety
//!
//! Compiled only when the `avx2` and `fma` target features are enabled for the
//! whole crate. See the `avx` module for the masked load/store argument.
#![allow(unsafe_code, unused_unsafe)]

use super::avx::mask_epi32;
use super::{BackendKind, RegisterBackend, RegisterPolicy};
use std::arch::x86_64::*;

/// AVX2 register policy: 8 × f32, 4 × f64 or 8 × i32 per register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Avx2;

impl RegisterPolicy for Avx2 {
    const KIND: BackendKind = BackendKind::Avx2;
}

impl_avx_f32!(Avx2, |a, b, c| _mm256_fmadd_ps(a, b, c));
impl_avx_f64!(Avx2, |a, b, c| _mm256_fmadd_pd(a, b, c));

#[inline(always)]
fn to_lanes(value: __m256i) -> [i32; 8] {
    // SAFETY: `__m256i` and `[i32; 8]` have identical size and layout.
    unsafe { std::mem::transmute::<__m256i, [i32; 8]>(value) }
}

#[inline(always)]
fn from_lanes(lanes: [i32; 8]) -> __m256i {
    // SAFETY: `__m256i` and `[i32; 8]` have identical size and layout.
    unsafe { std::mem::transmute::<[i32; 8], __m256i>(lanes) }
}

impl RegisterBackend<i32> for Avx2 {
    type Native = __m256i;

    const LANES: usize = 8;

    #[inline(always)]
    fn splat(value: i32) -> __m256i {
        unsafe { _mm256_set1_epi32(value) }
    }

    #[inline(always)]
    fn zero() -> __m256i {
        unsafe { _mm256_setzero_si256() }
    }

    #[inline(always)]
    unsafe fn load_packed(ptr: *const i32, n: usize) -> __m256i {
        // SAFETY: the caller guarantees `n` readable elements; masked lanes
        // are not accessed.
        unsafe {
            if n >= 8 {
                _mm256_loadu_si256(ptr.cast::<__m256i>())
            } else {
                _mm256_maskload_epi32(ptr, mask_epi32(n))
            }
        }
    }

    #[inline(always)]
    unsafe fn store_packed(value: __m256i, ptr: *mut i32, n: usize) {
        // SAFETY: the caller guarantees `n` writable elements; masked lanes
        // are not accessed.
        unsafe {
            if n >= 8 {
                _mm256_storeu_si256(ptr.cast::<__m256i>(), value);
            } else {
                _mm256_maskstore_epi32(ptr, mask_epi32(n), value);
            }
        }
    }

    #[inline(always)]
    fn extract(value: __m256i, lane: usize) -> i32 {
        to_lanes(value)[lane]
    }

    #[inline(always)]
    fn insert(value: __m256i, lane: usize, element: i32) -> __m256i {
        let mut lanes = to_lanes(value);
        lanes[lane] = element;
        from_lanes(lanes)
    }

    #[inline(always)]
    fn add(a: __m256i, b: __m256i) -> __m256i {
        unsafe { _mm256_add_epi32(a, b) }
    }

    #[inline(always)]
    fn sub(a: __m256i, b: __m256i) -> __m256i {
        unsafe { _mm256_sub_epi32(a, b) }
    }

    #[inline(always)]
    fn mul(a: __m256i, b: __m256i) -> __m256i {
        unsafe { _mm256_mullo_epi32(a, b) }
    }

    #[inline(always)]
    fn div(a: __m256i, b: __m256i, n: usize) -> __m256i {
        // No integer divide instruction: per-lane loop over the active lanes.
        let (a, b) = (to_lanes(a), to_lanes(b));
        from_lanes(std::array::from_fn(|lane| if lane < n { a[lane] / b[lane] } else { 0 }))
    }

    #[inline(always)]
    fn max(a: __m256i, b: __m256i) -> __m256i {
        unsafe { _mm256_max_epi32(a, b) }
    }

    #[inline(always)]
    fn min(a: __m256i, b: __m256i) -> __m256i {
        unsafe { _mm256_min_epi32(a, b) }
    }

    #[inline(always)]
    fn mul_add(a: __m256i, b: __m256i, c: __m256i) -> __m256i {
        unsafe { _mm256_add_epi32(_mm256_mullo_epi32(a, b), c) }
    }

    #[inline(always)]
    fn exchange(value: __m256i, distance: usize) -> __m256i {
        unsafe {
            match distance {
                1 => _mm256_shuffle_epi32(value, 0xB1),
                2 => _mm256_shuffle_epi32(value, 0x4E),
                4 => _mm256_permute2x128_si256(value, value, 0x01),
                _ => value,
            }
        }
    }

    #[inline(always)]
    fn mask_lanes(value: __m256i, fill: i32, n: usize) -> __m256i {
        if n >= 8 {
            return value;
        }
        unsafe { _mm256_blendv_epi8(_mm256_set1_epi32(fill), value, mask_epi32(n)) }
    }
}
