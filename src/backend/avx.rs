//! AVX backend (256-bit registers, no FMA).
//!
//! # Safety
//!
//! This module is only compiled when the `avx` target feature is enabled for
//! the whole crate, so every intrinsic below is supported by the CPU the
//! binary is built for. Pointer-taking intrinsics are reached only through the
//! `unsafe` load/store entry points, whose callers guarantee the memory range.
//!
//! Partial registers use `vmaskmovps`/`vmaskmovpd`, which never touch memory
//! for masked-off lanes, so a 7-lane load at the end of a buffer cannot fault.
#![allow(unsafe_code, unused_unsafe)]

use super::{BackendKind, RegisterBackend, RegisterPolicy};
use std::arch::x86_64::*;

/// AVX register policy: 8 × f32 or 4 × f64 per register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Avx;

impl RegisterPolicy for Avx {
    const KIND: BackendKind = BackendKind::Avx;
}

/// All-ones in each of the first `n` 32-bit lanes.
#[inline(always)]
pub(crate) fn mask_epi32(n: usize) -> __m256i {
    let m = |lane: usize| if lane < n { -1 } else { 0 };
    unsafe { _mm256_setr_epi32(m(0), m(1), m(2), m(3), m(4), m(5), m(6), m(7)) }
}

/// All-ones in each of the first `n` 64-bit lanes.
#[inline(always)]
pub(crate) fn mask_epi64(n: usize) -> __m256i {
    let m = |lane: usize| if lane < n { -1i64 } else { 0 };
    unsafe { _mm256_setr_epi64x(m(0), m(1), m(2), m(3)) }
}

/// `RegisterBackend<f32>` over `__m256`. The closure-like argument supplies
/// the multiply-add, which is where AVX and AVX2 differ.
macro_rules! impl_avx_f32 {
    ($policy:ty, |$a:ident, $b:ident, $c:ident| $mul_add:expr) => {
        impl RegisterBackend<f32> for $policy {
            type Native = __m256;

            const LANES: usize = 8;

            #[inline(always)]
            fn splat(value: f32) -> __m256 {
                unsafe { _mm256_set1_ps(value) }
            }

            #[inline(always)]
            fn zero() -> __m256 {
                unsafe { _mm256_setzero_ps() }
            }

            #[inline(always)]
            unsafe fn load_packed(ptr: *const f32, n: usize) -> __m256 {
                // SAFETY: the caller guarantees `n` readable elements; masked
                // lanes are not accessed.
                unsafe {
                    if n >= 8 {
                        _mm256_loadu_ps(ptr)
                    } else {
                        _mm256_maskload_ps(ptr, $crate::backend::avx::mask_epi32(n))
                    }
                }
            }

            #[inline(always)]
            unsafe fn store_packed(value: __m256, ptr: *mut f32, n: usize) {
                // SAFETY: the caller guarantees `n` writable elements; masked
                // lanes are not accessed.
                unsafe {
                    if n >= 8 {
                        _mm256_storeu_ps(ptr, value);
                    } else {
                        _mm256_maskstore_ps(ptr, $crate::backend::avx::mask_epi32(n), value);
                    }
                }
            }

            #[inline(always)]
            fn extract(value: __m256, lane: usize) -> f32 {
                // SAFETY: `__m256` and `[f32; 8]` have identical size and layout.
                let lanes = unsafe { std::mem::transmute::<__m256, [f32; 8]>(value) };
                lanes[lane]
            }

            #[inline(always)]
            fn insert(value: __m256, lane: usize, element: f32) -> __m256 {
                // SAFETY: `__m256` and `[f32; 8]` have identical size and layout.
                let mut lanes = unsafe { std::mem::transmute::<__m256, [f32; 8]>(value) };
                lanes[lane] = element;
                unsafe { std::mem::transmute::<[f32; 8], __m256>(lanes) }
            }

            #[inline(always)]
            fn add(a: __m256, b: __m256) -> __m256 {
                unsafe { _mm256_add_ps(a, b) }
            }

            #[inline(always)]
            fn sub(a: __m256, b: __m256) -> __m256 {
                unsafe { _mm256_sub_ps(a, b) }
            }

            #[inline(always)]
            fn mul(a: __m256, b: __m256) -> __m256 {
                unsafe { _mm256_mul_ps(a, b) }
            }

            #[inline(always)]
            fn div(a: __m256, b: __m256, _n: usize) -> __m256 {
                unsafe { _mm256_div_ps(a, b) }
            }

            #[inline(always)]
            fn max(a: __m256, b: __m256) -> __m256 {
                unsafe { _mm256_max_ps(a, b) }
            }

            #[inline(always)]
            fn min(a: __m256, b: __m256) -> __m256 {
                unsafe { _mm256_min_ps(a, b) }
            }

            #[inline(always)]
            fn mul_add($a: __m256, $b: __m256, $c: __m256) -> __m256 {
                unsafe { $mul_add }
            }

            #[inline(always)]
            fn exchange(value: __m256, distance: usize) -> __m256 {
                unsafe {
                    match distance {
                        // swap odd/even pairs
                        1 => _mm256_permute_ps(value, 0xB1),
                        // swap odd/even quads
                        2 => _mm256_permute_ps(value, 0x4E),
                        // swap 128-bit halves
                        4 => _mm256_permute2f128_ps(value, value, 0x01),
                        _ => value,
                    }
                }
            }

            #[inline(always)]
            fn mask_lanes(value: __m256, fill: f32, n: usize) -> __m256 {
                if n >= 8 {
                    return value;
                }
                unsafe {
                    _mm256_blendv_ps(
                        _mm256_set1_ps(fill),
                        value,
                        _mm256_castsi256_ps($crate::backend::avx::mask_epi32(n)),
                    )
                }
            }
        }
    };
}

/// `RegisterBackend<f64>` over `__m256d`.
macro_rules! impl_avx_f64 {
    ($policy:ty, |$a:ident, $b:ident, $c:ident| $mul_add:expr) => {
        impl RegisterBackend<f64> for $policy {
            type Native = __m256d;

            const LANES: usize = 4;

            #[inline(always)]
            fn splat(value: f64) -> __m256d {
                unsafe { _mm256_set1_pd(value) }
            }

            #[inline(always)]
            fn zero() -> __m256d {
                unsafe { _mm256_setzero_pd() }
            }

            #[inline(always)]
            unsafe fn load_packed(ptr: *const f64, n: usize) -> __m256d {
                // SAFETY: the caller guarantees `n` readable elements; masked
                // lanes are not accessed.
                unsafe {
                    if n >= 4 {
                        _mm256_loadu_pd(ptr)
                    } else {
                        _mm256_maskload_pd(ptr, $crate::backend::avx::mask_epi64(n))
                    }
                }
            }

            #[inline(always)]
            unsafe fn store_packed(value: __m256d, ptr: *mut f64, n: usize) {
                // SAFETY: the caller guarantees `n` writable elements; masked
                // lanes are not accessed.
                unsafe {
                    if n >= 4 {
                        _mm256_storeu_pd(ptr, value);
                    } else {
                        _mm256_maskstore_pd(ptr, $crate::backend::avx::mask_epi64(n), value);
                    }
                }
            }

            #[inline(always)]
            fn extract(value: __m256d, lane: usize) -> f64 {
                // SAFETY: `__m256d` and `[f64; 4]` have identical size and layout.
                let lanes = unsafe { std::mem::transmute::<__m256d, [f64; 4]>(value) };
                lanes[lane]
            }

            #[inline(always)]
            fn insert(value: __m256d, lane: usize, element: f64) -> __m256d {
                // SAFETY: `__m256d` and `[f64; 4]` have identical size and layout.
                let mut lanes = unsafe { std::mem::transmute::<__m256d, [f64; 4]>(value) };
                lanes[lane] = element;
                unsafe { std::mem::transmute::<[f64; 4], __m256d>(lanes) }
            }

            #[inline(always)]
            fn add(a: __m256d, b: __m256d) -> __m256d {
                unsafe { _mm256_add_pd(a, b) }
            }

            #[inline(always)]
            fn sub(a: __m256d, b: __m256d) -> __m256d {
                unsafe { _mm256_sub_pd(a, b) }
            }

            #[inline(always)]
            fn mul(a: __m256d, b: __m256d) -> __m256d {
                unsafe { _mm256_mul_pd(a, b) }
            }

            #[inline(always)]
            fn div(a: __m256d, b: __m256d, _n: usize) -> __m256d {
                unsafe { _mm256_div_pd(a, b) }
            }

            #[inline(always)]
            fn max(a: __m256d, b: __m256d) -> __m256d {
                unsafe { _mm256_max_pd(a, b) }
            }

            #[inline(always)]
            fn min(a: __m256d, b: __m256d) -> __m256d {
                unsafe { _mm256_min_pd(a, b) }
            }

            #[inline(always)]
            fn mul_add($a: __m256d, $b: __m256d, $c: __m256d) -> __m256d {
                unsafe { $mul_add }
            }

            #[inline(always)]
            fn exchange(value: __m256d, distance: usize) -> __m256d {
                unsafe {
                    match distance {
                        1 => _mm256_permute_pd(value, 0x5),
                        2 => _mm256_permute2f128_pd(value, value, 0x01),
                        _ => value,
                    }
                }
            }

            #[inline(always)]
            fn mask_lanes(value: __m256d, fill: f64, n: usize) -> __m256d {
                if n >= 4 {
                    return value;
                }
                unsafe {
                    _mm256_blendv_pd(
                        _mm256_set1_pd(fill),
                        value,
                        _mm256_castsi256_pd($crate::backend::avx::mask_epi64(n)),
                    )
                }
            }
        }
    };
}

impl_avx_f32!(Avx, |a, b, c| _mm256_add_ps(_mm256_mul_ps(a, b), c));
impl_avx_f64!(Avx, |a, b, c| _mm256_add_pd(_mm256_mul_pd(a, b), c));
