//! AVX-512 backend (512-bit registers, opmask loads and stores).
//!
//! # Safety
//!
//! Compiled only with the `avx512` cargo feature and the `avx512f` target
//! feature enabled for the whole crate. Masked loads/stores use opmask
//! registers, which suppress faults on masked-off lanes.
#![allow(unsafe_code, unused_unsafe)]

use super::{BackendKind, RegisterBackend, RegisterPolicy};
use std::arch::x86_64::*;

/// AVX-512 register policy: 16 × f32 or 8 × f64 per register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Avx512;

impl RegisterPolicy for Avx512 {
    const KIND: BackendKind = BackendKind::Avx512;
}

#[inline(always)]
fn mask16(n: usize) -> __mmask16 {
    if n >= 16 {
        u16::MAX
    } else {
        ((1u32 << n) - 1) as u16
    }
}

#[inline(always)]
fn mask8(n: usize) -> __mmask8 {
    if n >= 8 {
        u8::MAX
    } else {
        ((1u32 << n) - 1) as u8
    }
}

impl RegisterBackend<f32> for Avx512 {
    type Native = __m512;

    const LANES: usize = 16;

    #[inline(always)]
    fn splat(value: f32) -> __m512 {
        unsafe { _mm512_set1_ps(value) }
    }

    #[inline(always)]
    fn zero() -> __m512 {
        unsafe { _mm512_setzero_ps() }
    }

    #[inline(always)]
    unsafe fn load_packed(ptr: *const f32, n: usize) -> __m512 {
        // SAFETY: the caller guarantees `n` readable elements.
        unsafe {
            if n >= 16 {
                _mm512_loadu_ps(ptr)
            } else {
                _mm512_maskz_loadu_ps(mask16(n), ptr)
            }
        }
    }

    #[inline(always)]
    unsafe fn store_packed(value: __m512, ptr: *mut f32, n: usize) {
        // SAFETY: the caller guarantees `n` writable elements.
        unsafe {
            if n >= 16 {
                _mm512_storeu_ps(ptr, value);
            } else {
                _mm512_mask_storeu_ps(ptr, mask16(n), value);
            }
        }
    }

    #[inline(always)]
    fn extract(value: __m512, lane: usize) -> f32 {
        // SAFETY: `__m512` and `[f32; 16]` have identical size and layout.
        let lanes = unsafe { std::mem::transmute::<__m512, [f32; 16]>(value) };
        lanes[lane]
    }

    #[inline(always)]
    fn insert(value: __m512, lane: usize, element: f32) -> __m512 {
        // SAFETY: `__m512` and `[f32; 16]` have identical size and layout.
        let mut lanes = unsafe { std::mem::transmute::<__m512, [f32; 16]>(value) };
        lanes[lane] = element;
        unsafe { std::mem::transmute::<[f32; 16], __m512>(lanes) }
    }

    #[inline(always)]
    fn add(a: __m512, b: __m512) -> __m512 {
        unsafe { _mm512_add_ps(a, b) }
    }

    #[inline(always)]
    fn sub(a: __m512, b: __m512) -> __m512 {
        unsafe { _mm512_sub_ps(a, b) }
    }

    #[inline(always)]
    fn mul(a: __m512, b: __m512) -> __m512 {
        unsafe { _mm512_mul_ps(a, b) }
    }

    #[inline(always)]
    fn div(a: __m512, b: __m512, _n: usize) -> __m512 {
        unsafe { _mm512_div_ps(a, b) }
    }

    #[inline(always)]
    fn max(a: __m512, b: __m512) -> __m512 {
        unsafe { _mm512_max_ps(a, b) }
    }

    #[inline(always)]
    fn min(a: __m512, b: __m512) -> __m512 {
        unsafe { _mm512_min_ps(a, b) }
    }

    #[inline(always)]
    fn mul_add(a: __m512, b: __m512, c: __m512) -> __m512 {
        unsafe { _mm512_fmadd_ps(a, b, c) }
    }

    #[inline(always)]
    fn exchange(value: __m512, distance: usize) -> __m512 {
        unsafe {
            match distance {
                1 => _mm512_permute_ps(value, 0xB1),
                2 => _mm512_permute_ps(value, 0x4E),
                // swap neighbouring 128-bit blocks
                4 => _mm512_shuffle_f32x4(value, value, 0xB1),
                // swap 256-bit halves
                8 => _mm512_shuffle_f32x4(value, value, 0x4E),
                _ => value,
            }
        }
    }

    #[inline(always)]
    fn mask_lanes(value: __m512, fill: f32, n: usize) -> __m512 {
        unsafe { _mm512_mask_blend_ps(mask16(n), _mm512_set1_ps(fill), value) }
    }
}

impl RegisterBackend<f64> for Avx512 {
    type Native = __m512d;

    const LANES: usize = 8;

    #[inline(always)]
    fn splat(value: f64) -> __m512d {
        unsafe { _mm512_set1_pd(value) }
    }

    #[inline(always)]
    fn zero() -> __m512d {
        unsafe { _mm512_setzero_pd() }
    }

    #[inline(always)]
    unsafe fn load_packed(ptr: *const f64, n: usize) -> __m512d {
        // SAFETY: the caller guarantees `n` readable elements.
        unsafe {
            if n >= 8 {
                _mm512_loadu_pd(ptr)
            } else {
                _mm512_maskz_loadu_pd(mask8(n), ptr)
            }
        }
    }

    #[inline(always)]
    unsafe fn store_packed(value: __m512d, ptr: *mut f64, n: usize) {
        // SAFETY: the caller guarantees `n` writable elements.
        unsafe {
            if n >= 8 {
                _mm512_storeu_pd(ptr, value);
            } else {
                _mm512_mask_storeu_pd(ptr, mask8(n), value);
            }
        }
    }

    #[inline(always)]
    fn extract(value: __m512d, lane: usize) -> f64 {
        // SAFETY: `__m512d` and `[f64; 8]` have identical size and layout.
        let lanes = unsafe { std::mem::transmute::<__m512d, [f64; 8]>(value) };
        lanes[lane]
    }

    #[inline(always)]
    fn insert(value: __m512d, lane: usize, element: f64) -> __m512d {
        // SAFETY: `__m512d` and `[f64; 8]` have identical size and layout.
        let mut lanes = unsafe { std::mem::transmute::<__m512d, [f64; 8]>(value) };
        lanes[lane] = element;
        unsafe { std::mem::transmute::<[f64; 8], __m512d>(lanes) }
    }

    #[inline(always)]
    fn add(a: __m512d, b: __m512d) -> __m512d {
        unsafe { _mm512_add_pd(a, b) }
    }

    #[inline(always)]
    fn sub(a: __m512d, b: __m512d) -> __m512d {
        unsafe { _mm512_sub_pd(a, b) }
    }

    #[inline(always)]
    fn mul(a: __m512d, b: __m512d) -> __m512d {
        unsafe { _mm512_mul_pd(a, b) }
    }

    #[inline(always)]
    fn div(a: __m512d, b: __m512d, _n: usize) -> __m512d {
        unsafe { _mm512_div_pd(a, b) }
    }

    #[inline(always)]
    fn max(a: __m512d, b: __m512d) -> __m512d {
        unsafe { _mm512_max_pd(a, b) }
    }

    #[inline(always)]
    fn min(a: __m512d, b: __m512d) -> __m512d {
        unsafe { _mm512_min_pd(a, b) }
    }

    #[inline(always)]
    fn mul_add(a: __m512d, b: __m512d, c: __m512d) -> __m512d {
        unsafe { _mm512_fmadd_pd(a, b, c) }
    }

    #[inline(always)]
    fn exchange(value: __m512d, distance: usize) -> __m512d {
        unsafe {
            match distance {
                1 => _mm512_permute_pd(value, 0x55),
                2 => _mm512_shuffle_f64x2(value, value, 0xB1),
                4 => _mm512_shuffle_f64x2(value, value, 0x4E),
                _ => value,
            }
        }
    }

    #[inline(always)]
    fn mask_lanes(value: __m512d, fill: f64, n: usize) -> __m512d {
        unsafe { _mm512_mask_blend_pd(mask8(n), _mm512_set1_pd(fill), value) }
    }
}
