//! Single-lane scalar backend, available on every target.

use super::{BackendKind, RegisterBackend, RegisterPolicy};
use crate::element::Element;

/// Plain scalar code, one lane per register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scalar;

impl RegisterPolicy for Scalar {
    const KIND: BackendKind = BackendKind::Scalar;
}

impl<T: Element> RegisterBackend<T> for Scalar {
    type Native = T;

    const LANES: usize = 1;

    #[inline]
    fn splat(value: T) -> T {
        value
    }

    #[inline]
    unsafe fn load_packed(ptr: *const T, n: usize) -> T {
        if n == 0 {
            T::ZERO
        } else {
            // SAFETY: the caller guarantees `ptr` is readable for `n >= 1` elements.
            unsafe { *ptr }
        }
    }

    #[inline]
    unsafe fn store_packed(value: T, ptr: *mut T, n: usize) {
        if n != 0 {
            // SAFETY: the caller guarantees `ptr` is writable for `n >= 1` elements.
            unsafe { *ptr = value };
        }
    }

    #[inline]
    fn extract(value: T, lane: usize) -> T {
        debug_assert_eq!(lane, 0, "scalar register has one lane");
        value
    }

    #[inline]
    fn insert(_value: T, lane: usize, element: T) -> T {
        debug_assert_eq!(lane, 0, "scalar register has one lane");
        element
    }

    #[inline]
    fn add(a: T, b: T) -> T {
        a.lane_add(b)
    }

    #[inline]
    fn sub(a: T, b: T) -> T {
        a.lane_sub(b)
    }

    #[inline]
    fn mul(a: T, b: T) -> T {
        a.lane_mul(b)
    }

    #[inline]
    fn div(a: T, b: T, n: usize) -> T {
        if n == 0 {
            a
        } else {
            a / b
        }
    }

    #[inline]
    fn max(a: T, b: T) -> T {
        a.lane_max(b)
    }

    #[inline]
    fn min(a: T, b: T) -> T {
        a.lane_min(b)
    }

    #[inline]
    fn mul_add(a: T, b: T, c: T) -> T {
        a.mul_add(b, c)
    }

    #[inline]
    fn exchange(value: T, _distance: usize) -> T {
        value
    }

    #[inline]
    fn mask_lanes(value: T, fill: T, n: usize) -> T {
        if n == 0 {
            fill
        } else {
            value
        }
    }
}
