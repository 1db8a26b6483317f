//! GPU warp backend.
//!
//! Models a 32-thread SIMT warp on the host: each lane of the register belongs
//! to one thread, element-wise arithmetic is what every thread does to its own
//! value, and cross-lane movement goes through the warp shuffle primitives
//! [`shfl_sync`] and [`shfl_xor_sync`], mirroring `__shfl_sync` /
//! `__shfl_xor_sync`. Reductions and segmented sums therefore follow the same
//! butterfly schedule a device kernel would execute.

use super::{BackendKind, RegisterBackend, RegisterPolicy};
use crate::element::Element;

/// Threads per warp.
pub const WARP_SIZE: usize = 32;

/// One value per warp thread.
pub type WarpLanes<T> = [T; WARP_SIZE];

/// GPU warp (SIMT) register policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Warp;

impl RegisterPolicy for Warp {
    const KIND: BackendKind = BackendKind::Warp;
}

/// Every thread reads the value held by thread `source(lane)`.
#[inline]
pub fn shfl_sync<T: Copy, F>(lanes: &WarpLanes<T>, source: F) -> WarpLanes<T>
where
    F: Fn(usize) -> usize,
{
    std::array::from_fn(|lane| lanes[source(lane) % WARP_SIZE])
}

/// Every thread reads the value held by thread `lane ^ lane_mask`.
#[inline]
pub fn shfl_xor_sync<T: Copy>(lanes: &WarpLanes<T>, lane_mask: usize) -> WarpLanes<T> {
    shfl_sync(lanes, |lane| lane ^ lane_mask)
}

#[inline]
fn each<T: Element>(a: &WarpLanes<T>, b: &WarpLanes<T>, op: impl Fn(T, T) -> T) -> WarpLanes<T> {
    std::array::from_fn(|lane| op(a[lane], b[lane]))
}

impl<T: Element> RegisterBackend<T> for Warp {
    type Native = WarpLanes<T>;

    const LANES: usize = WARP_SIZE;

    #[inline]
    fn splat(value: T) -> WarpLanes<T> {
        [value; WARP_SIZE]
    }

    #[inline]
    unsafe fn load_packed(ptr: *const T, n: usize) -> WarpLanes<T> {
        let mut lanes = [T::ZERO; WARP_SIZE];
        // SAFETY: the caller guarantees `n` readable elements; `n <= WARP_SIZE`.
        unsafe { std::ptr::copy_nonoverlapping(ptr, lanes.as_mut_ptr(), n.min(WARP_SIZE)) };
        lanes
    }

    #[inline]
    unsafe fn store_packed(value: WarpLanes<T>, ptr: *mut T, n: usize) {
        // SAFETY: the caller guarantees `n` writable elements; `n <= WARP_SIZE`.
        unsafe { std::ptr::copy_nonoverlapping(value.as_ptr(), ptr, n.min(WARP_SIZE)) };
    }

    #[inline]
    fn extract(value: WarpLanes<T>, lane: usize) -> T {
        value[lane]
    }

    #[inline]
    fn insert(mut value: WarpLanes<T>, lane: usize, element: T) -> WarpLanes<T> {
        value[lane] = element;
        value
    }

    #[inline]
    fn add(a: WarpLanes<T>, b: WarpLanes<T>) -> WarpLanes<T> {
        each(&a, &b, T::lane_add)
    }

    #[inline]
    fn sub(a: WarpLanes<T>, b: WarpLanes<T>) -> WarpLanes<T> {
        each(&a, &b, T::lane_sub)
    }

    #[inline]
    fn mul(a: WarpLanes<T>, b: WarpLanes<T>) -> WarpLanes<T> {
        each(&a, &b, T::lane_mul)
    }

    #[inline]
    fn div(a: WarpLanes<T>, b: WarpLanes<T>, n: usize) -> WarpLanes<T> {
        // Threads past `n` are inactive and keep their value.
        std::array::from_fn(|lane| if lane < n { a[lane] / b[lane] } else { a[lane] })
    }

    #[inline]
    fn max(a: WarpLanes<T>, b: WarpLanes<T>) -> WarpLanes<T> {
        each(&a, &b, T::lane_max)
    }

    #[inline]
    fn min(a: WarpLanes<T>, b: WarpLanes<T>) -> WarpLanes<T> {
        each(&a, &b, T::lane_min)
    }

    #[inline]
    fn mul_add(a: WarpLanes<T>, b: WarpLanes<T>, c: WarpLanes<T>) -> WarpLanes<T> {
        std::array::from_fn(|lane| a[lane].mul_add(b[lane], c[lane]))
    }

    #[inline]
    fn exchange(value: WarpLanes<T>, distance: usize) -> WarpLanes<T> {
        shfl_xor_sync(&value, distance)
    }

    #[inline]
    fn mask_lanes(value: WarpLanes<T>, fill: T, n: usize) -> WarpLanes<T> {
        std::array::from_fn(|lane| if lane < n { value[lane] } else { fill })
    }

    #[inline]
    fn permute<F>(value: WarpLanes<T>, n: usize, source: F) -> WarpLanes<T>
    where
        F: Fn(usize) -> Option<usize>,
    {
        std::array::from_fn(|lane| {
            if lane < n {
                source(lane).map_or(T::ZERO, |src| value[src])
            } else {
                T::ZERO
            }
        })
    }
}
