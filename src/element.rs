//! Scalar lane types.
//!
//! Every register lane holds one [`Element`]. Floating-point lanes follow IEEE
//! semantics exactly as scalar Rust does; integer lanes wrap on overflow so that
//! a lane-parallel result never differs from the scalar loop it replaces.

use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Sub};

/// A scalar type that can occupy a register lane.
pub trait Element:
    Copy
    + Default
    + PartialEq
    + PartialOrd
    + Debug
    + Display
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + 'static
{
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;

    /// Lane addition. Integers wrap.
    fn lane_add(self, rhs: Self) -> Self;

    /// Lane subtraction. Integers wrap.
    fn lane_sub(self, rhs: Self) -> Self;

    /// Lane multiplication. Integers wrap.
    fn lane_mul(self, rhs: Self) -> Self;

    /// Computes `self * a + b`, with a single rounding step for floats.
    fn mul_add(self, a: Self, b: Self) -> Self;

    /// Larger of two lanes.
    #[inline]
    fn lane_max(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }

    /// Smaller of two lanes.
    #[inline]
    fn lane_min(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }
}

macro_rules! impl_float_element {
    ($t:ty) => {
        impl Element for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;

            #[inline]
            fn lane_add(self, rhs: Self) -> Self {
                self + rhs
            }

            #[inline]
            fn lane_sub(self, rhs: Self) -> Self {
                self - rhs
            }

            #[inline]
            fn lane_mul(self, rhs: Self) -> Self {
                self * rhs
            }

            #[inline]
            fn mul_add(self, a: Self, b: Self) -> Self {
                <$t>::mul_add(self, a, b)
            }

            #[inline]
            fn lane_max(self, other: Self) -> Self {
                // Matches maxps/maxpd: the second operand wins on NaN or equality.
                if self > other {
                    self
                } else {
                    other
                }
            }

            #[inline]
            fn lane_min(self, other: Self) -> Self {
                if self < other {
                    self
                } else {
                    other
                }
            }
        }
    };
}

macro_rules! impl_int_element {
    ($t:ty) => {
        impl Element for $t {
            const ZERO: Self = 0;
            const ONE: Self = 1;

            #[inline]
            fn lane_add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            #[inline]
            fn lane_sub(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }

            #[inline]
            fn lane_mul(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }

            #[inline]
            fn mul_add(self, a: Self, b: Self) -> Self {
                self.wrapping_mul(a).wrapping_add(b)
            }
        }
    };
}

impl_float_element!(f32);
impl_float_element!(f64);
impl_int_element!(i32);
impl_int_element!(i64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identities() {
        assert_eq!(f32::ZERO, 0.0);
        assert_eq!(f64::ONE, 1.0);
        assert_eq!(i32::ONE, 1);
        assert_eq!(i64::ZERO, 0);
    }

    #[test]
    fn test_float_mul_add_single_rounding() {
        // 0.1 * 10 - 1 is exactly representable only with one rounding step.
        let fused = 0.1f64.mul_add(10.0, -1.0);
        let split = 0.1f64 * 10.0 - 1.0;
        assert_eq!(split, 0.0);
        assert!(fused != 0.0);
    }

    #[test]
    fn test_int_ops_wrap() {
        assert_eq!(i32::MAX.lane_add(1), i32::MIN);
        assert_eq!(i32::MIN.lane_sub(1), i32::MAX);
        assert_eq!(i64::MAX.lane_mul(2), -2);
        assert_eq!(3i32.mul_add(4, 5), 17);
    }

    #[test]
    fn test_max_min() {
        assert_eq!(3.0f32.lane_max(7.0), 7.0);
        assert_eq!(3.0f32.lane_min(7.0), 3.0);
        assert_eq!((-4i64).lane_max(-9), -4);
        assert_eq!((-4i64).lane_min(-9), -9);
    }
}
