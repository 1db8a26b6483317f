//! Operator overloads for [`Register`].
//!
//! `a + b` is [`Register::add`], `a * 2.0` splats the scalar first, and
//! `2.0 * a` works for every concrete element type.

use super::Register;
use crate::backend::RegisterBackend;
use crate::element::Element;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

macro_rules! impl_binary_op {
    ($trait:ident, $fn:ident, $assign_trait:ident, $assign_fn:ident, $method:ident) => {
        impl<T: Element, B: RegisterBackend<T>, const N: usize> $trait for Register<T, B, N> {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: Self) -> Self {
                self.$method(rhs)
            }
        }

        impl<T: Element, B: RegisterBackend<T>, const N: usize> $trait<T> for Register<T, B, N> {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: T) -> Self {
                self.$method(Self::splat(rhs))
            }
        }

        impl<T: Element, B: RegisterBackend<T>, const N: usize> $assign_trait for Register<T, B, N> {
            #[inline(always)]
            fn $assign_fn(&mut self, rhs: Self) {
                *self = self.$method(rhs);
            }
        }

        impl<T: Element, B: RegisterBackend<T>, const N: usize> $assign_trait<T> for Register<T, B, N> {
            #[inline(always)]
            fn $assign_fn(&mut self, rhs: T) {
                *self = self.$method(Self::splat(rhs));
            }
        }
    };
}

impl_binary_op!(Add, add, AddAssign, add_assign, add);
impl_binary_op!(Sub, sub, SubAssign, sub_assign, subtract);
impl_binary_op!(Mul, mul, MulAssign, mul_assign, multiply);
impl_binary_op!(Div, div, DivAssign, div_assign, divide);

/// Scalar on the left-hand side: `2.0 * x`, `1.0 - x`.
macro_rules! impl_scalar_lhs {
    ($($t:ty),*) => {$(
        impl<B: RegisterBackend<$t>, const N: usize> Add<Register<$t, B, N>> for $t {
            type Output = Register<$t, B, N>;

            #[inline(always)]
            fn add(self, rhs: Register<$t, B, N>) -> Register<$t, B, N> {
                Register::splat(self).add(rhs)
            }
        }

        impl<B: RegisterBackend<$t>, const N: usize> Sub<Register<$t, B, N>> for $t {
            type Output = Register<$t, B, N>;

            #[inline(always)]
            fn sub(self, rhs: Register<$t, B, N>) -> Register<$t, B, N> {
                Register::splat(self).subtract(rhs)
            }
        }

        impl<B: RegisterBackend<$t>, const N: usize> Mul<Register<$t, B, N>> for $t {
            type Output = Register<$t, B, N>;

            #[inline(always)]
            fn mul(self, rhs: Register<$t, B, N>) -> Register<$t, B, N> {
                Register::splat(self).multiply(rhs)
            }
        }

        impl<B: RegisterBackend<$t>, const N: usize> Div<Register<$t, B, N>> for $t {
            type Output = Register<$t, B, N>;

            #[inline(always)]
            fn div(self, rhs: Register<$t, B, N>) -> Register<$t, B, N> {
                Register::splat(self).divide(rhs)
            }
        }
    )*};
}

impl_scalar_lhs!(f32, f64, i32, i64);

impl<T, B, const N: usize> Neg for Register<T, B, N>
where
    T: Element + Neg<Output = T>,
    B: RegisterBackend<T>,
{
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        // Multiplying by -1 keeps the sign of zero and NaN payloads intact.
        self.multiply(Self::splat(-T::ONE))
    }
}
