//! Matrix-vector and matrix-matrix products.
//!
//! Each output register is a running sum of fused multiply-adds of one
//! operand register by a broadcast scalar of the other. Two partial sums
//! alternate on even and odd `k` so that consecutive FMAs are independent,
//! then are added once at the end.

use super::{ColMajorMatrix, RowMajorMatrix};
use crate::backend::RegisterBackend;
use crate::element::Element;
use crate::register::Register;
use std::ops::Mul;

/// Matrix-matrix product `self * rhs`.
///
/// Implemented only where the left operand's column count equals the right
/// operand's row count, so a shape mismatch is a build error.
#[diagnostic::on_unimplemented(
    message = "matrices `{Self}` and `{Rhs}` are incompatible for multiplication",
    label = "the left column count must equal the right row count",
    note = "both operands must also share the element type, backend and layout"
)]
pub trait MatrixProduct<Rhs> {
    /// Shape of the product.
    type Output;

    /// `self * rhs`.
    fn product(&self, rhs: &Rhs) -> Self::Output;

    /// `self * rhs + acc`, with `acc` seeding the running sums.
    fn product_accumulate(&self, rhs: &Rhs, acc: &Self::Output) -> Self::Output;
}

/// `Σ_k regs[k] * scalar(k)`, seeded with `seed`.
#[inline(always)]
fn fma_chain<T, B, const W: usize, const K: usize>(
    seed: Register<T, B, W>,
    regs: &[Register<T, B, W>; K],
    scalar: impl Fn(usize) -> T,
) -> Register<T, B, W>
where
    T: Element,
    B: RegisterBackend<T>,
{
    let mut psum = [seed, Register::new()];
    for (k, reg) in regs.iter().enumerate() {
        psum[k % 2] = reg.fused_multiply_add(Register::splat(scalar(k)), psum[k % 2]);
    }
    psum[0] + psum[1]
}

impl<T, B, const R: usize, const K: usize, const C: usize> MatrixProduct<RowMajorMatrix<T, B, K, C>>
    for RowMajorMatrix<T, B, R, K>
where
    T: Element,
    B: RegisterBackend<T>,
{
    type Output = RowMajorMatrix<T, B, R, C>;

    fn product(&self, rhs: &RowMajorMatrix<T, B, K, C>) -> Self::Output {
        RowMajorMatrix {
            rows: std::array::from_fn(|i| fma_chain(Register::new(), &rhs.rows, |k| self.get(i, k))),
        }
    }

    fn product_accumulate(&self, rhs: &RowMajorMatrix<T, B, K, C>, acc: &Self::Output) -> Self::Output {
        RowMajorMatrix {
            rows: std::array::from_fn(|i| fma_chain(acc.rows[i], &rhs.rows, |k| self.get(i, k))),
        }
    }
}

impl<T, B, const R: usize, const K: usize, const C: usize> MatrixProduct<ColMajorMatrix<T, B, K, C>>
    for ColMajorMatrix<T, B, R, K>
where
    T: Element,
    B: RegisterBackend<T>,
{
    type Output = ColMajorMatrix<T, B, R, C>;

    fn product(&self, rhs: &ColMajorMatrix<T, B, K, C>) -> Self::Output {
        ColMajorMatrix {
            cols: std::array::from_fn(|j| fma_chain(Register::new(), &self.cols, |k| rhs.get(k, j))),
        }
    }

    fn product_accumulate(&self, rhs: &ColMajorMatrix<T, B, K, C>, acc: &Self::Output) -> Self::Output {
        ColMajorMatrix {
            cols: std::array::from_fn(|j| fma_chain(acc.cols[j], &self.cols, |k| rhs.get(k, j))),
        }
    }
}

impl<T: Element, B: RegisterBackend<T>, const R: usize, const C: usize> RowMajorMatrix<T, B, R, C> {
    /// `self * rhs + acc` in one pass.
    ///
    /// Agrees with `(self * rhs) + acc` up to the rounding saved by fusing the
    /// final addition.
    pub fn multiply_accumulate<Rhs>(
        &self,
        rhs: &Rhs,
        acc: &<Self as MatrixProduct<Rhs>>::Output,
    ) -> <Self as MatrixProduct<Rhs>>::Output
    where
        Self: MatrixProduct<Rhs>,
    {
        self.product_accumulate(rhs, acc)
    }
}

impl<T: Element, B: RegisterBackend<T>, const R: usize, const C: usize> ColMajorMatrix<T, B, R, C> {
    /// `self * rhs + acc` in one pass.
    pub fn multiply_accumulate<Rhs>(
        &self,
        rhs: &Rhs,
        acc: &<Self as MatrixProduct<Rhs>>::Output,
    ) -> <Self as MatrixProduct<Rhs>>::Output
    where
        Self: MatrixProduct<Rhs>,
    {
        self.product_accumulate(rhs, acc)
    }
}

impl<T, B, const R: usize, const K: usize, const C: usize> Mul<RowMajorMatrix<T, B, K, C>>
    for RowMajorMatrix<T, B, R, K>
where
    T: Element,
    B: RegisterBackend<T>,
{
    type Output = RowMajorMatrix<T, B, R, C>;

    fn mul(self, rhs: RowMajorMatrix<T, B, K, C>) -> Self::Output {
        self.product(&rhs)
    }
}

impl<T, B, const R: usize, const K: usize, const C: usize> Mul<ColMajorMatrix<T, B, K, C>>
    for ColMajorMatrix<T, B, R, K>
where
    T: Element,
    B: RegisterBackend<T>,
{
    type Output = ColMajorMatrix<T, B, R, C>;

    fn mul(self, rhs: ColMajorMatrix<T, B, K, C>) -> Self::Output {
        self.product(&rhs)
    }
}

/// Matrix-vector product: each output lane is a row dotted with `v`.
impl<T: Element, B: RegisterBackend<T>, const R: usize, const C: usize> Mul<Register<T, B, C>>
    for RowMajorMatrix<T, B, R, C>
{
    type Output = Register<T, B, R>;

    fn mul(self, v: Register<T, B, C>) -> Register<T, B, R> {
        let mut out = Register::new();
        for (i, row) in self.rows.iter().enumerate() {
            out.set(i, row.dot(&v));
        }
        out
    }
}

/// Matrix-vector product: a fused multiply-add of each column by `v[j]`.
impl<T: Element, B: RegisterBackend<T>, const R: usize, const C: usize> Mul<Register<T, B, C>>
    for ColMajorMatrix<T, B, R, C>
{
    type Output = Register<T, B, R>;

    fn mul(self, v: Register<T, B, C>) -> Register<T, B, R> {
        fma_chain(Register::new(), &self.cols, |j| v.get(j))
    }
}
