//! Layout and transpose type mapping.

use super::{ColMajorMatrix, RowMajorMatrix};
use crate::backend::RegisterBackend;
use crate::element::Element;

/// Types related to a matrix by layout flip and transposition.
///
/// For an `R × C` matrix, `RowMajor`/`ColMajor` keep the shape and
/// `*Transpose` are `C × R`. `Orig`, `Flip`, `SimilarTranspose` and
/// `FlipTranspose` name the same four types relative to the matrix's own
/// layout. Flipping layout changes the register width from `C` to `R` or
/// back.
pub trait MatrixReshape {
    /// Same shape, row-major.
    type RowMajor;
    /// Same shape, column-major.
    type ColMajor;
    /// Transposed shape, row-major.
    type RowMajorTranspose;
    /// Transposed shape, column-major.
    type ColMajorTranspose;
    /// The matrix type itself.
    type Orig;
    /// Same shape, opposite layout.
    type Flip;
    /// Transposed shape, same layout.
    type SimilarTranspose;
    /// Transposed shape, opposite layout.
    type FlipTranspose;
}

impl<T: Element, B: RegisterBackend<T>, const R: usize, const C: usize> MatrixReshape
    for RowMajorMatrix<T, B, R, C>
{
    type RowMajor = Self;
    type ColMajor = ColMajorMatrix<T, B, R, C>;
    type RowMajorTranspose = RowMajorMatrix<T, B, C, R>;
    type ColMajorTranspose = ColMajorMatrix<T, B, C, R>;
    type Orig = Self;
    type Flip = ColMajorMatrix<T, B, R, C>;
    type SimilarTranspose = RowMajorMatrix<T, B, C, R>;
    type FlipTranspose = ColMajorMatrix<T, B, C, R>;
}

impl<T: Element, B: RegisterBackend<T>, const R: usize, const C: usize> MatrixReshape
    for ColMajorMatrix<T, B, R, C>
{
    type RowMajor = RowMajorMatrix<T, B, R, C>;
    type ColMajor = Self;
    type RowMajorTranspose = RowMajorMatrix<T, B, C, R>;
    type ColMajorTranspose = ColMajorMatrix<T, B, C, R>;
    type Orig = Self;
    type Flip = RowMajorMatrix<T, B, R, C>;
    type SimilarTranspose = ColMajorMatrix<T, B, C, R>;
    type FlipTranspose = RowMajorMatrix<T, B, C, R>;
}

/// Shorthand for `<M as MatrixReshape>::Flip`.
pub type Flip<M> = <M as MatrixReshape>::Flip;

/// Shorthand for `<M as MatrixReshape>::SimilarTranspose`.
pub type SimilarTranspose<M> = <M as MatrixReshape>::SimilarTranspose;

/// Shorthand for `<M as MatrixReshape>::FlipTranspose`.
pub type FlipTranspose<M> = <M as MatrixReshape>::FlipTranspose;
