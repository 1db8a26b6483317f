//! Register-tiled matrices.
//!
//! [`RowMajorMatrix<T, B, R, C>`] stores `R` row registers of width `C`;
//! [`ColMajorMatrix<T, B, R, C>`] stores `C` column registers of width `R`.
//! Shapes are const generics, so a product of incompatible shapes has no
//! implementation and fails to build (see [`MatrixProduct`]). Layout and
//! transposition are distinct types related through [`MatrixReshape`].
//!
//! ```
//! use trueno_simt::backend::Warp;
//! use trueno_simt::matrix::RowMajorMatrix;
//!
//! let a = RowMajorMatrix::<f64, Warp, 2, 3>::from_array([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
//! let b = RowMajorMatrix::<f64, Warp, 3, 2>::from_array([[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]]);
//! assert_eq!((a * b).to_array(), [[58.0, 64.0], [139.0, 154.0]]);
//! ```

mod product;
mod reshape;

pub use product::MatrixProduct;
pub use reshape::{Flip, FlipTranspose, MatrixReshape, SimilarTranspose};

use crate::backend::RegisterBackend;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::register::Register;
use std::fmt;
use std::ops::{Add, Sub};

/// `R × C` matrix stored as `R` row registers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowMajorMatrix<T: Element, B: RegisterBackend<T>, const R: usize, const C: usize> {
    rows: [Register<T, B, C>; R],
}

/// `R × C` matrix stored as `C` column registers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColMajorMatrix<T: Element, B: RegisterBackend<T>, const R: usize, const C: usize> {
    cols: [Register<T, B, R>; C],
}

fn checked_array<V: Copy, const L: usize>(items: &[V]) -> Result<[V; L]> {
    <[V; L]>::try_from(items).map_err(|_| Error::RowCountMismatch {
        expected: L,
        actual: items.len(),
    })
}

impl<T: Element, B: RegisterBackend<T>, const R: usize, const C: usize> RowMajorMatrix<T, B, R, C> {
    /// Row count.
    pub const ROWS: usize = R;
    /// Column count.
    pub const COLS: usize = C;

    /// All elements zero.
    pub fn new() -> Self {
        Self {
            rows: [Register::new(); R],
        }
    }

    /// Every element set to `value`.
    pub fn splat(value: T) -> Self {
        Self {
            rows: [Register::splat(value); R],
        }
    }

    /// Builds a matrix from its row registers.
    pub fn from_rows(rows: [Register<T, B, C>; R]) -> Self {
        Self { rows }
    }

    /// Builds a matrix from a slice of rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowCountMismatch`] unless `rows.len() == R`.
    pub fn try_from_rows(rows: &[Register<T, B, C>]) -> Result<Self> {
        checked_array(rows).map(Self::from_rows)
    }

    /// Builds a matrix from nested row arrays.
    pub fn from_array(values: [[T; C]; R]) -> Self {
        Self {
            rows: values.map(Register::from_lanes),
        }
    }

    /// Copies the elements out as nested row arrays.
    pub fn to_array(&self) -> [[T; C]; R] {
        self.rows.map(|row| row.to_lanes())
    }

    /// Element at (`row`, `col`).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.rows[row].get(col)
    }

    /// Sets the element at (`row`, `col`).
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) -> &mut Self {
        self.rows[row].set(col, value);
        self
    }

    /// Row `i`.
    #[inline]
    pub fn row(&self, i: usize) -> Register<T, B, C> {
        self.rows[i]
    }

    /// Mutable row `i`.
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut Register<T, B, C> {
        &mut self.rows[i]
    }

    /// Column `j`, gathered lane by lane.
    pub fn col(&self, j: usize) -> Register<T, B, R> {
        let mut col = Register::new();
        for (i, row) in self.rows.iter().enumerate() {
            col.set(i, row.get(j));
        }
        col
    }

    /// Overwrites every row with `other`'s.
    pub fn copy_from(&mut self, other: &Self) -> &mut Self {
        self.rows = other.rows;
        self
    }

    /// The `C × R` transpose, still row-major.
    pub fn transpose(&self) -> RowMajorMatrix<T, B, C, R> {
        RowMajorMatrix {
            rows: std::array::from_fn(|j| self.col(j)),
        }
    }

    /// The same matrix stored by columns.
    pub fn to_col_major(&self) -> ColMajorMatrix<T, B, R, C> {
        ColMajorMatrix {
            cols: std::array::from_fn(|j| self.col(j)),
        }
    }

    /// Loads row `i` from `src[i * row_stride..]`.
    ///
    /// # Panics
    ///
    /// If `src` does not cover every row.
    pub fn load_row_major(src: &[T], row_stride: usize) -> Self {
        Self {
            rows: std::array::from_fn(|i| Register::load_slice(&src[i * row_stride..])),
        }
    }

    /// Stores row `i` to `dst[i * row_stride..]`.
    ///
    /// # Panics
    ///
    /// If `dst` does not cover every row.
    pub fn store_row_major(&self, dst: &mut [T], row_stride: usize) {
        for (i, row) in self.rows.iter().enumerate() {
            row.store_slice(&mut dst[i * row_stride..]);
        }
    }

    /// Loads from a column-major buffer, column `j` at `src[j * col_stride..]`.
    ///
    /// # Panics
    ///
    /// If `src` does not cover every column.
    pub fn load_col_major(src: &[T], col_stride: usize) -> Self {
        Self {
            rows: std::array::from_fn(|i| Register::load_strided(&src[i..], col_stride)),
        }
    }

    /// Stores to a column-major buffer, column `j` at `dst[j * col_stride..]`.
    ///
    /// # Panics
    ///
    /// If `dst` does not cover every column.
    pub fn store_col_major(&self, dst: &mut [T], col_stride: usize) {
        for (i, row) in self.rows.iter().enumerate() {
            row.store_strided(&mut dst[i..], col_stride);
        }
    }
}

impl<T: Element, B: RegisterBackend<T>, const R: usize, const C: usize> ColMajorMatrix<T, B, R, C> {
    /// Row count.
    pub const ROWS: usize = R;
    /// Column count.
    pub const COLS: usize = C;

    /// All elements zero.
    pub fn new() -> Self {
        Self {
            cols: [Register::new(); C],
        }
    }

    /// Every element set to `value`.
    pub fn splat(value: T) -> Self {
        Self {
            cols: [Register::splat(value); C],
        }
    }

    /// Builds a matrix from its column registers.
    pub fn from_cols(cols: [Register<T, B, R>; C]) -> Self {
        Self { cols }
    }

    /// Builds a matrix from a slice of columns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowCountMismatch`] unless `cols.len() == C`.
    pub fn try_from_cols(cols: &[Register<T, B, R>]) -> Result<Self> {
        checked_array(cols).map(Self::from_cols)
    }

    /// Builds a matrix from nested row arrays.
    pub fn from_array(values: [[T; C]; R]) -> Self {
        Self {
            cols: std::array::from_fn(|j| Register::from_lanes(std::array::from_fn(|i| values[i][j]))),
        }
    }

    /// Copies the elements out as nested row arrays.
    pub fn to_array(&self) -> [[T; C]; R] {
        std::array::from_fn(|i| std::array::from_fn(|j| self.get(i, j)))
    }

    /// Element at (`row`, `col`).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.cols[col].get(row)
    }

    /// Sets the element at (`row`, `col`).
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) -> &mut Self {
        self.cols[col].set(row, value);
        self
    }

    /// Column `j`.
    #[inline]
    pub fn col(&self, j: usize) -> Register<T, B, R> {
        self.cols[j]
    }

    /// Mutable column `j`.
    #[inline]
    pub fn col_mut(&mut self, j: usize) -> &mut Register<T, B, R> {
        &mut self.cols[j]
    }

    /// Row `i`, gathered lane by lane.
    pub fn row(&self, i: usize) -> Register<T, B, C> {
        let mut row = Register::new();
        for (j, col) in self.cols.iter().enumerate() {
            row.set(j, col.get(i));
        }
        row
    }

    /// Overwrites every column with `other`'s.
    pub fn copy_from(&mut self, other: &Self) -> &mut Self {
        self.cols = other.cols;
        self
    }

    /// The `C × R` transpose, still column-major.
    pub fn transpose(&self) -> ColMajorMatrix<T, B, C, R> {
        ColMajorMatrix {
            cols: std::array::from_fn(|i| self.row(i)),
        }
    }

    /// The same matrix stored by rows.
    pub fn to_row_major(&self) -> RowMajorMatrix<T, B, R, C> {
        RowMajorMatrix {
            rows: std::array::from_fn(|i| self.row(i)),
        }
    }

    /// Loads from a row-major buffer, row `i` at `src[i * row_stride..]`.
    ///
    /// # Panics
    ///
    /// If `src` does not cover every row.
    pub fn load_row_major(src: &[T], row_stride: usize) -> Self {
        Self {
            cols: std::array::from_fn(|j| Register::load_strided(&src[j..], row_stride)),
        }
    }

    /// Stores to a row-major buffer, row `i` at `dst[i * row_stride..]`.
    ///
    /// # Panics
    ///
    /// If `dst` does not cover every row.
    pub fn store_row_major(&self, dst: &mut [T], row_stride: usize) {
        for (j, col) in self.cols.iter().enumerate() {
            col.store_strided(&mut dst[j..], row_stride);
        }
    }

    /// Loads column `j` from `src[j * col_stride..]`.
    ///
    /// # Panics
    ///
    /// If `src` does not cover every column.
    pub fn load_col_major(src: &[T], col_stride: usize) -> Self {
        Self {
            cols: std::array::from_fn(|j| Register::load_slice(&src[j * col_stride..])),
        }
    }

    /// Stores column `j` to `dst[j * col_stride..]`.
    ///
    /// # Panics
    ///
    /// If `dst` does not cover every column.
    pub fn store_col_major(&self, dst: &mut [T], col_stride: usize) {
        for (j, col) in self.cols.iter().enumerate() {
            col.store_slice(&mut dst[j * col_stride..]);
        }
    }
}

macro_rules! impl_layout_common {
    ($matrix:ident, $field:ident) => {
        impl<T: Element, B: RegisterBackend<T>, const R: usize, const C: usize> Default
            for $matrix<T, B, R, C>
        {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<T: Element, B: RegisterBackend<T>, const R: usize, const C: usize> Add
            for $matrix<T, B, R, C>
        {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                let mut out = self;
                for (lhs, rhs) in out.$field.iter_mut().zip(rhs.$field) {
                    *lhs += rhs;
                }
                out
            }
        }

        impl<T: Element, B: RegisterBackend<T>, const R: usize, const C: usize> Sub
            for $matrix<T, B, R, C>
        {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                let mut out = self;
                for (lhs, rhs) in out.$field.iter_mut().zip(rhs.$field) {
                    *lhs -= rhs;
                }
                out
            }
        }

        impl<T: Element, B: RegisterBackend<T>, const R: usize, const C: usize> fmt::Display
            for $matrix<T, B, R, C>
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for i in 0..R {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}", self.row(i))?;
                }
                Ok(())
            }
        }
    };
}

impl_layout_common!(RowMajorMatrix, rows);
impl_layout_common!(ColMajorMatrix, cols);
