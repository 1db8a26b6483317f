//! # Trueno-SIMT
//!
//! Portable SIMD/SIMT kernel core: fixed-width registers and small matrices
//! that compile unchanged against scalar, AVX, AVX2, AVX-512 and GPU-warp
//! style backends, plus a task dependency graph for ordering kernel launches.
//!
//! ## Features
//!
//! - **Registers**: `N` logical lanes over one native vector, with arithmetic,
//!   fused multiply-add, butterfly reductions and segmented operations
//! - **Matrices**: row-major and column-major register-backed matrices with
//!   products, transposes and layout flips resolved at compile time
//! - **Graphs**: arena-backed DAG whose nodes fire once per traversal after
//!   all their parents, serially or on a rayon pool
//!
//! ## Quick Start
//!
//! ```rust
//! use trueno_simt::prelude::*;
//!
//! let a = RowMajorMatrix::<f64, Warp, 2, 2>::from_array([[1.0, 2.0], [3.0, 4.0]]);
//! let x = Register::<f64, Warp, 2>::from_lanes([1.0, 1.0]);
//! assert_eq!((a * x).to_lanes(), [3.0, 7.0]);
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` (default): `Dag::exec_parallel` on rayon
//! - `avx512`: AVX-512 backend (also requires `avx512f` at build time)
//!
//! SIMD backends follow the target features the crate is built with; see
//! [`backend`] for the table.

#![cfg_attr(docsrs, feature(doc_cfg))]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Lane arithmetic and index math
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Diagnostics
// ============================================================================

/// Debug logging to stderr.
pub mod debug;

// ============================================================================
// Core Modules
// ============================================================================

/// Lane element types.
pub mod element;

/// Instruction-set backends.
pub mod backend;

/// Fixed-width registers.
pub mod register;

/// Register-backed matrices.
pub mod matrix;

// ============================================================================
// Execution Modules
// ============================================================================

/// Task dependency graphs.
pub mod graph;

/// Execution configuration.
pub mod config;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for trueno-simt operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use trueno_simt::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backend::{BackendKind, RegisterBackend, Scalar, Warp};
    pub use crate::config::{Config, ExecConfig, ExecMode};
    pub use crate::element::Element;
    pub use crate::error::{Error, Result};
    pub use crate::graph::{Dag, Exec, NodeId};
    pub use crate::matrix::{ColMajorMatrix, MatrixProduct, MatrixReshape, RowMajorMatrix};
    pub use crate::register::Register;

    #[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
    pub use crate::backend::Avx;
    #[cfg(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "fma"))]
    pub use crate::backend::Avx2;
    #[cfg(all(feature = "avx512", target_arch = "x86_64", target_feature = "avx512f"))]
    pub use crate::backend::Avx512;
}

// ============================================================================
// Tests
// ============================================================================
