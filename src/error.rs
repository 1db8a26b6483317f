//! Error types for trueno-simt.
//!
//! The register and matrix hot paths never fail at runtime: width and shape
//! mismatches are build errors. These errors cover the surfaces around them,
//! which are row-count checked constructors, graph validation, and execution
//! configuration.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside the arithmetic hot path.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A checked matrix constructor received the wrong number of rows or
    /// columns.
    #[error("expected {expected} registers, got {actual}")]
    RowCountMismatch {
        /// Count fixed by the matrix type.
        expected: usize,
        /// Count supplied by the caller.
        actual: usize,
    },

    /// The graph contains a dependency cycle through this node.
    #[error("dependency cycle through node {node}")]
    Cycle {
        /// A node on the cycle.
        node: usize,
    },

    /// A node can never fire because it is not reachable from any root.
    #[error("node {node} is unreachable from the roots and would never fire")]
    Unreachable {
        /// The dormant node.
        node: usize,
    },

    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),

    /// Invalid configuration value.
    #[error("invalid configuration value for '{key}': {message}")]
    ConfigInvalid {
        /// The configuration key with invalid value.
        key: String,
        /// Error message describing why the value is invalid.
        message: String,
    },

    /// The worker pool for parallel execution could not be built.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}
