/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use thiserror::Error;

/// Convenience alias for a `Result<T, MatrixError>`.
pub type MatResult<T> = Result<T, MatrixError>;

/// Common error type shared through `densemat`.
///
/// Constructors surface errors immediately; no operation performs partial
/// work and then reports failure. Kernels that assume correct-dimension
/// inputs do not re-validate: a dimension mismatch is a caller contract
/// violation, checked only by debug assertions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MatrixError {
    /// A constructor was passed a zero dimension. Dimensions are `usize`, so
    /// the negative case is unrepresentable by construction.
    #[error("invalid matrix dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    /// The backing buffer for an owning matrix could not be obtained.
    #[error("failed to allocate backing storage for a {rows}x{cols} matrix")]
    AllocationFailure { rows: usize, cols: usize },

    /// A worker thread pool could not be built.
    #[error("failed to build worker thread pool: {0}")]
    ThreadPool(String),
}
