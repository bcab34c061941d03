/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! # densemat - Dense Row-Major Matrix Kernels
//!
//! A dense, row-major, double-precision matrix library: allocation with
//! shared-ownership views, elementwise arithmetic, transposition, matrix
//! multiplication, and integer matrix exponentiation, accelerated with
//! 4-wide `f64` vector lanes ([`densemat_wide`]) and rayon worker threads.
//!
//! ## Ownership
//!
//! [`Matrix`] is a reference-counted handle: [`Matrix::zeros`] allocates an
//! owning matrix, [`Matrix::view`] creates a matrix aliasing a sub-range of
//! another's buffer, and the buffer is freed exactly when the last handle
//! over it goes away, owner or view, dropped in any order.
//!
//! ## Kernels
//!
//! The kernels ([`fill`], [`abs`], [`negate`], [`add`], [`subtract`],
//! [`transpose`], [`multiply`], [`power`]) write into a caller-supplied,
//! caller-sized `result` matrix and never allocate or resize it.
//! Multiplication transposes its right operand internally so every output
//! cell reduces two contiguous rows with fused multiply-adds; [`power`] is
//! exponentiation by squaring on top of [`multiply`].
//!
//! Shape agreement between kernel arguments is a trusted caller contract,
//! checked by debug assertions only, as is not passing overlapping regions of
//! one buffer as both an input and a result.
//!
//! ## Concurrency
//!
//! Kernels synchronously fan independent loop iterations out on the ambient
//! rayon pool and join before returning; wrap calls in
//! [`parallel::ThreadPool::install`] to control the worker count. Outputs do
//! not depend on the pool size: elementwise kernels and transposition are
//! bit-stable by construction, and each multiplication cell is reduced in a
//! fixed order by a single task.
//!
//! ```
//! use densemat::{Matrix, multiply};
//!
//! let a = Matrix::from_slice(&[1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
//! let b = Matrix::from_slice(&[5.0, 6.0, 7.0, 8.0], 2, 2).unwrap();
//! let mut product = Matrix::zeros(2, 2).unwrap();
//!
//! multiply(&mut product, &a, &b).unwrap();
//! assert_eq!(product.to_vec(), &[19.0, 22.0, 43.0, 50.0]);
//! ```

mod error;
pub use error::{MatResult, MatrixError};

mod matrix;
pub use matrix::Matrix;

mod kernels;
pub use kernels::{abs, add, fill, multiply, negate, power, subtract, transpose};

pub mod parallel;
