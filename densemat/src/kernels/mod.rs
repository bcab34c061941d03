/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Compute kernels over [`Matrix`](crate::Matrix) data.
//!
//! Every kernel processes the bulk of its data in groups of
//! [`LANES`] packed `f64` values, unrolled [`UNROLL`] times for throughput,
//! with a scalar loop for the remainder, and fans independent pieces of the
//! iteration space out on the ambient rayon pool.
//!
//! Kernels never allocate or resize their `result` argument: it is caller
//! supplied and caller sized. Shape agreement between arguments is a caller
//! contract, checked by debug assertions only.

mod elementwise;
pub use elementwise::{abs, add, fill, negate, subtract};

mod transpose;
pub use transpose::transpose;

mod multiply;
pub use multiply::multiply;

mod power;
pub use power::power;

use densemat_wide::{SIMDVector, f64x4};

/// The number of `f64` lanes processed per vector operation.
pub(crate) const LANES: usize = f64x4::LANES;

/// How many vector operations are unrolled per block.
pub(crate) const UNROLL: usize = 4;

/// The elements consumed by one unrolled block.
pub(crate) const BLOCK: usize = LANES * UNROLL;
