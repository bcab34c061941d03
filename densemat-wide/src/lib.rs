/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! # Wide - Cross Architecture SIMD for `f64` Lanes
//!
//! This crate provides a minimal, cross-platform vector type of four packed
//! double-precision lanes, the group width used by the `densemat` kernels.
//!
//! ## Traits
//!
//! * [`SIMDVector`]: General trait for working with a SIMD vector, including
//!   creation and data access.
//! * [`SIMDMulAdd`]: Fused multiply-add.
//! * [`SIMDAbs`]: Lanewise absolute value.
//! * [`SIMDSumTree`]: Pairwise horizontal reduction to a scalar.
//! * [`SIMDFloat`]: A roll-up of all of the above plus the lanewise `std::ops`
//!   operators.
//!
//! ## Backends
//!
//! Two backends implement the traits:
//!
//! * [`emulated::f64x4`]: Backed by a `[f64; 4]` and scalar loops. Always
//!   available, and the reference implementation for the hardware backends.
//!
//! * `x86_64::f64x4`: Backed by an AVX register. Compiled only when the
//!   `avx2` and `fma` target features are statically enabled, so that every
//!   intrinsic it uses is known-good at compile time.
//!
//! The crate-level [`f64x4`] alias resolves to the best backend for the
//! compilation target, in the manner of an `arch::Current` type.
//!
//! ## Determinism
//!
//! Backends are bit-identical for every operation, including fused
//! multiply-add (the emulated backend fuses via `f64::mul_add`) and the
//! horizontal sum (fixed pairwise order). Code written against [`f64x4`]
//! therefore produces the same bits no matter which backend is selected.

mod traits;
pub use traits::{SIMDAbs, SIMDFloat, SIMDMulAdd, SIMDSumTree, SIMDVector};

pub mod emulated;

#[cfg(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "fma"))]
pub mod x86_64;

/////////////////////////
// Backend Resolution  //
/////////////////////////

cfg_if::cfg_if! {
    if #[cfg(all(
        target_arch = "x86_64",
        target_feature = "avx2",
        target_feature = "fma",
    ))] {
        /// The `f64x4` backend that is the closest fit for the current
        /// compilation target.
        pub use x86_64::f64x4;
    } else {
        /// The `f64x4` backend that is the closest fit for the current
        /// compilation target.
        pub use emulated::f64x4;
    }
}

///////////
// Tests //
///////////
