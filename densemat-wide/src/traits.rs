/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

/// A trait representing minimal behavior for a SIMD-like vector of four packed
/// `f64` lanes.
///
/// A `SIMDVector` can be thought of as a homogeneous array `[f64; 4]` (with
/// potentially stricter alignment requirements) that behaves for arithmetic
/// purposes like a scalar: binary operators broadcast across all lanes.
pub trait SIMDVector: Copy + std::fmt::Debug {
    /// The number of lanes in the vector.
    const LANES: usize = 4;

    /// Whether or not this is an emulated vector.
    ///
    /// Emulated vectors are backed by Rust arrays and use scalar loops to
    /// implement arithmetic operations.
    const EMULATED: bool;

    /// Broadcast the provided scalar across all lanes.
    fn splat(value: f64) -> Self;

    /// Return a vector with all lanes set to `0.0`.
    fn zero() -> Self;

    /// Construct from an array, with lane `i` taking the value of `x[i]`.
    fn from_array(x: [f64; 4]) -> Self;

    /// Retrieve the contents as an array.
    fn to_array(self) -> [f64; 4];

    /// Load `LANES` elements starting at the provided pointer.
    ///
    /// The alignment of `ptr` must be the same as `f64`, but does not need to
    /// be stricter.
    ///
    /// # Safety
    ///
    /// A contiguous read of `LANES` elements from `ptr` must touch valid
    /// memory.
    unsafe fn load_simd(ptr: *const f64) -> Self;

    /// Store `LANES` elements contiguously starting at the provided pointer.
    ///
    /// The alignment of `ptr` must be the same as `f64`, but does not need to
    /// be stricter.
    ///
    /// # Safety
    ///
    /// The pointed-to memory must adhere to Rust's exclusive reference rules.
    ///
    /// A contiguous store of `LANES` elements to `ptr` must touch valid
    /// memory.
    unsafe fn store_simd(self, ptr: *mut f64);
}

/// Efficiently perform the operation
/// ```ignore
/// self * rhs + accumulator
/// ```
/// as a fused multiply-add with a single rounding instance.
///
/// Both backends fuse: the emulated implementation uses `f64::mul_add`, so
/// results are bit-identical to the hardware FMA.
pub trait SIMDMulAdd {
    fn mul_add_simd(self, rhs: Self, accumulator: Self) -> Self;
}

/// Take the absolute value of each lane.
///
/// Implemented by clearing the sign bit, so `-0.0` maps to `0.0` and NaN
/// payloads are preserved on every backend.
pub trait SIMDAbs {
    fn abs_simd(self) -> Self;
}

/// Perform a pairwise reducing sum of all lanes in the vector and return the
/// result as a scalar.
///
/// The summing pattern is fixed across backends:
/// ```text
/// let v = [x0, x1, x2, x3];
/// (x0 + x2) + (x1 + x3)
/// ```
pub trait SIMDSumTree: SIMDVector {
    fn sum_tree(self) -> f64;
}

/// A roll-up of the traits required of a SIMD floating point type.
pub trait SIMDFloat:
    SIMDVector
    + std::ops::Add<Output = Self>
    + std::ops::Sub<Output = Self>
    + std::ops::Neg<Output = Self>
    + SIMDMulAdd
    + SIMDAbs
    + SIMDSumTree
{
}

impl<T> SIMDFloat for T where
    T: SIMDVector
        + std::ops::Add<Output = Self>
        + std::ops::Sub<Output = Self>
        + std::ops::Neg<Output = Self>
        + SIMDMulAdd
        + SIMDAbs
        + SIMDSumTree
{
}
