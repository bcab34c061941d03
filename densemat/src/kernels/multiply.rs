/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use densemat_wide::{SIMDMulAdd, SIMDSumTree, SIMDVector, f64x4};
use rayon::prelude::{IntoParallelIterator, ParallelIterator};
use tracing::trace;

use super::{BLOCK, LANES, UNROLL, transpose};
use crate::{error::MatResult, matrix::Matrix};

/// Store the matrix product `mat1 * mat2` into `result`.
///
/// `mat1.cols() == mat2.rows()` and `result` pre-allocated as
/// `mat1.rows() x mat2.cols()` are caller contracts checked by debug
/// assertions only. Passing overlapping regions of the same buffer as both an
/// input and `result` is undefined behavior.
///
/// The right operand is first copied into a transposed temporary so that each
/// output cell reduces two contiguous rows: a lane-group accumulator advanced
/// with fused multiply-adds over the bulk of the shared dimension, summed
/// pairwise, plus a scalar remainder. Output cells are distributed across the
/// ambient rayon pool as one flat range over `rows x cols`.
///
/// # Errors
///
/// Returns [`MatrixError::AllocationFailure`](crate::MatrixError) if the
/// internal transposed copy cannot be allocated. The temporary is released
/// before returning on every path.
pub fn multiply(result: &mut Matrix, mat1: &Matrix, mat2: &Matrix) -> MatResult<()> {
    debug_assert_eq!(mat1.cols(), mat2.rows(), "inner dimensions must agree");
    debug_assert_eq!(result.rows(), mat1.rows(), "result has the wrong row count");
    debug_assert_eq!(result.cols(), mat2.cols(), "result has the wrong column count");

    let m = mat1.rows();
    let k = mat1.cols();
    let n = mat2.cols();
    trace!(m, k, n, "multiplying matrices");

    // Transposed copy of `mat2`, so that both operands stream rows.
    let mut tmat2 = Matrix::zeros(n, mat2.rows())?;
    transpose(&mut tmat2, mat2);

    let main = k - k % BLOCK;
    let out: &Matrix = result;
    let tb: &Matrix = &tmat2;

    (0..m * n).into_par_iter().for_each(|cell| {
        let i = cell / n;
        let j = cell % n;

        // SAFETY: `i < m` and `j < n`, so the row reads are in-bounds, and
        // output cell `cell` is written by exactly this iteration.
        unsafe {
            let a = mat1.as_ptr().add(i * k);
            let b = tb.as_ptr().add(j * k);

            let mut acc = f64x4::zero();
            let mut at = 0;
            while at < main {
                for group in 0..UNROLL {
                    let off = at + group * LANES;
                    acc = f64x4::load_simd(a.add(off))
                        .mul_add_simd(f64x4::load_simd(b.add(off)), acc);
                }
                at += BLOCK;
            }

            let mut sum = acc.sum_tree();
            for r in main..k {
                sum += a.add(r).read() * b.add(r).read();
            }
            out.as_mut_ptr().add(cell).write(sum);
        }
    });

    Ok(())
}

///////////
// Tests //
///////////
