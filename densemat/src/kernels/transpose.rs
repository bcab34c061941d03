/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use rayon::prelude::{IntoParallelIterator, ParallelIterator};

use crate::matrix::Matrix;

/// Store the transpose of `mat` into `result`.
///
/// `result` must be pre-allocated with `rows = mat.cols()` and
/// `cols = mat.rows()`; this is a caller contract checked by debug assertions
/// only. Rows of `mat` are distributed across the ambient rayon pool.
///
/// Passing overlapping regions of the same buffer as both arguments is
/// undefined behavior.
pub fn transpose(result: &mut Matrix, mat: &Matrix) {
    debug_assert_eq!(result.rows(), mat.cols(), "result shape must be transposed");
    debug_assert_eq!(result.cols(), mat.rows(), "result shape must be transposed");

    let rows = mat.rows();
    let cols = mat.cols();
    let out: &Matrix = result;

    (0..rows).into_par_iter().for_each(|i| {
        // SAFETY: Reads are in-bounds, and iteration `i` writes column `i` of
        // `out`, a destination disjoint from every other iteration's.
        unsafe {
            let dst = out.as_mut_ptr();
            for j in 0..cols {
                dst.add(j * rows + i).write(mat.get_unchecked(i, j));
            }
        }
    });
}

///////////
// Tests //
///////////
