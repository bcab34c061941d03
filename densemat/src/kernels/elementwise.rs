/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use densemat_wide::{SIMDAbs, SIMDVector, f64x4};
use rayon::prelude::{IntoParallelIterator, ParallelIterator};

use super::{BLOCK, LANES, UNROLL};
use crate::matrix::Matrix;

/// Apply `vector`/`scalar` to every element of `mat`, writing into `result`.
///
/// The two closures must compute the same function; `vector` handles whole
/// lane groups over the bulk of the buffer and `scalar` the remainder. Whole
/// blocks are distributed across the ambient rayon pool.
fn map_unary<V, S>(result: &mut Matrix, mat: &Matrix, vector: V, scalar: S)
where
    V: Fn(f64x4) -> f64x4 + Sync,
    S: Fn(f64) -> f64 + Sync,
{
    debug_assert_eq!(
        result.len(),
        mat.len(),
        "result and input must have the same element count"
    );

    let len = mat.len();
    let main = len - len % BLOCK;
    let out: &Matrix = result;

    (0..main / BLOCK).into_par_iter().for_each(|block| {
        let base = block * BLOCK;
        // SAFETY: Blocks are disjoint, in-bounds, and each element of `out`
        // is written by exactly one iteration. Reads of `mat` are in-bounds.
        unsafe {
            let src = mat.as_ptr().add(base);
            let dst = out.as_mut_ptr().add(base);
            for group in 0..UNROLL {
                let at = group * LANES;
                vector(f64x4::load_simd(src.add(at))).store_simd(dst.add(at));
            }
        }
    });

    let src = mat.as_ptr();
    let dst = out.as_mut_ptr();
    for i in main..len {
        // SAFETY: `i < len`, within both handles' extents.
        unsafe { dst.add(i).write(scalar(src.add(i).read())) };
    }
}

/// The binary companion of [`map_unary`].
fn map_binary<V, S>(result: &mut Matrix, mat1: &Matrix, mat2: &Matrix, vector: V, scalar: S)
where
    V: Fn(f64x4, f64x4) -> f64x4 + Sync,
    S: Fn(f64, f64) -> f64 + Sync,
{
    debug_assert_eq!(
        mat1.len(),
        mat2.len(),
        "inputs must have the same element count"
    );
    debug_assert_eq!(
        result.len(),
        mat1.len(),
        "result and inputs must have the same element count"
    );

    let len = mat1.len();
    let main = len - len % BLOCK;
    let out: &Matrix = result;

    (0..main / BLOCK).into_par_iter().for_each(|block| {
        let base = block * BLOCK;
        // SAFETY: Blocks are disjoint, in-bounds, and each element of `out`
        // is written by exactly one iteration. Reads of the inputs are
        // in-bounds.
        unsafe {
            let a = mat1.as_ptr().add(base);
            let b = mat2.as_ptr().add(base);
            let dst = out.as_mut_ptr().add(base);
            for group in 0..UNROLL {
                let at = group * LANES;
                vector(f64x4::load_simd(a.add(at)), f64x4::load_simd(b.add(at)))
                    .store_simd(dst.add(at));
            }
        }
    });

    let a = mat1.as_ptr();
    let b = mat2.as_ptr();
    let dst = out.as_mut_ptr();
    for i in main..len {
        // SAFETY: `i < len`, within all three handles' extents.
        unsafe { dst.add(i).write(scalar(a.add(i).read(), b.add(i).read())) };
    }
}

/// Set every element of `mat` to `value`.
pub fn fill(mat: &mut Matrix, value: f64) {
    let len = mat.len();
    let main = len - len % BLOCK;
    let out: &Matrix = mat;
    let splat = f64x4::splat(value);

    (0..main / BLOCK).into_par_iter().for_each(|block| {
        let base = block * BLOCK;
        // SAFETY: Blocks are disjoint and in-bounds; each element is written
        // by exactly one iteration.
        unsafe {
            let dst = out.as_mut_ptr().add(base);
            for group in 0..UNROLL {
                splat.store_simd(dst.add(group * LANES));
            }
        }
    });

    let dst = out.as_mut_ptr();
    for i in main..len {
        // SAFETY: `i < len`, within the handle's extent.
        unsafe { dst.add(i).write(value) };
    }
}

/// Store the elementwise absolute value of `mat` into `result`.
///
/// `result` must have the same total element count as `mat`; passing
/// overlapping regions of the same buffer as both arguments is undefined
/// behavior.
pub fn abs(result: &mut Matrix, mat: &Matrix) {
    map_unary(result, mat, |v| v.abs_simd(), |x| x.abs());
}

/// Store the elementwise negation of `mat` into `result`.
///
/// `result` must have the same total element count as `mat`; passing
/// overlapping regions of the same buffer as both arguments is undefined
/// behavior.
pub fn negate(result: &mut Matrix, mat: &Matrix) {
    map_unary(result, mat, |v| -v, |x| -x);
}

/// Store the elementwise sum of `mat1` and `mat2` into `result`.
///
/// All three arguments must have the same total element count; passing
/// overlapping regions of the same buffer as both an input and `result` is
/// undefined behavior.
pub fn add(result: &mut Matrix, mat1: &Matrix, mat2: &Matrix) {
    map_binary(result, mat1, mat2, |a, b| a + b, |a, b| a + b);
}

/// Store the elementwise difference `mat1 - mat2` into `result`.
///
/// All three arguments must have the same total element count; passing
/// overlapping regions of the same buffer as both an input and `result` is
/// undefined behavior.
pub fn subtract(result: &mut Matrix, mat1: &Matrix, mat2: &Matrix) {
    map_binary(result, mat1, mat2, |a, b| a - b, |a, b| a - b);
}

///////////
// Tests //
///////////

#[cfg(test)]
mod tests {
    use super::*;

    // Shapes chosen to exercise the pure-remainder, exact-block, and
    // block-plus-remainder paths.
    const SHAPES: [(usize, usize); 6] = [(1, 1), (2, 2), (3, 5), (4, 4), (5, 7), (8, 9)];

    fn random(rows: usize, cols: usize, seed: u64) -> Matrix {
        let mut m = Matrix::zeros(rows, cols).unwrap();
        m.fill_random(seed, -10.0, 10.0);
        m
    }

    fn bits(m: &Matrix) -> Vec<u64> {
        m.to_vec().iter().map(|x| x.to_bits()).collect()
    }

    #[test]
    fn fill_sets_every_element() {
        for (rows, cols) in SHAPES {
            let mut m = random(rows, cols, 0x4cf0d2a8b3017be4);
            fill(&mut m, -3.25);
            assert!(
                m.to_vec().iter().all(|&x| x == -3.25),
                "{rows}x{cols} fill left a stale element"
            );
        }
    }

    #[test]
    fn add_subtract_known_values() {
        let a = Matrix::from_slice(&[1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        let b = Matrix::from_slice(&[5.0, 6.0, 7.0, 8.0], 2, 2).unwrap();
        let mut out = Matrix::zeros(2, 2).unwrap();

        add(&mut out, &a, &b);
        assert_eq!(out.to_vec(), &[6.0, 8.0, 10.0, 12.0]);

        subtract(&mut out, &a, &b);
        assert_eq!(out.to_vec(), &[-4.0, -4.0, -4.0, -4.0]);
    }

    #[test]
    fn matches_scalar_reference() {
        for (rows, cols) in SHAPES {
            let a = random(rows, cols, 0x91f2c6de0b5a8835);
            let b = random(rows, cols, 0x0dc52b17e49a3f60);
            let av = a.to_vec();
            let bv = b.to_vec();

            let mut out = Matrix::zeros(rows, cols).unwrap();

            add(&mut out, &a, &b);
            let expected: Vec<f64> = av.iter().zip(&bv).map(|(x, y)| x + y).collect();
            assert_eq!(out.to_vec(), expected, "add {rows}x{cols}");

            subtract(&mut out, &a, &b);
            let expected: Vec<f64> = av.iter().zip(&bv).map(|(x, y)| x - y).collect();
            assert_eq!(out.to_vec(), expected, "subtract {rows}x{cols}");

            abs(&mut out, &a);
            let expected: Vec<f64> = av.iter().map(|x| x.abs()).collect();
            assert_eq!(out.to_vec(), expected, "abs {rows}x{cols}");

            negate(&mut out, &a);
            let expected: Vec<f64> = av.iter().map(|x| -x).collect();
            assert_eq!(out.to_vec(), expected, "negate {rows}x{cols}");
        }
    }

    #[test]
    fn negate_is_an_involution() {
        for (rows, cols) in SHAPES {
            let a = random(rows, cols, 0x6a80cc5de1f7b412);
            let mut once = Matrix::zeros(rows, cols).unwrap();
            let mut twice = Matrix::zeros(rows, cols).unwrap();

            negate(&mut once, &a);
            negate(&mut twice, &once);
            assert_eq!(bits(&twice), bits(&a), "{rows}x{cols}");
        }
    }

    #[test]
    fn abs_ignores_sign() {
        for (rows, cols) in SHAPES {
            let a = random(rows, cols, 0xb3d19c2f85e60a74);
            let mut negated = Matrix::zeros(rows, cols).unwrap();
            negate(&mut negated, &a);

            let mut abs_a = Matrix::zeros(rows, cols).unwrap();
            let mut abs_n = Matrix::zeros(rows, cols).unwrap();
            abs(&mut abs_a, &a);
            abs(&mut abs_n, &negated);
            assert_eq!(bits(&abs_a), bits(&abs_n), "{rows}x{cols}");
        }
    }

    #[test]
    fn kernels_ignore_shape() {
        // The same 12 elements as 3x4, 4x3, 2x6, and 1x12 produce the same
        // flat output.
        let data: Vec<f64> = (0..12).map(|i| (i as f64) - 5.5).collect();
        let mut reference: Option<Vec<u64>> = None;

        for (rows, cols) in [(3, 4), (4, 3), (2, 6), (1, 12)] {
            let a = Matrix::from_slice(&data, rows, cols).unwrap();
            let mut out = Matrix::zeros(rows, cols).unwrap();
            negate(&mut out, &a);

            let got = bits(&out);
            match &reference {
                Some(expected) => assert_eq!(&got, expected, "{rows}x{cols}"),
                None => reference = Some(got),
            }
        }
    }

    #[test]
    fn kernels_work_through_views() {
        // Operate on the last two rows of a 4x4 through a view.
        let parent = random(4, 4, 0x2f6e3a491d08cb57);
        let tail = parent.view(8, 2, 4).unwrap();

        let mut out = Matrix::zeros(2, 4).unwrap();
        negate(&mut out, &tail);

        let expected: Vec<f64> = parent.to_vec()[8..].iter().map(|x| -x).collect();
        assert_eq!(out.to_vec(), expected);
    }
}
