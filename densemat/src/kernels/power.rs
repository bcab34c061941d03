/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use tracing::trace;

use super::multiply;
use crate::{error::MatResult, matrix::Matrix};

/// Write the identity matrix into `result`.
pub(crate) fn identity(result: &mut Matrix) {
    for i in 0..result.rows() {
        for j in 0..result.cols() {
            let value = if i == j { 1.0 } else { 0.0 };
            // SAFETY: `i` and `j` iterate within the handle's shape.
            unsafe { result.set_unchecked(i, j, value) };
        }
    }
}

/// Store `mat` raised to the `exponent`-th power (by repeated matrix
/// multiplication) into `result`.
///
/// `mat` square and `result` the same shape are caller contracts checked by
/// debug assertions only.
///
/// `exponent == 0` writes the identity matrix regardless of `mat`'s contents,
/// including a singular or all-zero `mat`. Otherwise the result is computed by
/// exponentiation by squaring (O(log exponent) multiplications), with every
/// intermediate released by scope on every exit path.
///
/// # Errors
///
/// Returns [`MatrixError::AllocationFailure`](crate::MatrixError) if an
/// intermediate matrix cannot be allocated.
pub fn power(result: &mut Matrix, mat: &Matrix, exponent: u32) -> MatResult<()> {
    debug_assert_eq!(mat.rows(), mat.cols(), "power requires a square matrix");
    debug_assert_eq!(result.rows(), mat.rows(), "result has the wrong row count");
    debug_assert_eq!(result.cols(), mat.cols(), "result has the wrong column count");

    trace!(order = mat.rows(), exponent, "raising matrix to a power");
    power_impl(result, mat, exponent)
}

fn power_impl(result: &mut Matrix, mat: &Matrix, exponent: u32) -> MatResult<()> {
    if exponent == 0 {
        identity(result);
        return Ok(());
    }

    let order = mat.rows();
    let mut squared = Matrix::zeros(order, order)?;
    multiply(&mut squared, mat, mat)?;

    if exponent % 2 == 0 {
        power_impl(result, &squared, exponent / 2)
    } else {
        let mut halved = Matrix::zeros(order, order)?;
        power_impl(&mut halved, &squared, (exponent - 1) / 2)?;
        multiply(result, mat, &halved)
    }
}

///////////
// Tests //
///////////

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn random_square(order: usize, seed: u64) -> Matrix {
        let mut m = Matrix::zeros(order, order).unwrap();
        m.fill_random(seed, -0.5, 0.5);
        m
    }

    #[test]
    fn zero_exponent_yields_identity() {
        // Including for an all-zero (maximally singular) base.
        let zero = Matrix::zeros(4, 4).unwrap();
        let mut out = Matrix::zeros(4, 4).unwrap();
        power(&mut out, &zero, 0).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_eq!(out.get(i, j), expected, "({i}, {j})");
            }
        }

        let base = random_square(5, 0xa3c58f12d07b64e9);
        let mut out = Matrix::zeros(5, 5).unwrap();
        power(&mut out, &base, 0).unwrap();
        for i in 0..5 {
            for j in 0..5 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_eq!(out.get(i, j), expected, "({i}, {j})");
            }
        }
    }

    #[test]
    fn first_power_is_the_base() {
        for order in [1, 3, 6] {
            let base = random_square(order, 0x5be9d04c17f28a36);
            let mut out = Matrix::zeros(order, order).unwrap();
            power(&mut out, &base, 1).unwrap();
            assert_eq!(out.to_vec(), base.to_vec(), "order {order}");
        }
    }

    #[test]
    fn matches_repeated_multiplication() {
        let base = random_square(4, 0x09c7e2b8d5631fa4);

        // acc = base^p built one multiplication at a time.
        let mut acc = Matrix::zeros(4, 4).unwrap();
        identity(&mut acc);

        for p in 0..=6u32 {
            let mut out = Matrix::zeros(4, 4).unwrap();
            power(&mut out, &base, p).unwrap();
            for (g, e) in out.to_vec().iter().zip(acc.to_vec()) {
                assert_relative_eq!(*g, e, epsilon = 1e-9, max_relative = 1e-9);
            }

            let mut next = Matrix::zeros(4, 4).unwrap();
            multiply(&mut next, &acc, &base).unwrap();
            acc = next;
        }
    }

    #[test]
    fn exponents_add() {
        // power(A, m + n) == power(A, m) * power(A, n), across seeds and
        // exponent splits.
        let seeds = [0xd6b1f3a02c84975e_u64, 0x48a0cde92b7f1653, 0xfe23b8c4607d91a5];
        for seed in seeds {
            let base = random_square(3, seed);
            for (m, n) in [(0, 3), (1, 1), (2, 3), (4, 2), (5, 5)] {
                let mut lhs = Matrix::zeros(3, 3).unwrap();
                power(&mut lhs, &base, m + n).unwrap();

                let mut pm = Matrix::zeros(3, 3).unwrap();
                let mut pn = Matrix::zeros(3, 3).unwrap();
                power(&mut pm, &base, m).unwrap();
                power(&mut pn, &base, n).unwrap();

                let mut rhs = Matrix::zeros(3, 3).unwrap();
                multiply(&mut rhs, &pm, &pn).unwrap();

                for (g, e) in lhs.to_vec().iter().zip(rhs.to_vec()) {
                    assert_relative_eq!(*g, e, epsilon = 1e-9, max_relative = 1e-9);
                }
            }
        }
    }

    #[test]
    fn intermediates_are_released() {
        let base = random_square(3, 0x31d7a94e8cf065b2);
        let mut out = Matrix::zeros(3, 3).unwrap();
        power(&mut out, &base, 9).unwrap();

        // Every intermediate allocated during the recursion is gone; only the
        // two caller-held handles remain.
        assert_eq!(base.ref_count(), 1);
        assert_eq!(out.ref_count(), 1);
    }
}
