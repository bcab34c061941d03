/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::{cell::UnsafeCell, fmt, sync::Arc};

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::trace;

use crate::error::{MatResult, MatrixError};

/// The shared backing buffer of an owning matrix.
///
/// Elements are wrapped in `UnsafeCell` so that kernels can write through
/// shared handles: a matrix and its views alias the same storage, and every
/// kernel writes each output element from exactly one loop iteration.
pub(crate) struct Storage {
    cells: Box<[UnsafeCell<f64>]>,
}

// SAFETY: All access to the cells goes through raw pointers obtained from
// `base_ptr`. Kernels partition writes so that each element is written by at
// most one thread per parallel region, and callers must not pass overlapping
// regions as both an input and a result (a documented contract on every
// kernel). Under those contracts, concurrent access is race-free.
unsafe impl Send for Storage {}
// SAFETY: See the `Send` rationale above.
unsafe impl Sync for Storage {}

impl Storage {
    /// Allocate a zero-initialized buffer of `len` elements, failing instead
    /// of aborting if the backing memory cannot be obtained.
    fn zeroed(len: usize, rows: usize, cols: usize) -> MatResult<Self> {
        let mut cells: Vec<UnsafeCell<f64>> = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_| MatrixError::AllocationFailure { rows, cols })?;
        cells.resize_with(len, || UnsafeCell::new(0.0));

        Ok(Self {
            cells: cells.into_boxed_slice(),
        })
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    /// Return a mutable pointer to the first element of the buffer.
    fn base_ptr(&self) -> *mut f64 {
        UnsafeCell::raw_get(self.cells.as_ptr())
    }
}

/// A dense, row-major matrix of `f64` values, or a view into one.
///
/// A `Matrix` is a handle: it pairs shared ownership of a flat buffer with an
/// element offset and a shape. Element `(r, c)` lives at flat offset
/// `r * cols + c` past the handle's base.
///
/// # Ownership
///
/// [`Matrix::zeros`] creates an owning handle over a fresh buffer with a
/// reference count of 1. [`Matrix::view`] creates a non-owning handle that
/// aliases a sub-range of the same buffer and bumps the count. Dropping any
/// handle decrements the count; the buffer is freed exactly when the last
/// handle goes away, owner or view, in any drop order. A view of a view
/// references the same root storage, so release order cannot double-free.
///
/// # Shape
///
/// `rows` and `cols` are always positive and never change after creation.
pub struct Matrix {
    storage: Arc<Storage>,
    offset: usize,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Allocate a `rows x cols` matrix with every element set to `0.0`.
    ///
    /// # Errors
    ///
    /// * [`MatrixError::InvalidDimensions`] if either dimension is zero.
    /// * [`MatrixError::AllocationFailure`] if the backing buffer cannot be
    ///   obtained.
    pub fn zeros(rows: usize, cols: usize) -> MatResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(MatrixError::InvalidDimensions { rows, cols });
        }

        trace!(rows, cols, "allocating matrix");
        let storage = Storage::zeroed(rows * cols, rows, cols)?;

        Ok(Self {
            storage: Arc::new(storage),
            offset: 0,
            rows,
            cols,
        })
    }

    /// Construct a `rows x cols` matrix initialized from row-major `data`.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidDimensions`] if either dimension is zero
    /// and [`MatrixError::AllocationFailure`] if the buffer cannot be
    /// obtained.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != rows * cols`.
    pub fn from_slice(data: &[f64], rows: usize, cols: usize) -> MatResult<Self> {
        let mut mat = Self::zeros(rows, cols)?;
        assert_eq!(
            data.len(),
            rows * cols,
            "expected {}x{} matrix data to have length {}, instead got {}",
            rows,
            cols,
            rows * cols,
            data.len()
        );

        let ptr = mat.as_mut_ptr();
        for (i, &value) in data.iter().enumerate() {
            // SAFETY: `i < rows * cols`, the extent of the fresh buffer.
            unsafe { ptr.add(i).write(value) };
        }
        Ok(mat)
    }

    /// Create a view aliasing this matrix's buffer, with its base advanced
    /// `offset` elements past this handle's base, shaped `rows x cols`.
    ///
    /// The view shares ownership of the root storage (incrementing the
    /// reference count); the buffer stays alive until every handle over it is
    /// dropped.
    ///
    /// Choosing an `offset`/`rows`/`cols` combination that stays within this
    /// handle's buffer extent is a caller precondition. It is checked by a
    /// debug assertion only; element access through an out-of-range view is
    /// undefined behavior.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidDimensions`] if either dimension is
    /// zero.
    pub fn view(&self, offset: usize, rows: usize, cols: usize) -> MatResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(MatrixError::InvalidDimensions { rows, cols });
        }

        let base = self.offset + offset;
        debug_assert!(
            base + rows * cols <= self.storage.len(),
            "view of {}x{} at element offset {} overruns a buffer of {} elements",
            rows,
            cols,
            base,
            self.storage.len()
        );

        Ok(Self {
            storage: Arc::clone(&self.storage),
            offset: base,
            rows,
            cols,
        })
    }

    /// Return the number of rows in the matrix.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Return the number of columns in the matrix.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Return the total number of elements addressed by this handle.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Return the number of live handles (this one, the owner, and any
    /// sibling views) sharing this matrix's root storage.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.storage)
    }

    /// Return the element at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.rows()` or `col >= self.cols()`.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(
            row < self.rows,
            "row {row} is out of bounds (max: {})",
            self.rows
        );
        assert!(
            col < self.cols,
            "col {col} is out of bounds (max: {})",
            self.cols
        );

        // SAFETY: We have checked that `row` and `col` are in-bounds.
        unsafe { self.get_unchecked(row, col) }
    }

    /// Set the element at `(row, col)` to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.rows()` or `col >= self.cols()`.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        assert!(
            row < self.rows,
            "row {row} is out of bounds (max: {})",
            self.rows
        );
        assert!(
            col < self.cols,
            "col {col} is out of bounds (max: {})",
            self.cols
        );

        // SAFETY: We have checked that `row` and `col` are in-bounds.
        unsafe { self.set_unchecked(row, col, value) };
    }

    /// Return the element at `(row, col)` without boundschecking.
    ///
    /// # Safety
    ///
    /// The following conditions must hold to avoid undefined behavior:
    /// * `row < self.rows()`.
    /// * `col < self.cols()`.
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> f64 {
        debug_assert!(row < self.rows);
        debug_assert!(col < self.cols);

        // SAFETY: The offset is in-bounds per the caller's contract and the
        // construction-time extent of this handle.
        unsafe { self.as_ptr().add(row * self.cols + col).read() }
    }

    /// Set the element at `(row, col)` without boundschecking.
    ///
    /// # Safety
    ///
    /// The following conditions must hold to avoid undefined behavior:
    /// * `row < self.rows()`.
    /// * `col < self.cols()`.
    pub unsafe fn set_unchecked(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.rows);
        debug_assert!(col < self.cols);

        // SAFETY: The offset is in-bounds per the caller's contract and the
        // construction-time extent of this handle.
        unsafe { self.as_mut_ptr().add(row * self.cols + col).write(value) };
    }

    /// Fill the matrix with values uniformly distributed in `[low, high)`,
    /// in row-major order, from a generator seeded with `seed`.
    ///
    /// Output is deterministic for a fixed seed and a fixed `rand` version.
    ///
    /// # Panics
    ///
    /// Panics if `low >= high` or if the range is non-finite.
    pub fn fill_random(&mut self, seed: u64, low: f64, high: f64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let ptr = self.as_mut_ptr();
        for i in 0..self.len() {
            // SAFETY: `i < self.len()`, within this handle's extent.
            unsafe { ptr.add(i).write(rng.random_range(low..high)) };
        }
    }

    /// Copy the elements addressed by this handle into a `Vec` in row-major
    /// order.
    pub fn to_vec(&self) -> Vec<f64> {
        let ptr = self.as_ptr();
        // SAFETY: `i < self.len()`, within this handle's extent.
        (0..self.len()).map(|i| unsafe { ptr.add(i).read() }).collect()
    }

    /// Return a pointer to the base of this handle's data.
    ///
    /// The pointed-to range of `self.len()` elements is valid for reads for
    /// the lifetime of the handle.
    #[inline]
    pub(crate) fn as_ptr(&self) -> *const f64 {
        self.as_mut_ptr()
    }

    /// Return a mutable pointer to the base of this handle's data.
    ///
    /// Writes through this pointer must be disjoint across threads within a
    /// parallel region.
    #[inline]
    pub(crate) fn as_mut_ptr(&self) -> *mut f64 {
        debug_assert!(self.offset + self.len() <= self.storage.len());

        // SAFETY: `offset` stays within the storage extent: it is zero for
        // owners and checked (debug) at view creation.
        unsafe { self.storage.base_ptr().add(self.offset) }
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("data", &self.to_vec())
            .finish()
    }
}

///////////
// Tests //
///////////
