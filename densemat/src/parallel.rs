/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use crate::error::{MatResult, MatrixError};

/// A worker thread pool for scoping kernel calls.
///
/// The kernels fan their parallel regions out on the ambient rayon pool.
/// Running a kernel inside [`ThreadPool::install`] reroutes those regions to
/// this pool, which is how callers (and the determinism tests) control the
/// worker count:
///
/// ```
/// use densemat::{Matrix, parallel::create_thread_pool};
///
/// let pool = create_thread_pool(2).unwrap();
/// let a = Matrix::zeros(8, 8).unwrap();
/// let b = Matrix::zeros(8, 8).unwrap();
/// let mut sum = Matrix::zeros(8, 8).unwrap();
/// pool.install(|| densemat::add(&mut sum, &a, &b));
/// ```
pub struct ThreadPool(rayon::ThreadPool);

impl ThreadPool {
    /// Execute `op` with this pool as the ambient pool for parallel regions.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.0.install(op)
    }

    /// Return the number of worker threads in this pool.
    pub fn num_threads(&self) -> usize {
        self.0.current_num_threads()
    }
}

/// Creates a new thread pool with the specified number of threads.
/// If `num_threads` is 0, it defaults to the number of logical CPUs.
pub fn create_thread_pool(num_threads: usize) -> MatResult<ThreadPool> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|err| MatrixError::ThreadPool(err.to_string()))?;
    Ok(ThreadPool(pool))
}

///////////
// Tests //
///////////
