//! Row-parallelism switch.
//!
//! Engine stages iterate scene rows through `into_par_iter()`. With the
//! default `parallel` feature that name comes from rayon; without it the
//! shim below resolves it to a plain `into_iter()`, and the rest of the
//! chain falls back to the standard `Iterator` machinery. Collected row
//! order is identical on both paths.

#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

/// Single-threaded stand-in for rayon's `IntoParallelIterator`.
#[cfg(not(feature = "parallel"))]
pub trait IntoParallelIterator {
    type Iter;
    type Item;

    fn into_par_iter(self) -> Self::Iter;
}

#[cfg(not(feature = "parallel"))]
impl<I: IntoIterator> IntoParallelIterator for I {
    type Iter = I::IntoIter;
    type Item = I::Item;

    fn into_par_iter(self) -> Self::Iter {
        self.into_iter()
    }
}
