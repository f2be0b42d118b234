//! `team-trsv` solves dense triangular systems `A×x = alpha×b` in place, with the work of a single
//! solve shared by a team of cooperating workers.
//!
//! The crate contains:
//! - strided matrix and vector views ([`MatRef`], [`MatMut`], [`ColRef`], [`ColMut`], etc.),
//! - a team abstraction with barrier synchronization and rank-partitioned loops ([`team`]),
//! - the team triangular solve kernels, unblocked and blocked, for lower and upper matrices
//!   ([`linalg::trsv`]),
//! - the small collaborators they rely on: vector fill/scale, a team matrix-vector update, and a
//!   serial panel microkernel,
//! - a batched driver mapping many independent solves onto many teams ([`batch`]).
//!
//! # Example
//!
//! ```
//! use team_trsv::{linalg::trsv, mat, Col, Diag, Side};
//!
//! let a = mat![[2.0, 0.0, 0.0], [1.0, 3.0, 0.0], [4.0, 2.0, 5.0]];
//! let mut b = Col::from_fn(3, |i| [4.0f64, 5.0, 3.0][i]);
//!
//! trsv::solve_in_place_with_team(
//!     2,
//!     Side::Lower,
//!     Diag::NonUnit,
//!     1.0,
//!     a.as_ref(),
//!     b.as_mut(),
//!     Default::default(),
//! );
//!
//! assert!((b.read(0) - 2.0).abs() < 1e-12);
//! assert!((b.read(1) - 1.0).abs() < 1e-12);
//! assert!((b.read(2) + 1.4).abs() < 1e-12);
//! ```

#![warn(rust_2018_idioms)]
#![allow(clippy::too_many_arguments)]
#![allow(non_snake_case)]

use core::sync::atomic::AtomicUsize;
use equator::{assert, debug_assert};

pub mod batch;
pub mod col;
pub mod linalg;
pub mod mat;
pub mod scalar;
pub mod team;
pub mod utils;

pub use dyn_stack;
pub use reborrow;

pub use col::{Col, ColMut, ColRef, TeamColMut};
pub use mat::{Mat, MatMut, MatRef};
pub use scalar::{c32, c64, ComplexField, RealField, SameMagnitude};

/// Specifies whether the triangular lower or upper part of a matrix should be accessed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    /// Lower half should be accessed.
    Lower,
    /// Upper half should be accessed.
    Upper,
}

/// Specifies whether the diagonal of a triangular matrix is read, or implicitly equal to one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Diag {
    /// The diagonal is implicitly one and is never accessed.
    Unit,
    /// The diagonal is read from the matrix.
    NonUnit,
}

impl Diag {
    /// Returns `true` if the diagonal is implicitly one.
    #[inline]
    pub fn is_unit(self) -> bool {
        self == Diag::Unit
    }
}

/// Creates a [`Mat`] containing the arguments, given as a list of rows.
///
/// ```
/// use team_trsv::mat;
///
/// let matrix = mat![[1.0, 5.0], [2.0, 6.0], [3.0, 7.0f64]];
///
/// assert_eq!(matrix.read(0, 0), 1.0);
/// assert_eq!(matrix.read(1, 0), 2.0);
/// assert_eq!(matrix.read(2, 1), 7.0);
/// ```
#[macro_export]
macro_rules! mat {
    () => {
        {
            compile_error!("number of columns in the matrix is ambiguous");
        }
    };

    ($([$($v:expr),* $(,)?] ),* $(,)?) => {
        {
            let data = [$([$($v),*]),*];
            let nrows = data.len();
            let ncols = data[0].len();
            $crate::mat::Mat::from_fn(nrows, ncols, |i, j| data[i][j])
        }
    };
}

#[cfg(feature = "perf-warn")]
#[macro_export]
#[doc(hidden)]
macro_rules! __perf_warn {
    ($name: ident) => {{
        #[inline(always)]
        #[allow(non_snake_case)]
        fn $name() -> &'static ::core::sync::atomic::AtomicBool {
            static $name: ::core::sync::atomic::AtomicBool =
                ::core::sync::atomic::AtomicBool::new(false);
            &$name
        }
        ::core::matches!(
            $name().compare_exchange(
                false,
                true,
                ::core::sync::atomic::Ordering::Relaxed,
                ::core::sync::atomic::Ordering::Relaxed,
            ),
            Ok(_)
        )
    }};
}

/// Parallelism strategy used to run independent teams.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parallelism {
    /// No parallelism.
    ///
    /// Independent teams are executed one after the other. A team with more than one member
    /// still runs its members concurrently, since they synchronize through barriers.
    None,
    /// Rayon parallelism. Only available with the `rayon` feature.
    ///
    /// Independent teams are possibly executed in parallel on the current thread, as well as the
    /// currently active rayon thread pool.
    ///
    /// The contained value represents a hint about the number of threads an implementation should
    /// use, but there is no way to guarantee how many or which threads will be used.
    ///
    /// A value of `0` treated as equivalent to `rayon::current_num_threads()`.
    #[cfg(feature = "rayon")]
    Rayon(usize),
}

/// 0: Disable
/// 1: None
/// n >= 2: Rayon(n - 2)
///
/// default: Rayon(0)
static GLOBAL_PARALLELISM: AtomicUsize = {
    #[cfg(feature = "rayon")]
    {
        AtomicUsize::new(2)
    }
    #[cfg(not(feature = "rayon"))]
    {
        AtomicUsize::new(1)
    }
};

/// Causes functions that access global parallelism settings to panic.
pub fn disable_global_parallelism() {
    GLOBAL_PARALLELISM.store(0, core::sync::atomic::Ordering::Relaxed);
}

/// Sets the global parallelism settings.
pub fn set_global_parallelism(parallelism: Parallelism) {
    let value = match parallelism {
        Parallelism::None => 1,
        #[cfg(feature = "rayon")]
        Parallelism::Rayon(n) => n.saturating_add(2),
    };
    GLOBAL_PARALLELISM.store(value, core::sync::atomic::Ordering::Relaxed);
}

/// Gets the global parallelism settings.
///
/// # Panics
/// Panics if global parallelism is disabled.
#[track_caller]
pub fn get_global_parallelism() -> Parallelism {
    let value = GLOBAL_PARALLELISM.load(core::sync::atomic::Ordering::Relaxed);
    match value {
        0 => panic!("Global parallelism is disabled."),
        1 => Parallelism::None,
        #[cfg(feature = "rayon")]
        n => Parallelism::Rayon(n - 2),
        #[cfg(not(feature = "rayon"))]
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;

    #[test]
    fn global_parallelism_roundtrip() {
        let old = get_global_parallelism();

        set_global_parallelism(Parallelism::None);
        assert!(get_global_parallelism() == Parallelism::None);

        #[cfg(feature = "rayon")]
        {
            set_global_parallelism(Parallelism::Rayon(3));
            assert!(get_global_parallelism() == Parallelism::Rayon(3));
        }

        set_global_parallelism(old);
    }

    #[test]
    fn mat_macro_is_row_major_input() {
        let m = mat![[1.0, 2.0], [3.0, 4.0]];
        assert!(all(
            m.nrows() == 2,
            m.ncols() == 2,
            m.read(0, 1) == 2.0,
            m.read(1, 0) == 3.0,
        ));
    }
}
