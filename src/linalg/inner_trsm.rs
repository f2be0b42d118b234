//! Serial triangular solve on a small diagonal block, used as the panel microkernel of the blocked
//! team solve.
//!
//! The microkernel only reads its arguments and writes `rhs`, so every member of a team can run it
//! on a private copy of the panel's right-hand side.

use crate::{assert, debug_assert, ComplexField, Diag, MatMut, MatRef, Side};

/// Solves `panel × X = rhs` in place, where `panel` is a square triangular block.
///
/// # Example
/// ```
/// use team_trsv::{linalg::inner_trsm::InnerTrsm, mat, Diag, Side};
///
/// let panel = mat![[2.0, 0.0], [1.0, 4.0]];
/// let mut rhs = mat![[2.0], [9.0]];
///
/// InnerTrsm::new(Side::Lower, Diag::NonUnit).solve_in_place(panel.as_ref(), rhs.as_mut());
///
/// assert_eq!(rhs.read(0, 0), 1.0);
/// assert_eq!(rhs.read(1, 0), 2.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InnerTrsm {
    /// Which triangle of the panel is read.
    pub side: Side,
    /// Whether the diagonal of the panel is read, or implicitly one.
    pub diag: Diag,
}

impl InnerTrsm {
    /// Creates a microkernel for the given triangle and diagonal kind.
    #[inline]
    pub fn new(side: Side, diag: Diag) -> Self {
        Self { side, diag }
    }

    /// Solves `panel × X = rhs` in place.
    ///
    /// # Panics
    /// Panics if `panel` is not square, or if `rhs.nrows() != panel.nrows()`.
    #[track_caller]
    pub fn solve_in_place<E: ComplexField>(self, panel: MatRef<'_, E>, rhs: MatMut<'_, E>) {
        assert!(all(
            panel.nrows() == panel.ncols(),
            rhs.nrows() == panel.nrows(),
        ));
        unsafe { self.solve_in_place_unchecked(panel, rhs) }
    }

    /// Same as [`Self::solve_in_place`], with no checks on the dimensions.
    ///
    /// # Safety
    /// The behavior is undefined if `panel` is not square, or if `rhs.nrows() != panel.nrows()`.
    #[inline]
    pub unsafe fn solve_in_place_unchecked<E: ComplexField>(
        self,
        panel: MatRef<'_, E>,
        rhs: MatMut<'_, E>,
    ) {
        debug_assert!(all(
            panel.nrows() == panel.ncols(),
            rhs.nrows() == panel.nrows(),
        ));
        match (self.side, self.diag) {
            (Side::Lower, Diag::Unit) => lower_in_place::<E, true>(panel, rhs),
            (Side::Lower, Diag::NonUnit) => lower_in_place::<E, false>(panel, rhs),
            (Side::Upper, Diag::Unit) => upper_in_place::<E, true>(panel, rhs),
            (Side::Upper, Diag::NonUnit) => upper_in_place::<E, false>(panel, rhs),
        }
    }
}

#[inline(always)]
unsafe fn lower_in_place<E: ComplexField, const UNIT: bool>(tril: MatRef<'_, E>, rhs: MatMut<'_, E>) {
    let n = tril.nrows();
    let mut rhs = rhs;
    for k in 0..rhs.ncols() {
        for p in 0..n {
            let mut x = rhs.read_unchecked(p, k);
            if !UNIT {
                x = x / tril.read_unchecked(p, p);
                rhs.write_unchecked(p, k, x);
            }
            for i in p + 1..n {
                let value = rhs.read_unchecked(i, k) - tril.read_unchecked(i, p) * x;
                rhs.write_unchecked(i, k, value);
            }
        }
    }
}

#[inline(always)]
unsafe fn upper_in_place<E: ComplexField, const UNIT: bool>(triu: MatRef<'_, E>, rhs: MatMut<'_, E>) {
    let n = triu.nrows();
    let mut rhs = rhs;
    for k in 0..rhs.ncols() {
        for p in (0..n).rev() {
            let mut x = rhs.read_unchecked(p, k);
            if !UNIT {
                x = x / triu.read_unchecked(p, p);
                rhs.write_unchecked(p, k, x);
            }
            for i in 0..p {
                let value = rhs.read_unchecked(i, k) - triu.read_unchecked(i, p) * x;
                rhs.write_unchecked(i, k, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, mat, Mat};
    use assert_approx_eq::assert_approx_eq;

    fn triangular(n: usize, side: Side) -> Mat<f64> {
        Mat::from_fn(n, n, |i, j| {
            let inside = match side {
                Side::Lower => i >= j,
                Side::Upper => i <= j,
            };
            if i == j {
                2.0 + i as f64
            } else if inside {
                0.5 - 0.125 * (i + 2 * j) as f64
            } else {
                f64::NAN
            }
        })
    }

    fn product(a: &Mat<f64>, side: Side, diag: Diag, x: &Mat<f64>) -> Mat<f64> {
        let n = a.nrows();
        Mat::from_fn(n, x.ncols(), |i, k| {
            let mut acc = 0.0;
            for j in 0..n {
                let aij = if i == j {
                    match diag {
                        Diag::Unit => 1.0,
                        Diag::NonUnit => a.read(i, j),
                    }
                } else if (side == Side::Lower && i > j) || (side == Side::Upper && i < j) {
                    a.read(i, j)
                } else {
                    0.0
                };
                acc += aij * x.read(j, k);
            }
            acc
        })
    }

    #[test]
    fn all_variants_solve_their_panel() {
        for side in [Side::Lower, Side::Upper] {
            for diag in [Diag::Unit, Diag::NonUnit] {
                for n in 0..6 {
                    let mut a = triangular(n, side);
                    if diag == Diag::Unit {
                        // the diagonal must never be read
                        for i in 0..n {
                            a.write(i, i, f64::NAN);
                        }
                    }
                    let b = Mat::from_fn(n, 2, |i, k| 1.0 + i as f64 - 3.0 * k as f64);
                    let mut x = b.clone();
                    InnerTrsm::new(side, diag).solve_in_place(a.as_ref(), x.as_mut());

                    let ax = product(&a, side, diag, &x);
                    for k in 0..2 {
                        for i in 0..n {
                            assert_approx_eq!(ax.read(i, k), b.read(i, k), 1e-12);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn upper_panel() {
        let panel = mat![[2.0, 1.0], [f64::NAN, 4.0]];
        let mut rhs = mat![[5.0], [8.0]];
        InnerTrsm::new(Side::Upper, Diag::NonUnit).solve_in_place(panel.as_ref(), rhs.as_mut());
        assert_approx_eq!(rhs.read(1, 0), 2.0);
        assert_approx_eq!(rhs.read(0, 0), 1.5);
    }
}
