//! Matrix-vector products `y ← alpha × A × x + beta × y`.

use crate::{assert, debug_assert, team::TeamMember, ColMut, ColRef, ComplexField, MatRef, TeamColMut};

#[inline(always)]
unsafe fn dot_row<E: ComplexField>(a: MatRef<'_, E>, i: usize, x: impl Fn(usize) -> E) -> E {
    let mut acc = E::zero();
    for j in 0..a.ncols() {
        acc = acc + a.read_unchecked(i, j) * x(j);
    }
    acc
}

/// Computes `y ← alpha × A × x + beta × y`, with the rows of `A` split across the team.
///
/// Each member computes the rows it owns as sequential dot products. When `beta` is zero, `y` is
/// overwritten without being read. The team is not synchronized at the end.
///
/// # Safety
/// The behavior is undefined if any of the following conditions are violated:
/// * `a.nrows() == y.nrows()` and `a.ncols() == x.len()`.
/// * Every member of the team calls this function with views over the same `A` and `y`, and
///   values of `x` that are equal.
/// * No element of `y` is accessed by any other means until the team synchronizes.
#[track_caller]
pub unsafe fn team_gemv<M: TeamMember, E: ComplexField>(
    member: &M,
    alpha: E,
    a: MatRef<'_, E>,
    x: &[E],
    beta: E,
    y: TeamColMut<'_, E>,
) {
    debug_assert!(all(a.nrows() == y.nrows(), a.ncols() == x.len()));

    let beta_is_zero = beta == E::zero();
    member.team_for(a.nrows(), |i| {
        let ax = alpha * dot_row(a, i, |j| *x.get_unchecked(j));
        let value = if beta_is_zero {
            ax
        } else {
            beta * y.read(i) + ax
        };
        y.write(i, value);
    });
}

/// Computes `y ← alpha × A × x + beta × y` on the calling thread.
///
/// When `beta` is zero, `y` is overwritten without being read.
///
/// # Panics
/// Panics if `a.nrows() != y.nrows()` or `a.ncols() != x.nrows()`.
#[track_caller]
pub fn gemv<E: ComplexField>(alpha: E, a: MatRef<'_, E>, x: ColRef<'_, E>, beta: E, y: ColMut<'_, E>) {
    assert!(all(a.nrows() == y.nrows(), a.ncols() == x.nrows()));

    let mut y = y;
    let beta_is_zero = beta == E::zero();
    for i in 0..a.nrows() {
        let ax = alpha * unsafe { dot_row(a, i, |j| x.read_unchecked(j)) };
        let value = if beta_is_zero {
            ax
        } else {
            beta * y.read(i) + ax
        };
        unsafe { y.write_unchecked(i, value) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, mat, team::run_team, Col};

    #[test]
    fn serial_gemv() {
        let a = mat![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let x = Col::from_fn(2, |i| [1.0, -1.0][i]);
        let mut y = Col::from_fn(3, |_| 10.0);

        gemv(2.0, a.as_ref(), x.as_ref(), 1.0, y.as_mut());
        assert!(y == Col::from_fn(3, |i| [8.0, 8.0, 8.0][i]));

        y.write(0, f64::NAN);
        gemv(1.0, a.as_ref(), x.as_ref(), 0.0, y.as_mut());
        assert!(y == Col::from_fn(3, |_| -1.0));
    }

    #[test]
    fn team_gemv_matches_serial() {
        let a = crate::Mat::from_fn(13, 4, |i, j| (i * 4 + j) as f64 * 0.25 - 3.0);
        let x = [0.5, -1.0, 2.0, 0.25];

        let mut expected = Col::from_fn(13, |i| i as f64);
        gemv(
            -1.0,
            a.as_ref(),
            crate::col::from_slice(&x),
            1.0,
            expected.as_mut(),
        );

        for team_size in 1..5 {
            let mut y = Col::from_fn(13, |i| i as f64);
            let shared = y.as_mut().into_team();
            run_team(team_size, |member| unsafe {
                team_gemv(member, -1.0, a.as_ref(), &x, 1.0, shared);
            });
            assert!(y == expected);
        }
    }
}
