//! Team-parallel elementwise operations on a shared column.
//!
//! Neither function synchronizes the team. A barrier is needed before any member reads an element
//! written by another member.

use crate::{team::TeamMember, ComplexField, SameMagnitude, TeamColMut};

/// Sets every element of `x` to `value`, each member writing its own chunk of rows.
///
/// # Safety
/// Every member of the team must call this function with the same `x`, and no element of `x`
/// may be accessed by any other means until the team synchronizes.
#[inline]
pub unsafe fn team_set<M: TeamMember, E: ComplexField>(member: &M, value: E, x: TeamColMut<'_, E>) {
    member.team_for(x.nrows(), |i| x.write(i, value));
}

/// Multiplies every element of `x` by `alpha`, each member updating its own chunk of rows.
///
/// # Safety
/// Same as [`team_set`].
#[inline]
pub unsafe fn team_scale<M: TeamMember, E: ComplexField, S: SameMagnitude<E>>(
    member: &M,
    alpha: S,
    x: TeamColMut<'_, E>,
) {
    member.team_for(x.nrows(), |i| x.write(i, alpha.scale(x.read(i))));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, c64, team::run_team, Col};

    #[test]
    fn set_and_scale_cover_all_rows() {
        let mut x = Col::from_fn(11, |i| i as f64);
        {
            let shared = x.as_mut().into_team();
            run_team(3, |member| unsafe {
                team_scale(member, -2.0, shared);
            });
        }
        assert!(x == Col::from_fn(11, |i| -2.0 * i as f64));

        let shared = x.as_mut().into_team();
        run_team(4, |member| unsafe { team_set(member, 0.0, shared) });
        assert!(x.as_slice().iter().all(|&v| v.to_bits() == 0));
    }

    #[test]
    fn real_factor_scales_complex_column() {
        let mut x = Col::from_fn(5, |i| c64::new(i as f64, 1.0));
        let shared = x.as_mut().into_team();
        run_team(2, |member| unsafe { team_scale(member, 0.5f64, shared) });
        assert!(x == Col::from_fn(5, |i| c64::new(0.5 * i as f64, 0.5)));
    }
}
