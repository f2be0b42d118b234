use super::{commit_panel, commit_pivot};
use crate::{
    linalg::{gemv::team_gemv, inner_trsm::InnerTrsm},
    mat,
    team::TeamMember,
    ComplexField, Diag, MatRef, Side, TeamColMut,
};
use dyn_stack::PodStack;

// backward substitution, one unknown per step:
//
//   b[p]   ← b[p] / A[p, p]
//   b[..p] ← b[..p] - A[..p, p] × b[p]
pub(super) unsafe fn unblocked<M: TeamMember, E: ComplexField>(
    member: &M,
    diag: Diag,
    a: MatRef<'_, E>,
    b: TeamColMut<'_, E>,
) {
    let m = a.nrows();
    let mut pending = None;

    for p in (0..m).rev() {
        member.team_barrier();
        commit_pivot(member, b, &mut pending);

        let mut pivot = b.read(p);
        if !diag.is_unit() {
            pivot = pivot / a.read_unchecked(p, p);
            pending = Some((p, pivot));
        }

        member.team_for(p, |i| {
            b.write(i, b.read(i) - a.read_unchecked(i, p) * pivot);
        });
    }

    member.team_barrier();
    commit_pivot(member, b, &mut pending);
}

// backward substitution, one panel per step, starting from the bottom. only the topmost panel
// can be narrower than `block_size`.
pub(super) unsafe fn blocked<M: TeamMember, E: ComplexField>(
    member: &M,
    block_size: usize,
    diag: Diag,
    a: MatRef<'_, E>,
    b: TeamColMut<'_, E>,
    stack: PodStack<'_>,
) {
    let m = a.nrows();
    let (local, _) = stack.make_raw::<E>(block_size);
    let trsm = InnerTrsm::new(Side::Upper, diag);
    let mut pending = None;

    let mut done = 0;
    while done < m {
        let pb = Ord::min(block_size, m - done);
        let p = m - done - pb;

        member.team_barrier();
        commit_panel(member, b, local, &mut pending);

        let panel = &mut local[..pb];
        for (i, x) in panel.iter_mut().enumerate() {
            *x = b.read(p + i);
        }
        trsm.solve_in_place_unchecked(
            a.submatrix(p, p, pb, pb),
            mat::from_column_major_slice_mut(panel, pb, 1),
        );

        team_gemv(
            member,
            -E::one(),
            a.submatrix(0, p, p, pb),
            panel,
            E::one(),
            b.subrows(0, p),
        );

        pending = Some((p, pb));
        done += pb;
    }

    member.team_barrier();
    commit_panel(member, b, local, &mut pending);
}
