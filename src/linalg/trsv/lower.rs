use super::{commit_panel, commit_pivot};
use crate::{
    linalg::{gemv::team_gemv, inner_trsm::InnerTrsm},
    mat,
    team::TeamMember,
    ComplexField, Diag, MatRef, Side, TeamColMut,
};
use dyn_stack::PodStack;

// forward substitution, one unknown per step:
//
//   b[p]     ← b[p] / A[p, p]
//   b[p+1..] ← b[p+1..] - A[p+1.., p] × b[p]
//
// every member computes the pivot, the leader stores it at the start of the next step.
pub(super) unsafe fn unblocked<M: TeamMember, E: ComplexField>(
    member: &M,
    diag: Diag,
    a: MatRef<'_, E>,
    b: TeamColMut<'_, E>,
) {
    let m = a.nrows();
    let mut pending = None;

    for p in 0..m {
        member.team_barrier();
        commit_pivot(member, b, &mut pending);

        let mut pivot = b.read(p);
        if !diag.is_unit() {
            pivot = pivot / a.read_unchecked(p, p);
            pending = Some((p, pivot));
        }

        let below = p + 1;
        member.team_for(m - below, |i| {
            let i = below + i;
            b.write(i, b.read(i) - a.read_unchecked(i, p) * pivot);
        });
    }

    member.team_barrier();
    commit_pivot(member, b, &mut pending);
}

// forward substitution, one panel per step:
//
//   b[p..p+pb]    ← A[p..p+pb, p..p+pb]⁻¹ × b[p..p+pb]       (replicated on every member)
//   b[p+pb..]     ← b[p+pb..] - A[p+pb.., p..p+pb] × b[p..p+pb]  (rows split across the team)
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
    let trsm = InnerTrsm::new(Side::Lower, diag);
    let mut pending = None;

    let mut p = 0;
    while p < m {
        let pb = Ord::min(block_size, m - p);

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

        let rest = m - p - pb;
        team_gemv(
            member,
            -E::one(),
            a.submatrix(p + pb, p, rest, pb),
            panel,
            E::one(),
            b.subrows(p + pb, rest),
        );

        pending = Some((p, pb));
        p += pb;
    }

    member.team_barrier();
    commit_panel(member, b, local, &mut pending);
}
