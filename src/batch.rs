//! Many independent triangular solves, one per team.
//!
//! Problem `k` of the batch is solved by one team as its league rank `k`. The matrices may have
//! different dimensions and layouts, for example views into a single strided buffer.

use crate::{
    assert,
    linalg::trsv::{
        select, team_trsv, workspace_req, Blocked, ExecutionContext, Selected, TrsvParams,
        Unblocked,
    },
    team::{parallel_for, TeamMember, TeamPolicy},
    ColMut, ComplexField, Diag, MatRef, Parallelism, SameMagnitude, Side, TeamColMut,
};
use dyn_stack::{GlobalPodBuffer, PodStack};
use reborrow::*;

/// Solves `A[k] × x[k] = alpha × b[k]` in place for every `k`, where `A[k]` is the `side` triangle
/// of `a[k]`.
///
/// Each problem is handled by a team of `team_size` members, and the algorithm is chosen per
/// problem from `params`, as in [`solve_in_place_with_team`](crate::linalg::trsv::solve_in_place_with_team).
/// `parallelism` decides how many teams run at the same time.
///
/// # Panics
/// Panics before any solve starts if any of the following conditions are violated:
/// * `team_size > 0`.
/// * `a.len() == b.len()`.
/// * Every `a[k]` is square, and `b[k].nrows() == a[k].nrows()`.
/// * `params.block_size != Some(0)`.
///
/// # Example
/// ```
/// use team_trsv::{batch, mat, Col, Diag, Parallelism, Side};
///
/// let a = [mat![[2.0, 0.0], [1.0, 1.0]], mat![[4.0, 0.0], [0.0, 8.0]]];
/// let mut b = [Col::from_fn(2, |_| 2.0), Col::from_fn(2, |_| 8.0)];
///
/// let a_views: Vec<_> = a.iter().map(|a| a.as_ref()).collect();
/// let mut b_views: Vec<_> = b.iter_mut().map(|b| b.as_mut()).collect();
/// batch::solve_batch_in_place(
///     Side::Lower,
///     Diag::NonUnit,
///     1.0,
///     &a_views,
///     &mut b_views,
///     2,
///     Parallelism::None,
///     Default::default(),
/// );
///
/// assert_eq!(b[0].read(0), 1.0);
/// assert_eq!(b[0].read(1), 1.0);
/// assert_eq!(b[1].read(1), 1.0);
/// ```
#[track_caller]
pub fn solve_batch_in_place<E: ComplexField, S: SameMagnitude<E>>(
    side: Side,
    diag: Diag,
    alpha: S,
    a: &[MatRef<'_, E>],
    b: &mut [ColMut<'_, E>],
    team_size: usize,
    parallelism: Parallelism,
    params: TrsvParams,
) {
    assert!(all(team_size > 0, a.len() == b.len()));
    for (a, b) in a.iter().zip(b.iter()) {
        assert!(all(a.nrows() == a.ncols(), b.nrows() == a.nrows()));
    }

    let context = ExecutionContext::for_team_size(team_size);
    let block_size = params
        .block_size
        .unwrap_or_else(|| context.default_block_size());
    assert!(block_size > 0);
    let req = workspace_req::<E>(Blocked { block_size });

    log::debug!(
        target: "team_trsv",
        "batched trsv: {} problem(s), side={side:?}, diag={diag:?}, team_size={team_size}, block_size={block_size}",
        a.len(),
    );

    let b: Vec<TeamColMut<'_, E>> = b.iter_mut().map(|b| b.rb_mut().into_team()).collect();
    let b = &*b;

    parallel_for(
        TeamPolicy::new(a.len(), team_size),
        parallelism,
        |member| {
            let k = member.league_rank();
            let (a, b) = (a[k], b[k]);
            match select(a.nrows(), context, params) {
                Selected::Unblocked => unsafe {
                    team_trsv(
                        member,
                        Unblocked,
                        side,
                        diag,
                        alpha,
                        a,
                        b,
                        PodStack::new(&mut []),
                    )
                },
                Selected::Blocked(block_size) => {
                    let mut mem = GlobalPodBuffer::new(req);
                    unsafe {
                        team_trsv(
                            member,
                            Blocked { block_size },
                            side,
                            diag,
                            alpha,
                            a,
                            b,
                            PodStack::new(&mut mem),
                        )
                    }
                }
            }
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, get_global_parallelism, linalg::trsv, mat, Col, Mat};
    use assert_approx_eq::assert_approx_eq;
    use rand::prelude::*;

    fn lower(rng: &mut StdRng, n: usize) -> Mat<f64> {
        Mat::from_fn(n, n, |i, j| {
            if i == j {
                rng.gen_range(1.0..2.0)
            } else if i > j {
                rng.gen_range(-0.5..0.5) / n as f64
            } else {
                f64::NAN
            }
        })
    }

    #[test]
    fn batch_matches_single_solves() {
        let rng = &mut StdRng::seed_from_u64(0);
        let sizes = [0, 1, 3, 5, 8, 13, 2, 9, 4, 6];
        let a: Vec<Mat<f64>> = sizes.iter().map(|&n| lower(rng, n)).collect();
        let b0: Vec<Col<f64>> = sizes
            .iter()
            .map(|&n| Col::from_fn(n, |_| rng.gen_range(-1.0..1.0)))
            .collect();

        let expected: Vec<Col<f64>> = a
            .iter()
            .zip(&b0)
            .map(|(a, b)| {
                let mut x = b.clone();
                trsv::solve_in_place(
                    Side::Lower,
                    Diag::NonUnit,
                    1.5,
                    a.as_ref(),
                    x.as_mut(),
                    Default::default(),
                );
                x
            })
            .collect();

        for (team_size, parallelism) in [
            (1, Parallelism::None),
            (1, get_global_parallelism()),
            (2, Parallelism::None),
            (3, get_global_parallelism()),
        ] {
            let mut b = b0.clone();
            let a_views: Vec<_> = a.iter().map(|a| a.as_ref()).collect();
            let mut b_views: Vec<_> = b.iter_mut().map(|b| b.as_mut()).collect();
            solve_batch_in_place(
                Side::Lower,
                Diag::NonUnit,
                1.5,
                &a_views,
                &mut b_views,
                team_size,
                parallelism,
                Default::default(),
            );
            drop(b_views);

            for (x, expected) in b.iter().zip(&expected) {
                for i in 0..x.nrows() {
                    assert_approx_eq!(x[i], expected[i], 1e-12);
                }
            }
        }
    }

    #[test]
    fn batch_in_one_strided_buffer() {
        // three 2×2 upper matrices, row-major, back to back
        let data = [
            1.0, 1.0, f64::NAN, 2.0, //
            2.0, 0.0, f64::NAN, 4.0, //
            1.0, -1.0, f64::NAN, 1.0,
        ];
        let a: Vec<_> = (0..3)
            .map(|k| crate::mat::from_slice_with_strides(&data[4 * k..], 2, 2, 2, 1))
            .collect();

        // right-hand sides interleaved: b[k][i] lives at rhs[k + 3 × i]
        let mut rhs = [3.0, 2.0, 0.0, 2.0, 4.0, 1.0];
        let mut b: Vec<_> = {
            let base = crate::col::from_slice_mut(&mut rhs);
            let ptr = base.as_ptr_mut();
            (0..3)
                .map(|k| unsafe { crate::col::from_raw_parts_mut(ptr.add(k), 2, 3) })
                .collect()
        };

        solve_batch_in_place(
            Side::Upper,
            Diag::NonUnit,
            1.0,
            &a,
            &mut b,
            2,
            Parallelism::None,
            Default::default(),
        );
        drop(b);

        assert!(rhs == [2.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn empty_batch() {
        let a: [MatRef<'_, f64>; 0] = [];
        let mut b: [ColMut<'_, f64>; 0] = [];
        solve_batch_in_place(
            Side::Lower,
            Diag::Unit,
            1.0,
            &a,
            &mut b,
            4,
            Parallelism::None,
            Default::default(),
        );
    }

    #[test]
    #[should_panic]
    fn mismatched_batch_lengths() {
        let a = [mat![[1.0]], mat![[2.0]]];
        let mut b = [Col::from_fn(1, |_| 1.0)];
        let a_views: Vec<_> = a.iter().map(|a| a.as_ref()).collect();
        let mut b_views: Vec<_> = b.iter_mut().map(|b| b.as_mut()).collect();
        solve_batch_in_place(
            Side::Lower,
            Diag::NonUnit,
            1.0,
            &a_views,
            &mut b_views,
            1,
            Parallelism::None,
            Default::default(),
        );
    }
}
