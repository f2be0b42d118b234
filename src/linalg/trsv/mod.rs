//! Triangular solve of a single vector, `A × x = alpha × b`, in place, executed cooperatively by a
//! team.
//!
//! Every member of a team calls [`team_trsv`] with the same arguments. The members split the
//! independent part of each elimination step between themselves and meet at a barrier before the
//! next one. Two algorithms are provided:
//! - [`Unblocked`] eliminates one unknown per step, with one barrier per row.
//! - [`Blocked`] eliminates a panel of `block_size` unknowns per step. Each member solves the
//!   panel's diagonal block on a private copy, then the team applies the solved panel to the
//!   remaining rows with a matrix-vector update.
//!
//! Only one member, the leader, writes solved unknowns back to `b`. It does so after the barrier
//! that follows the step they were solved in, since the other members are still reading their
//! old values until that barrier.
//!
//! [`solve_in_place`] and [`solve_in_place_with_team`] wrap the team kernel for callers that
//! don't manage their own team.

use crate::{
    assert, debug_assert,
    linalg::vector::{team_scale, team_set},
    team::{run_team, SerialMember, TeamMember},
    ColMut, ComplexField, Diag, MatRef, SameMagnitude, Side, TeamColMut,
};
use dyn_stack::{GlobalPodBuffer, PodStack, SizeOverflow, StackReq};

mod lower;
mod upper;

mod seal {
    pub trait Seal {}
}

/// Algorithm used by the team triangular solve.
///
/// Implemented by [`Unblocked`] and [`Blocked`] only. The triangle is selected once per call, and
/// each implementation is monomorphized for the element type and team member type.
pub trait TrsvAlgorithm: seal::Seal + Copy + Send + Sync + core::fmt::Debug {
    /// Size and alignment of the workspace one team member needs.
    fn scratch_req<E: ComplexField>(self) -> Result<StackReq, SizeOverflow>;

    /// Solves `A × x = b` in place for a lower triangular `A`, with `b` already scaled.
    ///
    /// # Safety
    /// Same as [`team_trsv`].
    unsafe fn solve_lower<M: TeamMember, E: ComplexField>(
        self,
        member: &M,
        diag: Diag,
        a: MatRef<'_, E>,
        b: TeamColMut<'_, E>,
        stack: PodStack<'_>,
    );

    /// Solves `A × x = b` in place for an upper triangular `A`, with `b` already scaled.
    ///
    /// # Safety
    /// Same as [`team_trsv`].
    unsafe fn solve_upper<M: TeamMember, E: ComplexField>(
        self,
        member: &M,
        diag: Diag,
        a: MatRef<'_, E>,
        b: TeamColMut<'_, E>,
        stack: PodStack<'_>,
    );
}

/// Element by element substitution. Needs no workspace.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Unblocked;

/// Panel by panel substitution, with panels of `block_size` rows.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Blocked {
    /// Number of unknowns eliminated per step. Must be non-zero.
    pub block_size: usize,
}

impl Blocked {
    /// Creates the blocked algorithm with the given panel size.
    ///
    /// # Panics
    /// Panics if `block_size == 0`.
    #[inline]
    #[track_caller]
    pub fn new(block_size: usize) -> Self {
        assert!(block_size > 0);
        Self { block_size }
    }
}

impl seal::Seal for Unblocked {}
impl seal::Seal for Blocked {}

impl TrsvAlgorithm for Unblocked {
    #[inline]
    fn scratch_req<E: ComplexField>(self) -> Result<StackReq, SizeOverflow> {
        Ok(StackReq::empty())
    }

    #[inline]
    unsafe fn solve_lower<M: TeamMember, E: ComplexField>(
        self,
        member: &M,
        diag: Diag,
        a: MatRef<'_, E>,
        b: TeamColMut<'_, E>,
        _stack: PodStack<'_>,
    ) {
        lower::unblocked(member, diag, a, b)
    }

    #[inline]
    unsafe fn solve_upper<M: TeamMember, E: ComplexField>(
        self,
        member: &M,
        diag: Diag,
        a: MatRef<'_, E>,
        b: TeamColMut<'_, E>,
        _stack: PodStack<'_>,
    ) {
        upper::unblocked(member, diag, a, b)
    }
}

impl TrsvAlgorithm for Blocked {
    #[inline]
    fn scratch_req<E: ComplexField>(self) -> Result<StackReq, SizeOverflow> {
        StackReq::try_new::<E>(self.block_size)
    }

    #[inline]
    unsafe fn solve_lower<M: TeamMember, E: ComplexField>(
        self,
        member: &M,
        diag: Diag,
        a: MatRef<'_, E>,
        b: TeamColMut<'_, E>,
        stack: PodStack<'_>,
    ) {
        lower::blocked(member, self.block_size, diag, a, b, stack)
    }

    #[inline]
    unsafe fn solve_upper<M: TeamMember, E: ComplexField>(
        self,
        member: &M,
        diag: Diag,
        a: MatRef<'_, E>,
        b: TeamColMut<'_, E>,
        stack: PodStack<'_>,
    ) {
        upper::blocked(member, self.block_size, diag, a, b, stack)
    }
}

/// Where a solve runs, which decides its default panel size.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// A team of one, on the calling thread.
    Serial,
    /// A team of several threads.
    Threads,
}

impl ExecutionContext {
    /// Returns the context of a team with `team_size` members.
    #[inline]
    pub fn for_team_size(team_size: usize) -> Self {
        if team_size > 1 {
            Self::Threads
        } else {
            Self::Serial
        }
    }

    /// Panel size of the blocked algorithm in this context.
    ///
    /// Every member of a team solves the panel's diagonal block on its own, so multi-member teams
    /// get the narrower panel.
    #[inline]
    pub fn default_block_size(self) -> usize {
        match self {
            Self::Serial => 4,
            Self::Threads => 2,
        }
    }
}

/// Algorithm selection for [`solve_in_place`] and [`solve_in_place_with_team`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TrsvAlgorithmKind {
    /// Unblocked when the whole matrix fits in one panel, blocked otherwise.
    #[default]
    Auto,
    /// Always use [`Unblocked`].
    Unblocked,
    /// Always use [`Blocked`].
    Blocked,
}

/// Tuning parameters for [`solve_in_place`] and [`solve_in_place_with_team`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TrsvParams {
    /// Algorithm selection.
    pub algorithm: TrsvAlgorithmKind,
    /// Panel size of the blocked algorithm. `None` picks
    /// [`ExecutionContext::default_block_size`] for the team.
    pub block_size: Option<usize>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Selected {
    Unblocked,
    Blocked(usize),
}

#[track_caller]
pub(crate) fn select(m: usize, context: ExecutionContext, params: TrsvParams) -> Selected {
    let block_size = params
        .block_size
        .unwrap_or_else(|| context.default_block_size());
    assert!(block_size > 0);

    match params.algorithm {
        TrsvAlgorithmKind::Unblocked => Selected::Unblocked,
        TrsvAlgorithmKind::Blocked => Selected::Blocked(block_size),
        TrsvAlgorithmKind::Auto => {
            if m <= block_size {
                Selected::Unblocked
            } else {
                Selected::Blocked(block_size)
            }
        }
    }
}

/// Computes the size and alignment of the workspace one team member needs for [`team_trsv`].
#[inline]
pub fn team_trsv_req<E: ComplexField>(
    algo: impl TrsvAlgorithm,
) -> Result<StackReq, SizeOverflow> {
    algo.scratch_req::<E>()
}

#[inline(always)]
unsafe fn commit_pivot<M: TeamMember, E: ComplexField>(
    member: &M,
    b: TeamColMut<'_, E>,
    pending: &mut Option<(usize, E)>,
) {
    if let Some((p, value)) = pending.take() {
        if member.is_leader() {
            b.write(p, value);
        }
    }
}

#[inline(always)]
unsafe fn commit_panel<M: TeamMember, E: ComplexField>(
    member: &M,
    b: TeamColMut<'_, E>,
    local: &[E],
    pending: &mut Option<(usize, usize)>,
) {
    if let Some((p, pb)) = pending.take() {
        if member.is_leader() {
            for (i, &value) in local[..pb].iter().enumerate() {
                b.write(p + i, value);
            }
        }
    }
}

/// Solves `A × x = alpha × b` in place, where `A` is the `side` triangle of `a`, with every
/// member of the team cooperating on the solve.
///
/// The other triangle of `a` is never read, and neither is its diagonal when `diag` is
/// [`Diag::Unit`]. When `alpha` is zero, `b` is set to zero and `a` is not read at all. A zero on
/// the diagonal of a non-unit solve is not detected, and produces infinities or NaNs.
///
/// The team is synchronized before returning, so every member observes the solution.
///
/// # Safety
/// The behavior is undefined if any of the following conditions are violated:
/// * `a` is square, and `b.nrows() == a.nrows()`.
/// * The `block_size` of a [`Blocked`] algorithm is non-zero, and `stack` can hold
///   [`team_trsv_req`].
/// * Every member of the team calls this function with the same arguments, except for `stack`.
/// * No element of `b` is accessed by any other means while the team is running the solve.
#[track_caller]
pub unsafe fn team_trsv<M: TeamMember, E: ComplexField, S: SameMagnitude<E>, A: TrsvAlgorithm>(
    member: &M,
    algo: A,
    side: Side,
    diag: Diag,
    alpha: S,
    a: MatRef<'_, E>,
    b: TeamColMut<'_, E>,
    stack: PodStack<'_>,
) {
    debug_assert!(all(a.nrows() == a.ncols(), b.nrows() == a.nrows()));

    if alpha.is_zero() {
        team_set(member, E::zero(), b);
    } else {
        if !alpha.is_one() {
            team_scale(member, alpha, b);
        }
        if a.nrows() > 0 {
            match side {
                Side::Lower => algo.solve_lower(member, diag, a, b, stack),
                Side::Upper => algo.solve_upper(member, diag, a, b, stack),
            }
        }
    }

    member.team_barrier();
}

#[track_caller]
fn check_dimensions<E: ComplexField>(a: MatRef<'_, E>, b: &ColMut<'_, E>) {
    assert!(all(a.nrows() == a.ncols(), b.nrows() == a.nrows()));
}

#[track_caller]
pub(crate) fn workspace_req<E: ComplexField>(algo: impl TrsvAlgorithm) -> StackReq {
    match team_trsv_req::<E>(algo) {
        Ok(req) => req,
        Err(SizeOverflow) => panic!("team triangular solve workspace size overflows usize"),
    }
}

#[cfg_attr(not(feature = "perf-warn"), allow(unused_variables))]
fn warn_layout<E: ComplexField>(team_size: usize, a: MatRef<'_, E>, b: &ColMut<'_, E>) {
    #[cfg(feature = "perf-warn")]
    if b.row_stride().unsigned_abs() != 1 && a.nrows() > 1 && crate::__perf_warn!(TRSV_WARN) {
        log::warn!(target: "faer_perf", "Team triangular solve prefers a contiguous right-hand side. Found a strided vector.");
    }
    #[cfg(feature = "perf-warn")]
    if team_size > a.nrows() && crate::__perf_warn!(TEAM_WARN) {
        log::warn!(target: "faer_perf", "Team triangular solve launched with more team members than unknowns.");
    }
}

/// Solves `A × x = alpha × b` in place on the calling thread, where `A` is the `side` triangle of
/// `a`.
///
/// See [`team_trsv`] for what is read from `a`.
///
/// # Panics
/// Panics if `a` is not square, if `b.nrows() != a.nrows()`, or if `params.block_size` is
/// `Some(0)`.
///
/// # Example
/// ```
/// use team_trsv::{linalg::trsv, mat, Col, Diag, Side};
///
/// let a = mat![[1.0, 2.0], [0.0, 4.0]];
/// let mut b = Col::from_fn(2, |i| [5.0, 4.0][i]);
///
/// trsv::solve_in_place(Side::Upper, Diag::NonUnit, 2.0, a.as_ref(), b.as_mut(), Default::default());
///
/// assert_eq!(b.read(1), 2.0);
/// assert_eq!(b.read(0), 6.0);
/// ```
#[track_caller]
pub fn solve_in_place<E: ComplexField, S: SameMagnitude<E>>(
    side: Side,
    diag: Diag,
    alpha: S,
    a: MatRef<'_, E>,
    b: ColMut<'_, E>,
    params: TrsvParams,
) {
    check_dimensions(a, &b);
    warn_layout(1, a, &b);

    let m = a.nrows();
    let selected = select(m, ExecutionContext::Serial, params);
    log::debug!(
        target: "team_trsv",
        "serial trsv: m={m}, side={side:?}, diag={diag:?}, algorithm={selected:?}",
    );

    let member = SerialMember::new(0);
    let b = b.into_team();
    match selected {
        Selected::Unblocked => unsafe {
            team_trsv(
                &member,
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
            let algo = Blocked { block_size };
            let mut mem = GlobalPodBuffer::new(workspace_req::<E>(algo));
            unsafe {
                team_trsv(
                    &member,
                    algo,
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
}

/// Solves `A × x = alpha × b` in place with a team of `team_size` threads, where `A` is the
/// `side` triangle of `a`.
///
/// See [`team_trsv`] for what is read from `a`.
///
/// # Panics
/// Panics if `team_size == 0`, if `a` is not square, if `b.nrows() != a.nrows()`, or if
/// `params.block_size` is `Some(0)`.
#[track_caller]
pub fn solve_in_place_with_team<E: ComplexField, S: SameMagnitude<E>>(
    team_size: usize,
    side: Side,
    diag: Diag,
    alpha: S,
    a: MatRef<'_, E>,
    b: ColMut<'_, E>,
    params: TrsvParams,
) {
    assert!(team_size > 0);
    check_dimensions(a, &b);
    warn_layout(team_size, a, &b);

    let m = a.nrows();
    let selected = select(m, ExecutionContext::for_team_size(team_size), params);
    log::debug!(
        target: "team_trsv",
        "team trsv: m={m}, side={side:?}, diag={diag:?}, algorithm={selected:?}, team_size={team_size}",
    );

    let b = b.into_team();
    match selected {
        Selected::Unblocked => launch(team_size, Unblocked, side, diag, alpha, a, b),
        Selected::Blocked(block_size) => {
            launch(team_size, Blocked { block_size }, side, diag, alpha, a, b)
        }
    }
}

#[track_caller]
fn launch<E: ComplexField, S: SameMagnitude<E>, A: TrsvAlgorithm>(
    team_size: usize,
    algo: A,
    side: Side,
    diag: Diag,
    alpha: S,
    a: MatRef<'_, E>,
    b: TeamColMut<'_, E>,
) {
    let req = workspace_req::<E>(algo);
    run_team(team_size, |member| {
        let mut mem = GlobalPodBuffer::new(req);
        unsafe {
            team_trsv(
                member,
                algo,
                side,
                diag,
                alpha,
                a,
                b,
                PodStack::new(&mut mem),
            )
        }
    });
}
