//! Cooperative execution: a league of teams, each made of members that synchronize through a
//! barrier and split loops by rank.
//!
//! A kernel written against [`TeamMember`] is called once by every member of a team with the
//! same arguments. Members agree on which iterations of a loop they own through
//! [`TeamMember::team_for`], and on the order of their shared writes through
//! [`TeamMember::team_barrier`].

use crate::{
    assert,
    utils::thread::{for_each_task, rank_range, thread_count},
    Parallelism,
};
use std::sync::Barrier;

/// Identity of one worker inside a team, and the team-level primitives it can use.
pub trait TeamMember {
    /// Index of the problem the team is working on.
    fn league_rank(&self) -> usize;
    /// Index of this member inside its team, in `0..self.team_size()`.
    fn team_rank(&self) -> usize;
    /// Number of members in the team.
    fn team_size(&self) -> usize;

    /// Blocks until every member of the team has called it.
    ///
    /// Writes made by any member before the barrier are visible to every member after it.
    fn team_barrier(&self);

    /// Calls `op` on the indices of `0..n` owned by this member.
    ///
    /// The range is split into `team_size` contiguous chunks, and the member at rank `r` gets the
    /// `r`-th one. There is no implicit barrier at the end.
    #[inline]
    fn team_for(&self, n: usize, op: impl FnMut(usize)) {
        rank_range(n, self.team_rank(), self.team_size()).for_each(op)
    }

    /// Returns `true` for the member elected to perform the team's shared writes.
    #[inline]
    fn is_leader(&self) -> bool {
        self.team_rank() == 0
    }
}

/// The only member of a team of one. Its barrier does nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct SerialMember {
    league_rank: usize,
}

impl SerialMember {
    /// Creates the member of a single-worker team working on problem `league_rank`.
    #[inline]
    pub fn new(league_rank: usize) -> Self {
        Self { league_rank }
    }
}

impl TeamMember for SerialMember {
    #[inline]
    fn league_rank(&self) -> usize {
        self.league_rank
    }

    #[inline]
    fn team_rank(&self) -> usize {
        0
    }

    #[inline]
    fn team_size(&self) -> usize {
        1
    }

    #[inline]
    fn team_barrier(&self) {}
}

/// A member of a team of threads.
///
/// Teams of one carry no barrier. Larger teams share a [`Barrier`] sized to the team.
#[derive(Copy, Clone, Debug)]
pub struct ThreadMember<'a> {
    barrier: Option<&'a Barrier>,
    league_rank: usize,
    team_rank: usize,
    team_size: usize,
}

impl TeamMember for ThreadMember<'_> {
    #[inline]
    fn league_rank(&self) -> usize {
        self.league_rank
    }

    #[inline]
    fn team_rank(&self) -> usize {
        self.team_rank
    }

    #[inline]
    fn team_size(&self) -> usize {
        self.team_size
    }

    #[inline]
    fn team_barrier(&self) {
        if let Some(barrier) = self.barrier {
            barrier.wait();
        }
    }
}

/// Shape of a launch: `league_size` independent problems, each handled by a team of
/// `team_size` members.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TeamPolicy {
    /// Number of independent problems.
    pub league_size: usize,
    /// Number of members cooperating on each problem.
    pub team_size: usize,
}

impl TeamPolicy {
    /// Creates a new policy.
    ///
    /// # Panics
    /// Panics if `team_size == 0`.
    #[inline]
    #[track_caller]
    pub fn new(league_size: usize, team_size: usize) -> Self {
        assert!(team_size > 0);
        Self {
            league_size,
            team_size,
        }
    }
}

/// Number of teams that run at the same time for the given policy and parallelism.
#[inline]
fn concurrent_teams(policy: TeamPolicy, parallelism: Parallelism) -> usize {
    let degree = thread_count(parallelism);
    Ord::max(1, degree / policy.team_size).min(policy.league_size)
}

/// Runs `op` once for every member of every team described by `policy`.
///
/// Teams of one are scheduled with `parallelism` through [`for_each_task`]. Members of a larger
/// team each get their own scoped thread, since they have to be running at the same time to get
/// through the barrier; `parallelism` then only decides how many such teams run side by side. A team works through
/// the league ranks `t, t + n_teams, t + 2 × n_teams, …`, where `t` is its index and `n_teams`
/// the number of concurrent teams.
///
/// # Panics
/// Panics if `policy.team_size == 0`.
#[track_caller]
pub fn parallel_for(
    policy: TeamPolicy,
    parallelism: Parallelism,
    op: impl Sync + Fn(&ThreadMember<'_>),
) {
    let TeamPolicy {
        league_size,
        team_size,
    } = policy;
    assert!(team_size > 0);

    if league_size == 0 {
        return;
    }

    if team_size == 1 {
        for_each_task(league_size, parallelism, |league_rank| {
            op(&ThreadMember {
                barrier: None,
                league_rank,
                team_rank: 0,
                team_size: 1,
            })
        });
        return;
    }

    let n_teams = concurrent_teams(policy, parallelism);
    log::debug!(
        target: "team_trsv",
        "launching {n_teams} concurrent team(s) of {team_size} threads over {league_size} problem(s)",
    );

    let barriers: Vec<Barrier> = (0..n_teams).map(|_| Barrier::new(team_size)).collect();
    let op = &op;
    std::thread::scope(|s| {
        for (team, barrier) in barriers.iter().enumerate() {
            for team_rank in 0..team_size {
                s.spawn(move || {
                    let mut league_rank = team;
                    while league_rank < league_size {
                        op(&ThreadMember {
                            barrier: Some(barrier),
                            league_rank,
                            team_rank,
                            team_size,
                        });
                        league_rank += n_teams;
                    }
                });
            }
        }
    });
}

/// Runs `op` on every member of a single team of `team_size` threads.
///
/// # Panics
/// Panics if `team_size == 0`.
#[track_caller]
pub fn run_team(team_size: usize, op: impl Sync + Fn(&ThreadMember<'_>)) {
    parallel_for(TeamPolicy::new(1, team_size), Parallelism::None, op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, get_global_parallelism};
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn serial_member_owns_whole_range() {
        let member = SerialMember::new(3);
        let mut seen = Vec::new();
        member.team_for(5, |i| seen.push(i));
        member.team_barrier();
        assert!(all(
            member.league_rank() == 3,
            member.is_leader(),
            seen == [0, 1, 2, 3, 4],
        ));
    }

    #[test]
    fn team_for_partitions_range() {
        let hits: Vec<AtomicUsize> = (0..23).map(|_| AtomicUsize::new(0)).collect();
        run_team(4, |member| {
            assert!(member.team_size() == 4);
            member.team_for(hits.len(), |i| {
                hits[i].fetch_add(1, Ordering::Relaxed);
            });
        });
        assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn barrier_orders_writes() {
        let slots: Vec<AtomicUsize> = (0..3).map(|_| AtomicUsize::new(0)).collect();
        let sums = Mutex::new(Vec::new());
        run_team(3, |member| {
            slots[member.team_rank()].store(member.team_rank() + 1, Ordering::Relaxed);
            member.team_barrier();
            let sum: usize = slots.iter().map(|s| s.load(Ordering::Relaxed)).sum();
            sums.lock().unwrap().push(sum);
        });
        assert!(sums.into_inner().unwrap() == [6, 6, 6]);
    }

    #[test]
    fn every_league_rank_runs_once_per_member() {
        for (team_size, parallelism) in [
            (1, Parallelism::None),
            (2, Parallelism::None),
            (3, get_global_parallelism()),
        ] {
            let league_size = 7;
            let hits: Vec<AtomicUsize> = (0..league_size).map(|_| AtomicUsize::new(0)).collect();
            parallel_for(TeamPolicy::new(league_size, team_size), parallelism, |member| {
                hits[member.league_rank()].fetch_add(1, Ordering::Relaxed);
            });
            assert!(hits
                .iter()
                .all(|h| h.load(Ordering::Relaxed) == team_size));
        }
    }

    #[test]
    fn empty_league_does_nothing() {
        let calls = AtomicUsize::new(0);
        parallel_for(TeamPolicy::new(0, 4), Parallelism::None, |_| {
            calls.fetch_add(1, Ordering::Relaxed);
        });
        assert!(calls.load(Ordering::Relaxed) == 0);
    }

    #[test]
    #[should_panic]
    fn zero_team_size_panics() {
        TeamPolicy::new(1, 0);
    }
}
