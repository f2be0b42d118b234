//! Scheduling of independent tasks and static partitioning of loops among workers.

use crate::Parallelism;
use core::ops::Range;

/// Number of threads a launch with the given parallelism should aim for.
///
/// `Rayon(0)` resolves to the size of the current rayon pool.
#[inline]
pub fn thread_count(parallelism: Parallelism) -> usize {
    match parallelism {
        Parallelism::None => 1,
        #[cfg(feature = "rayon")]
        Parallelism::Rayon(0) => rayon::current_num_threads(),
        #[cfg(feature = "rayon")]
        Parallelism::Rayon(n_threads) => n_threads,
    }
}

/// Calls `op` on every index in `0..n_tasks`, on the calling thread or spread over the rayon
/// pool depending on `parallelism`.
///
/// Tasks are handed out in contiguous groups of about `n_tasks / thread_count(parallelism)`, so
/// short tasks don't pay the scheduling cost one by one.
pub fn for_each_task(n_tasks: usize, parallelism: Parallelism, op: impl Send + Sync + Fn(usize)) {
    fn dispatch(n_tasks: usize, parallelism: Parallelism, op: &(dyn Send + Sync + Fn(usize))) {
        if n_tasks <= 1 || thread_count(parallelism) == 1 {
            (0..n_tasks).for_each(op);
            return;
        }

        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            let group = n_tasks / thread_count(parallelism);
            (0..n_tasks)
                .into_par_iter()
                .with_min_len(Ord::max(group, 1))
                .for_each(op);
        }
    }
    dispatch(n_tasks, parallelism, &op)
}

/// Indices of `0..n` owned by worker `rank` out of `size`.
///
/// Ranks get consecutive ranges in rank order. The first `n % size` ranks get one index more
/// than the others.
#[inline]
pub fn rank_range(n: usize, rank: usize, size: usize) -> Range<usize> {
    let base = n / size;
    let extra = n % size;
    let start = rank * base + Ord::min(rank, extra);
    let len = base + usize::from(rank < extra);
    start..start + len
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, get_global_parallelism};
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn rank_ranges_tile_the_loop() {
        for n in [0usize, 1, 5, 16, 17] {
            for size in 1..6 {
                let mut next = 0;
                for rank in 0..size {
                    let range = rank_range(n, rank, size);
                    assert!(range.start == next);
                    assert!(range.len() - n / size <= 1);
                    next = range.end;
                }
                assert!(next == n);
            }
        }
        assert!(rank_range(7, 2, 3) == (5..7));
    }

    #[test]
    fn every_task_runs_once() {
        for parallelism in [Parallelism::None, get_global_parallelism()] {
            let count = AtomicUsize::new(0);
            for_each_task(37, parallelism, |i| {
                count.fetch_add(i + 1, Ordering::Relaxed);
            });
            assert!(count.load(Ordering::Relaxed) == 37 * 38 / 2);
        }
    }
}
