use criterion::{criterion_group, criterion_main, Criterion};
use rand::prelude::*;
use team_trsv::{
    batch,
    linalg::trsv::{self, TrsvAlgorithmKind, TrsvParams},
    Col, Diag, Mat, Parallelism, Side,
};

fn random_lower(rng: &mut StdRng, n: usize) -> Mat<f64> {
    Mat::from_fn(n, n, |i, j| {
        if i == j {
            rng.gen_range(1.0..2.0)
        } else if i > j {
            rng.gen_range(-1.0..1.0) / n as f64
        } else {
            0.0
        }
    })
}

pub fn single(c: &mut Criterion) {
    let rng = &mut StdRng::seed_from_u64(0);
    for n in [8, 32, 128, 512] {
        let a = random_lower(rng, n);
        let b0 = Col::from_fn(n, |_| rng.gen_range(-1.0..1.0));

        for (name, algorithm) in [
            ("unblocked", TrsvAlgorithmKind::Unblocked),
            ("blocked", TrsvAlgorithmKind::Blocked),
        ] {
            let params = TrsvParams {
                algorithm,
                block_size: None,
            };

            c.bench_function(&format!("trsv-serial-{name}-{n}"), |bencher| {
                let mut b = b0.clone();
                bencher.iter(|| {
                    b.as_mut().copy_from(b0.as_ref());
                    trsv::solve_in_place(
                        Side::Lower,
                        Diag::NonUnit,
                        1.0,
                        a.as_ref(),
                        b.as_mut(),
                        params,
                    );
                })
            });

            for team_size in [2, 4] {
                c.bench_function(&format!("trsv-team{team_size}-{name}-{n}"), |bencher| {
                    let mut b = b0.clone();
                    bencher.iter(|| {
                        b.as_mut().copy_from(b0.as_ref());
                        trsv::solve_in_place_with_team(
                            team_size,
                            Side::Lower,
                            Diag::NonUnit,
                            1.0,
                            a.as_ref(),
                            b.as_mut(),
                            params,
                        );
                    })
                });
            }
        }
    }
}

pub fn batched(c: &mut Criterion) {
    let rng = &mut StdRng::seed_from_u64(1);
    let count = 1024;
    for n in [4, 16, 32] {
        let a: Vec<Mat<f64>> = (0..count).map(|_| random_lower(rng, n)).collect();
        let b0: Vec<Col<f64>> = (0..count)
            .map(|_| Col::from_fn(n, |_| rng.gen_range(-1.0..1.0)))
            .collect();
        let a_views: Vec<_> = a.iter().map(|a| a.as_ref()).collect();

        for (name, parallelism) in [
            ("st", Parallelism::None),
            ("mt", Parallelism::Rayon(0)),
        ] {
            c.bench_function(&format!("trsv-batch-{name}-{n}"), |bencher| {
                let mut b = b0.clone();
                bencher.iter(|| {
                    for (b, b0) in b.iter_mut().zip(&b0) {
                        b.as_mut().copy_from(b0.as_ref());
                    }
                    let mut b_views: Vec<_> = b.iter_mut().map(|b| b.as_mut()).collect();
                    batch::solve_batch_in_place(
                        Side::Lower,
                        Diag::NonUnit,
                        1.0,
                        &a_views,
                        &mut b_views,
                        1,
                        parallelism,
                        Default::default(),
                    );
                })
            });
        }
    }
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = single, batched
);
criterion_main!(benches);
