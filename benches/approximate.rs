use criterion::{Criterion, criterion_group, criterion_main};
use rand::{Rng as _, SeedableRng as _};
use std::hint::black_box;
use tabvar::{approximate, solve};

fn approximate_fractions(c: &mut Criterion) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let values: Vec<f64> = (0..1000)
        .map(|_| {
            let q = rng.random_range(1..=1000) as f64;
            let p = rng.random_range(-1000..=1000) as f64;
            p / q
        })
        .collect();

    c.bench_function("approximate_fractions", |b| {
        b.iter(|| {
            for &x in &values {
                black_box(approximate(black_box(x)).unwrap());
            }
        })
    });
}

fn approximate_irrationals(c: &mut Criterion) {
    let mut rng = rand::rng();
    let values: Vec<f64> = (0..1000)
        .map(|_| rng.random_range(-100.0..100.0f64).sqrt())
        .filter(|x| x.is_finite())
        .collect();

    c.bench_function("approximate_irrationals", |b| {
        b.iter(|| {
            for &x in &values {
                black_box(approximate(black_box(x)).unwrap());
            }
        })
    });
}

fn solve_surds(c: &mut Criterion) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(11);
    let coeffs: Vec<[f64; 3]> = (0..1000)
        .map(|_| {
            [
                rng.random_range(1..=9) as f64,
                rng.random_range(-20..=20) as f64,
                rng.random_range(-20..=20) as f64,
            ]
        })
        .collect();

    c.bench_function("solve_surds", |b| {
        b.iter(|| {
            for &[qa, qb, qc] in &coeffs {
                black_box(solve(qa, qb, qc).unwrap());
            }
        })
    });
}

criterion_group!(
    benches,
    approximate_fractions,
    approximate_irrationals,
    solve_surds
);
criterion_main!(benches);
