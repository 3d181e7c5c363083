//! Criterion benchmarks for the design-point searches.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::DVector;
use relia_models::LimitState;
use relia_optimiser::{DesignPointSearch, SearchSettings, SpaceMap};

fn bench_hlrf_linear(c: &mut Criterion) {
    let ls = LimitState::new(|x: &DVector<f64>| x[0] - x[1] - 3.0);
    let map = SpaceMap::standardised(
        &DVector::from_vec(vec![10.0, 5.0]),
        &DVector::from_vec(vec![2.0, 1.0]),
    )
    .unwrap();

    c.bench_function("hlrf_linear_2d", |b| {
        b.iter(|| {
            let search =
                DesignPointSearch::new(&ls, map.clone(), SearchSettings::default()).unwrap();
            black_box(search.hlrf().unwrap())
        })
    });
}

fn bench_ihlrf_nonlinear(c: &mut Criterion) {
    let ls = LimitState::new(|x: &DVector<f64>| x[0] * x[0] - x[1]);
    let map = SpaceMap::standardised(
        &DVector::from_vec(vec![2.0, 5.0]),
        &DVector::from_vec(vec![0.5, 1.0]),
    )
    .unwrap();

    c.bench_function("ihlrf_nonlinear_2d", |b| {
        b.iter(|| {
            let search =
                DesignPointSearch::new(&ls, map.clone(), SearchSettings::default()).unwrap();
            black_box(search.ihlrf().unwrap())
        })
    });
}

criterion_group!(benches, bench_hlrf_linear, bench_ihlrf_nonlinear);
criterion_main!(benches);
