use RustedFunctionAlgebra::algebra::algebra_traits::{Limits, MultivariateFunction};
use RustedFunctionAlgebra::algebra::pe_function::PEFunction;
use RustedFunctionAlgebra::algebra::pe_unit::PEUnit;
use RustedFunctionAlgebra::approximation::data_table::DataTable;
use RustedFunctionAlgebra::approximation::fit_config::FitConfig;
use RustedFunctionAlgebra::approximation::mars::create_mars_spline;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn term(dim: &str, a: f64, b: f64, base: f64, d: u32) -> MultivariateFunction {
    MultivariateFunction::PE(PEFunction::from_units(a, [(dim, PEUnit::new(b, base, d))]))
}

fn bench_squared_integral(c: &mut Criterion) {
    let outer = &term("x", 4.0, 0.0, 0.0, 1) * &term("y", 1.0, 1.0, 0.0, 0);
    let inner = &(&term("x", 1.0, 0.0, 0.0, 2) - 8.0) + &term("y", 1.0, 1.0, 0.0, 0);
    let f = &outer * &inner;
    let limits = Limits::from([("x".to_string(), (2.0, 2.8)), ("y".to_string(), (2.0, 3.0))]);
    c.bench_function("square and integrate over a box", |b| {
        b.iter(|| black_box(&f).pow(2).integral_value(&limits))
    });
}

fn bench_mars(c: &mut Criterion) {
    let x: Vec<f64> = (0..200).map(|i| i as f64 / 20.0).collect();
    let y: Vec<f64> = x.iter().map(|v| (v - 3.0).max(0.0) - 0.5 * (6.0 - v).max(0.0)).collect();
    let table = DataTable::from_columns([("x", x), ("y", y)]).unwrap();
    let predictors = vec!["x".to_string()];
    let mut config = FitConfig::new();
    config.set_max_splits(3).set_relative_tolerance(1e-3);
    c.bench_function("MARS spline, 200 rows", |b| {
        b.iter(|| create_mars_spline(black_box(&table), "y", &predictors, &config))
    });
}

criterion_group!(benches, bench_squared_integral, bench_mars);
criterion_main!(benches);
