#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// column oriented observations for the regression fits
pub mod data_table;
/// settings of the adaptive fits, from setters or from TOML
pub mod fit_config;
///____________________________________________________________________________________________________________________________
/// # Interpolation
/// piecewise constant (to the left or to the right), linear and shape preserving quadratic interpolation of knots
/// ```
/// use RustedFunctionAlgebra::approximation::interpolation::{create_interpolation, InterpolationMethod};
/// use RustedFunctionAlgebra::algebra::algebra_traits::Point;
/// let x = [0.0, 1.0, 2.0];
/// let y = [1.0, 3.0, 2.0];
/// let f = create_interpolation(InterpolationMethod::Linear, &x, &y, "t").unwrap();
/// let value = f.evaluate(&Point::from([("t".to_string(), 0.5)])).unwrap();
/// assert_eq!(value, 2.0);
/// ```
pub mod interpolation;
/// Schumaker shape preserving quadratic spline
pub mod schumaker;
///____________________________________________________________________________________________________________________________
/// # Regression
/// OLS on a monomial basis, Chebyshev approximation of a function, MARS splines and recursive partitioning
/// ```
/// use RustedFunctionAlgebra::approximation::data_table::DataTable;
/// use RustedFunctionAlgebra::approximation::fit_config::FitConfig;
/// use RustedFunctionAlgebra::approximation::ols::create_ols_approximation;
/// let x: Vec<f64> = (0..20).map(|i| i as f64 / 4.0).collect();
/// let y: Vec<f64> = x.iter().map(|x| 1.0 - 2.0 * x + 0.5 * x * x).collect();
/// let table = DataTable::from_columns([("x", x), ("y", y)]).unwrap();
/// let mut config = FitConfig::new();
/// config.set_degree(2);
/// let fit = create_ols_approximation(&table, "y", &["x".to_string()], &config, true).unwrap();
/// assert!((fit.coefficients[2] - 0.5).abs() < 1e-8);
/// ```
pub mod ols;
pub mod chebyshev;
/// coarse to fine search of split points shared by MARS and recursive partitioning
pub mod split_search;
pub mod mars;
pub mod recursive_partitioning;
mod approximation_tests;
