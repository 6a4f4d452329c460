//___________________________________TESTS____________________________________
// fits on synthetic data: the constructors must recover the structure the data were built from
#[cfg(test)]
mod tests {
    use crate::algebra::algebra_errors::FunctionError;
    use crate::algebra::algebra_traits::{FunctionOps, Limits, MultivariateFunction, Point};
    use crate::approximation::chebyshev::create_chebyshev_approximation;
    use crate::approximation::data_table::DataTable;
    use crate::approximation::fit_config::FitConfig;
    use crate::approximation::interpolation::{InterpolationMethod, create_interpolation};
    use crate::approximation::mars::create_mars_spline;
    use crate::approximation::ols::create_ols_approximation;
    use crate::approximation::recursive_partitioning::create_recursive_partitioning;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn names(dims: &[&str]) -> Vec<String> {
        dims.iter().map(|dim| dim.to_string()).collect()
    }
    fn grid(count: usize, step: f64) -> Vec<f64> {
        (0..count).map(|i| i as f64 * step).collect()
    }

    #[test]
    fn test_ols_recovers_polynomial() {
        let mut rng = StdRng::seed_from_u64(3);
        let x: Vec<f64> = (0..40).map(|_| rng.random_range(-2.0..2.0)).collect();
        let z: Vec<f64> = (0..40).map(|_| rng.random_range(-1.0..3.0)).collect();
        // 1 + 2x - z + 0.5 x^2 + 3 x z
        let y: Vec<f64> = x
            .iter()
            .zip(z.iter())
            .map(|(x, z)| 1.0 + 2.0 * x - z + 0.5 * x * x + 3.0 * x * z)
            .collect();
        let table = DataTable::from_columns([("x", x), ("z", z), ("y", y)]).unwrap();
        let mut config = FitConfig::new();
        config.set_degree(2);
        let fit = create_ols_approximation(&table, "y", &names(&["x", "z"]), &config, true).unwrap();
        // basis order: 1, x, z, x^2, x z, z^2
        let expected = [1.0, 2.0, -1.0, 0.5, 3.0, 0.0];
        for (coefficient, value) in fit.coefficients.iter().zip(expected.iter()) {
            assert_relative_eq!(*coefficient, *value, epsilon = 1e-8);
        }
        let point = Point::from([("x".to_string(), 0.5), ("z".to_string(), 2.0)]);
        assert_relative_eq!(fit.function.evaluate(&point).unwrap(), 1.0 + 1.0 - 2.0 + 0.125 + 3.0, epsilon = 1e-8);
    }

    #[test]
    fn test_ols_needs_enough_rows() {
        let table = DataTable::from_columns([("x", vec![1.0, 2.0]), ("y", vec![1.0, 2.0])]).unwrap();
        let mut config = FitConfig::new();
        config.set_degree(2);
        let err = create_ols_approximation(&table, "y", &names(&["x"]), &config, true).unwrap_err();
        assert_eq!(err, FunctionError::InsufficientData { needed: 3, got: 2 });
    }

    #[test]
    fn test_mars_finds_kink() {
        let x = grid(101, 0.1);
        let z: Vec<f64> = x.iter().map(|v| (v * 7.3).sin()).collect();
        let y: Vec<f64> = x.iter().map(|v| 1.0 + 2.0 * (v - 3.0).max(0.0)).collect();
        let table = DataTable::from_columns([("x", x), ("z", z), ("y", y)]).unwrap();
        let mut config = FitConfig::new();
        config.set_max_splits(2).set_relative_tolerance(1e-3);
        let spline = create_mars_spline(&table, "y", &names(&["x", "z"]), &config).unwrap();
        let first = &spline.hinges[0];
        assert_eq!(first.dim, "x");
        assert!((first.knot - 3.0).abs() < 0.05, "knot at {}", first.knot);
        let f = MultivariateFunction::SumOfPiecewise(spline.function.clone());
        for (x, expected) in [(1.0, 1.0), (8.0, 11.0)] {
            let point = Point::from([("x".to_string(), x), ("z".to_string(), 0.3)]);
            assert_relative_eq!(f.evaluate(&point).unwrap(), expected, epsilon = 0.05);
        }
        assert_eq!(spline.coefficients.len(), spline.hinges.len() + 1);
    }

    #[test]
    fn test_recursive_partitioning_finds_step() {
        let x = grid(101, 0.1);
        let z: Vec<f64> = x.iter().map(|v| (v * 3.1).cos()).collect();
        let y: Vec<f64> = x.iter().map(|v| if *v < 4.95 { 1.0 } else { 3.0 }).collect();
        let table = DataTable::from_columns([("x", x), ("z", z), ("y", y)]).unwrap();
        let mut config = FitConfig::new();
        config.set_max_splits(3).set_relative_tolerance(1e-3);
        let partition = create_recursive_partitioning(&table, "y", &names(&["x", "z"]), &config).unwrap();
        assert_eq!(partition.regions.len(), 2);
        let knot = partition.regions[1]["x"].lower;
        assert!(knot > 4.9 && knot <= 5.0, "split at {}", knot);
        for (x, expected) in [(2.0, 1.0), (8.0, 3.0)] {
            let point = Point::from([("x".to_string(), x), ("z".to_string(), 0.0)]);
            assert_relative_eq!(partition.function.evaluate(&point).unwrap(), expected, epsilon = 1e-8);
        }
        assert!(partition.rss < 1e-12);
    }

    #[test]
    fn test_fit_of_noise_free_constant_fails() {
        let table = DataTable::from_columns([("x", grid(30, 1.0)), ("y", vec![2.0; 30])]).unwrap();
        let err = create_recursive_partitioning(&table, "y", &names(&["x"]), &FitConfig::default()).unwrap_err();
        assert!(matches!(err, FunctionError::NonConvergence(_)));
    }

    #[test]
    fn test_approximations_feed_the_algebra() {
        // a Chebyshev fit of e^x integrates like e^x
        let limits = Limits::from([("x".to_string(), (0.0, 1.0))]);
        let approximation =
            create_chebyshev_approximation(|point: &Point| point["x"].exp(), 12, 10, &limits).unwrap();
        let f = MultivariateFunction::Sum(approximation);
        assert_relative_eq!(
            f.integral_value(&limits).unwrap(),
            std::f64::consts::E - 1.0,
            epsilon = 1e-9
        );
        // an interpolation is differentiated piece by piece
        let spline = create_interpolation(InterpolationMethod::Linear, &[0.0, 1.0, 2.0], &[0.0, 2.0, 3.0], "x")
            .unwrap();
        let slope = MultivariateFunction::Piecewise(spline).derivative("x");
        assert_relative_eq!(slope.evaluate(&Point::from([("x".to_string(), 1.5)])).unwrap(), 1.0);
    }
}
