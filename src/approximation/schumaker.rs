//! Schumaker shape preserving quadratic spline, in the form given by Judd (1998).
//!
//! Each knot interval is covered by one quadratic when the average of the end slopes equals the
//! secant slope, otherwise by two quadratics joined at an interior knot `xi` chosen so that the
//! spline keeps the monotonicity and convexity of the data.
use crate::Utils::date_conversions::DateConverter;
use crate::algebra::algebra_errors::{FunctionError, Result};
use crate::algebra::piecewise_function::{Interval, PiecewiseFunction};
use crate::algebra::sum_of_functions::SumOfFunctions;
use crate::approximation::interpolation::{check_knots, polynomial_around};
use chrono::NaiveDate;
use log::debug;

/// Slopes at the knots: weighted average of the neighbouring secants inside, zero at
/// local extrema, extrapolated at the ends without contradicting the end secant.
/// Every slope is limited to twice the adjacent secants, which keeps each interval monotone
/// when the data are.
pub fn estimate_gradients(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let secants: Vec<f64> = (0..n - 1)
        .map(|i| (y[i + 1] - y[i]) / (x[i + 1] - x[i]))
        .collect();
    if n == 2 {
        return vec![secants[0], secants[0]];
    }
    let lengths: Vec<f64> = (0..n - 1)
        .map(|i| (x[i + 1] - x[i]).hypot(y[i + 1] - y[i]))
        .collect();
    let mut slopes = vec![0.0; n];
    for i in 1..n - 1 {
        if secants[i - 1] * secants[i] > 0.0 {
            let average = (lengths[i - 1] * secants[i - 1] + lengths[i] * secants[i])
                / (lengths[i - 1] + lengths[i]);
            let bound = 2.0 * secants[i - 1].abs().min(secants[i].abs());
            slopes[i] = average.signum() * average.abs().min(bound);
        }
    }
    slopes[0] = clamp_to_secant((3.0 * secants[0] - slopes[1]) / 2.0, secants[0]);
    slopes[n - 1] = clamp_to_secant(
        (3.0 * secants[n - 2] - slopes[n - 2]) / 2.0,
        secants[n - 2],
    );
    slopes
}

fn clamp_to_secant(slope: f64, secant: f64) -> f64 {
    if slope * secant < 0.0 {
        0.0
    } else {
        slope.signum() * slope.abs().min(2.0 * secant.abs())
    }
}

/// Quadratic pieces on `[x1, x2]` with end values `z1`, `z2` and end slopes `s1`, `s2`.
fn interval_pieces(
    (x1, x2): (f64, f64),
    (z1, z2): (f64, f64),
    (s1, s2): (f64, f64),
    last: bool,
    dim: &str,
) -> Vec<(Interval, SumOfFunctions)> {
    let h = x2 - x1;
    let secant = (z2 - z1) / h;
    let close = |lower: f64, upper: f64| {
        if last {
            Interval::closed(lower, upper)
        } else {
            Interval::closed_open(lower, upper)
        }
    };
    if ((s1 + s2) / 2.0 - secant).abs() <= 1e-12 * secant.abs().max(1.0) {
        let quadratic = polynomial_around(&[z1, s1, (s2 - s1) / (2.0 * h)], x1, dim);
        return vec![(close(x1, x2), quadratic)];
    }
    let xi = if (s1 - secant) * (s2 - secant) >= 0.0 {
        (x1 + x2) / 2.0
    } else if (s2 - secant).abs() < (s1 - secant).abs() {
        let upper = x1 + 2.0 * h * (s2 - secant) / (s2 - s1);
        (x1 + upper) / 2.0
    } else {
        let lower = x2 + 2.0 * h * (s1 - secant) / (s2 - s1);
        (x2 + lower) / 2.0
    };
    let alpha = xi - x1;
    let beta = x2 - xi;
    // slope at xi
    let s_xi = (2.0 * (z2 - z1) - (alpha * s1 + beta * s2)) / h;
    let z_xi = z1 + alpha * (s1 + s_xi) / 2.0;
    debug!("interval [{}, {}] split at {}", x1, x2, xi);
    vec![
        (
            Interval::closed_open(x1, xi),
            polynomial_around(&[z1, s1, (s_xi - s1) / (2.0 * alpha)], x1, dim),
        ),
        (
            close(xi, x2),
            polynomial_around(&[z_xi, s_xi, (s2 - s_xi) / (2.0 * beta)], xi, dim),
        ),
    ]
}

/// Shape preserving quadratic spline through `(x_i, y_i)` on `[x_1, x_n]`. Slopes at the knots
/// are estimated when `gradients` is `None`.
pub fn create_quadratic_spline(
    x: &[f64],
    y: &[f64],
    gradients: Option<&[f64]>,
    dim: &str,
) -> Result<PiecewiseFunction> {
    check_knots(x, y)?;
    let slopes = match gradients {
        Some(gradients) => {
            if gradients.len() != x.len() {
                return Err(FunctionError::InvalidInput(format!(
                    "{} gradients for {} knots",
                    gradients.len(),
                    x.len()
                )));
            }
            if gradients.iter().any(|slope| !slope.is_finite()) {
                return Err(FunctionError::InvalidInput(
                    "gradients must be finite".to_string(),
                ));
            }
            gradients.to_vec()
        }
        None => estimate_gradients(x, y),
    };
    let n = x.len();
    let mut pieces = Vec::with_capacity(2 * (n - 1));
    for i in 0..n - 1 {
        pieces.extend(interval_pieces(
            (x[i], x[i + 1]),
            (y[i], y[i + 1]),
            (slopes[i], slopes[i + 1]),
            i + 2 == n,
            dim,
        ));
    }
    Ok(PiecewiseFunction::univariate(pieces, dim))
}

pub fn create_quadratic_spline_dates(
    dates: &[NaiveDate],
    y: &[f64],
    converter: &DateConverter,
    dim: &str,
) -> Result<PiecewiseFunction> {
    let x = converter.convert_all(dates);
    create_quadratic_spline(&x, y, None, dim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::algebra_traits::{FunctionOps, MultivariateFunction, Point};
    use approx::assert_relative_eq;

    fn at(x: f64) -> Point {
        Point::from([("x".to_string(), x)])
    }

    #[test]
    fn test_monotone_data_gives_monotone_spline() {
        let x = [0.0, 1.0, 1.5, 3.0, 4.0, 7.0];
        let y = [0.0, 0.1, 2.0, 2.1, 5.0, 5.2];
        let spline = create_quadratic_spline(&x, &y, None, "x").unwrap();
        let mut previous = f64::NEG_INFINITY;
        for k in 0..=700 {
            let value = spline.evaluate(&at(7.0 * k as f64 / 700.0)).unwrap();
            assert!(value >= previous - 1e-12, "decreasing at step {}", k);
            previous = value;
        }
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert_relative_eq!(spline.evaluate(&at(*xi)).unwrap(), *yi, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_continuity_and_slopes() {
        let x = [0.0, 1.0, 2.0, 4.0];
        let y = [1.0, 3.0, 2.0, 2.5];
        let gradients = [1.0, 0.0, -0.5, 0.5];
        let spline = create_quadratic_spline(&x, &y, Some(&gradients), "x").unwrap();
        let f = MultivariateFunction::Piecewise(spline.clone());
        let df = f.derivative("x");
        for (xi, si) in x.iter().zip(gradients.iter()) {
            assert_relative_eq!(df.evaluate(&at(*xi)).unwrap(), *si, epsilon = 1e-10);
        }
        // no jumps at the interior knots xi
        for (subdomain, _) in &spline.pieces {
            let lower = subdomain["x"].lower;
            if let Ok(left) = f.evaluate(&at(lower - 1e-9)) {
                let right = f.evaluate(&at(lower)).unwrap();
                assert!((left - right).abs() < 1e-7);
            }
        }
    }

    #[test]
    fn test_quadratic_is_reproduced() {
        // y = x^2 with exact slopes needs a single quadratic per interval
        let x = [0.0, 1.0, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        let gradients: Vec<f64> = x.iter().map(|v| 2.0 * v).collect();
        let spline = create_quadratic_spline(&x, &y, Some(&gradients), "x").unwrap();
        assert_eq!(spline.pieces.len(), 3);
        assert_relative_eq!(spline.evaluate(&at(2.5)).unwrap(), 6.25, epsilon = 1e-12);
    }

    #[test]
    fn test_gradient_length_is_checked() {
        let err = create_quadratic_spline(&[0.0, 1.0], &[0.0, 1.0], Some(&[1.0]), "x").unwrap_err();
        assert!(matches!(err, FunctionError::InvalidInput(_)));
        for bad in [f64::NAN, f64::INFINITY] {
            let err =
                create_quadratic_spline(&[0.0, 1.0], &[0.0, 1.0], Some(&[1.0, bad]), "x").unwrap_err();
            assert!(matches!(err, FunctionError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_spline_over_dates() {
        let epoch = NaiveDate::from_ymd_opt(2015, 6, 30).unwrap();
        let converter = DateConverter::new(epoch, 365.25);
        let dates: Vec<NaiveDate> = [(2016, 1, 1), (2017, 3, 15), (2018, 7, 4), (2020, 2, 29)]
            .iter()
            .map(|(year, month, day)| NaiveDate::from_ymd_opt(*year, *month, *day).unwrap())
            .collect();
        let y = [1.0, 1.8, 1.2, 2.5];
        let spline = create_quadratic_spline_dates(&dates, &y, &converter, "t").unwrap();
        for (date, value) in dates.iter().zip(y.iter()) {
            let point = Point::from([("t".to_string(), converter.years_from_epoch(*date))]);
            assert_relative_eq!(spline.evaluate(&point).unwrap(), *value, epsilon = 1e-12);
        }
        // the default epoch puts the knots elsewhere
        let shifted = DateConverter::default().years_from_epoch(dates[0]);
        let point = Point::from([("t".to_string(), shifted)]);
        assert!(spline.evaluate(&point).is_err());
    }
}
