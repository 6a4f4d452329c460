//! One dimensional interpolation of knots `(x_i, y_i)` into piecewise functions.
use crate::Utils::date_conversions::DateConverter;
use crate::algebra::algebra_errors::{FunctionError, Result};
use crate::algebra::pe_function::PEFunction;
use crate::algebra::pe_unit::PEUnit;
use crate::algebra::piecewise_function::{Interval, PiecewiseFunction};
use crate::algebra::sum_of_functions::SumOfFunctions;
use crate::approximation::schumaker::create_quadratic_spline;
use chrono::NaiveDate;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum InterpolationMethod {
    ConstantRight,
    ConstantLeft,
    Linear,
    QuadraticSpline,
}

/// `sum_k coefficients[k] * (x - base)^k` on `dim`
pub fn polynomial_around(coefficients: &[f64], base: f64, dim: &str) -> SumOfFunctions {
    let terms = coefficients
        .iter()
        .enumerate()
        .map(|(power, coefficient)| {
            if power == 0 {
                PEFunction::constant(*coefficient)
            } else {
                PEFunction::from_units(*coefficient, [(dim, PEUnit::new(0.0, base, power as u32))])
            }
        })
        .collect();
    SumOfFunctions::new(terms)
}

/// equal lengths, at least two finite knots, strictly increasing abscissae
pub fn check_knots(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(FunctionError::InvalidInput(format!(
            "{} abscissae but {} values",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(FunctionError::InsufficientData {
            needed: 2,
            got: x.len(),
        });
    }
    if x.iter().chain(y.iter()).any(|value| !value.is_finite()) {
        return Err(FunctionError::InvalidInput(
            "knots must be finite".to_string(),
        ));
    }
    if let Some(pair) = x.windows(2).find(|pair| pair[1] <= pair[0]) {
        return Err(FunctionError::InvalidInput(format!(
            "abscissae must be strictly increasing, got {} then {}",
            pair[0], pair[1]
        )));
    }
    Ok(())
}

/// `[x_i, x_{i+1}) -> y_i`, `[x_n, inf) -> y_n`
pub fn create_constant_interpolation_to_right(
    x: &[f64],
    y: &[f64],
    dim: &str,
) -> Result<PiecewiseFunction> {
    check_knots(x, y)?;
    let n = x.len();
    let mut pieces: Vec<(Interval, SumOfFunctions)> = (0..n - 1)
        .map(|i| (Interval::closed_open(x[i], x[i + 1]), SumOfFunctions::constant(y[i])))
        .collect();
    pieces.push((Interval::at_least(x[n - 1]), SumOfFunctions::constant(y[n - 1])));
    Ok(PiecewiseFunction::univariate(pieces, dim))
}

/// `(-inf, x_1] -> y_1`, `(x_i, x_{i+1}] -> y_{i+1}`
pub fn create_constant_interpolation_to_left(
    x: &[f64],
    y: &[f64],
    dim: &str,
) -> Result<PiecewiseFunction> {
    check_knots(x, y)?;
    let mut pieces = vec![(Interval::at_most(x[0]), SumOfFunctions::constant(y[0]))];
    pieces.extend(
        (1..x.len())
            .map(|i| (Interval::open_closed(x[i - 1], x[i]), SumOfFunctions::constant(y[i]))),
    );
    Ok(PiecewiseFunction::univariate(pieces, dim))
}

/// Straight lines between neighbouring knots on `[x_1, x_n]`.
pub fn create_linear_interpolation(x: &[f64], y: &[f64], dim: &str) -> Result<PiecewiseFunction> {
    check_knots(x, y)?;
    let n = x.len();
    let mut pieces = Vec::with_capacity(n - 1);
    for i in 0..n - 1 {
        let slope = (y[i + 1] - y[i]) / (x[i + 1] - x[i]);
        if i + 1 < n - 1 {
            pieces.push((
                Interval::closed_open(x[i], x[i + 1]),
                polynomial_around(&[y[i], slope], x[i], dim),
            ));
        } else {
            // last piece is written around its right knot so that both ends are exact
            pieces.push((
                Interval::closed(x[i], x[i + 1]),
                polynomial_around(&[y[i + 1], slope], x[i + 1], dim),
            ));
        }
    }
    Ok(PiecewiseFunction::univariate(pieces, dim))
}

pub fn create_interpolation(
    method: InterpolationMethod,
    x: &[f64],
    y: &[f64],
    dim: &str,
) -> Result<PiecewiseFunction> {
    match method {
        InterpolationMethod::ConstantRight => create_constant_interpolation_to_right(x, y, dim),
        InterpolationMethod::ConstantLeft => create_constant_interpolation_to_left(x, y, dim),
        InterpolationMethod::Linear => create_linear_interpolation(x, y, dim),
        InterpolationMethod::QuadraticSpline => create_quadratic_spline(x, y, None, dim),
    }
}

/// dates are turned into years since the converter's epoch first
pub fn create_interpolation_dates(
    method: InterpolationMethod,
    dates: &[NaiveDate],
    y: &[f64],
    converter: &DateConverter,
    dim: &str,
) -> Result<PiecewiseFunction> {
    let x = converter.convert_all(dates);
    create_interpolation(method, &x, y, dim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::algebra_traits::Point;
    use approx::assert_relative_eq;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn at(x: f64) -> Point {
        Point::from([("t".to_string(), x)])
    }

    #[test]
    fn test_constant_interpolations() {
        let x = [1.0, 2.0, 4.0];
        let y = [10.0, 20.0, 40.0];
        let right = create_constant_interpolation_to_right(&x, &y, "t").unwrap();
        assert_eq!(right.evaluate(&at(1.5)).unwrap(), 10.0);
        assert_eq!(right.evaluate(&at(2.0)).unwrap(), 20.0);
        assert_eq!(right.evaluate(&at(100.0)).unwrap(), 40.0);
        assert!(right.evaluate(&at(0.5)).is_err());
        let left = create_constant_interpolation_to_left(&x, &y, "t").unwrap();
        assert_eq!(left.evaluate(&at(-5.0)).unwrap(), 10.0);
        assert_eq!(left.evaluate(&at(2.0)).unwrap(), 20.0);
        assert_eq!(left.evaluate(&at(2.5)).unwrap(), 40.0);
        assert!(left.evaluate(&at(4.5)).is_err());
    }

    #[test]
    fn test_linear_interpolation() {
        let x = [0.0, 1.0, 3.0];
        let y = [0.0, 2.0, -2.0];
        let f = create_linear_interpolation(&x, &y, "t").unwrap();
        assert_relative_eq!(f.evaluate(&at(0.5)).unwrap(), 1.0);
        assert_relative_eq!(f.evaluate(&at(2.0)).unwrap(), 0.0, epsilon = 1e-14);
        assert_eq!(f.evaluate(&at(3.0)).unwrap(), -2.0);
        assert!(f.evaluate(&at(3.5)).is_err());
    }

    #[test]
    fn test_every_method_reproduces_knots() {
        let x = [0.0, 0.5, 1.5, 2.0, 3.5];
        let y = [1.0, 1.2, 0.7, 0.9, 2.5];
        for method in InterpolationMethod::iter() {
            let f = create_interpolation(method, &x, &y, "t").unwrap();
            for (xi, yi) in x.iter().zip(y.iter()) {
                assert_relative_eq!(f.evaluate(&at(*xi)).unwrap(), *yi, epsilon = 1e-12);
            }
            // every point of [x_1, x_n] is covered
            for k in 0..=70 {
                let t = 3.5 * k as f64 / 70.0;
                assert!(f.evaluate(&at(t)).is_ok(), "{} at {}", method, t);
            }
        }
    }

    #[test]
    fn test_method_names() {
        assert_eq!(InterpolationMethod::QuadraticSpline.to_string(), "quadratic_spline");
        assert_eq!(
            InterpolationMethod::from_str("constant_left").unwrap(),
            InterpolationMethod::ConstantLeft
        );
    }

    #[test]
    fn test_bad_knots() {
        let err = create_linear_interpolation(&[1.0], &[1.0], "t").unwrap_err();
        assert_eq!(err, FunctionError::InsufficientData { needed: 2, got: 1 });
        let err = create_linear_interpolation(&[1.0, 1.0], &[1.0, 2.0], "t").unwrap_err();
        assert!(matches!(err, FunctionError::InvalidInput(_)));
        let err = create_linear_interpolation(&[1.0, 2.0], &[1.0], "t").unwrap_err();
        assert!(matches!(err, FunctionError::InvalidInput(_)));
    }

    #[test]
    fn test_dates() {
        let converter = DateConverter::default();
        let dates = [
            NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2003, 1, 1).unwrap(),
        ];
        let f = create_interpolation_dates(InterpolationMethod::Linear, &dates, &[1.0, 3.0], &converter, "t")
            .unwrap();
        let middle = converter.years_from_epoch(NaiveDate::from_ymd_opt(2002, 1, 1).unwrap());
        // 365 days out of 730
        assert_relative_eq!(f.evaluate(&at(middle)).unwrap(), 2.0, epsilon = 1e-12);
    }
}
