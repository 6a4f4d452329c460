//! # Analytic integration
//!
//! Definite integrals are taken one dimension at a time. Integrating a term along a dimension
//! replaces its unit by the unit's definite integral (a number), so the result of integrating
//! over some dimensions is again a function of the remaining ones.
//!
//! Piecewise functions are integrated on a refinement grid: the interval endpoints of all
//! pieces split every restricted dimension into elementary cells. Along integrated dimensions
//! each open cell is integrated with the piece that is active there (first listed wins, as in
//! evaluation); along the remaining dimensions every cell becomes one piece of the result.
//! Integration ranges only partially covered by the pieces integrate the covered part.
use crate::algebra::algebra_errors::{FunctionError, Result};
use crate::algebra::algebra_traits::{
    DEFAULT_DIMENSION, FunctionOps, Limits, MultivariateFunction, Point, validate_limits,
};
use crate::algebra::pe_function::PEFunction;
use crate::algebra::piecewise_function::{Interval, PiecewiseFunction, Subdomain};
use crate::algebra::sum_of_functions::SumOfFunctions;
use log::debug;

impl PEFunction {
    /// definite integral along one dimension, the dimension disappears from the result
    pub fn integrate_dimension(&self, dim: &str, lower: f64, upper: f64) -> PEFunction {
        let value = self.unit(dim).integral(lower, upper);
        self.without_dimension(value, dim)
    }
    pub fn integrate(&self, limits: &Limits) -> PEFunction {
        limits
            .iter()
            .fold(self.clone(), |acc, (dim, (lower, upper))| {
                acc.integrate_dimension(dim, *lower, *upper)
            })
    }
}

impl SumOfFunctions {
    pub fn integrate(&self, limits: &Limits) -> SumOfFunctions {
        SumOfFunctions::new(
            self.functions
                .iter()
                .map(|term| term.integrate(limits))
                .collect(),
        )
    }
}

/// representative coordinate strictly inside a cell (or the cell's single point)
fn representative(interval: &Interval) -> f64 {
    match (interval.lower.is_finite(), interval.upper.is_finite()) {
        (true, true) => 0.5 * (interval.lower + interval.upper),
        (true, false) => interval.lower + 1.0,
        (false, true) => interval.upper - 1.0,
        (false, false) => 0.0,
    }
}

/// sorted distinct finite endpoints of all pieces' intervals along `dim`
fn breakpoints(function: &PiecewiseFunction, dim: &str) -> Vec<f64> {
    let mut points: Vec<f64> = function
        .pieces
        .iter()
        .filter_map(|(subdomain, _)| subdomain.get(dim))
        .flat_map(|interval| [interval.lower, interval.upper])
        .filter(|value| value.is_finite())
        .collect();
    points.sort_by(|a, b| a.total_cmp(b));
    points.dedup();
    points
}

/// open gaps and single points covering the whole real line
fn free_cells(points: &[f64]) -> Vec<Interval> {
    let Some((&first, _)) = points.split_first() else {
        return vec![Interval::unbounded()];
    };
    let mut cells = vec![Interval::open(f64::NEG_INFINITY, first)];
    for window in points.windows(2) {
        cells.push(Interval::point(window[0]));
        cells.push(Interval::open(window[0], window[1]));
    }
    let last = points[points.len() - 1];
    cells.push(Interval::point(last));
    cells.push(Interval::open(last, f64::INFINITY));
    cells
}

/// open gaps between consecutive breakpoints inside `[from, to]`
fn integration_cells(points: &[f64], from: f64, to: f64) -> Vec<Interval> {
    let mut edges = vec![from];
    edges.extend(points.iter().copied().filter(|p| *p > from && *p < to));
    edges.push(to);
    edges
        .windows(2)
        .filter(|window| window[0] < window[1])
        .map(|window| Interval::open(window[0], window[1]))
        .collect()
}

/// every combination of one cell per dimension
fn cell_product(axes: &[(String, Vec<Interval>)]) -> Vec<Vec<(String, Interval)>> {
    axes.iter().fold(vec![Vec::new()], |combinations, (dim, cells)| {
        combinations
            .iter()
            .flat_map(|prefix| {
                cells.iter().map(move |cell| {
                    let mut combination = prefix.clone();
                    combination.push((dim.clone(), *cell));
                    combination
                })
            })
            .collect()
    })
}

impl PiecewiseFunction {
    /// Definite integral over the dimensions in `limits`. Dimensions restricted by the pieces
    /// but not integrated become the subdomains of the result.
    pub fn integrate(&self, limits: &Limits) -> Result<PiecewiseFunction> {
        validate_limits(limits)?;
        if self.pieces.is_empty() {
            return Err(FunctionError::DomainError(
                "function has an empty domain".to_string(),
            ));
        }
        let restricted = self.restricted_dimensions();
        let mut free_axes = Vec::new();
        let mut integrated_axes = Vec::new();
        for dim in &restricted {
            let points = breakpoints(self, dim);
            match limits.get(dim) {
                Some(&(lower, upper)) => {
                    let (from, to) = (lower.min(upper), lower.max(upper));
                    integrated_axes.push((dim.clone(), integration_cells(&points, from, to)));
                }
                None => free_axes.push((dim.clone(), free_cells(&points))),
            }
        }
        let free_combinations = cell_product(&free_axes);
        let integrated_combinations = cell_product(&integrated_axes);
        debug!(
            "integrating {} pieces over {} free and {} integrated cells",
            self.pieces.len(),
            free_combinations.len(),
            integrated_combinations.len()
        );

        let mut pieces = Vec::new();
        for free_cell in &free_combinations {
            let free_point: Point = free_cell
                .iter()
                .map(|(dim, cell)| (dim.clone(), representative(cell)))
                .collect();
            let covered = self.pieces.iter().any(|(subdomain, _)| {
                free_cell.iter().all(|(dim, _)| match subdomain.get(dim) {
                    Some(interval) => interval.contains(free_point[dim]),
                    None => true,
                })
            });
            if !covered {
                continue;
            }
            let mut total = SumOfFunctions::zero();
            for integrated_cell in &integrated_combinations {
                let mut point = free_point.clone();
                let mut cell_limits = limits.clone();
                for (dim, cell) in integrated_cell {
                    point.insert(dim.clone(), representative(cell));
                    // keep the orientation of the requested bounds
                    let (lower, upper) = limits[dim];
                    let bounds = if lower <= upper {
                        (cell.lower, cell.upper)
                    } else {
                        (cell.upper, cell.lower)
                    };
                    cell_limits.insert(dim.clone(), bounds);
                }
                if let Some(index) = self.find_piece(&point)? {
                    total = total.add(&self.pieces[index].1.integrate(&cell_limits));
                }
            }
            let subdomain: Subdomain = free_cell.iter().cloned().collect();
            pieces.push((subdomain, total));
        }
        Ok(PiecewiseFunction::new(pieces))
    }
}

impl MultivariateFunction {
    /// Definite integral that must reduce to a number, i.e. `limits` covers every
    /// dimension the function depends on.
    pub fn integral_value(&self, limits: &Limits) -> Result<f64> {
        let result = self.integral(limits)?;
        result.constant_value().ok_or_else(|| {
            let left: Vec<String> = result.underlying_dimensions().into_iter().collect();
            if left.is_empty() {
                return FunctionError::DomainError("integral has an empty domain".to_string());
            }
            FunctionError::InvalidInput(format!(
                "integral still depends on dimensions {:?}",
                left
            ))
        })
    }

    /// Integral of a univariate function over `[lower, upper]`; a function of no dimension
    /// is integrated along the default dimension.
    pub fn integral_1d(&self, lower: f64, upper: f64) -> Result<f64> {
        let dims = self.underlying_dimensions();
        if dims.len() > 1 {
            return Err(FunctionError::InvalidInput(format!(
                "integral_1d needs a univariate function, got dimensions {:?}",
                dims
            )));
        }
        let dim = dims
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_DIMENSION.to_string());
        self.integral_value(&Limits::from([(dim, (lower, upper))]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::pe_unit::PEUnit;
    use approx::assert_relative_eq;

    fn limits(pairs: &[(&str, f64, f64)]) -> Limits {
        pairs
            .iter()
            .map(|(dim, lower, upper)| (dim.to_string(), (*lower, *upper)))
            .collect()
    }

    #[test]
    fn test_integrate_unused_dimension_multiplies_by_width() {
        let f = PEFunction::from_units(2.0, [("x", PEUnit::new(0.0, 0.0, 1))]);
        let integral = f.integrate(&limits(&[("y", 1.0, 4.0)]));
        assert_relative_eq!(integral.multiplier, 6.0);
        assert!(integral.units.contains_key("x"));
    }

    #[test]
    fn test_partial_integration_leaves_function() {
        // ∫0^1 x e^y dx = e^y / 2
        let f = MultivariateFunction::PE(PEFunction::from_units(
            1.0,
            [("x", PEUnit::new(0.0, 0.0, 1)), ("y", PEUnit::new(1.0, 0.0, 0))],
        ));
        let partial = f.integral(&limits(&[("x", 0.0, 1.0)])).unwrap();
        let at = Point::from([("y".to_string(), 1.0)]);
        assert_relative_eq!(partial.evaluate(&at).unwrap(), 0.5 * 1.0_f64.exp(), epsilon = 1e-12);
        assert!(f.integral_value(&limits(&[("x", 0.0, 1.0)])).is_err());
    }

    #[test]
    fn test_piecewise_integral_clips_to_pieces() {
        // 1 on [0, 1), x on [1, 3]
        let f = PiecewiseFunction::univariate(
            vec![
                (Interval::closed_open(0.0, 1.0), SumOfFunctions::constant(1.0)),
                (
                    Interval::closed(1.0, 3.0),
                    SumOfFunctions::from(PEFunction::from_units(1.0, [("x", PEUnit::new(0.0, 0.0, 1))])),
                ),
            ],
            "x",
        );
        let f = MultivariateFunction::Piecewise(f);
        // 0.5 + (9 - 1) / 2
        assert_relative_eq!(f.integral_value(&limits(&[("x", 0.5, 3.0)])).unwrap(), 4.5, epsilon = 1e-12);
        // uncovered parts of the range contribute nothing
        assert_relative_eq!(f.integral_value(&limits(&[("x", -5.0, 10.0)])).unwrap(), 5.0, epsilon = 1e-12);
        assert_relative_eq!(f.integral_value(&limits(&[("x", 3.0, 0.5)])).unwrap(), -4.5, epsilon = 1e-12);
        assert_relative_eq!(f.integral_1d(0.0, 1.0).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_piecewise_partial_integral_over_grid() {
        // pieces split along x and along y; integrating x leaves a function of y
        let quadrant = |x: Interval, y: Interval, value: f64| {
            (
                Subdomain::from([("x".to_string(), x), ("y".to_string(), y)]),
                SumOfFunctions::constant(value),
            )
        };
        let f = PiecewiseFunction::new(vec![
            quadrant(Interval::closed_open(0.0, 1.0), Interval::closed_open(0.0, 1.0), 1.0),
            quadrant(Interval::closed(1.0, 2.0), Interval::closed_open(0.0, 1.0), 2.0),
            quadrant(Interval::closed_open(0.0, 1.0), Interval::closed(1.0, 2.0), 3.0),
            quadrant(Interval::closed(1.0, 2.0), Interval::closed(1.0, 2.0), 4.0),
        ]);
        let partial = f.integrate(&limits(&[("x", 0.0, 2.0)])).unwrap();
        let at = |y: f64| Point::from([("y".to_string(), y)]);
        assert_relative_eq!(partial.evaluate(&at(0.5)).unwrap(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(partial.evaluate(&at(1.0)).unwrap(), 7.0, epsilon = 1e-12);
        assert_relative_eq!(partial.evaluate(&at(1.5)).unwrap(), 7.0, epsilon = 1e-12);
        assert!(matches!(partial.evaluate(&at(2.5)), Err(FunctionError::DomainError(_))));
        let total = MultivariateFunction::Piecewise(f)
            .integral_value(&limits(&[("x", 0.0, 2.0), ("y", 0.0, 2.0)]))
            .unwrap();
        assert_relative_eq!(total, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_overlapping_pieces_follow_first_match() {
        let f = PiecewiseFunction::univariate(
            vec![
                (Interval::closed(0.0, 2.0), SumOfFunctions::constant(1.0)),
                (Interval::closed(1.0, 3.0), SumOfFunctions::constant(10.0)),
            ],
            "x",
        );
        let value = MultivariateFunction::Piecewise(f).integral_1d(0.0, 3.0).unwrap();
        assert_relative_eq!(value, 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_disjoint_product_has_empty_domain() {
        let ramp = |lower: f64, upper: f64| {
            MultivariateFunction::Piecewise(PiecewiseFunction::univariate(
                vec![(
                    Interval::closed(lower, upper),
                    SumOfFunctions::from(PEFunction::from_units(1.0, [("x", PEUnit::new(0.0, lower, 1))])),
                )],
                "x",
            ))
        };
        let product = &ramp(0.0, 1.0) * &ramp(2.0, 3.0);
        let err = product.integral_1d(0.0, 3.0).unwrap_err();
        assert!(matches!(err, FunctionError::DomainError(_)), "{:?}", err);
        let empty = PiecewiseFunction::new(Vec::new());
        let err = empty.integrate(&limits(&[("x", 0.0, 1.0)])).unwrap_err();
        assert!(matches!(err, FunctionError::DomainError(_)));
    }

    #[test]
    fn test_integral_1d_rejects_multivariate() {
        let f = MultivariateFunction::PE(PEFunction::from_units(
            1.0,
            [("x", PEUnit::new(0.0, 0.0, 1)), ("y", PEUnit::new(0.0, 0.0, 1))],
        ));
        assert!(matches!(f.integral_1d(0.0, 1.0), Err(FunctionError::InvalidInput(_))));
        // a constant is integrated along the default dimension
        assert_relative_eq!(MultivariateFunction::constant(2.0).integral_1d(1.0, 4.0).unwrap(), 6.0);
    }
}
