//! # Piecewise functions
//!
//! A `PiecewiseFunction` is an ordered list of `(Subdomain, SumOfFunctions)` pairs. A subdomain
//! restricts some dimensions to intervals and leaves the others free. Evaluation picks the
//! first listed subdomain that contains the point, so on shared boundaries the earlier piece
//! wins. A point outside every subdomain is a `DomainError`.
//!
//! Sums and products of piecewise functions are built on the pairwise intersections of the
//! operands' subdomains, in `(i, j)` order. Anything that is not piecewise takes part as a
//! single unrestricted piece.
use crate::algebra::algebra_errors::{FunctionError, Result};
use crate::algebra::algebra_traits::{DEFAULT_DIMENSION, Point, point_value};
use crate::algebra::sum_of_functions::SumOfFunctions;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Interval on the real line with open or closed ends. Infinite bounds are allowed and
/// are never contained.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
    pub lower_closed: bool,
    pub upper_closed: bool,
}

impl Interval {
    pub fn new(lower: f64, upper: f64, lower_closed: bool, upper_closed: bool) -> Interval {
        Interval {
            lower,
            upper,
            lower_closed,
            upper_closed,
        }
    }
    /// [lower, upper]
    pub fn closed(lower: f64, upper: f64) -> Interval {
        Interval::new(lower, upper, true, true)
    }
    /// [lower, upper)
    pub fn closed_open(lower: f64, upper: f64) -> Interval {
        Interval::new(lower, upper, true, false)
    }
    /// (lower, upper]
    pub fn open_closed(lower: f64, upper: f64) -> Interval {
        Interval::new(lower, upper, false, true)
    }
    pub fn open(lower: f64, upper: f64) -> Interval {
        Interval::new(lower, upper, false, false)
    }
    pub fn point(value: f64) -> Interval {
        Interval::closed(value, value)
    }
    pub fn unbounded() -> Interval {
        Interval::open(f64::NEG_INFINITY, f64::INFINITY)
    }
    /// [lower, +inf)
    pub fn at_least(lower: f64) -> Interval {
        Interval::new(lower, f64::INFINITY, true, false)
    }
    /// (-inf, upper]
    pub fn at_most(upper: f64) -> Interval {
        Interval::new(f64::NEG_INFINITY, upper, false, true)
    }

    pub fn contains(&self, x: f64) -> bool {
        let above = x > self.lower || (self.lower_closed && x == self.lower);
        let below = x < self.upper || (self.upper_closed && x == self.upper);
        above && below && x.is_finite()
    }
    pub fn is_empty(&self) -> bool {
        self.lower > self.upper
            || (self.lower == self.upper && !(self.lower_closed && self.upper_closed))
    }
    pub fn is_unbounded(&self) -> bool {
        self.lower == f64::NEG_INFINITY && self.upper == f64::INFINITY
    }
    /// `true` when every point of `other` lies in `self`
    pub fn covers(&self, other: &Interval) -> bool {
        if other.is_empty() {
            return true;
        }
        let lower_ok = self.lower < other.lower
            || (self.lower == other.lower && (self.lower_closed || !other.lower_closed));
        let upper_ok = self.upper > other.upper
            || (self.upper == other.upper && (self.upper_closed || !other.upper_closed));
        lower_ok && upper_ok
    }

    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let (lower, lower_closed) = if self.lower > other.lower {
            (self.lower, self.lower_closed)
        } else if self.lower < other.lower {
            (other.lower, other.lower_closed)
        } else {
            (self.lower, self.lower_closed && other.lower_closed)
        };
        let (upper, upper_closed) = if self.upper < other.upper {
            (self.upper, self.upper_closed)
        } else if self.upper > other.upper {
            (other.upper, other.upper_closed)
        } else {
            (self.upper, self.upper_closed && other.upper_closed)
        };
        let intersection = Interval::new(lower, upper, lower_closed, upper_closed);
        if intersection.is_empty() {
            None
        } else {
            Some(intersection)
        }
    }

    /// Part of `[lower, upper]` inside the interval, `None` for a zero length overlap.
    /// Closedness is irrelevant for integration.
    pub fn clip(&self, lower: f64, upper: f64) -> Option<(f64, f64)> {
        let from = self.lower.max(lower);
        let to = self.upper.min(upper);
        if from < to { Some((from, to)) } else { None }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::unbounded()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let open = if self.lower_closed { "[" } else { "(" };
        let close = if self.upper_closed { "]" } else { ")" };
        write!(f, "{}{}, {}{}", open, self.lower, self.upper, close)
    }
}

/// Restricted dimensions and their intervals. Dimensions not listed are unrestricted.
pub type Subdomain = BTreeMap<String, Interval>;

pub fn subdomain_contains(subdomain: &Subdomain, point: &Point) -> Result<bool> {
    for (dim, interval) in subdomain {
        if !interval.contains(point_value(point, dim)?) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// `None` when the intersection is empty along some dimension
pub fn intersect_subdomains(left: &Subdomain, right: &Subdomain) -> Option<Subdomain> {
    let mut intersection = left.clone();
    for (dim, interval) in right {
        let restricted = match left.get(dim) {
            Some(existing) => existing.intersect(interval)?,
            None => *interval,
        };
        intersection.insert(dim.clone(), restricted);
    }
    Some(intersection)
}

fn format_subdomain(subdomain: &Subdomain) -> String {
    if subdomain.is_empty() {
        return "everywhere".to_string();
    }
    subdomain
        .iter()
        .map(|(dim, interval)| format!("{} in {}", dim, interval))
        .collect::<Vec<String>>()
        .join(", ")
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct PiecewiseFunction {
    pub pieces: Vec<(Subdomain, SumOfFunctions)>,
}

impl PiecewiseFunction {
    pub fn new(pieces: Vec<(Subdomain, SumOfFunctions)>) -> PiecewiseFunction {
        PiecewiseFunction { pieces }
    }
    /// one dimensional piecewise function on `dim`
    pub fn univariate(pieces: Vec<(Interval, SumOfFunctions)>, dim: &str) -> PiecewiseFunction {
        PiecewiseFunction {
            pieces: pieces
                .into_iter()
                .map(|(interval, function)| (Subdomain::from([(dim.to_string(), interval)]), function))
                .collect(),
        }
    }
    /// one dimensional piecewise function on the default dimension
    pub fn univariate_default(pieces: Vec<(Interval, SumOfFunctions)>) -> PiecewiseFunction {
        PiecewiseFunction::univariate(pieces, DEFAULT_DIMENSION)
    }
    /// a single piece valid everywhere
    pub fn from_sum(function: SumOfFunctions) -> PiecewiseFunction {
        PiecewiseFunction {
            pieces: vec![(Subdomain::new(), function)],
        }
    }

    /// index of the piece used at `point`
    pub fn find_piece(&self, point: &Point) -> Result<Option<usize>> {
        for (index, (subdomain, _)) in self.pieces.iter().enumerate() {
            if subdomain_contains(subdomain, point)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    pub fn evaluate(&self, point: &Point) -> Result<f64> {
        match self.find_piece(point)? {
            Some(index) => self.pieces[index].1.evaluate(point),
            None => Err(FunctionError::DomainError(format!(
                "point {:?} is outside every subdomain",
                point
            ))),
        }
    }

    /// dimensions restricted by some piece or used by some piece's function
    pub fn underlying_dimensions(&self) -> BTreeSet<String> {
        let mut dims = BTreeSet::new();
        for (subdomain, function) in &self.pieces {
            dims.extend(subdomain.keys().cloned());
            dims.extend(function.underlying_dimensions());
        }
        dims
    }
    /// dimensions restricted by at least one piece
    pub fn restricted_dimensions(&self) -> BTreeSet<String> {
        self.pieces
            .iter()
            .flat_map(|(subdomain, _)| subdomain.keys().cloned())
            .collect()
    }
    /// the single function when one piece covers everything
    pub fn as_unrestricted(&self) -> Option<&SumOfFunctions> {
        match self.pieces.as_slice() {
            [(subdomain, function)]
                if subdomain.values().all(|interval| interval.is_unbounded()) =>
            {
                Some(function)
            }
            _ => None,
        }
    }
    pub fn constant_value(&self) -> Option<f64> {
        self.as_unrestricted()?.constant_value()
    }

    fn combine<F>(&self, other: &PiecewiseFunction, op: F) -> PiecewiseFunction
    where
        F: Fn(&SumOfFunctions, &SumOfFunctions) -> SumOfFunctions,
    {
        let mut pieces = Vec::with_capacity(self.pieces.len() * other.pieces.len());
        for (left_domain, left) in &self.pieces {
            for (right_domain, right) in &other.pieces {
                if let Some(domain) = intersect_subdomains(left_domain, right_domain) {
                    pieces.push((domain, op(left, right)));
                }
            }
        }
        PiecewiseFunction { pieces }
    }
    fn map_pieces<F>(&self, op: F) -> PiecewiseFunction
    where
        F: Fn(&SumOfFunctions) -> SumOfFunctions,
    {
        PiecewiseFunction {
            pieces: self
                .pieces
                .iter()
                .map(|(subdomain, function)| (subdomain.clone(), op(function)))
                .collect(),
        }
    }

    pub fn add(&self, other: &PiecewiseFunction) -> PiecewiseFunction {
        self.combine(other, |left, right| left.add(right))
    }
    pub fn multiply(&self, other: &PiecewiseFunction) -> PiecewiseFunction {
        self.combine(other, |left, right| left.multiply(right))
    }
    pub fn add_sum(&self, other: &SumOfFunctions) -> PiecewiseFunction {
        self.map_pieces(|function| function.add(other))
    }
    pub fn multiply_sum(&self, other: &SumOfFunctions) -> PiecewiseFunction {
        self.map_pieces(|function| function.multiply(other))
    }
    pub fn add_constant(&self, value: f64) -> PiecewiseFunction {
        self.map_pieces(|function| function.add_constant(value))
    }
    pub fn scale(&self, factor: f64) -> PiecewiseFunction {
        self.map_pieces(|function| function.scale(factor))
    }
    pub fn pow(&self, exponent: u32) -> PiecewiseFunction {
        self.map_pieces(|function| function.pow(exponent))
    }

    /// Measure of the union of the pieces' intervals on `dim` inside `[lower, upper]`.
    /// Pieces that do not restrict `dim` cover the whole range.
    pub fn covered_length(&self, dim: &str, lower: f64, upper: f64) -> f64 {
        let mut segments: Vec<(f64, f64)> = self
            .pieces
            .iter()
            .filter_map(|(subdomain, _)| match subdomain.get(dim) {
                Some(interval) => interval.clip(lower, upper),
                None if lower < upper => Some((lower, upper)),
                None => None,
            })
            .collect();
        segments.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut length = 0.0;
        let mut reached = f64::NEG_INFINITY;
        for (from, to) in segments {
            let from = from.max(reached);
            if to > from {
                length += to - from;
                reached = to;
            }
        }
        length
    }
}

impl From<SumOfFunctions> for PiecewiseFunction {
    fn from(function: SumOfFunctions) -> Self {
        PiecewiseFunction::from_sum(function)
    }
}

impl fmt::Display for PiecewiseFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Piecewise function with {} pieces:", self.pieces.len())?;
        for (subdomain, function) in &self.pieces {
            writeln!(f, "  {} => {}", format_subdomain(subdomain), function)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::pe_function::PEFunction;
    use approx::assert_relative_eq;

    fn at(x: f64) -> Point {
        Point::from([(DEFAULT_DIMENSION.to_string(), x)])
    }
    fn line(slope: f64, intercept: f64) -> SumOfFunctions {
        SumOfFunctions::new(vec![
            PEFunction::univariate(slope, 0.0, 0.0, 1),
            PEFunction::constant(intercept),
        ])
    }

    #[test]
    fn test_interval_contains() {
        let interval = Interval::closed_open(1.0, 2.0);
        assert!(interval.contains(1.0));
        assert!(interval.contains(1.5));
        assert!(!interval.contains(2.0));
        assert!(!Interval::open(0.0, 1.0).contains(0.0));
        assert!(Interval::unbounded().contains(-1e300));
        assert!(!Interval::at_least(0.0).contains(f64::INFINITY));
    }

    #[test]
    fn test_interval_intersect() {
        let left = Interval::closed_open(0.0, 2.0);
        let right = Interval::closed(1.0, 3.0);
        assert_eq!(left.intersect(&right), Some(Interval::closed_open(1.0, 2.0)));
        // [0, 1) and [1, 2] touch without overlap
        assert_eq!(Interval::closed_open(0.0, 1.0).intersect(&Interval::closed(1.0, 2.0)), None);
        // [0, 1] and [1, 2] share a point
        assert_eq!(
            Interval::closed(0.0, 1.0).intersect(&Interval::closed(1.0, 2.0)),
            Some(Interval::point(1.0))
        );
        assert!(Interval::unbounded().covers(&left));
        assert!(!left.covers(&right));
    }

    #[test]
    fn test_first_listed_subdomain_wins() {
        let f = PiecewiseFunction::univariate_default(vec![
            (Interval::closed(0.0, 1.0), SumOfFunctions::constant(1.0)),
            (Interval::closed(1.0, 2.0), SumOfFunctions::constant(2.0)),
        ]);
        assert_relative_eq!(f.evaluate(&at(1.0)).unwrap(), 1.0);
        assert_relative_eq!(f.evaluate(&at(1.5)).unwrap(), 2.0);
        assert!(matches!(f.evaluate(&at(2.5)), Err(FunctionError::DomainError(_))));
    }

    #[test]
    fn test_add_intersects_pieces() {
        let f = PiecewiseFunction::univariate_default(vec![
            (Interval::closed_open(0.0, 1.0), line(1.0, 0.0)),
            (Interval::closed(1.0, 3.0), line(0.0, 1.0)),
        ]);
        let g = PiecewiseFunction::univariate_default(vec![
            (Interval::closed_open(0.0, 2.0), line(2.0, 0.0)),
            (Interval::closed(2.0, 4.0), line(0.0, 4.0)),
        ]);
        let sum = f.add(&g);
        // [0,1) x [0,2), [1,2), [2,3]
        assert_eq!(sum.pieces.len(), 3);
        for x in [0.0, 0.5, 1.0, 1.9, 2.0, 3.0] {
            assert_relative_eq!(
                sum.evaluate(&at(x)).unwrap(),
                f.evaluate(&at(x)).unwrap() + g.evaluate(&at(x)).unwrap(),
                epsilon = 1e-12
            );
        }
        // coverage is the intersection of coverages
        assert!(sum.evaluate(&at(3.5)).is_err());
    }

    #[test]
    fn test_multiply_across_dimensions() {
        let fx = PiecewiseFunction::univariate(
            vec![(Interval::closed(0.0, 1.0), SumOfFunctions::constant(2.0))],
            "x",
        );
        let fy = PiecewiseFunction::univariate(
            vec![(Interval::closed(0.0, 1.0), SumOfFunctions::constant(3.0))],
            "y",
        );
        let product = fx.multiply(&fy);
        assert_eq!(product.pieces.len(), 1);
        assert_eq!(product.pieces[0].0.len(), 2);
        let inside = Point::from([("x".to_string(), 0.5), ("y".to_string(), 0.5)]);
        assert_relative_eq!(product.evaluate(&inside).unwrap(), 6.0);
        let missing = Point::from([("x".to_string(), 0.5)]);
        assert!(matches!(product.evaluate(&missing), Err(FunctionError::MissingDimension(_))));
    }

    #[test]
    fn test_covered_length() {
        let f = PiecewiseFunction::univariate(
            vec![
                (Interval::closed(0.0, 1.0), SumOfFunctions::constant(1.0)),
                (Interval::closed(0.5, 2.0), SumOfFunctions::constant(1.0)),
                (Interval::closed(3.0, 4.0), SumOfFunctions::constant(1.0)),
            ],
            "x",
        );
        assert_relative_eq!(f.covered_length("x", -1.0, 3.5), 2.5);
        assert_relative_eq!(f.covered_length("y", 0.0, 3.0), 3.0);
    }

    #[test]
    fn test_as_unrestricted() {
        let f = PiecewiseFunction::from_sum(line(1.0, 1.0));
        assert_eq!(f.as_unrestricted(), Some(&line(1.0, 1.0)));
        let g = PiecewiseFunction::univariate_default(vec![(Interval::closed(0.0, 1.0), line(1.0, 1.0))]);
        assert_eq!(g.as_unrestricted(), None);
    }
}
