//! # Term-product function
//!
//! `PEFunction` is `multiplier * prod_dim PEUnit_dim(dim)`: one closed form exponential-polynomial
//! monomial over any number of axes. Axes without a unit are treated as carrying the identity,
//! so the function is constant along them.
use crate::algebra::algebra_errors::{FunctionError, Result};
use crate::algebra::algebra_traits::{DEFAULT_DIMENSION, Point, point_value};
use crate::algebra::pe_unit::PEUnit;
use crate::algebra::sum_of_functions::SumOfFunctions;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub struct PEFunction {
    pub multiplier: f64,
    /// identity units are never stored, so equal functions have equal maps
    pub units: BTreeMap<String, PEUnit>,
}

impl PEFunction {
    pub fn new(multiplier: f64, units: BTreeMap<String, PEUnit>) -> PEFunction {
        if multiplier == 0.0 {
            return PEFunction::constant(0.0);
        }
        let units = units
            .into_iter()
            .filter(|(_, unit)| !unit.is_identity())
            .collect();
        PEFunction { multiplier, units }
    }
    /// builds a function from (dimension, unit) pairs
    /// ```
    /// use RustedFunctionAlgebra::algebra::pe_function::PEFunction;
    /// use RustedFunctionAlgebra::algebra::pe_unit::PEUnit;
    /// // 4 * x * exp(y)
    /// let h = PEFunction::from_units(4.0, [("x", PEUnit::new(0.0, 0.0, 1)), ("y", PEUnit::new(1.0, 0.0, 0))]);
    /// assert_eq!(h.units.len(), 2);
    /// ```
    pub fn from_units<I, S>(multiplier: f64, units: I) -> PEFunction
    where
        I: IntoIterator<Item = (S, PEUnit)>,
        S: Into<String>,
    {
        let units = units
            .into_iter()
            .map(|(dim, unit)| (dim.into(), unit))
            .collect::<BTreeMap<String, PEUnit>>();
        PEFunction::new(multiplier, units)
    }
    /// `a * exp(b(x - base)) * (x - base)^d` on the default dimension
    pub fn univariate(multiplier: f64, b: f64, base: f64, d: u32) -> PEFunction {
        PEFunction::from_units(multiplier, [(DEFAULT_DIMENSION, PEUnit::new(b, base, d))])
    }
    pub fn constant(value: f64) -> PEFunction {
        PEFunction {
            multiplier: value,
            units: BTreeMap::new(),
        }
    }
    pub fn is_constant(&self) -> bool {
        self.units.is_empty()
    }
    pub fn is_zero(&self) -> bool {
        self.multiplier == 0.0
    }
    pub fn underlying_dimensions(&self) -> BTreeSet<String> {
        self.units.keys().cloned().collect()
    }
    pub fn unit(&self, dim: &str) -> PEUnit {
        self.units.get(dim).copied().unwrap_or_default()
    }

    pub fn evaluate(&self, point: &Point) -> Result<f64> {
        let mut value = self.multiplier;
        for (dim, unit) in &self.units {
            value *= unit.evaluate(point_value(point, dim)?);
        }
        Ok(value)
    }

    pub fn scale(&self, factor: f64) -> PEFunction {
        PEFunction::new(self.multiplier * factor, self.units.clone())
    }

    /// Same function with `dim` replaced by another unit and the multiplier scaled.
    pub(crate) fn with_unit(&self, factor: f64, dim: &str, unit: PEUnit) -> PEFunction {
        let mut units = self.units.clone();
        units.insert(dim.to_string(), unit);
        PEFunction::new(self.multiplier * factor, units)
    }
    pub(crate) fn without_dimension(&self, factor: f64, dim: &str) -> PEFunction {
        let mut units = self.units.clone();
        units.remove(dim);
        PEFunction::new(self.multiplier * factor, units)
    }

    /// Product of two term-products. Axes present on one side only are copied, shared axes
    /// multiply their units; a base mismatch on a shared axis may split the result into
    /// several terms, so the product is a sum.
    pub fn multiply(&self, other: &PEFunction) -> SumOfFunctions {
        let mut partial: Vec<(f64, BTreeMap<String, PEUnit>)> =
            vec![(self.multiplier * other.multiplier, BTreeMap::new())];
        let dims: BTreeSet<&String> = self.units.keys().chain(other.units.keys()).collect();
        for dim in dims {
            let factors = match (self.units.get(dim), other.units.get(dim)) {
                (Some(left), Some(right)) => left.multiply(right),
                (Some(unit), None) | (None, Some(unit)) => vec![(1.0, *unit)],
                (None, None) => continue,
            };
            if factors.len() == 1 {
                let (coefficient, unit) = factors[0];
                for (multiplier, units) in partial.iter_mut() {
                    *multiplier *= coefficient;
                    units.insert(dim.clone(), unit);
                }
            } else {
                partial = partial
                    .iter()
                    .flat_map(|(multiplier, units)| {
                        factors.iter().map(move |(coefficient, unit)| {
                            let mut units = units.clone();
                            units.insert(dim.clone(), *unit);
                            (multiplier * coefficient, units)
                        })
                    })
                    .collect();
            }
        }
        SumOfFunctions::new(
            partial
                .into_iter()
                .map(|(multiplier, units)| PEFunction::new(multiplier, units))
                .collect(),
        )
    }

    /// Reports every shared axis whose base change would leave machine precision.
    pub fn check_base_conversions(&self, other: &PEFunction) -> Vec<FunctionError> {
        let mut issues = Vec::new();
        for (dim, left) in &self.units {
            if let Some(right) = other.units.get(dim) {
                if left.base == right.base {
                    continue;
                }
                // same choice of moved side as PEUnit::multiply
                let (anchor, moved) = if left.d == 0 && right.d > 0 {
                    (right, left)
                } else {
                    (left, right)
                };
                if let Err(err) = moved.check_base_change(anchor.base) {
                    issues.push(err);
                }
            }
        }
        issues
    }
}

impl Default for PEFunction {
    fn default() -> Self {
        PEFunction::constant(0.0)
    }
}

impl fmt::Display for PEFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.multiplier)?;
        for (dim, unit) in &self.units {
            write!(f, "*{}", unit.format_with(dim))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn point(pairs: &[(&str, f64)]) -> Point {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_identity_units_dropped() {
        let f = PEFunction::from_units(2.0, [("x", PEUnit::identity()), ("y", PEUnit::new(0.0, 0.0, 1))]);
        assert_eq!(f.underlying_dimensions().len(), 1);
        assert!(f.units.contains_key("y"));
    }

    #[test]
    fn test_evaluate_ignores_unused_dimensions() {
        // 4 x e^y
        let h = PEFunction::from_units(4.0, [("x", PEUnit::new(0.0, 0.0, 1)), ("y", PEUnit::new(1.0, 0.0, 0))]);
        let value = h.evaluate(&point(&[("x", 2.0), ("y", 1.0), ("z", 100.0)])).unwrap();
        assert_relative_eq!(value, 8.0 * 1.0_f64.exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_evaluate_missing_dimension() {
        let f = PEFunction::univariate(1.0, 0.0, 0.0, 2);
        let err = f.evaluate(&point(&[("x", 2.0)])).unwrap_err();
        assert_eq!(err, FunctionError::MissingDimension(DEFAULT_DIMENSION.to_string()));
    }

    #[test]
    fn test_multiply_disjoint_axes() {
        let f = PEFunction::from_units(2.0, [("x", PEUnit::new(0.0, 0.0, 2))]);
        let g = PEFunction::from_units(3.0, [("y", PEUnit::new(1.0, 0.0, 0))]);
        let product = f.multiply(&g);
        assert_eq!(product.functions.len(), 1);
        let at = point(&[("x", 1.5), ("y", 0.5)]);
        assert_relative_eq!(
            product.evaluate(&at).unwrap(),
            f.evaluate(&at).unwrap() * g.evaluate(&at).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_multiply_with_base_change() {
        let f = PEFunction::from_units(1.0, [("x", PEUnit::new(2.0, 4.0, 5)), ("y", PEUnit::new(0.0, 1.0, 1))]);
        let g = PEFunction::from_units(1.3, [("x", PEUnit::new(2.0, 4.3, 2)), ("y", PEUnit::new(0.0, 2.0, 1))]);
        let product = f.multiply(&g);
        // 3 terms from x times 2 terms from y
        assert_eq!(product.functions.len(), 6);
        for (x, y) in [(2.0, 0.5), (2.5, 3.0), (3.1, -1.0)] {
            let at = point(&[("x", x), ("y", y)]);
            assert_relative_eq!(
                product.evaluate(&at).unwrap(),
                f.evaluate(&at).unwrap() * g.evaluate(&at).unwrap(),
                max_relative = 1e-10
            );
        }
    }

    #[test]
    fn test_check_base_conversions() {
        let f = PEFunction::from_units(1.0, [("t", PEUnit::new(1.0, 2020.0, 0))]);
        let g = PEFunction::from_units(1.0, [("t", PEUnit::new(1.0, 50.0, 0))]);
        assert_eq!(f.check_base_conversions(&g).len(), 1);
        assert!(f.check_base_conversions(&f).is_empty());
    }

    #[test]
    fn test_display() {
        let f = PEFunction::from_units(1.5, [("x", PEUnit::new(0.0, 0.0, 2))]);
        assert_eq!(f.to_string(), "1.5*x^2");
    }
}
