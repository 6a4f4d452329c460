//! # Analytic differentiation
//!
//! Partial derivatives and antiderivatives for every function kind, plus the
//! higher-order helpers built on top of them.
//!
//! ## Rules
//! - unit: `d/dx[e^{b(x-x0)}(x-x0)^d] = b e^{..}(x-x0)^d + d e^{..}(x-x0)^{d-1}`
//! - term-product: only the unit on the differentiated dimension changes; a term that does
//!   not use the dimension vanishes
//! - sums: term by term, then simplified
//! - piecewise: piece by piece, subdomains unchanged
//! - separable sum: only the component of the differentiated dimension survives, the other
//!   components keep their subdomains with zero functions so the domain is preserved
//!
//! ## Key Methods
//! - `derivative_n(dim, order)` - repeated partial derivative
//! - `derivative_map(orders)` - mixed partial derivative, e.g. `{x: 1, y: 2}`
//! - `gradient(dims)`, `hessian(dims)` - analytic gradient and Hessian
//! - `jacobian(functions, dims)` - analytic Jacobian of a vector function
use crate::algebra::algebra_traits::{FunctionOps, MultivariateFunction};
use crate::algebra::pe_function::PEFunction;
use crate::algebra::piecewise_function::PiecewiseFunction;
use crate::algebra::sum_of_functions::SumOfFunctions;
use crate::algebra::sum_of_piecewise::SumOfPiecewiseFunctions;
use std::collections::BTreeMap;

impl PEFunction {
    pub fn differentiate(&self, dim: &str) -> SumOfFunctions {
        let Some(unit) = self.units.get(dim) else {
            return SumOfFunctions::zero();
        };
        SumOfFunctions::new(
            unit.derivative()
                .into_iter()
                .map(|(coefficient, derived)| self.with_unit(coefficient, dim, derived))
                .collect(),
        )
    }
    /// A dimension the term does not use is integrated as the identity, i.e. the term
    /// gets multiplied by `dim`.
    pub fn antidifferentiate(&self, dim: &str) -> SumOfFunctions {
        SumOfFunctions::new(
            self.unit(dim)
                .antiderivative()
                .into_iter()
                .map(|(coefficient, unit)| self.with_unit(coefficient, dim, unit))
                .collect(),
        )
    }
}

impl SumOfFunctions {
    pub fn differentiate(&self, dim: &str) -> SumOfFunctions {
        SumOfFunctions::new(
            self.functions
                .iter()
                .flat_map(|term| term.differentiate(dim).functions)
                .collect(),
        )
    }
    pub fn antidifferentiate(&self, dim: &str) -> SumOfFunctions {
        SumOfFunctions::new(
            self.functions
                .iter()
                .flat_map(|term| term.antidifferentiate(dim).functions)
                .collect(),
        )
    }
}

impl PiecewiseFunction {
    pub fn differentiate(&self, dim: &str) -> PiecewiseFunction {
        PiecewiseFunction::new(
            self.pieces
                .iter()
                .map(|(subdomain, function)| (subdomain.clone(), function.differentiate(dim)))
                .collect(),
        )
    }
    /// Piece by piece; no constants are added to make the result continuous across pieces.
    pub fn antidifferentiate(&self, dim: &str) -> PiecewiseFunction {
        PiecewiseFunction::new(
            self.pieces
                .iter()
                .map(|(subdomain, function)| (subdomain.clone(), function.antidifferentiate(dim)))
                .collect(),
        )
    }
}

impl SumOfPiecewiseFunctions {
    pub fn differentiate(&self, dim: &str) -> SumOfPiecewiseFunctions {
        let functions = self
            .functions
            .iter()
            .map(|(component_dim, function)| {
                let derived = if component_dim == dim {
                    function.differentiate(dim)
                } else {
                    function.scale(0.0)
                };
                (component_dim.clone(), derived)
            })
            .collect();
        SumOfPiecewiseFunctions {
            functions,
            constant: 0.0,
        }
    }
}

impl MultivariateFunction {
    pub fn derivative_n(&self, dim: &str, order: u32) -> MultivariateFunction {
        let mut result = self.clone();
        for _ in 0..order {
            result = result.derivative(dim);
        }
        result
    }

    /// mixed partial derivative, `orders` maps dimension to derivative order
    pub fn derivative_map(&self, orders: &BTreeMap<String, u32>) -> MultivariateFunction {
        orders
            .iter()
            .fold(self.clone(), |acc, (dim, order)| acc.derivative_n(dim, *order))
    }

    pub fn gradient(&self, dims: &[String]) -> Vec<MultivariateFunction> {
        dims.iter().map(|dim| self.derivative(dim)).collect()
    }

    /// Hessian matrix, row `i` column `j` is `d2f/(d dims[i] d dims[j])`.
    /// Only the upper triangle is differentiated, the lower one is copied.
    pub fn hessian(&self, dims: &[String]) -> Vec<Vec<MultivariateFunction>> {
        let n = dims.len();
        let gradient = self.gradient(dims);
        let mut hessian: Vec<Vec<MultivariateFunction>> =
            vec![vec![MultivariateFunction::constant(0.0); n]; n];
        for i in 0..n {
            for j in i..n {
                let entry = gradient[i].derivative(&dims[j]);
                if i != j {
                    hessian[j][i] = entry.clone();
                }
                hessian[i][j] = entry;
            }
        }
        hessian
    }
}

/// Jacobian of a vector function, row `i` column `j` is `d functions[i] / d dims[j]`.
pub fn jacobian(functions: &[MultivariateFunction], dims: &[String]) -> Vec<Vec<MultivariateFunction>> {
    functions.iter().map(|function| function.gradient(dims)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::algebra_traits::Point;
    use crate::algebra::pe_unit::PEUnit;
    use crate::algebra::piecewise_function::Interval;
    use approx::assert_relative_eq;

    fn xy(x: f64, y: f64) -> Point {
        Point::from([("x".to_string(), x), ("y".to_string(), y)])
    }
    fn dims() -> Vec<String> {
        vec!["x".to_string(), "y".to_string()]
    }
    /// 4 x e^y ((x - 1)^2 + e^(0.5 y))
    fn sample() -> MultivariateFunction {
        let left = PEFunction::from_units(4.0, [("x", PEUnit::new(0.0, 0.0, 1)), ("y", PEUnit::new(1.0, 0.0, 0))]);
        let right = SumOfFunctions::new(vec![
            PEFunction::from_units(1.0, [("x", PEUnit::new(0.0, 1.0, 2))]),
            PEFunction::from_units(1.0, [("y", PEUnit::new(0.5, 0.0, 0))]),
        ]);
        MultivariateFunction::Sum(SumOfFunctions::from(left).multiply(&right))
    }
    fn numeric_partial(f: &MultivariateFunction, dim: &str, at: &Point) -> f64 {
        let h = 1e-6;
        let mut plus = at.clone();
        let mut minus = at.clone();
        *plus.get_mut(dim).unwrap() += h;
        *minus.get_mut(dim).unwrap() -= h;
        (f.evaluate(&plus).unwrap() - f.evaluate(&minus).unwrap()) / (2.0 * h)
    }

    #[test]
    fn test_derivative_against_finite_differences() {
        let f = sample();
        let at = xy(1.7, 0.4);
        for dim in ["x", "y"] {
            let analytic = f.derivative(dim).evaluate(&at).unwrap();
            assert_relative_eq!(analytic, numeric_partial(&f, dim, &at), max_relative = 1e-6);
        }
    }

    #[test]
    fn test_derivative_of_unused_dimension_is_zero() {
        let f = sample();
        assert_eq!(f.derivative("z").constant_value(), Some(0.0));
    }

    #[test]
    fn test_derivative_n_of_polynomial() {
        // x^3 -> 6
        let f = MultivariateFunction::PE(PEFunction::from_units(1.0, [("x", PEUnit::new(0.0, 0.0, 3))]));
        assert_eq!(f.derivative_n("x", 3).constant_value(), Some(6.0));
        assert_eq!(f.derivative_n("x", 4).constant_value(), Some(0.0));
        assert_eq!(f.derivative_n("x", 0), f);
    }

    #[test]
    fn test_mixed_partials_commute() {
        let f = sample();
        let xy_first = f.derivative("x").derivative("y");
        let yx_first = f.derivative("y").derivative("x");
        let orders = BTreeMap::from([("x".to_string(), 1), ("y".to_string(), 1)]);
        let mixed = f.derivative_map(&orders);
        let at = xy(0.3, -0.8);
        let expected = xy_first.evaluate(&at).unwrap();
        assert_relative_eq!(yx_first.evaluate(&at).unwrap(), expected, max_relative = 1e-12);
        assert_relative_eq!(mixed.evaluate(&at).unwrap(), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_hessian_is_symmetric() {
        let f = sample();
        let hessian = f.hessian(&dims());
        let at = xy(1.1, 0.2);
        assert_eq!(hessian.len(), 2);
        assert_relative_eq!(
            hessian[0][1].evaluate(&at).unwrap(),
            hessian[1][0].evaluate(&at).unwrap(),
            max_relative = 1e-12
        );
        let gradient_x = f.derivative("x");
        assert_relative_eq!(
            hessian[0][1].evaluate(&at).unwrap(),
            numeric_partial(&gradient_x, "y", &at),
            max_relative = 1e-6
        );
    }

    #[test]
    fn test_jacobian_shape() {
        let f = sample();
        let g = MultivariateFunction::PE(PEFunction::from_units(2.0, [("y", PEUnit::new(0.0, 0.0, 1))]));
        let jac = jacobian(&[f, g], &dims());
        assert_eq!(jac.len(), 2);
        assert_eq!(jac[1][0].constant_value(), Some(0.0));
        assert_eq!(jac[1][1].constant_value(), Some(2.0));
    }

    #[test]
    fn test_antiderivative_of_absent_dimension() {
        // the antiderivative of 3 along x is 3x
        let f = MultivariateFunction::constant(3.0);
        let anti = f.antiderivative("x");
        let at = Point::from([("x".to_string(), 2.5)]);
        assert_relative_eq!(anti.evaluate(&at).unwrap(), 7.5);
    }

    #[test]
    fn test_antiderivative_then_derivative() {
        let f = MultivariateFunction::PE(PEFunction::from_units(1.3, [("x", PEUnit::new(-0.7, 2.0, 3))]));
        let back = f.antiderivative("x").derivative("x");
        for x in [0.0, 1.5, 3.3] {
            let at = Point::from([("x".to_string(), x)]);
            assert_relative_eq!(back.evaluate(&at).unwrap(), f.evaluate(&at).unwrap(), max_relative = 1e-10);
        }
    }

    #[test]
    fn test_separable_derivative_keeps_domain() {
        let component = |dim: &str| {
            PiecewiseFunction::univariate(
                vec![(
                    Interval::closed(0.0, 2.0),
                    SumOfFunctions::from(PEFunction::from_units(1.0, [(dim, PEUnit::new(0.0, 0.0, 2))])),
                )],
                dim,
            )
        };
        let f = SumOfPiecewiseFunctions::new(
            BTreeMap::from([("x".to_string(), component("x")), ("y".to_string(), component("y"))]),
            5.0,
        )
        .unwrap();
        let df = MultivariateFunction::SumOfPiecewise(f).derivative("x");
        assert_relative_eq!(df.evaluate(&xy(1.5, 1.0)).unwrap(), 3.0);
        // y outside its component's domain is still outside
        assert!(df.evaluate(&xy(1.5, 3.0)).is_err());
    }
}
