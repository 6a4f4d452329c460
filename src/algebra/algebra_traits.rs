//! # Uniform function interface
//!
//! `MultivariateFunction` closes the set of representable function kinds. The unary
//! capabilities shared by every kind (evaluation, differentiation, integration) are the
//! `FunctionOps` trait, dispatched over the enum with `enum_dispatch`; binary operators
//! live in `algebra_ops` and match on pairs of variants.
//!
//! ```
//! use RustedFunctionAlgebra::algebra::algebra_traits::{FunctionOps, MultivariateFunction, Point};
//! use RustedFunctionAlgebra::algebra::pe_function::PEFunction;
//! // f(x) = x^2
//! let f = MultivariateFunction::from(PEFunction::univariate(1.0, 0.0, 0.0, 2));
//! let df = f.derivative("default");
//! let point = Point::from([("default".to_string(), 3.0)]);
//! assert_eq!(df.evaluate(&point).unwrap(), 6.0);
//! ```
use crate::algebra::algebra_errors::{FunctionError, Result};
use crate::algebra::pe_function::PEFunction;
use crate::algebra::piecewise_function::PiecewiseFunction;
use crate::algebra::sum_of_functions::SumOfFunctions;
use crate::algebra::sum_of_piecewise::SumOfPiecewiseFunctions;
use enum_dispatch::enum_dispatch;
use log::warn;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// dimension used by the univariate constructors
pub const DEFAULT_DIMENSION: &str = "default";
/// coordinates by dimension name
pub type Point = BTreeMap<String, f64>;
/// integration bounds `(lower, upper)` by dimension name
pub type Limits = BTreeMap<String, (f64, f64)>;

/// coordinate of `dim`, `MissingDimension` when the point does not assign it
pub fn point_value(point: &Point, dim: &str) -> Result<f64> {
    point
        .get(dim)
        .copied()
        .ok_or_else(|| FunctionError::MissingDimension(dim.to_string()))
}

pub fn validate_limits(limits: &Limits) -> Result<()> {
    for (dim, (lower, upper)) in limits {
        if lower.is_nan() || upper.is_nan() {
            return Err(FunctionError::InvalidInput(format!(
                "integration bounds for '{}' are not numbers",
                dim
            )));
        }
    }
    Ok(())
}

#[enum_dispatch]
#[derive(Clone, Debug, PartialEq)]
pub enum MultivariateFunction {
    PE(PEFunction),
    Sum(SumOfFunctions),
    Piecewise(PiecewiseFunction),
    SumOfPiecewise(SumOfPiecewiseFunctions),
}

#[enum_dispatch(MultivariateFunction)]
pub trait FunctionOps {
    fn evaluate(&self, point: &Point) -> Result<f64>;
    /// partial derivative along `dim`, zero when the function does not use it
    fn derivative(&self, dim: &str) -> MultivariateFunction;
    /// antiderivative along `dim` without integration constant
    fn antiderivative(&self, dim: &str) -> MultivariateFunction;
    /// definite integral over every dimension in `limits`; other dimensions stay free
    fn integral(&self, limits: &Limits) -> Result<MultivariateFunction>;
    fn underlying_dimensions(&self) -> BTreeSet<String>;
}

impl FunctionOps for PEFunction {
    fn evaluate(&self, point: &Point) -> Result<f64> {
        PEFunction::evaluate(self, point)
    }
    fn derivative(&self, dim: &str) -> MultivariateFunction {
        MultivariateFunction::Sum(self.differentiate(dim)).simplify()
    }
    fn antiderivative(&self, dim: &str) -> MultivariateFunction {
        MultivariateFunction::Sum(self.antidifferentiate(dim)).simplify()
    }
    fn integral(&self, limits: &Limits) -> Result<MultivariateFunction> {
        validate_limits(limits)?;
        Ok(MultivariateFunction::PE(self.integrate(limits)))
    }
    fn underlying_dimensions(&self) -> BTreeSet<String> {
        PEFunction::underlying_dimensions(self)
    }
}

impl FunctionOps for SumOfFunctions {
    fn evaluate(&self, point: &Point) -> Result<f64> {
        SumOfFunctions::evaluate(self, point)
    }
    fn derivative(&self, dim: &str) -> MultivariateFunction {
        MultivariateFunction::Sum(self.differentiate(dim)).simplify()
    }
    fn antiderivative(&self, dim: &str) -> MultivariateFunction {
        MultivariateFunction::Sum(self.antidifferentiate(dim)).simplify()
    }
    fn integral(&self, limits: &Limits) -> Result<MultivariateFunction> {
        validate_limits(limits)?;
        Ok(MultivariateFunction::Sum(self.integrate(limits)).simplify())
    }
    fn underlying_dimensions(&self) -> BTreeSet<String> {
        SumOfFunctions::underlying_dimensions(self)
    }
}

impl FunctionOps for PiecewiseFunction {
    fn evaluate(&self, point: &Point) -> Result<f64> {
        PiecewiseFunction::evaluate(self, point)
    }
    fn derivative(&self, dim: &str) -> MultivariateFunction {
        MultivariateFunction::Piecewise(self.differentiate(dim))
    }
    fn antiderivative(&self, dim: &str) -> MultivariateFunction {
        MultivariateFunction::Piecewise(self.antidifferentiate(dim))
    }
    fn integral(&self, limits: &Limits) -> Result<MultivariateFunction> {
        Ok(MultivariateFunction::Piecewise(self.integrate(limits)?).simplify())
    }
    fn underlying_dimensions(&self) -> BTreeSet<String> {
        PiecewiseFunction::underlying_dimensions(self)
    }
}

impl FunctionOps for SumOfPiecewiseFunctions {
    fn evaluate(&self, point: &Point) -> Result<f64> {
        SumOfPiecewiseFunctions::evaluate(self, point)
    }
    fn derivative(&self, dim: &str) -> MultivariateFunction {
        MultivariateFunction::SumOfPiecewise(self.differentiate(dim))
    }
    fn antiderivative(&self, dim: &str) -> MultivariateFunction {
        // the constant term becomes a function of `dim`, the result is not separable
        MultivariateFunction::Piecewise(self.to_piecewise().antidifferentiate(dim))
    }
    fn integral(&self, limits: &Limits) -> Result<MultivariateFunction> {
        validate_limits(limits)?;
        Ok(MultivariateFunction::SumOfPiecewise(self.integrate(limits)?).simplify())
    }
    fn underlying_dimensions(&self) -> BTreeSet<String> {
        SumOfPiecewiseFunctions::underlying_dimensions(self)
    }
}

impl MultivariateFunction {
    pub fn constant(value: f64) -> MultivariateFunction {
        MultivariateFunction::PE(PEFunction::constant(value))
    }

    /// Smallest variant that represents the same function: single-term sums become `PE`,
    /// piecewise functions with one unrestricted piece become sums.
    pub fn simplify(self) -> MultivariateFunction {
        match self {
            MultivariateFunction::Sum(sum) => match sum.functions.len() {
                0 => MultivariateFunction::constant(0.0),
                1 => MultivariateFunction::PE(sum.functions[0].clone()),
                _ => MultivariateFunction::Sum(sum),
            },
            MultivariateFunction::Piecewise(piecewise) => match piecewise.as_unrestricted() {
                Some(sum) => MultivariateFunction::Sum(sum.clone()).simplify(),
                None => MultivariateFunction::Piecewise(piecewise),
            },
            MultivariateFunction::SumOfPiecewise(separable) if separable.functions.is_empty() => {
                MultivariateFunction::constant(separable.constant)
            }
            other => other,
        }
    }

    /// `Some(c)` when the function is the same constant everywhere
    pub fn constant_value(&self) -> Option<f64> {
        match self {
            MultivariateFunction::PE(function) if function.is_constant() => {
                Some(function.multiplier)
            }
            MultivariateFunction::PE(_) => None,
            MultivariateFunction::Sum(sum) => sum.constant_value(),
            MultivariateFunction::Piecewise(piecewise) => piecewise.constant_value(),
            MultivariateFunction::SumOfPiecewise(separable) if separable.functions.is_empty() => {
                Some(separable.constant)
            }
            MultivariateFunction::SumOfPiecewise(_) => None,
        }
    }

    pub fn to_sum(&self) -> Option<SumOfFunctions> {
        match self {
            MultivariateFunction::PE(function) => Some(SumOfFunctions::from(function.clone())),
            MultivariateFunction::Sum(sum) => Some(sum.clone()),
            MultivariateFunction::Piecewise(piecewise) => piecewise.as_unrestricted().cloned(),
            MultivariateFunction::SumOfPiecewise(separable) if separable.functions.is_empty() => {
                Some(SumOfFunctions::constant(separable.constant))
            }
            MultivariateFunction::SumOfPiecewise(_) => None,
        }
    }

    /// every kind as a (possibly single piece) piecewise function
    pub fn to_piecewise(&self) -> PiecewiseFunction {
        match self {
            MultivariateFunction::PE(function) => {
                PiecewiseFunction::from_sum(SumOfFunctions::from(function.clone()))
            }
            MultivariateFunction::Sum(sum) => PiecewiseFunction::from_sum(sum.clone()),
            MultivariateFunction::Piecewise(piecewise) => piecewise.clone(),
            MultivariateFunction::SumOfPiecewise(separable) => separable.to_piecewise(),
        }
    }

    /// all term sums inside the function, piece by piece
    fn term_sums(&self) -> Vec<SumOfFunctions> {
        match self {
            MultivariateFunction::PE(function) => vec![SumOfFunctions::from(function.clone())],
            MultivariateFunction::Sum(sum) => vec![sum.clone()],
            MultivariateFunction::Piecewise(piecewise) => piecewise
                .pieces
                .iter()
                .map(|(_, function)| function.clone())
                .collect(),
            MultivariateFunction::SumOfPiecewise(separable) => separable
                .functions
                .values()
                .flat_map(|function| function.pieces.iter().map(|(_, sum)| sum.clone()))
                .collect(),
        }
    }

    /// Base changes that would leave machine precision if `self` and `other` were multiplied.
    /// The product itself is never refused; the issues are logged and returned.
    pub fn check_base_conversions(&self, other: &MultivariateFunction) -> Vec<FunctionError> {
        let mut issues = Vec::new();
        for left in self.term_sums() {
            for right in other.term_sums() {
                issues.extend(left.check_base_conversions(&right));
            }
        }
        for issue in &issues {
            warn!("{}", issue);
        }
        issues
    }
}

impl fmt::Display for MultivariateFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MultivariateFunction::PE(function) => write!(f, "{}", function),
            MultivariateFunction::Sum(sum) => write!(f, "{}", sum),
            MultivariateFunction::Piecewise(piecewise) => write!(f, "{}", piecewise),
            MultivariateFunction::SumOfPiecewise(separable) => write!(f, "{}", separable),
        }
    }
}
