//! # Operators on multivariate functions
//!
//! `+`, `-` and `*` between functions and with `f64` on either side, unary `-` and `/ f64`.
//! All operators work on references and owned values and never modify their operands.
//!
//! | left \ right | PE / Sum | Piecewise | SumOfPiecewise |
//! |---|---|---|---|
//! | PE / Sum | Sum | Piecewise | Piecewise (constants stay separable) |
//! | Piecewise | Piecewise | Piecewise | Piecewise |
//! | SumOfPiecewise | Piecewise (constants stay separable) | Piecewise | SumOfPiecewise for `+` |
//!
//! Division by a function and negative or fractional powers are not representable and
//! return `UnsupportedOperation` through the `try_*` methods.
use crate::algebra::algebra_errors::{FunctionError, Result};
use crate::algebra::algebra_traits::MultivariateFunction;
use crate::algebra::sum_of_functions::SumOfFunctions;
use std::ops::{Add, Div, Mul, Neg, Sub};

use MultivariateFunction::{PE, Piecewise, Sum, SumOfPiecewise};

fn add_functions(left: &MultivariateFunction, right: &MultivariateFunction) -> MultivariateFunction {
    match (left, right) {
        (SumOfPiecewise(a), SumOfPiecewise(b)) => SumOfPiecewise(a.add(b)),
        (SumOfPiecewise(a), other) | (other, SumOfPiecewise(a)) if other.constant_value().is_some() => {
            let value = other.constant_value().unwrap_or_default();
            SumOfPiecewise(a.add_constant(value))
        }
        (PE(_) | Sum(_), PE(_) | Sum(_)) => match (left.to_sum(), right.to_sum()) {
            (Some(a), Some(b)) => Sum(a.add(&b)).simplify(),
            _ => Piecewise(left.to_piecewise().add(&right.to_piecewise())),
        },
        (Piecewise(a), other) | (other, Piecewise(a)) if other.to_sum().is_some() => {
            let sum = other.to_sum().unwrap_or_default();
            Piecewise(a.add_sum(&sum))
        }
        _ => Piecewise(left.to_piecewise().add(&right.to_piecewise())),
    }
}

fn multiply_functions(left: &MultivariateFunction, right: &MultivariateFunction) -> MultivariateFunction {
    if let (Some(a), Some(b)) = (left.constant_value(), right.constant_value()) {
        return MultivariateFunction::constant(a * b);
    }
    match (left, right) {
        (SumOfPiecewise(a), other) | (other, SumOfPiecewise(a)) if other.constant_value().is_some() => {
            let value = other.constant_value().unwrap_or_default();
            SumOfPiecewise(a.scale(value))
        }
        (PE(a), PE(b)) => Sum(a.multiply(b)).simplify(),
        (PE(_) | Sum(_), PE(_) | Sum(_)) => match (left.to_sum(), right.to_sum()) {
            (Some(a), Some(b)) => Sum(a.multiply(&b)).simplify(),
            _ => Piecewise(left.to_piecewise().multiply(&right.to_piecewise())),
        },
        (Piecewise(a), other) | (other, Piecewise(a)) if other.to_sum().is_some() => {
            let sum = other.to_sum().unwrap_or_default();
            Piecewise(a.multiply_sum(&sum))
        }
        _ => Piecewise(left.to_piecewise().multiply(&right.to_piecewise())),
    }
}

fn scale_function(function: &MultivariateFunction, factor: f64) -> MultivariateFunction {
    match function {
        PE(f) => PE(f.scale(factor)),
        Sum(f) => Sum(f.scale(factor)).simplify(),
        Piecewise(f) => Piecewise(f.scale(factor)),
        SumOfPiecewise(f) => SumOfPiecewise(f.scale(factor)),
    }
}

fn shift_function(function: &MultivariateFunction, value: f64) -> MultivariateFunction {
    match function {
        PE(f) => Sum(SumOfFunctions::from(f.clone()).add_constant(value)).simplify(),
        Sum(f) => Sum(f.add_constant(value)).simplify(),
        Piecewise(f) => Piecewise(f.add_constant(value)),
        SumOfPiecewise(f) => SumOfPiecewise(f.add_constant(value)),
    }
}

impl MultivariateFunction {
    /// `self^exponent` by repeated squaring, `f^0 = 1`
    pub fn pow(&self, exponent: u32) -> MultivariateFunction {
        if exponent == 0 {
            return MultivariateFunction::constant(1.0);
        }
        match self {
            PE(_) | Sum(_) => match self.to_sum() {
                Some(sum) => Sum(sum.pow(exponent)).simplify(),
                None => Piecewise(self.to_piecewise().pow(exponent)),
            },
            Piecewise(f) => Piecewise(f.pow(exponent)),
            SumOfPiecewise(f) => Piecewise(f.to_piecewise().pow(exponent)),
        }
    }

    /// Division by a function is only defined when the divisor is a nonzero constant.
    pub fn try_div(&self, divisor: &MultivariateFunction) -> Result<MultivariateFunction> {
        match divisor.constant_value() {
            Some(value) if value != 0.0 => Ok(scale_function(self, 1.0 / value)),
            Some(_) => Err(FunctionError::UnsupportedOperation(
                "division by the zero function".to_string(),
            )),
            None => Err(FunctionError::UnsupportedOperation(
                "division by a non-constant function".to_string(),
            )),
        }
    }

    pub fn try_powi(&self, exponent: i32) -> Result<MultivariateFunction> {
        if exponent < 0 {
            return Err(FunctionError::UnsupportedOperation(format!(
                "negative power {}",
                exponent
            )));
        }
        Ok(self.pow(exponent as u32))
    }

    pub fn try_powf(&self, exponent: f64) -> Result<MultivariateFunction> {
        if exponent < 0.0 || exponent.fract() != 0.0 || exponent > u32::MAX as f64 {
            return Err(FunctionError::UnsupportedOperation(format!(
                "power {} is not a nonnegative integer",
                exponent
            )));
        }
        Ok(self.pow(exponent as u32))
    }
}

impl Add<&MultivariateFunction> for &MultivariateFunction {
    type Output = MultivariateFunction;
    fn add(self, rhs: &MultivariateFunction) -> MultivariateFunction {
        add_functions(self, rhs)
    }
}

impl Sub<&MultivariateFunction> for &MultivariateFunction {
    type Output = MultivariateFunction;
    fn sub(self, rhs: &MultivariateFunction) -> MultivariateFunction {
        add_functions(self, &scale_function(rhs, -1.0))
    }
}

impl Mul<&MultivariateFunction> for &MultivariateFunction {
    type Output = MultivariateFunction;
    fn mul(self, rhs: &MultivariateFunction) -> MultivariateFunction {
        multiply_functions(self, rhs)
    }
}

impl Neg for &MultivariateFunction {
    type Output = MultivariateFunction;
    fn neg(self) -> MultivariateFunction {
        scale_function(self, -1.0)
    }
}

impl Neg for MultivariateFunction {
    type Output = MultivariateFunction;
    fn neg(self) -> MultivariateFunction {
        scale_function(&self, -1.0)
    }
}

impl Add<f64> for &MultivariateFunction {
    type Output = MultivariateFunction;
    fn add(self, rhs: f64) -> MultivariateFunction {
        shift_function(self, rhs)
    }
}

impl Sub<f64> for &MultivariateFunction {
    type Output = MultivariateFunction;
    fn sub(self, rhs: f64) -> MultivariateFunction {
        shift_function(self, -rhs)
    }
}

impl Mul<f64> for &MultivariateFunction {
    type Output = MultivariateFunction;
    fn mul(self, rhs: f64) -> MultivariateFunction {
        scale_function(self, rhs)
    }
}

impl Div<f64> for &MultivariateFunction {
    type Output = MultivariateFunction;
    fn div(self, rhs: f64) -> MultivariateFunction {
        scale_function(self, 1.0 / rhs)
    }
}

impl Add<&MultivariateFunction> for f64 {
    type Output = MultivariateFunction;
    fn add(self, rhs: &MultivariateFunction) -> MultivariateFunction {
        shift_function(rhs, self)
    }
}

impl Sub<&MultivariateFunction> for f64 {
    type Output = MultivariateFunction;
    fn sub(self, rhs: &MultivariateFunction) -> MultivariateFunction {
        shift_function(&scale_function(rhs, -1.0), self)
    }
}

impl Mul<&MultivariateFunction> for f64 {
    type Output = MultivariateFunction;
    fn mul(self, rhs: &MultivariateFunction) -> MultivariateFunction {
        scale_function(rhs, self)
    }
}

/// owned operands forward to the reference implementations
macro_rules! forward_owned_ops {
    ($($trait_name:ident, $method:ident);*) => {
        $(
            impl $trait_name<MultivariateFunction> for MultivariateFunction {
                type Output = MultivariateFunction;
                fn $method(self, rhs: MultivariateFunction) -> MultivariateFunction {
                    (&self).$method(&rhs)
                }
            }
            impl $trait_name<&MultivariateFunction> for MultivariateFunction {
                type Output = MultivariateFunction;
                fn $method(self, rhs: &MultivariateFunction) -> MultivariateFunction {
                    (&self).$method(rhs)
                }
            }
            impl $trait_name<MultivariateFunction> for &MultivariateFunction {
                type Output = MultivariateFunction;
                fn $method(self, rhs: MultivariateFunction) -> MultivariateFunction {
                    self.$method(&rhs)
                }
            }
            impl $trait_name<f64> for MultivariateFunction {
                type Output = MultivariateFunction;
                fn $method(self, rhs: f64) -> MultivariateFunction {
                    (&self).$method(rhs)
                }
            }
            impl $trait_name<MultivariateFunction> for f64 {
                type Output = MultivariateFunction;
                fn $method(self, rhs: MultivariateFunction) -> MultivariateFunction {
                    self.$method(&rhs)
                }
            }
        )*
    };
}

forward_owned_ops!(Add, add; Sub, sub; Mul, mul);

impl Div<f64> for MultivariateFunction {
    type Output = MultivariateFunction;
    fn div(self, rhs: f64) -> MultivariateFunction {
        (&self).div(rhs)
    }
}
