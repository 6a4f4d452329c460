//! # Separable piecewise sum
//!
//! `constant + sum_dim f_dim(dim)` where every `f_dim` is a one dimensional piecewise function
//! of its own dimension only. This is the natural output of additive fits such as MARS: the
//! representation stays small because pieces on different dimensions are never intersected.
//! Adding another separable sum or a constant, or scaling, keeps the form; any other operation
//! goes through `to_piecewise` and loses separability.
use crate::algebra::algebra_errors::{FunctionError, Result};
use crate::algebra::algebra_traits::{Limits, Point};
use crate::algebra::piecewise_function::PiecewiseFunction;
use crate::algebra::sum_of_functions::SumOfFunctions;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct SumOfPiecewiseFunctions {
    pub functions: BTreeMap<String, PiecewiseFunction>,
    pub constant: f64,
}

impl SumOfPiecewiseFunctions {
    /// Fails with `InvalidInput` when a component restricts or uses a dimension other than its key.
    pub fn new(
        functions: BTreeMap<String, PiecewiseFunction>,
        constant: f64,
    ) -> Result<SumOfPiecewiseFunctions> {
        for (dim, function) in &functions {
            let dims = function.underlying_dimensions();
            if let Some(other) = dims.iter().find(|used| *used != dim) {
                return Err(FunctionError::InvalidInput(format!(
                    "component for dimension '{}' depends on '{}'",
                    dim, other
                )));
            }
        }
        Ok(SumOfPiecewiseFunctions {
            functions,
            constant,
        })
    }
    pub fn constant(value: f64) -> SumOfPiecewiseFunctions {
        SumOfPiecewiseFunctions {
            functions: BTreeMap::new(),
            constant: value,
        }
    }

    pub fn evaluate(&self, point: &Point) -> Result<f64> {
        let mut value = self.constant;
        for function in self.functions.values() {
            value += function.evaluate(point)?;
        }
        Ok(value)
    }
    pub fn underlying_dimensions(&self) -> BTreeSet<String> {
        self.functions.keys().cloned().collect()
    }

    /// per-dimension merge, stays separable
    pub fn add(&self, other: &SumOfPiecewiseFunctions) -> SumOfPiecewiseFunctions {
        let mut functions = self.functions.clone();
        for (dim, function) in &other.functions {
            let merged = match functions.get(dim) {
                Some(existing) => existing.add(function),
                None => function.clone(),
            };
            functions.insert(dim.clone(), merged);
        }
        SumOfPiecewiseFunctions {
            functions,
            constant: self.constant + other.constant,
        }
    }
    pub fn add_constant(&self, value: f64) -> SumOfPiecewiseFunctions {
        SumOfPiecewiseFunctions {
            functions: self.functions.clone(),
            constant: self.constant + value,
        }
    }
    pub fn scale(&self, factor: f64) -> SumOfPiecewiseFunctions {
        SumOfPiecewiseFunctions {
            functions: self
                .functions
                .iter()
                .map(|(dim, function)| (dim.clone(), function.scale(factor)))
                .collect(),
            constant: self.constant * factor,
        }
    }

    /// Full piecewise form. Pieces of different dimensions are intersected, so the number of
    /// pieces is the product of the components' piece counts.
    pub fn to_piecewise(&self) -> PiecewiseFunction {
        self.functions.values().fold(
            PiecewiseFunction::from_sum(SumOfFunctions::constant(self.constant)),
            |acc, function| acc.add(function),
        )
    }

    /// Integral over the dimensions in `limits`. Integrated dimensions with a component
    /// contribute their definite integral, the others are weighted by the length of the
    /// integration range their component covers. The result is again separable.
    pub fn integrate(&self, limits: &Limits) -> Result<SumOfPiecewiseFunctions> {
        let widths: BTreeMap<&String, f64> = limits
            .iter()
            .map(|(dim, (lower, upper))| {
                let (from, to, sign) = ordered(*lower, *upper);
                let width = match self.functions.get(dim) {
                    Some(function) => function.covered_length(dim, from, to),
                    None => to - from,
                };
                (dim, sign * width)
            })
            .collect();
        let total_width: f64 = widths.values().product();
        let mut constant = self.constant * total_width;
        let mut functions = BTreeMap::new();
        for (dim, function) in &self.functions {
            match limits.get(dim) {
                Some(&(lower, upper)) => {
                    let other_widths: f64 = widths
                        .iter()
                        .filter(|(other, _)| **other != dim)
                        .map(|(_, width)| width)
                        .product();
                    let single = Limits::from([(dim.clone(), (lower, upper))]);
                    let value = function.integrate(&single)?.constant_value().ok_or_else(|| {
                        // a component with no pieces at all
                        FunctionError::DomainError(format!(
                            "component for '{}' did not integrate to a constant",
                            dim
                        ))
                    })?;
                    constant += value * other_widths;
                }
                None => {
                    functions.insert(dim.clone(), function.scale(total_width));
                }
            }
        }
        Ok(SumOfPiecewiseFunctions {
            functions,
            constant,
        })
    }
}

fn ordered(lower: f64, upper: f64) -> (f64, f64, f64) {
    if lower <= upper {
        (lower, upper, 1.0)
    } else {
        (upper, lower, -1.0)
    }
}

impl fmt::Display for SumOfPiecewiseFunctions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Separable sum, constant {}", self.constant)?;
        for (dim, function) in &self.functions {
            write!(f, "[{}] {}", dim, function)?;
        }
        Ok(())
    }
}
