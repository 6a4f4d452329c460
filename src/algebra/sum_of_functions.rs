//! # Sum of term-products
//!
//! `SumOfFunctions` holds an ordered list of `PEFunction` terms and represents their sum.
//! The empty list is the zero function. Every constructor returns the simplified form:
//! terms with identical unit maps are merged (in order of first occurrence) and zero terms
//! are dropped.
use crate::algebra::algebra_errors::{FunctionError, Result};
use crate::algebra::algebra_traits::Point;
use crate::algebra::pe_function::PEFunction;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct SumOfFunctions {
    pub functions: Vec<PEFunction>,
}

impl SumOfFunctions {
    pub fn new(functions: Vec<PEFunction>) -> SumOfFunctions {
        SumOfFunctions { functions }.simplify()
    }
    pub fn zero() -> SumOfFunctions {
        SumOfFunctions {
            functions: Vec::new(),
        }
    }
    pub fn constant(value: f64) -> SumOfFunctions {
        SumOfFunctions::new(vec![PEFunction::constant(value)])
    }

    /// merges terms with the same units, drops zeros
    pub fn simplify(self) -> SumOfFunctions {
        let mut merged: Vec<PEFunction> = Vec::with_capacity(self.functions.len());
        for term in self.functions {
            if term.is_zero() {
                continue;
            }
            match merged.iter_mut().find(|existing| existing.units == term.units) {
                Some(existing) => existing.multiplier += term.multiplier,
                None => merged.push(term),
            }
        }
        merged.retain(|term| !term.is_zero());
        SumOfFunctions { functions: merged }
    }

    pub fn is_zero(&self) -> bool {
        self.functions.is_empty()
    }
    /// `Some(c)` when the sum does not depend on any dimension
    pub fn constant_value(&self) -> Option<f64> {
        if self.functions.iter().all(|term| term.is_constant()) {
            Some(self.functions.iter().map(|term| term.multiplier).sum())
        } else {
            None
        }
    }
    pub fn underlying_dimensions(&self) -> BTreeSet<String> {
        self.functions
            .iter()
            .flat_map(|term| term.units.keys().cloned())
            .collect()
    }

    pub fn evaluate(&self, point: &Point) -> Result<f64> {
        let mut value = 0.0;
        for term in &self.functions {
            value += term.evaluate(point)?;
        }
        Ok(value)
    }

    pub fn add(&self, other: &SumOfFunctions) -> SumOfFunctions {
        let mut functions = self.functions.clone();
        functions.extend(other.functions.iter().cloned());
        SumOfFunctions::new(functions)
    }
    pub fn add_constant(&self, value: f64) -> SumOfFunctions {
        let mut functions = self.functions.clone();
        functions.push(PEFunction::constant(value));
        SumOfFunctions::new(functions)
    }
    pub fn scale(&self, factor: f64) -> SumOfFunctions {
        SumOfFunctions::new(self.functions.iter().map(|term| term.scale(factor)).collect())
    }
    pub fn negate(&self) -> SumOfFunctions {
        self.scale(-1.0)
    }
    pub fn subtract(&self, other: &SumOfFunctions) -> SumOfFunctions {
        self.add(&other.negate())
    }

    /// distributes every pair of terms
    pub fn multiply(&self, other: &SumOfFunctions) -> SumOfFunctions {
        let mut functions = Vec::with_capacity(self.functions.len() * other.functions.len());
        for left in &self.functions {
            for right in &other.functions {
                functions.extend(left.multiply(right).functions);
            }
        }
        SumOfFunctions::new(functions)
    }

    /// nonnegative integer power by repeated squaring
    pub fn pow(&self, exponent: u32) -> SumOfFunctions {
        let mut result = SumOfFunctions::constant(1.0);
        let mut square = self.clone();
        let mut n = exponent;
        while n > 0 {
            if n & 1 == 1 {
                result = result.multiply(&square);
            }
            n >>= 1;
            if n > 0 {
                square = square.multiply(&square);
            }
        }
        result
    }

    pub fn check_base_conversions(&self, other: &SumOfFunctions) -> Vec<FunctionError> {
        let mut issues = Vec::new();
        for left in &self.functions {
            for right in &other.functions {
                issues.extend(left.check_base_conversions(right));
            }
        }
        issues
    }
}

impl From<PEFunction> for SumOfFunctions {
    fn from(function: PEFunction) -> Self {
        SumOfFunctions::new(vec![function])
    }
}

impl fmt::Display for SumOfFunctions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.functions.is_empty() {
            return write!(f, "0");
        }
        let terms: Vec<String> = self.functions.iter().map(|term| term.to_string()).collect();
        write!(f, "{}", terms.join(" + "))
    }
}
