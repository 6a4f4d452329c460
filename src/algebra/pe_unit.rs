//! # Atomic term
//!
//! A `PEUnit` is the single-axis factor `exp(b*(x - base)) * (x - base)^d` the whole algebra
//! is built from. Products, derivatives and antiderivatives of units are again (short sums of)
//! units, which is what keeps every representable function analytically integrable.
//!
//! Operations that can produce more than one unit return `Vec<(f64, PEUnit)>`: a list of
//! coefficients and units whose sum is the result.
use crate::algebra::algebra_errors::{FunctionError, Result};
use log::warn;
use std::fmt;

/// `exp(b*(x - base)) * (x - base)^d`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PEUnit {
    pub b: f64,
    pub base: f64,
    pub d: u32,
}

impl Default for PEUnit {
    fn default() -> Self {
        PEUnit::identity()
    }
}

impl PEUnit {
    pub fn new(b: f64, base: f64, d: u32) -> PEUnit {
        PEUnit { b, base, d }
    }
    /// the multiplicative identity (b = 0, d = 0)
    pub fn identity() -> PEUnit {
        PEUnit {
            b: 0.0,
            base: 0.0,
            d: 0,
        }
    }
    pub fn is_identity(&self) -> bool {
        self.b == 0.0 && self.d == 0
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let shifted = x - self.base;
        let exp_part = if self.b == 0.0 {
            1.0
        } else {
            (self.b * shifted).exp()
        };
        // powi(0) is 1 even for a zero shift
        exp_part * shifted.powi(self.d as i32)
    }

    /// Factor that moves `exp(b*(x - from))` to `exp(b*(x - to))`:
    /// exp(b*(x - from)) = exp(b*(x - to)) * exp(b*(to - from)).
    /// Large separations overflow to `inf` or underflow to `0` and that is left as it is.
    pub fn base_change_factor(b: f64, from: f64, to: f64) -> f64 {
        if b == 0.0 {
            1.0
        } else {
            (b * (to - from)).exp()
        }
    }

    /// Checks whether re-basing this unit onto `new_base` stays inside machine precision.
    /// Never called by the algebra itself: terms frequently cancel analytically, so a failing
    /// factor is not necessarily a wrong result.
    pub fn check_base_change(&self, new_base: f64) -> Result<()> {
        if self.is_identity() || self.base == new_base {
            return Ok(());
        }
        let factor = PEUnit::base_change_factor(self.b, self.base, new_base);
        let shift_power = (new_base - self.base).abs().powi(self.d as i32);
        if !factor.is_normal() || !shift_power.is_finite() {
            warn!(
                "base change from {} to {} with rate {} is outside machine precision",
                self.base, new_base, self.b
            );
            return Err(FunctionError::BaseConversionPrecision {
                rate: self.b,
                from: self.base,
                to: new_base,
            });
        }
        Ok(())
    }

    /// Rewrites the unit around `new_base`. The exponential gives a constant factor, the power
    /// is expanded binomially: (x - x0)^d = sum_k C(d,k) (x1 - x0)^(d-k) (x - x1)^k
    pub fn change_base(&self, new_base: f64) -> Vec<(f64, PEUnit)> {
        if self.base == new_base {
            return vec![(1.0, *self)];
        }
        if self.is_identity() {
            return vec![(1.0, PEUnit::new(0.0, new_base, 0))];
        }
        let factor = PEUnit::base_change_factor(self.b, self.base, new_base);
        let shift = new_base - self.base;
        let d = self.d;
        (0..=d)
            .rev()
            .map(|k| {
                let coefficient = factor * binomial(d, k) * shift.powi((d - k) as i32);
                (coefficient, PEUnit::new(self.b, new_base, k))
            })
            .collect()
    }

    /// Product of two units on the same axis. Rates add and powers add once both
    /// units share a base; otherwise one of them is re-based first.
    pub fn multiply(&self, other: &PEUnit) -> Vec<(f64, PEUnit)> {
        if other.is_identity() {
            return vec![(1.0, *self)];
        }
        if self.is_identity() {
            return vec![(1.0, *other)];
        }
        if self.base == other.base {
            return vec![(
                1.0,
                PEUnit::new(self.b + other.b, self.base, self.d + other.d),
            )];
        }
        // re-base the side without a power when possible, it needs no binomial expansion
        let (anchor, moved) = if self.d == 0 && other.d > 0 {
            (other, self)
        } else {
            (self, other)
        };
        moved
            .change_base(anchor.base)
            .into_iter()
            .map(|(coefficient, unit)| {
                (
                    coefficient,
                    PEUnit::new(anchor.b + unit.b, anchor.base, anchor.d + unit.d),
                )
            })
            .collect()
    }

    /// d/dx [exp(b(x-x0))(x-x0)^d] = b exp(..)(x-x0)^d + d exp(..)(x-x0)^(d-1)
    pub fn derivative(&self) -> Vec<(f64, PEUnit)> {
        let mut terms = Vec::with_capacity(2);
        if self.b != 0.0 {
            terms.push((self.b, *self));
        }
        if self.d > 0 {
            terms.push((self.d as f64, PEUnit::new(self.b, self.base, self.d - 1)));
        }
        terms
    }

    /// Antiderivative without integration constant.
    /// For b != 0 repeated integration by parts gives
    /// exp(bt) * sum_{k=0..d} (-1)^k d!/(d-k)! t^(d-k) / b^(k+1),  t = x - x0
    pub fn antiderivative(&self) -> Vec<(f64, PEUnit)> {
        if self.b == 0.0 {
            let new_power = self.d + 1;
            return vec![(
                1.0 / new_power as f64,
                PEUnit::new(0.0, self.base, new_power),
            )];
        }
        let mut terms = Vec::with_capacity(self.d as usize + 1);
        let mut falling_factorial = 1.0;
        let mut b_power = self.b;
        for k in 0..=self.d {
            if k > 0 {
                falling_factorial *= (self.d - k + 1) as f64;
                b_power *= self.b;
            }
            let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
            terms.push((
                sign * falling_factorial / b_power,
                PEUnit::new(self.b, self.base, self.d - k),
            ));
        }
        terms
    }

    /// definite integral over [lower, upper]
    pub fn integral(&self, lower: f64, upper: f64) -> f64 {
        self.antiderivative()
            .iter()
            .map(|(coefficient, unit)| coefficient * (unit.evaluate(upper) - unit.evaluate(lower)))
            .sum()
    }

    /// human readable form with the axis name substituted for x
    pub fn format_with(&self, dim: &str) -> String {
        let shifted = if self.base == 0.0 {
            dim.to_string()
        } else if self.base > 0.0 {
            format!("({} - {})", dim, self.base)
        } else {
            format!("({} + {})", dim, -self.base)
        };
        let mut parts = Vec::new();
        if self.b != 0.0 {
            parts.push(format!("exp({}*{})", self.b, shifted));
        }
        match self.d {
            0 => {}
            1 => parts.push(shifted),
            d => parts.push(format!("{}^{}", shifted, d)),
        }
        if parts.is_empty() {
            "1".to_string()
        } else {
            parts.join("*")
        }
    }
}

impl fmt::Display for PEUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.format_with("x"))
    }
}

/// n choose k as f64
pub fn binomial(n: u32, k: u32) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}
