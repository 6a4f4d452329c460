//! Chebyshev approximation of an arbitrary function on a box, returned in the power basis.
//!
//! The target is sampled on the tensor grid of Chebyshev nodes (in parallel, the target may be
//! expensive), the coefficients come from the discrete cosine sums, and every `T_k` is expanded
//! into powers of `x - midpoint` so that the result is an ordinary sum of term-products.
use crate::algebra::algebra_errors::{FunctionError, Result};
use crate::algebra::algebra_traits::{Limits, Point, validate_limits};
use crate::algebra::pe_function::PEFunction;
use crate::algebra::pe_unit::PEUnit;
use crate::algebra::sum_of_functions::SumOfFunctions;
use itertools::Itertools;
use log::info;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// nodes `z_k = -cos((2k - 1) pi / (2n))`, `k = 1..=n`, ascending in `[-1, 1]`
pub fn chebyshev_nodes(n: usize) -> Vec<f64> {
    (1..=n)
        .map(|k| -((2 * k - 1) as f64 * PI / (2 * n) as f64).cos())
        .collect()
}

/// power coefficients of `T_0..T_{terms-1}`: row `j` holds the coefficients of `T_j(z)`
pub fn chebyshev_power_coefficients(terms: usize) -> Vec<Vec<f64>> {
    let mut polynomials: Vec<Vec<f64>> = Vec::with_capacity(terms);
    for j in 0..terms {
        let polynomial = match j {
            0 => vec![1.0],
            1 => vec![0.0, 1.0],
            _ => {
                // T_j = 2 z T_{j-1} - T_{j-2}
                let mut next = vec![0.0; j + 1];
                for (power, coefficient) in polynomials[j - 1].iter().enumerate() {
                    next[power + 1] += 2.0 * coefficient;
                }
                for (power, coefficient) in polynomials[j - 2].iter().enumerate() {
                    next[power] -= coefficient;
                }
                next
            }
        };
        polynomials.push(polynomial);
    }
    polynomials
}

fn chebyshev_values(z: f64, terms: usize) -> Vec<f64> {
    let mut values = Vec::with_capacity(terms);
    for j in 0..terms {
        let value = match j {
            0 => 1.0,
            1 => z,
            _ => 2.0 * z * values[j - 1] - values[j - 2],
        };
        values.push(value);
    }
    values
}

/// Approximates `func` on the box `limits` by a Chebyshev expansion with `terms` polynomials per
/// dimension, fitted on `nodes` Chebyshev nodes per dimension.
pub fn create_chebyshev_approximation<F>(
    func: F,
    nodes: usize,
    terms: usize,
    limits: &Limits,
) -> Result<SumOfFunctions>
where
    F: Fn(&Point) -> f64 + Sync,
{
    if terms == 0 || nodes < terms {
        return Err(FunctionError::InvalidInput(format!(
            "need 0 < terms <= nodes, got {} terms and {} nodes",
            terms, nodes
        )));
    }
    if limits.is_empty() {
        return Err(FunctionError::InvalidInput(
            "no dimensions to approximate over".to_string(),
        ));
    }
    validate_limits(limits)?;
    if let Some((dim, _)) = limits.iter().find(|(_, (lower, upper))| {
        !(lower < upper && lower.is_finite() && upper.is_finite())
    }) {
        return Err(FunctionError::InvalidInput(format!(
            "bounds of '{}' must be finite and increasing",
            dim
        )));
    }
    let dims: Vec<&String> = limits.keys().collect();
    let z = chebyshev_nodes(nodes);
    let mapped: Vec<Vec<f64>> = limits
        .values()
        .map(|(lower, upper)| {
            z.iter()
                .map(|zk| lower + (zk + 1.0) * (upper - lower) / 2.0)
                .collect()
        })
        .collect();
    // tensor grid of node indices, sampled in parallel
    let grid: Vec<Vec<usize>> = (0..dims.len())
        .map(|_| 0..nodes)
        .multi_cartesian_product()
        .collect();
    let samples: Vec<f64> = grid
        .par_iter()
        .map(|indices| {
            let point: Point = dims
                .iter()
                .zip(indices.iter())
                .enumerate()
                .map(|(d, (dim, k))| ((*dim).clone(), mapped[d][*k]))
                .collect();
            func(&point)
        })
        .collect();
    if let Some(bad) = samples.iter().position(|value| !value.is_finite()) {
        return Err(FunctionError::DomainError(format!(
            "target is not finite at grid node {:?}",
            grid[bad]
        )));
    }
    let node_values: Vec<Vec<f64>> = z.iter().map(|zk| chebyshev_values(*zk, terms)).collect();
    let powers = chebyshev_power_coefficients(terms);
    // per dimension: coefficients of T_j in powers of (x - midpoint)
    let scaled: Vec<Vec<Vec<f64>>> = limits
        .values()
        .map(|(lower, upper)| {
            let factor = 2.0 / (upper - lower);
            powers
                .iter()
                .map(|polynomial| {
                    polynomial
                        .iter()
                        .enumerate()
                        .map(|(m, coefficient)| coefficient * factor.powi(m as i32))
                        .collect()
                })
                .collect()
        })
        .collect();
    let mut expansion: BTreeMap<Vec<usize>, f64> = BTreeMap::new();
    let total = nodes.pow(dims.len() as u32) as f64;
    for alpha in (0..dims.len()).map(|_| 0..terms).multi_cartesian_product() {
        let weight: f64 = alpha
            .iter()
            .map(|j| if *j == 0 { 1.0 } else { 2.0 })
            .product::<f64>()
            / total;
        let sum: f64 = grid
            .iter()
            .zip(samples.iter())
            .map(|(indices, value)| {
                value
                    * indices
                        .iter()
                        .zip(alpha.iter())
                        .map(|(k, j)| node_values[*k][*j])
                        .product::<f64>()
            })
            .sum();
        let coefficient = weight * sum;
        // product over dimensions of the power expansions of T_{alpha_d}
        for monomial in alpha
            .iter()
            .enumerate()
            .map(|(d, j)| scaled[d][*j].iter().copied().enumerate().collect::<Vec<_>>())
            .multi_cartesian_product()
        {
            let exponents: Vec<usize> = monomial.iter().map(|(m, _)| *m).collect();
            let value = coefficient * monomial.iter().map(|(_, c)| c).product::<f64>();
            *expansion.entry(exponents).or_insert(0.0) += value;
        }
    }
    let midpoints: Vec<f64> = limits
        .values()
        .map(|(lower, upper)| (lower + upper) / 2.0)
        .collect();
    let functions = expansion
        .into_iter()
        .map(|(exponents, coefficient)| {
            let units = dims
                .iter()
                .zip(exponents.iter())
                .enumerate()
                .map(|(d, (dim, m))| ((*dim).clone(), PEUnit::new(0.0, midpoints[d], *m as u32)));
            PEFunction::from_units(coefficient, units)
        })
        .collect();
    info!(
        "Chebyshev approximation over {} dimensions with {} terms on {} nodes",
        dims.len(),
        terms,
        nodes
    );
    Ok(SumOfFunctions::new(functions))
}
