//! Additive MARS (multivariate adaptive regression splines) fit.
//!
//! Starting from the intercept, the fit greedily adds pairs of hinge functions
//! `max(0, x - t)` and `max(0, t - x)` on one predictor at a time. For every predictor the knot
//! `t` is searched on a quantile grid and refined on finer grids; the predictors are searched
//! in parallel. The result is a separable piecewise sum: one piecewise linear function per
//! predictor plus the intercept.
use crate::Utils::logger::init_logger;
use crate::algebra::algebra_errors::{FunctionError, Result};
use crate::algebra::pe_function::PEFunction;
use crate::algebra::pe_unit::PEUnit;
use crate::algebra::piecewise_function::{Interval, PiecewiseFunction};
use crate::algebra::sum_of_functions::SumOfFunctions;
use crate::algebra::sum_of_piecewise::SumOfPiecewiseFunctions;
use crate::approximation::data_table::DataTable;
use crate::approximation::fit_config::FitConfig;
use crate::approximation::ols::least_squares;
use crate::approximation::split_search::search_split;
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use std::collections::BTreeMap;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum HingeDirection {
    /// max(0, x - knot)
    Up,
    /// max(0, knot - x)
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HingeTerm {
    pub dim: String,
    pub knot: f64,
    pub direction: HingeDirection,
}

impl HingeTerm {
    pub fn value(&self, x: f64) -> f64 {
        match self.direction {
            HingeDirection::Up => (x - self.knot).max(0.0),
            HingeDirection::Down => (self.knot - x).max(0.0),
        }
    }
    /// `coefficient * hinge` as a piecewise function of its dimension
    pub fn to_piecewise(&self, coefficient: f64) -> PiecewiseFunction {
        let (below, above) = match self.direction {
            HingeDirection::Up => (0.0, coefficient),
            HingeDirection::Down => (-coefficient, 0.0),
        };
        let linear = |slope: f64| {
            SumOfFunctions::from(PEFunction::from_units(
                slope,
                [(self.dim.as_str(), PEUnit::new(0.0, self.knot, 1))],
            ))
        };
        PiecewiseFunction::univariate(
            vec![
                (
                    Interval::open(f64::NEG_INFINITY, self.knot),
                    linear(below),
                ),
                (Interval::at_least(self.knot), linear(above)),
            ],
            &self.dim,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarsSpline {
    pub function: SumOfPiecewiseFunctions,
    /// intercept first, then one coefficient per hinge
    pub coefficients: Vec<f64>,
    pub hinges: Vec<HingeTerm>,
    pub rss: f64,
}

fn design_matrix(columns: &[Vec<f64>], rows: usize) -> DMatrix<f64> {
    DMatrix::from_fn(rows, columns.len(), |i, j| columns[j][i])
}

/// Fits the current basis plus hinges at `knot`. The pair is tried first; when it makes the
/// design singular the better of the single hinges is used.
fn candidate_fit(
    basis: &[Vec<f64>],
    values: &[f64],
    knot: f64,
    y: &DVector<f64>,
) -> Option<(Vec<HingeDirection>, f64)> {
    let column = |direction: HingeDirection| -> Vec<f64> {
        values
            .iter()
            .map(|x| match direction {
                HingeDirection::Up => (x - knot).max(0.0),
                HingeDirection::Down => (knot - x).max(0.0),
            })
            .collect()
    };
    let fit = |directions: &[HingeDirection]| -> Option<f64> {
        let mut columns = basis.to_vec();
        columns.extend(directions.iter().map(|direction| column(*direction)));
        least_squares(&design_matrix(&columns, values.len()), y)
            .ok()
            .map(|(_, rss)| rss)
    };
    let pair = [HingeDirection::Up, HingeDirection::Down];
    if let Some(rss) = fit(&pair) {
        return Some((pair.to_vec(), rss));
    }
    [HingeDirection::Up, HingeDirection::Down]
        .into_iter()
        .filter_map(|direction| fit(&[direction]).map(|rss| (vec![direction], rss)))
        .fold(None, |best: Option<(Vec<HingeDirection>, f64)>, candidate| match best {
            Some(best) if best.1 <= candidate.1 => Some(best),
            _ => Some(candidate),
        })
}

/// Additive MARS fit of `target` on `predictors`.
/// Fails with `NonConvergence` when no hinge improves the fit on the first step while at least
/// one split is allowed.
pub fn create_mars_spline(
    table: &DataTable,
    target: &str,
    predictors: &[String],
    config: &FitConfig,
) -> Result<MarsSpline> {
    if let Some(level) = &config.loglevel {
        init_logger(Some(level));
    }
    if predictors.is_empty() {
        return Err(FunctionError::InvalidInput("no predictors given".to_string()));
    }
    let n = table.nrows();
    if n < 2 {
        return Err(FunctionError::InsufficientData { needed: 2, got: n });
    }
    let y = DVector::from_column_slice(table.column(target)?);
    let columns = table.columns_of(predictors)?;
    let mut basis: Vec<Vec<f64>> = vec![vec![1.0; n]];
    let mut hinges: Vec<HingeTerm> = Vec::new();
    let (_, mut rss) = least_squares(&design_matrix(&basis, n), &y)?;
    // residuals below this are round-off
    let rss_floor = f64::EPSILON * y.norm_squared();
    info!("MARS started: {} rows, {} predictors, rss = {:e}", n, predictors.len(), rss);
    for step in 0..config.max_splits {
        let candidates: Vec<(usize, f64, f64)> = predictors
            .par_iter()
            .enumerate()
            .filter_map(|(p, _)| {
                let values = columns[p];
                search_split(values, config.node_count, config.relative_tolerance, |knot| {
                    candidate_fit(&basis, values, knot, &y).map(|(_, rss)| rss)
                })
                .map(|(knot, candidate_rss)| (p, knot, candidate_rss))
            })
            .collect();
        // lowest rss, ties to the earlier predictor
        let best = candidates
            .into_iter()
            .fold(None, |best: Option<(usize, f64, f64)>, candidate| match best {
                Some(best) if best.2 <= candidate.2 => Some(best),
                _ => Some(candidate),
            });
        let accepted = best.and_then(|(p, knot, new_rss)| {
            let improvement = if rss > rss_floor {
                (rss - new_rss) / rss
            } else {
                0.0
            };
            debug!(
                "step {}: best hinge on '{}' at {}, relative improvement {:e}",
                step, predictors[p], knot, improvement
            );
            if improvement > config.relative_tolerance {
                candidate_fit(&basis, columns[p], knot, &y).map(|(directions, _)| (p, knot, directions))
            } else {
                None
            }
        });
        let Some((p, knot, directions)) = accepted else {
            if step == 0 {
                return Err(FunctionError::NonConvergence(
                    "no hinge improves the fit beyond the relative tolerance".to_string(),
                ));
            }
            break;
        };
        for direction in directions {
            let hinge = HingeTerm {
                dim: predictors[p].clone(),
                knot,
                direction,
            };
            basis.push(columns[p].iter().map(|x| hinge.value(*x)).collect());
            hinges.push(hinge);
        }
        let (_, new_rss) = least_squares(&design_matrix(&basis, n), &y)?;
        info!(
            "step {}: hinge on '{}' at {}, rss {:e} -> {:e}",
            step, predictors[p], knot, rss, new_rss
        );
        rss = new_rss;
    }
    let (beta, rss) = least_squares(&design_matrix(&basis, n), &y)?;
    let coefficients: Vec<f64> = beta.iter().copied().collect();
    let mut components: BTreeMap<String, PiecewiseFunction> = BTreeMap::new();
    for (hinge, coefficient) in hinges.iter().zip(coefficients.iter().skip(1)) {
        let piece = hinge.to_piecewise(*coefficient);
        let component = match components.remove(&hinge.dim) {
            Some(existing) => existing.add(&piece),
            None => piece,
        };
        components.insert(hinge.dim.clone(), component);
    }
    let function = SumOfPiecewiseFunctions::new(components, coefficients[0])?;
    Ok(MarsSpline {
        function,
        coefficients,
        hinges,
        rss,
    })
}
