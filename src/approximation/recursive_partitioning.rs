//! Recursive partitioning: the predictor space is split into boxes, each fitted by its own
//! linear regression. Every step splits the one box along the one predictor that reduces the
//! total residual sum of squares the most.
use crate::Utils::logger::init_logger;
use crate::algebra::algebra_errors::{FunctionError, Result};
use crate::algebra::pe_function::PEFunction;
use crate::algebra::pe_unit::PEUnit;
use crate::algebra::piecewise_function::{Interval, PiecewiseFunction, Subdomain};
use crate::algebra::sum_of_functions::SumOfFunctions;
use crate::approximation::data_table::DataTable;
use crate::approximation::fit_config::FitConfig;
use crate::approximation::ols::least_squares;
use crate::approximation::split_search::search_split;
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct RecursivePartition {
    pub function: PiecewiseFunction,
    pub regions: Vec<Subdomain>,
    /// per region: intercept, then one slope per predictor
    pub coefficients: Vec<Vec<f64>>,
    pub rss: f64,
}

#[derive(Debug, Clone)]
struct Region {
    subdomain: Subdomain,
    rows: Vec<usize>,
    coefficients: Vec<f64>,
    rss: f64,
}

/// Linear regression on the rows of one region, the mean when the regression is singular or
/// the region holds too few rows.
fn local_fit(rows: &[usize], columns: &[&[f64]], y: &[f64]) -> (Vec<f64>, f64) {
    let target = DVector::from_iterator(rows.len(), rows.iter().map(|row| y[*row]));
    let width = columns.len() + 1;
    if rows.len() > width {
        let design = DMatrix::from_fn(rows.len(), width, |i, j| {
            if j == 0 { 1.0 } else { columns[j - 1][rows[i]] }
        });
        if let Ok((beta, rss)) = least_squares(&design, &target) {
            return (beta.iter().copied().collect(), rss);
        }
    }
    let mean = if rows.is_empty() { 0.0 } else { target.mean() };
    let rss = target.iter().map(|value| (value - mean).powi(2)).sum();
    let mut coefficients = vec![0.0; width];
    coefficients[0] = mean;
    (coefficients, rss)
}

/// `region ∩ {dim < knot}` and `region ∩ {dim >= knot}`
fn split_subdomain(subdomain: &Subdomain, dim: &str, knot: f64) -> Option<(Subdomain, Subdomain)> {
    let current = subdomain.get(dim).copied().unwrap_or_default();
    let below = current.intersect(&Interval::open(f64::NEG_INFINITY, knot))?;
    let above = current.intersect(&Interval::at_least(knot))?;
    let mut left = subdomain.clone();
    left.insert(dim.to_string(), below);
    let mut right = subdomain.clone();
    right.insert(dim.to_string(), above);
    Some((left, right))
}

fn region_function(coefficients: &[f64], predictors: &[String]) -> SumOfFunctions {
    let mut terms = vec![PEFunction::constant(coefficients[0])];
    terms.extend(
        predictors
            .iter()
            .zip(coefficients.iter().skip(1))
            .map(|(dim, slope)| PEFunction::from_units(*slope, [(dim.as_str(), PEUnit::new(0.0, 0.0, 1))])),
    );
    SumOfFunctions::new(terms)
}

/// Recursive partitioning fit of `target` on `predictors`. A split needs
/// `min_points_per_region` rows on each side. Fails with `NonConvergence` when no split improves
/// the fit on the first step while at least one split is allowed.
pub fn create_recursive_partitioning(
    table: &DataTable,
    target: &str,
    predictors: &[String],
    config: &FitConfig,
) -> Result<RecursivePartition> {
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
    let y = table.column(target)?;
    let columns = table.columns_of(predictors)?;
    let all_rows: Vec<usize> = (0..n).collect();
    let (coefficients, rss) = local_fit(&all_rows, &columns, y);
    let mut regions = vec![Region {
        subdomain: predictors
            .iter()
            .map(|dim| (dim.clone(), Interval::unbounded()))
            .collect(),
        rows: all_rows,
        coefficients,
        rss,
    }];
    let rss_floor = f64::EPSILON * y.iter().map(|value| value * value).sum::<f64>();
    let min_points = config.min_points_per_region;
    info!("recursive partitioning started: {} rows, rss = {:e}", n, rss);
    for step in 0..config.max_splits {
        let total_rss: f64 = regions.iter().map(|region| region.rss).sum();
        let pairs: Vec<(usize, usize)> = regions
            .iter()
            .enumerate()
            .filter(|(_, region)| region.rows.len() >= 2 * min_points)
            .flat_map(|(r, _)| (0..predictors.len()).map(move |p| (r, p)))
            .collect();
        // (region, predictor, knot, gain)
        let candidates: Vec<(usize, usize, f64, f64)> = pairs
            .par_iter()
            .filter_map(|&(r, p)| {
                let region = &regions[r];
                let values: Vec<f64> = region.rows.iter().map(|row| columns[p][*row]).collect();
                let score = |knot: f64| -> Option<f64> {
                    let (left, right): (Vec<usize>, Vec<usize>) =
                        region.rows.iter().copied().partition(|row| columns[p][*row] < knot);
                    if left.len() < min_points || right.len() < min_points {
                        return None;
                    }
                    let (_, left_rss) = local_fit(&left, &columns, y);
                    let (_, right_rss) = local_fit(&right, &columns, y);
                    Some(left_rss + right_rss)
                };
                search_split(&values, config.node_count, config.relative_tolerance, score)
                    .map(|(knot, split_rss)| (r, p, knot, region.rss - split_rss))
            })
            .collect();
        // largest gain, ties to the earlier region and predictor
        let best = candidates
            .into_iter()
            .fold(None, |best: Option<(usize, usize, f64, f64)>, candidate| match best {
                Some(best) if best.3 >= candidate.3 => Some(best),
                _ => Some(candidate),
            });
        let accepted = best.filter(|(r, p, knot, gain)| {
            let improvement = if total_rss > rss_floor { gain / total_rss } else { 0.0 };
            debug!(
                "step {}: best split of region {} on '{}' at {}, relative improvement {:e}",
                step, r, predictors[*p], knot, improvement
            );
            improvement > config.relative_tolerance
        });
        let split = accepted.and_then(|(r, p, knot, _)| {
            split_subdomain(&regions[r].subdomain, &predictors[p], knot).map(|sides| (r, p, knot, sides))
        });
        let Some((r, p, knot, (left_subdomain, right_subdomain))) = split else {
            if step == 0 {
                return Err(FunctionError::NonConvergence(
                    "no split improves the fit beyond the relative tolerance".to_string(),
                ));
            }
            break;
        };
        let region = regions.remove(r);
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            region.rows.iter().copied().partition(|row| columns[p][*row] < knot);
        let (left_coefficients, left_rss) = local_fit(&left_rows, &columns, y);
        let (right_coefficients, right_rss) = local_fit(&right_rows, &columns, y);
        info!(
            "step {}: split on '{}' at {}, region rss {:e} -> {:e}",
            step,
            predictors[p],
            knot,
            region.rss,
            left_rss + right_rss
        );
        regions.insert(
            r,
            Region {
                subdomain: right_subdomain,
                rows: right_rows,
                coefficients: right_coefficients,
                rss: right_rss,
            },
        );
        regions.insert(
            r,
            Region {
                subdomain: left_subdomain,
                rows: left_rows,
                coefficients: left_coefficients,
                rss: left_rss,
            },
        );
    }
    let function = PiecewiseFunction::new(
        regions
            .iter()
            .map(|region| {
                (
                    region.subdomain.clone(),
                    region_function(&region.coefficients, predictors),
                )
            })
            .collect(),
    );
    Ok(RecursivePartition {
        function,
        regions: regions.iter().map(|region| region.subdomain.clone()).collect(),
        coefficients: regions.iter().map(|region| region.coefficients.clone()).collect(),
        rss: regions.iter().map(|region| region.rss).sum(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_fit_falls_back_to_mean() {
        let x = vec![1.0, 1.0, 1.0, 1.0];
        let y = vec![1.0, 2.0, 3.0, 6.0];
        let columns = vec![x.as_slice()];
        // constant predictor makes the regression singular
        let (coefficients, rss) = local_fit(&[0, 1, 2, 3], &columns, &y);
        assert_eq!(coefficients, vec![3.0, 0.0]);
        assert_eq!(rss, 4.0 + 1.0 + 0.0 + 9.0);
    }

    #[test]
    fn test_split_subdomain() {
        let subdomain = Subdomain::from([("x".to_string(), Interval::closed(0.0, 10.0))]);
        let (left, right) = split_subdomain(&subdomain, "x", 4.0).unwrap();
        assert!(left["x"].contains(3.9) && !left["x"].contains(4.0));
        assert!(right["x"].contains(4.0) && right["x"].contains(10.0));
        assert!(split_subdomain(&subdomain, "x", 11.0).is_none());
    }
}
