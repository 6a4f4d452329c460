//! Ordinary least squares on a monomial basis of the predictors.
use crate::algebra::algebra_errors::{FunctionError, Result};
use crate::algebra::pe_function::PEFunction;
use crate::algebra::pe_unit::PEUnit;
use crate::Utils::logger::init_logger;
use crate::algebra::sum_of_functions::SumOfFunctions;
use crate::approximation::data_table::DataTable;
use crate::approximation::fit_config::FitConfig;
use itertools::Itertools;
use log::info;
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;

/// Solves the normal equations `X^T X beta = X^T y` by Cholesky. Returns the coefficients and
/// the residual sum of squares. Rank deficient designs give `SingularSystem`.
pub fn least_squares(design: &DMatrix<f64>, y: &DVector<f64>) -> Result<(DVector<f64>, f64)> {
    let (rows, columns) = design.shape();
    if rows < columns {
        return Err(FunctionError::InsufficientData {
            needed: columns,
            got: rows,
        });
    }
    let xtx = design.transpose() * design;
    let xty = design.transpose() * y;
    let cholesky = xtx
        .cholesky()
        .ok_or_else(|| FunctionError::SingularSystem("design matrix is not full rank".to_string()))?;
    let diagonal = cholesky.l_dirty().diagonal();
    let largest = diagonal.max();
    if !(largest > 0.0) || diagonal.min() / largest < f64::EPSILON.sqrt() {
        return Err(FunctionError::SingularSystem(
            "design matrix is not full rank to working precision".to_string(),
        ));
    }
    let beta = cholesky.solve(&xty);
    let residuals = y - design * &beta;
    let rss = residuals.norm_squared();
    Ok((beta, rss))
}

#[derive(Debug, Clone, PartialEq)]
pub struct OlsApproximation {
    pub function: SumOfFunctions,
    /// unit multiplier monomials, aligned with `coefficients`
    pub basis: Vec<PEFunction>,
    pub coefficients: Vec<f64>,
    pub rss: f64,
}

/// monomials of total degree `1..=degree`, with the constant first when `intercept` is set
pub fn monomial_basis(predictors: &[String], degree: usize, intercept: bool) -> Vec<PEFunction> {
    let mut basis = Vec::new();
    if intercept {
        basis.push(PEFunction::constant(1.0));
    }
    for total in 1..=degree {
        for combination in predictors.iter().combinations_with_replacement(total) {
            let powers = combination.into_iter().counts();
            let units = powers
                .into_iter()
                .map(|(dim, power)| (dim.clone(), PEUnit::new(0.0, 0.0, power as u32)))
                .collect::<BTreeMap<String, PEUnit>>();
            basis.push(PEFunction::new(1.0, units));
        }
    }
    basis
}

/// OLS fit of `target` on the monomials of `predictors` up to total degree `config.degree`
pub fn create_ols_approximation(
    table: &DataTable,
    target: &str,
    predictors: &[String],
    config: &FitConfig,
    intercept: bool,
) -> Result<OlsApproximation> {
    if let Some(level) = &config.loglevel {
        init_logger(Some(level));
    }
    let y = DVector::from_column_slice(table.column(target)?);
    let basis = monomial_basis(predictors, config.degree, intercept);
    if basis.is_empty() {
        return Err(FunctionError::InvalidInput(
            "empty regression basis".to_string(),
        ));
    }
    let n = table.nrows();
    let mut design = DMatrix::zeros(n, basis.len());
    for row in 0..n {
        let point = table.row_point(row, predictors)?;
        for (j, function) in basis.iter().enumerate() {
            design[(row, j)] = function.evaluate(&point)?;
        }
    }
    let (beta, rss) = least_squares(&design, &y)?;
    info!("OLS fit with {} basis functions, rss = {:e}", basis.len(), rss);
    let coefficients: Vec<f64> = beta.iter().copied().collect();
    let function = SumOfFunctions::new(
        basis
            .iter()
            .zip(coefficients.iter())
            .map(|(function, coefficient)| function.scale(*coefficient))
            .collect(),
    );
    Ok(OlsApproximation {
        function,
        basis,
        coefficients,
        rss,
    })
}
