/// Newton's method on analytic Jacobians. Two modes:
/// - root: solve F(x) = 0 for a vector of functions, one per unknown
/// - optimum: solve grad f(x) = 0 for one function, the Hessian playing the Jacobian
///
/// Derivatives are built once, symbolically, before the iterations start; every step
/// evaluates them at the current point and solves the linear system by LU.
///  Example#1
/// ```
/// use RustedFunctionAlgebra::numerical::Newton::Newton;
/// use RustedFunctionAlgebra::algebra::algebra_traits::MultivariateFunction;
/// use RustedFunctionAlgebra::algebra::pe_function::PEFunction;
/// use RustedFunctionAlgebra::algebra::pe_unit::PEUnit;
/// // f(x) = (x - 3)^2
/// let f = MultivariateFunction::PE(PEFunction::from_units(1.0, [("x", PEUnit::new(0.0, 3.0, 2))]));
/// let mut newton = Newton::new();
/// newton.set_optimum_problem(f, vec!["x".to_string()], vec![0.0], 1e-10, 50);
/// newton.set_solver_params(Some("none".to_string()), None);
/// let solution = newton.solve().unwrap();
/// assert!((solution[0] - 3.0).abs() < 1e-10);
/// ```
use crate::Utils::logger::{init_logger, is_valid_loglevel};
use crate::algebra::algebra_derivatives::jacobian;
use crate::algebra::algebra_errors::{FunctionError, Result};
use crate::algebra::algebra_traits::{FunctionOps, MultivariateFunction, Point};
use log::{error, info, warn};
use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;
use std::time::Instant;
use strum_macros::Display;
use tabled::{builder::Builder, settings::Style};

#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum NewtonMode {
    Root,
    Optimum,
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum NewtonStatus {
    Running,
    Converged,
    Failed(FunctionError),
}

pub struct Newton {
    pub mode: NewtonMode,
    /// function to optimize, optimum mode only
    pub objective: Option<MultivariateFunction>,
    /// residuals: the equations in root mode, the gradient in optimum mode
    pub functions: Vec<MultivariateFunction>,
    /// derivative matrix of `functions`
    pub jacobian: Vec<Vec<MultivariateFunction>>,
    pub dims: Vec<String>,
    pub initial_guess: Vec<f64>,
    pub tolerance: f64,
    pub max_iterations: usize,
    pub damping_factor: f64,
    pub loglevel: Option<String>,

    pub i: usize, // iteration counter
    pub status: NewtonStatus,
    pub result: Option<DVector<f64>>,
    residual_norm: f64,
    step_norm: f64,
    prepared: bool,
    calc_statistics: HashMap<String, String>,
}

impl Newton {
    pub fn new() -> Newton {
        Newton {
            mode: NewtonMode::Root,
            objective: None,
            functions: Vec::new(),
            jacobian: Vec::new(),
            dims: Vec::new(),
            initial_guess: Vec::new(),
            tolerance: 1e-8,
            max_iterations: 100,
            damping_factor: 1.0,
            loglevel: Some("info".to_string()),
            i: 0,
            status: NewtonStatus::Running,
            result: None,
            residual_norm: f64::INFINITY,
            step_norm: f64::INFINITY,
            prepared: false,
            calc_statistics: HashMap::new(),
        }
    }
    ////////////////////////////SETTERS///////////////////////////////////////////////////////////////////
    /// system of equations F(x) = 0, one equation per unknown
    pub fn set_root_problem(
        &mut self,
        functions: Vec<MultivariateFunction>,
        dims: Vec<String>,
        initial_guess: Vec<f64>,
        tolerance: f64,
        max_iterations: usize,
    ) {
        assert_eq!(
            functions.len(),
            dims.len(),
            "Equation system and vector of variables should have the same length."
        );
        self.mode = NewtonMode::Root;
        self.objective = None;
        self.functions = functions;
        self.set_common(dims, initial_guess, tolerance, max_iterations);
    }
    /// stationary point of `function`: grad f(x) = 0
    pub fn set_optimum_problem(
        &mut self,
        function: MultivariateFunction,
        dims: Vec<String>,
        initial_guess: Vec<f64>,
        tolerance: f64,
        max_iterations: usize,
    ) {
        self.mode = NewtonMode::Optimum;
        self.objective = Some(function);
        self.functions = Vec::new();
        self.set_common(dims, initial_guess, tolerance, max_iterations);
    }
    fn set_common(
        &mut self,
        dims: Vec<String>,
        initial_guess: Vec<f64>,
        tolerance: f64,
        max_iterations: usize,
    ) {
        assert!(!dims.is_empty(), "No variables given.");
        assert_eq!(
            dims.len(),
            initial_guess.len(),
            "Initial guess and vector of variables should have the same length."
        );
        assert!(
            tolerance >= 0.0,
            "Tolerance should be a non-negative number."
        );
        assert!(
            max_iterations > 0,
            "Max iterations should be a positive number."
        );
        self.dims = dims;
        self.initial_guess = initial_guess;
        self.tolerance = tolerance;
        self.max_iterations = max_iterations;
        self.jacobian = Vec::new();
        self.prepared = false;
        self.i = 0;
        self.status = NewtonStatus::Running;
        self.result = None;
        self.residual_norm = f64::INFINITY;
        self.step_norm = f64::INFINITY;
    }
    pub fn set_solver_params(&mut self, loglevel: Option<String>, damping_factor: Option<f64>) {
        if let Some(level) = loglevel {
            assert!(
                is_valid_loglevel(&level),
                "loglevel must be debug, info, warn, error, off or none"
            );
            self.loglevel = Some(level);
        }
        if let Some(damping_factor) = damping_factor {
            assert!(
                damping_factor > 0.0 && damping_factor <= 1.0,
                "Damping factor should be in (0.0, 1.0]."
            );
            self.damping_factor = damping_factor;
        }
    }
    /// builds the residual functions and their Jacobian symbolically
    pub fn prepare(&mut self) {
        if let Some(objective) = &self.objective {
            self.functions = objective.gradient(&self.dims);
            self.jacobian = objective.hessian(&self.dims);
        } else {
            self.jacobian = jacobian(&self.functions, &self.dims);
        }
        self.prepared = true;
    }
    /////////////////////////////////////////////////////////////////////////////////////////////
    //                EVALUATION
    /////////////////////////////////////////////////////////////////////////////////////////////
    fn point(&self, x: &DVector<f64>) -> Point {
        self.dims
            .iter()
            .zip(x.iter())
            .map(|(dim, value)| (dim.clone(), *value))
            .collect()
    }
    pub fn evaluate_functions(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        let point = self.point(x);
        let values = self
            .functions
            .iter()
            .map(|function| function.evaluate(&point))
            .collect::<Result<Vec<f64>>>()?;
        Ok(DVector::from_vec(values))
    }
    pub fn evaluate_jacobian(&self, x: &DVector<f64>) -> Result<DMatrix<f64>> {
        let point = self.point(x);
        let n = self.functions.len();
        let m = self.dims.len();
        let mut jac = DMatrix::zeros(n, m);
        for (i, row) in self.jacobian.iter().enumerate() {
            for (j, entry) in row.iter().enumerate() {
                jac[(i, j)] = entry.evaluate(&point)?;
            }
        }
        Ok(jac)
    }
    /////////////////////////////////////////////////////////////////////////////////////////////
    //                ITERATIONS
    /////////////////////////////////////////////////////////////////////////////////////////////
    /// LU solution of J delta = F; singular when LU fails or the pivots span more than
    /// the working precision
    pub fn solve_linear_system(jac: &DMatrix<f64>, f: &DVector<f64>) -> Result<DVector<f64>> {
        let lu = jac.clone().lu();
        if !lu.is_invertible() {
            return Err(FunctionError::SingularSystem(
                "matrix is not invertible".to_string(),
            ));
        }
        let pivots = lu.u().diagonal().map(|value| value.abs());
        let largest = pivots.max();
        if largest == 0.0 || pivots.min() / largest < f64::EPSILON {
            return Err(FunctionError::SingularSystem(format!(
                "matrix is singular to working precision, pivot ratio {:e}",
                pivots.min() / largest
            )));
        }
        lu.solve(f).ok_or_else(|| {
            FunctionError::SingularSystem("failed to solve the linear system".to_string())
        })
    }
    /// one Newton step x - lambda * J^-1 F, with F already evaluated at x
    pub fn iteration(&mut self, x: &DVector<f64>, f: &DVector<f64>) -> Result<DVector<f64>> {
        let jac = self.evaluate_jacobian(x)?;
        let delta = Self::solve_linear_system(&jac, f)?;
        Ok(x - self.damping_factor * delta)
    }
    /// main loop: iterate until the residual or the step drops below the tolerance
    pub fn main_loop(&mut self) -> Result<DVector<f64>> {
        let mut x = DVector::from_vec(self.initial_guess.clone());
        self.result = Some(x.clone()); // keep the guess in case the very first iteration fails
        while self.i < self.max_iterations {
            let f = self.evaluate_functions(&x)?;
            self.residual_norm = f.norm();
            if self.residual_norm < self.tolerance {
                self.status = NewtonStatus::Converged;
                self.result = Some(x.clone());
                return Ok(x);
            }
            let new_x = self.iteration(&x, &f)?;
            let step = (&new_x - &x).norm();
            if step > self.step_norm && self.i > 0 {
                warn!("Step is increasing");
            }
            self.step_norm = step;
            self.i += 1;
            info!(
                "iteration = {}, step = {:e}, residual = {:e}",
                self.i, step, self.residual_norm
            );
            x = new_x;
            self.result = Some(x.clone());
            if step < self.tolerance {
                self.residual_norm = self.evaluate_functions(&x)?.norm();
                self.status = NewtonStatus::Converged;
                return Ok(x);
            }
        }
        error!("Maximum number of iterations reached. No solution found.");
        Err(FunctionError::NonConvergence(format!(
            "{} iterations without reaching tolerance {:e}",
            self.max_iterations, self.tolerance
        )))
    }
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    //                                       main functions to start the solver and calculate statistics
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    pub fn solver(&mut self) -> Result<DVector<f64>> {
        let begin = Instant::now();
        if !self.prepared {
            self.prepare();
        }
        let res = self.main_loop();
        if let Err(err) = &res {
            error!("Newton failed: {}", err);
            self.status = NewtonStatus::Failed(err.clone());
        }
        let end = begin.elapsed();
        self.calc_statistics
            .insert("time elapsed, ms".to_string(), end.as_millis().to_string());
        self.calc_statistics();
        res
    }
    // wrapper around solver function to implement logging
    pub fn solve(&mut self) -> Result<DVector<f64>> {
        if init_logger(self.loglevel.as_deref()) {
            info!("Newton solver started in {} mode", self.mode);
        }
        self.solver()
    }
    pub fn get_result(&self) -> Option<DVector<f64>> {
        self.result.clone()
    }
    /// result as a point keyed by dimension
    pub fn get_result_point(&self) -> Option<Point> {
        self.result.as_ref().map(|x| self.point(x))
    }
    fn calc_statistics(&self) {
        let mut stats = self.calc_statistics.clone();
        stats.insert("mode".to_string(), self.mode.to_string());
        stats.insert("status".to_string(), self.status.to_string());
        stats.insert("number of iterations".to_string(), self.i.to_string());
        stats.insert("number of unknowns".to_string(), self.dims.len().to_string());
        stats.insert("residual norm".to_string(), format!("{:e}", self.residual_norm));
        let mut table = Builder::from(stats).build();
        table.with(Style::modern_rounded());
        info!("\n \n CALC STATISTICS \n \n {}", table.to_string());
    }
}

impl Default for Newton {
    fn default() -> Self {
        Newton::new()
    }
}

/// Root of a square system, returned as a point. Logging is left to the caller.
pub fn find_root(
    functions: &[MultivariateFunction],
    dims: &[String],
    initial_guess: &[f64],
    tolerance: f64,
    max_iterations: usize,
) -> Result<Point> {
    let mut newton = Newton::new();
    newton.set_root_problem(
        functions.to_vec(),
        dims.to_vec(),
        initial_guess.to_vec(),
        tolerance,
        max_iterations,
    );
    newton.set_solver_params(Some("none".to_string()), None);
    let solution = newton.solve()?;
    Ok(newton.point(&solution))
}

/// Stationary point of `function`, returned as a point. Logging is left to the caller.
pub fn find_optimum(
    function: &MultivariateFunction,
    dims: &[String],
    initial_guess: &[f64],
    tolerance: f64,
    max_iterations: usize,
) -> Result<Point> {
    let mut newton = Newton::new();
    newton.set_optimum_problem(
        function.clone(),
        dims.to_vec(),
        initial_guess.to_vec(),
        tolerance,
        max_iterations,
    );
    newton.set_solver_params(Some("none".to_string()), None);
    let solution = newton.solve()?;
    Ok(newton.point(&solution))
}
