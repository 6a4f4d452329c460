#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// error type of the whole crate
pub mod algebra_errors;
///____________________________________________________________________________________________________________________________
/// # Atomic term
/// `PEUnit { b, base, d }` is `exp(b*(x - base)) * (x - base)^d` on a single axis: the building block
/// every other function kind is made of.
/// ```
/// use RustedFunctionAlgebra::algebra::pe_unit::PEUnit;
/// let unit = PEUnit::new(1.0, 0.0, 2);
/// // ∫0^1 x^2 e^x dx = e - 2
/// let value = unit.integral(0.0, 1.0);
/// assert!((value - (std::f64::consts::E - 2.0)).abs() < 1e-12);
/// ```
pub mod pe_unit;
/// multiplier times a product of atomic terms on distinct axes
pub mod pe_function;
/// ordered sum of term-products, simplified on construction
pub mod sum_of_functions;
///____________________________________________________________________________________________________________________________
/// # Piecewise functions
/// functions defined by different sums of terms on different boxes of the domain
/// ```
/// use RustedFunctionAlgebra::algebra::algebra_traits::{FunctionOps, MultivariateFunction, Point};
/// use RustedFunctionAlgebra::algebra::piecewise_function::{Interval, PiecewiseFunction};
/// use RustedFunctionAlgebra::algebra::sum_of_functions::SumOfFunctions;
/// let step = PiecewiseFunction::univariate(
///     vec![
///         (Interval::closed_open(0.0, 1.0), SumOfFunctions::constant(1.0)),
///         (Interval::closed(1.0, 2.0), SumOfFunctions::constant(2.0)),
///     ],
///     "x",
/// );
/// let step = MultivariateFunction::Piecewise(step);
/// let point = Point::from([("x".to_string(), 1.0)]);
/// assert_eq!(step.evaluate(&point).unwrap(), 2.0);
/// assert_eq!(step.integral_1d(0.0, 2.0).unwrap(), 3.0);
/// ```
pub mod piecewise_function;
/// separable sums of one dimensional piecewise functions, the output of additive fits
pub mod sum_of_piecewise;
///____________________________________________________________________________________________________________________________
/// # Uniform interface
/// the `MultivariateFunction` enum, the `FunctionOps` trait and the operators on them
/// ```
/// use RustedFunctionAlgebra::algebra::algebra_traits::{FunctionOps, Limits, MultivariateFunction};
/// use RustedFunctionAlgebra::algebra::pe_function::PEFunction;
/// use RustedFunctionAlgebra::algebra::pe_unit::PEUnit;
/// // f(x, y) = 4 x e^y
/// let f = MultivariateFunction::PE(PEFunction::from_units(
///     4.0,
///     [("x", PEUnit::new(0.0, 0.0, 1)), ("y", PEUnit::new(1.0, 0.0, 0))],
/// ));
/// let g = (&f * &f) + 1.0;
/// let dg_dx = g.derivative("x");
/// let limits = Limits::from([("x".to_string(), (0.0, 1.0)), ("y".to_string(), (0.0, 1.0))]);
/// let value = dg_dx.integral_value(&limits).unwrap();
/// // ∫∫ 32 x e^{2y} dx dy = 8 (e^2 - 1)
/// assert!((value - 8.0 * (std::f64::consts::E.powi(2) - 1.0)).abs() < 1e-9);
/// ```
pub mod algebra_traits;
pub mod algebra_ops;
/// derivatives, gradients, Hessians and Jacobians
pub mod algebra_derivatives;
/// definite integrals, `integral_value` and `integral_1d`
pub mod algebra_integration;
