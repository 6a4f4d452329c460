///  Example#1
/// ```
///    // solve a system of equations built from the algebra
///    use RustedFunctionAlgebra::numerical::Newton::Newton;
///    use RustedFunctionAlgebra::algebra::algebra_traits::MultivariateFunction;
///    use RustedFunctionAlgebra::algebra::pe_function::PEFunction;
///    use RustedFunctionAlgebra::algebra::pe_unit::PEUnit;
///    let x = MultivariateFunction::PE(PEFunction::from_units(1.0, [("x", PEUnit::new(0.0, 0.0, 1))]));
///    let y = MultivariateFunction::PE(PEFunction::from_units(1.0, [("y", PEUnit::new(0.0, 0.0, 1))]));
///    // x^2 + y^2 - 10 = 0, x - y - 4 = 0
///    let first = &(&(&x * &x) + &(&y * &y)) - 10.0;
///    let second = &(&x - &y) - 4.0;
///    let mut newton = Newton::new();
///    newton.set_root_problem(vec![first, second], vec!["x".to_string(), "y".to_string()], vec![1.0, 1.0], 1e-10, 100);
///    newton.set_solver_params(Some("none".to_string()), None);
///    let result = newton.solve().unwrap();
///    assert!((result[0] - 3.0).abs() < 1e-8 && (result[1] + 1.0).abs() < 1e-8);
///  ```
/// Example#2
/// ```
///    // or the shortest way for a stationary point
///    use RustedFunctionAlgebra::numerical::Newton::find_optimum;
///    use RustedFunctionAlgebra::algebra::algebra_traits::MultivariateFunction;
///    use RustedFunctionAlgebra::algebra::pe_function::PEFunction;
///    let f = MultivariateFunction::PE(PEFunction::univariate(1.0, 0.0, 3.0, 2));
///    let optimum = find_optimum(&f, &["default".to_string()], &[0.0], 1e-10, 50).unwrap();
///    assert!((optimum["default"] - 3.0).abs() < 1e-10);
///  ```
pub mod Newton;
