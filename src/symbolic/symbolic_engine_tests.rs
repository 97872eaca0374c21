use crate::symbolic::parse_expr::parse_expression;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbols;
use approx::assert_relative_eq;
use num_complex::Complex64;
use std::collections::HashMap;
//___________________________________TESTS____________________________________

#[test]
fn test_ops_overloads() {
    let (x, y) = symbols!(x, y);
    let expr = x.clone() + y.clone() * Expr::Const(2.0);
    let expected = Expr::Add(
        Box::new(Expr::Var("x".to_string())),
        Box::new(Expr::Mul(
            Box::new(Expr::Var("y".to_string())),
            Box::new(Expr::Const(2.0)),
        )),
    );
    assert_eq!(expr, expected);
}

#[test]
fn test_neg() {
    let expr = -Expr::Var("x".to_string());
    let expected = Expr::Mul(
        Box::new(Expr::Const(-1.0)),
        Box::new(Expr::Var("x".to_string())),
    );
    assert_eq!(expr, expected);
}

#[test]
fn test_set_variable() {
    let expr = parse_expression("x^2 + y").unwrap();
    let substituted = expr.set_variable("x", 3.0);
    assert_eq!(
        substituted.set_variable("y", 1.0).as_constant(),
        Some(10.0)
    );
}

#[test]
fn test_contains_and_extract_variables() {
    let expr = parse_expression("d1y - 2*y + x").unwrap();
    assert!(expr.contains_variable("d1y"));
    assert!(!expr.contains_variable("d2y"));
    assert_eq!(
        expr.extract_variables(),
        vec!["d1y".to_string(), "x".to_string(), "y".to_string()]
    );
}

#[test]
fn test_simplify_folds_linear_partials() {
    // residual of dy/dx = 3*y + 1, derivatives collapse to constants
    let residual = parse_expression("d1y - (3*y + 1)").unwrap();
    assert_eq!(residual.diff("y").as_constant(), Some(-3.0));
    assert_eq!(residual.diff("d1y").as_constant(), Some(1.0));
    let forcing = residual
        .set_variable("d1y", 0.0)
        .set_variable("y", 0.0);
    assert_eq!(forcing.as_constant(), Some(-1.0));
}

#[test]
fn test_diff_product_rule() {
    let expr = parse_expression("x*sin(x)").unwrap();
    let derivative = expr.diff("x").lambdify1D();
    let expected = |x: f64| x.sin() + x * x.cos();
    for &x in &[0.3, 1.0, 2.7] {
        assert_relative_eq!(derivative(x), expected(x), epsilon = 1e-12);
    }
}

#[test]
fn test_diff_rational_power() {
    // d/dy y^(1/2) = (1/2) y^(-1/2)
    let expr = parse_expression("sqrt(y)").unwrap();
    let derivative = expr.diff("y").lambdify1D();
    assert_relative_eq!(derivative(4.0), 0.25, epsilon = 1e-12);
}

#[test]
fn test_eval_f64_unbound_variable_is_error() {
    let expr = parse_expression("x + z").unwrap();
    let mut vars = HashMap::new();
    vars.insert("x".to_string(), 1.0);
    assert!(expr.eval_f64(&vars).is_err());
}

#[test]
fn test_eval_complex_fractional_power_of_negative() {
    // (-1)^(1/2) = i, the case the validity probe must catch
    let expr = parse_expression("y^(1/2)").unwrap();
    let mut vars = HashMap::new();
    vars.insert("y".to_string(), Complex64::new(-1.0, 0.0));
    let value = expr.eval_complex(&vars).unwrap();
    assert_relative_eq!(value.re, 0.0, epsilon = 1e-12);
    assert_relative_eq!(value.im, 1.0, epsilon = 1e-12);
}

#[test]
fn test_eval_complex_zero_base() {
    let expr = parse_expression("y^2").unwrap();
    let mut vars = HashMap::new();
    vars.insert("y".to_string(), Complex64::new(0.0, 0.0));
    let value = expr.eval_complex(&vars).unwrap();
    assert_eq!(value, Complex64::new(0.0, 0.0));
}

#[test]
fn test_display_round_trips_through_parser() {
    let expr = parse_expression("x^2 - 3*x + sin(x)").unwrap();
    let reparsed = parse_expression(&expr.to_string()).unwrap();
    let f = expr.lambdify1D();
    let g = reparsed.lambdify1D();
    for &x in &[0.0, 0.5, 2.0] {
        assert_relative_eq!(f(x), g(x), epsilon = 1e-12);
    }
}
