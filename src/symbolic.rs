#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use diffsolve::symbolic::symbolic_engine::Expr;
/// use diffsolve::symbolic::parse_expr::parse_expression;
/// let input = "x^2 + sin(x)*y";
/// let parsed_expression = parse_expression(input).unwrap();
/// println!("parsed expression {}", parsed_expression);
/// let f = parsed_expression.lambdify_xy();
/// println!("{}, evaluated: {}", input, f(1.0, 2.0));
/// ```
pub mod parse_expr;
/// # Symbolic engine
/// a module
/// 1) represents expressions as a recursive tree
/// 2) differentiates them analytically
/// 3) substitutes variables and evaluates numerically (real or complex)
///# Example
/// ```
/// use diffsolve::symbolic::symbolic_engine::Expr;
/// use diffsolve::symbolic::parse_expr::parse_expression;
/// let f = parse_expression("x^2 + y").unwrap();
/// // partial derivatives
/// let df_dx = f.diff("x").simplify_();
/// let df_dy = f.diff("y").simplify_();
/// println!("df_dx = {}, df_dy = {}", df_dx, df_dy);
/// // substitute and fold to a constant
/// assert_eq!(f.set_variable("x", 2.0).set_variable("y", 1.0).as_constant(), Some(5.0));
/// ```
pub mod symbolic_engine;
pub mod symbolic_engine_derivatives;
#[cfg(test)]
mod symbolic_engine_tests;
/// turns a symbolic expression into an executable Rust closure,
/// one-argument or (x, y) form
pub mod symbolic_lambdify;
