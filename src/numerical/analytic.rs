//! Closed-form solution path for a single differential equation.
//!
//! The raw equation is normalized (Leibniz notation, roots, implicit
//! multiplication), compiled to a residual `lhs - rhs` over the opaque
//! derivative variables, and dispatched to the internal closed-form solver.
//! Coverage is the set of equation classes the tutoring panels exercise:
//!
//! - first-order linear constant-coefficient `y' = a*y + b`;
//! - separable power-law `y' = k * y^n`, `n != 1` (this is where `sqrt(y)`
//!   right-hand sides land);
//! - second-order linear constant-coefficient homogeneous
//!   `a*y'' + b*y' + c*y = 0`, all three characteristic-root branches.
//!
//! Anything else is reported as unsupported rather than guessed at.
//!
//! Every candidate is numerically probed at `x0`, `x0 + h`, `x0 + 2h`
//! before acceptance: complex results beyond a 1e-10 imaginary tolerance,
//! non-finite values, and a sign flip against `y(0)` all reject the
//! candidate. The first candidate to pass wins; exhausting them all is the
//! expected `NoSolution` outcome, not a crash.

use crate::equation::initial_conditions::InitialConditions;
use crate::equation::normalizer::{normalize_equation, strip_derivative_markers};
use crate::errors::SolveError;
use crate::numerical::fixed_step::build_time_grid;
use crate::symbolic::parse_expr::parse_expression;
use crate::symbolic::symbolic_engine::Expr;
use itertools::izip;
use log::{info, warn};
use nalgebra::DVector;
use num_complex::Complex64;
use std::collections::HashMap;

const IMAG_TOL: f64 = 1e-10;
const COEFF_EPS: f64 = 1e-12;

/// Trajectory plus the display form of the accepted closed-form solution.
#[derive(Clone, Debug)]
pub struct AnalyticSolution {
    pub t: DVector<f64>,
    pub y: DVector<f64>,
    pub closed_form: String,
}

/// Why the validity probe turned a candidate down. Ordinary data, not an
/// exception: the candidate loop iterates over these with plain control
/// flow.
#[derive(Clone, Debug, PartialEq)]
pub enum RejectReason {
    ComplexValue,
    NonFinite,
    SignMismatch,
    Unevaluable(String),
}

/// Solves the equation in closed form and evaluates it over the time grid.
pub fn solve_analytic(
    equation: &str,
    ics: &InitialConditions,
    t_total: f64,
    h: f64,
    func_name: &str,
    indep_var: &str,
) -> Result<AnalyticSolution, SolveError> {
    if t_total <= 0.0 || h <= 0.0 {
        return Err(SolveError::Format(
            "total time and step size must be positive".to_string(),
        ));
    }
    let normalized = normalize_equation(equation, func_name, indep_var)?;
    let stripped = strip_derivative_markers(&normalized, func_name, indep_var);
    let (lhs_str, rhs_str) = stripped
        .split_once('=')
        .ok_or_else(|| SolveError::Format("equation must contain '='".to_string()))?;
    let lhs = parse_expression(lhs_str).map_err(SolveError::Parse)?;
    let rhs = parse_expression(rhs_str).map_err(SolveError::Parse)?;
    let residual = Expr::Sub(lhs.boxed(), rhs.boxed());

    let x0 = ics.initial_point(indep_var);
    let y0 = ics.value_of(func_name);
    let dy0 = ics.derivative_of(func_name);

    let candidates = dsolve(&residual, func_name, indep_var, x0, y0, dy0)?;

    for candidate in candidates {
        match validity_probe(&candidate, x0, h, y0, indep_var) {
            Ok(()) => {}
            Err(reason) => {
                warn!("candidate {} rejected: {:?}", candidate, reason);
                continue;
            }
        }
        let t = build_time_grid(x0, t_total, h);
        match evaluate_over_grid(&candidate, &t, indep_var) {
            Ok(y) => {
                info!("accepted closed form {}", candidate);
                return Ok(AnalyticSolution {
                    t,
                    y,
                    closed_form: candidate.to_string(),
                });
            }
            Err(reason) => {
                warn!("candidate {} failed on the grid: {:?}", candidate, reason);
                continue;
            }
        }
    }
    Err(SolveError::NoSolution)
}

/// Internal closed-form solver. Returns the candidate solutions, constants
/// already resolved from the initial conditions, in dispatch order.
fn dsolve(
    residual: &Expr,
    func_name: &str,
    indep_var: &str,
    x0: f64,
    y0: Option<f64>,
    dy0: Option<f64>,
) -> Result<Vec<Expr>, SolveError> {
    let d1 = format!("d1{}", func_name);
    let d2 = format!("d2{}", func_name);

    let has_d1 = residual.contains_variable(&d1);
    let has_d2 = residual.contains_variable(&d2);
    if !has_d1 && !has_d2 {
        return Err(SolveError::Unsupported(
            "no derivative of the dependent function found".to_string(),
        ));
    }

    // without y(0) no constant can be pinned down; the candidate list is
    // empty and the caller reports NoSolution
    let y0 = match y0 {
        Some(v) => v,
        None => return Ok(Vec::new()),
    };

    if has_d2 {
        let a = residual
            .diff(&d2)
            .as_constant()
            .ok_or_else(|| nonconstant_coeff(&d2))?;
        if a.abs() < COEFF_EPS {
            return Err(nonconstant_coeff(&d2));
        }
        let b = residual
            .diff(&d1)
            .as_constant()
            .ok_or_else(|| nonconstant_coeff(&d1))?;
        let c = residual
            .diff(func_name)
            .as_constant()
            .ok_or_else(|| nonconstant_coeff(func_name))?;
        let forcing = residual
            .set_variable(&d2, 0.0)
            .set_variable(&d1, 0.0)
            .set_variable(func_name, 0.0)
            .as_constant()
            .ok_or_else(|| nonconstant_coeff("forcing term"))?;
        if forcing.abs() > COEFF_EPS {
            return Err(SolveError::Unsupported(
                "non-homogeneous second-order equation".to_string(),
            ));
        }
        return solve_second_order(a, b, c, indep_var, x0, y0, dy0);
    }

    // first order: residual must be linear in the derivative
    let cd = residual
        .diff(&d1)
        .as_constant()
        .ok_or_else(|| nonconstant_coeff(&d1))?;
    if cd.abs() < COEFF_EPS {
        return Err(nonconstant_coeff(&d1));
    }
    // F(x, y) with y' isolated: y' = F
    let rhs_part = residual.set_variable(&d1, 0.0);
    let f = Expr::Div(
        Box::new(-rhs_part),
        Box::new(Expr::Const(cd)),
    )
    .simplify_();

    // linear constant-coefficient: F = a*y + b, so b = F at y = 0
    if let Some(a) = f.diff(func_name).as_constant() {
        if let Some(b) = f.set_variable(func_name, 0.0).as_constant() {
            return Ok(solve_first_order_linear(a, b, indep_var, x0, y0));
        }
    }

    // separable power-law: F = k * y^n
    if let Some((k, n)) = match_power_law(&f, func_name) {
        return Ok(solve_power_law(k, n, indep_var, x0, y0));
    }

    Err(SolveError::Unsupported(format!(
        "right-hand side '{}' is outside the closed-form classes",
        f
    )))
}

fn nonconstant_coeff(what: &str) -> SolveError {
    SolveError::Unsupported(format!(
        "coefficient of {} is not a nonzero constant",
        what
    ))
}

/// y' = a*y + b with y(x0) = y0.
fn solve_first_order_linear(a: f64, b: f64, indep_var: &str, x0: f64, y0: f64) -> Vec<Expr> {
    let x = Expr::Var(indep_var.to_string());
    if a.abs() < COEFF_EPS {
        // y = y0 + b*(x - x0)
        let c1 = y0 - b * x0;
        return vec![
            (Expr::Const(c1) + Expr::Const(b) * x).simplify_(),
        ];
    }
    // y = C1 * exp(a x) - b/a, C1 = (y0 + b/a) * exp(-a x0)
    let offset = b / a;
    let c1 = (y0 + offset) * (-a * x0).exp();
    let sol = Expr::Const(c1) * (Expr::Const(a) * x).exp() - Expr::Const(offset);
    vec![sol.simplify_()]
}

/// y' = k * y^n, n != 1: y^(1-n)/(1-n) = k x + C1.
fn solve_power_law(k: f64, n: f64, indep_var: &str, x0: f64, y0: f64) -> Vec<Expr> {
    let mut candidates = Vec::new();
    let m = 1.0 - n;
    if y0 == 0.0 {
        // equilibrium branch
        candidates.push(Expr::Const(0.0));
    }
    let y0_pow = y0.powf(m);
    if y0_pow.is_finite() {
        let c1 = y0_pow / m - k * x0;
        let x = Expr::Var(indep_var.to_string());
        let inner = Expr::Const(m) * (Expr::Const(k) * x + Expr::Const(c1));
        let sol = inner.pow(Expr::Const(1.0 / m));
        candidates.push(sol.simplify_());
    }
    candidates
}

/// a y'' + b y' + c y = 0 via characteristic roots.
fn solve_second_order(
    a: f64,
    b: f64,
    c: f64,
    indep_var: &str,
    x0: f64,
    y0: f64,
    dy0: Option<f64>,
) -> Result<Vec<Expr>, SolveError> {
    let x = || Expr::Var(indep_var.to_string());
    let disc = b * b - 4.0 * a * c;
    let eps = 1e-9;

    if disc > eps {
        let sq = disc.sqrt();
        let r1 = (-b + sq) / (2.0 * a);
        let r2 = (-b - sq) / (2.0 * a);
        let e1 = (r1 * x0).exp();
        let e2 = (r2 * x0).exp();
        let (c1, c2) = match dy0 {
            Some(dy0) => {
                // y0 = C1 e1 + C2 e2 ; dy0 = C1 r1 e1 + C2 r2 e2
                let det = e1 * e2 * (r2 - r1);
                if det.abs() < COEFF_EPS {
                    return Err(SolveError::Singular(
                        "characteristic system is singular".to_string(),
                    ));
                }
                let c1 = (y0 * r2 * e2 - dy0 * e2) / det;
                let c2 = (dy0 * e1 - y0 * r1 * e1) / det;
                (c1, c2)
            }
            None => (y0 / e1, 0.0),
        };
        let sol = Expr::Const(c1) * (Expr::Const(r1) * x()).exp()
            + Expr::Const(c2) * (Expr::Const(r2) * x()).exp();
        return Ok(vec![sol.simplify_()]);
    }

    if disc.abs() <= eps {
        let r = -b / (2.0 * a);
        let e = (r * x0).exp();
        // y = (C1 + C2 x) e^{r x}
        let p = y0 / e;
        let (c1, c2) = match dy0 {
            Some(dy0) => {
                let c2 = dy0 / e - r * p;
                (p - c2 * x0, c2)
            }
            None => (p, 0.0),
        };
        let sol = (Expr::Const(c1) + Expr::Const(c2) * x()) * (Expr::Const(r) * x()).exp();
        return Ok(vec![sol.simplify_()]);
    }

    // complex pair alpha +/- beta i
    let alpha = -b / (2.0 * a);
    let beta = (-disc).sqrt() / (2.0 * a).abs();
    let e = (alpha * x0).exp();
    let (cos0, sin0) = ((beta * x0).cos(), (beta * x0).sin());
    let (c1, c2) = match dy0 {
        Some(dy0) => {
            // y  = e^{ax}(C1 cos bx + C2 sin bx)
            // y' = e^{ax}((a C1 + b C2) cos bx + (a C2 - b C1) sin bx)
            let a11 = e * cos0;
            let a12 = e * sin0;
            let a21 = e * (alpha * cos0 - beta * sin0);
            let a22 = e * (alpha * sin0 + beta * cos0);
            let det = a11 * a22 - a12 * a21;
            if det.abs() < COEFF_EPS {
                return Err(SolveError::Singular(
                    "characteristic system is singular".to_string(),
                ));
            }
            let c1 = (y0 * a22 - dy0 * a12) / det;
            let c2 = (dy0 * a11 - y0 * a21) / det;
            (c1, c2)
        }
        None => {
            if (e * cos0).abs() < COEFF_EPS {
                return Err(SolveError::Singular(
                    "cannot pin the first constant at this x0".to_string(),
                ));
            }
            (y0 / (e * cos0), 0.0)
        }
    };
    let oscillation = Expr::Const(c1) * Expr::cos(Box::new(Expr::Const(beta) * x()))
        + Expr::Const(c2) * Expr::sin(Box::new(Expr::Const(beta) * x()));
    let sol = (Expr::Const(alpha) * x()).exp() * oscillation;
    Ok(vec![sol.simplify_()])
}

/// Matches `k * y^n` (and its commuted/divided spellings) against a
/// simplified right-hand side. `n == 1` is the linear class, handled
/// earlier, so it is not reported here.
fn match_power_law(f: &Expr, func_name: &str) -> Option<(f64, f64)> {
    fn power_of(expr: &Expr, func_name: &str) -> Option<f64> {
        match expr {
            Expr::Pow(base, exp) => match (&**base, exp.as_constant()) {
                (Expr::Var(name), Some(n)) if name == func_name => Some(n),
                _ => None,
            },
            _ => None,
        }
    }
    let f = f.simplify_();
    let result = match &f {
        Expr::Pow(_, _) => power_of(&f, func_name).map(|n| (1.0, n)),
        Expr::Mul(lhs, rhs) => {
            if let (Some(k), Some(n)) = (lhs.as_constant(), power_of(rhs, func_name)) {
                Some((k, n))
            } else if let (Some(n), Some(k)) = (power_of(lhs, func_name), rhs.as_constant()) {
                Some((k, n))
            } else {
                None
            }
        }
        Expr::Div(lhs, rhs) => match (power_of(lhs, func_name), rhs.as_constant()) {
            (Some(n), Some(k)) if k != 0.0 => Some((1.0 / k, n)),
            _ => None,
        },
        _ => None,
    };
    result.filter(|(_, n)| (*n - 1.0).abs() > COEFF_EPS)
}

/// Numeric spot-check of a candidate at `x0, x0 + h, x0 + 2h`.
fn validity_probe(
    candidate: &Expr,
    x0: f64,
    h: f64,
    y0: Option<f64>,
    indep_var: &str,
) -> Result<(), RejectReason> {
    for (i, test_x) in [x0, x0 + h, x0 + 2.0 * h].into_iter().enumerate() {
        let mut vars = HashMap::new();
        vars.insert(indep_var.to_string(), Complex64::new(test_x, 0.0));
        let value = candidate
            .eval_complex(&vars)
            .map_err(RejectReason::Unevaluable)?;
        if value.im.abs() > IMAG_TOL {
            return Err(RejectReason::ComplexValue);
        }
        if !value.re.is_finite() {
            return Err(RejectReason::NonFinite);
        }
        if i == 0 {
            if let Some(y0) = y0 {
                if (y0 > 0.0 && value.re < 0.0) || (y0 < 0.0 && value.re > 0.0) {
                    return Err(RejectReason::SignMismatch);
                }
            }
        }
    }
    Ok(())
}

/// Evaluates the accepted candidate over the grid, collapsing any complex
/// residue to the real part and re-checking finiteness.
fn evaluate_over_grid(
    candidate: &Expr,
    t: &DVector<f64>,
    indep_var: &str,
) -> Result<DVector<f64>, RejectReason> {
    let mut y = DVector::zeros(t.len());
    for (i, &tx) in t.iter().enumerate() {
        let mut vars = HashMap::new();
        vars.insert(indep_var.to_string(), Complex64::new(tx, 0.0));
        let value = candidate
            .eval_complex(&vars)
            .map_err(RejectReason::Unevaluable)?;
        if !value.re.is_finite() {
            return Err(RejectReason::NonFinite);
        }
        y[i] = value.re;
    }
    Ok(y)
}

/// Least-squares post-processor: fits a line to the analytic trajectory.
#[derive(Clone, Debug)]
pub struct LeastSquaresFit {
    pub t: DVector<f64>,
    pub y_fitted: DVector<f64>,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub description: String,
}

/// Runs the analytic path and fits `y = slope*x + intercept` to its
/// trajectory with the closed-form normal equations. An analytic failure
/// (including `NoSolution`) propagates unchanged.
pub fn solve_least_squares(
    equation: &str,
    ics: &InitialConditions,
    t_total: f64,
    h: f64,
) -> Result<LeastSquaresFit, SolveError> {
    let analytic = solve_analytic(equation, ics, t_total, h, "y", "x")?;
    let (x, y) = (&analytic.t, &analytic.y);

    let n = x.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    for (xi, yi) in izip!(x.iter(), y.iter()) {
        sum_x += xi;
        sum_y += yi;
        sum_xy += xi * yi;
        sum_xx += xi * xi;
    }
    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < COEFF_EPS {
        return Err(SolveError::Eval(
            "degenerate abscissa for the least-squares fit".to_string(),
        ));
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;

    let y_fitted = DVector::from_iterator(x.len(), x.iter().map(|xi| slope * xi + intercept));
    let y_mean = sum_y / n;
    let ss_tot: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();
    let ss_res: f64 = izip!(y.iter(), y_fitted.iter())
        .map(|(yi, fi)| (yi - fi).powi(2))
        .sum();
    let r_squared = if ss_tot.abs() < COEFF_EPS {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    };

    let description = format!(
        "least-squares linear fit (y = {:.4}x + {:.4}, R² = {:.4})",
        slope, intercept, r_squared
    );
    Ok(LeastSquaresFit {
        t: analytic.t,
        y_fitted,
        slope,
        intercept,
        r_squared,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exponential_growth_matches_closed_form() {
        let ics = InitialConditions::from([("x(0)", 0.0), ("y(0)", 2.0)]);
        let sol = solve_analytic("dy/dx = 3*y", &ics, 1.0, 0.1, "y", "x").unwrap();
        for (i, t) in sol.t.iter().enumerate() {
            assert_relative_eq!(sol.y[i], 2.0 * (3.0 * t).exp(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_linear_with_forcing() {
        // y' = -y + 1, y(0) = 0  ->  y = 1 - exp(-x)
        let ics = InitialConditions::from([("y(0)", 0.0)]);
        let sol = solve_analytic("dy/dx = -y + 1", &ics, 2.0, 0.1, "y", "x").unwrap();
        for (i, t) in sol.t.iter().enumerate() {
            assert_relative_eq!(sol.y[i], 1.0 - (-t).exp(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_constant_rhs() {
        // y' = 2, y(0) = 1  ->  y = 1 + 2x
        let ics = InitialConditions::from([("y(0)", 1.0)]);
        let sol = solve_analytic("dy/dx = 2", &ics, 1.0, 0.25, "y", "x").unwrap();
        for (i, t) in sol.t.iter().enumerate() {
            assert_relative_eq!(sol.y[i], 1.0 + 2.0 * t, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sqrt_separable_branch() {
        // y' = sqrt(y), y(0) = 1  ->  y = (x/2 + 1)^2
        let ics = InitialConditions::from([("y(0)", 1.0)]);
        let sol = solve_analytic("dy/dx = sqrt(y)", &ics, 2.0, 0.1, "y", "x").unwrap();
        for (i, t) in sol.t.iter().enumerate() {
            assert_relative_eq!(sol.y[i], (t / 2.0 + 1.0).powi(2), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_second_order_cosine() {
        // y'' + y = 0, y(0) = 1, y'(0) = 0  ->  y = cos(x)
        let ics = InitialConditions::from([("y(0)", 1.0), ("dy(0)", 0.0)]);
        let sol = solve_analytic("d2y/dx2 + y = 0", &ics, 3.0, 0.1, "y", "x").unwrap();
        for (i, t) in sol.t.iter().enumerate() {
            assert_relative_eq!(sol.y[i], t.cos(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_second_order_distinct_real_roots() {
        // y'' - 3y' + 2y = 0, y(0)=1, y'(0)=1 -> y = e^x
        let ics = InitialConditions::from([("y(0)", 1.0), ("dy(0)", 1.0)]);
        let sol =
            solve_analytic("d2y/dx2 - 3*dy/dx + 2*y = 0", &ics, 1.0, 0.1, "y", "x").unwrap();
        for (i, t) in sol.t.iter().enumerate() {
            assert_relative_eq!(sol.y[i], t.exp(), epsilon = 1e-7);
        }
    }

    #[test]
    fn test_second_order_repeated_root() {
        // y'' - 2y' + y = 0, y(0)=1, y'(0)=3 -> y = (1 + 2x) e^x
        let ics = InitialConditions::from([("y(0)", 1.0), ("dy(0)", 3.0)]);
        let sol =
            solve_analytic("d2y/dx2 - 2*dy/dx + y = 0", &ics, 1.0, 0.1, "y", "x").unwrap();
        for (i, t) in sol.t.iter().enumerate() {
            assert_relative_eq!(sol.y[i], (1.0 + 2.0 * t) * t.exp(), epsilon = 1e-7);
        }
    }

    #[test]
    fn test_unsupported_class_reported() {
        let ics = InitialConditions::from([("y(0)", 1.0)]);
        let err = solve_analytic("dy/dx = sin(y)", &ics, 1.0, 0.1, "y", "x").unwrap_err();
        assert!(matches!(err, SolveError::Unsupported(_)));
    }

    #[test]
    fn test_missing_initial_value_is_no_solution() {
        let ics = InitialConditions::from([("x(0)", 0.0)]);
        let err = solve_analytic("dy/dx = y", &ics, 1.0, 0.1, "y", "x").unwrap_err();
        assert!(err.is_no_solution());
    }

    #[test]
    fn test_sign_probe_rejects_wrong_branch() {
        // y' = sqrt(y) with y(0) = -1: y^(1-n) is NaN, the equilibrium
        // branch does not apply, no candidate survives
        let ics = InitialConditions::from([("y(0)", -1.0)]);
        let err = solve_analytic("dy/dx = sqrt(y)", &ics, 1.0, 0.1, "y", "x").unwrap_err();
        assert!(err.is_no_solution());
    }

    #[test]
    fn test_probe_rejects_complex_candidate() {
        let candidate = Expr::parse_expression_unchecked("(-1 - x)^(1/2)");
        let reason = validity_probe(&candidate, 0.0, 0.1, Some(1.0), "x").unwrap_err();
        assert_eq!(reason, RejectReason::ComplexValue);
    }

    #[test]
    fn test_probe_sign_mismatch() {
        let candidate = Expr::parse_expression_unchecked("-1 - x");
        let reason = validity_probe(&candidate, 0.0, 0.1, Some(2.0), "x").unwrap_err();
        assert_eq!(reason, RejectReason::SignMismatch);
    }

    #[test]
    fn test_analytic_agrees_with_rk4() {
        use crate::numerical::fixed_step::{Method, solve_fixed_step};
        let ics = InitialConditions::from([("x(0)", 0.0), ("y(0)", 1.0)]);
        let analytic = solve_analytic("dy/dx = y", &ics, 1.0, 0.1, "y", "x").unwrap();
        let numeric = solve_fixed_step("dy/dx = y", &ics, 1.0, 0.1, Method::RungeKutta4).unwrap();
        assert_eq!(analytic.t.len(), numeric.t.len());
        for i in 0..analytic.t.len() {
            assert_relative_eq!(analytic.y[i], numeric.y[i], epsilon = 1e-4);
        }
    }

    #[test]
    fn test_least_squares_on_linear_solution() {
        // y' = 2, y(0) = 1 has the exact line y = 2x + 1; the fit must
        // recover it with R^2 = 1
        let ics = InitialConditions::from([("y(0)", 1.0)]);
        let fit = solve_least_squares("dy/dx = 2", &ics, 1.0, 0.1).unwrap();
        assert_relative_eq!(fit.slope, 2.0, epsilon = 1e-9);
        assert_relative_eq!(fit.intercept, 1.0, epsilon = 1e-9);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_least_squares_propagates_analytic_failure() {
        let ics = InitialConditions::from([("y(0)", 1.0)]);
        let err = solve_least_squares("dy/dx = sin(y)", &ics, 1.0, 0.1).unwrap_err();
        assert!(matches!(err, SolveError::Unsupported(_)));
    }
}
