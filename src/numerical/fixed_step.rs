//! Fixed-step integrators for a first-order ODE `dy/dx = f(x, y)`.
//!
//! Four single-step schemes share one contract: given the right-hand side,
//! an initial state and `(t_total, h)`, produce the trajectory over the grid
//! `x0, x0 + h, ..., x0 + t_total`. Steps are sequentially dependent; step i
//! uses the fully computed step i-1 and nothing else.
//!
//! The right-hand side string is parsed once into a symbolic expression and
//! lambdified; only `x`, `y` and the parser's fixed function allowlist are
//! reachable. A non-finite value at any step fails the whole solve.
//!
//! # Example
//! ```
//! use diffsolve::equation::initial_conditions::InitialConditions;
//! use diffsolve::numerical::fixed_step::{FixedStepSolver, Method};
//! let ics = InitialConditions::from([("x(0)", 0.0), ("y(0)", 1.0)]);
//! let mut solver = FixedStepSolver::new("dy/dx = y", ics, 1.0, 0.1, Method::RungeKutta4);
//! solver.solve().unwrap();
//! let (t, y) = solver.get_result();
//! assert!((y[y.len() - 1] - 1.0_f64.exp()).abs() < 1e-4);
//! ```

use crate::equation::initial_conditions::InitialConditions;
use crate::errors::SolveError;
use crate::symbolic::parse_expr::parse_expression;
use log::info;
use nalgebra::DVector;

/// The four accepted spellings of the first-order left-hand side.
const ACCEPTED_LHS: [&str; 4] = ["dy/dx", "d(y)/d(x)", "dy/d(x)", "d(y)/dx"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Euler,
    Heun,
    RungeKutta4,
    Taylor2,
}

impl Method {
    pub fn label(&self) -> &'static str {
        match self {
            Method::Euler => "numerical solution using the Euler method",
            Method::Heun => "numerical solution using the improved Euler method (Heun)",
            Method::RungeKutta4 => "numerical solution using the 4th-order Runge-Kutta method",
            Method::Taylor2 => "numerical solution using the 2nd-order Taylor method",
        }
    }
}

/// Trajectory of a numeric solve, fresh per call and owned by the caller.
#[derive(Clone, Debug)]
pub struct NumericSolution {
    pub t: DVector<f64>,
    pub y: DVector<f64>,
    pub label: String,
}

/// Extracts `f(x, y)` from a raw equation string.
///
/// After whitespace removal the left-hand side must equal one of the four
/// accepted spellings of `dy/dx`; anything else is a hard input error, not a
/// parse retry. (Case-sensitive, unlike the system path.)
pub fn extract_first_order_rhs(equation: &str) -> Result<String, SolveError> {
    let compact: String = equation.split_whitespace().collect();
    if compact.matches('=').count() != 1 {
        return Err(SolveError::Format(
            "equation must contain exactly one '='".to_string(),
        ));
    }
    let (lhs, rhs) = compact.split_once('=').expect("checked above");
    if !ACCEPTED_LHS.contains(&lhs) {
        return Err(SolveError::Format(format!(
            "left-hand side must be dy/dx, got '{}'",
            lhs
        )));
    }
    Ok(rhs.to_string())
}

/// Builds the time grid `t0, t0 + h, ...` up to and including `t0 + t_total`.
/// Half a step of tolerance is added to the bound so the final point
/// survives floating-point truncation.
pub fn build_time_grid(t0: f64, t_total: f64, h: f64) -> DVector<f64> {
    let bound = t0 + t_total + h / 2.0;
    let mut points = Vec::new();
    let mut i = 0usize;
    loop {
        let t = t0 + (i as f64) * h;
        if t > bound {
            break;
        }
        points.push(t);
        i += 1;
    }
    DVector::from_vec(points)
}

/// Fixed-step solver for `dy/dx = f(x, y)` with the method chosen at
/// construction.
pub struct FixedStepSolver {
    equation: String,
    ics: InitialConditions,
    t_total: f64,
    h: f64,
    method: Method,
    t_result: DVector<f64>,
    y_result: DVector<f64>,
}

impl FixedStepSolver {
    pub fn new(
        equation: &str,
        ics: InitialConditions,
        t_total: f64,
        h: f64,
        method: Method,
    ) -> Self {
        FixedStepSolver {
            equation: equation.to_string(),
            ics,
            t_total,
            h,
            method,
            t_result: DVector::zeros(0),
            y_result: DVector::zeros(0),
        }
    }

    pub fn solve(&mut self) -> Result<(), SolveError> {
        let solution = solve_fixed_step(&self.equation, &self.ics, self.t_total, self.h, self.method)?;
        self.t_result = solution.t;
        self.y_result = solution.y;
        Ok(())
    }

    pub fn get_result(&self) -> (DVector<f64>, DVector<f64>) {
        (self.t_result.clone(), self.y_result.clone())
    }
}

/// One call, one trajectory. The step-advance loops live here; each scheme
/// writes `y[i]` from `y[i-1]` only.
pub fn solve_fixed_step(
    equation: &str,
    ics: &InitialConditions,
    t_total: f64,
    h: f64,
    method: Method,
) -> Result<NumericSolution, SolveError> {
    if t_total <= 0.0 || h <= 0.0 {
        return Err(SolveError::Format(
            "total time and step size must be positive".to_string(),
        ));
    }
    let rhs = extract_first_order_rhs(equation)?;
    let expr = parse_expression(&rhs).map_err(SolveError::Parse)?;
    let f = expr.lambdify_xy();

    let x0 = ics.initial_point("x");
    let y0 = ics.value_of("y").unwrap_or(0.0);

    let t = build_time_grid(x0, t_total, h);
    let n = t.len();
    let mut y = DVector::zeros(n);
    y[0] = y0;

    for i in 1..n {
        let x_prev = t[i - 1];
        let y_prev = y[i - 1];
        let y_next = match method {
            Method::Euler => y_prev + h * f(x_prev, y_prev),
            Method::Heun => {
                // predictor (Euler), then trapezoidal corrector
                let slope = f(x_prev, y_prev);
                let y_pred = y_prev + h * slope;
                y_prev + h * (slope + f(x_prev + h, y_pred)) / 2.0
            }
            Method::RungeKutta4 => {
                let k1 = h * f(x_prev, y_prev);
                let k2 = h * f(x_prev + h / 2.0, y_prev + k1 / 2.0);
                let k3 = h * f(x_prev + h / 2.0, y_prev + k2 / 2.0);
                let k4 = h * f(x_prev + h, y_prev + k3);
                y_prev + (k1 + 2.0 * k2 + 2.0 * k3 + k4) / 6.0
            }
            Method::Taylor2 => {
                // total derivative of f along the trajectory approximated by
                // a central difference with a micro-step h/100
                let slope = f(x_prev, y_prev);
                let h_small = h / 100.0;
                let f_plus = f(x_prev + h_small, y_prev + h_small * slope);
                let f_minus = f(x_prev - h_small, y_prev - h_small * slope);
                let slope_prime = (f_plus - f_minus) / (2.0 * h_small);
                y_prev + h * slope + (h * h / 2.0) * slope_prime
            }
        };
        if !y_next.is_finite() {
            return Err(SolveError::Eval(format!(
                "non-finite value at x = {}",
                t[i]
            )));
        }
        y[i] = y_next;
    }

    info!(
        "{}: {} steps over [{}, {}]",
        method.label(),
        n - 1,
        x0,
        x0 + t_total
    );
    Ok(NumericSolution {
        t,
        y,
        label: method.label().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ics_01() -> InitialConditions {
        InitialConditions::from([("x(0)", 0.0), ("y(0)", 1.0)])
    }

    #[test]
    fn test_lhs_spellings_accepted() {
        for lhs in ACCEPTED_LHS {
            let rhs = extract_first_order_rhs(&format!("{} = x + y", lhs)).unwrap();
            assert_eq!(rhs, "x+y");
        }
    }

    #[test]
    fn test_wrong_lhs_rejected() {
        let err = extract_first_order_rhs("dz/dx = z").unwrap_err();
        assert!(matches!(err, SolveError::Format(_)));
        // the single-equation numeric path is case sensitive
        assert!(extract_first_order_rhs("dY/dX = y").is_err());
    }

    #[test]
    fn test_grid_includes_endpoint_exactly_once() {
        let t = build_time_grid(0.0, 1.0, 0.1);
        assert_eq!(t.len(), 11);
        assert_relative_eq!(t[10], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_grid_with_awkward_step() {
        // 0.3 does not divide 1.0 exactly; the grid still ends at or past 1.0 - h/2
        let t = build_time_grid(0.0, 1.0, 0.3);
        let last = t[t.len() - 1];
        assert!(last >= 1.0 - 0.15 && last <= 1.0 + 0.15);
    }

    #[test]
    fn test_euler_known_value() {
        // dy/dx = y, y(0)=1, h=0.1: Euler gives (1.1)^10 at x=1
        let sol = solve_fixed_step("dy/dx = y", &ics_01(), 1.0, 0.1, Method::Euler).unwrap();
        let y_end = sol.y[sol.y.len() - 1];
        assert_relative_eq!(y_end, 1.1_f64.powi(10), epsilon = 1e-10);
        assert_relative_eq!(y_end, 2.5937, epsilon = 1e-4);
    }

    #[test]
    fn test_rk4_known_value_and_accuracy_ratio() {
        let euler = solve_fixed_step("dy/dx = y", &ics_01(), 1.0, 0.1, Method::Euler).unwrap();
        let rk4 =
            solve_fixed_step("dy/dx = y", &ics_01(), 1.0, 0.1, Method::RungeKutta4).unwrap();
        let exact = 1.0_f64.exp();
        let rk4_end = rk4.y[rk4.y.len() - 1];
        assert_relative_eq!(rk4_end, 2.71824, epsilon = 1e-4);
        let euler_err = (euler.y[euler.y.len() - 1] - exact).abs();
        let rk4_err = (rk4_end - exact).abs();
        assert!(rk4_err * 100.0 < euler_err);
    }

    #[test]
    fn test_all_methods_agree_on_exponential() {
        let exact = |x: f64| (2.0 * x).exp();
        let tolerances = [
            (Method::Euler, 0.2),
            (Method::Heun, 0.02),
            (Method::RungeKutta4, 1e-5),
            (Method::Taylor2, 0.02),
        ];
        for (method, tol) in tolerances {
            let sol = solve_fixed_step("dy/dx = 2*y", &ics_01(), 1.0, 0.05, method).unwrap();
            for (i, t) in sol.t.iter().enumerate() {
                assert!(
                    (sol.y[i] - exact(*t)).abs() < tol * exact(*t),
                    "{:?} diverged at t = {}",
                    method,
                    t
                );
            }
        }
    }

    #[test]
    fn test_heun_matches_hand_computed_step() {
        // one step of Heun on dy/dx = y from y=1: y1 = 1 + 0.1*(1 + 1.1)/2
        let sol = solve_fixed_step("dy/dx = y", &ics_01(), 0.1, 0.1, Method::Heun).unwrap();
        assert_relative_eq!(sol.y[1], 1.105, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_symbol_fails_the_solve() {
        let err = solve_fixed_step("dy/dx = z + y", &ics_01(), 1.0, 0.1, Method::Euler)
            .unwrap_err();
        assert!(matches!(err, SolveError::Eval(_)));
    }

    #[test]
    fn test_nonpositive_step_rejected() {
        let err = solve_fixed_step("dy/dx = y", &ics_01(), 1.0, 0.0, Method::Euler).unwrap_err();
        assert!(matches!(err, SolveError::Format(_)));
    }

    #[test]
    fn test_struct_api() {
        let mut solver =
            FixedStepSolver::new("dy/dx = y", ics_01(), 1.0, 0.1, Method::RungeKutta4);
        solver.solve().unwrap();
        let (t, y) = solver.get_result();
        assert_eq!(t.len(), y.len());
        assert_relative_eq!(y[0], 1.0);
    }
}
