//! Coupled 2x2 first-order linear system solver.
//!
//! The two input lines are normalized, compiled to residuals, and reduced to
//! `[x; y]' = A [x; y] + b` by partial differentiation. The eigen path is
//! closed form (trace/determinant through the complex square root), with
//! eigenvalues rounded to 6 decimals and near-zero imaginary parts snapped to
//! zero. Constants are fitted to `(x(0), y(0))` by complex Cramer elimination
//! and the general solution is evaluated over the time grid with a
//! complex-to-real collapse. Defective matrices, which would need generalized
//! eigenvectors, are reported as unsupported.

use crate::equation::initial_conditions::InitialConditions;
use crate::equation::normalizer::{normalize_system_line, strip_derivative_markers};
use crate::errors::SolveError;
use crate::numerical::fixed_step::build_time_grid;
use crate::symbolic::parse_expr::parse_expression;
use crate::symbolic::symbolic_engine::Expr;
use log::{debug, info};
use nalgebra::{DVector, Matrix2, Vector2};
use num_complex::Complex64;
use regex::Regex;
use std::cell::OnceCell;

const IMAG_SNAP: f64 = 1e-10;
const EIGEN_DEDUP: f64 = 1e-9;
const DET_EPS: f64 = 1e-12;

fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

fn round6_complex(v: Complex64) -> Complex64 {
    let mut im = v.im;
    if im.abs() < IMAG_SNAP {
        im = 0.0;
    }
    Complex64::new(round6(v.re), round6(im))
}

/// Trims a rounded coefficient for display: `-1.000000` -> `-1`.
fn fmt_coeff(v: f64) -> String {
    let s = format!("{:.6}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn fmt_complex(v: Complex64) -> String {
    if v.im == 0.0 {
        fmt_coeff(v.re)
    } else if v.re == 0.0 {
        format!("{}i", fmt_coeff(v.im))
    } else if v.im < 0.0 {
        format!("{} - {}i", fmt_coeff(v.re), fmt_coeff(-v.im))
    } else {
        format!("{} + {}i", fmt_coeff(v.re), fmt_coeff(v.im))
    }
}

/// An eigenvalue with its algebraic multiplicity. The raw complex value is
/// authoritative; the `"λ = a ± bi"` display string is derived lazily and is
/// pure presentation, never re-parsed on the solve path.
#[derive(Clone, Debug)]
pub struct Eigenvalue {
    pub value: Complex64,
    pub multiplicity: usize,
    display: OnceCell<String>,
}

impl Eigenvalue {
    pub fn new(value: Complex64, multiplicity: usize) -> Self {
        Eigenvalue {
            value: round6_complex(value),
            multiplicity,
            display: OnceCell::new(),
        }
    }

    pub fn display(&self) -> &str {
        self.display
            .get_or_init(|| format!("λ = {}", fmt_complex(self.value)))
    }
}

impl PartialEq for Eigenvalue {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.multiplicity == other.multiplicity
    }
}

/// Reads an eigenvalue display string back into a complex number. Accepts
/// pure-real (`λ = -2`), pure-imaginary (`λ = 1.5i`, bare `i`/`-i`), and
/// combined (`λ = -0.5 + 2i`) forms, with `j` tolerated as the imaginary
/// suffix.
pub fn parse_eigenvalue(s: &str) -> Result<Complex64, SolveError> {
    let s = s.trim().trim_start_matches("λ").trim_start().trim_start_matches('=');
    let s: String = s.split_whitespace().collect();
    let s = s.replace('j', "i");

    let combined = Regex::new(r"^([+-]?\d+(?:\.\d+)?)([+-](?:\d+(?:\.\d+)?)?)i$")
        .map_err(|e| SolveError::Format(e.to_string()))?;
    if let Some(caps) = combined.captures(&s) {
        let re: f64 = caps[1]
            .parse()
            .map_err(|_| SolveError::Format(format!("bad eigenvalue '{}'", s)))?;
        let im_str = &caps[2];
        let im = match im_str {
            "+" => 1.0,
            "-" => -1.0,
            other => other
                .parse()
                .map_err(|_| SolveError::Format(format!("bad eigenvalue '{}'", s)))?,
        };
        return Ok(Complex64::new(re, im));
    }

    let pure_imag = Regex::new(r"^([+-]?(?:\d+(?:\.\d+)?)?)i$")
        .map_err(|e| SolveError::Format(e.to_string()))?;
    if let Some(caps) = pure_imag.captures(&s) {
        let im = match &caps[1] {
            "" | "+" => 1.0,
            "-" => -1.0,
            other => other
                .parse()
                .map_err(|_| SolveError::Format(format!("bad eigenvalue '{}'", s)))?,
        };
        return Ok(Complex64::new(0.0, im));
    }

    s.parse::<f64>()
        .map(|re| Complex64::new(re, 0.0))
        .map_err(|_| SolveError::Format(format!("bad eigenvalue '{}'", s)))
}

/// Display-oriented record accompanying a system solution. Consumed by the
/// rendering layer as text, never computed upon.
#[derive(Clone, Debug)]
pub struct SystemDiagnostics {
    pub matrix: String,
    pub constants: String,
    pub eigenvalue_lines: Vec<String>,
    pub eigenvector_lines: Vec<String>,
    pub solution_x: String,
    pub solution_y: String,
}

#[derive(Clone, Debug)]
pub struct SystemSolution {
    pub t: DVector<f64>,
    pub x: DVector<f64>,
    pub y: DVector<f64>,
    pub eigenvalues: Vec<Eigenvalue>,
    pub diagnostics: SystemDiagnostics,
}

/// Teacher-style stateful facade over [`solve_linear_system`].
pub struct LinearSystemSolver {
    system: String,
    initial_conditions: InitialConditions,
    t_total: f64,
    h: f64,
    result: Option<SystemSolution>,
}

impl LinearSystemSolver {
    pub fn new(system: &str, initial_conditions: InitialConditions, t_total: f64, h: f64) -> Self {
        LinearSystemSolver {
            system: system.to_string(),
            initial_conditions,
            t_total,
            h,
            result: None,
        }
    }

    pub fn solve(&mut self) -> Result<(), SolveError> {
        let solution =
            solve_linear_system(&self.system, &self.initial_conditions, self.t_total, self.h)?;
        self.result = Some(solution);
        Ok(())
    }

    pub fn get_result(&self) -> Option<&SystemSolution> {
        self.result.as_ref()
    }
}

/// Extracts `A` and `b` from the two residuals by partial differentiation.
/// Non-constant partials mean the system is not linear with constant
/// coefficients, which is outside this solver.
fn extract_matrix(
    residual_x: &Expr,
    residual_y: &Expr,
) -> Result<(Matrix2<f64>, Vector2<f64>), SolveError> {
    let mut a = Matrix2::zeros();
    let mut b = Vector2::zeros();
    for (row, residual) in [residual_x, residual_y].into_iter().enumerate() {
        for (col, var) in ["x", "y"].into_iter().enumerate() {
            let partial = residual.diff(var).simplify_().as_constant().ok_or_else(|| {
                SolveError::Unsupported(format!(
                    "equation {} is not linear in {}",
                    row + 1,
                    var
                ))
            })?;
            // residual is lhs - rhs, so the system coefficient is negated
            a[(row, col)] = -partial;
        }
        let forcing = residual
            .set_variable("d1x", 0.0)
            .set_variable("d1y", 0.0)
            .set_variable("x", 0.0)
            .set_variable("y", 0.0)
            .as_constant()
            .ok_or_else(|| {
                SolveError::Unsupported(format!(
                    "equation {} has a non-constant forcing term",
                    row + 1
                ))
            })?;
        b[row] = -forcing;
    }
    Ok((a, b))
}

/// Closed-form eigenvalues of a real 2x2 matrix, deduplicated, rounded, and
/// sorted descending by real part.
pub fn eigenvalues_2x2(a: &Matrix2<f64>) -> Vec<Eigenvalue> {
    let tr = a[(0, 0)] + a[(1, 1)];
    let det = a[(0, 0)] * a[(1, 1)] - a[(0, 1)] * a[(1, 0)];
    let disc = Complex64::new(tr * tr - 4.0 * det, 0.0).sqrt();
    let l1 = round6_complex((Complex64::new(tr, 0.0) + disc) / 2.0);
    let l2 = round6_complex((Complex64::new(tr, 0.0) - disc) / 2.0);

    if (l1 - l2).norm() < EIGEN_DEDUP {
        return vec![Eigenvalue::new(l1, 2)];
    }
    let mut pair = vec![Eigenvalue::new(l1, 1), Eigenvalue::new(l2, 1)];
    pair.sort_by(|p, q| {
        q.value
            .re
            .partial_cmp(&p.value.re)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                q.value
                    .im
                    .partial_cmp(&p.value.im)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });
    pair
}

/// Unit-norm eigenvector of `a` for the eigenvalue `lambda`. The selection
/// rule follows from `(A - lambda I) v = 0` row by row.
fn eigenvector_for(a: &Matrix2<f64>, lambda: Complex64) -> Vector2<Complex64> {
    let a11 = Complex64::new(a[(0, 0)], 0.0);
    let a22 = Complex64::new(a[(1, 1)], 0.0);
    let raw = if a[(0, 1)].abs() > DET_EPS {
        Vector2::new(Complex64::new(a[(0, 1)], 0.0), lambda - a11)
    } else if a[(1, 0)].abs() > DET_EPS {
        Vector2::new(lambda - a22, Complex64::new(a[(1, 0)], 0.0))
    } else if (lambda - a11).norm() < EIGEN_DEDUP {
        Vector2::new(Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0))
    } else {
        Vector2::new(Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0))
    };
    let norm = (raw[0].norm_sqr() + raw[1].norm_sqr()).sqrt();
    Vector2::new(raw[0] / norm, raw[1] / norm)
}

/// The two (eigenvalue, eigenvector) pairs spanning the solution space.
/// A repeated eigenvalue is only accepted on a scalar matrix; anything else
/// is defective and would need a generalized eigenvector.
fn eigen_basis(
    a: &Matrix2<f64>,
    eigenvalues: &[Eigenvalue],
) -> Result<[(Complex64, Vector2<Complex64>); 2], SolveError> {
    if eigenvalues.len() == 2 {
        let l1 = eigenvalues[0].value;
        let l2 = eigenvalues[1].value;
        return Ok([
            (l1, eigenvector_for(a, l1)),
            (l2, eigenvector_for(a, l2)),
        ]);
    }
    let l = eigenvalues[0].value;
    let scalar = a[(0, 1)].abs() <= DET_EPS
        && a[(1, 0)].abs() <= DET_EPS
        && (a[(0, 0)] - a[(1, 1)]).abs() <= EIGEN_DEDUP;
    if !scalar {
        return Err(SolveError::Unsupported(
            "repeated eigenvalue with a defective eigenspace".to_string(),
        ));
    }
    Ok([
        (l, Vector2::new(Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0))),
        (l, Vector2::new(Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0))),
    ])
}

/// Solves the coupled system over `[t0, t0 + t_total]` with step `h`.
///
/// The system string is exactly two lines, one for `dx/dt` and one for
/// `dy/dt`, in either order. Both `x(0)` and `y(0)` must be present in the
/// initial conditions.
pub fn solve_linear_system(
    system: &str,
    ics: &InitialConditions,
    t_total: f64,
    h: f64,
) -> Result<SystemSolution, SolveError> {
    if t_total <= 0.0 || h <= 0.0 {
        return Err(SolveError::Format(
            "total time and step size must be positive".to_string(),
        ));
    }
    let lines: Vec<&str> = system
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() != 2 {
        return Err(SolveError::Format(format!(
            "a system needs exactly two equations, got {}",
            lines.len()
        )));
    }

    let mut residual_x = None;
    let mut residual_y = None;
    for line in lines {
        let normalized = normalize_system_line(line)?;
        let is_x = normalized.starts_with("Derivative(x(t),t)");
        let stripped = strip_derivative_markers(
            &strip_derivative_markers(&normalized, "x", "t"),
            "y",
            "t",
        );
        let residual = parse_expression(&stripped).map_err(SolveError::Parse)?;
        debug!("system residual: {}", residual);
        if is_x {
            residual_x = Some(residual);
        } else {
            residual_y = Some(residual);
        }
    }
    let (residual_x, residual_y) = match (residual_x, residual_y) {
        (Some(ex), Some(ey)) => (ex, ey),
        _ => {
            return Err(SolveError::Format(
                "the system needs one dx/dt equation and one dy/dt equation".to_string(),
            ));
        }
    };

    let (a, b) = extract_matrix(&residual_x, &residual_y)?;
    let eigenvalues = eigenvalues_2x2(&a);
    let [(l1, v1), (l2, v2)] = eigen_basis(&a, &eigenvalues)?;
    info!(
        "system matrix {:?}, eigenvalues {} / {}",
        a,
        fmt_complex(l1),
        fmt_complex(l2)
    );

    let x0 = ics.value_of("x");
    let y0 = ics.value_of("y");
    let (x0, y0) = match (x0, y0) {
        (Some(x0), Some(y0)) => (x0, y0),
        _ => {
            return Err(SolveError::Format(
                "initial conditions x(0) and y(0) are required".to_string(),
            ));
        }
    };

    // C1 v1 + C2 v2 = (x0, y0) at t = 0, by Cramer over the complex field
    let det = v1[0] * v2[1] - v2[0] * v1[1];
    if det.norm() < DET_EPS {
        return Err(SolveError::Singular(
            "could not determine integration constants".to_string(),
        ));
    }
    let rhs = Vector2::new(Complex64::new(x0, 0.0), Complex64::new(y0, 0.0));
    let c1 = (rhs[0] * v2[1] - v2[0] * rhs[1]) / det;
    let c2 = (v1[0] * rhs[1] - rhs[0] * v1[1]) / det;

    let t0 = ics.initial_point("t");
    let t = build_time_grid(t0, t_total, h);
    let mut x = DVector::zeros(t.len());
    let mut y = DVector::zeros(t.len());
    for (i, &ti) in t.iter().enumerate() {
        let e1 = (l1 * Complex64::new(ti, 0.0)).exp();
        let e2 = (l2 * Complex64::new(ti, 0.0)).exp();
        let xi = c1 * v1[0] * e1 + c2 * v2[0] * e2;
        let yi = c1 * v1[1] * e1 + c2 * v2[1] * e2;
        if !xi.re.is_finite() || !yi.re.is_finite() {
            return Err(SolveError::Eval(format!(
                "non-finite trajectory value at t = {}",
                ti
            )));
        }
        x[i] = round6(xi.re);
        y[i] = round6(yi.re);
    }

    let diagnostics = build_diagnostics(&a, &b, &eigenvalues, &[(l1, v1), (l2, v2)], c1, c2);
    Ok(SystemSolution {
        t,
        x,
        y,
        eigenvalues,
        diagnostics,
    })
}

fn build_diagnostics(
    a: &Matrix2<f64>,
    b: &Vector2<f64>,
    eigenvalues: &[Eigenvalue],
    basis: &[(Complex64, Vector2<Complex64>)],
    c1: Complex64,
    c2: Complex64,
) -> SystemDiagnostics {
    let matrix = format!(
        "[[{}, {}], [{}, {}]]",
        fmt_coeff(a[(0, 0)]),
        fmt_coeff(a[(0, 1)]),
        fmt_coeff(a[(1, 0)]),
        fmt_coeff(a[(1, 1)])
    );
    let constants = format!("[{}, {}]", fmt_coeff(b[0]), fmt_coeff(b[1]));
    let eigenvalue_lines = eigenvalues
        .iter()
        .map(|e| {
            if e.multiplicity > 1 {
                format!("{} (multiplicity {})", e.display(), e.multiplicity)
            } else {
                e.display().to_string()
            }
        })
        .collect();
    let eigenvector_lines = basis
        .iter()
        .map(|(l, v)| {
            format!(
                "λ = {}: v = ({}, {})",
                fmt_complex(*l),
                fmt_complex(round6_complex(v[0])),
                fmt_complex(round6_complex(v[1]))
            )
        })
        .collect();
    let component = |idx: usize| {
        format!(
            "({})*({})*exp(({})*t) + ({})*({})*exp(({})*t)",
            fmt_complex(round6_complex(c1)),
            fmt_complex(round6_complex(basis[0].1[idx])),
            fmt_complex(basis[0].0),
            fmt_complex(round6_complex(c2)),
            fmt_complex(round6_complex(basis[1].1[idx])),
            fmt_complex(basis[1].0)
        )
    };
    SystemDiagnostics {
        matrix,
        constants,
        eigenvalue_lines,
        eigenvector_lines,
        solution_x: format!("x(t) = {}", component(0)),
        solution_y: format!("y(t) = {}", component(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::stability::classify_stability;
    use approx::assert_relative_eq;

    fn ics_xy(x0: f64, y0: f64) -> InitialConditions {
        InitialConditions::from([("x(0)", x0), ("y(0)", y0)])
    }

    #[test]
    fn test_decoupled_sink() {
        let sol =
            solve_linear_system("dx/dt = -x\ndy/dt = -2*y", &ics_xy(1.0, 1.0), 2.0, 0.1).unwrap();
        let values: Vec<Complex64> = sol.eigenvalues.iter().map(|e| e.value).collect();
        assert_eq!(values[0], Complex64::new(-1.0, 0.0));
        assert_eq!(values[1], Complex64::new(-2.0, 0.0));
        assert_eq!(classify_stability(&values), "asymptotically stable (sink)");

        // x(1) = e^-1, y(1) = e^-2
        let i = sol.t.iter().position(|&t| (t - 1.0).abs() < 1e-9).unwrap();
        assert_relative_eq!(sol.x[i], (-1.0f64).exp(), epsilon = 1e-4);
        assert_relative_eq!(sol.y[i], (-2.0f64).exp(), epsilon = 1e-4);
    }

    #[test]
    fn test_center_stays_on_unit_circle() {
        let sol =
            solve_linear_system("dx/dt = y\ndy/dt = -x", &ics_xy(1.0, 0.0), 6.0, 0.1).unwrap();
        let values: Vec<Complex64> = sol.eigenvalues.iter().map(|e| e.value).collect();
        assert_eq!(values[0], Complex64::new(0.0, 1.0));
        assert_eq!(values[1], Complex64::new(0.0, -1.0));
        assert_eq!(classify_stability(&values), "marginally stable (center)");
        for i in 0..sol.t.len() {
            assert_relative_eq!(
                sol.x[i] * sol.x[i] + sol.y[i] * sol.y[i],
                1.0,
                epsilon = 1e-4
            );
        }
    }

    #[test]
    fn test_coupled_saddle_trajectory() {
        // dx/dt = y, dy/dt = x: x(t) = cosh(t) with x(0)=1, y(0)=0
        let sol =
            solve_linear_system("dx/dt = y\ndy/dt = x", &ics_xy(1.0, 0.0), 1.0, 0.1).unwrap();
        let i = sol.t.iter().position(|&t| (t - 1.0).abs() < 1e-9).unwrap();
        assert_relative_eq!(sol.x[i], 1.0f64.cosh(), epsilon = 1e-4);
        assert_relative_eq!(sol.y[i], 1.0f64.sinh(), epsilon = 1e-4);
    }

    #[test]
    fn test_matrix_and_forcing_extraction() {
        let sol = solve_linear_system(
            "dx/dt = -x + 2*y + 1\ndy/dt = 3*x - 4*y",
            &ics_xy(1.0, 1.0),
            1.0,
            0.1,
        )
        .unwrap();
        assert_eq!(sol.diagnostics.matrix, "[[-1, 2], [3, -4]]");
        assert_eq!(sol.diagnostics.constants, "[1, 0]");
    }

    #[test]
    fn test_scalar_matrix_repeated_eigenvalue() {
        let sol =
            solve_linear_system("dx/dt = 2*x\ndy/dt = 2*y", &ics_xy(1.0, 3.0), 1.0, 0.5).unwrap();
        assert_eq!(sol.eigenvalues.len(), 1);
        assert_eq!(sol.eigenvalues[0].multiplicity, 2);
        let i = sol.t.len() - 1;
        assert_relative_eq!(sol.x[i], (2.0f64).exp(), epsilon = 1e-4);
        assert_relative_eq!(sol.y[i], 3.0 * (2.0f64).exp(), epsilon = 1e-4);
    }

    #[test]
    fn test_defective_matrix_is_unsupported() {
        let err = solve_linear_system("dx/dt = x + y\ndy/dt = y", &ics_xy(1.0, 1.0), 1.0, 0.1)
            .unwrap_err();
        assert!(matches!(err, SolveError::Unsupported(_)));
    }

    #[test]
    fn test_nonlinear_system_is_unsupported() {
        let err = solve_linear_system("dx/dt = x*y\ndy/dt = -y", &ics_xy(1.0, 1.0), 1.0, 0.1)
            .unwrap_err();
        assert!(matches!(err, SolveError::Unsupported(_)));
    }

    #[test]
    fn test_wrong_line_count_is_format_error() {
        let err = solve_linear_system("dx/dt = -x", &ics_xy(1.0, 1.0), 1.0, 0.1).unwrap_err();
        assert!(matches!(err, SolveError::Format(_)));
    }

    #[test]
    fn test_lines_in_either_order() {
        let sol =
            solve_linear_system("dy/dt = -2*y\ndx/dt = -x", &ics_xy(1.0, 1.0), 1.0, 0.5).unwrap();
        assert_eq!(sol.eigenvalues[0].value, Complex64::new(-1.0, 0.0));
    }

    #[test]
    fn test_eigenvalue_display_forms() {
        assert_eq!(Eigenvalue::new(Complex64::new(-2.0, 0.0), 1).display(), "λ = -2");
        assert_eq!(Eigenvalue::new(Complex64::new(0.0, 1.0), 1).display(), "λ = 1i");
        assert_eq!(
            Eigenvalue::new(Complex64::new(-0.5, -2.0), 1).display(),
            "λ = -0.5 - 2i"
        );
    }

    #[test]
    fn test_eigenvalue_round_trip_six_decimals() {
        for value in [
            Complex64::new(-1.234567, 0.0),
            Complex64::new(0.0, 2.5),
            Complex64::new(0.0, -1.0),
            Complex64::new(3.140001, -0.000123),
        ] {
            let eigenvalue = Eigenvalue::new(value, 1);
            let parsed = parse_eigenvalue(eigenvalue.display()).unwrap();
            assert_relative_eq!(parsed.re, round6(value.re), epsilon = 1e-6);
            assert_relative_eq!(parsed.im, round6(value.im), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_parse_eigenvalue_bare_imaginary_units() {
        assert_eq!(parse_eigenvalue("i").unwrap(), Complex64::new(0.0, 1.0));
        assert_eq!(parse_eigenvalue("-j").unwrap(), Complex64::new(0.0, -1.0));
        assert_eq!(
            parse_eigenvalue("λ = 1 - j").unwrap(),
            Complex64::new(1.0, -1.0)
        );
        assert!(parse_eigenvalue("λ = nonsense").is_err());
    }

    #[test]
    fn test_solver_struct_api() {
        let mut solver =
            LinearSystemSolver::new("dx/dt = -x\ndy/dt = -2*y", ics_xy(1.0, 1.0), 1.0, 0.1);
        solver.solve().unwrap();
        let sol = solver.get_result().unwrap();
        assert_eq!(sol.diagnostics.eigenvalue_lines, vec!["λ = -1", "λ = -2"]);
        assert!(sol.diagnostics.solution_x.starts_with("x(t) ="));
    }
}
