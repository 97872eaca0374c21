//! # Symbolic Engine Module
//!
//! Core symbolic expression type for the equation-solving paths. An equation
//! string, once normalized, is parsed into an [`Expr`] tree; the tree is then
//! differentiated (coefficient extraction for the linear-system matrix,
//! characteristic-polynomial setup), substituted into, and finally evaluated
//! numerically over a time grid — either in `f64` or, where fractional powers
//! of negative bases can appear, in `Complex64` with an imaginary-residue
//! check.
//!
//! The engine deliberately supports only the function vocabulary the
//! calculator exposes to students: `sin`, `cos`, `tan`, `exp`, `log`/`ln`,
//! `sqrt` (as a rational power), plus the arithmetic operators. Nothing else
//! is reachable from a user-entered string.

#![allow(non_camel_case_types)]

use num_complex::Complex64;
use std::collections::HashMap;
use std::fmt;

/// Symbolic expression tree.
///
/// Variables are plain names; derivative markers produced by the equation
/// normalizer (`d1y`, `d2y`, ...) are ordinary variables at this level, which
/// is what makes partial differentiation with respect to a derivative an
/// ordinary [`Expr::diff`] call.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g. "x", "y", "d1y")
    Var(String),
    /// Numerical constant value
    Const(f64),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent. Roots arrive here as rational
    /// exponents, e.g. sqrt(y) is Pow(y, 1/2).
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function e^x
    Exp(Box<Expr>),
    /// Natural logarithm
    Ln(Box<Expr>),
    sin(Box<Expr>),
    cos(Box<Expr>),
    /// Tangent - mathematical notation 'tg'
    tg(Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tg({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// Creates multiple symbolic variables from a comma-separated string.
    pub fn Symbols(symbols: &str) -> Vec<Expr> {
        symbols
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| Expr::Var(s.to_string()))
            .collect()
    }

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    /// Substitutes a variable with a constant value throughout the expression.
    pub fn set_variable(&self, var: &str, value: f64) -> Expr {
        self.substitute_variable(var, &Expr::Const(value))
    }

    /// Substitutes several variables with constant values at once.
    pub fn set_variable_from_map(&self, var_map: &HashMap<String, f64>) -> Expr {
        let mut result = self.clone();
        for (name, value) in var_map {
            result = result.set_variable(name, *value);
        }
        result
    }

    /// Substitutes a variable with an arbitrary expression.
    pub fn substitute_variable(&self, var: &str, replacement: &Expr) -> Expr {
        let sub = |e: &Expr| Box::new(e.substitute_variable(var, replacement));
        match self {
            Expr::Var(name) if name == var => replacement.clone(),
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(sub(lhs), sub(rhs)),
            Expr::Sub(lhs, rhs) => Expr::Sub(sub(lhs), sub(rhs)),
            Expr::Mul(lhs, rhs) => Expr::Mul(sub(lhs), sub(rhs)),
            Expr::Div(lhs, rhs) => Expr::Div(sub(lhs), sub(rhs)),
            Expr::Pow(base, exp) => Expr::Pow(sub(base), sub(exp)),
            Expr::Exp(expr) => Expr::Exp(sub(expr)),
            Expr::Ln(expr) => Expr::Ln(sub(expr)),
            Expr::sin(expr) => Expr::sin(sub(expr)),
            Expr::cos(expr) => Expr::cos(sub(expr)),
            Expr::tg(expr) => Expr::tg(sub(expr)),
        }
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => {
                left.contains_variable(var_name) || right.contains_variable(var_name)
            }
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::sin(expr)
            | Expr::cos(expr)
            | Expr::tg(expr) => expr.contains_variable(var_name),
        }
    }

    /// Collects all variable names in the expression, sorted and deduplicated.
    pub fn extract_variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names.sort();
        names.dedup();
        names
    }

    fn collect_variables(&self, names: &mut Vec<String>) {
        match self {
            Expr::Var(name) => names.push(name.clone()),
            Expr::Const(_) => {}
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::sin(expr)
            | Expr::cos(expr)
            | Expr::tg(expr) => expr.collect_variables(names),
        }
    }

    /// Algebraic simplification: constant folding plus the identities
    /// x + 0 = x, x * 1 = x, x * 0 = 0, x / 1 = x, x ^ 1 = x, x ^ 0 = 1.
    /// Applied bottom-up, one pass; enough to collapse the partial
    /// derivatives of linear expressions down to bare constants.
    pub fn simplify_(&self) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => {
                let (l, r) = (lhs.simplify_(), rhs.simplify_());
                match (&l, &r) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a + b),
                    (Expr::Const(a), _) if *a == 0.0 => r,
                    (_, Expr::Const(b)) if *b == 0.0 => l,
                    _ => Expr::Add(l.boxed(), r.boxed()),
                }
            }
            Expr::Sub(lhs, rhs) => {
                let (l, r) = (lhs.simplify_(), rhs.simplify_());
                match (&l, &r) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a - b),
                    (_, Expr::Const(b)) if *b == 0.0 => l,
                    (Expr::Const(a), _) if *a == 0.0 => {
                        Expr::Mul(Expr::Const(-1.0).boxed(), r.boxed())
                    }
                    _ => Expr::Sub(l.boxed(), r.boxed()),
                }
            }
            Expr::Mul(lhs, rhs) => {
                let (l, r) = (lhs.simplify_(), rhs.simplify_());
                match (&l, &r) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a * b),
                    (Expr::Const(a), _) if *a == 0.0 => Expr::Const(0.0),
                    (_, Expr::Const(b)) if *b == 0.0 => Expr::Const(0.0),
                    (Expr::Const(a), _) if *a == 1.0 => r,
                    (_, Expr::Const(b)) if *b == 1.0 => l,
                    // collapse stacked constant factors: a * (b * e) = (a*b) * e
                    (Expr::Const(a), Expr::Mul(inner_l, inner_r)) => {
                        if let Expr::Const(b) = &**inner_l {
                            let folded = a * b;
                            if folded == 0.0 {
                                Expr::Const(0.0)
                            } else if folded == 1.0 {
                                (**inner_r).clone()
                            } else {
                                Expr::Mul(Expr::Const(folded).boxed(), inner_r.clone())
                            }
                        } else {
                            Expr::Mul(l.clone().boxed(), r.clone().boxed())
                        }
                    }
                    _ => Expr::Mul(l.boxed(), r.boxed()),
                }
            }
            Expr::Div(lhs, rhs) => {
                let (l, r) = (lhs.simplify_(), rhs.simplify_());
                match (&l, &r) {
                    (Expr::Const(a), Expr::Const(b)) if *b != 0.0 => Expr::Const(a / b),
                    (Expr::Const(a), _) if *a == 0.0 => Expr::Const(0.0),
                    (_, Expr::Const(b)) if *b == 1.0 => l,
                    _ => Expr::Div(l.boxed(), r.boxed()),
                }
            }
            Expr::Pow(base, exp) => {
                let (b, e) = (base.simplify_(), exp.simplify_());
                match (&b, &e) {
                    (Expr::Const(a), Expr::Const(n)) => Expr::Const(a.powf(*n)),
                    (_, Expr::Const(n)) if *n == 1.0 => b,
                    (_, Expr::Const(n)) if *n == 0.0 => Expr::Const(1.0),
                    _ => Expr::Pow(b.boxed(), e.boxed()),
                }
            }
            Expr::Exp(expr) => match expr.simplify_() {
                Expr::Const(v) => Expr::Const(v.exp()),
                e => Expr::Exp(e.boxed()),
            },
            Expr::Ln(expr) => match expr.simplify_() {
                Expr::Const(v) if v > 0.0 => Expr::Const(v.ln()),
                e => Expr::Ln(e.boxed()),
            },
            Expr::sin(expr) => match expr.simplify_() {
                Expr::Const(v) => Expr::Const(v.sin()),
                e => Expr::sin(e.boxed()),
            },
            Expr::cos(expr) => match expr.simplify_() {
                Expr::Const(v) => Expr::Const(v.cos()),
                e => Expr::cos(e.boxed()),
            },
            Expr::tg(expr) => match expr.simplify_() {
                Expr::Const(v) => Expr::Const(v.tan()),
                e => Expr::tg(e.boxed()),
            },
        }
    }

    /// Returns the constant value of the expression, if after simplification
    /// it contains no variables.
    pub fn as_constant(&self) -> Option<f64> {
        match self.simplify_() {
            Expr::Const(v) => Some(v),
            _ => None,
        }
    }

    /// Evaluates the expression with the given variable bindings.
    /// Unknown variables are an error, not a silent zero.
    pub fn eval_f64(&self, vars: &HashMap<String, f64>) -> Result<f64, String> {
        match self {
            Expr::Var(name) => vars
                .get(name)
                .copied()
                .ok_or_else(|| format!("unbound variable '{}'", name)),
            Expr::Const(val) => Ok(*val),
            Expr::Add(lhs, rhs) => Ok(lhs.eval_f64(vars)? + rhs.eval_f64(vars)?),
            Expr::Sub(lhs, rhs) => Ok(lhs.eval_f64(vars)? - rhs.eval_f64(vars)?),
            Expr::Mul(lhs, rhs) => Ok(lhs.eval_f64(vars)? * rhs.eval_f64(vars)?),
            Expr::Div(lhs, rhs) => Ok(lhs.eval_f64(vars)? / rhs.eval_f64(vars)?),
            Expr::Pow(base, exp) => Ok(base.eval_f64(vars)?.powf(exp.eval_f64(vars)?)),
            Expr::Exp(expr) => Ok(expr.eval_f64(vars)?.exp()),
            Expr::Ln(expr) => Ok(expr.eval_f64(vars)?.ln()),
            Expr::sin(expr) => Ok(expr.eval_f64(vars)?.sin()),
            Expr::cos(expr) => Ok(expr.eval_f64(vars)?.cos()),
            Expr::tg(expr) => Ok(expr.eval_f64(vars)?.tan()),
        }
    }

    /// Complex-valued evaluation. Used by the validity probe and the final
    /// grid sweep: fractional powers of negative bases come out with an
    /// imaginary part here instead of NaN, so the caller can distinguish
    /// "genuinely complex" (reject) from "real up to rounding" (collapse).
    pub fn eval_complex(&self, vars: &HashMap<String, Complex64>) -> Result<Complex64, String> {
        match self {
            Expr::Var(name) => vars
                .get(name)
                .copied()
                .ok_or_else(|| format!("unbound variable '{}'", name)),
            Expr::Const(val) => Ok(Complex64::new(*val, 0.0)),
            Expr::Add(lhs, rhs) => Ok(lhs.eval_complex(vars)? + rhs.eval_complex(vars)?),
            Expr::Sub(lhs, rhs) => Ok(lhs.eval_complex(vars)? - rhs.eval_complex(vars)?),
            Expr::Mul(lhs, rhs) => Ok(lhs.eval_complex(vars)? * rhs.eval_complex(vars)?),
            Expr::Div(lhs, rhs) => Ok(lhs.eval_complex(vars)? / rhs.eval_complex(vars)?),
            Expr::Pow(base, exp) => {
                let b = base.eval_complex(vars)?;
                let e = exp.eval_complex(vars)?;
                // 0^positive is 0; powc would give NaN via log(0)
                if b.norm() == 0.0 && e.re > 0.0 {
                    return Ok(Complex64::new(0.0, 0.0));
                }
                Ok(b.powc(e))
            }
            Expr::Exp(expr) => Ok(expr.eval_complex(vars)?.exp()),
            Expr::Ln(expr) => Ok(expr.eval_complex(vars)?.ln()),
            Expr::sin(expr) => Ok(expr.eval_complex(vars)?.sin()),
            Expr::cos(expr) => Ok(expr.eval_complex(vars)?.cos()),
            Expr::tg(expr) => Ok(expr.eval_complex(vars)?.tan()),
        }
    }
}

/// Macro to create symbolic variables from a comma-separated list.
/// Usage: symbols!(x, y) -> creates variables x, y
#[macro_export]
macro_rules! symbols {
    ($($var:ident),+ $(,)?) => {
        {
            let var_names = stringify!($($var),+);
            let vars = Expr::Symbols(var_names);
            let mut iter = vars.into_iter();
            ($(
                {
                    let $var = iter.next().unwrap();
                    $var
                }
            ),+)
        }
    };
}
