//! Equation-string canonicalization.
//!
//! Converts a human-typed differential-equation string (Leibniz notation,
//! implicit multiplication, `^` for powers, bare variable names) into the
//! canonical form the crate's parser consumes. Rules run in a fixed order,
//! each a single pass over the then-current string, and each idempotent on
//! already-normalized input:
//!
//! 1. strip whitespace;
//! 2. Leibniz rewrite: `d2y/dx2` then `dy/dx` become `Derivative(...)` tokens;
//! 3. root rewrite: `sqrt(...)` / `raiz(...)` and `expr^(p/q)` become
//!    explicit rational powers (the parser's automatic handling of implicit
//!    roots over function applications is not trusted);
//! 4. implicit-multiplication insertion (digit-letter, letter-`(`,
//!    `)`-letter, `)`-`(` adjacency);
//! 5. every standalone occurrence of the dependent name not already applied
//!    gets the independent variable appended (`y` -> `y(x)`).
//!
//! The system variant lower-cases the left-hand side before matching it
//! against the accepted derivative spellings; the single-equation variant
//! does not. That asymmetry is kept as observed behavior.

use crate::errors::SolveError;
use log::debug;
use regex::Regex;

/// Function names that must never receive an implicit `*` before their
/// opening parenthesis.
const PROTECTED_CALLS: [&str; 11] = [
    "Derivative", "sin", "cos", "tan", "tg", "exp", "log", "ln", "sqrt", "raiz", "Pow",
];

fn regex_for(pattern: &str) -> Result<Regex, SolveError> {
    Regex::new(pattern).map_err(|_| SolveError::Normalization(pattern.to_string()))
}

/// Leibniz-notation rewrite for a single equation in `func_name(indep_var)`.
fn rewrite_leibniz(eq: &str, func_name: &str, indep_var: &str) -> String {
    let second = format!("d2{}/d{}2", func_name, indep_var);
    let second_repl = format!(
        "Derivative({}({}),{},{})",
        func_name, indep_var, indep_var, indep_var
    );
    let first = format!("d{}/d{}", func_name, indep_var);
    let first_repl = format!("Derivative({}({}),{})", func_name, indep_var, indep_var);
    eq.replace(&second, &second_repl).replace(&first, &first_repl)
}

/// Root rewrite: `sqrt`/`raiz` calls and `^(p/q)` powers become explicit
/// rational-exponent form.
fn rewrite_roots(expr: &str, func_name: &str, indep_var: &str) -> Result<String, SolveError> {
    let f = regex::escape(func_name);
    let mut out = expr.to_string();

    // sqrt/raiz applied directly to the dependent symbol
    let dep_root = regex_for(&format!(r"(?i)(?:sqrt|raiz)\(\s*{}\s*\)", f))?;
    out = dep_root
        .replace_all(&out, format!("({}({}))^(1/2)", func_name, indep_var))
        .into_owned();

    // sqrt/raiz over any other argument
    let any_root = regex_for(r"(?i)(?:sqrt|raiz)\(([^)]+)\)")?;
    out = any_root.replace_all(&out, "($1)^(1/2)").into_owned();

    // fractional powers: base^(p/q), appending the argument when the base
    // is the bare dependent symbol
    let frac_pow = regex_for(r"(\w+|\([^)]+\))\^\((\d+)/(\d+)\)")?;
    let func_name = func_name.to_string();
    let indep_var = indep_var.to_string();
    out = frac_pow
        .replace_all(&out, |caps: &regex::Captures| {
            let base = &caps[1];
            if base == func_name {
                format!("({}({}))^({}/{})", func_name, indep_var, &caps[2], &caps[3])
            } else {
                format!("({})^({}/{})", base, &caps[2], &caps[3])
            }
        })
        .into_owned();
    Ok(out)
}

/// Inserts explicit `*` at digit-letter, letter-`(`, `)`-letter and
/// `)`-`(` adjacencies. Known function calls and applications of the
/// dependent names keep their parenthesis.
fn insert_implicit_multiplication(expr: &str, applied_names: &[&str]) -> Result<String, SolveError> {
    let mut out = expr.to_string();

    let digit_letter = regex_for(r"(\d)([A-Za-z])")?;
    out = digit_letter.replace_all(&out, "$1*$2").into_owned();

    let digit_paren = regex_for(r"(\d)\(")?;
    out = digit_paren.replace_all(&out, "$1*(").into_owned();

    let ident_paren = regex_for(r"([A-Za-z][A-Za-z0-9]*)\(")?;
    out = ident_paren
        .replace_all(&out, |caps: &regex::Captures| {
            let ident = &caps[1];
            if PROTECTED_CALLS.contains(&ident) || applied_names.contains(&ident) {
                format!("{}(", ident)
            } else {
                format!("{}*(", ident)
            }
        })
        .into_owned();

    let paren_letter = regex_for(r"\)([A-Za-z])")?;
    out = paren_letter.replace_all(&out, ")*$1").into_owned();

    let paren_paren = regex_for(r"\)\(")?;
    out = paren_paren.replace_all(&out, ")*(").into_owned();
    Ok(out)
}

/// Appends `(indep_var)` to every standalone occurrence of `func_name` that
/// is not already followed by `(`. A plain scan instead of a lookahead
/// pattern: overlapping `y+y` occurrences all get rewritten.
fn apply_function_argument(expr: &str, func_name: &str, indep_var: &str) -> String {
    let chars: Vec<char> = expr.chars().collect();
    let mut out = String::with_capacity(expr.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                i += 1;
            }
            let ident: String = chars[start..i].iter().collect();
            out.push_str(&ident);
            let next = chars.get(i).copied();
            if ident == func_name && next != Some('(') {
                out.push('(');
                out.push_str(indep_var);
                out.push(')');
            }
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

/// Normalizes a single differential equation in `func_name(indep_var)`.
///
/// Input must contain exactly one `=`. The output is parseable on both
/// sides of the `=` after [`strip_derivative_markers`].
pub fn normalize_equation(
    eq: &str,
    func_name: &str,
    indep_var: &str,
) -> Result<String, SolveError> {
    if eq.trim().is_empty() {
        return Err(SolveError::Format("empty equation".to_string()));
    }
    if eq.matches('=').count() != 1 {
        return Err(SolveError::Format(
            "equation must contain exactly one '='".to_string(),
        ));
    }
    let mut out: String = eq.split_whitespace().collect();
    out = rewrite_leibniz(&out, func_name, indep_var);
    out = rewrite_roots(&out, func_name, indep_var)?;
    out = insert_implicit_multiplication(&out, &[func_name, indep_var])?;
    out = apply_function_argument(&out, func_name, indep_var);
    debug!("normalized '{}' -> '{}'", eq, out);
    Ok(out)
}

/// Normalizes one line of a 2x2 first-order system in x(t), y(t).
///
/// The left-hand side is lower-cased before matching (different from the
/// single-equation path) and must be one of the accepted `dx/dt` / `dy/dt`
/// spellings. The result is the residual form `Derivative(..) - (rhs)`.
pub fn normalize_system_line(line: &str) -> Result<String, SolveError> {
    let line = line.trim();
    if line.matches('=').count() != 1 {
        return Err(SolveError::Format(
            "each system equation must contain exactly one '='".to_string(),
        ));
    }
    let (lhs_raw, rhs_raw) = line.split_once('=').expect("checked above");

    let lhs: String = lhs_raw.to_lowercase().split_whitespace().collect();
    let lhs = match lhs.as_str() {
        "dx/dt" | "dx/d(t)" | "d(x)/dt" | "d(x)/d(t)" => "Derivative(x(t),t)",
        "dy/dt" | "dy/d(t)" | "d(y)/dt" | "d(y)/d(t)" => "Derivative(y(t),t)",
        other => {
            return Err(SolveError::Format(format!(
                "left-hand side must be dx/dt or dy/dt, got '{}'",
                other
            )));
        }
    };

    let mut rhs = rhs_raw.trim().to_string();
    // decimal commas, e.g. "0,3" -> "0.3"
    let decimal_comma = regex_for(r"(\d),(\d)")?;
    rhs = decimal_comma.replace_all(&rhs, "$1.$2").into_owned();
    // "x y" adjacency separated by spaces
    let spaced_vars = regex_for(r"([A-Za-z])\s+([A-Za-z])")?;
    rhs = spaced_vars.replace_all(&rhs, "$1*$2").into_owned();
    rhs = rhs.split_whitespace().collect();
    rhs = insert_implicit_multiplication(&rhs, &["x", "y"])?;
    rhs = apply_function_argument(&rhs, "x", "t");
    rhs = apply_function_argument(&rhs, "y", "t");

    let normalized = format!("{}-({})", lhs, rhs);
    debug!("normalized system line '{}' -> '{}'", line, normalized);
    Ok(normalized)
}

/// Replaces `Derivative(...)` tokens and applied functions with the opaque
/// variable names the symbolic layer works with: `Derivative(y(x),x,x)` ->
/// `d2y`, `Derivative(y(x),x)` -> `d1y`, `y(x)` -> `y`.
pub fn strip_derivative_markers(s: &str, func_name: &str, indep_var: &str) -> String {
    let second = format!(
        "Derivative({}({}),{},{})",
        func_name, indep_var, indep_var, indep_var
    );
    let first = format!("Derivative({}({}),{})", func_name, indep_var, indep_var);
    let applied = format!("{}({})", func_name, indep_var);
    s.replace(&second, &format!("d2{}", func_name))
        .replace(&first, &format!("d1{}", func_name))
        .replace(&applied, func_name)
}
