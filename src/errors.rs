use thiserror::Error;

/// Error taxonomy shared by every solver path.
///
/// `NoSolution` is an expected outcome of the analytic path (the candidate
/// search exhausted all branches), not an exceptional one; callers are meant
/// to branch on it. Everything else ends the current call.
#[derive(Debug, Error, PartialEq)]
pub enum SolveError {
    /// Malformed input detected before any computation: missing `=`,
    /// wrong left-hand side, wrong number of lines for a system.
    #[error("equation format error: {0}")]
    Format(String),
    /// The normalizer could not canonicalize the equation string.
    /// Carries the offending fragment; never retried with alternate rules.
    #[error("normalization error near '{0}'")]
    Normalization(String),
    /// The recursive-descent parser rejected a normalized expression.
    #[error("parse error: {0}")]
    Parse(String),
    /// Numeric evaluation produced a non-finite or otherwise unusable value.
    #[error("numeric evaluation error: {0}")]
    Eval(String),
    /// All candidate closed-form solutions were rejected by the validity
    /// probe. An ordinary outcome for equations outside the probe's reach.
    #[error("no valid solution found")]
    NoSolution,
    /// The equation falls outside the closed-form classes this solver
    /// covers (including defective eigenvalues on the system path).
    #[error("unsupported equation: {0}")]
    Unsupported(String),
    /// The linear solve for the integration constants is singular.
    #[error("could not determine integration constants: {0}")]
    Singular(String),
}

impl SolveError {
    /// True for the sentinel "no valid solution" outcome which callers
    /// must handle without treating it as a failure of the solver itself.
    pub fn is_no_solution(&self) -> bool {
        matches!(self, SolveError::NoSolution)
    }
}
