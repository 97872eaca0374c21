/// a module turns a human-typed differential-equation string into the
/// canonical form the parser understands
///
///# Example
/// ```
/// use diffsolve::equation::normalizer::normalize_equation;
/// let normalized = normalize_equation("d2y/dx2 + y = 0", "y", "x").unwrap();
/// assert_eq!(normalized, "Derivative(y(x),x,x)+y(x)=0");
/// ```
pub mod normalizer;

/// typed map of initial conditions: "y(0)", "dy(0)", "x(0)"
pub mod initial_conditions;
