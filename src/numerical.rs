/// Fixed-step explicit integrators (Euler, Heun, classical RK4, second-order
/// Taylor) for a single first-order equation written as `dy/dx = f(x, y)`.
pub mod fixed_step;

/// Closed-form solution path: normalization, the internal dsolve over the
/// supported equation classes, candidate validity probing, grid evaluation,
/// and the least-squares post-fit.
pub mod analytic;

/// Two-equation constant-coefficient linear systems: matrix extraction,
/// eigenvalues and eigenvectors, the general solution with constants fitted
/// to the initial conditions, and the diagnostics record.
pub mod linear_system;

/// Qualitative equilibrium classification from the eigenvalue spectrum.
pub mod stability;
