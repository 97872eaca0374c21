//! Equilibrium classification for a linear system from its eigenvalues.

use num_complex::Complex64;

const REAL_PART_TOL: f64 = 1e-12;

/// Classifies the origin of a linear system by the real parts of its
/// eigenvalues. Zero real parts take priority over the mixed verdict: a
/// center is reported even when the other eigenvalue is off-axis.
pub fn classify_stability(eigenvalues: &[Complex64]) -> &'static str {
    if eigenvalues.is_empty() {
        return "mixed behavior";
    }
    if eigenvalues.iter().any(|l| l.re.abs() <= REAL_PART_TOL) {
        return "marginally stable (center)";
    }
    if eigenvalues.iter().all(|l| l.re < 0.0) {
        return "asymptotically stable (sink)";
    }
    if eigenvalues.iter().all(|l| l.re > 0.0) {
        return "unstable (source)";
    }
    "mixed behavior"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink() {
        let eigenvalues = [Complex64::new(-1.0, 0.0), Complex64::new(-2.0, 0.0)];
        assert_eq!(classify_stability(&eigenvalues), "asymptotically stable (sink)");
    }

    #[test]
    fn test_source() {
        let eigenvalues = [Complex64::new(1.0, 0.0), Complex64::new(2.0, 0.0)];
        assert_eq!(classify_stability(&eigenvalues), "unstable (source)");
    }

    #[test]
    fn test_center() {
        let eigenvalues = [Complex64::new(0.0, 1.0), Complex64::new(0.0, -1.0)];
        assert_eq!(classify_stability(&eigenvalues), "marginally stable (center)");
    }

    #[test]
    fn test_spiral_sink_counts_as_sink() {
        let eigenvalues = [Complex64::new(-0.5, 2.0), Complex64::new(-0.5, -2.0)];
        assert_eq!(classify_stability(&eigenvalues), "asymptotically stable (sink)");
    }

    #[test]
    fn test_saddle_is_mixed() {
        let eigenvalues = [Complex64::new(-1.0, 0.0), Complex64::new(3.0, 0.0)];
        assert_eq!(classify_stability(&eigenvalues), "mixed behavior");
    }

    #[test]
    fn test_zero_real_part_wins_over_mixed() {
        let eigenvalues = [Complex64::new(0.0, 0.0), Complex64::new(5.0, 0.0)];
        assert_eq!(classify_stability(&eigenvalues), "marginally stable (center)");
    }
}
