//! Itération de point fixe bornée, partagée par les solveurs de latitude

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::GeodeticError;

/// Nombre maximal d'itérations par défaut
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Critère d'arrêt d'un solveur itératif
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Écart maximal accepté entre deux estimations successives (radians)
    pub precision: f64,
    /// Nombre maximal d'itérations avant échec
    pub max_iterations: usize,
}

impl Tolerance {
    pub fn new(precision: f64, max_iterations: usize) -> Self {
        Self {
            precision,
            max_iterations,
        }
    }

    pub(crate) fn validate(&self, operation: &'static str) -> Result<(), GeodeticError> {
        if !self.precision.is_finite() || self.precision < 0.0 {
            return Err(GeodeticError::domain(
                operation,
                format!("precision must be finite and >= 0, got {}", self.precision),
            ));
        }
        if self.max_iterations == 0 {
            return Err(GeodeticError::domain(
                operation,
                "max_iterations must be at least 1",
            ));
        }
        Ok(())
    }
}

impl From<f64> for Tolerance {
    fn from(precision: f64) -> Self {
        Self::new(precision, DEFAULT_MAX_ITERATIONS)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::from(1e-13)
    }
}

/// Résultat d'une itération de point fixe
#[derive(Debug, Clone)]
pub(crate) struct FixedPoint {
    /// Dernier état calculé
    pub state: f64,
    pub iterations: usize,
    /// Mesure de l'état initial puis de chaque état successif
    pub estimates: Vec<f64>,
}

/// Itère `step` depuis `initial` jusqu'à ce que la mesure de deux états
/// successifs diffère d'au plus `tolerance.precision`.
///
/// `measure` projette l'état sur la grandeur suivie (identité pour une
/// latitude, `atan` pour une tangente de latitude).
pub(crate) fn fixed_point(
    solver: &'static str,
    initial: f64,
    tolerance: Tolerance,
    step: impl Fn(f64) -> f64,
    measure: impl Fn(f64) -> f64,
) -> Result<FixedPoint, GeodeticError> {
    tolerance.validate(solver)?;

    let mut state = initial;
    let mut current = measure(state);
    let mut estimates = vec![current];

    for iteration in 1..=tolerance.max_iterations {
        let next_state = step(state);
        let next = measure(next_state);
        estimates.push(next);
        trace!(solver, iteration, estimate = next, "fixed-point step");

        if !next.is_finite() {
            return Err(GeodeticError::domain(
                solver,
                format!("iteration {} produced a non-finite estimate", iteration),
            ));
        }

        if (next - current).abs() <= tolerance.precision {
            debug!(solver, iterations = iteration, "converged");
            return Ok(FixedPoint {
                state: next_state,
                iterations: iteration,
                estimates,
            });
        }

        state = next_state;
        current = next;
    }

    Err(GeodeticError::Convergence {
        solver,
        iterations: tolerance.max_iterations,
        best_estimate: current,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converges_on_contraction() {
        // x = cos(x) converge vers 0.739085...
        let result = fixed_point("cos", 1.0, Tolerance::from(1e-12), f64::cos, |x| x).unwrap();
        assert!((result.state - 0.739_085_133_215_160_6).abs() < 1e-11);
        assert_eq!(result.estimates.len(), result.iterations + 1);
        assert_eq!(result.estimates[0], 1.0);
    }

    #[test]
    fn test_cap_reports_best_estimate() {
        let tolerance = Tolerance::new(1e-30, 5);
        let err = fixed_point("grow", 1.0, tolerance, |x| x + 1.0, |x| x).unwrap_err();
        match err {
            GeodeticError::Convergence {
                solver,
                iterations,
                best_estimate,
            } => {
                assert_eq!(solver, "grow");
                assert_eq!(iterations, 5);
                assert_eq!(best_estimate, 6.0);
            }
            other => panic!("Expected Convergence error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_precision() {
        let err = fixed_point("x", 0.0, Tolerance::from(f64::NAN), |x| x, |x| x).unwrap_err();
        assert!(matches!(err, GeodeticError::Domain { .. }));
        let err = fixed_point("x", 0.0, Tolerance::from(-1.0), |x| x, |x| x).unwrap_err();
        assert!(matches!(err, GeodeticError::Domain { .. }));
    }

    #[test]
    fn test_zero_precision_stops_on_exact_fixed_point() {
        let result = fixed_point("id", 2.0, Tolerance::from(0.0), |x| x, |x| x).unwrap();
        assert_eq!(result.iterations, 1);
    }
}
