//! Types d'erreurs pour le crate geodetic

use thiserror::Error;

/// Erreurs pouvant survenir lors des calculs géodésiques
#[derive(Debug, Error)]
pub enum GeodeticError {
    /// Entrée hors du domaine mathématique de l'opération
    #[error("Domain error in {operation}: {reason}")]
    Domain {
        operation: &'static str,
        reason: String,
    },

    /// Le solveur itératif a épuisé son nombre maximal d'itérations
    #[error(
        "{solver} did not converge after {iterations} iterations (best estimate: {best_estimate})"
    )]
    Convergence {
        solver: &'static str,
        iterations: usize,
        best_estimate: f64,
    },

    /// Transformation entre deux projections d'ellipsoïdes différents
    #[error(
        "Incompatible reference ellipsoids: source (a={}, b={}) vs target (a={}, b={})",
        .source_axes.0,
        .source_axes.1,
        .target_axes.0,
        .target_axes.1
    )]
    IncompatibleReference {
        source_axes: (f64, f64),
        target_axes: (f64, f64),
    },

    /// Paramètres d'ellipsoïde ou de projection invalides
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Ellipsoïde absent du registre
    #[error("Unknown ellipsoid: {0}")]
    UnknownEllipsoid(String),

    /// Projection absente du registre
    #[error("Unknown projection: {0}")]
    UnknownProjection(String),

    /// Erreur d'I/O lors de la lecture d'un registre
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Registre JSON invalide
    #[error("Invalid registry JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl GeodeticError {
    /// Crée une erreur de domaine avec contexte
    pub fn domain(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Domain {
            operation,
            reason: reason.into(),
        }
    }

    /// Crée une erreur de paramètre invalide
    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        Self::InvalidParameter(reason.into())
    }
}

/// Vérifie que toutes les valeurs d'entrée sont finies
pub(crate) fn ensure_finite(operation: &'static str, values: &[f64]) -> Result<(), GeodeticError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(GeodeticError::domain(operation, "non-finite input"))
    }
}

/// Vérifie que la latitude est dans [-π/2, π/2]
pub(crate) fn ensure_latitude(operation: &'static str, latitude: f64) -> Result<(), GeodeticError> {
    if latitude.abs() > std::f64::consts::FRAC_PI_2 {
        return Err(GeodeticError::domain(
            operation,
            format!("latitude out of range: {}", latitude),
        ));
    }
    Ok(())
}
