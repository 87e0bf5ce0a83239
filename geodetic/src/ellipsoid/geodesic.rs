//! Problèmes géodésiques direct et inverse (méthode de Bessel par latitudes réduites)

use std::f64::consts::PI;

use tracing::{debug, trace};

use super::solver::Tolerance;
use super::Ellipsoid;
use crate::angle::normalize_azimuth;
use crate::error::{ensure_finite, ensure_latitude, GeodeticError};
use crate::types::{DirectSolution, InverseSolution};

/// Azimut dans [0, 2π) depuis ses composantes (p ∝ sinA, q ∝ cosA).
///
/// `atan(p/q)` en valeur absolue, puis choix du quadrant selon les signes
/// de p et q.
fn quadrant_azimuth(p: f64, q: f64) -> f64 {
    let base = (p / q).atan().abs();
    if p >= 0.0 && q >= 0.0 {
        base
    } else if p >= 0.0 {
        PI - base
    } else if q < 0.0 {
        PI + base
    } else {
        2.0 * PI - base
    }
}

/// Latitude réduite u : (sin u, cos u)
fn reduced_latitude(e2: f64, latitude: f64) -> (f64, f64) {
    let (sin_b, cos_b) = latitude.sin_cos();
    let w = (1.0 - e2 * sin_b * sin_b).sqrt();
    (sin_b * (1.0 - e2).sqrt() / w, cos_b / w)
}

/// Coefficient α de la correction de longitude, fonction de cos²A0
fn longitude_alpha(e2: f64, cos2_a0: f64) -> f64 {
    let (e4, e6) = (e2 * e2, e2 * e2 * e2);
    (e2 / 2.0 + e4 / 8.0 + e6 / 16.0) - (e4 / 16.0 + e6 / 16.0) * cos2_a0
        + (3.0 * e6 / 128.0) * cos2_a0 * cos2_a0
}

impl Ellipsoid {
    /// Coefficients A, B, C de la longueur d'arc sphérique pour k² = e'²·cos²A0
    fn arc_series(&self, k2: f64) -> (f64, f64, f64) {
        let b = self.b;
        (
            b * (1.0 + k2 / 4.0 - 3.0 * k2.powi(2) / 64.0 + 5.0 * k2.powi(3) / 256.0),
            b * (k2 / 8.0 - k2.powi(2) / 32.0 + 15.0 * k2.powi(3) / 1024.0),
            b * (k2.powi(2) / 128.0 - 3.0 * k2.powi(3) / 512.0),
        )
    }

    /// Problème direct : point d'arrivée et azimut inverse depuis un point de
    /// départ, un azimut et une distance.
    ///
    /// Angles en radians, distance en mètres. L'azimut rendu est celui du point
    /// d'arrivée vers le point de départ.
    pub fn direct_geodesic(
        &self,
        longitude: f64,
        latitude: f64,
        azimuth: f64,
        distance: f64,
    ) -> Result<DirectSolution, GeodeticError> {
        const OPERATION: &str = "direct_geodesic";
        ensure_finite(OPERATION, &[longitude, latitude, azimuth, distance])?;
        ensure_latitude(OPERATION, latitude)?;
        if distance < 0.0 {
            return Err(GeodeticError::domain(
                OPERATION,
                format!("distance must be >= 0, got {}", distance),
            ));
        }

        let e2 = self.e2;
        let (sin_u1, cos_u1) = reduced_latitude(e2, latitude);
        let (sin_a1, cos_a1) = azimuth.sin_cos();

        // Fonctions auxiliaires
        let sin_a0 = cos_u1 * sin_a1;
        let cos2_a0 = 1.0 - sin_a0 * sin_a0;
        let sigma1 = sin_u1.atan2(cos_u1 * cos_a1);
        let (sin_2s1, cos_2s1) = (2.0 * sigma1).sin_cos();

        // Longueur d'arc sphérique σ
        let (big_a, big_b, big_c) = self.arc_series(self.ep2 * cos2_a0);
        let sigma0 = (distance - (big_b + big_c * cos_2s1) * sin_2s1) / big_a;
        let (sin_2s0, cos_2s0) = (2.0 * sigma0).sin_cos();
        let sin_sum = sin_2s1 * cos_2s0 + cos_2s1 * sin_2s0;
        let cos_sum = cos_2s1 * cos_2s0 - sin_2s1 * sin_2s0;
        let sigma = sigma0 + (big_b + 5.0 * big_c * cos_sum) * sin_sum / big_a;

        // Correction de longitude δ
        let alpha = longitude_alpha(e2, cos2_a0);
        let beta = (e2.powi(2) / 32.0 + e2.powi(3) / 32.0) * cos2_a0
            - (e2.powi(3) / 64.0) * cos2_a0 * cos2_a0;
        let delta = (alpha * sigma + beta * (sin_sum - sin_2s1)) * sin_a0;

        // Latitude d'arrivée
        let (sin_s, cos_s) = sigma.sin_cos();
        let sin_u2 = sin_u1 * cos_s + cos_u1 * cos_a1 * sin_s;
        let end_latitude = (sin_u2 / ((1.0 - e2).sqrt() * (1.0 - sin_u2 * sin_u2).sqrt())).atan();

        // Différence de longitude sphérique λ, quadrant selon sinA1 et tanλ
        let lambda_den = cos_u1 * cos_s - sin_u1 * sin_s * cos_a1;
        let lambda_raw = (sin_a1 * sin_s / lambda_den).atan();
        let tan_lambda = lambda_raw.tan();
        let mut lambda = lambda_raw.abs();
        if sin_a1 > 0.0 && tan_lambda < 0.0 {
            lambda = PI - lambda;
        } else if sin_a1 < 0.0 && tan_lambda < 0.0 {
            lambda = -lambda;
        } else if sin_a1 < 0.0 && tan_lambda > 0.0 {
            lambda -= PI;
        } else if sin_a1 == 0.0 && lambda_den < 0.0 {
            // Plein nord ou plein sud au-delà du pôle
            lambda = PI;
        }

        // Azimut inverse A2, quadrant selon sinA1 et tanA2
        let azimuth_den = cos_u1 * cos_s * cos_a1 - sin_u1 * sin_s;
        let azimuth_raw = (cos_u1 * sin_a1 / azimuth_den).atan();
        let tan_a2 = azimuth_raw.tan();
        let mut reverse = azimuth_raw.abs();
        if sin_a1 < 0.0 && tan_a2 < 0.0 {
            reverse = PI - reverse;
        } else if sin_a1 > 0.0 && tan_a2 > 0.0 {
            reverse += PI;
        } else if sin_a1 > 0.0 && tan_a2 < 0.0 {
            reverse = 2.0 * PI - reverse;
        } else if sin_a1 == 0.0 {
            reverse = if azimuth_den >= 0.0 { PI } else { 0.0 };
        }

        let end_longitude = longitude + lambda - delta;
        debug!(sigma, lambda, delta, "direct geodesic solved");

        Ok(DirectSolution {
            longitude: end_longitude,
            latitude: end_latitude,
            azimuth: normalize_azimuth(reverse),
        })
    }

    /// Problème inverse : distance et azimuts entre deux points, par
    /// approximations successives de la correction de longitude δ.
    pub fn inverse_geodesic(
        &self,
        start_longitude: f64,
        start_latitude: f64,
        end_longitude: f64,
        end_latitude: f64,
        tolerance: impl Into<Tolerance>,
    ) -> Result<InverseSolution, GeodeticError> {
        const SOLVER: &str = "inverse_geodesic";
        ensure_finite(
            SOLVER,
            &[start_longitude, start_latitude, end_longitude, end_latitude],
        )?;
        ensure_latitude(SOLVER, start_latitude)?;
        ensure_latitude(SOLVER, end_latitude)?;
        let tolerance = tolerance.into();
        tolerance.validate(SOLVER)?;

        let delta_longitude = end_longitude - start_longitude;
        if delta_longitude == 0.0 && start_latitude == end_latitude {
            return Ok(InverseSolution {
                forward_azimuth: 0.0,
                reverse_azimuth: 0.0,
                distance: 0.0,
                iterations: 0,
                estimates: Vec::new(),
            });
        }

        let e2 = self.e2;
        let (sin_u1, cos_u1) = reduced_latitude(e2, start_latitude);
        let (sin_u2, cos_u2) = reduced_latitude(e2, end_latitude);
        let a1 = sin_u1 * sin_u2;
        let a2 = cos_u1 * cos_u2;
        let b1 = cos_u1 * sin_u2;
        let b2 = sin_u1 * cos_u2;

        let mut delta = 0.0;
        let mut estimates = Vec::new();
        let mut converged = None;

        for iteration in 1..=tolerance.max_iterations {
            let lambda = delta_longitude + delta;
            let (sin_l, cos_l) = lambda.sin_cos();

            let p = cos_u2 * sin_l;
            let q = b1 - b2 * cos_l;
            let forward = quadrant_azimuth(p, q);

            let sin_s = p * forward.sin() + q * forward.cos();
            let cos_s = a1 + a2 * cos_l;
            let mut sigma = (sin_s / cos_s).atan().abs();
            if cos_s < 0.0 {
                sigma = PI - sigma;
            }

            let sin_a0 = cos_u1 * forward.sin();
            let cos2_a0 = 1.0 - sin_a0 * sin_a0;
            let x = 2.0 * a1 - cos2_a0 * cos_s;

            let alpha = longitude_alpha(e2, cos2_a0);
            let beta = (e2.powi(2) / 32.0 + e2.powi(3) / 32.0) - (e2.powi(3) / 64.0) * cos2_a0;
            let next_delta = (alpha * sigma - 2.0 * beta * x * sin_s) * sin_a0;

            estimates.push(sigma);
            trace!(
                solver = SOLVER,
                iteration,
                sigma,
                delta = next_delta,
                "successive approximation"
            );

            if !next_delta.is_finite() {
                return Err(GeodeticError::domain(
                    SOLVER,
                    format!("iteration {} produced a non-finite correction", iteration),
                ));
            }

            if (next_delta - delta).abs() <= tolerance.precision {
                converged = Some((iteration, lambda, forward, sigma, cos_s, cos2_a0, x));
                break;
            }
            delta = next_delta;
        }

        let Some((iterations, lambda, forward, sigma, cos_s, cos2_a0, x)) = converged else {
            return Err(GeodeticError::Convergence {
                solver: SOLVER,
                iterations: tolerance.max_iterations,
                best_estimate: estimates.last().copied().unwrap_or(f64::NAN),
            });
        };

        // Longueur de la géodésique S = Aσ + (B"x + C"y)·sinσ
        let (big_a, big_b, big_c) = self.arc_series(self.ep2 * cos2_a0);
        // x / cos²A0 ; sur l'équateur (cos²A0 = 0) x = -cos²A0·cosσ
        let ratio = if cos2_a0 > 0.0 { x / cos2_a0 } else { -cos_s };
        let distance = big_a * sigma
            + (2.0 * big_b * ratio + 2.0 * big_c * (1.0 - 2.0 * ratio * ratio) * sigma.cos())
                * sigma.sin();

        // Azimut direct au point d'arrivée, retourné de π
        let (sin_l, cos_l) = lambda.sin_cos();
        let arrival = quadrant_azimuth(cos_u1 * sin_l, b1 * cos_l - b2);
        let reverse = normalize_azimuth(arrival + PI);

        debug!(iterations, distance, "inverse geodesic converged");

        Ok(InverseSolution {
            forward_azimuth: forward,
            reverse_azimuth: reverse,
            distance,
            iterations,
            estimates,
        })
    }
}
