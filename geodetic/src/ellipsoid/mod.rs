//! Ellipsoïde de référence et grandeurs dérivées
//!
//! Rayons de courbure, longueur d'arc de méridien et son inverse,
//! conversions cartésiennes ↔ géodésiques et problèmes géodésiques
//! direct et inverse.

mod geodesic;
mod solver;
mod spatial;

pub use solver::{Tolerance, DEFAULT_MAX_ITERATIONS};

use serde::Serialize;

use crate::error::GeodeticError;
use crate::types::{CurvatureRadii, LatitudeSolution};

/// Coefficients de la série de l'arc de méridien (a0, a2, a4, a6, a8), en mètres
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeridianArcCoefficients {
    pub a0: f64,
    pub a2: f64,
    pub a4: f64,
    pub a6: f64,
    pub a8: f64,
}

impl MeridianArcCoefficients {
    /// Dérive les coefficients depuis le demi-grand axe et e².
    ///
    /// `m0 = a(1-e²)`, puis `m2k = (2k+1)/(2k) · e² · m2k-2` pour k = 1..4.
    fn derive(a: f64, e2: f64) -> Self {
        let m0 = a * (1.0 - e2);
        let m2 = 3.0 / 2.0 * e2 * m0;
        let m4 = 5.0 / 4.0 * e2 * m2;
        let m6 = 7.0 / 6.0 * e2 * m4;
        let m8 = 9.0 / 8.0 * e2 * m6;

        Self {
            a0: m0 + m2 / 2.0 + 3.0 / 8.0 * m4 + 5.0 / 16.0 * m6 + 35.0 / 128.0 * m8,
            a2: m2 / 2.0 + m4 / 2.0 + 15.0 / 32.0 * m6 + 7.0 / 16.0 * m8,
            a4: m4 / 8.0 + 3.0 / 16.0 * m6 + 7.0 / 32.0 * m8,
            a6: m6 / 32.0 + m8 / 16.0,
            a8: m8 / 128.0,
        }
    }

    /// Partie périodique de la série : `-a2/2·sin2B + a4/4·sin4B - a6/6·sin6B + a8/8·sin8B`
    fn periodic(&self, latitude: f64) -> f64 {
        -self.a2 / 2.0 * (2.0 * latitude).sin() + self.a4 / 4.0 * (4.0 * latitude).sin()
            - self.a6 / 6.0 * (6.0 * latitude).sin()
            + self.a8 / 8.0 * (8.0 * latitude).sin()
    }
}

/// Ellipsoïde de référence défini par ses deux demi-axes.
///
/// Immuable une fois construit. L'égalité ne dépend que du couple (a, b).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Ellipsoid {
    a: f64,
    b: f64,
    c: f64,
    e2: f64,
    ep2: f64,
    arc: MeridianArcCoefficients,
}

impl Ellipsoid {
    /// Crée un ellipsoïde depuis ses demi-axes en mètres (0 < b < a)
    pub fn new(semimajor_axis: f64, semiminor_axis: f64) -> Result<Self, GeodeticError> {
        let (a, b) = (semimajor_axis, semiminor_axis);
        if !a.is_finite() || !b.is_finite() {
            return Err(GeodeticError::invalid_parameter(format!(
                "ellipsoid axes must be finite (a={}, b={})",
                a, b
            )));
        }
        if !(b > 0.0 && b < a) {
            return Err(GeodeticError::invalid_parameter(format!(
                "ellipsoid axes must satisfy 0 < b < a (a={}, b={})",
                a, b
            )));
        }

        Ok(Self::from_axes(a, b))
    }

    /// Construction sans validation, pour les tables déjà vérifiées
    pub(crate) fn from_axes(a: f64, b: f64) -> Self {
        let v = a * a - b * b;
        let e2 = v / (a * a);

        Self {
            a,
            b,
            c: a * a / b,
            e2,
            ep2: v / (b * b),
            arc: MeridianArcCoefficients::derive(a, e2),
        }
    }

    /// Crée un ellipsoïde depuis le demi-grand axe et l'inverse de l'aplatissement
    pub fn from_inverse_flattening(
        semimajor_axis: f64,
        inverse_flattening: f64,
    ) -> Result<Self, GeodeticError> {
        if !inverse_flattening.is_finite() || inverse_flattening <= 1.0 {
            return Err(GeodeticError::invalid_parameter(format!(
                "inverse flattening must be finite and > 1, got {}",
                inverse_flattening
            )));
        }
        Self::new(
            semimajor_axis,
            semimajor_axis * (1.0 - 1.0 / inverse_flattening),
        )
    }

    /// Demi-grand axe a
    pub fn semimajor_axis(&self) -> f64 {
        self.a
    }

    /// Demi-petit axe b
    pub fn semiminor_axis(&self) -> f64 {
        self.b
    }

    /// Rayon de courbure du méridien au pôle, c = a²/b
    pub fn pole_curvature_radius(&self) -> f64 {
        self.c
    }

    /// Première excentricité au carré e²
    pub fn first_eccentricity_squared(&self) -> f64 {
        self.e2
    }

    /// Deuxième excentricité au carré e'²
    pub fn second_eccentricity_squared(&self) -> f64 {
        self.ep2
    }

    /// Aplatissement f = (a - b) / a
    pub fn flattening(&self) -> f64 {
        (self.a - self.b) / self.a
    }

    pub fn inverse_flattening(&self) -> f64 {
        1.0 / self.flattening()
    }

    /// Couple (a, b) identifiant l'ellipsoïde
    pub fn axes(&self) -> (f64, f64) {
        (self.a, self.b)
    }

    /// η² = e'² · cos²B
    pub fn eta_squared(&self, latitude: f64) -> f64 {
        self.ep2 * latitude.cos().powi(2)
    }

    /// Rayon de courbure du méridien M = c / (1 + η²)^1.5
    pub fn meridian_radius(&self, eta2: f64) -> f64 {
        self.c / (1.0 + eta2).powf(1.5)
    }

    /// Rayon de courbure du premier vertical N = c / √(1 + η²)
    pub fn prime_vertical_radius(&self, eta2: f64) -> f64 {
        self.c / (1.0 + eta2).sqrt()
    }

    /// Rayon de courbure moyen R = c / (1 + η²)
    pub fn mean_radius(&self, eta2: f64) -> f64 {
        self.c / (1.0 + eta2)
    }

    /// Les trois rayons de courbure pour un η² donné
    pub fn curvature_radii(&self, eta2: f64) -> CurvatureRadii {
        CurvatureRadii {
            meridian: self.meridian_radius(eta2),
            prime_vertical: self.prime_vertical_radius(eta2),
            mean: self.mean_radius(eta2),
        }
    }

    /// Coefficients de l'arc de méridien, calculés à la construction
    pub fn meridian_arc_coefficients(&self) -> MeridianArcCoefficients {
        self.arc
    }

    /// Longueur de l'arc de méridien de l'équateur à la latitude B, en mètres
    pub fn meridian_arc(&self, latitude: f64) -> f64 {
        self.arc.a0 * latitude + self.arc.periodic(latitude)
    }

    /// Longueur de l'arc de parallèle pour une différence de longitude l à la latitude B
    pub fn parallel_arc(&self, longitude_difference: f64, latitude: f64) -> f64 {
        self.prime_vertical_radius(self.eta_squared(latitude))
            * latitude.cos()
            * longitude_difference
    }

    /// Latitude dont l'arc de méridien vaut `arc` (itération de point fixe).
    ///
    /// Départ `B0 = X / a0`, puis `Bn+1 = (X - périodique(Bn)) / a0`.
    pub fn latitude_from_meridian_arc(
        &self,
        arc: f64,
        tolerance: impl Into<Tolerance>,
    ) -> Result<LatitudeSolution, GeodeticError> {
        const SOLVER: &str = "latitude_from_meridian_arc";
        crate::error::ensure_finite(SOLVER, &[arc])?;
        let quarter = self.meridian_arc(std::f64::consts::FRAC_PI_2);
        if arc.abs() > quarter {
            return Err(GeodeticError::domain(
                SOLVER,
                format!("meridian arc {} exceeds the quarter meridian {}", arc, quarter),
            ));
        }

        let coefficients = self.arc;
        let result = solver::fixed_point(
            SOLVER,
            arc / coefficients.a0,
            tolerance.into(),
            |latitude| (arc - coefficients.periodic(latitude)) / coefficients.a0,
            |latitude| latitude,
        )?;

        Ok(LatitudeSolution {
            latitude: result.state,
            iterations: result.iterations,
            estimates: result.estimates,
        })
    }
}

impl PartialEq for Ellipsoid {
    fn eq(&self, other: &Self) -> bool {
        self.a == other.a && self.b == other.b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn cgcs2000() -> Ellipsoid {
        Ellipsoid::new(6378137.0, 6356752.31414).unwrap()
    }

    #[test]
    fn test_derived_constants() {
        let e = cgcs2000();
        assert!(e.first_eccentricity_squared() > 0.0 && e.first_eccentricity_squared() < 1.0);
        assert!(e.second_eccentricity_squared() > e.first_eccentricity_squared());
        assert!((e.inverse_flattening() - 298.257222101).abs() < 1e-3);
        assert!((e.pole_curvature_radius() - 6399593.6259).abs() < 1e-3);
    }

    #[test]
    fn test_invalid_axes() {
        assert!(Ellipsoid::new(6356752.0, 6378137.0).is_err());
        assert!(Ellipsoid::new(6378137.0, 6378137.0).is_err());
        assert!(Ellipsoid::new(6378137.0, 0.0).is_err());
        assert!(Ellipsoid::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_from_inverse_flattening() {
        let wgs84 = Ellipsoid::from_inverse_flattening(6378137.0, 298.257223563).unwrap();
        assert!((wgs84.semiminor_axis() - 6356752.314245179).abs() < 1e-6);
    }

    #[test]
    fn test_equality_by_axes() {
        let a = cgcs2000();
        let b = Ellipsoid::new(6378137.0, 6356752.31414).unwrap();
        let c = Ellipsoid::new(6378137.0, 6356752.314245179).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_curvature_radii_at_pole_and_equator() {
        let e = cgcs2000();
        // Au pôle η² = 0 : M = N = R = c
        let pole = e.curvature_radii(e.eta_squared(FRAC_PI_2));
        assert!((pole.meridian - e.pole_curvature_radius()).abs() < 1e-6);
        assert!((pole.prime_vertical - e.pole_curvature_radius()).abs() < 1e-6);
        // A l'équateur N = a
        let equator = e.curvature_radii(e.eta_squared(0.0));
        assert!((equator.prime_vertical - e.semimajor_axis()).abs() < 1e-6);
        assert!(equator.meridian < equator.mean && equator.mean < equator.prime_vertical);
    }

    #[test]
    fn test_coefficients_idempotent() {
        let e = cgcs2000();
        assert_eq!(e.meridian_arc_coefficients(), e.meridian_arc_coefficients());
        let k = e.meridian_arc_coefficients();
        assert!((k.a0 - 6367449.1457).abs() < 1e-3, "a0={}", k.a0);
        assert!((k.a2 - 32077.0174).abs() < 1e-3, "a2={}", k.a2);
    }

    #[test]
    fn test_meridian_arc_monotonic() {
        let e = cgcs2000();
        let mut previous = e.meridian_arc(-FRAC_PI_2 + 1e-6);
        for i in 1..2000 {
            let latitude = -FRAC_PI_2 + 1e-6 + i as f64 * (std::f64::consts::PI - 2e-6) / 2000.0;
            let arc = e.meridian_arc(latitude);
            assert!(arc > previous, "not increasing at B={}", latitude);
            previous = arc;
        }
    }

    #[test]
    fn test_meridian_arc_quarter() {
        // Quart de méridien GRS80 ≈ 10 001 965.729 m
        let e = cgcs2000();
        assert!((e.meridian_arc(FRAC_PI_2) - 10001965.729).abs() < 0.01);
    }

    #[test]
    fn test_latitude_from_meridian_arc_inverts() {
        let e = cgcs2000();
        for deg in [-80.0_f64, -30.0, 0.0, 17.5, 45.0, 89.0] {
            let latitude = deg.to_radians();
            let arc = e.meridian_arc(latitude);
            let solution = e.latitude_from_meridian_arc(arc, 1e-14).unwrap();
            assert!(
                (solution.latitude - latitude).abs() < 1e-12,
                "B={} got {}",
                latitude,
                solution.latitude
            );
            assert_eq!(solution.estimates.len(), solution.iterations + 1);
            assert_eq!(*solution.estimates.last().unwrap(), solution.latitude);
        }
    }

    #[test]
    fn test_latitude_from_meridian_arc_cap() {
        let e = cgcs2000();
        let err = e
            .latitude_from_meridian_arc(3404079.0, Tolerance::new(0.0, 2))
            .unwrap_err();
        assert!(matches!(
            err,
            GeodeticError::Convergence { iterations: 2, .. }
        ));
    }

    #[test]
    fn test_latitude_from_meridian_arc_beyond_pole() {
        let e = cgcs2000();
        for arc in [1e9, -1e9, e.meridian_arc(FRAC_PI_2) + 1.0] {
            let err = e.latitude_from_meridian_arc(arc, 1e-13).unwrap_err();
            assert!(matches!(err, GeodeticError::Domain { .. }), "arc={}", arc);
        }
    }

    #[test]
    fn test_parallel_arc() {
        let e = cgcs2000();
        // A l'équateur, un degré de parallèle = a · π/180
        let arc = e.parallel_arc(1.0_f64.to_radians(), 0.0);
        assert!((arc - 6378137.0 * 1.0_f64.to_radians()).abs() < 1e-6);
    }
}
