//! Conversions entre coordonnées cartésiennes géocentriques et géodésiques

use tracing::debug;

use super::solver::{self, Tolerance};
use super::Ellipsoid;
use crate::error::{ensure_finite, ensure_latitude, GeodeticError};
use crate::types::{GeodeticPoint, GeodeticSolution, LatitudeSolution, SpatialPoint};

impl Ellipsoid {
    /// Grande normale N = a / √(1 - e²·sin²B)
    fn normal_radius(&self, latitude: f64) -> f64 {
        self.a / (1.0 - self.e2 * latitude.sin().powi(2)).sqrt()
    }

    /// Latitude géodésique depuis des coordonnées cartésiennes (itération sur tanB).
    ///
    /// `tanBn+1 = t0 + p·tanBn / √(k + tan²Bn)` avec `t0 = Z/√(X²+Y²)`,
    /// `p = c·e²/√(X²+Y²)` et `k = 1 + e'²`.
    pub fn latitude_from_spatial(
        &self,
        point: SpatialPoint,
        tolerance: impl Into<Tolerance>,
    ) -> Result<LatitudeSolution, GeodeticError> {
        const SOLVER: &str = "latitude_from_spatial";
        ensure_finite(SOLVER, &[point.x, point.y, point.z])?;

        let r = point.x.hypot(point.y);
        if r == 0.0 {
            return Err(GeodeticError::domain(
                SOLVER,
                "point lies on the polar axis (X = Y = 0)",
            ));
        }

        let t0 = point.z / r;
        let p = self.c * self.e2 / r;
        let k = 1.0 + self.ep2;

        let result = solver::fixed_point(
            SOLVER,
            t0,
            tolerance.into(),
            |tan_b| t0 + p * tan_b / (k + tan_b * tan_b).sqrt(),
            f64::atan,
        )?;

        Ok(LatitudeSolution {
            latitude: result.state.atan(),
            iterations: result.iterations,
            estimates: result.estimates,
        })
    }

    /// Convertit des coordonnées cartésiennes géocentriques en coordonnées géodésiques
    pub fn spatial_to_geodetic(
        &self,
        point: SpatialPoint,
        tolerance: impl Into<Tolerance>,
    ) -> Result<GeodeticSolution, GeodeticError> {
        const OPERATION: &str = "spatial_to_geodetic";
        ensure_finite(OPERATION, &[point.x, point.y, point.z])?;

        let r = point.x.hypot(point.y);
        if r == 0.0 {
            return Err(GeodeticError::domain(
                OPERATION,
                "point lies on the polar axis (X = Y = 0)",
            ));
        }

        // acos rend [0, π] : l'hémisphère ouest se lit sur le signe de Y
        let mut longitude = (point.x / r).clamp(-1.0, 1.0).acos();
        if point.y < 0.0 {
            longitude = -longitude;
        }

        let solution = self.latitude_from_spatial(point, tolerance)?;
        let latitude = solution.latitude;

        let n = self.normal_radius(latitude);
        let (sin_b, cos_b) = latitude.sin_cos();
        // Formule en Z/sinB sauf près de l'équateur où elle dégénère
        let height = if sin_b.abs() >= cos_b.abs() {
            point.z / sin_b - n * (1.0 - self.e2)
        } else {
            r / cos_b - n
        };

        debug!(
            longitude,
            latitude,
            height,
            iterations = solution.iterations,
            "spatial to geodetic"
        );

        Ok(GeodeticSolution {
            point: GeodeticPoint::new(longitude, latitude, height),
            iterations: solution.iterations,
            estimates: solution.estimates,
        })
    }

    /// Convertit des coordonnées géodésiques en coordonnées cartésiennes géocentriques
    pub fn geodetic_to_spatial(&self, point: GeodeticPoint) -> Result<SpatialPoint, GeodeticError> {
        const OPERATION: &str = "geodetic_to_spatial";
        ensure_finite(OPERATION, &[point.longitude, point.latitude, point.height])?;
        ensure_latitude(OPERATION, point.latitude)?;

        let n = self.normal_radius(point.latitude);
        let (sin_b, cos_b) = point.latitude.sin_cos();
        let (sin_l, cos_l) = point.longitude.sin_cos();

        Ok(SpatialPoint {
            x: (n + point.height) * cos_b * cos_l,
            y: (n + point.height) * cos_b * sin_l,
            z: (n * (1.0 - self.e2) + point.height) * sin_b,
        })
    }
}
