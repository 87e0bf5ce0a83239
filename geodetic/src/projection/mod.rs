//! Projection de Gauss-Krüger (famille Mercator transverse, dont UTM)
//!
//! Calcul direct (géodésique → plan), inverse (plan → géodésique) et
//! changement de fuseau par aller-retour sur l'ellipsoïde.

pub mod zone;

pub use zone::ZoneWidth;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::ellipsoid::{Ellipsoid, Tolerance};
use crate::error::{ensure_finite, ensure_latitude, GeodeticError};
use crate::types::PlanePoint;

/// Écart au méridien central au-delà duquel les séries perdent en précision (degrés)
pub const ACCURACY_LIMIT_DEGREES: f64 = 3.5;

/// Avertissement non bloquant : point trop éloigné du méridien central
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Error)]
#[error(
    "longitude difference {:.4}° exceeds {:.1}°: Gauss-Krüger series accuracy degrades",
    .longitude_difference.to_degrees(),
    .limit.to_degrees()
)]
pub struct AccuracyWarning {
    /// Écart au méridien central l, en radians
    pub longitude_difference: f64,
    /// Limite appliquée, en radians
    pub limit: f64,
}

impl AccuracyWarning {
    fn check(longitude_difference: f64) -> Option<Self> {
        let limit = ACCURACY_LIMIT_DEGREES.to_radians();
        (longitude_difference.abs() > limit).then_some(Self {
            longitude_difference,
            limit,
        })
    }
}

fn default_false_easting() -> f64 {
    500_000.0
}

fn default_scale_factor() -> f64 {
    1.0
}

fn default_linear_unit() -> String {
    "Meter (1.0)".to_string()
}

/// Paramètres d'une projection Gauss-Krüger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParameters {
    /// Largeur de fuseau (3 ou 6 degrés)
    pub zone_width: ZoneWidth,

    /// Numéro de zone pour l'encodage préfixé de l'abscisse est (optionnel)
    #[serde(default)]
    pub zone: Option<u32>,

    /// Fausse abscisse est, en mètres
    #[serde(default = "default_false_easting")]
    pub false_easting: f64,

    /// Fausse ordonnée nord, en mètres
    #[serde(default)]
    pub false_northing: f64,

    /// Méridien central, en degrés décimaux
    pub central_meridian: f64,

    /// Facteur d'échelle sur le méridien central (0.9996 pour UTM)
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,

    /// Latitude d'origine, en degrés décimaux
    #[serde(default)]
    pub latitude_of_origin: f64,

    /// Unité linéaire (libellé)
    #[serde(default = "default_linear_unit")]
    pub linear_unit: String,
}

impl ProjectionParameters {
    /// Paramètres Gauss-Krüger usuels : fausse abscisse 500 km, échelle 1
    pub fn gauss_kruger(zone_width: ZoneWidth, central_meridian: f64) -> Self {
        Self {
            zone_width,
            zone: None,
            false_easting: default_false_easting(),
            false_northing: 0.0,
            central_meridian,
            scale_factor: default_scale_factor(),
            latitude_of_origin: 0.0,
            linear_unit: default_linear_unit(),
        }
    }

    /// Paramètres UTM d'une zone (hémisphère sud : fausse ordonnée 10 000 km)
    pub fn utm(zone: u32, south: bool) -> Self {
        Self {
            false_northing: if south { 10_000_000.0 } else { 0.0 },
            scale_factor: 0.9996,
            ..Self::gauss_kruger(ZoneWidth::Six, zone::utm_central_meridian(zone))
        }
    }
}

/// Résultat du calcul direct
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardProjection {
    /// Coordonnées planes vraies (x, y)
    pub plane: PlanePoint,
    /// Coordonnées avec fausses origines (xz, yz)
    pub offset: PlanePoint,
    /// Écart au méridien central l, en radians
    pub longitude_difference: f64,
    /// Arc de méridien depuis la latitude d'origine, en mètres
    pub meridian_arc: f64,
    /// Rayon de courbure du premier vertical N, en mètres
    pub prime_vertical_radius: f64,
    pub warning: Option<AccuracyWarning>,
}

/// Résultat du calcul inverse
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackwardProjection {
    /// Longitude L en radians
    pub longitude: f64,
    /// Latitude B en radians
    pub latitude: f64,
    /// Écart au méridien central l, en radians
    pub longitude_difference: f64,
    /// Latitude du pied de l'ordonnée Bf, en radians
    pub footprint_latitude: f64,
    /// Rayon de courbure du méridien Mf au pied de l'ordonnée
    pub meridian_radius: f64,
    /// Rayon de courbure du premier vertical Nf au pied de l'ordonnée
    pub prime_vertical_radius: f64,
    /// Nombre d'itérations du calcul de Bf
    pub iterations: usize,
    /// Estimations successives de Bf
    pub estimates: Vec<f64>,
    pub warning: Option<AccuracyWarning>,
}

/// Résultat d'un changement de projection (inverse source puis direct cible)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionTransform {
    pub source: BackwardProjection,
    pub target: ForwardProjection,
}

/// Système de projection Gauss-Krüger sur un ellipsoïde donné
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionSystem {
    name: String,
    ellipsoid: Ellipsoid,
    parameters: ProjectionParameters,
    /// Arc de méridien à la latitude d'origine
    #[serde(skip)]
    origin_arc: f64,
}

impl ProjectionSystem {
    /// Crée un système de projection après validation des paramètres
    pub fn new(
        name: impl Into<String>,
        ellipsoid: Ellipsoid,
        parameters: ProjectionParameters,
    ) -> Result<Self, GeodeticError> {
        let name = name.into();
        let p = &parameters;
        let values = [
            p.false_easting,
            p.false_northing,
            p.central_meridian,
            p.scale_factor,
            p.latitude_of_origin,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GeodeticError::invalid_parameter(format!(
                "projection {}: parameters must be finite",
                name
            )));
        }
        if p.scale_factor <= 0.0 {
            return Err(GeodeticError::invalid_parameter(format!(
                "projection {}: scale factor must be > 0, got {}",
                name, p.scale_factor
            )));
        }
        if p.central_meridian.abs() > 180.0 {
            return Err(GeodeticError::invalid_parameter(format!(
                "projection {}: central meridian out of range: {}",
                name, p.central_meridian
            )));
        }
        if p.latitude_of_origin.abs() >= 90.0 {
            return Err(GeodeticError::invalid_parameter(format!(
                "projection {}: latitude of origin out of range: {}",
                name, p.latitude_of_origin
            )));
        }

        Ok(Self::assemble(name, ellipsoid, parameters))
    }

    /// Construction sans validation, pour les tables déjà vérifiées
    pub(crate) fn assemble(
        name: String,
        ellipsoid: Ellipsoid,
        parameters: ProjectionParameters,
    ) -> Self {
        let origin_arc = ellipsoid.meridian_arc(parameters.latitude_of_origin.to_radians());
        Self {
            name,
            ellipsoid,
            parameters,
            origin_arc,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    pub fn parameters(&self) -> &ProjectionParameters {
        &self.parameters
    }

    pub fn zone_width(&self) -> ZoneWidth {
        self.parameters.zone_width
    }

    pub fn zone(&self) -> Option<u32> {
        self.parameters.zone
    }

    pub fn false_easting(&self) -> f64 {
        self.parameters.false_easting
    }

    pub fn false_northing(&self) -> f64 {
        self.parameters.false_northing
    }

    /// Méridien central en degrés décimaux
    pub fn central_meridian(&self) -> f64 {
        self.parameters.central_meridian
    }

    pub fn scale_factor(&self) -> f64 {
        self.parameters.scale_factor
    }

    pub fn latitude_of_origin(&self) -> f64 {
        self.parameters.latitude_of_origin
    }

    pub fn linear_unit(&self) -> &str {
        &self.parameters.linear_unit
    }

    /// Calcul direct : (L, B) en radians vers coordonnées planes.
    ///
    /// Séries d'ordre 6 en l pour x et d'ordre 5 pour y.
    pub fn forward(
        &self,
        longitude: f64,
        latitude: f64,
    ) -> Result<ForwardProjection, GeodeticError> {
        const OPERATION: &str = "forward";
        ensure_finite(OPERATION, &[longitude, latitude])?;
        ensure_latitude(OPERATION, latitude)?;

        let e = &self.ellipsoid;
        let l = longitude - self.parameters.central_meridian.to_radians();
        let meridian_arc = e.meridian_arc(latitude) - self.origin_arc;

        let (sin_b, cos_b) = latitude.sin_cos();
        let t = latitude.tan();
        let t2 = t * t;
        let eta2 = e.eta_squared(latitude);
        let n = e.prime_vertical_radius(eta2);

        let x = meridian_arc
            + n * sin_b * cos_b * l.powi(2) / 2.0
            + n * sin_b * cos_b.powi(3) * (5.0 - t2 + 9.0 * eta2 + 4.0 * eta2 * eta2) * l.powi(4)
                / 24.0
            + n * sin_b * cos_b.powi(5) * (61.0 - 58.0 * t2 + t2 * t2) * l.powi(6) / 720.0;
        let y = n * cos_b * l
            + n * cos_b.powi(3) * (1.0 - t2 + eta2) * l.powi(3) / 6.0
            + n * cos_b.powi(5) * (5.0 - 18.0 * t2 + t2 * t2 + 14.0 * eta2 - 58.0 * eta2 * t2)
                * l.powi(5)
                / 120.0;

        let k = self.parameters.scale_factor;
        let plane = PlanePoint::new(x * k, y * k);
        let offset = PlanePoint::new(
            plane.x + self.parameters.false_northing,
            plane.y + self.parameters.false_easting,
        );

        let warning = AccuracyWarning::check(l);
        if let Some(w) = &warning {
            warn!(projection = %self.name, "{}", w);
        }
        debug!(projection = %self.name, x = offset.x, y = offset.y, "forward");

        Ok(ForwardProjection {
            plane,
            offset,
            longitude_difference: l,
            meridian_arc,
            prime_vertical_radius: n,
            warning,
        })
    }

    /// Calcul inverse : coordonnées planes vers (L, B) en radians.
    ///
    /// Si `has_false_offset`, les fausses origines sont retirées avant calcul.
    pub fn backward(
        &self,
        x: f64,
        y: f64,
        tolerance: impl Into<Tolerance>,
        has_false_offset: bool,
    ) -> Result<BackwardProjection, GeodeticError> {
        ensure_finite("backward", &[x, y])?;

        let (mut x, mut y) = (x, y);
        if has_false_offset {
            x -= self.parameters.false_northing;
            y -= self.parameters.false_easting;
        }
        let k = self.parameters.scale_factor;
        x /= k;
        y /= k;

        let e = &self.ellipsoid;
        // Latitude du pied de l'ordonnée : arc de méridien égal à x
        let footprint = e.latitude_from_meridian_arc(x + self.origin_arc, tolerance)?;
        let bf = footprint.latitude;

        let eta2 = e.eta_squared(bf);
        let tf = bf.tan();
        let tf2 = tf * tf;
        let mf = e.meridian_radius(eta2);
        let nf = e.prime_vertical_radius(eta2);
        let cos_bf = bf.cos();

        let latitude = bf - tf * y.powi(2) / (2.0 * mf * nf)
            + tf * (5.0 + 3.0 * tf2 + eta2 - 9.0 * eta2 * tf2) * y.powi(4)
                / (24.0 * mf * nf.powi(3))
            - tf * (61.0 + 90.0 * tf2 + 45.0 * tf2 * tf2) * y.powi(6) / (720.0 * mf * nf.powi(5));
        let l = y / (nf * cos_bf)
            - (1.0 + 2.0 * tf2 + eta2) * y.powi(3) / (6.0 * nf.powi(3) * cos_bf)
            + (5.0 + 28.0 * tf2 + 24.0 * tf2 * tf2 + 6.0 * eta2 + 8.0 * eta2 * tf2) * y.powi(5)
                / (120.0 * nf.powi(5) * cos_bf);
        let longitude = l + self.parameters.central_meridian.to_radians();

        let warning = AccuracyWarning::check(l);
        if let Some(w) = &warning {
            warn!(projection = %self.name, "{}", w);
        }
        debug!(
            projection = %self.name,
            iterations = footprint.iterations,
            "backward"
        );

        Ok(BackwardProjection {
            longitude,
            latitude,
            longitude_difference: l,
            footprint_latitude: bf,
            meridian_radius: mf,
            prime_vertical_radius: nf,
            iterations: footprint.iterations,
            estimates: footprint.estimates,
            warning,
        })
    }

    /// Changement de projection : calcul inverse dans ce système puis direct dans `target`.
    ///
    /// Les deux systèmes doivent partager le même ellipsoïde.
    pub fn transform_to(
        &self,
        target: &ProjectionSystem,
        x: f64,
        y: f64,
        tolerance: impl Into<Tolerance>,
        has_false_offset: bool,
    ) -> Result<ProjectionTransform, GeodeticError> {
        if self.ellipsoid != target.ellipsoid {
            return Err(GeodeticError::IncompatibleReference {
                source_axes: self.ellipsoid.axes(),
                target_axes: target.ellipsoid.axes(),
            });
        }

        let source = self.backward(x, y, tolerance, has_false_offset)?;
        let target = target.forward(source.longitude, source.latitude)?;
        Ok(ProjectionTransform { source, target })
    }

    /// Préfixe l'abscisse est (avec fausse abscisse) par le numéro de zone
    pub fn encode_zone_prefix(&self, easting: f64) -> Result<f64, GeodeticError> {
        let zone = self.parameters.zone.ok_or_else(|| {
            GeodeticError::invalid_parameter(format!(
                "projection {} has no zone number",
                self.name
            ))
        })?;
        Ok(zone::encode_zone_prefix(easting, zone))
    }

    /// Retire le préfixe de zone d'une abscisse est, en vérifiant le numéro de zone
    pub fn decode_zone_prefix(&self, prefixed: f64) -> Result<f64, GeodeticError> {
        let expected = self.parameters.zone.ok_or_else(|| {
            GeodeticError::invalid_parameter(format!(
                "projection {} has no zone number",
                self.name
            ))
        })?;
        let (zone, easting) = zone::decode_zone_prefix(prefixed)?;
        if zone != expected {
            return Err(GeodeticError::domain(
                "decode_zone_prefix",
                format!("zone {} does not match projection zone {}", zone, expected),
            ));
        }
        Ok(easting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::dms_to_radians;

    fn cgcs2000() -> Ellipsoid {
        Ellipsoid::new(6378137.0, 6356752.31414).unwrap()
    }

    fn gk3_111() -> ProjectionSystem {
        ProjectionSystem::new(
            "test_3_degree_111E",
            cgcs2000(),
            ProjectionParameters::gauss_kruger(ZoneWidth::Three, 111.0),
        )
        .unwrap()
    }

    #[test]
    fn test_forward_true_and_offset() {
        let p = gk3_111();
        let result = p
            .forward(
                dms_to_radians(111.0, 17.0, 58.3596),
                dms_to_radians(30.0, 45.0, 25.4425),
            )
            .unwrap();
        assert!((result.offset.x - 3404079.3582).abs() < 1e-4, "xz={}", result.offset.x);
        assert!((result.offset.y - 528680.0889).abs() < 1e-4, "yz={}", result.offset.y);
        assert!((result.plane.y - 28680.0889).abs() < 1e-4, "y={}", result.plane.y);
        assert_eq!(result.plane.x, result.offset.x);
        assert!(result.warning.is_none());
    }

    #[test]
    fn test_central_meridian_maps_to_arc() {
        let p = gk3_111();
        let latitude = 0.6;
        let result = p.forward(111.0_f64.to_radians(), latitude).unwrap();
        assert!(result.plane.y.abs() < 1e-9);
        assert!((result.plane.x - p.ellipsoid().meridian_arc(latitude)).abs() < 1e-9);
    }

    #[test]
    fn test_roundtrip_within_three_degrees() {
        let p = gk3_111();
        for (dl, b) in [(-2.9_f64, 5.0_f64), (-1.0, 30.0), (0.5, 45.0), (2.9, 60.0), (1.5, -35.0)] {
            let longitude = (111.0 + dl).to_radians();
            let latitude = b.to_radians();
            let fwd = p.forward(longitude, latitude).unwrap();
            let back = p.backward(fwd.offset.x, fwd.offset.y, 1e-13, true).unwrap();
            assert!((back.longitude - longitude).abs() < 1e-9, "dl={} b={}", dl, b);
            assert!((back.latitude - latitude).abs() < 1e-9, "dl={} b={}", dl, b);
        }
    }

    #[test]
    fn test_accuracy_warning_beyond_limit() {
        let p = gk3_111();
        let result = p.forward(116.0_f64.to_radians(), 0.5).unwrap();
        let warning = result.warning.expect("expected accuracy warning");
        assert!((warning.longitude_difference - 5.0_f64.to_radians()).abs() < 1e-12);
        assert!(warning.to_string().contains("5.0000°"));
    }

    #[test]
    fn test_backward_accuracy_warning() {
        let p = gk3_111();
        let fwd = p.forward(116.0_f64.to_radians(), 0.5).unwrap();
        let back = p.backward(fwd.offset.x, fwd.offset.y, 1e-13, true).unwrap();
        let warning = back.warning.expect("expected accuracy warning");
        assert!(warning.longitude_difference > ACCURACY_LIMIT_DEGREES.to_radians());
    }

    #[test]
    fn test_backward_northing_beyond_pole() {
        let p = gk3_111();
        let err = p.backward(15_000_000.0, 500_000.0, 1e-13, true).unwrap_err();
        assert!(matches!(err, GeodeticError::Domain { .. }));
    }

    #[test]
    fn test_transform_warns_on_source_side() {
        let source = gk3_111();
        let target = ProjectionSystem::new(
            "test_3_degree_117E",
            cgcs2000(),
            ProjectionParameters::gauss_kruger(ZoneWidth::Three, 117.0),
        )
        .unwrap();
        let fwd = source.forward(116.0_f64.to_radians(), 0.5).unwrap();
        let result = source
            .transform_to(&target, fwd.offset.x, fwd.offset.y, 1e-13, true)
            .unwrap();
        assert!(result.source.warning.is_some());
        assert!(result.target.warning.is_none());
    }

    #[test]
    fn test_backward_without_false_offset() {
        let p = gk3_111();
        let fwd = p.forward(112.0_f64.to_radians(), 0.7).unwrap();
        let back = p.backward(fwd.plane.x, fwd.plane.y, 1e-13, false).unwrap();
        assert!((back.longitude - 112.0_f64.to_radians()).abs() < 1e-9);
        assert_eq!(back.estimates.len(), back.iterations + 1);
    }

    #[test]
    fn test_incompatible_reference() {
        let source = gk3_111();
        let wgs84 = Ellipsoid::new(6378137.0, 6356752.314245179).unwrap();
        let target = ProjectionSystem::new(
            "wgs84_gk",
            wgs84,
            ProjectionParameters::gauss_kruger(ZoneWidth::Three, 114.0),
        )
        .unwrap();
        let err = source
            .transform_to(&target, 3404079.0, 528680.0, 1e-13, true)
            .unwrap_err();
        assert!(matches!(err, GeodeticError::IncompatibleReference { .. }));
    }

    #[test]
    fn test_latitude_of_origin() {
        let mut parameters = ProjectionParameters::gauss_kruger(ZoneWidth::Six, 3.0);
        parameters.latitude_of_origin = 49.0;
        let p = ProjectionSystem::new("origin_49N", cgcs2000(), parameters).unwrap();

        let origin = p.forward(3.0_f64.to_radians(), 49.0_f64.to_radians()).unwrap();
        assert!(origin.plane.x.abs() < 1e-6);

        let fwd = p.forward(4.0_f64.to_radians(), 47.5_f64.to_radians()).unwrap();
        assert!(fwd.plane.x < 0.0);
        let back = p.backward(fwd.offset.x, fwd.offset.y, 1e-13, true).unwrap();
        assert!((back.latitude - 47.5_f64.to_radians()).abs() < 1e-9);
        assert!((back.longitude - 4.0_f64.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn test_utm_parameters() {
        let utm = ProjectionParameters::utm(49, false);
        assert_eq!(utm.central_meridian, 111.0);
        assert_eq!(utm.scale_factor, 0.9996);
        let south = ProjectionParameters::utm(40, true);
        assert_eq!(south.false_northing, 10_000_000.0);
    }

    #[test]
    fn test_invalid_parameters() {
        let mut parameters = ProjectionParameters::gauss_kruger(ZoneWidth::Three, 111.0);
        parameters.scale_factor = 0.0;
        assert!(ProjectionSystem::new("bad", cgcs2000(), parameters).is_err());
    }

    #[test]
    fn test_zone_prefix_requires_zone() {
        let p = gk3_111();
        assert!(p.encode_zone_prefix(528680.0).is_err());

        let mut parameters = ProjectionParameters::gauss_kruger(ZoneWidth::Three, 111.0);
        parameters.zone = Some(37);
        let zoned = ProjectionSystem::new("zone_37", cgcs2000(), parameters).unwrap();
        let prefixed = zoned.encode_zone_prefix(528680.0889).unwrap();
        assert!((prefixed - 37528680.0889).abs() < 1e-6);
        assert!((zoned.decode_zone_prefix(prefixed).unwrap() - 528680.0889).abs() < 1e-6);
        assert!(zoned.decode_zone_prefix(38528680.0).is_err());
    }
}
