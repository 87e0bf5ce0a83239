//! Fuseaux de projection : numéros de zone, méridiens centraux et préfixe de zone
//!
//! Le préfixe de zone (`zone · 10⁶ + y`) est un ancien encodage de l'abscisse
//! est ; il n'est jamais appliqué implicitement par la projection.

use serde::{Deserialize, Serialize};

use crate::error::GeodeticError;

/// Multiplicateur du numéro de zone dans une abscisse préfixée
pub const ZONE_PREFIX_FACTOR: f64 = 1_000_000.0;

/// Largeur des fuseaux Gauss-Krüger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ZoneWidth {
    /// Fuseaux de 3° (méridien central 3n)
    Three,
    /// Fuseaux de 6° (méridien central 6n - 3)
    Six,
}

impl ZoneWidth {
    pub fn degrees(self) -> f64 {
        match self {
            Self::Three => 3.0,
            Self::Six => 6.0,
        }
    }

    /// Numéro de zone Gauss-Krüger contenant une longitude (degrés, est positif)
    pub fn zone_of(self, longitude: f64) -> u32 {
        let zone = match self {
            Self::Three => ((longitude - 1.5) / 3.0).floor() + 1.0,
            Self::Six => (longitude / 6.0).floor() + 1.0,
        };
        zone.max(0.0) as u32
    }

    /// Méridien central d'une zone Gauss-Krüger, en degrés
    pub fn central_meridian(self, zone: u32) -> f64 {
        match self {
            Self::Three => 3.0 * zone as f64,
            Self::Six => 6.0 * zone as f64 - 3.0,
        }
    }
}

impl TryFrom<u8> for ZoneWidth {
    type Error = GeodeticError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(Self::Three),
            6 => Ok(Self::Six),
            other => Err(GeodeticError::invalid_parameter(format!(
                "zone width must be 3 or 6 degrees, got {}",
                other
            ))),
        }
    }
}

impl From<ZoneWidth> for u8 {
    fn from(width: ZoneWidth) -> Self {
        match width {
            ZoneWidth::Three => 3,
            ZoneWidth::Six => 6,
        }
    }
}

/// Numéro de zone UTM (1..=60) contenant une longitude en degrés
pub fn utm_zone_of(longitude: f64) -> u32 {
    let zone = ((longitude + 180.0) / 6.0).floor() as i64 + 1;
    zone.clamp(1, 60) as u32
}

/// Méridien central d'une zone UTM, en degrés
pub fn utm_central_meridian(zone: u32) -> f64 {
    (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0
}

/// Ajoute le numéro de zone devant une abscisse est (avec fausse abscisse)
pub fn encode_zone_prefix(easting: f64, zone: u32) -> f64 {
    zone as f64 * ZONE_PREFIX_FACTOR + easting
}

/// Sépare une abscisse préfixée en (zone, abscisse est)
pub fn decode_zone_prefix(prefixed: f64) -> Result<(u32, f64), GeodeticError> {
    if !prefixed.is_finite() || prefixed < ZONE_PREFIX_FACTOR {
        return Err(GeodeticError::domain(
            "decode_zone_prefix",
            format!("{} does not carry a zone prefix", prefixed),
        ));
    }
    let zone = (prefixed / ZONE_PREFIX_FACTOR).floor();
    Ok((zone as u32, prefixed - zone * ZONE_PREFIX_FACTOR))
}
