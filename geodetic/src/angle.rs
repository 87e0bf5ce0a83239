//! Conversions d'angles : radians, degrés décimaux et degrés-minutes-secondes

use std::fmt;

use serde::Serialize;

/// Angle décomposé en degrés, minutes et secondes sexagésimales
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dms {
    /// Vrai si l'angle est négatif (ouest / sud)
    pub negative: bool,
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: f64,
}

impl Dms {
    /// Décompose un angle en degrés décimaux.
    ///
    /// L'angle est d'abord arrondi à 1e-8 degré, puis les secondes à 1e-4,
    /// avec report sur les minutes et les degrés (jamais `60.0000"`).
    pub fn from_degrees(value: f64) -> Self {
        let rounded = (value * 1e8).round() / 1e8;
        let negative = rounded < 0.0;
        let abs = rounded.abs();

        let mut degrees = abs.trunc();
        let mut minutes = ((abs - degrees) * 60.0).trunc();
        let mut seconds = (abs - degrees) * 3600.0 - minutes * 60.0;

        seconds = (seconds * 1e4).round() / 1e4;
        if seconds >= 60.0 {
            seconds -= 60.0;
            minutes += 1.0;
        }
        if minutes >= 60.0 {
            minutes -= 60.0;
            degrees += 1.0;
        }

        Self {
            negative,
            degrees: degrees as u32,
            minutes: minutes as u32,
            seconds,
        }
    }

    /// Décompose un angle en radians
    pub fn from_radians(value: f64) -> Self {
        Self::from_degrees(value.to_degrees())
    }

    /// Recompose l'angle en degrés décimaux
    pub fn to_degrees(self) -> f64 {
        let value = self.degrees as f64 + self.minutes as f64 / 60.0 + self.seconds / 3600.0;
        if self.negative {
            -value
        } else {
            value
        }
    }

    /// Recompose l'angle en radians
    pub fn to_radians(self) -> f64 {
        self.to_degrees().to_radians()
    }
}

impl fmt::Display for Dms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negative { "-" } else { "" };
        write!(
            f,
            "{}{}°{}'{:.4}\"",
            sign, self.degrees, self.minutes, self.seconds
        )
    }
}

/// Compose des degrés, minutes et secondes en degrés décimaux.
///
/// Le signe est porté par les degrés (`-0.0` compris).
pub fn dms_to_degrees(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    let value = degrees.abs() + minutes / 60.0 + seconds / 3600.0;
    if degrees.is_sign_negative() {
        -value
    } else {
        value
    }
}

/// Compose des degrés, minutes et secondes en radians
pub fn dms_to_radians(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    dms_to_degrees(degrees, minutes, seconds).to_radians()
}

/// Formate un angle en radians sous la forme `d°m's.ssss"`
pub fn format_dms(radians: f64) -> String {
    Dms::from_radians(radians).to_string()
}

/// Ramène un angle dans l'intervalle [0, 2π)
pub fn normalize_azimuth(angle: f64) -> f64 {
    let two_pi = std::f64::consts::TAU;
    let value = angle.rem_euclid(two_pi);
    // rem_euclid peut rendre exactement 2π pour des angles négatifs infimes
    if value >= two_pi {
        0.0
    } else {
        value
    }
}
