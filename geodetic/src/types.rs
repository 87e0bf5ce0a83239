//! Types de données pour le crate geodetic

use serde::Serialize;

/// Point en coordonnées géodésiques
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeodeticPoint {
    /// Longitude L en radians (positive à l'est)
    pub longitude: f64,
    /// Latitude B en radians (positive au nord)
    pub latitude: f64,
    /// Hauteur ellipsoïdale H en mètres
    pub height: f64,
}

impl GeodeticPoint {
    pub fn new(longitude: f64, latitude: f64, height: f64) -> Self {
        Self {
            longitude,
            latitude,
            height,
        }
    }

    /// Crée depuis des degrés décimaux
    pub fn from_degrees(longitude: f64, latitude: f64, height: f64) -> Self {
        Self::new(longitude.to_radians(), latitude.to_radians(), height)
    }
}

/// Point en coordonnées cartésiennes géocentriques (ECEF), en mètres
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpatialPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SpatialPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Point plan de projection, en mètres.
///
/// Convention géodésique : `x` est l'axe nord, `y` l'axe est.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanePoint {
    pub x: f64,
    pub y: f64,
}

impl PlanePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rayons de courbure en un point de l'ellipsoïde, en mètres
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvatureRadii {
    /// Rayon de courbure du méridien M
    pub meridian: f64,
    /// Rayon de courbure du premier vertical N
    pub prime_vertical: f64,
    /// Rayon de courbure moyen R
    pub mean: f64,
}

/// Résultat d'un solveur de latitude itératif
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatitudeSolution {
    /// Latitude finale en radians
    pub latitude: f64,
    /// Nombre d'itérations effectuées
    pub iterations: usize,
    /// Valeur initiale puis chaque estimation successive (la dernière est `latitude`)
    pub estimates: Vec<f64>,
}

/// Résultat de la conversion cartésienne → géodésique
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeodeticSolution {
    pub point: GeodeticPoint,
    /// Nombre d'itérations du calcul de la latitude
    pub iterations: usize,
    /// Estimations successives de la latitude
    pub estimates: Vec<f64>,
}

/// Résultat du problème géodésique direct
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DirectSolution {
    /// Longitude du point d'arrivée, en radians
    pub longitude: f64,
    /// Latitude du point d'arrivée, en radians
    pub latitude: f64,
    /// Azimut inverse au point d'arrivée (vers le point de départ), dans [0, 2π)
    pub azimuth: f64,
}

/// Résultat du problème géodésique inverse
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InverseSolution {
    /// Azimut au point de départ vers le point d'arrivée, dans [0, 2π)
    pub forward_azimuth: f64,
    /// Azimut inverse au point d'arrivée (vers le point de départ), dans [0, 2π)
    pub reverse_azimuth: f64,
    /// Longueur de la géodésique en mètres
    pub distance: f64,
    /// Nombre d'approximations successives
    pub iterations: usize,
    /// Distance angulaire sphérique σ à chaque approximation
    pub estimates: Vec<f64>,
}
