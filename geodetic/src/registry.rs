//! Registre des ellipsoïdes et projections connus
//!
//! Table embarquée (CGCS2000, Xi'an 1980, Beijing 1954, WGS 84 et leurs
//! projections Gauss-Krüger / UTM), extensible par fichier JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ellipsoid::Ellipsoid;
use crate::error::GeodeticError;
use crate::projection::{ProjectionParameters, ProjectionSystem, ZoneWidth};

/// Ellipsoïdes embarqués : (id, nom, libellé, ellipsoïde de référence, a, b)
const ELLIPSOIDS: &[(u32, &str, &str, &str, f64, f64)] = &[
    (1, "CGCS2000", "CGCS 2000", "CGCS2000", 6378137.0, 6356752.31414),
    (2, "Xian_1980", "Xi'an 1980", "IAG 1975", 6378140.0, 6356755.2882),
    (3, "Beijing_1954", "Beijing 1954", "Krasovsky 1940", 6378245.0, 6356863.0188),
    (4, "WGS_1984", "WGS 1984", "WGS 84", 6378137.0, 6356752.314245179),
];

/// Projections embarquées : (nom, ellipsoïde, fuseau, zone, méridien central, échelle)
const PROJECTIONS: &[(&str, &str, u8, Option<u32>, f64, f64)] = &[
    ("CGCS2000_3_Degree_GK_CM_111E", "CGCS2000", 3, None, 111.0, 1.0),
    ("CGCS2000_3_Degree_GK_Zone_37", "CGCS2000", 3, Some(37), 111.0, 1.0),
    ("CGCS2000_GK_CM_111E", "CGCS2000", 6, None, 111.0, 1.0),
    ("CGCS2000_GK_CM_123E", "CGCS2000", 6, None, 123.0, 1.0),
    ("CGCS2000_GK_Zone_19", "CGCS2000", 6, Some(19), 111.0, 1.0),
    ("Xian_1980_3_Degree_GK_CM_111E", "Xian_1980", 3, None, 111.0, 1.0),
    ("Xian_1980_3_Degree_GK_Zone_37", "Xian_1980", 3, Some(37), 111.0, 1.0),
    ("Xian_1980_GK_CM_111E", "Xian_1980", 6, None, 111.0, 1.0),
    ("Xian_1980_GK_Zone_19", "Xian_1980", 6, Some(19), 111.0, 1.0),
    ("Beijing_1954_3_Degree_GK_CM_111E", "Beijing_1954", 3, None, 111.0, 1.0),
    ("Beijing_1954_3_Degree_GK_CM_117E", "Beijing_1954", 3, None, 117.0, 1.0),
    ("Beijing_1954_3_Degree_GK_CM_120E", "Beijing_1954", 3, None, 120.0, 1.0),
    ("Beijing_1954_3_Degree_GK_Zone_37", "Beijing_1954", 3, Some(37), 111.0, 1.0),
    ("Beijing_1954_GK_Zone_19N", "Beijing_1954", 6, None, 111.0, 1.0),
    ("Beijing_1954_GK_Zone_19", "Beijing_1954", 6, Some(19), 111.0, 1.0),
    ("WGS_1984_UTM_Zone_49N", "WGS_1984", 6, None, 111.0, 0.9996),
    ("WGS_1984_UTM_Zone_51N", "WGS_1984", 6, None, 123.0, 0.9996),
];

const GREENWICH: &str = "Greenwich";

/// Ellipsoïde enregistré avec ses métadonnées
#[derive(Debug, Clone, Serialize)]
pub struct NamedEllipsoid {
    pub id: Option<u32>,
    pub name: String,
    pub display_name: String,
    pub reference_ellipsoid: String,
    pub prime_meridian: String,
    pub ellipsoid: Ellipsoid,
}

/// Entrée d'ellipsoïde dans un fichier de registre
#[derive(Debug, Deserialize)]
struct EllipsoidEntry {
    name: String,
    #[serde(default)]
    id: Option<u32>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    reference_ellipsoid: Option<String>,
    #[serde(default)]
    prime_meridian: Option<String>,
    semimajor_axis: f64,
    /// Demi-petit axe, ou à défaut l'inverse de l'aplatissement
    #[serde(default)]
    semiminor_axis: Option<f64>,
    #[serde(default)]
    inverse_flattening: Option<f64>,
}

/// Entrée de projection dans un fichier de registre
#[derive(Debug, Deserialize)]
struct ProjectionEntry {
    name: String,
    /// Nom d'un ellipsoïde du fichier ou de la table embarquée
    ellipsoid: String,
    #[serde(flatten)]
    parameters: ProjectionParameters,
}

/// Format JSON d'un fichier de registre
#[derive(Debug, Default, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    ellipsoids: Vec<EllipsoidEntry>,
    #[serde(default)]
    projections: Vec<ProjectionEntry>,
}

/// Registre d'ellipsoïdes et de projections, recherche insensible à la casse
#[derive(Debug, Clone, Default)]
pub struct Registry {
    ellipsoids: Vec<NamedEllipsoid>,
    projections: Vec<ProjectionSystem>,
}

impl Registry {
    /// Registre embarqué
    pub fn builtin() -> Self {
        let ellipsoids: Vec<NamedEllipsoid> = ELLIPSOIDS
            .iter()
            .map(|&(id, name, display_name, reference, a, b)| NamedEllipsoid {
                id: Some(id),
                name: name.to_string(),
                display_name: display_name.to_string(),
                reference_ellipsoid: reference.to_string(),
                prime_meridian: GREENWICH.to_string(),
                ellipsoid: Ellipsoid::from_axes(a, b),
            })
            .collect();

        let projections = PROJECTIONS
            .iter()
            .filter_map(|&(name, ellipsoid, width, zone, cm, k)| {
                let ellipsoid = ellipsoids.iter().find(|e| e.name == ellipsoid)?.ellipsoid;
                let zone_width = if width == 3 {
                    ZoneWidth::Three
                } else {
                    ZoneWidth::Six
                };
                let parameters = ProjectionParameters {
                    zone,
                    scale_factor: k,
                    ..ProjectionParameters::gauss_kruger(zone_width, cm)
                };
                Some(ProjectionSystem::assemble(
                    name.to_string(),
                    ellipsoid,
                    parameters,
                ))
            })
            .collect();

        Self {
            ellipsoids,
            projections,
        }
    }

    /// Construit un registre depuis un document JSON.
    ///
    /// Les projections peuvent référencer un ellipsoïde du document ou de la
    /// table embarquée.
    pub fn from_json(json: &str) -> Result<Self, GeodeticError> {
        let file: RegistryFile = serde_json::from_str(json)?;

        let mut registry = Self::default();
        for entry in file.ellipsoids {
            let ellipsoid = match (entry.semiminor_axis, entry.inverse_flattening) {
                (Some(b), _) => Ellipsoid::new(entry.semimajor_axis, b)?,
                (None, Some(rf)) => Ellipsoid::from_inverse_flattening(entry.semimajor_axis, rf)?,
                (None, None) => {
                    return Err(GeodeticError::invalid_parameter(format!(
                        "ellipsoid {}: semiminor_axis or inverse_flattening required",
                        entry.name
                    )))
                }
            };
            registry.insert_ellipsoid(NamedEllipsoid {
                id: entry.id,
                display_name: entry.display_name.unwrap_or_else(|| entry.name.clone()),
                reference_ellipsoid: entry
                    .reference_ellipsoid
                    .unwrap_or_else(|| entry.name.clone()),
                prime_meridian: entry
                    .prime_meridian
                    .unwrap_or_else(|| GREENWICH.to_string()),
                name: entry.name,
                ellipsoid,
            });
        }

        let builtin = Self::builtin();
        for entry in file.projections {
            let ellipsoid = match registry.ellipsoid(&entry.ellipsoid) {
                Ok(named) => named.ellipsoid,
                Err(_) => builtin.ellipsoid(&entry.ellipsoid)?.ellipsoid,
            };
            let projection = ProjectionSystem::new(entry.name, ellipsoid, entry.parameters)?;
            registry.insert_projection(projection);
        }

        debug!(
            ellipsoids = registry.ellipsoids.len(),
            projections = registry.projections.len(),
            "registry parsed"
        );
        Ok(registry)
    }

    /// Charge un registre depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self, GeodeticError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Fusionne un autre registre ; ses entrées remplacent celles de même nom
    pub fn merge(&mut self, other: Registry) {
        for ellipsoid in other.ellipsoids {
            self.insert_ellipsoid(ellipsoid);
        }
        for projection in other.projections {
            self.insert_projection(projection);
        }
    }

    fn insert_ellipsoid(&mut self, ellipsoid: NamedEllipsoid) {
        match self
            .ellipsoids
            .iter_mut()
            .find(|e| e.name.eq_ignore_ascii_case(&ellipsoid.name))
        {
            Some(existing) => *existing = ellipsoid,
            None => self.ellipsoids.push(ellipsoid),
        }
    }

    fn insert_projection(&mut self, projection: ProjectionSystem) {
        match self
            .projections
            .iter_mut()
            .find(|p| p.name().eq_ignore_ascii_case(projection.name()))
        {
            Some(existing) => *existing = projection,
            None => self.projections.push(projection),
        }
    }

    /// Recherche un ellipsoïde par nom
    pub fn ellipsoid(&self, name: &str) -> Result<&NamedEllipsoid, GeodeticError> {
        self.ellipsoids
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| GeodeticError::UnknownEllipsoid(name.to_string()))
    }

    /// Recherche une projection par nom
    pub fn projection(&self, name: &str) -> Result<&ProjectionSystem, GeodeticError> {
        self.projections
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| GeodeticError::UnknownProjection(name.to_string()))
    }

    pub fn ellipsoids(&self) -> impl Iterator<Item = &NamedEllipsoid> {
        self.ellipsoids.iter()
    }

    pub fn projections(&self) -> impl Iterator<Item = &ProjectionSystem> {
        self.projections.iter()
    }
}
