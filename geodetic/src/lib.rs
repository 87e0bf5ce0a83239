//! # geodetic
//!
//! Calculs sur l'ellipsoïde de référence : conversions géocentriques,
//! problèmes géodésiques direct et inverse, projection de Gauss-Krüger.
//!
//! ## Features
//!
//! - Coordonnées cartésiennes ↔ géodésiques (latitude par approximations successives)
//! - Rayons de courbure, arc de méridien et sa réciproque
//! - Problèmes géodésiques direct et inverse (formules de Bessel)
//! - Gauss-Krüger / UTM : calcul direct, inverse et changement de fuseau
//! - Registre des ellipsoïdes CGCS2000, Xi'an 1980, Beijing 1954, WGS 84
//!
//! Les angles sont en radians, les distances en mètres. Chaque solveur
//! itératif renvoie la trace de ses estimations successives.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use geodetic::{Registry, SpatialPoint};
//!
//! let registry = Registry::builtin();
//! let cgcs = registry.ellipsoid("CGCS2000")?.ellipsoid;
//! let solution = cgcs.spatial_to_geodetic(
//!     SpatialPoint::new(3694419.14443691, 3694419.14443691, 5194455.18902173),
//!     1e-13,
//! )?;
//! println!("{}", geodetic::angle::format_dms(solution.point.latitude));
//!
//! let gk = registry.projection("CGCS2000_3_Degree_GK_CM_111E")?;
//! let plane = gk.forward(solution.point.longitude, solution.point.latitude)?;
//! println!("x={:.4} y={:.4}", plane.offset.x, plane.offset.y);
//! ```

pub mod angle;
pub mod ellipsoid;
pub mod error;
pub mod projection;
pub mod registry;
pub mod types;

pub use ellipsoid::{Ellipsoid, MeridianArcCoefficients, Tolerance, DEFAULT_MAX_ITERATIONS};
pub use error::GeodeticError;
pub use projection::{
    AccuracyWarning, BackwardProjection, ForwardProjection, ProjectionParameters,
    ProjectionSystem, ProjectionTransform, ZoneWidth,
};
pub use registry::{NamedEllipsoid, Registry};
pub use types::{
    CurvatureRadii, DirectSolution, GeodeticPoint, GeodeticSolution, InverseSolution,
    LatitudeSolution, PlanePoint, SpatialPoint,
};
