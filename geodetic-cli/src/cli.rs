//! Définition et implémentation des commandes CLI
//!
//! - `list` : ellipsoïdes et projections du registre
//! - `to-geodetic` / `to-spatial` : cartésien géocentrique ↔ géodésique
//! - `direct` / `inverse` : problèmes géodésiques
//! - `forward` / `backward` / `transform` : projection Gauss-Krüger

use std::sync::LazyLock;

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use geodetic::angle::dms_to_degrees;
use geodetic::{GeodeticPoint, SpatialPoint};
use regex::Regex;
use serde::Serialize;
use tracing::info;

use crate::config::Settings;
use crate::output::{Output, Report};

#[derive(Subcommand)]
pub enum Commands {
    /// Lister les ellipsoïdes et projections du registre
    List {
        /// Éléments à lister
        #[arg(value_enum, default_value_t = ListKind::All)]
        kind: ListKind,
    },

    /// Convertir X, Y, Z géocentriques (mètres) en longitude, latitude, hauteur
    #[command(allow_negative_numbers = true)]
    ToGeodetic {
        /// Nom de l'ellipsoïde de référence
        #[arg(short, long, default_value = "CGCS2000")]
        ellipsoid: String,

        x: f64,
        y: f64,
        z: f64,
    },

    /// Convertir longitude, latitude, hauteur en X, Y, Z géocentriques
    #[command(allow_negative_numbers = true)]
    ToSpatial {
        /// Nom de l'ellipsoïde de référence
        #[arg(short, long, default_value = "CGCS2000")]
        ellipsoid: String,

        /// Longitude (degrés décimaux ou sexagésimaux, ex : 114°20'0")
        #[arg(value_parser = parse_angle, allow_hyphen_values = true)]
        longitude: f64,

        /// Latitude (degrés décimaux ou sexagésimaux)
        #[arg(value_parser = parse_angle, allow_hyphen_values = true)]
        latitude: f64,

        /// Hauteur ellipsoïdale en mètres
        #[arg(default_value_t = 0.0)]
        height: f64,
    },

    /// Problème géodésique direct : point d'arrivée depuis un point, un azimut et une distance
    #[command(allow_negative_numbers = true)]
    Direct {
        /// Nom de l'ellipsoïde de référence
        #[arg(short, long, default_value = "CGCS2000")]
        ellipsoid: String,

        /// Longitude de départ
        #[arg(value_parser = parse_angle, allow_hyphen_values = true)]
        longitude: f64,

        /// Latitude de départ
        #[arg(value_parser = parse_angle, allow_hyphen_values = true)]
        latitude: f64,

        /// Azimut de départ, compté depuis le nord dans le sens horaire
        #[arg(value_parser = parse_angle)]
        azimuth: f64,

        /// Longueur de la géodésique en mètres
        distance: f64,
    },

    /// Problème géodésique inverse : azimuts et distance entre deux points
    #[command(allow_negative_numbers = true)]
    Inverse {
        /// Nom de l'ellipsoïde de référence
        #[arg(short, long, default_value = "CGCS2000")]
        ellipsoid: String,

        #[arg(value_parser = parse_angle, allow_hyphen_values = true)]
        start_longitude: f64,

        #[arg(value_parser = parse_angle, allow_hyphen_values = true)]
        start_latitude: f64,

        #[arg(value_parser = parse_angle, allow_hyphen_values = true)]
        end_longitude: f64,

        #[arg(value_parser = parse_angle, allow_hyphen_values = true)]
        end_latitude: f64,
    },

    /// Calcul direct Gauss-Krüger : longitude, latitude vers x, y plans
    #[command(allow_negative_numbers = true)]
    Forward {
        /// Nom de la projection (voir `list projections`)
        #[arg(short, long)]
        projection: String,

        #[arg(value_parser = parse_angle, allow_hyphen_values = true)]
        longitude: f64,

        #[arg(value_parser = parse_angle, allow_hyphen_values = true)]
        latitude: f64,

        /// Afficher aussi l'abscisse préfixée du numéro de zone (projections zonées)
        #[arg(long)]
        zone_prefix: bool,
    },

    /// Calcul inverse Gauss-Krüger : x, y plans vers longitude, latitude
    #[command(allow_negative_numbers = true)]
    Backward {
        /// Nom de la projection (voir `list projections`)
        #[arg(short, long)]
        projection: String,

        /// Ordonnée x en mètres
        x: f64,

        /// Abscisse y en mètres
        y: f64,

        /// Coordonnées planes vraies (sans fausse origine)
        #[arg(long)]
        no_false_offset: bool,

        /// L'abscisse porte un préfixe de zone à retirer
        #[arg(long)]
        zone_prefix: bool,
    },

    /// Changer de projection entre deux systèmes du même ellipsoïde
    #[command(allow_negative_numbers = true)]
    Transform {
        /// Projection source
        #[arg(long)]
        from: String,

        /// Projection cible
        #[arg(long)]
        to: String,

        /// Ordonnée x source en mètres
        x: f64,

        /// Abscisse y source en mètres
        y: f64,

        /// Coordonnées source planes vraies (sans fausse origine)
        #[arg(long)]
        no_false_offset: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListKind {
    All,
    Ellipsoids,
    Projections,
}

static DMS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?x)
        ^\s*
        ([+-])?                              # signe
        (\d{1,3}) \s* (?:°|d|:) \s*          # degrés
        (\d{1,2}) \s* (?:'|′|m|:) \s*        # minutes
        (?: (\d{1,2}(?:\.\d+)?) \s* (?:"|″|s)? )?  # secondes
        \s*$
        "#,
    )
    .expect("DMS pattern is valid")
});

/// Lit un angle en degrés décimaux ou sexagésimaux et le rend en radians.
///
/// Formats : `114.5`, `114°20'0"`, `114:20:00`, `-37d43m44.1353s`.
pub fn parse_angle(input: &str) -> Result<f64, String> {
    let trimmed = input.trim();
    if let Ok(degrees) = trimmed.trim_end_matches('°').parse::<f64>() {
        if !degrees.is_finite() {
            return Err(format!("angle must be finite: '{}'", input));
        }
        return Ok(degrees.to_radians());
    }

    let caps = DMS_REGEX
        .captures(trimmed)
        .ok_or_else(|| format!("cannot parse '{}' as decimal degrees or DMS", input))?;

    let number = |i: usize| -> Result<f64, String> {
        caps.get(i)
            .map_or(Ok(0.0), |m| m.as_str().parse::<f64>())
            .map_err(|e| format!("invalid number in '{}': {}", input, e))
    };
    let (degrees, minutes, seconds) = (number(2)?, number(3)?, number(4)?);
    if minutes >= 60.0 || seconds >= 60.0 {
        return Err(format!("minutes and seconds must be below 60: '{}'", input));
    }

    let mut value = dms_to_degrees(degrees, minutes, seconds);
    if caps.get(1).is_some_and(|m| m.as_str() == "-") {
        value = -value;
    }
    Ok(value.to_radians())
}

/// Exécute une commande
pub fn run(command: Commands, settings: &Settings, output: &Output) -> Result<()> {
    match command {
        Commands::List { kind } => cmd_list(kind, settings),
        Commands::ToGeodetic { ellipsoid, x, y, z } => {
            cmd_to_geodetic(&ellipsoid, SpatialPoint::new(x, y, z), settings, output)
        }
        Commands::ToSpatial {
            ellipsoid,
            longitude,
            latitude,
            height,
        } => cmd_to_spatial(
            &ellipsoid,
            GeodeticPoint::new(longitude, latitude, height),
            settings,
            output,
        ),
        Commands::Direct {
            ellipsoid,
            longitude,
            latitude,
            azimuth,
            distance,
        } => cmd_direct(
            &ellipsoid, longitude, latitude, azimuth, distance, settings, output,
        ),
        Commands::Inverse {
            ellipsoid,
            start_longitude,
            start_latitude,
            end_longitude,
            end_latitude,
        } => cmd_inverse(
            &ellipsoid,
            (start_longitude, start_latitude),
            (end_longitude, end_latitude),
            settings,
            output,
        ),
        Commands::Forward {
            projection,
            longitude,
            latitude,
            zone_prefix,
        } => cmd_forward(&projection, longitude, latitude, zone_prefix, settings, output),
        Commands::Backward {
            projection,
            x,
            y,
            no_false_offset,
            zone_prefix,
        } => cmd_backward(
            &projection,
            x,
            y,
            !no_false_offset,
            zone_prefix,
            settings,
            output,
        ),
        Commands::Transform {
            from,
            to,
            x,
            y,
            no_false_offset,
        } => cmd_transform(&from, &to, x, y, !no_false_offset, settings, output),
    }
}

fn cmd_list(kind: ListKind, settings: &Settings) -> Result<()> {
    if matches!(kind, ListKind::All | ListKind::Ellipsoids) {
        println!("--- ELLIPSOIDS ---");
        for e in settings.registry.ellipsoids() {
            println!(
                "  {:<16} a={:<12} b={:<18} 1/f={:.9}  ({}, {})",
                e.name,
                e.ellipsoid.semimajor_axis(),
                e.ellipsoid.semiminor_axis(),
                e.ellipsoid.inverse_flattening(),
                e.display_name,
                e.reference_ellipsoid
            );
        }
    }
    if matches!(kind, ListKind::All | ListKind::Projections) {
        println!("--- PROJECTIONS ---");
        for p in settings.registry.projections() {
            let zone = p.zone().map_or_else(|| "-".to_string(), |z| z.to_string());
            println!(
                "  {:<34} {}° zone={:<3} CM={:<6} k={:<7} FE={} FN={}",
                p.name(),
                u8::from(p.zone_width()),
                zone,
                p.central_meridian(),
                p.scale_factor(),
                p.false_easting(),
                p.false_northing()
            );
        }
    }
    Ok(())
}

fn cmd_to_geodetic(
    ellipsoid: &str,
    point: SpatialPoint,
    settings: &Settings,
    output: &Output,
) -> Result<()> {
    info!(ellipsoid, x = point.x, y = point.y, z = point.z, "Cartésien → géodésique");
    let solution = settings
        .ellipsoid(ellipsoid)?
        .spatial_to_geodetic(point, settings.tolerance)
        .context("Spatial to geodetic conversion failed")?;

    let report = Report::new(format!("Spatial → geodetic ({})", ellipsoid))
        .angle("L", solution.point.longitude)
        .angle("B", solution.point.latitude)
        .meters("H", solution.point.height)
        .field("iterations", solution.iterations.to_string())
        .steps("B", &solution.estimates, solution.iterations);
    output.emit(&report, &solution)
}

fn cmd_to_spatial(
    ellipsoid: &str,
    point: GeodeticPoint,
    settings: &Settings,
    output: &Output,
) -> Result<()> {
    info!(ellipsoid, "Géodésique → cartésien");
    let spatial = settings
        .ellipsoid(ellipsoid)?
        .geodetic_to_spatial(point)
        .context("Geodetic to spatial conversion failed")?;

    let report = Report::new(format!("Geodetic → spatial ({})", ellipsoid))
        .meters("X", spatial.x)
        .meters("Y", spatial.y)
        .meters("Z", spatial.z);
    output.emit(&report, &spatial)
}

fn cmd_direct(
    ellipsoid: &str,
    longitude: f64,
    latitude: f64,
    azimuth: f64,
    distance: f64,
    settings: &Settings,
    output: &Output,
) -> Result<()> {
    info!(ellipsoid, distance, "Problème géodésique direct");
    let solution = settings
        .ellipsoid(ellipsoid)?
        .direct_geodesic(longitude, latitude, azimuth, distance)
        .context("Direct geodesic problem failed")?;

    let report = Report::new(format!("Direct geodesic ({})", ellipsoid))
        .angle("L2", solution.longitude)
        .angle("B2", solution.latitude)
        .angle("A2", solution.azimuth);
    output.emit(&report, &solution)
}

fn cmd_inverse(
    ellipsoid: &str,
    start: (f64, f64),
    end: (f64, f64),
    settings: &Settings,
    output: &Output,
) -> Result<()> {
    info!(ellipsoid, "Problème géodésique inverse");
    let solution = settings
        .ellipsoid(ellipsoid)?
        .inverse_geodesic(start.0, start.1, end.0, end.1, settings.tolerance)
        .context("Inverse geodesic problem failed")?;

    let report = Report::new(format!("Inverse geodesic ({})", ellipsoid))
        .angle("A1", solution.forward_azimuth)
        .angle("A2", solution.reverse_azimuth)
        .meters("S", solution.distance)
        .field("iterations", solution.iterations.to_string())
        .steps("σ", &solution.estimates, solution.iterations);
    output.emit(&report, &solution)
}

#[derive(Serialize)]
struct ForwardReport<'a> {
    projection: &'a str,
    #[serde(flatten)]
    result: &'a geodetic::ForwardProjection,
    #[serde(skip_serializing_if = "Option::is_none")]
    prefixed_easting: Option<f64>,
}

fn cmd_forward(
    projection: &str,
    longitude: f64,
    latitude: f64,
    zone_prefix: bool,
    settings: &Settings,
    output: &Output,
) -> Result<()> {
    info!(projection, "Calcul direct Gauss-Krüger");
    let system = settings.projection(projection)?;
    let result = system
        .forward(longitude, latitude)
        .context("Gauss-Krüger forward projection failed")?;

    let prefixed_easting = if zone_prefix {
        Some(system.encode_zone_prefix(result.offset.y)?)
    } else {
        None
    };

    let mut report = Report::new(format!("Gauss-Krüger forward ({})", system.name()))
        .meters("x", result.plane.x)
        .meters("y", result.plane.y)
        .meters("xz", result.offset.x)
        .meters("yz", result.offset.y);
    if let Some(prefixed) = prefixed_easting {
        report = report.meters("yz (zone)", prefixed);
    }
    let report = report
        .angle("l", result.longitude_difference)
        .meters("X (arc)", result.meridian_arc)
        .meters("N", result.prime_vertical_radius)
        .warning(result.warning);

    let data = ForwardReport {
        projection: system.name(),
        result: &result,
        prefixed_easting,
    };
    output.emit(&report, &data)
}

fn cmd_backward(
    projection: &str,
    x: f64,
    y: f64,
    has_false_offset: bool,
    zone_prefix: bool,
    settings: &Settings,
    output: &Output,
) -> Result<()> {
    info!(projection, has_false_offset, "Calcul inverse Gauss-Krüger");
    let system = settings.projection(projection)?;
    let y = if zone_prefix {
        system.decode_zone_prefix(y)?
    } else {
        y
    };
    let result = system
        .backward(x, y, settings.tolerance, has_false_offset)
        .context("Gauss-Krüger backward projection failed")?;

    let report = Report::new(format!("Gauss-Krüger backward ({})", system.name()))
        .angle("L", result.longitude)
        .angle("B", result.latitude)
        .angle("l", result.longitude_difference)
        .angle("Bf", result.footprint_latitude)
        .meters("Mf", result.meridian_radius)
        .meters("Nf", result.prime_vertical_radius)
        .field("iterations", result.iterations.to_string())
        .steps("Bf", &result.estimates, result.iterations)
        .warning(result.warning);
    output.emit(&report, &result)
}

fn cmd_transform(
    from: &str,
    to: &str,
    x: f64,
    y: f64,
    has_false_offset: bool,
    settings: &Settings,
    output: &Output,
) -> Result<()> {
    info!(from, to, "Changement de projection");
    let source = settings.projection(from)?;
    let target = settings.projection(to)?;
    let result = source
        .transform_to(target, x, y, settings.tolerance, has_false_offset)
        .context(format!("Transform {} → {} failed", from, to))?;

    let report = Report::new(format!("Transform {} → {}", source.name(), target.name()))
        .angle("L", result.source.longitude)
        .angle("B", result.source.latitude)
        .meters("x", result.target.plane.x)
        .meters("y", result.target.plane.y)
        .meters("xz", result.target.offset.x)
        .meters("yz", result.target.offset.y)
        .field("iterations", result.source.iterations.to_string())
        .steps("Bf", &result.source.estimates, result.source.iterations)
        .warning(result.source.warning)
        .warning(result.target.warning);
    output.emit(&report, &result)
}
