//! Tests d'intégration : jeux de référence sur les ellipsoïdes embarqués

use geodetic::angle::{dms_to_radians, format_dms};
use geodetic::{GeodeticError, GeodeticPoint, Registry, SpatialPoint, Tolerance};

fn registry() -> Registry {
    Registry::builtin()
}

#[test]
fn test_spatial_to_geodetic_cgcs2000() {
    let registry = registry();
    let cgcs = registry.ellipsoid("CGCS2000").unwrap().ellipsoid;

    let solution = cgcs
        .spatial_to_geodetic(
            SpatialPoint::new(3694419.14443691, 3694419.14443691, 5194455.18902173),
            1e-13,
        )
        .unwrap();

    let quarter = std::f64::consts::FRAC_PI_4;
    assert!((solution.point.longitude - quarter).abs() < 1e-13);
    assert!((solution.point.latitude - quarter).abs() < 1e-13);
    assert!(
        (solution.point.height - 999999.9987).abs() < 1e-3,
        "H={}",
        solution.point.height
    );
    assert_eq!(solution.iterations, 6);
    assert_eq!(solution.estimates.len(), 7);
}

#[test]
fn test_direct_geodesic_beijing1954() {
    let registry = registry();
    let beijing = registry.ellipsoid("Beijing_1954").unwrap().ellipsoid;

    let solution = beijing
        .direct_geodesic(
            dms_to_radians(114.0, 20.0, 0.0),
            dms_to_radians(30.0, 30.0, 0.0),
            225.0_f64.to_radians(),
            10_000_000.0,
        )
        .unwrap();

    assert_eq!(format_dms(solution.longitude), "51°16'32.4976\"");
    assert_eq!(format_dms(solution.latitude), "-37°43'44.1353\"");
    assert_eq!(format_dms(solution.azimuth), "50°21'22.4896\"");
}

#[test]
fn test_direct_geodesic_short_line() {
    let registry = registry();
    let beijing = registry.ellipsoid("Beijing_1954").unwrap().ellipsoid;

    let solution = beijing
        .direct_geodesic(
            dms_to_radians(35.0, 49.0, 36.33),
            dms_to_radians(47.0, 46.0, 52.647),
            dms_to_radians(44.0, 12.0, 13.664),
            44797.282,
        )
        .unwrap();

    assert_eq!(format_dms(solution.longitude), "36°14'45.0505\"");
    assert_eq!(format_dms(solution.latitude), "48°4'9.6384\"");
    assert_eq!(format_dms(solution.azimuth), "224°30'53.5508\"");
}

#[test]
fn test_inverse_geodesic_short_line() {
    let registry = registry();
    let beijing = registry.ellipsoid("Beijing_1954").unwrap().ellipsoid;

    let solution = beijing
        .inverse_geodesic(
            dms_to_radians(35.0, 49.0, 36.33),
            dms_to_radians(47.0, 46.0, 52.647),
            dms_to_radians(36.0, 14.0, 45.0505),
            dms_to_radians(48.0, 4.0, 9.6384),
            1e-14,
        )
        .unwrap();

    let arcsec = 1.0_f64.to_radians() / 3600.0;
    let forward = dms_to_radians(44.0, 12.0, 13.6681);
    let reverse = dms_to_radians(224.0, 30.0, 53.5549);
    assert!((solution.forward_azimuth - forward).abs() < 1e-3 * arcsec);
    assert!((solution.reverse_azimuth - reverse).abs() < 1e-3 * arcsec);
    assert!((solution.distance - 44797.2832).abs() < 1e-3, "S={}", solution.distance);
}

#[test]
fn test_inverse_geodesic_long_line() {
    let registry = registry();
    let beijing = registry.ellipsoid("Beijing_1954").unwrap().ellipsoid;

    // Extrémité du problème direct de 10 000 km, ramenée au départ
    let solution = beijing
        .inverse_geodesic(
            dms_to_radians(51.0, 16.0, 32.5),
            dms_to_radians(-37.0, 43.0, 44.1),
            dms_to_radians(114.0, 20.0, 0.0),
            dms_to_radians(30.0, 30.0, 0.0),
            1e-14,
        )
        .unwrap();

    let arcsec = 1.0_f64.to_radians() / 3600.0;
    assert!((solution.forward_azimuth - dms_to_radians(50.0, 21.0, 22.4881)).abs() < 1e-2 * arcsec);
    assert!((solution.reverse_azimuth - dms_to_radians(225.0, 0.0, 0.026)).abs() < 1e-2 * arcsec);
    assert!((solution.distance - 9999999.2631).abs() < 1e-2, "S={}", solution.distance);
}

#[test]
fn test_gauss_kruger_forward_cgcs2000() {
    let registry = registry();
    let gk = registry.projection("CGCS2000_3_Degree_GK_CM_111E").unwrap();

    let result = gk
        .forward(
            dms_to_radians(111.0, 17.0, 58.3596),
            dms_to_radians(30.0, 45.0, 25.4425),
        )
        .unwrap();

    assert!((result.offset.x - 3404079.3582).abs() < 1e-4, "xz={}", result.offset.x);
    assert!((result.offset.y - 528680.0889).abs() < 1e-4, "yz={}", result.offset.y);
}

#[test]
fn test_gauss_kruger_backward_cgcs2000() {
    let registry = registry();
    let gk = registry.projection("CGCS2000_3_Degree_GK_CM_111E").unwrap();

    let result = gk.backward(3404762.7444, 624430.6672, 1e-13, true).unwrap();

    assert_eq!(format_dms(result.longitude), "112°17'58.3596\"");
    assert_eq!(format_dms(result.latitude), "30°45'25.4425\"");
    assert_eq!(result.iterations, 5);
    assert!(result.warning.is_none());
}

#[test]
fn test_transform_between_beijing1954_zones() {
    let registry = registry();
    let source = registry.projection("Beijing_1954_3_Degree_GK_CM_117E").unwrap();
    let target = registry.projection("Beijing_1954_3_Degree_GK_CM_120E").unwrap();

    // Ordonnée source sans fausse abscisse
    let result = source
        .transform_to(target, 1944359.6070, 240455.4563, 1e-13, false)
        .unwrap();

    assert!(
        (result.target.offset.x - 1943076.2990).abs() < 1e-3,
        "xz={}",
        result.target.offset.x
    );
    assert!(
        (result.target.offset.y - 421912.7778).abs() < 1e-3,
        "yz={}",
        result.target.offset.y
    );
}

#[test]
fn test_transform_rejects_other_ellipsoid() {
    let registry = registry();
    let source = registry.projection("Beijing_1954_3_Degree_GK_CM_117E").unwrap();
    let target = registry.projection("CGCS2000_3_Degree_GK_CM_111E").unwrap();

    let err = source
        .transform_to(target, 1944359.6070, 240455.4563, 1e-13, true)
        .unwrap_err();
    assert!(matches!(err, GeodeticError::IncompatibleReference { .. }));
}

#[test]
fn test_utm_roundtrip_wgs84() {
    let registry = registry();
    let utm = registry.projection("WGS_1984_UTM_Zone_49N").unwrap();

    let longitude = dms_to_radians(112.0, 17.0, 58.3596);
    let latitude = dms_to_radians(30.0, 45.0, 25.4425);
    let fwd = utm.forward(longitude, latitude).unwrap();
    let back = utm.backward(fwd.offset.x, fwd.offset.y, 1e-17, true).unwrap();

    assert_eq!(format_dms(back.longitude), "112°17'58.3596\"");
    assert_eq!(format_dms(back.latitude), "30°45'25.4425\"");
}

#[test]
fn test_spatial_roundtrip_all_ellipsoids() {
    let registry = registry();
    let points = [
        GeodeticPoint::from_degrees(116.391, 39.907, 43.5),
        GeodeticPoint::from_degrees(-122.42, 37.77, -12.0),
        GeodeticPoint::from_degrees(151.21, -33.87, 2500.0),
        GeodeticPoint::from_degrees(-58.38, -34.6, 0.0),
    ];

    for named in registry.ellipsoids() {
        for point in points {
            let xyz = named.ellipsoid.geodetic_to_spatial(point).unwrap();
            let back = named.ellipsoid.spatial_to_geodetic(xyz, 1e-13).unwrap().point;
            assert!((back.longitude - point.longitude).abs() < 1e-12, "{}", named.name);
            assert!((back.latitude - point.latitude).abs() < 1e-12, "{}", named.name);
            assert!((back.height - point.height).abs() < 1e-3, "{}", named.name);
        }
    }
}

#[test]
fn test_direct_inverse_consistency() {
    let registry = registry();
    let cgcs = registry.ellipsoid("CGCS2000").unwrap().ellipsoid;

    let (l1, b1) = (113.0_f64.to_radians(), 28.0_f64.to_radians());
    for azimuth_deg in [10.0_f64, 100.0, 190.0, 300.0] {
        let direct = cgcs
            .direct_geodesic(l1, b1, azimuth_deg.to_radians(), 250_000.0)
            .unwrap();
        let inverse = cgcs
            .inverse_geodesic(l1, b1, direct.longitude, direct.latitude, 1e-14)
            .unwrap();
        assert!(
            (inverse.distance - 250_000.0).abs() < 0.05,
            "A1={} S={}",
            azimuth_deg,
            inverse.distance
        );
        assert!((inverse.forward_azimuth - azimuth_deg.to_radians()).abs() < 1e-7);
    }
}

#[test]
fn test_convergence_cap_is_reported() {
    let registry = registry();
    let gk = registry.projection("CGCS2000_GK_CM_111E").unwrap();

    let err = gk
        .backward(3404762.7444, 624430.6672, Tolerance::new(0.0, 1), true)
        .unwrap_err();
    match err {
        GeodeticError::Convergence {
            iterations,
            best_estimate,
            ..
        } => {
            assert_eq!(iterations, 1);
            assert!(best_estimate.is_finite());
        }
        other => panic!("unexpected error: {}", other),
    }
}
