#[allow(dead_code)]
mod common;

use approx::assert_relative_eq;
use disksurf_core::brightness::{
    beam_solid_angle, planck_temperature, BrightnessConverter, TemperatureScale,
};
use disksurf_core::cube::SpectralCube;
use disksurf_core::deprojection::{
    deproject, deproject_channels, rotation_velocity, DeprojectionConfig, DiskGeometry,
    HeightConvention, ResolvedGeometry,
};
use disksurf_core::detection::{ChannelSurface, SurfaceDetection, SurfacePoint};
use disksurf_core::error::DiskSurfError;
use ndarray::Array2;

use common::cube_from_channels;

const INCLINATION: f64 = 40.0;
const STAR_X: f64 = 25.0;
const STAR_Y: f64 = 20.0;
const V_SYST: f64 = 3.0;

fn geometry() -> DiskGeometry {
    DiskGeometry {
        inclination: Some(INCLINATION),
        star_x: Some(STAR_X),
        star_y: Some(STAR_Y),
        systemic_velocity: Some(V_SYST),
        distance: None,
    }
}

fn resolved() -> ResolvedGeometry {
    geometry().resolve().unwrap()
}

fn small_cube() -> SpectralCube {
    cube_from_channels(&[Array2::zeros((5, 5))], vec![0.0])
}

fn raw() -> BrightnessConverter {
    BrightnessConverter::new(TemperatureScale::Raw, &small_cube()).unwrap()
}

/// A disk point `(column, r, h, v)` projected back to pixel crossings, one
/// channel per point.
fn project(points: &[(usize, f64, f64, f64)]) -> Vec<ChannelSurface> {
    let (sin_i, cos_i) = INCLINATION.to_radians().sin_cos();
    points
        .iter()
        .enumerate()
        .map(|(index, &(column, r, h, v))| {
            let dx = column as f64 - STAR_X;
            let dy = (r * r - dx * dx).sqrt() * cos_i;
            let y_c = STAR_Y + h * sin_i;
            ChannelSurface {
                index,
                velocity: V_SYST + v * dx * sin_i / r,
                points: vec![SurfacePoint {
                    column,
                    y_near: y_c - dy,
                    y_far: y_c + dy,
                    t_near: 2.0,
                    t_far: 4.0,
                }],
                diagnostics: Default::default(),
            }
        })
        .collect()
}

fn disk_points() -> Vec<(usize, f64, f64, f64)> {
    vec![
        (15, 14.0, 3.5, 2.0),
        (20, 9.0, 2.25, 2.5),
        (32, 12.0, 3.0, 2.2),
        (40, 20.0, 5.0, 1.6),
    ]
}

fn detection(channels: Vec<ChannelSurface>) -> SurfaceDetection {
    SurfaceDetection {
        channels,
        noise: 0.0,
        threshold: 0.0,
        min_separation: 2.0,
        diagnostics: Default::default(),
        rotated: None,
    }
}

#[test]
fn test_round_trip_recovers_disk_coordinates() {
    let points = disk_points();
    let out = deproject_channels(
        &project(&points),
        &resolved(),
        1.0,
        &raw(),
        &DeprojectionConfig::default(),
    )
    .unwrap();

    assert_eq!(out.len(), points.len());
    assert!(!out.height_flipped && !out.velocity_flipped);
    for (p, &(column, r, h, v)) in out.points.iter().zip(&points) {
        assert_eq!(p.column, column);
        assert_relative_eq!(p.r, r, max_relative = 1e-10);
        assert_relative_eq!(p.h, h, max_relative = 1e-10);
        assert_relative_eq!(p.v, v, max_relative = 1e-10);
        assert_eq!(p.tb, 3.0);
    }
    assert_eq!(out.mask, vec![true; 4]);
    assert_eq!(out.diagnostics.kept, 4);
}

#[test]
fn test_pixel_scale_and_distance_scale_lengths() {
    let points = disk_points();
    let cube = small_cube();
    let geometry = DiskGeometry {
        distance: Some(100.0),
        ..geometry()
    };
    let config = DeprojectionConfig {
        temperature: TemperatureScale::Raw,
        ..Default::default()
    };
    let out = deproject(&detection(project(&points)), &cube, &geometry, &config).unwrap();

    let scale = cube.pixelscale * 100.0;
    for (p, &(_, r, h, v)) in out.points.iter().zip(&points) {
        assert_relative_eq!(p.r, r * scale, max_relative = 1e-10);
        assert_relative_eq!(p.h, h * scale, max_relative = 1e-10);
        // Velocities do not depend on the length unit.
        assert_relative_eq!(p.v, v, max_relative = 1e-10);
    }
}

#[test]
fn test_missing_geometry_is_a_configuration_error() {
    let cube = small_cube();
    let config = DeprojectionConfig::default();

    let no_inclination = DiskGeometry {
        inclination: None,
        ..geometry()
    };
    let err = deproject(&detection(vec![]), &cube, &no_inclination, &config).unwrap_err();
    assert!(matches!(err, DiskSurfError::MissingParameter("inclination")));

    let no_star = DiskGeometry {
        star_y: None,
        ..geometry()
    };
    let err = deproject(&detection(vec![]), &cube, &no_star, &config).unwrap_err();
    assert!(matches!(err, DiskSurfError::MissingParameter("star_y")));

    let no_vsys = DiskGeometry {
        systemic_velocity: None,
        ..geometry()
    };
    assert!(matches!(
        no_vsys.resolve(),
        Err(DiskSurfError::MissingParameter("systemic_velocity"))
    ));
}

#[test]
fn test_degenerate_inclination_is_rejected() {
    for inc in [0.0, 90.0, -10.0, f64::NAN] {
        let geometry = DiskGeometry {
            inclination: Some(inc),
            ..geometry()
        };
        assert!(
            matches!(geometry.resolve(), Err(DiskSurfError::InvalidParameter(_))),
            "inclination {} accepted",
            inc
        );
    }
    let far_away = DiskGeometry {
        distance: Some(0.0),
        ..geometry()
    };
    assert!(matches!(
        far_away.resolve(),
        Err(DiskSurfError::InvalidParameter(_))
    ));
}

#[test]
fn test_planck_needs_rest_frequency() {
    let err = BrightnessConverter::new(TemperatureScale::Planck, &small_cube()).unwrap_err();
    assert!(matches!(err, DiskSurfError::MissingParameter("rest frequency")));
}

#[test]
fn test_brightness_converted_once_from_mean_intensity() {
    let nu = 230.538e9;
    let cube = small_cube().with_rest_frequency(nu);
    let out = deproject(
        &detection(project(&disk_points())),
        &cube,
        &geometry(),
        &DeprojectionConfig::default(),
    )
    .unwrap();

    let expected = planck_temperature(3.0, nu, beam_solid_angle(&cube.beam));
    assert!(expected > 0.0);
    for p in &out.points {
        assert_relative_eq!(p.tb, expected, max_relative = 1e-12);
    }
}

#[test]
fn test_column_on_star_is_masked() {
    let mut channels = project(&disk_points());
    channels[1].points[0].column = STAR_X as usize;

    let out = deproject_channels(
        &channels,
        &resolved(),
        1.0,
        &raw(),
        &DeprojectionConfig::default(),
    )
    .unwrap();

    assert_eq!(out.diagnostics.undefined_velocity, 1);
    assert_eq!(out.mask, vec![true, false, true, true]);
    assert!(out.points.iter().all(|p| p.v.is_finite()));
}

#[test]
fn test_negative_heights_are_masked_without_flip() {
    let mut points = disk_points();
    points[2].2 = -3.0;
    let out = deproject_channels(
        &project(&points),
        &resolved(),
        1.0,
        &raw(),
        &DeprojectionConfig::default(),
    )
    .unwrap();

    assert!(!out.height_flipped);
    assert_eq!(out.diagnostics.negative_height, 1);
    assert_eq!(out.mask, vec![true, true, false, true]);
    assert!(out.points.iter().all(|p| p.h >= 0.0));
}

#[test]
fn test_auto_flip_when_surface_is_below_midplane() {
    let points: Vec<_> = disk_points()
        .into_iter()
        .map(|(c, r, h, v)| (c, r, -h, v))
        .collect();
    let channels = project(&points);

    let out = deproject_channels(
        &channels,
        &resolved(),
        1.0,
        &raw(),
        &DeprojectionConfig::default(),
    )
    .unwrap();
    assert!(out.height_flipped);
    assert_eq!(out.len(), 4);
    for (p, &(_, _, h, _)) in out.points.iter().zip(&points) {
        assert_relative_eq!(p.h, -h, max_relative = 1e-10);
    }

    let fixed_sign = DeprojectionConfig {
        height_convention: HeightConvention::FarMinusMidline,
        ..Default::default()
    };
    let out = deproject_channels(&channels, &resolved(), 1.0, &raw(), &fixed_sign).unwrap();
    assert!(!out.height_flipped);
    assert!(out.is_empty());
    assert_eq!(out.diagnostics.negative_height, 4);
}

#[test]
fn test_mean_velocity_is_made_positive() {
    let points: Vec<_> = disk_points()
        .into_iter()
        .map(|(c, r, h, v)| (c, r, h, -v))
        .collect();
    let out = deproject_channels(
        &project(&points),
        &resolved(),
        1.0,
        &raw(),
        &DeprojectionConfig::default(),
    )
    .unwrap();

    assert!(out.velocity_flipped);
    assert_eq!(out.len(), 4);
    let v = out.v();
    assert!(v.iter().sum::<f64>() / v.len() as f64 >= 0.0);
    for (got, &(_, _, _, want)) in v.iter().zip(&points) {
        assert_relative_eq!(*got, -want, max_relative = 1e-10);
    }
}

#[test]
fn test_residual_negative_velocity_is_optional() {
    let mut points = disk_points();
    points.push((10, 16.0, 4.0, -1.5));
    let channels = project(&points);

    let out = deproject_channels(
        &channels,
        &resolved(),
        1.0,
        &raw(),
        &DeprojectionConfig::default(),
    )
    .unwrap();
    assert!(!out.velocity_flipped);
    assert_eq!(out.diagnostics.negative_velocity, 1);
    assert_eq!(out.len(), 4);
    assert_eq!(out.mask, vec![true, true, true, true, false]);

    let keep = DeprojectionConfig {
        drop_negative_velocity: false,
        ..Default::default()
    };
    let out = deproject_channels(&channels, &resolved(), 1.0, &raw(), &keep).unwrap();
    assert_eq!(out.len(), 5);
    assert!(out.v().iter().any(|&v| v < 0.0));
}

#[test]
fn test_near_systemic_channels_are_masked() {
    let mut points = disk_points();
    // |dv| = 0.5 * 20 * sin(40) / 60, about 0.11 km/s.
    points.push((45, 60.0, 15.0, 0.5));
    let channels = project(&points);

    let out = deproject_channels(
        &channels,
        &resolved(),
        1.0,
        &raw(),
        &DeprojectionConfig::default(),
    )
    .unwrap();
    assert_eq!(out.diagnostics.near_systemic, 1);
    assert_eq!(out.len(), 4);

    let open = DeprojectionConfig {
        systemic_window: 0.0,
        ..Default::default()
    };
    let out = deproject_channels(&channels, &resolved(), 1.0, &raw(), &open).unwrap();
    assert_eq!(out.diagnostics.near_systemic, 0);
    assert_eq!(out.len(), 5);
}

#[test]
fn test_max_radius_cut() {
    let config = DeprojectionConfig {
        max_radius: Some(13.0),
        ..Default::default()
    };
    let out = deproject_channels(&project(&disk_points()), &resolved(), 1.0, &raw(), &config)
        .unwrap();

    assert_eq!(out.diagnostics.beyond_max_radius, 2);
    assert_eq!(out.diagnostics.removed_geometry(), 2);
    assert!(out.r().iter().all(|&r| r <= 13.0));
}

#[test]
fn test_no_points_gives_empty_result() {
    let out = deproject_channels(&[], &resolved(), 1.0, &raw(), &DeprojectionConfig::default())
        .unwrap();
    assert!(out.is_empty());
    assert!(out.mask.is_empty());
    assert!(!out.height_flipped && !out.velocity_flipped);
    assert_eq!(out.diagnostics.total, 0);
}

#[test]
fn test_rotation_velocity_guards_zero_offset() {
    assert_eq!(rotation_velocity(1.0, 10.0, 0.0, 0.5), None);
    assert_eq!(rotation_velocity(1.0, 10.0, 5.0, 0.0), None);
    assert_eq!(rotation_velocity(f64::INFINITY, 10.0, 5.0, 0.5), None);
    assert_relative_eq!(
        rotation_velocity(1.0, 10.0, 5.0, 0.5).unwrap(),
        4.0,
        max_relative = 1e-15
    );
}
