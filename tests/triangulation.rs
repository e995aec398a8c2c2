#![allow(non_snake_case)]

extern crate nalgebra as na;

use na::{Isometry3, Point3, Translation3, UnitQuaternion, Vector2, Vector3};
use gyro_vision::Float;
use gyro_vision::sfm::triangulation::{
    TriangulationResult,
    linear_triangulate_from_n_views,
    linear_triangulate_from_n_views_multi_cam};

fn pose(x: Float, y: Float, z: Float, yaw: Float) -> Isometry3<Float> {
    Isometry3::from_parts(Translation3::new(x, y, z), UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw))
}

fn observe(G_p: &Vector3<Float>, T_G_C: &Isometry3<Float>) -> Vector2<Float> {
    let C_p = T_G_C.inverse_transform_point(&Point3::from(*G_p));
    Vector2::new(C_p.x/C_p.z, C_p.y/C_p.z)
}

fn body_trajectory() -> Vec<Isometry3<Float>> {
    vec![
        pose(0.0, 0.0, 0.0, 0.0),
        pose(0.5, 0.1, 0.0, -0.05),
        pose(1.0, -0.1, 0.2, -0.1),
        pose(1.5, 0.0, 0.1, -0.12)]
}

fn assert_close(result: &TriangulationResult, expected: &Vector3<Float>) {
    let point = result.get_point().expect("triangulation succeeds");
    assert!((point - expected).norm() < 1e-6, "{} is not close to {}", point, expected);
}

#[test]
fn noise_free_views_recover_the_point() {
    let G_p = Vector3::new(1.0, -0.5, 6.0);
    let T_G_B = body_trajectory();
    let T_B_C = pose(0.05, 0.0, 0.02, 0.01);
    let measurements = T_G_B.iter().map(|T| observe(&G_p, &(T*T_B_C))).collect::<Vec<Vector2<Float>>>();

    let result = linear_triangulate_from_n_views(&measurements, &T_G_B, &T_B_C);
    assert!(result.was_triangulation_successful());
    assert_close(&result, &G_p);
}

#[test]
fn two_views_are_enough() {
    let G_p = Vector3::new(-0.3, 0.2, 4.0);
    let T_G_B = body_trajectory()[0..2].to_vec();
    let T_B_C = Isometry3::identity();
    let measurements = T_G_B.iter().map(|T| observe(&G_p, T)).collect::<Vec<Vector2<Float>>>();

    assert_close(&linear_triangulate_from_n_views(&measurements, &T_G_B, &T_B_C), &G_p);
}

#[test]
fn single_view_is_too_few() {
    let result = linear_triangulate_from_n_views(&[Vector2::new(0.1, 0.2)], &[Isometry3::identity()], &Isometry3::identity());
    assert_eq!(result, TriangulationResult::TooFewMeasurements);
    assert!(!bool::from(result));
    assert_eq!(result.to_string(), "TriangulationResult: TOO_FEW_MEASUREMENTS");

    let empty = linear_triangulate_from_n_views(&[], &[], &Isometry3::identity());
    assert_eq!(empty, TriangulationResult::TooFewMeasurements);
}

#[test]
fn rays_along_the_baseline_are_unobservable() {
    // All cameras sit on the optical axis of the first one and look at a point on that axis.
    let G_p = Vector3::new(0.0, 0.0, 5.0);
    let T_G_B = vec![pose(0.0, 0.0, 0.0, 0.0), pose(0.0, 0.0, -1.0, 0.0), pose(0.0, 0.0, -2.0, 0.0)];
    let measurements = T_G_B.iter().map(|T| observe(&G_p, T)).collect::<Vec<Vector2<Float>>>();

    let result = linear_triangulate_from_n_views(&measurements, &T_G_B, &Isometry3::identity());
    assert_eq!(result, TriangulationResult::Unobservable);
    assert!(result.get_point().is_none());
}

#[test]
fn identical_camera_centers_are_unobservable() {
    let G_p = Vector3::new(0.4, 0.1, 3.0);
    let T_G_B = vec![pose(0.0, 0.0, 0.0, 0.0), pose(0.0, 0.0, 0.0, 0.2)];
    let measurements = T_G_B.iter().map(|T| observe(&G_p, T)).collect::<Vec<Vector2<Float>>>();

    assert_eq!(linear_triangulate_from_n_views(&measurements, &T_G_B, &Isometry3::identity()), TriangulationResult::Unobservable);
}

#[test]
fn multi_cam_with_one_camera_matches_single_cam() {
    let G_p = Vector3::new(0.7, 0.3, 5.0);
    let T_G_B = body_trajectory();
    let T_B_C = pose(0.1, 0.0, 0.0, 0.02);
    let measurements = T_G_B.iter().map(|T| observe(&G_p, &(T*T_B_C))).collect::<Vec<Vector2<Float>>>();

    let single = linear_triangulate_from_n_views(&measurements, &T_G_B, &T_B_C);
    let multi = linear_triangulate_from_n_views_multi_cam(&measurements, &vec![0; measurements.len()], &T_G_B, &[T_B_C]);
    let (a, b) = (single.get_point().expect("single cam succeeds"), multi.get_point().expect("multi cam succeeds"));
    assert!((a - b).norm() < 1e-9);
}

#[test]
fn stereo_rig_observations_are_combined() {
    let G_p = Vector3::new(-0.5, 0.4, 7.0);
    let T_G_B = vec![pose(0.0, 0.0, 0.0, 0.0), pose(0.0, 0.0, 0.0, 0.0), pose(0.3, 0.0, 0.5, 0.05)];
    let T_B_C = vec![Isometry3::identity(), pose(0.12, 0.0, 0.0, 0.0)];
    let camera_indices = vec![0, 1, 1];
    let measurements = T_G_B.iter().zip(camera_indices.iter())
        .map(|(T, &c)| observe(&G_p, &(T*T_B_C[c])))
        .collect::<Vec<Vector2<Float>>>();

    assert_close(&linear_triangulate_from_n_views_multi_cam(&measurements, &camera_indices, &T_G_B, &T_B_C), &G_p);
}

#[test]
#[should_panic]
fn camera_index_out_of_range_is_fatal() {
    let T_G_B = vec![Isometry3::identity(), pose(1.0, 0.0, 0.0, 0.0)];
    linear_triangulate_from_n_views_multi_cam(&[Vector2::zeros(), Vector2::zeros()], &[0, 2], &T_G_B, &[Isometry3::identity(), Isometry3::identity()]);
}
