extern crate nalgebra as na;

use std::fmt;
use na::{DMatrix,DVector,Vector2,Vector3,Matrix3,Isometry3};
use crate::Float;

const RANK_LOSS_TOLERANCE: Float = 0.001;

/**
 * Outcome of a triangulation. Uninitialized is only ever the default value.
 */
#[derive(Debug,Clone,Copy,PartialEq)]
pub enum TriangulationResult {
    Successful(Vector3<Float>),
    TooFewMeasurements,
    Unobservable,
    Uninitialized
}

impl Default for TriangulationResult {
    fn default() -> Self {
        TriangulationResult::Uninitialized
    }
}

impl TriangulationResult {
    pub fn was_triangulation_successful(&self) -> bool {
        match self {
            TriangulationResult::Successful(_) => true,
            _ => false
        }
    }

    pub fn get_point(&self) -> Option<&Vector3<Float>> {
        match self {
            TriangulationResult::Successful(point) => Some(point),
            _ => None
        }
    }

    pub fn get_label(&self) -> &'static str {
        match self {
            TriangulationResult::Successful(_) => "SUCCESSFUL",
            TriangulationResult::TooFewMeasurements => "TOO_FEW_MEASUREMENTS",
            TriangulationResult::Unobservable => "UNOBSERVABLE",
            TriangulationResult::Uninitialized => "UNINITIALIZED"
        }
    }
}

impl From<TriangulationResult> for bool {
    fn from(result: TriangulationResult) -> bool {
        result.was_triangulation_successful()
    }
}

impl From<&TriangulationResult> for bool {
    fn from(result: &TriangulationResult) -> bool {
        result.was_triangulation_successful()
    }
}

impl fmt::Display for TriangulationResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TriangulationResult: {}", self.get_label())
    }
}

/**
 * Triangulates a point in the global frame from n keypoint measurements on the normalized image plane of one camera.
 * T_G_B: pose of the body w.r.t. the global frame for each measurement.
 * T_B_C: pose of the camera w.r.t. the body.
 */
#[allow(non_snake_case)]
pub fn linear_triangulate_from_n_views(measurements_normalized: &[Vector2<Float>], T_G_B: &[Isometry3<Float>], T_B_C: &Isometry3<Float>) -> TriangulationResult {
    assert_eq!(measurements_normalized.len(), T_G_B.len(), "linear_triangulate_from_n_views: measurement and pose counts differ");
    let T_G_C = T_G_B.iter().map(|pose| pose*T_B_C).collect::<Vec<Isometry3<Float>>>();
    linear_triangulate_from_camera_poses(measurements_normalized, &T_G_C)
}

/**
 * Same as linear_triangulate_from_n_views for a rig of m cameras.
 * measurement_camera_indices selects for each measurement one of the m extrinsics in T_B_C.
 */
#[allow(non_snake_case)]
pub fn linear_triangulate_from_n_views_multi_cam(measurements_normalized: &[Vector2<Float>], measurement_camera_indices: &[usize], T_G_B: &[Isometry3<Float>], T_B_C: &[Isometry3<Float>]) -> TriangulationResult {
    assert_eq!(measurements_normalized.len(), T_G_B.len(), "linear_triangulate_from_n_views_multi_cam: measurement and pose counts differ");
    assert_eq!(measurements_normalized.len(), measurement_camera_indices.len(), "linear_triangulate_from_n_views_multi_cam: measurement and camera index counts differ");
    let T_G_C = T_G_B.iter().zip(measurement_camera_indices.iter()).map(|(pose,&cam_index)| {
        assert!(cam_index < T_B_C.len(), "linear_triangulate_from_n_views_multi_cam: camera index {} out of range for {} cameras", cam_index, T_B_C.len());
        pose*T_B_C[cam_index]
    }).collect::<Vec<Isometry3<Float>>>();
    linear_triangulate_from_camera_poses(measurements_normalized, &T_G_C)
}

/**
 * Every measurement contributes the ray G_p = p_G_C + depth_i * R_G_C * [u v 1]^T, which gives 3 equations in the
 * unknowns (G_p, depth_1 .. depth_n). The point is unobservable if the stacked system loses rank.
 */
#[allow(non_snake_case)]
pub fn linear_triangulate_from_camera_poses(measurements_normalized: &[Vector2<Float>], T_G_C: &[Isometry3<Float>]) -> TriangulationResult {
    assert_eq!(measurements_normalized.len(), T_G_C.len(), "linear_triangulate_from_camera_poses: measurement and pose counts differ");
    let n = measurements_normalized.len();
    if n < 2 {
        return TriangulationResult::TooFewMeasurements;
    }

    let rows = 3*n;
    let cols = 3+n;
    let mut A = DMatrix::<Float>::zeros(rows,cols);
    let mut b = DVector::<Float>::zeros(rows);

    for (i,(measurement,pose)) in measurements_normalized.iter().zip(T_G_C.iter()).enumerate() {
        let v = Vector3::<Float>::new(measurement[0], measurement[1], 1.0);
        A.fixed_view_mut::<3,3>(3*i,0).copy_from(&Matrix3::<Float>::identity());
        A.fixed_view_mut::<3,1>(3*i,3+i).copy_from(&(-(pose.rotation*v)));
        b.fixed_rows_mut::<3>(3*i).copy_from(&pose.translation.vector);
    }

    if column_pivoted_rank(&A, RANK_LOSS_TOLERANCE) < n + 3 {
        return TriangulationResult::Unobservable;
    }

    match A.svd(true,true).solve(&b, Float::EPSILON) {
        Ok(x) => TriangulationResult::Successful(x.fixed_rows::<3>(0).into_owned()),
        Err(_) => TriangulationResult::Unobservable
    }
}

/**
 * Numerical rank from a column pivoted QR: the number of diagonal entries of R whose magnitude exceeds
 * threshold times the largest pivot.
 */
#[allow(non_snake_case)]
pub fn column_pivoted_rank(A: &DMatrix<Float>, threshold: Float) -> usize {
    let r = A.clone().col_piv_qr().r();
    let pivots = (0..r.nrows().min(r.ncols())).map(|i| r[(i,i)].abs()).collect::<Vec<Float>>();
    let max_pivot = pivots.iter().cloned().fold(0.0, Float::max);
    pivots.iter().filter(|&&p| p > threshold*max_pivot).count()
}
