extern crate nalgebra as na;

use na::{Vector3,Matrix4,Matrix3,UnitQuaternion,Isometry3,Translation3,Rotation3};
use crate::Float;

pub fn from_matrix(mat: &Matrix4<Float>) -> Isometry3<Float> {
    let vec = Vector3::<Float>::new(mat[(0,3)],mat[(1,3)],mat[(2,3)]);
    let rot = mat.fixed_view::<3,3>(0,0).into_owned();

    Isometry3::<Float>::from_parts(Translation3::from(vec), UnitQuaternion::<Float>::from_matrix(&rot))
}

pub fn from_parts(t: &Vector3<Float>, rotation: &Matrix3<Float>) -> Isometry3<Float> {
    Isometry3::<Float>::from_parts(Translation3::from(*t), UnitQuaternion::<Float>::from_matrix(rotation))
}

/**
 * Rotation C_current_prev taking bearing vectors of the previous camera into the current camera.
 * Both poses are cameras expressed in a common world frame (T_W_C).
 */
#[allow(non_snake_case)]
pub fn relative_rotation(T_W_C_prev: &Isometry3<Float>, T_W_C_current: &Isometry3<Float>) -> Matrix3<Float> {
    (T_W_C_current.rotation.inverse()*T_W_C_prev.rotation).to_rotation_matrix().matrix().into_owned()
}

/**
 * Orientation of the current frame w.r.t. the previous one (C_prev_current) after rotating with a constant
 * angular velocity (rad/s, expressed in the moving frame) for dt seconds.
 */
pub fn rotation_from_angular_velocity(angular_velocity: &Vector3<Float>, dt: Float) -> Matrix3<Float> {
    Rotation3::<Float>::new(angular_velocity*dt).matrix().into_owned()
}
