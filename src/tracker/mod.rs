extern crate nalgebra as na;

use na::Matrix3;
use crate::sensors::camera::visual_frame::VisualFrame;
use crate::Float;

pub mod gyro_tracker;
pub mod gyro_tracker_parameters;
pub mod keypoint_lookup;
pub mod bucket_admission;

pub type TrackId = usize;

/**
 * Assigns persistent track ids to the keypoints of consecutive frames.
 * Takes ownership of the incoming frame and hands back the preceding one once its track ids are final.
 */
pub trait FeatureTracker {
    #[allow(non_snake_case)]
    fn add_frame(&mut self, current_frame: VisualFrame, C_current_prev: &Matrix3<Float>) -> Option<VisualFrame>;
}
