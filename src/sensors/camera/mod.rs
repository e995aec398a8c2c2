extern crate nalgebra as na;

use na::{Vector2, Vector3};
use crate::image::features::geometry::point::Point;
use crate::Float;

pub mod perspective;
pub mod visual_frame;

/**
 * Projection model between bearing vectors in the camera frame and pixel coordinates.
 * Distortion is the responsibility of the implementor.
 */
pub trait Camera {
    fn project(&self, position: &Vector3<Float>) -> Option<Point<Float>>;
    fn backproject(&self, point: &Point<Float>, depth: Float) -> Vector3<Float>;
    fn get_width(&self) -> usize;
    fn get_height(&self) -> usize;

    /**
     * Keypoint on the normalized (unit depth) image plane.
     */
    fn normalize(&self, point: &Point<Float>) -> Vector2<Float> {
        let bearing = self.backproject(point, 1.0);
        Vector2::<Float>::new(bearing[0]/bearing[2], bearing[1]/bearing[2])
    }

    fn is_within_image(&self, point: &Point<Float>) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x < self.get_width() as Float && point.y < self.get_height() as Float
    }
}
