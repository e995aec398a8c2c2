extern crate nalgebra as na;

use na::{Matrix3, Vector3};
use serde::{Serialize, Deserialize};
use crate::image::features::geometry::point::Point;
use crate::sensors::camera::Camera;
use crate::Float;

const IDENTITY_EPS: Float = 1e-12;

#[derive(Debug,Copy,Clone,Serialize,Deserialize)]
pub struct Perspective {
    pub projection: Matrix3<Float>,
    pub inverse_projection: Matrix3<Float>,
    pub width: usize,
    pub height: usize
}

impl Perspective {
    pub fn new(fx: Float, fy: Float, cx: Float, cy: Float, s: Float, width: usize, height: usize) -> Perspective {
        assert!(width > 0 && height > 0, "Perspective: image dimensions must be positive");
        let (projection,inverse_projection) = Self::compute_projections(fx,fy,cx,cy,s);
        assert!(((projection*inverse_projection).determinant() - 1.0).abs() <= IDENTITY_EPS, "Perspective: projection is not invertible");
        Perspective{projection,inverse_projection,width,height}
    }

    fn compute_projections(fx: Float,fy: Float, cx: Float, cy: Float, s: Float) -> (Matrix3<Float>,Matrix3<Float>) {
        let projection = Matrix3::<Float>::new(fx, s, cx,
            0.0, fy, cy,
            0.0, 0.0, 1.0);

        let inverse_projection = Matrix3::<Float>::new(1.0/fx, -s/(fx*fy), (s*cy - cx*fy)/(fx*fy),
                        0.0, 1.0/fy, -cy/fy,
                        0.0, 0.0, 1.0);

        (projection,inverse_projection)
    }
}

impl Camera for Perspective {

    // Only points in front of the camera project.
    fn project(&self, position: &Vector3<Float>) -> Option<Point<Float>> {
        let z = position[2];
        match z {
            z if z > 0.0 => {
                let homogeneous = position/z;
                let projected_coordinates = self.projection*homogeneous;
                Some(Point::<Float>::new(projected_coordinates[0],projected_coordinates[1]))
            },
            _ => None
        }
    }

    fn backproject(&self, point: &Point<Float>, depth: Float) -> Vector3<Float> {
        let homogeneous = Vector3::<Float>::new(point.x, point.y,1.0);
        (self.inverse_projection*homogeneous).scale(depth)
    }

    fn get_width(&self) -> usize {
        self.width
    }

    fn get_height(&self) -> usize {
        self.height
    }
}
