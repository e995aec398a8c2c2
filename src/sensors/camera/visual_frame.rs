extern crate nalgebra as na;

use na::{Matrix2xX, Vector2};
use crate::image::features::geometry::point::Point;
use crate::tracker::TrackId;
use crate::Float;

/**
 * Keypoint measurements of one camera image together with their binary descriptors, detector scores and track ids.
 * Descriptors are stored back to back, descriptor_size_bytes each.
 * Timestamps are in nanoseconds.
 */
#[derive(Debug,Clone)]
pub struct VisualFrame {
    timestamp: i64,
    keypoint_measurements: Matrix2xX<Float>,
    keypoint_scores: Vec<Float>,
    descriptors: Vec<u8>,
    descriptor_size_bytes: usize,
    track_ids: Vec<Option<TrackId>>
}

impl VisualFrame {
    pub fn new(timestamp: i64, keypoint_measurements: Matrix2xX<Float>, keypoint_scores: Vec<Float>, descriptors: Vec<u8>, descriptor_size_bytes: usize) -> VisualFrame {
        let n = keypoint_measurements.ncols();
        assert_eq!(keypoint_scores.len(), n, "VisualFrame: score count does not match keypoint count");
        VisualFrame {
            timestamp,
            keypoint_measurements,
            keypoint_scores,
            descriptors,
            descriptor_size_bytes,
            track_ids: vec![None; n]
        }
    }

    pub fn from_keypoints(timestamp: i64, keypoints: &Vec<Point<Float>>, keypoint_scores: Vec<Float>, descriptors: &Vec<Vec<u8>>) -> VisualFrame {
        assert_eq!(keypoints.len(), descriptors.len(), "VisualFrame: descriptor count does not match keypoint count");
        let descriptor_size_bytes = descriptors.first().map_or(0, |d| d.len());
        assert!(descriptors.iter().all(|d| d.len() == descriptor_size_bytes), "VisualFrame: descriptors differ in length");

        let mut keypoint_measurements = Matrix2xX::<Float>::zeros(keypoints.len());
        for (i,p) in keypoints.iter().enumerate() {
            keypoint_measurements[(0,i)] = p.x;
            keypoint_measurements[(1,i)] = p.y;
        }

        VisualFrame::new(timestamp, keypoint_measurements, keypoint_scores, descriptors.concat(), descriptor_size_bytes)
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_number_of_keypoints(&self) -> usize {
        self.keypoint_measurements.ncols()
    }

    pub fn has_descriptors(&self) -> bool {
        self.descriptor_size_bytes > 0 || self.get_number_of_keypoints() == 0
    }

    pub fn get_keypoint_measurements(&self) -> &Matrix2xX<Float> {
        &self.keypoint_measurements
    }

    pub fn get_keypoint_measurement(&self, index: usize) -> Vector2<Float> {
        self.keypoint_measurements.column(index).into_owned()
    }

    pub fn get_keypoint_as_point(&self, index: usize) -> Point<Float> {
        Point::new(self.keypoint_measurements[(0,index)], self.keypoint_measurements[(1,index)])
    }

    pub fn get_keypoint_score(&self, index: usize) -> Float {
        self.keypoint_scores[index]
    }

    pub fn get_descriptor_size_bytes(&self) -> usize {
        self.descriptor_size_bytes
    }

    pub fn get_number_of_descriptors(&self) -> usize {
        match self.descriptor_size_bytes {
            0 => 0,
            size => self.descriptors.len() / size
        }
    }

    pub fn get_descriptor(&self, index: usize) -> &[u8] {
        let start = index*self.descriptor_size_bytes;
        &self.descriptors[start..start+self.descriptor_size_bytes]
    }

    pub fn get_track_ids(&self) -> &Vec<Option<TrackId>> {
        &self.track_ids
    }

    pub fn get_track_id(&self, index: usize) -> Option<TrackId> {
        self.track_ids[index]
    }

    pub fn get_track_ids_mut(&mut self) -> &mut Vec<Option<TrackId>> {
        &mut self.track_ids
    }

    /**
     * Replaces the track ids and returns the old ones.
     */
    pub fn swap_track_ids(&mut self, track_ids: Vec<Option<TrackId>>) -> Vec<Option<TrackId>> {
        assert_eq!(track_ids.len(), self.get_number_of_keypoints(), "VisualFrame: track id count does not match keypoint count");
        std::mem::replace(&mut self.track_ids, track_ids)
    }
}
