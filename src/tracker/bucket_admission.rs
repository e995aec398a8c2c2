extern crate nalgebra as na;

use std::cmp::Ordering;
use na::Vector2;
use crate::tracker::gyro_tracker_parameters::GyroTrackerParameters;
use crate::Float;

/**
 * K x K partition of the image plane counting the keypoints admitted into each cell.
 */
#[derive(Debug,Clone)]
pub struct BucketGrid {
    number_of_buckets_per_side: usize,
    bucket_width_x: Float,
    bucket_width_y: Float,
    occupancy: Vec<usize>
}

impl BucketGrid {
    pub fn new(number_of_buckets_per_side: usize, image_width: usize, image_height: usize) -> BucketGrid {
        assert!(number_of_buckets_per_side > 0, "BucketGrid: need at least one bucket");
        BucketGrid {
            number_of_buckets_per_side,
            bucket_width_x: image_width as Float / number_of_buckets_per_side as Float,
            bucket_width_y: image_height as Float / number_of_buckets_per_side as Float,
            occupancy: vec![0; number_of_buckets_per_side*number_of_buckets_per_side]
        }
    }

    pub fn compute_bin_index(&self, keypoint: &Vector2<Float>) -> usize {
        let bin_x = (keypoint[0] / self.bucket_width_x).floor();
        let bin_y = (keypoint[1] / self.bucket_width_y).floor();
        let k = self.number_of_buckets_per_side as Float;
        assert!(bin_x >= 0.0 && bin_x < k && bin_y >= 0.0 && bin_y < k, "BucketGrid: keypoint ({}, {}) lies outside of the image", keypoint[0], keypoint[1]);
        bin_y as usize * self.number_of_buckets_per_side + bin_x as usize
    }

    pub fn push(&mut self, bin_index: usize) -> () {
        self.occupancy[bin_index] += 1;
    }

    pub fn get_occupancy(&self, bin_index: usize) -> usize {
        self.occupancy[bin_index]
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum AdmissionTier {
    Continuation,
    Unconditional,
    Strong
}

/**
 * A match whose current keypoint is not part of any track yet.
 */
#[derive(Debug,Clone,Copy)]
pub struct AdmissionCandidate {
    pub index_match: usize,
    pub keypoint: Vector2<Float>,
    pub score: Float
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct Admission {
    pub index_match: usize,
    pub tier: AdmissionTier,
    pub bin_index: usize
}

#[derive(Debug,Default,Clone,Copy,PartialEq,Eq)]
pub struct AdmissionStatistics {
    pub continued: usize,
    pub unconditional_accepted: usize,
    pub strong_accepted: usize,
    pub unconditional_score_too_low: usize,
    pub strong_score_too_low: usize,
    pub bucket_too_full: usize
}

/**
 * Ranked admission of matches into the bucket grid.
 * Continuations always get a slot and only count towards coverage. The strongest orphans up to the unconditional
 * count are admitted regardless of occupancy if they clear the unconditional score. The remaining orphans, best
 * score first and up to the strong budget, are admitted while their cell holds fewer than strong budget / K^2.
 */
pub struct BucketAdmission<'a> {
    parameters: &'a GyroTrackerParameters,
    grid: BucketGrid,
    admitted: Vec<Admission>,
    statistics: AdmissionStatistics
}

impl<'a> BucketAdmission<'a> {
    pub fn new(parameters: &'a GyroTrackerParameters, image_width: usize, image_height: usize) -> BucketAdmission<'a> {
        BucketAdmission {
            parameters,
            grid: BucketGrid::new(parameters.number_of_tracking_buckets, image_width, image_height),
            admitted: Vec::new(),
            statistics: AdmissionStatistics::default()
        }
    }

    pub fn admit_continuation(&mut self, index_match: usize, keypoint: &Vector2<Float>) -> () {
        let bin_index = self.grid.compute_bin_index(keypoint);
        self.grid.push(bin_index);
        self.admitted.push(Admission{index_match, tier: AdmissionTier::Continuation, bin_index});
        self.statistics.continued += 1;
    }

    pub fn admit_orphans(&mut self, mut orphans: Vec<AdmissionCandidate>) -> () {
        orphans.sort_by(|a,b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        let number_unconditional = self.parameters.number_of_keypoints_use_unconditional.min(orphans.len());
        let number_considered = self.parameters.number_of_keypoints_use_strong.min(orphans.len()).max(number_unconditional);
        let quota = self.parameters.get_strong_quota_per_bucket();

        for candidate in &orphans[0..number_unconditional] {
            if candidate.score < self.parameters.keypoint_score_threshold_unconditional {
                self.statistics.unconditional_score_too_low += 1;
                continue;
            }
            let bin_index = self.grid.compute_bin_index(&candidate.keypoint);
            self.grid.push(bin_index);
            self.admitted.push(Admission{index_match: candidate.index_match, tier: AdmissionTier::Unconditional, bin_index});
            self.statistics.unconditional_accepted += 1;
        }

        for candidate in &orphans[number_unconditional..number_considered] {
            if candidate.score < self.parameters.keypoint_score_threshold_strong {
                self.statistics.strong_score_too_low += 1;
                continue;
            }
            let bin_index = self.grid.compute_bin_index(&candidate.keypoint);
            match self.grid.get_occupancy(bin_index) {
                occupancy if occupancy < quota => {
                    self.grid.push(bin_index);
                    self.admitted.push(Admission{index_match: candidate.index_match, tier: AdmissionTier::Strong, bin_index});
                    self.statistics.strong_accepted += 1;
                },
                _ => {
                    self.statistics.bucket_too_full += 1;
                }
            }
        }
    }

    pub fn get_statistics(&self) -> &AdmissionStatistics {
        &self.statistics
    }

    pub fn into_admitted(self) -> (Vec<Admission>, AdmissionStatistics) {
        (self.admitted, self.statistics)
    }
}
