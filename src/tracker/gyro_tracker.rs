extern crate nalgebra as na;

use std::cmp::Reverse;
use log::{debug,trace};
use na::{Matrix3, Vector2};
use crate::matching::binary_descriptor::hamming_distance;
use crate::sensors::camera::{Camera, visual_frame::VisualFrame};
use crate::tracker::{FeatureTracker, TrackId};
use crate::tracker::bucket_admission::{AdmissionCandidate, BucketAdmission};
use crate::tracker::gyro_tracker_parameters::GyroTrackerParameters;
use crate::tracker::keypoint_lookup::{KeypointAndIndex, KeypointRowLookup};
use crate::Float;

/**
 * Frame to frame keypoint tracker for large inter-frame rotations.
 * Previous keypoints are rotated into the current frame with an external rotation hint (e.g. from a gyroscope),
 * matched by descriptor in a small window around the prediction and the matches are turned into tracks.
 *
 * One instance per image stream: the track id counter is owned by the tracker.
 */
pub struct GyroTracker<C: Camera> {
    camera: C,
    parameters: GyroTrackerParameters,
    previous_frame: Option<VisualFrame>,
    previous_track_lengths: Vec<usize>,
    next_track_id: TrackId
}

impl<C: Camera> GyroTracker<C> {
    pub fn new(camera: C) -> GyroTracker<C> {
        GyroTracker::with_parameters(camera, GyroTrackerParameters::default())
    }

    pub fn with_parameters(camera: C, parameters: GyroTrackerParameters) -> GyroTracker<C> {
        if let Err(e) = parameters.validate() {
            panic!("GyroTracker: {}", e);
        }
        GyroTracker {
            camera,
            parameters,
            previous_frame: None,
            previous_track_lengths: Vec::new(),
            next_track_id: 0
        }
    }

    pub fn get_camera(&self) -> &C {
        &self.camera
    }

    pub fn get_parameters(&self) -> &GyroTrackerParameters {
        &self.parameters
    }

    /**
     * The most recently added frame with its track ids.
     */
    pub fn get_previous_frame(&self) -> Option<&VisualFrame> {
        self.previous_frame.as_ref()
    }

    pub fn get_previous_track_lengths(&self) -> &Vec<usize> {
        &self.previous_track_lengths
    }

    pub fn get_number_of_tracks_created(&self) -> usize {
        self.next_track_id
    }

    pub fn into_last_frame(self) -> Option<VisualFrame> {
        self.previous_frame
    }

    fn allocate_track_id(&mut self) -> TrackId {
        let track_id = self.next_track_id;
        self.next_track_id += 1;
        track_id
    }

    fn initialize(&mut self, mut current_frame: VisualFrame) -> Option<VisualFrame> {
        let number_of_keypoints = current_frame.get_number_of_keypoints();
        current_frame.swap_track_ids(vec![None; number_of_keypoints]);
        self.previous_track_lengths = vec![0; number_of_keypoints];
        self.previous_frame.replace(current_frame)
    }

    /**
     * Matches every previous keypoint to at most one current keypoint. Returns (index previous, index current, hamming distance).
     * The search first runs in a window of min_search_radius around the predicted location and falls back to
     * search_radius if nothing clears the descriptor threshold.
     */
    #[allow(non_snake_case)]
    pub fn match_features(&self, C_current_prev: &Matrix3<Float>, current_frame: &VisualFrame, previous_frame: &VisualFrame) -> Vec<(usize,usize,u32)> {
        let image_height = self.camera.get_height();
        let current_keypoints = KeypointRowLookup::new(current_frame.get_keypoint_measurements(), image_height);

        let min_search_radius = self.parameters.min_search_radius;
        let search_radius = self.parameters.search_radius;
        let previous_number_of_keypoints = previous_frame.get_number_of_keypoints();
        let mut matches_prev_current = Vec::<(usize,usize,u32)>::with_capacity(previous_number_of_keypoints);
        let mut number_of_no_matches = 0;

        for i in 0..previous_number_of_keypoints {
            let previous_bearing = self.camera.backproject(&previous_frame.get_keypoint_as_point(i), 1.0);
            let predicted = match self.camera.project(&(C_current_prev*previous_bearing)) {
                Some(p) => Vector2::<Float>::new(p.x, p.y),
                None => {
                    number_of_no_matches += 1;
                    continue;
                }
            };
            let previous_descriptor = previous_frame.get_descriptor(i);
            let in_window = |measurement: &Vector2<Float>, radius: Float| (measurement[0] - predicted[0]).abs() <= radius;

            let narrow_band = current_keypoints.row_band(predicted[1], min_search_radius);
            let in_narrow_window = |k: &KeypointAndIndex| match narrow_band {
                Some((top,bottom)) => k.measurement[1] >= top as Float && k.measurement[1] < (bottom+1) as Float && in_window(&k.measurement, min_search_radius),
                None => false
            };

            let mut best = match narrow_band {
                Some((top,bottom)) => self.best_in_window(previous_descriptor, current_frame, current_keypoints.rows(top, bottom), |k| in_narrow_window(k)),
                None => None
            };

            // Everything in the small window failed already, so it is skipped here.
            if best.is_none() {
                if let Some((top,bottom)) = current_keypoints.row_band(predicted[1], search_radius) {
                    best = self.best_in_window(previous_descriptor, current_frame, current_keypoints.rows(top, bottom), |k| in_window(&k.measurement, search_radius) && !in_narrow_window(k));
                }
            }

            match best {
                Some((index_current, distance)) => {
                    trace!("GyroTracker match bits: {}", distance);
                    matches_prev_current.push((i, index_current, distance));
                },
                None => number_of_no_matches += 1
            }
        }

        debug!("GyroTracker: {} keypoint matches, {} previous keypoints without match", matches_prev_current.len(), number_of_no_matches);
        matches_prev_current
    }

    // Lowest hamming distance below the matching threshold, first one wins on ties.
    fn best_in_window<F>(&self, previous_descriptor: &[u8], current_frame: &VisualFrame, keypoints: &[KeypointAndIndex], accept: F) -> Option<(usize,u32)> where F: Fn(&KeypointAndIndex) -> bool {
        let mut best: Option<(usize,u32)> = None;
        for keypoint in keypoints.iter().filter(|k| accept(*k)) {
            let distance = hamming_distance(previous_descriptor, current_frame.get_descriptor(keypoint.index));
            let best_distance = best.map_or(self.parameters.matching_threshold_bits, |(_,d)| d);
            if distance < best_distance {
                best = Some((keypoint.index, distance));
            }
        }
        best
    }
}

impl<C: Camera> FeatureTracker for GyroTracker<C> {

    #[allow(non_snake_case)]
    fn add_frame(&mut self, mut current_frame: VisualFrame, C_current_prev: &Matrix3<Float>) -> Option<VisualFrame> {
        let current_number_of_keypoints = current_frame.get_number_of_keypoints();

        // Initialize if this is the first frame or the current frame has no keypoints.
        let mut previous_frame = match self.previous_frame.take() {
            Some(previous_frame) if current_number_of_keypoints > 0 => previous_frame,
            previous_frame => {
                self.previous_frame = previous_frame;
                return self.initialize(current_frame);
            }
        };

        assert!(current_frame.get_timestamp() > previous_frame.get_timestamp(), "GyroTracker: frames are not ordered in time ({} <= {})", current_frame.get_timestamp(), previous_frame.get_timestamp());
        assert!(current_frame.has_descriptors(), "GyroTracker: current frame has no descriptors");
        assert!(current_frame.get_descriptor_size_bytes()*8 < self.parameters.max_descriptor_bits, "GyroTracker: descriptors with {} bits are not supported", current_frame.get_descriptor_size_bytes()*8);
        assert_eq!(current_frame.get_number_of_descriptors(), current_number_of_keypoints, "GyroTracker: descriptor count does not match keypoint count");
        assert!(previous_frame.get_number_of_keypoints() == 0 || current_frame.get_descriptor_size_bytes() == previous_frame.get_descriptor_size_bytes(), "GyroTracker: descriptor size changed between frames");
        assert_eq!(self.previous_track_lengths.len(), previous_frame.get_number_of_keypoints(), "GyroTracker: track lengths out of sync with previous frame");

        let matches_prev_current = self.match_features(C_current_prev, &current_frame, &previous_frame);

        // Several previous keypoints may hit the same current keypoint. A continued track beats an orphan,
        // then the lower hamming distance wins, then the lower previous index.
        let owner_rank = |&(index_previous, _, distance): &(usize,usize,u32)| (previous_frame.get_track_id(index_previous).is_some(), Reverse(distance));
        let mut owning_match: Vec<Option<usize>> = vec![None; current_number_of_keypoints];
        for (index_match, m) in matches_prev_current.iter().enumerate() {
            let (index_previous, index_current, _) = *m;
            assert!(index_previous < previous_frame.get_number_of_keypoints(), "GyroTracker: previous index {} out of range", index_previous);
            assert!(index_current < current_number_of_keypoints, "GyroTracker: current index {} out of range", index_current);
            let takes_over = match owning_match[index_current] {
                Some(owner) => owner_rank(m) > owner_rank(&matches_prev_current[owner]),
                None => true
            };
            if takes_over {
                owning_match[index_current] = Some(index_match);
            }
        }

        // Propagate track ids.
        let mut current_track_ids = vec![None; current_number_of_keypoints];
        let mut current_track_lengths = vec![0; current_number_of_keypoints];
        for (index_current, owner) in owning_match.iter().enumerate() {
            if let Some(index_match) = *owner {
                let (index_previous, _, _) = matches_prev_current[index_match];
                current_track_ids[index_current] = previous_frame.get_track_id(index_previous);
                current_track_lengths[index_current] = self.previous_track_lengths[index_previous] + 1;
            }
        }

        let mut admission = BucketAdmission::new(&self.parameters, self.camera.get_width(), self.camera.get_height());
        let mut orphans = Vec::<AdmissionCandidate>::with_capacity(matches_prev_current.len());
        for (index_match, &(_, index_current, _)) in matches_prev_current.iter().enumerate() {
            if owning_match[index_current] != Some(index_match) {
                continue;
            }
            let keypoint = current_frame.get_keypoint_measurement(index_current);
            match current_track_ids[index_current] {
                Some(_) => admission.admit_continuation(index_match, &keypoint),
                None => orphans.push(AdmissionCandidate{index_match, keypoint, score: current_frame.get_keypoint_score(index_current)})
            }
        }
        debug!("GyroTracker: got {} continued tracks", admission.get_statistics().continued);
        admission.admit_orphans(orphans);
        let (admitted, statistics) = admission.into_admitted();
        debug!("GyroTracker: {:?}", statistics);

        // Assign new ids to all admitted matches that do not continue a track.
        for admitted_match in admitted {
            let (index_previous, index_current, _) = matches_prev_current[admitted_match.index_match];
            if current_track_ids[index_current].is_none() {
                let previous_track_ids = previous_frame.get_track_ids_mut();
                assert!(index_previous < previous_track_ids.len(), "GyroTracker: previous index {} out of range", index_previous);
                assert!(previous_track_ids[index_previous].is_none(), "Have a match that supposedly represents a new track but the track id of the previous frame is set, so this would indicate a continued track, and not a new track!");

                let new_track_id = self.allocate_track_id();
                current_track_ids[index_current] = Some(new_track_id);
                previous_track_ids[index_previous] = Some(new_track_id);
                current_track_lengths[index_current] = 2;
            }
        }

        current_frame.swap_track_ids(current_track_ids);
        self.previous_track_lengths = current_track_lengths;
        self.previous_frame = Some(current_frame);
        Some(previous_frame)
    }
}
