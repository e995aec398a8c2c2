extern crate nalgebra as na;
extern crate color_eyre;

use std::collections::HashMap;
use color_eyre::eyre::Result;
use log::{info,warn};
use na::{Isometry3, Point3, Translation3, UnitQuaternion, Rotation3, Vector2, Vector3};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rand_distr::{Distribution, Normal};

use gyro_vision::Float;
use gyro_vision::image::features::geometry::point::Point;
use gyro_vision::numerics::pose::rotation_from_angular_velocity;
use gyro_vision::sensors::camera::{Camera, perspective::Perspective, visual_frame::VisualFrame};
use gyro_vision::sfm::triangulation::{linear_triangulate_from_n_views, TriangulationResult};
use gyro_vision::tracker::{FeatureTracker, TrackId};
use gyro_vision::tracker::gyro_tracker::GyroTracker;
use gyro_vision::tracker::gyro_tracker_parameters::GyroTrackerParameters;

const NUMBER_OF_LANDMARKS: usize = 1500;
const NUMBER_OF_FRAMES: usize = 30;
const DESCRIPTOR_BYTES: usize = 32;
const FRAME_PERIOD_NS: i64 = 33_000_000;

struct Observation {
    frame: usize,
    keypoint: Point<Float>,
    landmark: usize
}

fn flip_bits(descriptor: &Vec<u8>, number_of_bits: usize, rng: &mut SmallRng) -> Vec<u8> {
    let mut noisy = descriptor.clone();
    for _ in 0..number_of_bits {
        let bit = rng.gen_range(0..8*DESCRIPTOR_BYTES);
        noisy[bit / 8] ^= 1 << (bit % 8);
    }
    noisy
}

#[allow(non_snake_case)]
fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let parameters = GyroTrackerParameters::load("config/gyro_tracker.yaml")?;

    let camera = Perspective::new(450.0, 450.0, 320.0, 240.0, 0.0, 640, 480);
    let mut rng = SmallRng::seed_from_u64(42);
    let pixel_noise = Normal::new(0.0, 0.3)?;
    let gyro_noise = Normal::new(0.0, 0.002)?;

    let landmarks = (0..NUMBER_OF_LANDMARKS).map(|_| Vector3::<Float>::new(rng.gen_range(-12.0..12.0), rng.gen_range(-4.0..4.0), rng.gen_range(5.0..15.0))).collect::<Vec<Vector3<Float>>>();
    let landmark_descriptors = (0..NUMBER_OF_LANDMARKS).map(|_| (0..DESCRIPTOR_BYTES).map(|_| rng.gen::<u8>()).collect()).collect::<Vec<Vec<u8>>>();

    // Camera panning with 0.9 rad/s around its y axis while drifting sideways.
    let angular_velocity = Vector3::<Float>::new(0.05, 0.9, -0.02);
    let dt = FRAME_PERIOD_NS as Float * 1e-9;
    let mut T_W_C = Vec::<Isometry3<Float>>::with_capacity(NUMBER_OF_FRAMES);
    T_W_C.push(Isometry3::identity());
    for k in 1..NUMBER_OF_FRAMES {
        let C_prev_current = Rotation3::from_matrix_unchecked(rotation_from_angular_velocity(&angular_velocity, dt));
        let previous = T_W_C[k-1];
        let rotation = previous.rotation*UnitQuaternion::from_rotation_matrix(&C_prev_current);
        T_W_C.push(Isometry3::from_parts(Translation3::new(0.02*k as Float, 0.0, 0.01*k as Float), rotation));
    }

    let mut tracker = GyroTracker::with_parameters(camera, parameters);
    info!("tracker parameters: {}", tracker.get_parameters());
    let mut finalized = Vec::<VisualFrame>::with_capacity(NUMBER_OF_FRAMES);
    let mut landmarks_per_frame = Vec::<Vec<usize>>::with_capacity(NUMBER_OF_FRAMES);

    for (k, pose) in T_W_C.iter().enumerate() {
        let mut keypoints = Vec::<Point<Float>>::new();
        let mut descriptors = Vec::<Vec<u8>>::new();
        let mut visible = Vec::<usize>::new();
        for (l, landmark) in landmarks.iter().enumerate() {
            let C_p = pose.inverse_transform_point(&Point3::from(*landmark)).coords;
            if let Some(p) = tracker.get_camera().project(&C_p) {
                let noisy = Point::new(p.x + pixel_noise.sample(&mut rng), p.y + pixel_noise.sample(&mut rng));
                if tracker.get_camera().is_within_image(&noisy) {
                    keypoints.push(noisy);
                    descriptors.push(flip_bits(&landmark_descriptors[l], 6, &mut rng));
                    visible.push(l);
                }
            }
        }
        let scores = (0..keypoints.len()).map(|_| rng.gen_range(10.0..300.0)).collect::<Vec<Float>>();
        let frame = VisualFrame::from_keypoints(k as i64*FRAME_PERIOD_NS, &keypoints, scores, &descriptors);

        // Rate gyro measurement integrated over one frame period.
        let measured_velocity = angular_velocity + Vector3::new(gyro_noise.sample(&mut rng), gyro_noise.sample(&mut rng), gyro_noise.sample(&mut rng));
        let C_current_prev = rotation_from_angular_velocity(&measured_velocity, dt).transpose();

        if let Some(released) = tracker.add_frame(frame, &C_current_prev) {
            finalized.push(released);
        }
        landmarks_per_frame.push(visible);
        info!("frame {}: {} keypoints, {} tracks so far", k, keypoints.len(), tracker.get_number_of_tracks_created());
    }
    if let Some(last) = tracker.into_last_frame() {
        finalized.push(last);
    }

    let mut tracks = HashMap::<TrackId, Vec<Observation>>::new();
    for (k, frame) in finalized.iter().enumerate() {
        for (i, track_id) in frame.get_track_ids().iter().enumerate() {
            if let Some(track_id) = track_id {
                tracks.entry(*track_id).or_insert_with(Vec::new).push(Observation{frame: k, keypoint: frame.get_keypoint_as_point(i), landmark: landmarks_per_frame[k][i]});
            }
        }
    }

    let mut number_of_inconsistent_tracks = 0;
    let mut errors = Vec::<Float>::with_capacity(tracks.len());
    for (track_id, observations) in tracks.iter().filter(|(_, o)| o.len() >= 3) {
        let landmark = observations[0].landmark;
        if observations.iter().any(|o| o.landmark != landmark) {
            number_of_inconsistent_tracks += 1;
            continue;
        }
        let measurements = observations.iter().map(|o| camera.normalize(&o.keypoint)).collect::<Vec<Vector2<Float>>>();
        let T_G_B = observations.iter().map(|o| T_W_C[o.frame]).collect::<Vec<Isometry3<Float>>>();
        match linear_triangulate_from_n_views(&measurements, &T_G_B, &Isometry3::identity()) {
            TriangulationResult::Successful(G_p) => errors.push((G_p - landmarks[landmark]).norm()),
            result => warn!("track {}: {}", track_id, result)
        }
    }

    errors.sort_by(|a,b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    info!("{} tracks, {} with at least 3 observations, {} mixing landmarks", tracks.len(), tracks.values().filter(|o| o.len() >= 3).count(), number_of_inconsistent_tracks);
    match errors.get(errors.len()/2) {
        Some(median) => info!("triangulated {} landmarks, median error {:.3} m", errors.len(), median),
        None => warn!("no landmark could be triangulated")
    }

    Ok(())
}
