use std::{fmt,fs,path::Path};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use crate::Float;

#[derive(Debug,Error)]
pub enum ParameterError {
    #[error("could not read tracker parameters: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse tracker parameters: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid tracker parameters: {0}")]
    Invalid(String)
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct GyroTrackerParameters {
    pub number_of_tracking_buckets: usize,
    pub number_of_keypoints_use_unconditional: usize,
    pub number_of_keypoints_use_strong: usize,
    pub keypoint_score_threshold_unconditional: Float,
    pub keypoint_score_threshold_strong: Float,
    pub min_search_radius: Float,
    pub search_radius: Float,
    pub matching_threshold_bits: u32,
    pub max_descriptor_bits: usize
}

impl Default for GyroTrackerParameters {
    fn default() -> Self {
        GyroTrackerParameters {
            number_of_tracking_buckets: 4,
            number_of_keypoints_use_unconditional: 100,
            number_of_keypoints_use_strong: 400,
            keypoint_score_threshold_unconditional: 100.0,
            keypoint_score_threshold_strong: 20.0,
            min_search_radius: 5.0,
            search_radius: 10.0,
            matching_threshold_bits: 120,
            max_descriptor_bits: 512
        }
    }
}

impl GyroTrackerParameters {
    pub fn from_yaml_str(yaml: &str) -> Result<GyroTrackerParameters, ParameterError> {
        let parameters: GyroTrackerParameters = serde_yaml::from_str(yaml)?;
        parameters.validate()?;
        Ok(parameters)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<GyroTrackerParameters, ParameterError> {
        let yaml = fs::read_to_string(path)?;
        GyroTrackerParameters::from_yaml_str(&yaml)
    }

    pub fn to_yaml_string(&self) -> Result<String, ParameterError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        match self {
            p if p.number_of_tracking_buckets == 0 => Err(ParameterError::Invalid("number_of_tracking_buckets must be positive".to_string())),
            p if p.min_search_radius <= 0.0 || p.search_radius < p.min_search_radius => Err(ParameterError::Invalid(format!("search radii must satisfy 0 < {} <= {}", p.min_search_radius, p.search_radius))),
            p if p.keypoint_score_threshold_strong > p.keypoint_score_threshold_unconditional => Err(ParameterError::Invalid("the strong score threshold must not exceed the unconditional one".to_string())),
            p if p.matching_threshold_bits as usize > p.max_descriptor_bits => Err(ParameterError::Invalid("matching_threshold_bits exceeds max_descriptor_bits".to_string())),
            _ => Ok(())
        }
    }

    pub fn get_number_of_buckets(&self) -> usize {
        self.number_of_tracking_buckets*self.number_of_tracking_buckets
    }

    pub fn get_strong_quota_per_bucket(&self) -> usize {
        self.number_of_keypoints_use_strong / self.get_number_of_buckets()
    }
}

impl fmt::Display for GyroTrackerParameters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "buckets_{}_u_{}_s_{}_tu_{}_ts_{}_r_{}_{}_bits_{}",
            self.number_of_tracking_buckets,
            self.number_of_keypoints_use_unconditional,
            self.number_of_keypoints_use_strong,
            self.keypoint_score_threshold_unconditional,
            self.keypoint_score_threshold_strong,
            self.min_search_radius,
            self.search_radius,
            self.matching_threshold_bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parameters = GyroTrackerParameters::from_yaml_str("number_of_tracking_buckets: 2\nsearch_radius: 12.0\n").expect("valid yaml");
        assert_eq!(parameters.number_of_tracking_buckets, 2);
        assert_eq!(parameters.search_radius, 12.0);
        assert_eq!(parameters.number_of_keypoints_use_strong, 400);
        assert_eq!(parameters.get_strong_quota_per_bucket(), 100);
    }

    #[test]
    fn yaml_round_trip_keeps_values() {
        let parameters = GyroTrackerParameters { number_of_keypoints_use_unconditional: 7, ..Default::default() };
        let yaml = parameters.to_yaml_string().expect("serializable");
        assert_eq!(GyroTrackerParameters::from_yaml_str(&yaml).expect("valid yaml"), parameters);
    }

    #[test]
    fn inconsistent_radii_are_rejected() {
        let result = GyroTrackerParameters::from_yaml_str("min_search_radius: 15.0\nsearch_radius: 10.0\n");
        assert!(matches!(result, Err(ParameterError::Invalid(_))));
    }

    #[test]
    fn default_quota_splits_strong_budget_over_grid() {
        let parameters = GyroTrackerParameters::default();
        assert_eq!(parameters.get_number_of_buckets(), 16);
        assert_eq!(parameters.get_strong_quota_per_bucket(), 25);
    }
}
