use crate::matching::{Candidate,MatchingProblem};
use crate::sensors::camera::visual_frame::VisualFrame;
use crate::Float;

pub fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    assert_eq!(a.len(), b.len(), "hamming_distance: descriptors differ in length");
    a.iter().zip(b.iter()).map(|(x,y)| (x ^ y).count_ones()).sum()
}

/**
 * Brute force matching of binary descriptors. Every candidate closer than matching_threshold_bits is reported
 * with score = descriptor bits - hamming distance.
 */
pub struct BinaryDescriptorProblem<'a> {
    query_descriptors: Vec<&'a [u8]>,
    candidate_descriptors: Vec<&'a [u8]>,
    matching_threshold_bits: u32,
    descriptor_bits: u32
}

impl<'a> BinaryDescriptorProblem<'a> {
    pub fn new(query_descriptors: Vec<&'a [u8]>, candidate_descriptors: Vec<&'a [u8]>, matching_threshold_bits: u32) -> BinaryDescriptorProblem<'a> {
        BinaryDescriptorProblem{query_descriptors, candidate_descriptors, matching_threshold_bits, descriptor_bits: 0}
    }

    pub fn from_frames(query_frame: &'a VisualFrame, candidate_frame: &'a VisualFrame, matching_threshold_bits: u32) -> BinaryDescriptorProblem<'a> {
        let query_descriptors = (0..query_frame.get_number_of_descriptors()).map(|i| query_frame.get_descriptor(i)).collect();
        let candidate_descriptors = (0..candidate_frame.get_number_of_descriptors()).map(|i| candidate_frame.get_descriptor(i)).collect();
        BinaryDescriptorProblem::new(query_descriptors, candidate_descriptors, matching_threshold_bits)
    }

    pub fn get_descriptor_bits(&self) -> u32 {
        self.descriptor_bits
    }
}

impl<'a> MatchingProblem for BinaryDescriptorProblem<'a> {

    // All descriptors on both sides have to share one non-zero length.
    fn do_setup(&mut self) -> bool {
        let size_bytes = match self.query_descriptors.first().or(self.candidate_descriptors.first()) {
            Some(d) => d.len(),
            None => return true
        };
        let consistent = size_bytes > 0 && self.query_descriptors.iter().chain(self.candidate_descriptors.iter()).all(|d| d.len() == size_bytes);
        if consistent {
            self.descriptor_bits = 8*size_bytes as u32;
        }
        consistent
    }

    fn get_number_of_queries(&self) -> usize {
        self.query_descriptors.len()
    }

    fn get_candidates_for_query(&self, index_query: usize) -> Vec<Candidate> {
        let query = self.query_descriptors[index_query];
        let query_bits = 8*query.len() as u32;
        self.candidate_descriptors.iter().enumerate()
            .map(|(index_candidate, candidate)| (index_candidate, hamming_distance(query, candidate)))
            .filter(|&(_, distance)| distance < self.matching_threshold_bits)
            .map(|(index_candidate, distance)| Candidate::new(index_candidate, (query_bits - distance) as Float))
            .collect()
    }
}
