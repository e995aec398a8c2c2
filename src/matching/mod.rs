use thiserror::Error;
use crate::Float;

pub mod binary_descriptor;
pub mod non_exclusive;
pub mod exclusive;

/**
 * A scored element of the candidate set that may correspond to a given query element.
 */
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct Candidate {
    pub index_candidate: usize,
    pub score: Float
}

impl Candidate {
    pub fn new(index_candidate: usize, score: Float) -> Candidate {
        Candidate{index_candidate,score}
    }
}

/**
 * Directional correspondence from a query element to a candidate element. Higher scores are better.
 */
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct Match {
    pub index_candidate: usize,
    pub index_query: usize,
    pub score: Float
}

impl Match {
    pub fn new(index_candidate: usize, index_query: usize, score: Float) -> Match {
        Match{index_candidate,index_query,score}
    }
}

#[derive(Debug,Error,Clone,Copy,PartialEq,Eq)]
pub enum MatchingError {
    #[error("setting up the matching problem failed")]
    SetupFailed
}

/**
 * Bipartite correspondence problem between a set of query elements and a set of candidate elements.
 * do_setup is called exactly once by an engine before any candidates are requested.
 */
pub trait MatchingProblem {
    fn do_setup(&mut self) -> bool;
    fn get_number_of_queries(&self) -> usize;
    fn get_candidates_for_query(&self, index_query: usize) -> Vec<Candidate>;
}

pub trait MatchingEngine {
    fn match_problem<P: MatchingProblem + ?Sized>(&self, problem: &mut P) -> Result<Vec<Match>, MatchingError>;
}
