use log::{trace,warn};
use crate::matching::{Candidate,Match,MatchingEngine,MatchingError,MatchingProblem};

/**
 * Picks the best candidate for every query element independently.
 * A candidate may end up matched to several query elements.
 */
#[derive(Debug,Default,Clone,Copy)]
pub struct NonExclusiveMatchingEngine;

impl NonExclusiveMatchingEngine {
    pub fn new() -> NonExclusiveMatchingEngine {
        NonExclusiveMatchingEngine
    }

    // Ties go to the earliest candidate.
    pub fn best_candidate(candidates: &Vec<Candidate>) -> Option<&Candidate> {
        candidates.iter().fold(None, |best: Option<&Candidate>, c| match best {
            Some(b) if b.score >= c.score => Some(b),
            _ => Some(c)
        })
    }
}

impl MatchingEngine for NonExclusiveMatchingEngine {
    fn match_problem<P: MatchingProblem + ?Sized>(&self, problem: &mut P) -> Result<Vec<Match>, MatchingError> {
        if !problem.do_setup() {
            warn!("Setting up the matching problem (do_setup) failed.");
            return Err(MatchingError::SetupFailed);
        }

        let number_of_queries = problem.get_number_of_queries();
        let mut matches = Vec::<Match>::with_capacity(number_of_queries);
        for index_query in 0..number_of_queries {
            let candidates = problem.get_candidates_for_query(index_query);
            if let Some(best) = NonExclusiveMatchingEngine::best_candidate(&candidates) {
                matches.push(Match::new(best.index_candidate, index_query, best.score));
            }
        }

        trace!("Matched {} keypoints.", matches.len());
        Ok(matches)
    }
}
