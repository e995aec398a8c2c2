use std::cmp::Ordering;
use std::collections::HashSet;
use log::{trace,warn};
use crate::matching::{Match,MatchingEngine,MatchingError,MatchingProblem};

/**
 * Greedy one-to-one assignment: all scored pairs are visited from the highest score down and a pair is kept
 * only if neither its query nor its candidate element is taken yet. Equal scores keep query order.
 */
#[derive(Debug,Default,Clone,Copy)]
pub struct ExclusiveMatchingEngine;

impl ExclusiveMatchingEngine {
    pub fn new() -> ExclusiveMatchingEngine {
        ExclusiveMatchingEngine
    }
}

impl MatchingEngine for ExclusiveMatchingEngine {
    fn match_problem<P: MatchingProblem + ?Sized>(&self, problem: &mut P) -> Result<Vec<Match>, MatchingError> {
        if !problem.do_setup() {
            warn!("Setting up the matching problem (do_setup) failed.");
            return Err(MatchingError::SetupFailed);
        }

        let number_of_queries = problem.get_number_of_queries();
        let mut scored_pairs = (0..number_of_queries)
            .map(|index_query| problem.get_candidates_for_query(index_query).into_iter().map(move |c| Match::new(c.index_candidate, index_query, c.score)))
            .flatten()
            .collect::<Vec<Match>>();
        scored_pairs.sort_by(|a,b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        let mut taken_queries = vec![false; number_of_queries];
        let mut taken_candidates = HashSet::<usize>::with_capacity(number_of_queries);
        let mut matches = Vec::<Match>::with_capacity(number_of_queries);
        for m in scored_pairs {
            if taken_queries[m.index_query] || taken_candidates.contains(&m.index_candidate) {
                continue;
            }
            taken_queries[m.index_query] = true;
            taken_candidates.insert(m.index_candidate);
            matches.push(m);
        }
        matches.sort_by_key(|m| m.index_query);

        trace!("Matched {} keypoints exclusively.", matches.len());
        Ok(matches)
    }
}
