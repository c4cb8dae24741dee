//! Candidate selection
//!
//! The cheapest candidate is the one reading from the table with the fewest
//! fields the request does not use. This is a proxy for table width, not a
//! cost model. Ties go to the candidate the producer emitted first.

use super::candidate::{Candidate, CandidateSet};
use super::errors::{PlannerError, PlannerResult};

/// Picks the candidate with the minimum unmatched field count.
///
/// Deterministic: the set is never re-sorted, and `min_by_key` keeps the
/// first of several equal minimums.
pub fn select_best(set: &CandidateSet) -> PlannerResult<&Candidate> {
    set.iter()
        .min_by_key(|candidate| candidate.unmatched_field_count)
        .ok_or(PlannerError::NoViableQuery)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_fewest_unmatched_fields() {
        let set = CandidateSet::new()
            .with_candidate("a", "A", 2)
            .with_candidate("b", "B", 0)
            .with_candidate("c", "C", 1);

        assert_eq!(select_best(&set).unwrap().sql, "B");
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let set = CandidateSet::new()
            .with_candidate("wide", "W", 4)
            .with_candidate("first", "F", 1)
            .with_candidate("second", "S", 1)
            .with_candidate("third", "T", 1);

        assert_eq!(select_best(&set).unwrap().table, "first");
    }

    #[test]
    fn test_single_candidate() {
        let set = CandidateSet::new().with_candidate("only", "O", 9);
        assert_eq!(select_best(&set).unwrap().sql, "O");
    }

    #[test]
    fn test_empty_set_has_no_viable_query() {
        let set = CandidateSet::new();
        assert_eq!(select_best(&set).unwrap_err(), PlannerError::NoViableQuery);
    }

    #[test]
    fn test_matches_linear_scan_for_many_orders() {
        // Every rotation picks the first minimum.
        let counts = [3u32, 1, 4, 1, 5, 0, 2, 0];
        for start in 0..counts.len() {
            let rotated: Vec<u32> = counts[start..]
                .iter()
                .chain(&counts[..start])
                .copied()
                .collect();
            let set: CandidateSet = rotated
                .iter()
                .enumerate()
                .map(|(i, n)| Candidate::new(format!("t{}", i), format!("q{}", i), *n))
                .collect();

            let min = *rotated.iter().min().unwrap();
            let first = rotated.iter().position(|n| *n == min).unwrap();
            assert_eq!(select_best(&set).unwrap().table, format!("t{}", first));
        }
    }
}
