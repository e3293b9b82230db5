use std::collections::HashSet;

use crate::models::User;

/// Match score: number of interest ids present in both the subject's and the
/// candidate's interest sets
pub fn shared_interest_count(subject_interest_ids: &HashSet<i64>, candidate: &User) -> usize {
    candidate
        .interests
        .iter()
        .filter(|interest| subject_interest_ids.contains(&interest.id))
        .count()
}
