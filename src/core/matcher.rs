use crate::core::{
    filters::{passes_filters, passes_gender_rule},
    scoring::shared_interest_count,
};
use crate::models::{MatchFilters, User};

/// Result of the matching process
#[derive(Debug)]
pub struct MatchOutcome {
    pub matches: Vec<User>,
    pub match_count: usize,
}

/// Find matches for a subject from a materialized candidate pool
///
/// # Pipeline stages
/// 1. Drop the subject itself
/// 2. Gender-complement rule
/// 3. Optional age bounds (inclusive) and exact city filter
/// 4. Interest-overlap ranking, when enabled and the subject has interests
///
/// Scored candidates sort by shared-interest count descending, ties broken by
/// ascending user id so the ordering is deterministic. When interest matching
/// is off, or the subject has no interests, the pool is returned unscored in
/// query order.
pub fn find_matches(subject: &User, candidates: Vec<User>, filters: &MatchFilters) -> MatchOutcome {
    let pool: Vec<User> = candidates
        .into_iter()
        .filter(|candidate| candidate.id != subject.id)
        .filter(|candidate| passes_gender_rule(subject, candidate))
        .filter(|candidate| passes_filters(candidate, filters))
        .collect();

    let matches = if filters.interest_match && !subject.interests.is_empty() {
        let subject_ids = subject.interest_ids();

        let mut scored: Vec<(usize, User)> = pool
            .into_iter()
            .map(|candidate| (shared_interest_count(&subject_ids, &candidate), candidate))
            .collect();

        scored.sort_by(|(score_a, a), (score_b, b)| {
            score_b.cmp(score_a).then_with(|| a.id.cmp(&b.id))
        });

        scored.into_iter().map(|(_, candidate)| candidate).collect()
    } else {
        pool
    };

    MatchOutcome {
        match_count: matches.len(),
        matches,
    }
}
