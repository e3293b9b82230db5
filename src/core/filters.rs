use crate::models::{MatchFilters, User};

/// Gender the candidate pool is restricted to for a given subject
///
/// Binary complement rule: male subjects see female candidates and vice
/// versa. Any other subject gender applies no gender filter.
pub fn complement_gender(subject_gender: &str) -> Option<&'static str> {
    match subject_gender {
        "male" => Some("female"),
        "female" => Some("male"),
        _ => None,
    }
}

/// Check a candidate against the subject's gender-complement rule
#[inline]
pub fn passes_gender_rule(subject: &User, candidate: &User) -> bool {
    match complement_gender(&subject.gender) {
        Some(required) => candidate.gender == required,
        None => true,
    }
}

/// Check a candidate against the optional age bounds and city filter
///
/// Age bounds are inclusive. Each filter applies only when provided.
#[inline]
pub fn passes_filters(candidate: &User, filters: &MatchFilters) -> bool {
    if let Some(min_age) = filters.min_age {
        if candidate.age < min_age {
            return false;
        }
    }

    if let Some(max_age) = filters.max_age {
        if candidate.age > max_age {
            return false;
        }
    }

    if let Some(city) = &filters.city {
        if &candidate.city != city {
            return false;
        }
    }

    true
}
