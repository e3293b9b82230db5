use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A normalized, deduplicated interest tag shared across users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interest {
    pub id: i64,
    pub name: String,
}

/// A registered user profile with its interests populated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub email: String,
    pub city: String,
    #[serde(default)]
    pub interests: Vec<Interest>,
}

impl User {
    /// The set of interest ids, used for overlap scoring
    pub fn interest_ids(&self) -> HashSet<i64> {
        self.interests.iter().map(|i| i.id).collect()
    }
}

/// Fields for a new user row, already validated and normalized
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub email: String,
    pub city: String,
}

/// Partial update applied to an existing user
///
/// `None` means "leave the stored value untouched". Interests, when present,
/// replace the full association set.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub interests: Option<Vec<String>>,
}

/// Filters applied to the candidate pool before ranking
#[derive(Debug, Clone)]
pub struct MatchFilters {
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub city: Option<String>,
    pub interest_match: bool,
}

impl Default for MatchFilters {
    fn default() -> Self {
        Self {
            min_age: None,
            max_age: None,
            city: None,
            interest_match: true,
        }
    }
}
