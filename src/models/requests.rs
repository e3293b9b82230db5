use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::domain::{MatchFilters, NewUser, UserPatch};

pub const ALLOWED_GENDERS: [&str; 3] = ["male", "female", "other"];

/// Gender must be male, female, or other (case-insensitive)
fn validate_gender(value: &str) -> Result<(), ValidationError> {
    if ALLOWED_GENDERS.contains(&value.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("gender");
        err.message = Some("Gender must be male, female, or other".into());
        Err(err)
    }
}

/// Interest names are stored trimmed and lowercased
pub fn normalize_interest(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Request to create a user
///
/// Body of POST /users
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 18, max = 99))]
    pub age: i64,
    #[validate(custom(function = validate_gender))]
    pub gender: String,
    #[validate(email)]
    pub email: String,
    pub city: String,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl CreateUserRequest {
    /// Normalized row fields plus the interest names to resolve
    pub fn into_parts(self) -> (NewUser, Vec<String>) {
        let interests = self.interests.iter().map(|n| normalize_interest(n)).collect();
        let new_user = NewUser {
            name: self.name,
            age: self.age,
            gender: self.gender.to_lowercase(),
            email: self.email,
            city: self.city,
        };
        (new_user, interests)
    }
}

/// Partial update request
///
/// Body of PUT /users/{id}. Absent and null fields are both skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(range(min = 18, max = 99))]
    pub age: Option<i64>,
    #[validate(custom(function = validate_gender))]
    pub gender: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub city: Option<String>,
    pub interests: Option<Vec<String>>,
}

impl UpdateUserRequest {
    pub fn into_patch(self) -> UserPatch {
        UserPatch {
            name: self.name,
            age: self.age,
            gender: self.gender.map(|g| g.to_lowercase()),
            email: self.email,
            city: self.city,
            interests: self
                .interests
                .map(|names| names.iter().map(|n| normalize_interest(n)).collect()),
        }
    }
}

/// Query parameters for GET /users
#[derive(Debug, Clone, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub offset: i64,
    pub limit: Option<i64>,
}

/// Query parameters for GET /users/{id}/matches
#[derive(Debug, Clone, Deserialize)]
pub struct MatchQuery {
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub city: Option<String>,
    #[serde(default = "default_interest_match")]
    pub interest_match: bool,
}

fn default_interest_match() -> bool {
    true
}

impl MatchQuery {
    pub fn into_filters(self) -> MatchFilters {
        MatchFilters {
            min_age: self.min_age,
            max_age: self.max_age,
            city: self.city,
            interest_match: self.interest_match,
        }
    }
}
