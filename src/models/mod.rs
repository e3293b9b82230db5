// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Interest, MatchFilters, NewUser, User, UserPatch};
pub use requests::{CreateUserRequest, ListUsersQuery, MatchQuery, UpdateUserRequest};
pub use responses::{ErrorResponse, HealthResponse, MatchResponse, WelcomeResponse};
