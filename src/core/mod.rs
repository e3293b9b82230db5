// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod scoring;

pub use filters::{complement_gender, passes_filters, passes_gender_rule};
pub use matcher::{find_matches, MatchOutcome};
pub use scoring::shared_interest_count;
