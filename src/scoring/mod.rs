pub mod company;
pub mod config;
pub mod engine;
pub mod matcher;
pub mod reason;
pub mod role;
pub mod validation;

pub use company::score_company;
pub use config::*;
pub use engine::{classify, classify_with_title, ScoringResult, DISQUALIFIED};
pub use matcher::MatchMode;
pub use reason::{Reason, RejectionCategory};
pub use role::score_role;
pub use validation::validate_filter_config;
