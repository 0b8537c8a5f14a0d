//! Goal storage - database models and repository.

pub mod model;
pub mod repository;

pub use model::{
    GoalContributionDB, GoalDB, GoalInsightDB, GoalMatchAuditDB, GoalMilestoneDB,
};
pub use repository::GoalRepository;
