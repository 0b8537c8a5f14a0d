//! Goals module - domain models, services, and traits.

mod goals_errors;
mod goals_model;
mod goals_service;
mod goals_traits;


pub use goals_errors::GoalError;
pub use goals_model::{
    ContributionType, Goal, GoalContribution, GoalInsight, GoalMilestone, GoalPriority,
    GoalStatus, GoalType, GoalUpdate, InsightSeverity, InsightType, NewContribution, NewGoal,
    NewInsight, NewMilestone,
};
pub use goals_service::GoalService;
pub use goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
