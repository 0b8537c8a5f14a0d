//! Goal analytics - velocity, health scoring, and advisory recommendations.

mod analytics_model;
mod analytics_service;


pub use analytics_model::{
    GoalAnalytics, GoalRecommendation, GoalSuggestion, RecommendationType, RiskLevel,
    WorkspaceFinancials,
};
pub use analytics_service::{
    GoalAnalyticsService, GoalAnalyticsServiceTrait, WorkspaceFinancialsProviderTrait,
};
