use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::goals::goals_model::{
    Goal, GoalContribution, GoalInsight, GoalMilestone, GoalUpdate, NewContribution, NewGoal,
    NewInsight, NewMilestone,
};
use crate::matching::{GoalMatchAudit, NewMatchAudit};
use crate::tracking::ContributionOutcome;

/// Trait for goal store operations.
///
/// Reads run against the connection pool; writes go through the storage
/// layer's single-writer actor, which is what gives `apply_contribution`
/// its atomicity and per-goal serialization guarantees.
#[async_trait]
pub trait GoalRepositoryTrait: Send + Sync {
    fn get_goal(&self, goal_id: &str) -> Result<Goal>;
    fn list_goals(&self, workspace_id: &str) -> Result<Vec<Goal>>;
    /// Goals eligible for the matcher: `is_auto_tracking` and `active`.
    fn list_auto_tracking_goals(&self, workspace_id: &str) -> Result<Vec<Goal>>;
    async fn insert_goal(&self, new_goal: NewGoal) -> Result<Goal>;
    async fn update_goal(&self, update: GoalUpdate) -> Result<Goal>;
    async fn delete_goal(&self, goal_id: &str) -> Result<usize>;

    fn list_contributions(&self, goal_id: &str) -> Result<Vec<GoalContribution>>;
    fn list_contributions_since(
        &self,
        goal_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<GoalContribution>>;

    /// Atomically records a contribution: inserts the contribution row,
    /// advances the goal's `current_amount`, flips completion when the
    /// target is reached, and completes milestones strictly in order.
    /// Either everything lands or nothing does. A duplicate
    /// `(goal_id, transaction_id)` pair fails with
    /// [`crate::goals::GoalError::DuplicateContribution`] without mutating
    /// anything.
    async fn apply_contribution(
        &self,
        goal_id: &str,
        contribution: NewContribution,
    ) -> Result<ContributionOutcome>;

    /// Milestones ordered by `order_index` ascending.
    fn list_milestones(&self, goal_id: &str) -> Result<Vec<GoalMilestone>>;
    async fn insert_milestones(
        &self,
        goal_id: &str,
        milestones: Vec<NewMilestone>,
    ) -> Result<Vec<GoalMilestone>>;

    fn list_insights(&self, workspace_id: &str, unread_only: bool) -> Result<Vec<GoalInsight>>;
    async fn insert_insight(&self, insight: NewInsight) -> Result<GoalInsight>;
    async fn mark_insight_read(&self, insight_id: &str) -> Result<GoalInsight>;

    async fn insert_match_audit(&self, audit: NewMatchAudit) -> Result<GoalMatchAudit>;
    fn list_match_audits(&self, workspace_id: &str) -> Result<Vec<GoalMatchAudit>>;
}

/// Trait for goal CRUD service operations.
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    fn get_goal(&self, goal_id: &str) -> Result<Goal>;
    fn list_goals(&self, workspace_id: &str) -> Result<Vec<Goal>>;
    /// Creates a goal, optionally generating its milestone schedule.
    async fn create_goal(&self, new_goal: NewGoal, auto_milestones: bool) -> Result<Goal>;
    async fn update_goal(&self, update: GoalUpdate) -> Result<Goal>;
    async fn delete_goal(&self, goal_id: &str) -> Result<usize>;
    fn list_milestones(&self, goal_id: &str) -> Result<Vec<GoalMilestone>>;
    fn list_contributions(&self, goal_id: &str) -> Result<Vec<GoalContribution>>;
    fn list_insights(&self, workspace_id: &str, unread_only: bool) -> Result<Vec<GoalInsight>>;
    async fn mark_insight_read(&self, insight_id: &str) -> Result<GoalInsight>;
}
