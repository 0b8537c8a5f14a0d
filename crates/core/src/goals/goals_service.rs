use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use rust_decimal::Decimal;

use super::goals_errors::GoalError;
use super::goals_model::{
    Goal, GoalContribution, GoalInsight, GoalMilestone, GoalUpdate, NewGoal,
};
use super::goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
use crate::errors::Result;
use crate::tracking::build_milestone_schedule;

pub struct GoalService {
    goal_repository: Arc<dyn GoalRepositoryTrait>,
}

impl GoalService {
    pub fn new(goal_repository: Arc<dyn GoalRepositoryTrait>) -> Self {
        GoalService { goal_repository }
    }

    fn validate_new_goal(new_goal: &NewGoal) -> Result<()> {
        if new_goal.name.trim().is_empty() {
            return Err(GoalError::InvalidGoal("name must not be empty".to_string()).into());
        }
        if new_goal.target_amount <= Decimal::ZERO {
            return Err(GoalError::InvalidGoal("target amount must be positive".to_string()).into());
        }
        if new_goal.current_amount < Decimal::ZERO {
            return Err(
                GoalError::InvalidGoal("current amount must not be negative".to_string()).into(),
            );
        }
        Ok(())
    }
}

#[async_trait]
impl GoalServiceTrait for GoalService {
    fn get_goal(&self, goal_id: &str) -> Result<Goal> {
        self.goal_repository.get_goal(goal_id)
    }

    fn list_goals(&self, workspace_id: &str) -> Result<Vec<Goal>> {
        self.goal_repository.list_goals(workspace_id)
    }

    async fn create_goal(&self, new_goal: NewGoal, auto_milestones: bool) -> Result<Goal> {
        Self::validate_new_goal(&new_goal)?;

        let goal = self.goal_repository.insert_goal(new_goal).await?;
        info!("Created goal {} ({})", goal.id, goal.name);

        if auto_milestones {
            let schedule = build_milestone_schedule(&goal, Utc::now());
            debug!(
                "Generating {} milestones for new goal {}",
                schedule.len(),
                goal.id
            );
            self.goal_repository
                .insert_milestones(&goal.id, schedule)
                .await?;
        }

        Ok(goal)
    }

    async fn update_goal(&self, update: GoalUpdate) -> Result<Goal> {
        if let Some(target) = update.target_amount {
            if target <= Decimal::ZERO {
                return Err(
                    GoalError::InvalidGoal("target amount must be positive".to_string()).into(),
                );
            }
        }
        self.goal_repository.update_goal(update).await
    }

    async fn delete_goal(&self, goal_id: &str) -> Result<usize> {
        self.goal_repository.delete_goal(goal_id).await
    }

    fn list_milestones(&self, goal_id: &str) -> Result<Vec<GoalMilestone>> {
        self.goal_repository.list_milestones(goal_id)
    }

    fn list_contributions(&self, goal_id: &str) -> Result<Vec<GoalContribution>> {
        self.goal_repository.list_contributions(goal_id)
    }

    fn list_insights(&self, workspace_id: &str, unread_only: bool) -> Result<Vec<GoalInsight>> {
        self.goal_repository.list_insights(workspace_id, unread_only)
    }

    async fn mark_insight_read(&self, insight_id: &str) -> Result<GoalInsight> {
        self.goal_repository.mark_insight_read(insight_id).await
    }
}
