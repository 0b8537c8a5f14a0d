use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rust_decimal::Decimal;

use super::insight_emitter;
use super::milestone_generator::build_milestone_schedule;
use super::progress::ContributionOutcome;
use crate::errors::Result;
use crate::goals::{
    ContributionType, GoalError, GoalMilestone, GoalRepositoryTrait, NewContribution,
};
use crate::matching::TransactionContext;

/// Trait for progress updater operations.
#[async_trait]
pub trait GoalProgressServiceTrait: Send + Sync {
    /// Applies a matcher-selected transaction as a contribution.
    async fn apply_matched_transaction(
        &self,
        goal_id: &str,
        tx: &TransactionContext,
    ) -> Result<ContributionOutcome>;

    /// Records a user-entered contribution. Skips the auto-tracking check.
    async fn add_manual_contribution(
        &self,
        goal_id: &str,
        amount: Decimal,
        source: &str,
        date: DateTime<Utc>,
    ) -> Result<ContributionOutcome>;

    /// Generates the milestone schedule for a goal without milestones.
    async fn generate_milestones(&self, goal_id: &str) -> Result<Vec<GoalMilestone>>;
}

/// Applies contributions to goals and reacts to the new state.
///
/// The contribution row, the `current_amount` increment, the completion
/// flip, and the in-order milestone walk all happen inside one atomic
/// repository operation; this service validates inputs, invokes that
/// operation, and emits insights from its outcome.
pub struct GoalProgressService {
    goal_repository: Arc<dyn GoalRepositoryTrait>,
}

impl GoalProgressService {
    pub fn new(goal_repository: Arc<dyn GoalRepositoryTrait>) -> Self {
        GoalProgressService { goal_repository }
    }

    async fn apply(
        &self,
        goal_id: &str,
        contribution: NewContribution,
    ) -> Result<ContributionOutcome> {
        let outcome = self
            .goal_repository
            .apply_contribution(goal_id, contribution)
            .await?;

        self.emit_insights(&outcome).await;
        Ok(outcome)
    }

    /// Insights are advisory; failures to persist them are logged and
    /// swallowed so they never undo an applied contribution.
    async fn emit_insights(&self, outcome: &ContributionOutcome) {
        let goal = &outcome.goal;

        for threshold in insight_emitter::crossed_thresholds(
            outcome.previous_amount,
            outcome.new_amount,
            goal.target_amount,
        ) {
            let insight = insight_emitter::progress_insight(goal, threshold, outcome.new_amount);
            if let Err(err) = self.goal_repository.insert_insight(insight).await {
                warn!(
                    "Failed to record {}% progress insight for goal {}: {}",
                    threshold, goal.id, err
                );
            }
        }

        for milestone in &outcome.completed_milestones {
            let insight = insight_emitter::milestone_insight(goal, milestone);
            if let Err(err) = self.goal_repository.insert_insight(insight).await {
                warn!(
                    "Failed to record milestone insight for goal {}: {}",
                    goal.id, err
                );
            }
        }

        if outcome.completed_now {
            info!("Goal {} completed", goal.id);
            let insight = insight_emitter::completion_insight(goal);
            if let Err(err) = self.goal_repository.insert_insight(insight).await {
                warn!(
                    "Failed to record completion insight for goal {}: {}",
                    goal.id, err
                );
            }
        }
    }
}

#[async_trait]
impl GoalProgressServiceTrait for GoalProgressService {
    async fn apply_matched_transaction(
        &self,
        goal_id: &str,
        tx: &TransactionContext,
    ) -> Result<ContributionOutcome> {
        if tx.amount <= Decimal::ZERO {
            return Err(GoalError::InvalidContribution(format!(
                "transaction {} has non-positive amount {}",
                tx.id, tx.amount
            ))
            .into());
        }

        let goal = self.goal_repository.get_goal(goal_id)?;
        if !goal.is_auto_tracking {
            return Err(GoalError::AutoTrackingDisabled(goal_id.to_string()).into());
        }

        debug!(
            "Applying transaction {} ({}) to goal {}",
            tx.id, tx.amount, goal_id
        );

        let contribution = NewContribution {
            workspace_id: goal.workspace_id.clone(),
            transaction_id: Some(tx.id.clone()),
            amount: tx.amount,
            contribution_type: ContributionType::Transaction,
            source: tx.description.clone(),
            contribution_date: tx.date,
        };
        self.apply(goal_id, contribution).await
    }

    async fn add_manual_contribution(
        &self,
        goal_id: &str,
        amount: Decimal,
        source: &str,
        date: DateTime<Utc>,
    ) -> Result<ContributionOutcome> {
        if amount <= Decimal::ZERO {
            return Err(GoalError::InvalidContribution(
                "contribution amount must be positive".to_string(),
            )
            .into());
        }

        let goal = self.goal_repository.get_goal(goal_id)?;
        let contribution = NewContribution {
            workspace_id: goal.workspace_id.clone(),
            transaction_id: None,
            amount,
            contribution_type: ContributionType::Manual,
            source: source.to_string(),
            contribution_date: date,
        };
        self.apply(goal_id, contribution).await
    }

    async fn generate_milestones(&self, goal_id: &str) -> Result<Vec<GoalMilestone>> {
        let goal = self.goal_repository.get_goal(goal_id)?;

        let existing = self.goal_repository.list_milestones(goal_id)?;
        if !existing.is_empty() {
            return Err(GoalError::MilestonesExist(goal_id.to_string()).into());
        }

        let schedule = build_milestone_schedule(&goal, Utc::now());
        info!(
            "Generated {} milestones for goal {}",
            schedule.len(),
            goal_id
        );
        self.goal_repository
            .insert_milestones(goal_id, schedule)
            .await
    }
}
