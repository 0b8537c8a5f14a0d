use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;

use fintrack_core::errors::{DatabaseError, Error, Result};
use fintrack_core::goals::{
    Goal, GoalContribution, GoalError, GoalInsight, GoalMilestone, GoalRepositoryTrait,
    GoalStatus, GoalUpdate, NewContribution, NewGoal, NewInsight, NewMilestone,
};
use fintrack_core::matching::{GoalMatchAudit, NewMatchAudit};
use fintrack_core::tracking::{plan_progress, ContributionOutcome};

use super::model::{
    GoalContributionDB, GoalDB, GoalInsightDB, GoalMatchAuditDB, GoalMilestoneDB,
};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{goal_contributions, goal_insights, goal_match_audits, goal_milestones, goals};

pub struct GoalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl GoalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        GoalRepository { pool, writer }
    }

    fn load_goal(conn: &mut SqliteConnection, goal_id: &str) -> Result<Goal> {
        let goal_db = goals::table
            .find(goal_id)
            .first::<GoalDB>(conn)
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(goal_id.to_string())))?;
        Ok(Goal::from(goal_db))
    }

    fn load_milestones(conn: &mut SqliteConnection, for_goal_id: &str) -> Result<Vec<GoalMilestone>> {
        let rows = goal_milestones::table
            .filter(goal_milestones::goal_id.eq(for_goal_id))
            .order(goal_milestones::order_index.asc())
            .load::<GoalMilestoneDB>(conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(GoalMilestone::from).collect())
    }
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    fn get_goal(&self, goal_id: &str) -> Result<Goal> {
        let mut conn = get_connection(&self.pool)?;
        Self::load_goal(&mut conn, goal_id)
    }

    fn list_goals(&self, for_workspace_id: &str) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goals::table
            .filter(goals::workspace_id.eq(for_workspace_id))
            .order(goals::created_at.asc())
            .load::<GoalDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Goal::from).collect())
    }

    fn list_auto_tracking_goals(&self, for_workspace_id: &str) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goals::table
            .filter(goals::workspace_id.eq(for_workspace_id))
            .filter(goals::is_auto_tracking.eq(true))
            .filter(goals::status.eq(GoalStatus::Active.as_str()))
            .order(goals::id.asc())
            .load::<GoalDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Goal::from).collect())
    }

    async fn insert_goal(&self, new_goal: NewGoal) -> Result<Goal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let goal_db = GoalDB::from(new_goal);
                let result_db = diesel::insert_into(goals::table)
                    .values(&goal_db)
                    .returning(GoalDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Goal::from(result_db))
            })
            .await
    }

    async fn update_goal(&self, update: GoalUpdate) -> Result<Goal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let mut goal = Self::load_goal(conn, &update.id)?;

                if let Some(name) = update.name {
                    goal.name = name;
                }
                if let Some(description) = update.description {
                    goal.description = Some(description);
                }
                if let Some(target_amount) = update.target_amount {
                    goal.target_amount = target_amount;
                }
                if let Some(target_date) = update.target_date {
                    goal.target_date = target_date;
                }
                if let Some(linked_account_id) = update.linked_account_id {
                    goal.linked_account_id = Some(linked_account_id);
                }
                if let Some(linked_debt_id) = update.linked_debt_id {
                    goal.linked_debt_id = Some(linked_debt_id);
                }
                if let Some(is_auto_tracking) = update.is_auto_tracking {
                    goal.is_auto_tracking = is_auto_tracking;
                }
                if let Some(monthly_contribution) = update.monthly_contribution {
                    goal.monthly_contribution = Some(monthly_contribution);
                }
                if let Some(priority) = update.priority {
                    goal.priority = priority;
                }
                if let Some(status) = update.status {
                    goal.status = status;
                }
                goal.updated_at = Utc::now();

                let goal_db = GoalDB::from(&goal);
                diesel::update(goals::table.find(&goal.id))
                    .set(&goal_db)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(goal)
            })
            .await
    }

    async fn delete_goal(&self, goal_id: &str) -> Result<usize> {
        let goal_id = goal_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(goals::table.find(goal_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    fn list_contributions(&self, for_goal_id: &str) -> Result<Vec<GoalContribution>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goal_contributions::table
            .filter(goal_contributions::goal_id.eq(for_goal_id))
            .order(goal_contributions::contribution_date.asc())
            .load::<GoalContributionDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(GoalContribution::from).collect())
    }

    fn list_contributions_since(
        &self,
        for_goal_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<GoalContribution>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goal_contributions::table
            .filter(goal_contributions::goal_id.eq(for_goal_id))
            .filter(goal_contributions::contribution_date.ge(since.to_rfc3339()))
            .order(goal_contributions::contribution_date.asc())
            .load::<GoalContributionDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(GoalContribution::from).collect())
    }

    /// Records a contribution and advances the goal in one transaction:
    /// duplicate check, goal and milestone reads, the contribution insert,
    /// the amount/status update, and the in-order milestone completion all
    /// see the same committed state. The writer actor serializes these
    /// jobs, so two near-simultaneous contributions to one goal are
    /// applied back to back and neither is lost.
    async fn apply_contribution(
        &self,
        goal_id: &str,
        contribution: NewContribution,
    ) -> Result<ContributionOutcome> {
        let goal_id = goal_id.to_string();
        self.writer
            .exec(
                move |conn: &mut SqliteConnection| -> Result<ContributionOutcome> {
                    if let Some(txn_id) = &contribution.transaction_id {
                        let existing: i64 = goal_contributions::table
                            .filter(goal_contributions::goal_id.eq(&goal_id))
                            .filter(goal_contributions::transaction_id.eq(txn_id))
                            .count()
                            .get_result(conn)
                            .map_err(StorageError::from)?;
                        if existing > 0 {
                            return Err(GoalError::DuplicateContribution {
                                goal_id: goal_id.clone(),
                                transaction_id: txn_id.clone(),
                            }
                            .into());
                        }
                    }

                    let goal = Self::load_goal(conn, &goal_id)?;
                    let milestones = Self::load_milestones(conn, &goal_id)?;

                    let now = Utc::now();
                    let plan = plan_progress(&goal, &milestones, contribution.amount);

                    let contribution_db = GoalContributionDB::from_new(&goal_id, contribution);
                    let inserted = diesel::insert_into(goal_contributions::table)
                        .values(&contribution_db)
                        .returning(GoalContributionDB::as_returning())
                        .get_result(conn)
                        .map_err(StorageError::from)?;

                    let previous_amount = goal.current_amount;
                    let mut updated = goal;
                    updated.current_amount = plan.new_amount;
                    updated.updated_at = now;
                    if plan.completes_goal {
                        updated.status = GoalStatus::Completed;
                        updated.completed_at = Some(now);
                    }
                    let goal_db = GoalDB::from(&updated);
                    diesel::update(goals::table.find(&updated.id))
                        .set(&goal_db)
                        .execute(conn)
                        .map_err(StorageError::from)?;

                    let mut completed_milestones = Vec::new();
                    for milestone in milestones {
                        if plan.milestone_ids_to_complete.contains(&milestone.id) {
                            diesel::update(goal_milestones::table.find(&milestone.id))
                                .set((
                                    goal_milestones::is_completed.eq(true),
                                    goal_milestones::completed_at.eq(now.to_rfc3339()),
                                ))
                                .execute(conn)
                                .map_err(StorageError::from)?;
                            let mut completed = milestone;
                            completed.is_completed = true;
                            completed.completed_at = Some(now);
                            completed_milestones.push(completed);
                        }
                    }

                    Ok(ContributionOutcome {
                        goal: updated,
                        contribution: GoalContribution::from(inserted),
                        previous_amount,
                        new_amount: plan.new_amount,
                        completed_now: plan.completes_goal,
                        completed_milestones,
                    })
                },
            )
            .await
    }

    fn list_milestones(&self, for_goal_id: &str) -> Result<Vec<GoalMilestone>> {
        let mut conn = get_connection(&self.pool)?;
        Self::load_milestones(&mut conn, for_goal_id)
    }

    async fn insert_milestones(
        &self,
        goal_id: &str,
        milestones: Vec<NewMilestone>,
    ) -> Result<Vec<GoalMilestone>> {
        let goal_id = goal_id.to_string();
        self.writer
            .exec(
                move |conn: &mut SqliteConnection| -> Result<Vec<GoalMilestone>> {
                    let mut created = Vec::with_capacity(milestones.len());
                    for milestone in milestones {
                        let milestone_db = GoalMilestoneDB::from_new(&goal_id, milestone);
                        let inserted = diesel::insert_into(goal_milestones::table)
                            .values(&milestone_db)
                            .returning(GoalMilestoneDB::as_returning())
                            .get_result(conn)
                            .map_err(StorageError::from)?;
                        created.push(GoalMilestone::from(inserted));
                    }
                    Ok(created)
                },
            )
            .await
    }

    fn list_insights(&self, for_workspace_id: &str, unread_only: bool) -> Result<Vec<GoalInsight>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = goal_insights::table
            .filter(goal_insights::workspace_id.eq(for_workspace_id))
            .into_boxed();
        if unread_only {
            query = query.filter(goal_insights::is_read.eq(false));
        }
        let rows = query
            .order(goal_insights::created_at.desc())
            .load::<GoalInsightDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(GoalInsight::from).collect())
    }

    async fn insert_insight(&self, insight: NewInsight) -> Result<GoalInsight> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<GoalInsight> {
                let insight_db = GoalInsightDB::from(insight);
                let inserted = diesel::insert_into(goal_insights::table)
                    .values(&insight_db)
                    .returning(GoalInsightDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(GoalInsight::from(inserted))
            })
            .await
    }

    async fn mark_insight_read(&self, insight_id: &str) -> Result<GoalInsight> {
        let insight_id = insight_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<GoalInsight> {
                diesel::update(goal_insights::table.find(&insight_id))
                    .set(goal_insights::is_read.eq(true))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let row = goal_insights::table
                    .find(&insight_id)
                    .first::<GoalInsightDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| Error::Database(DatabaseError::NotFound(insight_id.clone())))?;
                Ok(GoalInsight::from(row))
            })
            .await
    }

    async fn insert_match_audit(&self, audit: NewMatchAudit) -> Result<GoalMatchAudit> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<GoalMatchAudit> {
                let audit_db = GoalMatchAuditDB::from_new(audit).map_err(|e| {
                    Error::from(StorageError::SerializationError(e.to_string()))
                })?;
                let inserted = diesel::insert_into(goal_match_audits::table)
                    .values(&audit_db)
                    .returning(GoalMatchAuditDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(GoalMatchAudit::from(inserted))
            })
            .await
    }

    fn list_match_audits(&self, for_workspace_id: &str) -> Result<Vec<GoalMatchAudit>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goal_match_audits::table
            .filter(goal_match_audits::workspace_id.eq(for_workspace_id))
            .order(goal_match_audits::created_at.desc())
            .load::<GoalMatchAuditDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(GoalMatchAudit::from).collect())
    }
}
