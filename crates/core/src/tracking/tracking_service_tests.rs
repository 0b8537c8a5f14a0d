use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::{DatabaseError, Error, Result};
use crate::goals::{
    Goal, GoalContribution, GoalError, GoalInsight, GoalMilestone, GoalPriority,
    GoalRepositoryTrait, GoalStatus, GoalType, GoalUpdate, InsightType, NewContribution, NewGoal,
    NewInsight, NewMilestone,
};
use crate::matching::{GoalMatchAudit, NewMatchAudit, TransactionContext, TransactionType};
use crate::tracking::{
    plan_progress, ContributionOutcome, GoalProgressService, GoalProgressServiceTrait,
};

// ============== Mock repository ==============

#[derive(Default)]
struct MockGoalRepository {
    goals: Mutex<HashMap<String, Goal>>,
    contributions: Mutex<Vec<GoalContribution>>,
    milestones: Mutex<Vec<GoalMilestone>>,
    insights: Mutex<Vec<GoalInsight>>,
}

impl MockGoalRepository {
    fn with_goal(goal: Goal) -> Self {
        let repo = MockGoalRepository::default();
        repo.goals.lock().unwrap().insert(goal.id.clone(), goal);
        repo
    }

    fn add_milestones(&self, milestones: Vec<GoalMilestone>) {
        self.milestones.lock().unwrap().extend(milestones);
    }

    fn insights_of_type(&self, insight_type: InsightType) -> Vec<GoalInsight> {
        self.insights
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.insight_type == insight_type)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl GoalRepositoryTrait for MockGoalRepository {
    fn get_goal(&self, goal_id: &str) -> Result<Goal> {
        self.goals
            .lock()
            .unwrap()
            .get(goal_id)
            .cloned()
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(goal_id.to_string())))
    }

    fn list_goals(&self, _workspace_id: &str) -> Result<Vec<Goal>> {
        unimplemented!()
    }

    fn list_auto_tracking_goals(&self, _workspace_id: &str) -> Result<Vec<Goal>> {
        unimplemented!()
    }

    async fn insert_goal(&self, _new_goal: NewGoal) -> Result<Goal> {
        unimplemented!()
    }

    async fn update_goal(&self, _update: GoalUpdate) -> Result<Goal> {
        unimplemented!()
    }

    async fn delete_goal(&self, _goal_id: &str) -> Result<usize> {
        unimplemented!()
    }

    fn list_contributions(&self, goal_id: &str) -> Result<Vec<GoalContribution>> {
        Ok(self
            .contributions
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.goal_id == goal_id)
            .cloned()
            .collect())
    }

    fn list_contributions_since(
        &self,
        _goal_id: &str,
        _since: DateTime<Utc>,
    ) -> Result<Vec<GoalContribution>> {
        unimplemented!()
    }

    // Mirrors the storage implementation: duplicate guard, plan, apply,
    // all against the same snapshot of state.
    async fn apply_contribution(
        &self,
        goal_id: &str,
        contribution: NewContribution,
    ) -> Result<ContributionOutcome> {
        let mut goals = self.goals.lock().unwrap();
        let mut contributions = self.contributions.lock().unwrap();
        let mut milestones = self.milestones.lock().unwrap();

        if let Some(txn_id) = &contribution.transaction_id {
            if contributions
                .iter()
                .any(|c| c.goal_id == goal_id && c.transaction_id.as_deref() == Some(txn_id))
            {
                return Err(GoalError::DuplicateContribution {
                    goal_id: goal_id.to_string(),
                    transaction_id: txn_id.clone(),
                }
                .into());
            }
        }

        let goal = goals
            .get(goal_id)
            .cloned()
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(goal_id.to_string())))?;

        let goal_milestones: Vec<GoalMilestone> = milestones
            .iter()
            .filter(|m| m.goal_id == goal_id)
            .cloned()
            .collect();

        let now = Utc::now();
        let plan = plan_progress(&goal, &goal_milestones, contribution.amount);

        let record = GoalContribution {
            id: Uuid::new_v4().to_string(),
            goal_id: goal_id.to_string(),
            workspace_id: contribution.workspace_id,
            transaction_id: contribution.transaction_id,
            amount: contribution.amount,
            contribution_type: contribution.contribution_type,
            source: contribution.source,
            contribution_date: contribution.contribution_date,
            created_at: now,
        };
        contributions.push(record.clone());

        let previous_amount = goal.current_amount;
        let mut updated = goal;
        updated.current_amount = plan.new_amount;
        updated.updated_at = now;
        if plan.completes_goal {
            updated.status = GoalStatus::Completed;
            updated.completed_at = Some(now);
        }
        goals.insert(goal_id.to_string(), updated.clone());

        let mut completed = Vec::new();
        for m in milestones.iter_mut() {
            if plan.milestone_ids_to_complete.contains(&m.id) {
                m.is_completed = true;
                m.completed_at = Some(now);
                completed.push(m.clone());
            }
        }
        completed.sort_by_key(|m| m.order_index);

        Ok(ContributionOutcome {
            goal: updated,
            contribution: record,
            previous_amount,
            new_amount: plan.new_amount,
            completed_now: plan.completes_goal,
            completed_milestones: completed,
        })
    }

    fn list_milestones(&self, goal_id: &str) -> Result<Vec<GoalMilestone>> {
        let mut found: Vec<GoalMilestone> = self
            .milestones
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.goal_id == goal_id)
            .cloned()
            .collect();
        found.sort_by_key(|m| m.order_index);
        Ok(found)
    }

    async fn insert_milestones(
        &self,
        goal_id: &str,
        milestones: Vec<NewMilestone>,
    ) -> Result<Vec<GoalMilestone>> {
        let created: Vec<GoalMilestone> = milestones
            .into_iter()
            .map(|m| GoalMilestone {
                id: Uuid::new_v4().to_string(),
                goal_id: goal_id.to_string(),
                name: m.name,
                target_amount: m.target_amount,
                target_date: m.target_date,
                order_index: m.order_index,
                is_completed: false,
                completed_at: None,
                reward: m.reward,
            })
            .collect();
        self.milestones.lock().unwrap().extend(created.clone());
        Ok(created)
    }

    fn list_insights(&self, _workspace_id: &str, _unread_only: bool) -> Result<Vec<GoalInsight>> {
        Ok(self.insights.lock().unwrap().clone())
    }

    async fn insert_insight(&self, insight: NewInsight) -> Result<GoalInsight> {
        let created = GoalInsight {
            id: Uuid::new_v4().to_string(),
            goal_id: insight.goal_id,
            workspace_id: insight.workspace_id,
            insight_type: insight.insight_type,
            title: insight.title,
            message: insight.message,
            severity: insight.severity,
            action_required: insight.action_required,
            is_read: false,
            data: insight.data,
            created_at: Utc::now(),
        };
        self.insights.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn mark_insight_read(&self, _insight_id: &str) -> Result<GoalInsight> {
        unimplemented!()
    }

    async fn insert_match_audit(&self, _audit: NewMatchAudit) -> Result<GoalMatchAudit> {
        unimplemented!()
    }

    fn list_match_audits(&self, _workspace_id: &str) -> Result<Vec<GoalMatchAudit>> {
        unimplemented!()
    }
}

// ============== Fixtures ==============

fn goal(current: Decimal, target: Decimal) -> Goal {
    let now = Utc::now();
    Goal {
        id: "g-1".to_string(),
        workspace_id: "ws-1".to_string(),
        name: "Emergency Fund".to_string(),
        description: None,
        goal_type: GoalType::EmergencyFund,
        target_amount: target,
        current_amount: current,
        target_date: now + Duration::days(365),
        linked_account_id: Some("acc-7".to_string()),
        linked_debt_id: None,
        is_auto_tracking: true,
        monthly_contribution: None,
        priority: GoalPriority::High,
        status: GoalStatus::Active,
        completed_at: None,
        created_at: now,
        updated_at: now,
    }
}

fn transaction(id: &str, amount: Decimal) -> TransactionContext {
    TransactionContext {
        id: id.to_string(),
        description: "Monthly transfer".to_string(),
        amount,
        transaction_type: TransactionType::Transfer,
        account_id: "acc-7".to_string(),
        debt_id: None,
        category: None,
        date: Utc::now(),
    }
}

fn milestone(id: &str, order_index: i32, target: Decimal) -> GoalMilestone {
    GoalMilestone {
        id: id.to_string(),
        goal_id: "g-1".to_string(),
        name: format!("Milestone {}", order_index),
        target_amount: target,
        target_date: Utc::now() + Duration::days(30 * order_index as i64),
        order_index,
        is_completed: false,
        completed_at: None,
        reward: (order_index % 3 == 0).then(|| "streak reward".to_string()),
    }
}

// ============== Tests ==============

#[tokio::test]
async fn applying_a_transaction_advances_the_goal() {
    let repo = Arc::new(MockGoalRepository::with_goal(goal(
        dec!(10_000_000),
        dec!(60_000_000),
    )));
    let service = GoalProgressService::new(repo.clone());

    let outcome = service
        .apply_matched_transaction("g-1", &transaction("tx-1", dec!(2_000_000)))
        .await
        .unwrap();

    assert_eq!(outcome.previous_amount, dec!(10_000_000));
    assert_eq!(outcome.new_amount, dec!(12_000_000));
    assert!(!outcome.completed_now);
    assert_eq!(repo.list_contributions("g-1").unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_transaction_application_is_rejected() {
    // Scenario D: the same source transaction applied twice must not
    // double-count or emit a second completion insight.
    let repo = Arc::new(MockGoalRepository::with_goal(goal(
        dec!(9_999_999),
        dec!(10_000_000),
    )));
    let service = GoalProgressService::new(repo.clone());
    let tx = transaction("tx-dup", dec!(1));

    let outcome = service
        .apply_matched_transaction("g-1", &tx)
        .await
        .unwrap();
    assert!(outcome.completed_now);
    assert_eq!(outcome.goal.status, GoalStatus::Completed);
    assert!(outcome.goal.completed_at.is_some());

    let err = service
        .apply_matched_transaction("g-1", &tx)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Goal(GoalError::DuplicateContribution { .. })
    ));

    // Amount unchanged and exactly one completion insight.
    assert_eq!(
        repo.get_goal("g-1").unwrap().current_amount,
        dec!(10_000_000)
    );
    let achievements = repo.insights_of_type(InsightType::Achievement);
    let completions: Vec<_> = achievements
        .iter()
        .filter(|i| i.title.contains("completed"))
        .collect();
    assert_eq!(completions.len(), 1);
}

#[tokio::test]
async fn non_auto_tracking_goal_is_never_mutated_by_the_matcher_path() {
    let mut g = goal(dec!(0), dec!(1000));
    g.is_auto_tracking = false;
    let repo = Arc::new(MockGoalRepository::with_goal(g));
    let service = GoalProgressService::new(repo.clone());

    let err = service
        .apply_matched_transaction("g-1", &transaction("tx-1", dec!(100)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Goal(GoalError::AutoTrackingDisabled(_))
    ));
    assert_eq!(repo.get_goal("g-1").unwrap().current_amount, dec!(0));
}

#[tokio::test]
async fn manual_contribution_bypasses_the_auto_tracking_check() {
    let mut g = goal(dec!(0), dec!(1000));
    g.is_auto_tracking = false;
    let repo = Arc::new(MockGoalRepository::with_goal(g));
    let service = GoalProgressService::new(repo.clone());

    let outcome = service
        .add_manual_contribution("g-1", dec!(100), "cash deposit", Utc::now())
        .await
        .unwrap();
    assert_eq!(outcome.new_amount, dec!(100));
}

#[tokio::test]
async fn zero_and_negative_amounts_are_rejected_before_any_write() {
    let repo = Arc::new(MockGoalRepository::with_goal(goal(dec!(0), dec!(1000))));
    let service = GoalProgressService::new(repo.clone());

    for amount in [dec!(0), dec!(-50)] {
        let err = service
            .apply_matched_transaction("g-1", &transaction("tx-bad", amount))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Goal(GoalError::InvalidContribution(_))
        ));
    }
    assert!(repo.list_contributions("g-1").unwrap().is_empty());
}

#[tokio::test]
async fn threshold_insights_fire_once_per_threshold() {
    let repo = Arc::new(MockGoalRepository::with_goal(goal(dec!(0), dec!(1000))));
    let service = GoalProgressService::new(repo.clone());

    // 0 -> 260 crosses 25%.
    service
        .apply_matched_transaction("g-1", &transaction("tx-1", dec!(260)))
        .await
        .unwrap();
    // 260 -> 300: no new threshold.
    service
        .apply_matched_transaction("g-1", &transaction("tx-2", dec!(40)))
        .await
        .unwrap();
    // 300 -> 800 crosses 50% and 75% in one jump.
    service
        .apply_matched_transaction("g-1", &transaction("tx-3", dec!(500)))
        .await
        .unwrap();

    let achievements = repo.insights_of_type(InsightType::Achievement);
    let threshold_titles: Vec<_> = achievements
        .iter()
        .filter(|i| i.title.contains('%'))
        .map(|i| i.title.clone())
        .collect();
    assert_eq!(threshold_titles.len(), 3);
    assert!(threshold_titles.iter().any(|t| t.starts_with("25%")));
    assert!(threshold_titles.iter().any(|t| t.starts_with("50%")));
    assert!(threshold_titles.iter().any(|t| t.starts_with("75%")));
}

#[tokio::test]
async fn milestone_completion_emits_insights_with_reward_text() {
    let repo = Arc::new(MockGoalRepository::with_goal(goal(dec!(0), dec!(1000))));
    repo.add_milestones(vec![
        milestone("m-1", 1, dec!(100)),
        milestone("m-2", 2, dec!(200)),
        milestone("m-3", 3, dec!(300)),
    ]);
    let service = GoalProgressService::new(repo.clone());

    service
        .apply_matched_transaction("g-1", &transaction("tx-1", dec!(350)))
        .await
        .unwrap();

    let milestones = repo.list_milestones("g-1").unwrap();
    assert!(milestones.iter().all(|m| m.is_completed));

    let milestone_insights: Vec<_> = repo
        .insights_of_type(InsightType::Achievement)
        .into_iter()
        .filter(|i| i.title.starts_with("Milestone"))
        .collect();
    assert_eq!(milestone_insights.len(), 3);
    assert!(milestone_insights
        .iter()
        .any(|i| i.message.contains("streak reward")));
}

#[tokio::test]
async fn generate_milestones_rejects_goals_that_already_have_them() {
    let repo = Arc::new(MockGoalRepository::with_goal(goal(dec!(0), dec!(1200))));
    let service = GoalProgressService::new(repo.clone());

    let created = service.generate_milestones("g-1").await.unwrap();
    assert!(!created.is_empty());

    let err = service.generate_milestones("g-1").await.unwrap_err();
    assert!(matches!(err, Error::Goal(GoalError::MilestonesExist(_))));
}

#[tokio::test]
async fn missing_goal_surfaces_not_found() {
    let repo = Arc::new(MockGoalRepository::default());
    let service = GoalProgressService::new(repo);

    let err = service
        .apply_matched_transaction("missing", &transaction("tx-1", dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Database(DatabaseError::NotFound(_))));
}
