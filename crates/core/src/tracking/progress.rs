//! Pure progress planning.
//!
//! `plan_progress` computes everything a contribution changes about a goal
//! before anything is written: the new amount, the completion flip, and
//! which milestones complete. The storage layer executes the plan inside a
//! single write transaction, so planning and application cannot observe
//! different states.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::goals::{Goal, GoalContribution, GoalMilestone, GoalStatus};

/// The computed effect of applying one contribution amount to a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressPlan {
    pub new_amount: Decimal,
    /// True when this contribution pushes the goal across its target and
    /// the goal was not already completed.
    pub completes_goal: bool,
    /// Milestones to mark complete, in `order_index` order.
    pub milestone_ids_to_complete: Vec<String>,
}

/// Result of an atomically applied contribution, returned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionOutcome {
    /// The goal as persisted after the update.
    pub goal: Goal,
    pub contribution: GoalContribution,
    pub previous_amount: Decimal,
    pub new_amount: Decimal,
    /// Goal transitioned to completed in this application.
    pub completed_now: bool,
    pub completed_milestones: Vec<GoalMilestone>,
}

/// Plans the effect of adding `amount` to `goal`.
///
/// Milestones are walked strictly in `order_index` order and the walk
/// stops at the first incomplete milestone whose target the new amount
/// does not reach. A later milestone is never completed while an earlier
/// one is incomplete, regardless of the amounts involved.
pub fn plan_progress(goal: &Goal, milestones: &[GoalMilestone], amount: Decimal) -> ProgressPlan {
    let new_amount = goal.current_amount + amount;

    let completes_goal = goal.status != GoalStatus::Completed && new_amount >= goal.target_amount;

    let mut ordered: Vec<&GoalMilestone> = milestones.iter().collect();
    ordered.sort_by_key(|m| m.order_index);

    let mut milestone_ids_to_complete = Vec::new();
    for milestone in ordered {
        if milestone.is_completed {
            continue;
        }
        if new_amount >= milestone.target_amount {
            milestone_ids_to_complete.push(milestone.id.clone());
        } else {
            break;
        }
    }

    ProgressPlan {
        new_amount,
        completes_goal,
        milestone_ids_to_complete,
    }
}

/// Timestamp helper used by stores when executing a plan.
pub fn completion_timestamp(now: DateTime<Utc>, plan: &ProgressPlan) -> Option<DateTime<Utc>> {
    plan.completes_goal.then_some(now)
}
