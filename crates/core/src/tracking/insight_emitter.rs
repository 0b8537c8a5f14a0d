//! Insight construction.
//!
//! Pure builders for the notifications emitted after contributions:
//! progress-threshold insights, the goal-completion achievement, and
//! milestone achievements. The progress service persists what these
//! return; nothing here touches storage.

use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::json;

use crate::constants::PROGRESS_INSIGHT_THRESHOLDS;
use crate::goals::{Goal, GoalMilestone, InsightSeverity, InsightType, NewInsight};

/// Progress thresholds crossed by moving from `previous` to `new` on the
/// way to `target`. Crossing detection makes each threshold fire exactly
/// once under monotonic progress, even when one contribution jumps past
/// several thresholds at once.
pub fn crossed_thresholds(previous: Decimal, new: Decimal, target: Decimal) -> Vec<u32> {
    if target <= Decimal::ZERO {
        return Vec::new();
    }
    let previous_pct = previous / target * Decimal::ONE_HUNDRED;
    let new_pct = new / target * Decimal::ONE_HUNDRED;

    PROGRESS_INSIGHT_THRESHOLDS
        .iter()
        .copied()
        .filter(|t| {
            let threshold = Decimal::from(*t);
            previous_pct < threshold && new_pct >= threshold
        })
        .collect()
}

/// Insight for crossing one progress threshold.
pub fn progress_insight(goal: &Goal, threshold: u32, new_amount: Decimal) -> NewInsight {
    let percent = if goal.target_amount > Decimal::ZERO {
        (new_amount / goal.target_amount * Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or(0.0)
    } else {
        0.0
    };

    NewInsight {
        goal_id: goal.id.clone(),
        workspace_id: goal.workspace_id.clone(),
        insight_type: InsightType::Achievement,
        title: format!("{}% of the way to '{}'", threshold, goal.name),
        message: format!(
            "You have saved {} of {} towards '{}'. Keep it up!",
            new_amount, goal.target_amount, goal.name
        ),
        severity: InsightSeverity::Success,
        action_required: false,
        data: Some(json!({
            "threshold": threshold,
            "progressPercent": percent,
            "currentAmount": new_amount,
        })),
    }
}

/// Achievement insight emitted when a goal transitions to completed.
pub fn completion_insight(goal: &Goal) -> NewInsight {
    NewInsight {
        goal_id: goal.id.clone(),
        workspace_id: goal.workspace_id.clone(),
        insight_type: InsightType::Achievement,
        title: format!("Goal '{}' completed!", goal.name),
        message: format!(
            "'{}' reached its target of {}. Congratulations!",
            goal.name, goal.target_amount
        ),
        severity: InsightSeverity::Success,
        action_required: false,
        data: Some(json!({ "targetAmount": goal.target_amount })),
    }
}

/// Achievement insight for one completed milestone, including its reward
/// text when present.
pub fn milestone_insight(goal: &Goal, milestone: &GoalMilestone) -> NewInsight {
    let message = match &milestone.reward {
        Some(reward) => format!(
            "Milestone '{}' of goal '{}' reached. Reward: {}",
            milestone.name, goal.name, reward
        ),
        None => format!(
            "Milestone '{}' of goal '{}' reached.",
            milestone.name, goal.name
        ),
    };

    NewInsight {
        goal_id: goal.id.clone(),
        workspace_id: goal.workspace_id.clone(),
        insight_type: InsightType::Achievement,
        title: format!("Milestone reached: {}", milestone.name),
        message,
        severity: InsightSeverity::Success,
        action_required: false,
        data: Some(json!({
            "milestoneId": milestone.id,
            "orderIndex": milestone.order_index,
            "targetAmount": milestone.target_amount,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn crossing_a_threshold_fires_once() {
        assert_eq!(crossed_thresholds(dec!(20), dec!(26), dec!(100)), vec![25]);
        // Already past: no repeat on the next contribution.
        assert!(crossed_thresholds(dec!(26), dec!(40), dec!(100)).is_empty());
    }

    #[test]
    fn one_jump_can_cross_several_thresholds() {
        assert_eq!(
            crossed_thresholds(dec!(10), dec!(80), dec!(100)),
            vec![25, 50, 75]
        );
    }

    #[test]
    fn landing_exactly_on_a_threshold_counts() {
        assert_eq!(crossed_thresholds(dec!(24), dec!(25), dec!(100)), vec![25]);
    }

    #[test]
    fn zero_target_never_crosses() {
        assert!(crossed_thresholds(dec!(0), dec!(10), dec!(0)).is_empty());
    }
}
