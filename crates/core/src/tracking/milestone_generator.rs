//! Deterministic milestone scheduling.
//!
//! Large goals get quarterly checkpoints, everything else monthly ones,
//! and both schedules end with a final milestone at the full target on the
//! target date. The schedule is a pure function of goal state and `now`.

use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;

use crate::constants::{LARGE_GOAL_THRESHOLD, MAX_QUARTERLY_MILESTONES};
use crate::goals::{Goal, NewMilestone};

const MIDPOINT_REWARD: &str = "Halfway there, treat yourself";
const STREAK_REWARD: &str = "Three-month streak reward";
const COMPLETION_REWARD: &str = "Goal completed, celebrate!";

/// Calendar months remaining until `target_date`, rounding partial months
/// up, with a floor of one.
pub fn months_remaining(now: DateTime<Utc>, target_date: DateTime<Utc>) -> u32 {
    if target_date <= now {
        return 1;
    }
    let mut whole = 0u32;
    while whole < 1200 && now + Months::new(whole + 1) <= target_date {
        whole += 1;
    }
    let months = if now + Months::new(whole) < target_date {
        whole + 1
    } else {
        whole
    };
    months.max(1)
}

/// Builds the milestone schedule for a goal. `order_index` runs
/// sequentially from 1; the final entry is always the full target amount
/// on the target date.
pub fn build_milestone_schedule(goal: &Goal, now: DateTime<Utc>) -> Vec<NewMilestone> {
    let remaining = goal.remaining_amount();
    let months = months_remaining(now, goal.target_date);

    let mut schedule = Vec::new();

    if remaining >= LARGE_GOAL_THRESHOLD {
        let quarters = ((months + 2) / 3).clamp(1, MAX_QUARTERLY_MILESTONES);
        let step = remaining / Decimal::from(quarters);
        let midpoint = (quarters + 1) / 2;

        for i in 1..=quarters {
            let date = now + Months::new(3 * i);
            if date > goal.target_date {
                break;
            }
            schedule.push(NewMilestone {
                name: format!("Quarter {} checkpoint", i),
                target_amount: goal.current_amount + step * Decimal::from(i),
                target_date: date,
                order_index: schedule.len() as i32 + 1,
                reward: (i == midpoint).then(|| MIDPOINT_REWARD.to_string()),
            });
        }
    } else {
        let step = remaining / Decimal::from(months);

        for i in 1..=months {
            schedule.push(NewMilestone {
                name: format!("Month {} checkpoint", i),
                target_amount: goal.current_amount + step * Decimal::from(i),
                target_date: now + Months::new(i),
                order_index: schedule.len() as i32 + 1,
                reward: (i % 3 == 0).then(|| STREAK_REWARD.to_string()),
            });
        }
    }

    schedule.push(NewMilestone {
        name: "Goal complete".to_string(),
        target_amount: goal.target_amount,
        target_date: goal.target_date,
        order_index: schedule.len() as i32 + 1,
        reward: Some(COMPLETION_REWARD.to_string()),
    });

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    use crate::goals::{GoalPriority, GoalStatus, GoalType};

    fn goal(current: Decimal, target: Decimal, months_out: u32) -> (Goal, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        let goal = Goal {
            id: "g-1".to_string(),
            workspace_id: "ws-1".to_string(),
            name: "House".to_string(),
            description: None,
            goal_type: GoalType::House,
            target_amount: target,
            current_amount: current,
            target_date: now + Months::new(months_out),
            linked_account_id: None,
            linked_debt_id: None,
            is_auto_tracking: true,
            monthly_contribution: None,
            priority: GoalPriority::Medium,
            status: GoalStatus::Active,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        (goal, now)
    }

    #[test]
    fn twelve_month_goal_gets_monthly_schedule_plus_final() {
        // Scenario E: 12,000,000 over 12 months, monthly steps of 1,000,000.
        let (g, now) = goal(dec!(0), dec!(12_000_000), 12);
        let schedule = build_milestone_schedule(&g, now);

        assert_eq!(schedule.len(), 13);
        for (i, m) in schedule[..12].iter().enumerate() {
            let i = i as u32 + 1;
            assert_eq!(m.target_amount, dec!(1_000_000) * Decimal::from(i));
            assert_eq!(m.order_index, i as i32);
            if i % 3 == 0 {
                assert!(m.reward.is_some(), "month {} should carry a reward", i);
            } else {
                assert!(m.reward.is_none(), "month {} should not carry a reward", i);
            }
        }

        let last = schedule.last().unwrap();
        assert_eq!(last.target_amount, dec!(12_000_000));
        assert_eq!(last.target_date, g.target_date);
        assert_eq!(last.order_index, 13);
        assert!(last.reward.is_some());
    }

    #[test]
    fn large_goal_gets_quarterly_schedule() {
        let (g, now) = goal(dec!(0), dec!(240_000_000), 12);
        let schedule = build_milestone_schedule(&g, now);

        // 12 months -> 4 quarters, plus the final milestone.
        assert_eq!(schedule.len(), 5);
        assert_eq!(schedule[0].target_amount, dec!(60_000_000));
        assert_eq!(schedule[3].target_amount, dec!(240_000_000));

        // Midpoint quarter (2 of 4) carries the celebration reward.
        assert!(schedule[1].reward.is_some());
        assert!(schedule[0].reward.is_none());
        assert!(schedule[2].reward.is_none());
    }

    #[test]
    fn quarterly_schedule_is_capped_at_eight() {
        let (g, now) = goal(dec!(0), dec!(600_000_000), 48);
        let schedule = build_milestone_schedule(&g, now);
        // 8 quarters plus the final milestone.
        assert_eq!(schedule.len(), 9);
    }

    #[test]
    fn quarterly_milestones_never_pass_the_target_date() {
        let (g, now) = goal(dec!(0), dec!(200_000_000), 4);
        let schedule = build_milestone_schedule(&g, now);
        for m in &schedule {
            assert!(m.target_date <= g.target_date);
        }
    }

    #[test]
    fn past_due_goal_still_gets_one_month_and_final() {
        let (mut g, now) = goal(dec!(0), dec!(500_000), 1);
        g.target_date = now - Duration::days(3);
        let schedule = build_milestone_schedule(&g, now);
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule[1].target_amount, dec!(500_000));
    }

    #[test]
    fn orders_are_sequential_from_one() {
        let (g, now) = goal(dec!(2_000_000), dec!(8_000_000), 6);
        let schedule = build_milestone_schedule(&g, now);
        for (i, m) in schedule.iter().enumerate() {
            assert_eq!(m.order_index, i as i32 + 1);
        }
        // Targets include the amount already saved.
        assert!(schedule[0].target_amount > dec!(2_000_000));
    }
}
