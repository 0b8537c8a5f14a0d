use std::sync::Arc;

use chrono::{DateTime, Duration, Months, Utc};
use log::debug;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::analytics_model::{
    GoalAnalytics, GoalRecommendation, GoalSuggestion, RecommendationType, RiskLevel,
    WorkspaceFinancials,
};
use crate::constants::VELOCITY_WINDOW_DAYS;
use crate::errors::Result;
use crate::goals::{Goal, GoalPriority, GoalRepositoryTrait, GoalType};
use crate::tracking::months_remaining;

/// Supplies aggregated monthly income/expense figures per workspace.
/// Implemented outside this crate by whatever owns transaction data.
pub trait WorkspaceFinancialsProviderTrait: Send + Sync {
    fn get_financials(&self, workspace_id: &str) -> Result<WorkspaceFinancials>;
}

/// Trait for analytics operations.
pub trait GoalAnalyticsServiceTrait: Send + Sync {
    fn analyze_goal(&self, goal_id: &str) -> Result<GoalAnalytics>;
    fn suggest_goals(&self, financials: &WorkspaceFinancials) -> Vec<GoalSuggestion>;
}

/// Read-only advisory layer over goal and contribution history. Never on
/// the transaction hot path and tolerant of slightly stale amounts.
pub struct GoalAnalyticsService {
    goal_repository: Arc<dyn GoalRepositoryTrait>,
    financials_provider: Arc<dyn WorkspaceFinancialsProviderTrait>,
}

impl GoalAnalyticsService {
    pub fn new(
        goal_repository: Arc<dyn GoalRepositoryTrait>,
        financials_provider: Arc<dyn WorkspaceFinancialsProviderTrait>,
    ) -> Self {
        GoalAnalyticsService {
            goal_repository,
            financials_provider,
        }
    }

    /// Trailing average monthly contribution rate over the velocity
    /// window. Days are counted from the earliest in-window contribution
    /// so a goal funded for only two weeks is not diluted to a quarter.
    fn velocity(&self, goal_id: &str, now: DateTime<Utc>) -> Result<Decimal> {
        let since = now - Duration::days(VELOCITY_WINDOW_DAYS);
        let contributions = self
            .goal_repository
            .list_contributions_since(goal_id, since)?;
        if contributions.is_empty() {
            return Ok(Decimal::ZERO);
        }

        let total: Decimal = contributions.iter().map(|c| c.amount).sum();
        let earliest = contributions
            .iter()
            .map(|c| c.contribution_date)
            .min()
            .unwrap_or(now);
        let days_spanned = (now - earliest).num_days().max(1);

        Ok(total / Decimal::from(days_spanned) * dec!(30))
    }

    fn projected_completion(
        remaining: Decimal,
        velocity: Decimal,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        if velocity <= Decimal::ZERO {
            return None;
        }
        if remaining <= Decimal::ZERO {
            return Some(now);
        }
        let months = (remaining / velocity).ceil().to_u32()?;
        now.checked_add_months(Months::new(months))
    }

    fn health_score(
        goal: &Goal,
        velocity: Decimal,
        required: Decimal,
        net_monthly: Decimal,
        now: DateTime<Utc>,
    ) -> u32 {
        let mut score: i64 = 100;

        // Progress-rate penalty: compare actual progress against the
        // time-linear expectation between creation and target date.
        let total_days = (goal.target_date - goal.created_at).num_days();
        if total_days > 0 {
            let elapsed_days = (now - goal.created_at).num_days().clamp(0, total_days);
            let expected_pct =
                Decimal::from(elapsed_days) / Decimal::from(total_days) * Decimal::ONE_HUNDRED;
            let lag = expected_pct - goal.progress_percent();
            if lag > Decimal::ZERO {
                score -= lag.to_i64().unwrap_or(30).min(30);
            }
        }

        // Velocity penalty: zero velocity on an unfinished goal is the
        // worst case; otherwise penalize the shortfall proportionally.
        if goal.remaining_amount() > Decimal::ZERO {
            if velocity <= Decimal::ZERO {
                score -= 25;
            } else if required > Decimal::ZERO && velocity < required {
                let shortfall = (required - velocity) / required;
                score -= (shortfall * dec!(25)).to_i64().unwrap_or(25).min(25);
            }
        }

        // Capacity penalty: the required pace is unrealistic for the
        // workspace's net monthly capacity.
        if required > net_monthly * dec!(1.5) {
            score -= 20;
        } else if required > net_monthly {
            score -= 10;
        }

        score.clamp(0, 100) as u32
    }

    fn risk_level(velocity: Decimal, required: Decimal) -> RiskLevel {
        if required <= Decimal::ZERO {
            return RiskLevel::Low;
        }
        if velocity >= required * dec!(1.2) {
            RiskLevel::Low
        } else if velocity >= required * dec!(0.8) {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    fn recommendations(
        goal: &Goal,
        velocity: Decimal,
        required: Decimal,
        net_monthly: Decimal,
        projected_completion: Option<DateTime<Utc>>,
    ) -> Vec<GoalRecommendation> {
        let mut recs = Vec::new();
        if goal.remaining_amount() <= Decimal::ZERO || required <= Decimal::ZERO {
            return recs;
        }

        if velocity < required * dec!(0.8) {
            let gap = required - velocity;
            recs.push(GoalRecommendation {
                recommendation_type: RecommendationType::IncreaseContribution,
                message: format!(
                    "Contributions to '{}' average {} per month but {} is needed to stay on \
                     schedule. Consider adding about {} per month.",
                    goal.name,
                    velocity.round_dp(2),
                    required.round_dp(2),
                    gap.round_dp(2)
                ),
                confidence: 0.8,
            });
        }

        let behind_schedule = match projected_completion {
            Some(projected) => projected > goal.target_date,
            None => true,
        };
        if behind_schedule {
            recs.push(GoalRecommendation {
                recommendation_type: RecommendationType::ExtendTimeline,
                message: format!(
                    "At the current pace, '{}' will not reach its target by {}. Extending the \
                     target date would bring the required monthly amount down.",
                    goal.name,
                    goal.target_date.format("%Y-%m-%d")
                ),
                confidence: 0.7,
            });
        }

        if net_monthly < required {
            recs.push(GoalRecommendation {
                recommendation_type: RecommendationType::OptimizeBudget,
                message: format!(
                    "The workspace's net monthly capacity ({}) is below the {} per month that \
                     '{}' requires. Reviewing recurring expenses could free up room.",
                    net_monthly.round_dp(2),
                    required.round_dp(2),
                    goal.name
                ),
                confidence: 0.6,
            });
        }

        recs
    }
}

impl GoalAnalyticsServiceTrait for GoalAnalyticsService {
    fn analyze_goal(&self, goal_id: &str) -> Result<GoalAnalytics> {
        let goal = self.goal_repository.get_goal(goal_id)?;
        let financials = self.financials_provider.get_financials(&goal.workspace_id)?;
        let now = Utc::now();

        let velocity = self.velocity(goal_id, now)?;
        let remaining = goal.remaining_amount();
        let required = remaining / Decimal::from(months_remaining(now, goal.target_date));
        let projected_completion = Self::projected_completion(remaining, velocity, now);
        let net_monthly = financials.net_monthly();

        let health_score = Self::health_score(&goal, velocity, required, net_monthly, now);
        let risk_level = Self::risk_level(velocity, required);
        let recommendations =
            Self::recommendations(&goal, velocity, required, net_monthly, projected_completion);

        debug!(
            "Analyzed goal {}: velocity {}, required {}, health {}, risk {}",
            goal_id,
            velocity.round_dp(2),
            required.round_dp(2),
            health_score,
            risk_level.as_str()
        );

        Ok(GoalAnalytics {
            goal_id: goal.id,
            velocity,
            required_monthly_rate: required,
            projected_completion,
            health_score,
            risk_level,
            recommendations,
        })
    }

    /// Starter-goal suggestions from aggregated workspace figures alone.
    /// No persistence reads, no writes.
    fn suggest_goals(&self, financials: &WorkspaceFinancials) -> Vec<GoalSuggestion> {
        let mut suggestions = Vec::new();
        let surplus = financials.net_monthly();

        if financials.monthly_expenses > Decimal::ZERO {
            let target = financials.monthly_expenses * dec!(6);
            let monthly = if surplus > Decimal::ZERO {
                (surplus * dec!(0.3)).round_dp(2)
            } else {
                Decimal::ZERO
            };
            suggestions.push(GoalSuggestion {
                goal_type: GoalType::EmergencyFund,
                name: "Emergency fund".to_string(),
                suggested_target: target,
                suggested_monthly: monthly,
                priority: GoalPriority::High,
                message: format!(
                    "Six months of expenses ({}) gives a solid safety net.",
                    target.round_dp(2)
                ),
            });
        }

        if surplus > Decimal::ZERO {
            let monthly = (surplus * dec!(0.5)).round_dp(2);
            suggestions.push(GoalSuggestion {
                goal_type: GoalType::Savings,
                name: "General savings".to_string(),
                suggested_target: (monthly * dec!(12)).round_dp(2),
                suggested_monthly: monthly,
                priority: GoalPriority::Medium,
                message: format!(
                    "Setting aside half the monthly surplus ({}) builds savings without \
                     squeezing the budget.",
                    monthly
                ),
            });
        } else if financials.monthly_expenses > financials.monthly_income {
            suggestions.push(GoalSuggestion {
                goal_type: GoalType::DebtPayment,
                name: "Get back in the black".to_string(),
                suggested_target: Decimal::ZERO,
                suggested_monthly: Decimal::ZERO,
                priority: GoalPriority::High,
                message: "Expenses currently exceed income. Reducing recurring costs or debt \
                          payments should come before new savings goals."
                    .to_string(),
            });
        }

        suggestions
    }
}
