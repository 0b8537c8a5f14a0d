//! Analytics domain models: health assessment, risk tiers, and advisory
//! recommendations. Everything here is read-only and advisory.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::goals::{GoalPriority, GoalType};

/// How likely a goal is to miss its target date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Category tag for an advisory recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    IncreaseContribution,
    ExtendTimeline,
    OptimizeBudget,
}

/// One advisory message attached to a goal analysis. Never auto-applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRecommendation {
    pub recommendation_type: RecommendationType,
    pub message: String,
    /// 0..1, how confident the heuristic is that acting on this helps.
    pub confidence: f64,
}

/// Full analysis of a single goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalAnalytics {
    pub goal_id: String,
    /// Trailing average monthly contribution rate.
    pub velocity: Decimal,
    /// Monthly rate needed to land on the target date from here.
    pub required_monthly_rate: Decimal,
    /// `None` when velocity is zero.
    pub projected_completion: Option<DateTime<Utc>>,
    /// 0..=100 composite on-track estimate.
    pub health_score: u32,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<GoalRecommendation>,
}

/// Aggregated monthly figures for a workspace, supplied by the workspace
/// financial-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceFinancials {
    pub monthly_income: Decimal,
    pub monthly_expenses: Decimal,
}

impl WorkspaceFinancials {
    /// Income minus expenses. Negative when the workspace runs a deficit.
    pub fn net_monthly(&self) -> Decimal {
        self.monthly_income - self.monthly_expenses
    }
}

/// A starter-goal suggestion derived from workspace financials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSuggestion {
    pub goal_type: GoalType,
    pub name: String,
    pub suggested_target: Decimal,
    pub suggested_monthly: Decimal,
    pub priority: GoalPriority,
    pub message: String,
}
