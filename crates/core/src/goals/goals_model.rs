//! Goals domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category of a financial goal. Drives keyword dictionaries, the
/// type-relevance matrix, and the tie-break ranking, so every variant must
/// be handled explicitly wherever goal types are matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Savings,
    DebtPayment,
    Investment,
    EmergencyFund,
    Retirement,
    Vacation,
    House,
    Education,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Savings => "savings",
            GoalType::DebtPayment => "debt_payment",
            GoalType::Investment => "investment",
            GoalType::EmergencyFund => "emergency_fund",
            GoalType::Retirement => "retirement",
            GoalType::Vacation => "vacation",
            GoalType::House => "house",
            GoalType::Education => "education",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "savings" => Some(GoalType::Savings),
            "debt_payment" => Some(GoalType::DebtPayment),
            "investment" => Some(GoalType::Investment),
            "emergency_fund" => Some(GoalType::EmergencyFund),
            "retirement" => Some(GoalType::Retirement),
            "vacation" => Some(GoalType::Vacation),
            "house" => Some(GoalType::House),
            "education" => Some(GoalType::Education),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl GoalPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalPriority::Low => "low",
            GoalPriority::Medium => "medium",
            GoalPriority::High => "high",
            GoalPriority::Critical => "critical",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "low" => Some(GoalPriority::Low),
            "medium" => Some(GoalPriority::Medium),
            "high" => Some(GoalPriority::High),
            "critical" => Some(GoalPriority::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Completed,
    Paused,
    Archived,
    Failed,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Paused => "paused",
            GoalStatus::Archived => "archived",
            GoalStatus::Failed => "failed",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "active" => Some(GoalStatus::Active),
            "completed" => Some(GoalStatus::Completed),
            "paused" => Some(GoalStatus::Paused),
            "archived" => Some(GoalStatus::Archived),
            "failed" => Some(GoalStatus::Failed),
            _ => None,
        }
    }

    /// Terminal states are never left automatically.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GoalStatus::Completed | GoalStatus::Archived | GoalStatus::Failed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionType {
    Transaction,
    Manual,
    AutoTransfer,
    Interest,
}

impl ContributionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionType::Transaction => "transaction",
            ContributionType::Manual => "manual",
            ContributionType::AutoTransfer => "auto_transfer",
            ContributionType::Interest => "interest",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "transaction" => Some(ContributionType::Transaction),
            "manual" => Some(ContributionType::Manual),
            "auto_transfer" => Some(ContributionType::AutoTransfer),
            "interest" => Some(ContributionType::Interest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    Achievement,
    Alert,
    Recommendation,
    Prediction,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::Achievement => "achievement",
            InsightType::Alert => "alert",
            InsightType::Recommendation => "recommendation",
            InsightType::Prediction => "prediction",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "achievement" => Some(InsightType::Achievement),
            "alert" => Some(InsightType::Alert),
            "recommendation" => Some(InsightType::Recommendation),
            "prediction" => Some(InsightType::Prediction),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightSeverity {
    Info,
    Warning,
    Success,
    Error,
}

impl InsightSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightSeverity::Info => "info",
            InsightSeverity::Warning => "warning",
            InsightSeverity::Success => "success",
            InsightSeverity::Error => "error",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "info" => Some(InsightSeverity::Info),
            "warning" => Some(InsightSeverity::Warning),
            "success" => Some(InsightSeverity::Success),
            "error" => Some(InsightSeverity::Error),
            _ => None,
        }
    }
}

/// Domain model representing a goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub target_date: DateTime<Utc>,
    pub linked_account_id: Option<String>,
    pub linked_debt_id: Option<String>,
    pub is_auto_tracking: bool,
    pub monthly_contribution: Option<Decimal>,
    pub priority: GoalPriority,
    pub status: GoalStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Amount still needed to reach the target. Never negative.
    pub fn remaining_amount(&self) -> Decimal {
        (self.target_amount - self.current_amount).max(Decimal::ZERO)
    }

    /// Progress as a percentage of the target, 0 when the target is zero.
    pub fn progress_percent(&self) -> Decimal {
        if self.target_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.current_amount / self.target_amount * Decimal::ONE_HUNDRED
    }
}

/// Input model for creating a new goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub id: Option<String>,
    pub workspace_id: String,
    pub name: String,
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub target_date: DateTime<Utc>,
    pub linked_account_id: Option<String>,
    pub linked_debt_id: Option<String>,
    pub is_auto_tracking: bool,
    pub monthly_contribution: Option<Decimal>,
    pub priority: GoalPriority,
}

/// Input model for updating an existing goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub target_amount: Option<Decimal>,
    pub target_date: Option<DateTime<Utc>>,
    pub linked_account_id: Option<String>,
    pub linked_debt_id: Option<String>,
    pub is_auto_tracking: Option<bool>,
    pub monthly_contribution: Option<Decimal>,
    pub priority: Option<GoalPriority>,
    pub status: Option<GoalStatus>,
}

/// Immutable record of one amount applied to one goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalContribution {
    pub id: String,
    pub goal_id: String,
    pub workspace_id: String,
    /// Source transaction, when the contribution came from the matcher.
    /// Also serves as the idempotency key for duplicate-apply protection.
    pub transaction_id: Option<String>,
    pub amount: Decimal,
    pub contribution_type: ContributionType,
    pub source: String,
    pub contribution_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Input model for recording a contribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContribution {
    pub workspace_id: String,
    pub transaction_id: Option<String>,
    pub amount: Decimal,
    pub contribution_type: ContributionType,
    pub source: String,
    pub contribution_date: DateTime<Utc>,
}

/// An ordered checkpoint within a goal's progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalMilestone {
    pub id: String,
    pub goal_id: String,
    pub name: String,
    pub target_amount: Decimal,
    pub target_date: DateTime<Utc>,
    /// Unique per goal, 1-based. The sole source of ordering truth.
    pub order_index: i32,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub reward: Option<String>,
}

/// Input model for creating a milestone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMilestone {
    pub name: String,
    pub target_amount: Decimal,
    pub target_date: DateTime<Utc>,
    pub order_index: i32,
    pub reward: Option<String>,
}

/// A generated, read-flagged notification describing goal progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalInsight {
    pub id: String,
    pub goal_id: String,
    pub workspace_id: String,
    pub insight_type: InsightType,
    pub title: String,
    pub message: String,
    pub severity: InsightSeverity,
    pub action_required: bool,
    pub is_read: bool,
    pub data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Input model for emitting an insight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInsight {
    pub goal_id: String,
    pub workspace_id: String,
    pub insight_type: InsightType,
    pub title: String,
    pub message: String,
    pub severity: InsightSeverity,
    pub action_required: bool,
    pub data: Option<serde_json::Value>,
}
