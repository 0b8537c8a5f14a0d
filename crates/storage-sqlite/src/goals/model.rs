//! Database models for the goal engine tables.
//!
//! Amounts and timestamps are stored as TEXT (decimals in canonical string
//! form, timestamps as RFC 3339). Reads are tolerant: a malformed cell is
//! logged and replaced with a safe default instead of failing the query.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fintrack_core::goals::{
    ContributionType, Goal, GoalContribution, GoalInsight, GoalMilestone, GoalPriority,
    GoalStatus, GoalType, InsightSeverity, InsightType, NewContribution, NewGoal, NewInsight,
    NewMilestone,
};
use fintrack_core::matching::{GoalMatchAudit, GoalMatchScore, MatchDecision, NewMatchAudit};

/// Parses a stored decimal, falling back through f64 for scientific
/// notation left behind by older writers.
pub(crate) fn parse_decimal_string_tolerant(value_str: &str, field_name: &str) -> Decimal {
    match Decimal::from_str(value_str) {
        Ok(d) => d,
        Err(e_decimal) => match f64::from_str(value_str) {
            Ok(f_val) => match Decimal::from_f64(f_val) {
                Some(dec_val) => dec_val,
                None => {
                    log::error!(
                        "Failed to convert {} '{}' (parsed as f64: {}) to Decimal.",
                        field_name,
                        value_str,
                        f_val
                    );
                    Decimal::ZERO
                }
            },
            Err(e_f64) => {
                log::error!(
                    "Failed to parse {} '{}': as Decimal (err: {}), and as f64 (err: {}). Falling back to ZERO.",
                    field_name, value_str, e_decimal, e_f64
                );
                Decimal::ZERO
            }
        },
    }
}

pub(crate) fn parse_datetime_string_tolerant(value_str: &str, field_name: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            log::error!("Failed to parse {} '{}': {}", field_name, value_str, e);
            Utc::now()
        })
}

fn parse_enum_tolerant<T>(
    value_str: &str,
    field_name: &str,
    parse: fn(&str) -> Option<T>,
    default: T,
) -> T {
    parse(value_str).unwrap_or_else(|| {
        log::warn!(
            "Unknown {} value '{}', falling back to default",
            field_name,
            value_str
        );
        default
    })
}

/// Database model for goals
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct GoalDB {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    pub description: Option<String>,
    pub goal_type: String,
    pub target_amount: String,
    pub current_amount: String,
    pub target_date: String,
    pub linked_account_id: Option<String>,
    pub linked_debt_id: Option<String>,
    pub is_auto_tracking: bool,
    pub monthly_contribution: Option<String>,
    pub priority: String,
    pub status: String,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<GoalDB> for Goal {
    fn from(db: GoalDB) -> Self {
        Goal {
            goal_type: parse_enum_tolerant(
                &db.goal_type,
                "goal_type",
                GoalType::from_str,
                GoalType::Savings,
            ),
            target_amount: parse_decimal_string_tolerant(&db.target_amount, "target_amount"),
            current_amount: parse_decimal_string_tolerant(&db.current_amount, "current_amount"),
            target_date: parse_datetime_string_tolerant(&db.target_date, "target_date"),
            monthly_contribution: db
                .monthly_contribution
                .as_deref()
                .map(|s| parse_decimal_string_tolerant(s, "monthly_contribution")),
            priority: parse_enum_tolerant(
                &db.priority,
                "priority",
                GoalPriority::from_str,
                GoalPriority::Medium,
            ),
            status: parse_enum_tolerant(
                &db.status,
                "status",
                GoalStatus::from_str,
                GoalStatus::Active,
            ),
            completed_at: db
                .completed_at
                .as_deref()
                .map(|s| parse_datetime_string_tolerant(s, "completed_at")),
            created_at: parse_datetime_string_tolerant(&db.created_at, "created_at"),
            updated_at: parse_datetime_string_tolerant(&db.updated_at, "updated_at"),
            id: db.id,
            workspace_id: db.workspace_id,
            name: db.name,
            description: db.description,
            linked_account_id: db.linked_account_id,
            linked_debt_id: db.linked_debt_id,
            is_auto_tracking: db.is_auto_tracking,
        }
    }
}

impl From<NewGoal> for GoalDB {
    fn from(domain: NewGoal) -> Self {
        let now = Utc::now().to_rfc3339();
        GoalDB {
            id: domain.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            workspace_id: domain.workspace_id,
            name: domain.name,
            description: domain.description,
            goal_type: domain.goal_type.as_str().to_string(),
            target_amount: domain.target_amount.to_string(),
            current_amount: domain.current_amount.to_string(),
            target_date: domain.target_date.to_rfc3339(),
            linked_account_id: domain.linked_account_id,
            linked_debt_id: domain.linked_debt_id,
            is_auto_tracking: domain.is_auto_tracking,
            monthly_contribution: domain.monthly_contribution.map(|d| d.to_string()),
            priority: domain.priority.as_str().to_string(),
            status: GoalStatus::Active.as_str().to_string(),
            completed_at: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

impl From<&Goal> for GoalDB {
    fn from(domain: &Goal) -> Self {
        GoalDB {
            id: domain.id.clone(),
            workspace_id: domain.workspace_id.clone(),
            name: domain.name.clone(),
            description: domain.description.clone(),
            goal_type: domain.goal_type.as_str().to_string(),
            target_amount: domain.target_amount.to_string(),
            current_amount: domain.current_amount.to_string(),
            target_date: domain.target_date.to_rfc3339(),
            linked_account_id: domain.linked_account_id.clone(),
            linked_debt_id: domain.linked_debt_id.clone(),
            is_auto_tracking: domain.is_auto_tracking,
            monthly_contribution: domain.monthly_contribution.map(|d| d.to_string()),
            priority: domain.priority.as_str().to_string(),
            status: domain.status.as_str().to_string(),
            completed_at: domain.completed_at.map(|dt| dt.to_rfc3339()),
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }
}

/// Database model for goal contributions
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::goal_contributions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct GoalContributionDB {
    pub id: String,
    pub goal_id: String,
    pub workspace_id: String,
    pub transaction_id: Option<String>,
    pub amount: String,
    pub contribution_type: String,
    pub source: String,
    pub contribution_date: String,
    pub created_at: String,
}

impl From<GoalContributionDB> for GoalContribution {
    fn from(db: GoalContributionDB) -> Self {
        GoalContribution {
            amount: parse_decimal_string_tolerant(&db.amount, "amount"),
            contribution_type: parse_enum_tolerant(
                &db.contribution_type,
                "contribution_type",
                ContributionType::from_str,
                ContributionType::Manual,
            ),
            contribution_date: parse_datetime_string_tolerant(
                &db.contribution_date,
                "contribution_date",
            ),
            created_at: parse_datetime_string_tolerant(&db.created_at, "created_at"),
            id: db.id,
            goal_id: db.goal_id,
            workspace_id: db.workspace_id,
            transaction_id: db.transaction_id,
            source: db.source,
        }
    }
}

impl GoalContributionDB {
    pub fn from_new(goal_id: &str, domain: NewContribution) -> Self {
        GoalContributionDB {
            id: Uuid::new_v4().to_string(),
            goal_id: goal_id.to_string(),
            workspace_id: domain.workspace_id,
            transaction_id: domain.transaction_id,
            amount: domain.amount.to_string(),
            contribution_type: domain.contribution_type.as_str().to_string(),
            source: domain.source,
            contribution_date: domain.contribution_date.to_rfc3339(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Database model for goal milestones
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::goal_milestones)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct GoalMilestoneDB {
    pub id: String,
    pub goal_id: String,
    pub name: String,
    pub target_amount: String,
    pub target_date: String,
    pub order_index: i32,
    pub is_completed: bool,
    pub completed_at: Option<String>,
    pub reward: Option<String>,
}

impl From<GoalMilestoneDB> for GoalMilestone {
    fn from(db: GoalMilestoneDB) -> Self {
        GoalMilestone {
            target_amount: parse_decimal_string_tolerant(&db.target_amount, "target_amount"),
            target_date: parse_datetime_string_tolerant(&db.target_date, "target_date"),
            completed_at: db
                .completed_at
                .as_deref()
                .map(|s| parse_datetime_string_tolerant(s, "completed_at")),
            id: db.id,
            goal_id: db.goal_id,
            name: db.name,
            order_index: db.order_index,
            is_completed: db.is_completed,
            reward: db.reward,
        }
    }
}

impl GoalMilestoneDB {
    pub fn from_new(goal_id: &str, domain: NewMilestone) -> Self {
        GoalMilestoneDB {
            id: Uuid::new_v4().to_string(),
            goal_id: goal_id.to_string(),
            name: domain.name,
            target_amount: domain.target_amount.to_string(),
            target_date: domain.target_date.to_rfc3339(),
            order_index: domain.order_index,
            is_completed: false,
            completed_at: None,
            reward: domain.reward,
        }
    }
}

/// Database model for goal insights
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::goal_insights)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct GoalInsightDB {
    pub id: String,
    pub goal_id: String,
    pub workspace_id: String,
    pub insight_type: String,
    pub title: String,
    pub message: String,
    pub severity: String,
    pub action_required: bool,
    pub is_read: bool,
    pub data: Option<String>,
    pub created_at: String,
}

impl From<GoalInsightDB> for GoalInsight {
    fn from(db: GoalInsightDB) -> Self {
        GoalInsight {
            insight_type: parse_enum_tolerant(
                &db.insight_type,
                "insight_type",
                InsightType::from_str,
                InsightType::Alert,
            ),
            severity: parse_enum_tolerant(
                &db.severity,
                "severity",
                InsightSeverity::from_str,
                InsightSeverity::Info,
            ),
            data: db.data.as_deref().and_then(|s| {
                serde_json::from_str(s)
                    .map_err(|e| log::error!("Failed to parse insight data: {}", e))
                    .ok()
            }),
            created_at: parse_datetime_string_tolerant(&db.created_at, "created_at"),
            id: db.id,
            goal_id: db.goal_id,
            workspace_id: db.workspace_id,
            title: db.title,
            message: db.message,
            action_required: db.action_required,
            is_read: db.is_read,
        }
    }
}

impl From<NewInsight> for GoalInsightDB {
    fn from(domain: NewInsight) -> Self {
        GoalInsightDB {
            id: Uuid::new_v4().to_string(),
            goal_id: domain.goal_id,
            workspace_id: domain.workspace_id,
            insight_type: domain.insight_type.as_str().to_string(),
            title: domain.title,
            message: domain.message,
            severity: domain.severity.as_str().to_string(),
            action_required: domain.action_required,
            is_read: false,
            data: domain.data.map(|v| v.to_string()),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Database model for goal match audits
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::goal_match_audits)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct GoalMatchAuditDB {
    pub id: String,
    pub transaction_id: String,
    pub workspace_id: String,
    pub selected_goal_id: Option<String>,
    /// Full candidate breakdown as a JSON array.
    pub candidates: String,
    pub decision: String,
    pub reasoning: String,
    pub confidence: f64,
    pub total_score: i32,
    pub contribution_recorded: bool,
    pub created_at: String,
}

impl From<GoalMatchAuditDB> for GoalMatchAudit {
    fn from(db: GoalMatchAuditDB) -> Self {
        let candidates: Vec<GoalMatchScore> = serde_json::from_str(&db.candidates)
            .unwrap_or_else(|e| {
                log::error!("Failed to parse audit candidates: {}", e);
                Vec::new()
            });
        GoalMatchAudit {
            candidates,
            decision: parse_enum_tolerant(
                &db.decision,
                "decision",
                MatchDecision::from_str,
                MatchDecision::NoMatch,
            ),
            total_score: db.total_score.max(0) as u32,
            created_at: parse_datetime_string_tolerant(&db.created_at, "created_at"),
            id: db.id,
            transaction_id: db.transaction_id,
            workspace_id: db.workspace_id,
            selected_goal_id: db.selected_goal_id,
            reasoning: db.reasoning,
            confidence: db.confidence,
            contribution_recorded: db.contribution_recorded,
        }
    }
}

impl GoalMatchAuditDB {
    pub fn from_new(domain: NewMatchAudit) -> Result<Self, serde_json::Error> {
        Ok(GoalMatchAuditDB {
            id: Uuid::new_v4().to_string(),
            transaction_id: domain.transaction_id,
            workspace_id: domain.workspace_id,
            selected_goal_id: domain.selected_goal_id,
            candidates: serde_json::to_string(&domain.candidates)?,
            decision: domain.decision.as_str().to_string(),
            reasoning: domain.reasoning,
            confidence: domain.confidence,
            total_score: domain.total_score as i32,
            contribution_recorded: domain.contribution_recorded,
            created_at: Utc::now().to_rfc3339(),
        })
    }
}
