//! Matching domain models: the transaction projection, score breakdowns,
//! match results, and the persisted decision audit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::goals::GoalType;

/// Kind of a transaction, as projected from the transaction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
    Saving,
    Debt,
    Repayment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
            TransactionType::Transfer => "transfer",
            TransactionType::Saving => "saving",
            TransactionType::Debt => "debt",
            TransactionType::Repayment => "repayment",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            "transfer" => Some(TransactionType::Transfer),
            "saving" => Some(TransactionType::Saving),
            "debt" => Some(TransactionType::Debt),
            "repayment" => Some(TransactionType::Repayment),
            _ => None,
        }
    }

    /// Whether a matched transaction of this type should actually be
    /// applied as a goal contribution. Expenses and new debt can still
    /// match (and be audited) but never move a goal's balance.
    pub fn is_contribution(&self) -> bool {
        matches!(
            self,
            TransactionType::Income
                | TransactionType::Transfer
                | TransactionType::Saving
                | TransactionType::Repayment
        )
    }
}

/// Read projection of a transaction. The sole matcher input besides the
/// workspace's goal set; nothing here is persisted by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionContext {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub account_id: String,
    pub debt_id: Option<String>,
    pub category: Option<String>,
    pub date: DateTime<Utc>,
}

/// Per-criterion sub-score breakdown for one candidate goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaScores {
    pub account_link: u32,
    pub keywords: u32,
    pub context: u32,
    pub semantic: u32,
}

impl CriteriaScores {
    pub fn total(&self) -> u32 {
        self.account_link + self.keywords + self.context + self.semantic
    }
}

/// One scored candidate in a match evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalMatchScore {
    pub goal_id: String,
    pub goal_name: String,
    pub goal_type: GoalType,
    pub scores: CriteriaScores,
    pub total_score: u32,
    /// 0..1, derived from convergent evidence rather than the raw total.
    pub confidence: f64,
    /// Ordered, human-readable factors collected by each heuristic.
    pub matching_factors: Vec<String>,
    pub reasoning: String,
}

/// Outcome of one evaluation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchDecision {
    Matched,
    NoMatch,
}

impl MatchDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchDecision::Matched => "matched",
            MatchDecision::NoMatch => "no_match",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "matched" => Some(MatchDecision::Matched),
            "no_match" => Some(MatchDecision::NoMatch),
            _ => None,
        }
    }
}

/// Full result of `find_best_goal_match`: the selected candidate (if any),
/// the complete sorted candidate list for auditing, and the reasoning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalMatchResult {
    pub selected: Option<GoalMatchScore>,
    pub candidates: Vec<GoalMatchScore>,
    pub decision: MatchDecision,
    pub reasoning: String,
}

impl GoalMatchResult {
    pub fn no_match(reasoning: impl Into<String>, candidates: Vec<GoalMatchScore>) -> Self {
        GoalMatchResult {
            selected: None,
            candidates,
            decision: MatchDecision::NoMatch,
            reasoning: reasoning.into(),
        }
    }

    pub fn confidence(&self) -> f64 {
        self.selected.as_ref().map(|s| s.confidence).unwrap_or(0.0)
    }

    pub fn total_score(&self) -> u32 {
        self.selected.as_ref().map(|s| s.total_score).unwrap_or(0)
    }
}

/// One persisted record per transaction-evaluation cycle. Every decision
/// must be reconstructable from this record alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalMatchAudit {
    pub id: String,
    pub transaction_id: String,
    pub workspace_id: String,
    pub selected_goal_id: Option<String>,
    pub candidates: Vec<GoalMatchScore>,
    pub decision: MatchDecision,
    pub reasoning: String,
    pub confidence: f64,
    pub total_score: u32,
    pub contribution_recorded: bool,
    pub created_at: DateTime<Utc>,
}

/// Input model for recording a match audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMatchAudit {
    pub transaction_id: String,
    pub workspace_id: String,
    pub selected_goal_id: Option<String>,
    pub candidates: Vec<GoalMatchScore>,
    pub decision: MatchDecision,
    pub reasoning: String,
    pub confidence: f64,
    pub total_score: u32,
    pub contribution_recorded: bool,
}
