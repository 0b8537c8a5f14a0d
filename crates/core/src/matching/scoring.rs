//! Scoring heuristics.
//!
//! Four independent, stateless scoring functions, each given a transaction
//! and a goal and returning a bounded sub-score plus the human-readable
//! factors that produced it. The matcher aggregates these; nothing in this
//! module mutates shared state.

use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use super::matching_model::{CriteriaScores, TransactionContext, TransactionType};
use crate::constants::{ACCOUNT_LINK_SCORE, CONTEXT_SCORE_CAP, KEYWORD_SCORE_CAP};
use crate::goals::{Goal, GoalType};

/// Bounded sub-score plus the ordered factors that justify it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriterionScore {
    pub points: u32,
    pub factors: Vec<String>,
}

/// Fixed keyword dictionary per goal type. Matched as lowercase substrings
/// of the transaction description, 10 points per hit.
pub fn goal_type_keywords(goal_type: GoalType) -> &'static [&'static str] {
    match goal_type {
        GoalType::Savings => &["saving", "savings", "save", "deposit", "nest egg"],
        GoalType::DebtPayment => &["debt", "loan", "repayment", "payoff", "installment", "credit"],
        GoalType::Investment => &["invest", "investment", "stock", "fund", "portfolio", "dividend"],
        GoalType::EmergencyFund => &["emergency", "rainy day", "safety net", "buffer", "reserve"],
        GoalType::Retirement => &["retirement", "retire", "pension", "401k", "ira"],
        GoalType::Vacation => &["vacation", "travel", "trip", "holiday", "flight", "hotel"],
        GoalType::House => &["house", "home", "mortgage", "down payment", "property", "apartment"],
        GoalType::Education => &["education", "tuition", "school", "course", "university", "college"],
    }
}

/// Account linking, 0 or 40 points. An explicit user-declared link between
/// the goal and the transaction's account or debt dominates every other
/// heuristic.
pub fn score_account_link(tx: &TransactionContext, goal: &Goal) -> CriterionScore {
    if goal
        .linked_account_id
        .as_deref()
        .is_some_and(|linked| linked == tx.account_id)
    {
        return CriterionScore {
            points: ACCOUNT_LINK_SCORE,
            factors: vec![format!(
                "Transaction account '{}' is directly linked to this goal",
                tx.account_id
            )],
        };
    }

    if let (Some(linked_debt), Some(tx_debt)) = (goal.linked_debt_id.as_deref(), tx.debt_id.as_deref())
    {
        if linked_debt == tx_debt {
            return CriterionScore {
                points: ACCOUNT_LINK_SCORE,
                factors: vec![format!(
                    "Transaction debt '{}' is directly linked to this goal",
                    tx_debt
                )],
            };
        }
    }

    CriterionScore::default()
}

/// Keyword relevance, capped at 30 points. Case-insensitive substring
/// matching of the description against the goal-type dictionary (10 pts),
/// goal-name words of 3+ characters (8 pts), and goal-description words of
/// 4+ characters (5 pts).
pub fn score_keywords(tx: &TransactionContext, goal: &Goal) -> CriterionScore {
    let description = tx.description.to_lowercase();
    let mut points = 0u32;
    let mut factors = Vec::new();

    for keyword in goal_type_keywords(goal.goal_type) {
        if description.contains(keyword) {
            points += 10;
            factors.push(format!("Description contains '{}' keyword", keyword));
        }
    }

    for word in goal.name.to_lowercase().split_whitespace() {
        let word = word.trim_matches(|c: char| !c.is_alphanumeric());
        if word.len() >= 3 && description.contains(word) {
            points += 8;
            factors.push(format!("Description mentions goal name word '{}'", word));
        }
    }

    if let Some(goal_description) = &goal.description {
        for word in goal_description.to_lowercase().split_whitespace() {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric());
            if word.len() >= 4 && description.contains(word) {
                points += 5;
                factors.push(format!(
                    "Description mentions goal description word '{}'",
                    word
                ));
            }
        }
    }

    CriterionScore {
        points: points.min(KEYWORD_SCORE_CAP),
        factors,
    }
}

/// Static relevance of a `(transaction type, goal type)` pairing, 0..=15
/// points with a textual justification. Exhaustive on both enums so a new
/// variant cannot silently score zero.
pub fn type_relevance(
    tx_type: TransactionType,
    goal_type: GoalType,
) -> (u32, Option<&'static str>) {
    match tx_type {
        TransactionType::Saving => match goal_type {
            GoalType::Savings => (15, Some("Saving transaction feeds a savings goal")),
            GoalType::EmergencyFund => (15, Some("Saving transaction feeds an emergency fund")),
            GoalType::Retirement => (12, Some("Saving transaction suits a retirement goal")),
            GoalType::Investment => (10, Some("Saving transaction can fund an investment goal")),
            GoalType::House => (10, Some("Saving transaction can fund a house goal")),
            GoalType::Vacation => (8, Some("Saving transaction can fund a vacation goal")),
            GoalType::Education => (8, Some("Saving transaction can fund an education goal")),
            GoalType::DebtPayment => (0, None),
        },
        TransactionType::Repayment => match goal_type {
            GoalType::DebtPayment => (15, Some("Repayment transaction matches a debt goal")),
            GoalType::Savings => (0, None),
            GoalType::Investment => (0, None),
            GoalType::EmergencyFund => (0, None),
            GoalType::Retirement => (0, None),
            GoalType::Vacation => (0, None),
            GoalType::House => (0, None),
            GoalType::Education => (0, None),
        },
        TransactionType::Debt => match goal_type {
            GoalType::DebtPayment => (5, Some("Debt activity relates to a debt goal")),
            GoalType::Savings => (0, None),
            GoalType::Investment => (0, None),
            GoalType::EmergencyFund => (0, None),
            GoalType::Retirement => (0, None),
            GoalType::Vacation => (0, None),
            GoalType::House => (0, None),
            GoalType::Education => (0, None),
        },
        TransactionType::Transfer => match goal_type {
            GoalType::Savings => (10, Some("Transfer commonly funds a savings goal")),
            GoalType::EmergencyFund => (10, Some("Transfer commonly funds an emergency fund")),
            GoalType::Investment => (8, Some("Transfer can fund an investment goal")),
            GoalType::Retirement => (8, Some("Transfer can fund a retirement goal")),
            GoalType::House => (8, Some("Transfer can fund a house goal")),
            GoalType::Vacation => (6, Some("Transfer can fund a vacation goal")),
            GoalType::Education => (6, Some("Transfer can fund an education goal")),
            GoalType::DebtPayment => (4, Some("Transfer can service a debt goal")),
        },
        TransactionType::Income => match goal_type {
            GoalType::Retirement => (8, Some("Income can be set aside for retirement")),
            GoalType::Savings => (6, Some("Income can be set aside as savings")),
            GoalType::EmergencyFund => (6, Some("Income can be set aside as a reserve")),
            GoalType::Investment => (6, Some("Income can be invested")),
            GoalType::House => (5, Some("Income can fund a house goal")),
            GoalType::Vacation => (5, Some("Income can fund a vacation goal")),
            GoalType::Education => (5, Some("Income can fund an education goal")),
            GoalType::DebtPayment => (5, Some("Income can service debt")),
        },
        TransactionType::Expense => match goal_type {
            GoalType::Vacation => (10, Some("Vacation spending relates to a vacation goal")),
            GoalType::Education => (8, Some("Education spending relates to an education goal")),
            GoalType::House => (6, Some("Housing spending relates to a house goal")),
            GoalType::Savings => (0, None),
            GoalType::DebtPayment => (0, None),
            GoalType::Investment => (0, None),
            GoalType::EmergencyFund => (0, None),
            GoalType::Retirement => (0, None),
        },
    }
}

/// Transaction context, capped at 20 points: the type-relevance table plus
/// an amount-appropriateness bonus of up to 5 points when the transaction
/// amount is between 1% and 100% of the goal's remaining amount.
pub fn score_context(tx: &TransactionContext, goal: &Goal) -> CriterionScore {
    let mut points = 0u32;
    let mut factors = Vec::new();

    let (relevance, justification) = type_relevance(tx.transaction_type, goal.goal_type);
    if relevance > 0 {
        points += relevance;
        if let Some(text) = justification {
            factors.push(text.to_string());
        }
    }

    let remaining = goal.remaining_amount();
    if remaining > Decimal::ZERO && tx.amount > Decimal::ZERO {
        let fraction = tx.amount / remaining;
        if fraction >= Decimal::new(1, 2) && fraction <= Decimal::ONE {
            let bonus = (fraction * Decimal::TEN)
                .floor()
                .to_u32()
                .unwrap_or(0)
                .min(5);
            if bonus > 0 {
                points += bonus;
                factors.push(format!(
                    "Amount is a meaningful share of the remaining target ({}%)",
                    (fraction * Decimal::ONE_HUNDRED).round_dp(1)
                ));
            }
        }
    }

    CriterionScore {
        points: points.min(CONTEXT_SCORE_CAP),
        factors,
    }
}

/// Derives confidence from convergent evidence rather than the raw total:
/// a merely-high score earns at most 0.8; independent strong signals push
/// it towards 1.0.
pub fn confidence(scores: &CriteriaScores) -> f64 {
    let mut confidence = (scores.total() as f64 / 100.0).min(0.8);
    if scores.account_link >= ACCOUNT_LINK_SCORE {
        confidence += 0.3;
    }
    if scores.keywords >= 20 {
        confidence += 0.2;
    }
    if scores.semantic >= 7 {
        confidence += 0.2;
    }
    if scores.context >= 10 {
        confidence += 0.1;
    }
    confidence.min(1.0)
}
