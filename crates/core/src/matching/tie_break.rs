//! Deterministic tie resolution among equally-scored goal candidates.

use super::matching_model::GoalMatchScore;
use crate::goals::GoalType;

/// Fixed goal-type priority for the final heuristic tie-break step.
/// Lower rank wins.
pub fn goal_type_rank(goal_type: GoalType) -> u8 {
    match goal_type {
        GoalType::DebtPayment => 0,
        GoalType::EmergencyFund => 1,
        GoalType::House => 2,
        GoalType::Vacation => 3,
        GoalType::Education => 4,
        GoalType::Investment => 5,
        GoalType::Retirement => 6,
        GoalType::Savings => 7,
    }
}

/// Resolves a set of tied candidates to a single winner.
///
/// Each step narrows the set; the first step that leaves exactly one
/// candidate decides. If every step exhausts, the lowest goal id wins so
/// the result is always deterministic. Returns the winner together with a
/// short description of the deciding rule for the audit reasoning.
///
/// Panics if called with an empty slice; the matcher only calls it with
/// the non-empty set tied at the maximum score.
pub fn resolve_tie<'a>(candidates: &[&'a GoalMatchScore]) -> (&'a GoalMatchScore, &'static str) {
    debug_assert!(!candidates.is_empty());

    // 1. A direct account/debt link beats heuristic matches.
    let linked: Vec<&GoalMatchScore> = candidates
        .iter()
        .copied()
        .filter(|c| c.scores.account_link > 0)
        .collect();
    let pool: Vec<&GoalMatchScore> = if linked.is_empty() {
        candidates.to_vec()
    } else if linked.len() == 1 {
        return (linked[0], "direct account link");
    } else {
        linked
    };

    // 2. Highest semantic sub-score.
    let best_semantic = pool.iter().map(|c| c.scores.semantic).max().unwrap_or(0);
    let pool: Vec<&GoalMatchScore> = pool
        .into_iter()
        .filter(|c| c.scores.semantic == best_semantic)
        .collect();
    if pool.len() == 1 {
        return (pool[0], "higher semantic score");
    }

    // 3. Highest keyword sub-score.
    let best_keywords = pool.iter().map(|c| c.scores.keywords).max().unwrap_or(0);
    let pool: Vec<&GoalMatchScore> = pool
        .into_iter()
        .filter(|c| c.scores.keywords == best_keywords)
        .collect();
    if pool.len() == 1 {
        return (pool[0], "higher keyword score");
    }

    // 4. Fixed goal-type priority ranking.
    let best_rank = pool
        .iter()
        .map(|c| goal_type_rank(c.goal_type))
        .min()
        .unwrap_or(u8::MAX);
    let pool: Vec<&GoalMatchScore> = pool
        .into_iter()
        .filter(|c| goal_type_rank(c.goal_type) == best_rank)
        .collect();
    if pool.len() == 1 {
        return (pool[0], "goal-type priority");
    }

    // 5. Stable fallback: lowest goal id.
    let winner = pool
        .into_iter()
        .min_by(|a, b| a.goal_id.cmp(&b.goal_id))
        .expect("tie-break pool is never empty");
    (winner, "lowest goal id")
}
