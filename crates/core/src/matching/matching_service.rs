use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use rust_decimal::Decimal;

use super::matching_errors::MatchError;
use super::matching_model::{
    CriteriaScores, GoalMatchResult, GoalMatchScore, MatchDecision, NewMatchAudit,
    TransactionContext,
};
use super::scoring;
use super::semantic::{SemanticRequest, SemanticScorer};
use super::tie_break::resolve_tie;
use crate::constants::{MATCH_SCORE_THRESHOLD, SEMANTIC_SCORE_CAP};
use crate::errors::Result;
use crate::goals::{Goal, GoalRepositoryTrait};
use crate::tracking::GoalProgressServiceTrait;

/// Decides, for a single transaction, which goal in the workspace (if any)
/// it should contribute to.
///
/// `find_best_goal_match` is a pure function of its inputs plus current
/// goal state: it performs no writes and is safe to call repeatedly.
/// `process_transaction` is the orchestration entry point used by the
/// transaction pipeline and is the only path with side effects.
pub struct GoalMatchService {
    goal_repository: Arc<dyn GoalRepositoryTrait>,
    semantic_scorer: Arc<dyn SemanticScorer>,
    progress_service: Arc<dyn GoalProgressServiceTrait>,
}

impl GoalMatchService {
    pub fn new(
        goal_repository: Arc<dyn GoalRepositoryTrait>,
        semantic_scorer: Arc<dyn SemanticScorer>,
        progress_service: Arc<dyn GoalProgressServiceTrait>,
    ) -> Self {
        GoalMatchService {
            goal_repository,
            semantic_scorer,
            progress_service,
        }
    }

    /// Scores one candidate goal against the transaction. The semantic
    /// oracle is consulted last and any failure degrades to a zero
    /// sub-score; matching never fails because the oracle did.
    async fn score_goal(&self, tx: &TransactionContext, goal: &Goal) -> GoalMatchScore {
        let account = scoring::score_account_link(tx, goal);
        let keywords = scoring::score_keywords(tx, goal);
        let context = scoring::score_context(tx, goal);

        let request = SemanticRequest {
            transaction_description: tx.description.clone(),
            transaction_amount: tx.amount,
            transaction_type: tx.transaction_type,
            goal_name: goal.name.clone(),
            goal_type: goal.goal_type,
            goal_description: goal.description.clone(),
        };
        let (semantic_points, semantic_factor) = match self.semantic_scorer.score(&request).await {
            Ok(verdict) => (
                (verdict.score as u32).min(SEMANTIC_SCORE_CAP),
                Some(format!("Semantic: {}", verdict.reasoning)),
            ),
            Err(err) => {
                debug!(
                    "Semantic score omitted for goal {} / transaction {}: {}",
                    goal.id, tx.id, err
                );
                (0, None)
            }
        };

        let scores = CriteriaScores {
            account_link: account.points,
            keywords: keywords.points,
            context: context.points,
            semantic: semantic_points,
        };

        let mut factors = Vec::new();
        factors.extend(account.factors);
        factors.extend(keywords.factors);
        factors.extend(context.factors);
        factors.extend(semantic_factor);

        let reasoning = if factors.is_empty() {
            format!("No matching factors for goal '{}'", goal.name)
        } else {
            factors.join("; ")
        };

        GoalMatchScore {
            goal_id: goal.id.clone(),
            goal_name: goal.name.clone(),
            goal_type: goal.goal_type,
            total_score: scores.total(),
            confidence: scoring::confidence(&scores),
            scores,
            matching_factors: factors,
            reasoning,
        }
    }

    /// Evaluates every eligible goal in the workspace and returns the
    /// decision plus a full audit trail. No side effects.
    pub async fn find_best_goal_match(
        &self,
        tx: &TransactionContext,
        workspace_id: &str,
    ) -> Result<GoalMatchResult> {
        if tx.amount <= Decimal::ZERO {
            return Err(MatchError::InvalidAmount(format!(
                "transaction {} has non-positive amount {}",
                tx.id, tx.amount
            ))
            .into());
        }

        let goals = self.goal_repository.list_auto_tracking_goals(workspace_id)?;
        if goals.is_empty() {
            return Ok(GoalMatchResult::no_match(
                "No active auto-tracking goals in this workspace",
                Vec::new(),
            ));
        }

        let mut candidates = Vec::with_capacity(goals.len());
        for goal in &goals {
            candidates.push(self.score_goal(tx, goal).await);
        }

        // Stable order: score descending, goal id ascending.
        candidates.sort_by(|a, b| {
            b.total_score
                .cmp(&a.total_score)
                .then_with(|| a.goal_id.cmp(&b.goal_id))
        });

        let top_score = candidates[0].total_score;
        if top_score < MATCH_SCORE_THRESHOLD {
            return Ok(GoalMatchResult::no_match(
                format!(
                    "No goal reached the qualification threshold of {} points; best candidate scored {}",
                    MATCH_SCORE_THRESHOLD, top_score
                ),
                candidates,
            ));
        }

        let tied: Vec<&GoalMatchScore> = candidates
            .iter()
            .filter(|c| c.total_score == top_score)
            .collect();

        let (selected, reasoning) = if tied.len() == 1 {
            let winner = tied[0].clone();
            let reasoning = format!(
                "Selected '{}' with {} points (confidence {:.2}): {}",
                winner.goal_name, winner.total_score, winner.confidence, winner.reasoning
            );
            (winner, reasoning)
        } else {
            let (winner, rule) = resolve_tie(&tied);
            let winner = winner.clone();
            let reasoning = format!(
                "Selected '{}' with {} points; tie between {} candidates broken by {}",
                winner.goal_name,
                winner.total_score,
                tied.len(),
                rule
            );
            (winner, reasoning)
        };

        debug!(
            "Matched transaction {} to goal {} ({} points)",
            tx.id, selected.goal_id, selected.total_score
        );

        Ok(GoalMatchResult {
            selected: Some(selected),
            candidates,
            decision: MatchDecision::Matched,
            reasoning,
        })
    }

    /// Pipeline entry point: evaluates the transaction, records one audit
    /// row per evaluation, and applies the contribution when the decision
    /// is a match and the transaction type represents a contribution.
    ///
    /// Application failures are audited and logged, never propagated: no
    /// user-facing request depends on goal matching succeeding.
    pub async fn process_transaction(
        &self,
        tx: &TransactionContext,
        workspace_id: &str,
    ) -> Result<GoalMatchResult> {
        let result = self.find_best_goal_match(tx, workspace_id).await?;

        let mut contribution_recorded = false;
        if let Some(selected) = &result.selected {
            if tx.transaction_type.is_contribution() {
                match self
                    .progress_service
                    .apply_matched_transaction(&selected.goal_id, tx)
                    .await
                {
                    Ok(outcome) => {
                        contribution_recorded = true;
                        info!(
                            "Applied transaction {} to goal {} (now {} of {})",
                            tx.id,
                            selected.goal_id,
                            outcome.goal.current_amount,
                            outcome.goal.target_amount
                        );
                    }
                    Err(err) => {
                        warn!(
                            "Matched transaction {} to goal {} but could not apply contribution: {}",
                            tx.id, selected.goal_id, err
                        );
                    }
                }
            } else {
                debug!(
                    "Transaction {} matched goal {} but type '{}' is not a contribution",
                    tx.id,
                    selected.goal_id,
                    tx.transaction_type.as_str()
                );
            }
        }

        let audit = NewMatchAudit {
            transaction_id: tx.id.clone(),
            workspace_id: workspace_id.to_string(),
            selected_goal_id: result.selected.as_ref().map(|s| s.goal_id.clone()),
            candidates: result.candidates.clone(),
            decision: result.decision,
            reasoning: result.reasoning.clone(),
            confidence: result.confidence(),
            total_score: result.total_score(),
            contribution_recorded,
        };
        self.goal_repository.insert_match_audit(audit).await?;

        Ok(result)
    }
}

/// Trait for match service operations.
#[async_trait]
pub trait GoalMatchServiceTrait: Send + Sync {
    async fn find_best_goal_match(
        &self,
        tx: &TransactionContext,
        workspace_id: &str,
    ) -> Result<GoalMatchResult>;

    async fn process_transaction(
        &self,
        tx: &TransactionContext,
        workspace_id: &str,
    ) -> Result<GoalMatchResult>;
}

#[async_trait]
impl GoalMatchServiceTrait for GoalMatchService {
    async fn find_best_goal_match(
        &self,
        tx: &TransactionContext,
        workspace_id: &str,
    ) -> Result<GoalMatchResult> {
        GoalMatchService::find_best_goal_match(self, tx, workspace_id).await
    }

    async fn process_transaction(
        &self,
        tx: &TransactionContext,
        workspace_id: &str,
    ) -> Result<GoalMatchResult> {
        GoalMatchService::process_transaction(self, tx, workspace_id).await
    }
}
