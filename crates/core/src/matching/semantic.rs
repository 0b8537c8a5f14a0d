//! Semantic scoring capability.
//!
//! The AI relatedness check is modeled as a capability trait so the matcher
//! never depends on a concrete provider. Failure of any kind degrades to a
//! zero sub-score in the matcher; it must never fail an evaluation.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use super::matching_model::TransactionType;
use crate::goals::GoalType;

/// Input handed to the semantic oracle for one `(transaction, goal)` pair.
#[derive(Debug, Clone)]
pub struct SemanticRequest {
    pub transaction_description: String,
    pub transaction_amount: Decimal,
    pub transaction_type: TransactionType,
    pub goal_name: String,
    pub goal_type: GoalType,
    pub goal_description: Option<String>,
}

/// Oracle verdict: a 0..=10 relatedness score and a short justification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticScore {
    pub score: u8,
    pub reasoning: String,
}

/// Failures of the semantic oracle. All of them are non-fatal to matching.
#[derive(Error, Debug)]
pub enum SemanticError {
    #[error("Semantic scorer timed out")]
    Timeout,

    #[error("Semantic scorer is not configured")]
    Unavailable,

    #[error("Semantic provider error: {0}")]
    Provider(String),

    #[error("Malformed semantic response: {0}")]
    MalformedResponse(String),
}

/// Rates semantic relatedness between a transaction description and a
/// goal's name/type/description on a 0..=10 scale.
#[async_trait]
pub trait SemanticScorer: Send + Sync {
    async fn score(
        &self,
        request: &SemanticRequest,
    ) -> std::result::Result<SemanticScore, SemanticError>;
}

/// Scorer used when no AI provider is configured. Matching proceeds on the
/// remaining three heuristics.
pub struct NullSemanticScorer;

#[async_trait]
impl SemanticScorer for NullSemanticScorer {
    async fn score(
        &self,
        _request: &SemanticRequest,
    ) -> std::result::Result<SemanticScore, SemanticError> {
        Err(SemanticError::Unavailable)
    }
}

/// Deterministic stub returning a fixed score. Test helper.
pub struct FixedSemanticScorer {
    pub score: u8,
    pub reasoning: String,
}

impl FixedSemanticScorer {
    pub fn new(score: u8) -> Self {
        FixedSemanticScorer {
            score,
            reasoning: format!("fixed semantic score {}", score),
        }
    }
}

#[async_trait]
impl SemanticScorer for FixedSemanticScorer {
    async fn score(
        &self,
        _request: &SemanticRequest,
    ) -> std::result::Result<SemanticScore, SemanticError> {
        Ok(SemanticScore {
            score: self.score,
            reasoning: self.reasoning.clone(),
        })
    }
}

/// Stub that always fails. Test helper for degraded-oracle behavior.
pub struct FailingSemanticScorer;

#[async_trait]
impl SemanticScorer for FailingSemanticScorer {
    async fn score(
        &self,
        _request: &SemanticRequest,
    ) -> std::result::Result<SemanticScore, SemanticError> {
        Err(SemanticError::Provider("simulated outage".to_string()))
    }
}
