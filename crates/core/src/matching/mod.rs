//! Goal matching - scoring heuristics, tie-breaking, and the match service.

mod matching_errors;
mod matching_model;
mod matching_service;
pub mod scoring;
mod semantic;
mod tie_break;

#[cfg(test)]
mod matching_service_tests;

pub use matching_errors::MatchError;
pub use matching_model::{
    CriteriaScores, GoalMatchAudit, GoalMatchResult, GoalMatchScore, MatchDecision, NewMatchAudit,
    TransactionContext, TransactionType,
};
pub use matching_service::{GoalMatchService, GoalMatchServiceTrait};
pub use semantic::{
    FailingSemanticScorer, FixedSemanticScorer, NullSemanticScorer, SemanticError, SemanticRequest,
    SemanticScore, SemanticScorer,
};
pub use tie_break::{goal_type_rank, resolve_tie};
