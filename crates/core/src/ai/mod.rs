//! AI integration - the HTTP-backed semantic scorer.

mod http_scorer;

pub use http_scorer::{HttpScorerConfig, HttpSemanticScorer};
