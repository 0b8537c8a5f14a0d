use thiserror::Error;

/// Errors raised while evaluating a transaction against a workspace's goals.
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Invalid transaction amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
}
