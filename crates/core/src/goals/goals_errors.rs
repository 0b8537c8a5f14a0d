use thiserror::Error;

/// Goal-domain errors.
#[derive(Error, Debug)]
pub enum GoalError {
    #[error("Invalid goal: {0}")]
    InvalidGoal(String),

    #[error("Invalid contribution: {0}")]
    InvalidContribution(String),

    #[error("Goal '{goal_id}' already has a contribution for transaction '{transaction_id}'")]
    DuplicateContribution {
        goal_id: String,
        transaction_id: String,
    },

    #[error("Goal '{0}' does not have auto-tracking enabled")]
    AutoTrackingDisabled(String),

    #[error("Goal '{0}' already has milestones")]
    MilestonesExist(String),
}
