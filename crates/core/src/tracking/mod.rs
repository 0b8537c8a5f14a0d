//! Progress tracking - contribution application, milestone scheduling, and
//! insight emission.

pub mod insight_emitter;
pub mod milestone_generator;
mod progress;
mod tracking_service;

#[cfg(test)]
mod tracking_service_tests;

pub use milestone_generator::{build_milestone_schedule, months_remaining};
pub use progress::{plan_progress, ContributionOutcome, ProgressPlan};
pub use tracking_service::{GoalProgressService, GoalProgressServiceTrait};
