use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::constants::{ACCOUNT_LINK_SCORE, MATCH_SCORE_THRESHOLD};
use crate::errors::{Error, Result};
use crate::goals::{
    ContributionType, Goal, GoalContribution, GoalError, GoalInsight, GoalMilestone, GoalPriority,
    GoalRepositoryTrait, GoalStatus, GoalType, GoalUpdate, NewContribution, NewGoal, NewInsight,
    NewMilestone,
};
use crate::matching::{
    FailingSemanticScorer, FixedSemanticScorer, GoalMatchAudit, GoalMatchService, MatchDecision,
    MatchError, NewMatchAudit, NullSemanticScorer, SemanticScorer, TransactionContext,
    TransactionType,
};
use crate::tracking::{ContributionOutcome, GoalProgressServiceTrait};

// ============== Mocks ==============

#[derive(Default)]
struct MockGoalRepository {
    goals: Vec<Goal>,
    audits: Mutex<Vec<GoalMatchAudit>>,
}

impl MockGoalRepository {
    fn with_goals(goals: Vec<Goal>) -> Self {
        MockGoalRepository {
            goals,
            audits: Mutex::new(Vec::new()),
        }
    }

    fn audits(&self) -> Vec<GoalMatchAudit> {
        self.audits.lock().unwrap().clone()
    }
}

#[async_trait]
impl GoalRepositoryTrait for MockGoalRepository {
    fn get_goal(&self, _goal_id: &str) -> Result<Goal> {
        unimplemented!()
    }

    fn list_goals(&self, _workspace_id: &str) -> Result<Vec<Goal>> {
        unimplemented!()
    }

    fn list_auto_tracking_goals(&self, workspace_id: &str) -> Result<Vec<Goal>> {
        Ok(self
            .goals
            .iter()
            .filter(|g| {
                g.workspace_id == workspace_id
                    && g.is_auto_tracking
                    && g.status == GoalStatus::Active
            })
            .cloned()
            .collect())
    }

    async fn insert_goal(&self, _new_goal: NewGoal) -> Result<Goal> {
        unimplemented!()
    }

    async fn update_goal(&self, _update: GoalUpdate) -> Result<Goal> {
        unimplemented!()
    }

    async fn delete_goal(&self, _goal_id: &str) -> Result<usize> {
        unimplemented!()
    }

    fn list_contributions(&self, _goal_id: &str) -> Result<Vec<GoalContribution>> {
        unimplemented!()
    }

    fn list_contributions_since(
        &self,
        _goal_id: &str,
        _since: DateTime<Utc>,
    ) -> Result<Vec<GoalContribution>> {
        unimplemented!()
    }

    async fn apply_contribution(
        &self,
        _goal_id: &str,
        _contribution: NewContribution,
    ) -> Result<ContributionOutcome> {
        unimplemented!()
    }

    fn list_milestones(&self, _goal_id: &str) -> Result<Vec<GoalMilestone>> {
        unimplemented!()
    }

    async fn insert_milestones(
        &self,
        _goal_id: &str,
        _milestones: Vec<NewMilestone>,
    ) -> Result<Vec<GoalMilestone>> {
        unimplemented!()
    }

    fn list_insights(&self, _workspace_id: &str, _unread_only: bool) -> Result<Vec<GoalInsight>> {
        unimplemented!()
    }

    async fn insert_insight(&self, _insight: NewInsight) -> Result<GoalInsight> {
        unimplemented!()
    }

    async fn mark_insight_read(&self, _insight_id: &str) -> Result<GoalInsight> {
        unimplemented!()
    }

    async fn insert_match_audit(&self, audit: NewMatchAudit) -> Result<GoalMatchAudit> {
        let recorded = GoalMatchAudit {
            id: Uuid::new_v4().to_string(),
            transaction_id: audit.transaction_id,
            workspace_id: audit.workspace_id,
            selected_goal_id: audit.selected_goal_id,
            candidates: audit.candidates,
            decision: audit.decision,
            reasoning: audit.reasoning,
            confidence: audit.confidence,
            total_score: audit.total_score,
            contribution_recorded: audit.contribution_recorded,
            created_at: Utc::now(),
        };
        self.audits.lock().unwrap().push(recorded.clone());
        Ok(recorded)
    }

    fn list_match_audits(&self, _workspace_id: &str) -> Result<Vec<GoalMatchAudit>> {
        Ok(self.audits())
    }
}

/// Records the goal ids that contributions were applied to, optionally
/// failing every application.
#[derive(Default)]
struct MockProgressService {
    fail: bool,
    applied: Mutex<Vec<String>>,
}

impl MockProgressService {
    fn failing() -> Self {
        MockProgressService {
            fail: true,
            applied: Mutex::new(Vec::new()),
        }
    }

    fn applied(&self) -> Vec<String> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait]
impl GoalProgressServiceTrait for MockProgressService {
    async fn apply_matched_transaction(
        &self,
        goal_id: &str,
        tx: &TransactionContext,
    ) -> Result<ContributionOutcome> {
        if self.fail {
            return Err(GoalError::AutoTrackingDisabled(goal_id.to_string()).into());
        }
        self.applied.lock().unwrap().push(goal_id.to_string());
        let goal = goal(goal_id, "Applied", GoalType::Savings, None);
        let contribution = GoalContribution {
            id: Uuid::new_v4().to_string(),
            goal_id: goal_id.to_string(),
            workspace_id: "ws-1".to_string(),
            transaction_id: Some(tx.id.clone()),
            amount: tx.amount,
            contribution_type: ContributionType::Transaction,
            source: tx.description.clone(),
            contribution_date: tx.date,
            created_at: Utc::now(),
        };
        Ok(ContributionOutcome {
            previous_amount: goal.current_amount,
            new_amount: goal.current_amount + tx.amount,
            completed_now: false,
            completed_milestones: Vec::new(),
            goal,
            contribution,
        })
    }

    async fn add_manual_contribution(
        &self,
        _goal_id: &str,
        _amount: Decimal,
        _source: &str,
        _date: DateTime<Utc>,
    ) -> Result<ContributionOutcome> {
        unimplemented!()
    }

    async fn generate_milestones(&self, _goal_id: &str) -> Result<Vec<GoalMilestone>> {
        unimplemented!()
    }
}

// ============== Fixtures ==============

fn goal(id: &str, name: &str, goal_type: GoalType, linked_account_id: Option<&str>) -> Goal {
    let now = Utc::now();
    Goal {
        id: id.to_string(),
        workspace_id: "ws-1".to_string(),
        name: name.to_string(),
        description: None,
        goal_type,
        target_amount: dec!(30_000_000),
        current_amount: dec!(5_000_000),
        target_date: now + Duration::days(365),
        linked_account_id: linked_account_id.map(str::to_string),
        linked_debt_id: None,
        is_auto_tracking: true,
        monthly_contribution: None,
        priority: GoalPriority::Medium,
        status: GoalStatus::Active,
        completed_at: None,
        created_at: now,
        updated_at: now,
    }
}

fn transaction(description: &str, amount: Decimal, tx_type: TransactionType) -> TransactionContext {
    TransactionContext {
        id: "tx-1".to_string(),
        description: description.to_string(),
        amount,
        transaction_type: tx_type,
        account_id: "acc-main".to_string(),
        debt_id: None,
        category: None,
        date: Utc::now(),
    }
}

fn service(
    repo: Arc<MockGoalRepository>,
    scorer: Arc<dyn SemanticScorer>,
    progress: Arc<MockProgressService>,
) -> GoalMatchService {
    GoalMatchService::new(repo, scorer, progress)
}

// ============== find_best_goal_match ==============

#[tokio::test]
async fn transfer_into_linked_account_matches_that_goal() {
    let repo = Arc::new(MockGoalRepository::with_goals(vec![
        goal("g-fund", "Emergency Fund", GoalType::EmergencyFund, Some("acc-7")),
        goal("g-car", "New car", GoalType::Investment, None),
    ]));
    let svc = service(
        repo,
        Arc::new(NullSemanticScorer),
        Arc::new(MockProgressService::default()),
    );

    let mut tx = transaction("Scheduled transfer", dec!(2_000_000), TransactionType::Transfer);
    tx.account_id = "acc-7".to_string();

    let result = svc.find_best_goal_match(&tx, "ws-1").await.unwrap();
    assert_eq!(result.decision, MatchDecision::Matched);
    let selected = result.selected.unwrap();
    assert_eq!(selected.goal_id, "g-fund");
    assert_eq!(selected.scores.account_link, ACCOUNT_LINK_SCORE);
    // Direct account link alone puts confidence well past the raw score.
    assert!(selected.confidence > 0.5);
    assert_eq!(result.candidates.len(), 2);
}

#[tokio::test]
async fn keyword_overlap_matches_without_an_account_link() {
    let repo = Arc::new(MockGoalRepository::with_goals(vec![
        goal("g-bali", "Bali Vacation", GoalType::Vacation, None),
        goal("g-rainy", "Rainy day", GoalType::Savings, None),
    ]));
    let svc = service(
        repo,
        Arc::new(NullSemanticScorer),
        Arc::new(MockProgressService::default()),
    );

    // "trip" hits the vacation dictionary, "bali" hits the goal name.
    let tx = transaction("Bali trip deposit", dec!(3_000_000), TransactionType::Transfer);
    let result = svc.find_best_goal_match(&tx, "ws-1").await.unwrap();

    assert_eq!(result.decision, MatchDecision::Matched);
    let selected = result.selected.unwrap();
    assert_eq!(selected.goal_id, "g-bali");
    assert_eq!(selected.scores.account_link, 0);
    assert!(selected.scores.keywords >= 18);
}

#[tokio::test]
async fn no_goals_yields_no_match_with_empty_candidates() {
    let repo = Arc::new(MockGoalRepository::default());
    let svc = service(
        repo,
        Arc::new(NullSemanticScorer),
        Arc::new(MockProgressService::default()),
    );

    let tx = transaction("Anything", dec!(100), TransactionType::Income);
    let result = svc.find_best_goal_match(&tx, "ws-1").await.unwrap();
    assert_eq!(result.decision, MatchDecision::NoMatch);
    assert!(result.selected.is_none());
    assert!(result.candidates.is_empty());
}

#[tokio::test]
async fn below_threshold_candidates_are_kept_but_nothing_is_selected() {
    let repo = Arc::new(MockGoalRepository::with_goals(vec![goal(
        "g-house",
        "House fund",
        GoalType::House,
        None,
    )]));
    let svc = service(
        repo,
        Arc::new(NullSemanticScorer),
        Arc::new(MockProgressService::default()),
    );

    // Unrelated description, no link, tiny amount: nothing qualifies.
    let tx = transaction("Grocery run", dec!(50), TransactionType::Expense);
    let result = svc.find_best_goal_match(&tx, "ws-1").await.unwrap();

    assert_eq!(result.decision, MatchDecision::NoMatch);
    assert!(result.selected.is_none());
    assert_eq!(result.candidates.len(), 1);
    assert!(result.candidates[0].total_score < MATCH_SCORE_THRESHOLD);
    assert!(result
        .reasoning
        .contains(&MATCH_SCORE_THRESHOLD.to_string()));
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let repo = Arc::new(MockGoalRepository::default());
    let svc = service(
        repo,
        Arc::new(NullSemanticScorer),
        Arc::new(MockProgressService::default()),
    );

    for amount in [dec!(0), dec!(-100)] {
        let tx = transaction("Refund", amount, TransactionType::Income);
        let err = svc.find_best_goal_match(&tx, "ws-1").await.unwrap_err();
        assert!(matches!(err, Error::Matching(MatchError::InvalidAmount(_))));
    }
}

#[tokio::test]
async fn equal_scores_are_broken_by_lowest_goal_id() {
    // Identical goals except for id: every sub-score ties, so the final
    // tie-break rule decides.
    let repo = Arc::new(MockGoalRepository::with_goals(vec![
        goal("g-b", "Second fund", GoalType::EmergencyFund, Some("acc-7")),
        goal("g-a", "First fund", GoalType::EmergencyFund, Some("acc-7")),
    ]));
    let svc = service(
        repo,
        Arc::new(NullSemanticScorer),
        Arc::new(MockProgressService::default()),
    );

    let mut tx = transaction("Scheduled transfer", dec!(2_000_000), TransactionType::Transfer);
    tx.account_id = "acc-7".to_string();

    let result = svc.find_best_goal_match(&tx, "ws-1").await.unwrap();
    assert_eq!(result.selected.unwrap().goal_id, "g-a");
    assert!(result.reasoning.contains("broken by lowest goal id"));
}

#[tokio::test]
async fn repeated_evaluation_is_deterministic() {
    let repo = Arc::new(MockGoalRepository::with_goals(vec![
        goal("g-bali", "Bali Vacation", GoalType::Vacation, None),
        goal("g-fund", "Emergency Fund", GoalType::EmergencyFund, Some("acc-7")),
        goal("g-rainy", "Rainy day", GoalType::Savings, None),
    ]));
    let svc = service(
        repo,
        Arc::new(FixedSemanticScorer::new(6)),
        Arc::new(MockProgressService::default()),
    );

    let tx = transaction("Bali trip deposit", dec!(3_000_000), TransactionType::Transfer);
    let first = svc.find_best_goal_match(&tx, "ws-1").await.unwrap();
    let second = svc.find_best_goal_match(&tx, "ws-1").await.unwrap();

    assert_eq!(first.decision, second.decision);
    assert_eq!(
        first.selected.as_ref().map(|s| &s.goal_id),
        second.selected.as_ref().map(|s| &s.goal_id)
    );
    assert_eq!(first.reasoning, second.reasoning);
    let first_ids: Vec<_> = first.candidates.iter().map(|c| &c.goal_id).collect();
    let second_ids: Vec<_> = second.candidates.iter().map(|c| &c.goal_id).collect();
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn oracle_failure_degrades_to_the_null_scorer_result() {
    let goals = vec![
        goal("g-fund", "Emergency Fund", GoalType::EmergencyFund, Some("acc-7")),
        goal("g-car", "New car", GoalType::Investment, None),
    ];
    let mut tx = transaction("Scheduled transfer", dec!(2_000_000), TransactionType::Transfer);
    tx.account_id = "acc-7".to_string();

    let with_failing = service(
        Arc::new(MockGoalRepository::with_goals(goals.clone())),
        Arc::new(FailingSemanticScorer),
        Arc::new(MockProgressService::default()),
    );
    let with_null = service(
        Arc::new(MockGoalRepository::with_goals(goals)),
        Arc::new(NullSemanticScorer),
        Arc::new(MockProgressService::default()),
    );

    let failing = with_failing.find_best_goal_match(&tx, "ws-1").await.unwrap();
    let null = with_null.find_best_goal_match(&tx, "ws-1").await.unwrap();

    assert_eq!(failing.decision, null.decision);
    assert_eq!(failing.total_score(), null.total_score());
    assert_eq!(
        failing.selected.as_ref().map(|s| &s.goal_id),
        null.selected.as_ref().map(|s| &s.goal_id)
    );
    assert_eq!(failing.selected.unwrap().scores.semantic, 0);
}

// ============== process_transaction ==============

#[tokio::test]
async fn process_transaction_applies_and_audits_a_contribution() {
    let repo = Arc::new(MockGoalRepository::with_goals(vec![goal(
        "g-fund",
        "Emergency Fund",
        GoalType::EmergencyFund,
        Some("acc-7"),
    )]));
    let progress = Arc::new(MockProgressService::default());
    let svc = service(repo.clone(), Arc::new(NullSemanticScorer), progress.clone());

    let mut tx = transaction("Scheduled transfer", dec!(2_000_000), TransactionType::Transfer);
    tx.account_id = "acc-7".to_string();

    let result = svc.process_transaction(&tx, "ws-1").await.unwrap();
    assert_eq!(result.decision, MatchDecision::Matched);
    assert_eq!(progress.applied(), vec!["g-fund".to_string()]);

    let audits = repo.audits();
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].transaction_id, "tx-1");
    assert_eq!(audits[0].selected_goal_id.as_deref(), Some("g-fund"));
    assert!(audits[0].contribution_recorded);
    assert_eq!(audits[0].candidates.len(), 1);
}

#[tokio::test]
async fn matched_expense_is_audited_but_never_applied() {
    let repo = Arc::new(MockGoalRepository::with_goals(vec![goal(
        "g-bali",
        "Bali Vacation",
        GoalType::Vacation,
        None,
    )]));
    let progress = Arc::new(MockProgressService::default());
    let svc = service(repo.clone(), Arc::new(NullSemanticScorer), progress.clone());

    // Expenses can match (vacation spending is related) but must not
    // move the goal balance.
    let tx = transaction("Bali trip deposit", dec!(3_000_000), TransactionType::Expense);
    let result = svc.process_transaction(&tx, "ws-1").await.unwrap();

    assert_eq!(result.decision, MatchDecision::Matched);
    assert!(progress.applied().is_empty());
    let audits = repo.audits();
    assert_eq!(audits.len(), 1);
    assert!(!audits[0].contribution_recorded);
}

#[tokio::test]
async fn failed_application_still_records_the_audit() {
    let repo = Arc::new(MockGoalRepository::with_goals(vec![goal(
        "g-fund",
        "Emergency Fund",
        GoalType::EmergencyFund,
        Some("acc-7"),
    )]));
    let progress = Arc::new(MockProgressService::failing());
    let svc = service(repo.clone(), Arc::new(NullSemanticScorer), progress);

    let mut tx = transaction("Scheduled transfer", dec!(2_000_000), TransactionType::Transfer);
    tx.account_id = "acc-7".to_string();

    let result = svc.process_transaction(&tx, "ws-1").await.unwrap();
    assert_eq!(result.decision, MatchDecision::Matched);

    let audits = repo.audits();
    assert_eq!(audits.len(), 1);
    assert!(!audits[0].contribution_recorded);
}

#[tokio::test]
async fn no_match_is_audited_with_no_selected_goal() {
    let repo = Arc::new(MockGoalRepository::default());
    let svc = service(
        repo.clone(),
        Arc::new(NullSemanticScorer),
        Arc::new(MockProgressService::default()),
    );

    let tx = transaction("Anything", dec!(100), TransactionType::Income);
    let result = svc.process_transaction(&tx, "ws-1").await.unwrap();
    assert_eq!(result.decision, MatchDecision::NoMatch);

    let audits = repo.audits();
    assert_eq!(audits.len(), 1);
    assert!(audits[0].selected_goal_id.is_none());
    assert_eq!(audits[0].decision, MatchDecision::NoMatch);
    assert_eq!(audits[0].total_score, 0);
}
