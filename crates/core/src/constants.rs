use rust_decimal::Decimal;

/// Minimum total score a goal candidate must reach to qualify for a match.
pub const MATCH_SCORE_THRESHOLD: u32 = 25;

/// Maximum points awarded by the account-linking heuristic.
pub const ACCOUNT_LINK_SCORE: u32 = 40;

/// Cap for the keyword-relevance heuristic.
pub const KEYWORD_SCORE_CAP: u32 = 30;

/// Cap for the transaction-context heuristic.
pub const CONTEXT_SCORE_CAP: u32 = 20;

/// Cap for the semantic (AI) heuristic.
pub const SEMANTIC_SCORE_CAP: u32 = 10;

/// Goals with at least this much remaining get a quarterly milestone
/// schedule instead of a monthly one. Amounts are in the smallest
/// currency unit of the workspace, so this is deliberately large.
pub const LARGE_GOAL_THRESHOLD: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// Maximum number of quarterly milestones generated for a large goal.
pub const MAX_QUARTERLY_MILESTONES: u32 = 8;

/// Trailing window used for contribution-velocity calculations, in days.
pub const VELOCITY_WINDOW_DAYS: i64 = 90;

/// Progress percentages that trigger a one-time progress insight.
pub const PROGRESS_INSIGHT_THRESHOLDS: [u32; 3] = [25, 50, 75];

/// Upper bound on the semantic oracle call, in seconds.
pub const SEMANTIC_SCORER_TIMEOUT_SECS: u64 = 10;
