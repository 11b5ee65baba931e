pub mod aggregate;
pub mod config;
pub mod engine;
pub mod normalize;
pub mod rank;
pub mod selection;
pub mod stats;
pub mod validation;

pub use aggregate::{aggregate_by_team, AggregatedTeamResult};
pub use config::{ScoringConfig, ScoringMethod, SelectionConfig, SelectionMode, ALLOWED_TOP_N};
pub use engine::{compute_round, RoundComputation};
pub use normalize::{normalize_evaluations, NormalizedEvaluation};
pub use rank::{rank_teams, RankedResult, TieBreakerStep, TieBreakerTrace, EPSILON};
pub use selection::{
    execute_selection, promotion_records, JudgeBreakdown, PromotionRecord, SelectionParams,
    SelectionResult,
};
pub use stats::{compute_judge_statistics, JudgeStatistic, StatsIndex};
pub use validation::{
    validate_round, validate_scoring, validate_selection, RESERVED_SCORE_KEYS,
};
