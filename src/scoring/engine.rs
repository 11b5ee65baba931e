use super::aggregate::{aggregate_by_team, AggregatedTeamResult};
use super::config::ScoringConfig;
use super::normalize::{normalize_evaluations, NormalizedEvaluation};
use super::rank::{rank_teams, RankedResult};
use super::stats::{compute_judge_statistics, JudgeStatistic, StatsIndex};
use super::validation::{validate_round, validate_scoring};
use crate::model::RoundSnapshot;
use serde::Serialize;

/// Every derived row for one round, produced by one pipeline invocation.
///
/// This is a full replacement set: callers persisting it must delete all
/// prior derived rows for the round and insert these, never patch. Two
/// concurrent computations of the *same* round can race at that boundary,
/// so the calling orchestrator must serialize recomputation per round
/// (advisory lock or single-writer queue); this library takes no locks.
/// Different rounds share no state and may be computed concurrently.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoundComputation {
    pub round_id: String,
    pub statistics: Vec<JudgeStatistic>,
    pub normalized: Vec<NormalizedEvaluation>,
    pub aggregated: Vec<AggregatedTeamResult>,
    pub ranked: Vec<RankedResult>,
}

/// Run the whole pipeline over an in-memory snapshot: validate, derive
/// per-judge statistics, normalize, aggregate, rank.
///
/// Pure and deterministic: identical (evaluations, criteria, method,
/// judge_weights) always yields identical output, regardless of input
/// ordering. Any validation failure aborts before any derived row exists.
/// Returns all validation errors at once (not just the first).
pub fn compute_round(
    snapshot: &RoundSnapshot,
    config: &ScoringConfig,
) -> Result<RoundComputation, Vec<String>> {
    let mut errors = Vec::new();
    if let Err(e) = validate_scoring(config) {
        errors.extend(e);
    }
    if let Err(e) = validate_round(&snapshot.criteria, &snapshot.evaluations) {
        errors.extend(e);
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let statistics = compute_judge_statistics(&snapshot.evaluations, config.method);
    let index = StatsIndex::new(&statistics);
    let normalized = normalize_evaluations(&snapshot.evaluations, &snapshot.criteria, &index);
    let aggregated = aggregate_by_team(&normalized, config);
    let ranked = rank_teams(&aggregated, &snapshot.criteria);

    Ok(RoundComputation {
        round_id: snapshot.round_id.clone(),
        statistics,
        normalized,
        aggregated,
        ranked,
    })
}
