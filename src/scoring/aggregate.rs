use super::config::ScoringConfig;
use super::normalize::NormalizedEvaluation;
use serde::Serialize;
use std::collections::BTreeMap;

/// A team's combined normalized result across every judge who scored it.
/// Derived, ephemeral.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AggregatedTeamResult {
    pub team_id: String,
    /// Judge-weighted mean of the judges' normalized totals:
    /// `Σ w_j * judge_total_j / Σ w_j`. A mean (not a sum) so a team seen
    /// by more judges gains nothing from coverage alone.
    pub aggregated_score: f64,
    pub judge_count: usize,
    /// Per-criterion weighted z summed across judges. Tie-break signal.
    pub per_criterion_aggregate: BTreeMap<String, f64>,
    /// Mean of the judges' raw totals. Fallback tie-break signal.
    pub mean_raw_total: f64,
    /// Median of the judges' raw totals. Fallback tie-break signal.
    pub median_raw_total: f64,
}

/// Group normalized evaluations by team and combine them. Output is sorted
/// by team_id.
pub fn aggregate_by_team(
    normalized: &[NormalizedEvaluation],
    config: &ScoringConfig,
) -> Vec<AggregatedTeamResult> {
    let mut by_team: BTreeMap<&str, Vec<&NormalizedEvaluation>> = BTreeMap::new();
    for evaluation in normalized {
        by_team
            .entry(evaluation.team_id.as_str())
            .or_default()
            .push(evaluation);
    }

    by_team
        .into_iter()
        .map(|(team_id, evaluations)| {
            let mut weighted_sum = 0.0;
            let mut weight_sum = 0.0;
            let mut per_criterion_aggregate: BTreeMap<String, f64> = BTreeMap::new();
            let mut raw_totals = Vec::with_capacity(evaluations.len());

            for evaluation in &evaluations {
                let weight = config.judge_weight(&evaluation.judge_id);
                weighted_sum += weight * evaluation.judge_total;
                weight_sum += weight;
                raw_totals.push(evaluation.raw_total);
                for (criterion_id, weighted_z) in &evaluation.per_criterion_weighted_z {
                    *per_criterion_aggregate
                        .entry(criterion_id.clone())
                        .or_insert(0.0) += weighted_z;
                }
            }

            // weight_sum > 0: validation guarantees positive judge weights
            // and every team here has at least one evaluation.
            AggregatedTeamResult {
                team_id: team_id.to_string(),
                aggregated_score: weighted_sum / weight_sum,
                judge_count: evaluations.len(),
                per_criterion_aggregate,
                mean_raw_total: mean(&raw_totals),
                median_raw_total: median(&raw_totals),
            }
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
