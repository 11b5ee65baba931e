use super::stats::StatsIndex;
use crate::model::{Criterion, Evaluation};
use serde::Serialize;
use std::collections::BTreeMap;

/// One evaluation after judge-bias correction. Derived, ephemeral.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NormalizedEvaluation {
    pub judge_id: String,
    pub team_id: String,
    /// Weighted z-score per criterion the judge scored. Kept per criterion
    /// for the tie-break cascade. A zero-spread (judge, criterion) pair
    /// contributes exactly 0.
    pub per_criterion_weighted_z: BTreeMap<String, f64>,
    /// Sum of the weighted z-scores. Deliberately not divided by criterion
    /// count or weight sum: magnitude scales with how many criteria the
    /// judge scored and how heavily they are weighted.
    pub judge_total: f64,
    /// Plain sum of the raw marks, before normalization.
    pub raw_total: f64,
}

/// Convert every evaluation's raw scores into weighted, judge-corrected
/// values. Output is sorted by (team_id, judge_id) regardless of input order.
pub fn normalize_evaluations(
    evaluations: &[Evaluation],
    criteria: &[Criterion],
    stats: &StatsIndex<'_>,
) -> Vec<NormalizedEvaluation> {
    let weights: BTreeMap<&str, f64> = criteria
        .iter()
        .map(|c| (c.id.as_str(), c.weight))
        .collect();

    let mut normalized: Vec<NormalizedEvaluation> = evaluations
        .iter()
        .map(|evaluation| {
            let mut per_criterion_weighted_z = BTreeMap::new();
            let mut judge_total = 0.0;
            let mut raw_total = 0.0;

            for (criterion_id, score) in &evaluation.scores {
                raw_total += score;
                let weight = weights.get(criterion_id.as_str()).copied().unwrap_or(0.0);
                let weighted_z = match stats.get(&evaluation.judge_id, criterion_id) {
                    Some(stat) if stat.spread > 0.0 => {
                        (score - stat.center) / stat.spread * weight
                    }
                    // Degenerate spread: neutral contribution, never NaN.
                    _ => 0.0,
                };
                per_criterion_weighted_z.insert(criterion_id.clone(), weighted_z);
                judge_total += weighted_z;
            }

            NormalizedEvaluation {
                judge_id: evaluation.judge_id.clone(),
                team_id: evaluation.team_id.clone(),
                per_criterion_weighted_z,
                judge_total,
                raw_total,
            }
        })
        .collect();

    normalized.sort_by(|a, b| {
        a.team_id
            .cmp(&b.team_id)
            .then_with(|| a.judge_id.cmp(&b.judge_id))
    });
    normalized
}
