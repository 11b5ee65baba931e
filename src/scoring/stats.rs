use super::config::ScoringMethod;
use crate::model::Evaluation;
use serde::Serialize;
use std::collections::BTreeMap;

/// Scale factor making the MAD a consistent estimator of the standard
/// deviation under normality.
const MAD_CONSISTENCY: f64 = 1.4826;

/// One judge's personal scoring center and spread for one criterion,
/// derived from that judge's own submissions only. Ephemeral: recomputed
/// from scratch on every engine invocation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JudgeStatistic {
    pub judge_id: String,
    pub criterion_id: String,
    /// Mean (Z_SCORE) or median (ROBUST_MAD) of the judge's raw values.
    pub center: f64,
    /// Population stddev (Z_SCORE) or scaled MAD (ROBUST_MAD). Stored as 0
    /// for degenerate samples; a zero spread means every z-score for this
    /// (judge, criterion) pair is defined to be exactly 0.
    pub spread: f64,
    pub sample_count: usize,
}

/// Compute per-judge per-criterion statistics across all teams each judge
/// evaluated. Output is sorted by (judge_id, criterion_id).
pub fn compute_judge_statistics(
    evaluations: &[Evaluation],
    method: ScoringMethod,
) -> Vec<JudgeStatistic> {
    let mut samples: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
    for evaluation in evaluations {
        for (criterion_id, value) in &evaluation.scores {
            samples
                .entry((evaluation.judge_id.clone(), criterion_id.clone()))
                .or_default()
                .push(*value);
        }
    }

    samples
        .into_iter()
        .map(|((judge_id, criterion_id), values)| {
            let (center, spread) = center_and_spread(&values, method);
            JudgeStatistic {
                judge_id,
                criterion_id,
                center,
                spread,
                sample_count: values.len(),
            }
        })
        .collect()
}

/// Fast lookup over computed statistics, keyed by (judge_id, criterion_id).
#[derive(Debug)]
pub struct StatsIndex<'a> {
    by_key: BTreeMap<(&'a str, &'a str), &'a JudgeStatistic>,
}

impl<'a> StatsIndex<'a> {
    pub fn new(statistics: &'a [JudgeStatistic]) -> Self {
        let by_key = statistics
            .iter()
            .map(|s| ((s.judge_id.as_str(), s.criterion_id.as_str()), s))
            .collect();
        Self { by_key }
    }

    pub fn get(&self, judge_id: &str, criterion_id: &str) -> Option<&JudgeStatistic> {
        self.by_key.get(&(judge_id, criterion_id)).copied()
    }
}

fn center_and_spread(values: &[f64], method: ScoringMethod) -> (f64, f64) {
    // Fewer than 2 samples carries no spread information; neutral fallback.
    if values.len() < 2 {
        let center = values.first().copied().unwrap_or(0.0);
        return (center, 0.0);
    }
    match method {
        ScoringMethod::ZScore => {
            let center = mean(values);
            (center, population_stddev(values, center))
        }
        ScoringMethod::RobustMad => {
            let center = median(values);
            let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
            (center, MAD_CONSISTENCY * median(&deviations))
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population (not sample) standard deviation.
fn population_stddev(values: &[f64], center: f64) -> f64 {
    let variance = values
        .iter()
        .map(|v| (v - center) * (v - center))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
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

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(judge: &str, team: &str, scores: &[(&str, f64)]) -> Evaluation {
        Evaluation {
            judge_id: judge.to_string(),
            team_id: team.to_string(),
            round_id: "r1".to_string(),
            scores: scores
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            is_draft: false,
            submitted_at: None,
        }
    }

    #[test]
    fn test_z_score_center_and_spread() {
        let evaluations = vec![
            eval("j1", "t1", &[("c1", 80.0)]),
            eval("j1", "t2", &[("c1", 60.0)]),
            eval("j1", "t3", &[("c1", 70.0)]),
        ];
        let stats = compute_judge_statistics(&evaluations, ScoringMethod::ZScore);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].center, 70.0);
        // Population stddev of {80, 60, 70} = sqrt(200/3)
        assert!((stats[0].spread - (200.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(stats[0].sample_count, 3);
    }

    #[test]
    fn test_robust_mad_center_and_spread() {
        let evaluations = vec![
            eval("j1", "t1", &[("c1", 10.0)]),
            eval("j1", "t2", &[("c1", 20.0)]),
            eval("j1", "t3", &[("c1", 30.0)]),
            eval("j1", "t4", &[("c1", 90.0)]), // outlier
        ];
        let stats = compute_judge_statistics(&evaluations, ScoringMethod::RobustMad);
        // median of {10,20,30,90} = 25; |x-25| = {15,5,5,65}; median = 10
        assert_eq!(stats[0].center, 25.0);
        assert!((stats[0].spread - MAD_CONSISTENCY * 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_sample_is_degenerate() {
        let evaluations = vec![eval("j1", "t1", &[("c1", 42.0)])];
        let stats = compute_judge_statistics(&evaluations, ScoringMethod::ZScore);
        assert_eq!(stats[0].center, 42.0);
        assert_eq!(stats[0].spread, 0.0);
        assert_eq!(stats[0].sample_count, 1);
    }

    #[test]
    fn test_identical_values_give_zero_spread() {
        let evaluations = vec![
            eval("j1", "t1", &[("c1", 50.0)]),
            eval("j1", "t2", &[("c1", 50.0)]),
            eval("j1", "t3", &[("c1", 50.0)]),
        ];
        for method in [ScoringMethod::ZScore, ScoringMethod::RobustMad] {
            let stats = compute_judge_statistics(&evaluations, method);
            assert_eq!(stats[0].center, 50.0);
            assert_eq!(stats[0].spread, 0.0);
        }
    }

    #[test]
    fn test_judges_are_independent() {
        // A strict judge and a lenient judge each get their own center.
        let evaluations = vec![
            eval("j-strict", "t1", &[("c1", 40.0)]),
            eval("j-strict", "t2", &[("c1", 50.0)]),
            eval("j-lenient", "t1", &[("c1", 90.0)]),
            eval("j-lenient", "t2", &[("c1", 100.0)]),
        ];
        let stats = compute_judge_statistics(&evaluations, ScoringMethod::ZScore);
        assert_eq!(stats.len(), 2);
        // BTreeMap keying sorts j-lenient before j-strict
        assert_eq!(stats[0].judge_id, "j-lenient");
        assert_eq!(stats[0].center, 95.0);
        assert_eq!(stats[1].judge_id, "j-strict");
        assert_eq!(stats[1].center, 45.0);
    }

    #[test]
    fn test_criteria_are_independent() {
        let evaluations = vec![
            eval("j1", "t1", &[("c1", 10.0), ("c2", 1.0)]),
            eval("j1", "t2", &[("c1", 20.0), ("c2", 9.0)]),
        ];
        let stats = compute_judge_statistics(&evaluations, ScoringMethod::ZScore);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].criterion_id, "c1");
        assert_eq!(stats[0].center, 15.0);
        assert_eq!(stats[1].criterion_id, "c2");
        assert_eq!(stats[1].center, 5.0);
    }

    #[test]
    fn test_even_sample_median() {
        let evaluations = vec![
            eval("j1", "t1", &[("c1", 10.0)]),
            eval("j1", "t2", &[("c1", 20.0)]),
            eval("j1", "t3", &[("c1", 30.0)]),
            eval("j1", "t4", &[("c1", 40.0)]),
        ];
        let stats = compute_judge_statistics(&evaluations, ScoringMethod::RobustMad);
        assert_eq!(stats[0].center, 25.0);
    }

    #[test]
    fn test_stats_index_lookup() {
        let evaluations = vec![
            eval("j1", "t1", &[("c1", 10.0)]),
            eval("j1", "t2", &[("c1", 20.0)]),
        ];
        let stats = compute_judge_statistics(&evaluations, ScoringMethod::ZScore);
        let index = StatsIndex::new(&stats);
        assert!(index.get("j1", "c1").is_some());
        assert!(index.get("j1", "c2").is_none());
        assert!(index.get("j2", "c1").is_none());
    }
}
