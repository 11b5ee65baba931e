use super::config::{ScoringConfig, SelectionConfig, SelectionMode, ALLOWED_TOP_N};
use crate::model::{Criterion, Evaluation};
use std::collections::BTreeSet;

/// Score keys the engine computes itself. Input carrying any of these is
/// rejected outright: callers must never smuggle in pre-computed values.
pub const RESERVED_SCORE_KEYS: [&str; 10] = [
    "z_score",
    "weighted_z",
    "rank",
    "percentile",
    "mean",
    "median",
    "std",
    "mad",
    "total",
    "aggregated_score",
];

/// Validate raw engine input before any statistics are derived.
/// Returns all validation errors at once (not just the first).
pub fn validate_round(
    criteria: &[Criterion],
    evaluations: &[Evaluation],
) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if criteria.is_empty() {
        errors.push("criteria: must not be empty".to_string());
    }
    if evaluations.is_empty() {
        errors.push("evaluations: must not be empty".to_string());
    }

    let mut criterion_ids = BTreeSet::new();
    for (i, criterion) in criteria.iter().enumerate() {
        if !criterion_ids.insert(criterion.id.as_str()) {
            errors.push(format!("criteria[{}]: duplicate id '{}'", i, criterion.id));
        }
        if !(criterion.max_marks > 0.0) || !criterion.max_marks.is_finite() {
            errors.push(format!(
                "criteria[{}].max_marks: must be a finite number > 0, got {}",
                i, criterion.max_marks
            ));
        }
        if !(criterion.weight > 0.0) || !criterion.weight.is_finite() {
            errors.push(format!(
                "criteria[{}].weight: must be a finite number > 0, got {}",
                i, criterion.weight
            ));
        }
    }

    let mut seen_submissions = BTreeSet::new();
    for (i, evaluation) in evaluations.iter().enumerate() {
        if evaluation.is_draft {
            errors.push(format!(
                "evaluations[{}]: draft evaluation for team '{}' by judge '{}' is not valid input",
                i, evaluation.team_id, evaluation.judge_id
            ));
        }
        if !seen_submissions.insert((evaluation.judge_id.as_str(), evaluation.team_id.as_str())) {
            errors.push(format!(
                "evaluations[{}]: duplicate submission by judge '{}' for team '{}'",
                i, evaluation.judge_id, evaluation.team_id
            ));
        }
        for (key, value) in &evaluation.scores {
            if RESERVED_SCORE_KEYS.contains(&key.as_str()) {
                errors.push(format!(
                    "evaluations[{}].scores.{}: reserved computed-field name not accepted as input",
                    i, key
                ));
                continue;
            }
            let criterion = criteria.iter().find(|c| c.id == *key);
            let Some(criterion) = criterion else {
                errors.push(format!(
                    "evaluations[{}].scores.{}: unknown criterion id",
                    i, key
                ));
                continue;
            };
            if !value.is_finite() {
                errors.push(format!(
                    "evaluations[{}].scores.{}: must be a finite number, got {}",
                    i, key, value
                ));
            } else if *value < 0.0 || *value > criterion.max_marks {
                errors.push(format!(
                    "evaluations[{}].scores.{}: {} is outside [0, {}]",
                    i, key, value, criterion.max_marks
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (judge_id, weight) in &config.judge_weights {
        if !weight.is_finite() || *weight <= 0.0 {
            errors.push(format!(
                "scoring.judge_weights.{}: must be a finite number > 0, got {}",
                judge_id, weight
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate selection configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_selection(config: &SelectionConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    match config.mode {
        SelectionMode::PerJudgeTopN => match config.top_n {
            None => errors.push("selection.top_n: required for mode PER_JUDGE_TOP_N".to_string()),
            Some(n) if !ALLOWED_TOP_N.contains(&n) => errors.push(format!(
                "selection.top_n: must be one of {:?}, got {}",
                ALLOWED_TOP_N, n
            )),
            Some(_) => {}
        },
        SelectionMode::GlobalTopK => match config.top_k {
            None => errors.push("selection.top_k: required for mode GLOBAL_TOP_K".to_string()),
            Some(0) => errors.push("selection.top_k: must be >= 1, got 0".to_string()),
            Some(_) => {}
        },
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
