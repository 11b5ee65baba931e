use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A judging criterion, immutable for a round once judging starts.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Criterion {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Maximum raw marks a judge may award. Must be > 0.
    pub max_marks: f64,
    /// Multiplier applied to this criterion's z-score. Must be > 0.
    pub weight: f64,
    #[serde(default)]
    pub display_order: u32,
}

impl Criterion {
    /// Display label: configured name, falling back to the id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// A judge assigned to the round.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Judge {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Optional tag (e.g. "industry", "faculty") used by selection filters.
    #[serde(default)]
    pub judge_type: Option<String>,
}

impl Judge {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// One judge's submitted scores for one team.
///
/// Only `is_draft = false` evaluations are valid engine input; a submitted
/// evaluation is logically immutable (enforced by the persistence layer that
/// owns these rows, assumed here).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Evaluation {
    pub judge_id: String,
    pub team_id: String,
    pub round_id: String,
    /// Raw marks keyed by criterion id. Each value must lie in
    /// `[0, criterion.max_marks]`.
    pub scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub is_draft: bool,
    /// Submission time, carried for display only. Never read by the pipeline.
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Evaluation {
    /// Plain sum of the raw marks this judge gave this team.
    pub fn raw_total(&self) -> f64 {
        self.scores.values().sum()
    }
}

/// Everything the engine needs for one round, fetched once per invocation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoundSnapshot {
    pub round_id: String,
    pub criteria: Vec<Criterion>,
    /// Judge roster. May be empty, in which case the distinct judge ids
    /// found in the evaluations stand in for it.
    #[serde(default)]
    pub judges: Vec<Judge>,
    pub evaluations: Vec<Evaluation>,
}

impl RoundSnapshot {
    /// Ids of the judges assigned to this round: the roster if present,
    /// otherwise the distinct judge ids appearing in the evaluations.
    pub fn assigned_judge_ids(&self) -> Vec<String> {
        if !self.judges.is_empty() {
            return self.judges.iter().map(|j| j.id.clone()).collect();
        }
        let mut ids: Vec<String> = self
            .evaluations
            .iter()
            .map(|e| e.judge_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}
