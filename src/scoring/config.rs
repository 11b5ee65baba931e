use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a judge's personal scoring center and spread are estimated.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum ScoringMethod {
    /// Mean center, population standard deviation spread.
    #[serde(rename = "Z_SCORE")]
    ZScore,
    /// Median center, scaled median-absolute-deviation spread. Resistant to
    /// a judge's occasional outlier score.
    #[serde(rename = "ROBUST_MAD")]
    RobustMad,
}

impl Default for ScoringMethod {
    fn default() -> Self {
        ScoringMethod::ZScore
    }
}

/// Main scoring configuration.
///
/// Example YAML:
/// ```yaml
/// method: ROBUST_MAD
/// judge_weights:
///   j-chief: 2.0
///   j-guest: 0.5
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Normalization method (default: Z_SCORE)
    #[serde(default)]
    pub method: ScoringMethod,

    /// Per-judge aggregation weights. Judges not listed weigh 1.0.
    /// All listed weights must be finite and > 0.
    #[serde(default)]
    pub judge_weights: BTreeMap<String, f64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            method: ScoringMethod::ZScore,
            judge_weights: BTreeMap::new(),
        }
    }
}

impl ScoringConfig {
    /// Aggregation weight for a judge (1.0 unless configured).
    pub fn judge_weight(&self, judge_id: &str) -> f64 {
        self.judge_weights.get(judge_id).copied().unwrap_or(1.0)
    }
}

/// Which teams advance to the next round.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum SelectionMode {
    /// Union of each judge's top-N teams by that judge's own raw totals.
    #[serde(rename = "PER_JUDGE_TOP_N")]
    PerJudgeTopN,
    /// The K teams holding rank 1..K in the final ranking.
    #[serde(rename = "GLOBAL_TOP_K")]
    GlobalTopK,
}

/// Legal values for `top_n` under PER_JUDGE_TOP_N.
pub const ALLOWED_TOP_N: [u32; 3] = [2, 5, 10];

/// Selection configuration.
///
/// Example YAML:
/// ```yaml
/// mode: PER_JUDGE_TOP_N
/// top_n: 5
/// judge_type_filter: ["industry"]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SelectionConfig {
    pub mode: SelectionMode,

    /// Required when mode is PER_JUDGE_TOP_N. Must be one of 2, 5, 10.
    #[serde(default)]
    pub top_n: Option<u32>,

    /// Required when mode is GLOBAL_TOP_K. Must be >= 1.
    #[serde(default)]
    pub top_k: Option<u32>,

    /// Restrict PER_JUDGE_TOP_N to judges whose `judge_type` matches one of
    /// these tags. Empty or absent means all judges.
    #[serde(default)]
    pub judge_type_filter: Option<Vec<String>>,
}
