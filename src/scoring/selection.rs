use super::config::{SelectionConfig, SelectionMode};
use super::normalize::NormalizedEvaluation;
use super::rank::RankedResult;
use super::validation::validate_selection;
use crate::model::RoundSnapshot;
use serde::Serialize;
use std::collections::BTreeSet;

/// One judge's contribution under PER_JUDGE_TOP_N, kept for transparency:
/// the judge's own raw-total ordering and the slice of it they advanced.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JudgeBreakdown {
    pub judge_id: String,
    /// (team_id, raw_total) sorted by raw total descending.
    pub ranked: Vec<(String, f64)>,
    pub selected: Vec<String>,
}

/// The N or K the selection ran with, echoed into results and promotion
/// records so exported rows are self-describing.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SelectionParams {
    pub top_n: Option<u32>,
    pub top_k: Option<u32>,
}

impl SelectionParams {
    fn from_config(config: &SelectionConfig) -> Self {
        match config.mode {
            SelectionMode::PerJudgeTopN => Self {
                top_n: config.top_n,
                top_k: None,
            },
            SelectionMode::GlobalTopK => Self {
                top_n: None,
                top_k: config.top_k,
            },
        }
    }
}

/// The team set advancing to the next round. Derived, ephemeral.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SelectionResult {
    pub mode: SelectionMode,
    pub params: SelectionParams,
    /// True when the round has exactly one assigned judge: per-judge and
    /// global selection coincide and a next round of the same composition
    /// is meaningless, so no selection is performed.
    pub stop: bool,
    pub selected_team_ids: BTreeSet<String>,
    /// Populated for PER_JUDGE_TOP_N.
    pub per_judge_breakdown: Vec<JudgeBreakdown>,
    /// Populated for GLOBAL_TOP_K: the selected teams in rank order.
    pub ranked_list: Vec<String>,
}

/// Compute which teams advance. `ranked` must come from the same pipeline
/// invocation as `normalized`.
/// Returns all configuration errors at once (not just the first).
pub fn execute_selection(
    snapshot: &RoundSnapshot,
    normalized: &[NormalizedEvaluation],
    ranked: &[RankedResult],
    config: &SelectionConfig,
) -> Result<SelectionResult, Vec<String>> {
    validate_selection(config)?;

    let judge_ids = eligible_judge_ids(snapshot, config);
    if judge_ids.len() == 1 {
        return Ok(SelectionResult {
            mode: config.mode,
            params: SelectionParams::from_config(config),
            stop: true,
            selected_team_ids: BTreeSet::new(),
            per_judge_breakdown: Vec::new(),
            ranked_list: Vec::new(),
        });
    }

    match config.mode {
        SelectionMode::PerJudgeTopN => {
            // validate_selection guarantees top_n is present and legal.
            let n = config.top_n.unwrap_or(0) as usize;
            let mut selected_team_ids = BTreeSet::new();
            let mut per_judge_breakdown = Vec::with_capacity(judge_ids.len());

            for judge_id in &judge_ids {
                let mut ranked_for_judge: Vec<(String, f64)> = normalized
                    .iter()
                    .filter(|e| e.judge_id == *judge_id)
                    .map(|e| (e.team_id.clone(), e.raw_total))
                    .collect();
                ranked_for_judge.sort_by(|a, b| {
                    b.1.partial_cmp(&a.1)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| a.0.cmp(&b.0))
                });

                let selected: Vec<String> = ranked_for_judge
                    .iter()
                    .take(n)
                    .map(|(team_id, _)| team_id.clone())
                    .collect();
                selected_team_ids.extend(selected.iter().cloned());
                per_judge_breakdown.push(JudgeBreakdown {
                    judge_id: judge_id.clone(),
                    ranked: ranked_for_judge,
                    selected,
                });
            }

            Ok(SelectionResult {
                mode: config.mode,
                params: SelectionParams::from_config(config),
                stop: false,
                selected_team_ids,
                per_judge_breakdown,
                ranked_list: Vec::new(),
            })
        }
        SelectionMode::GlobalTopK => {
            let k = config.top_k.unwrap_or(0);
            // rank <= K. An unresolved tied group shares its head rank, so a
            // group straddling the cutoff comes along whole.
            let ranked_list: Vec<String> = ranked
                .iter()
                .filter(|r| r.rank <= k)
                .map(|r| r.team_id.clone())
                .collect();
            Ok(SelectionResult {
                mode: config.mode,
                params: SelectionParams::from_config(config),
                stop: false,
                selected_team_ids: ranked_list.iter().cloned().collect(),
                per_judge_breakdown: Vec::new(),
                ranked_list,
            })
        }
    }
}

/// Judges considered for selection: the round's assigned judges, restricted
/// by judge-type tags under PER_JUDGE_TOP_N when a filter is configured.
fn eligible_judge_ids(snapshot: &RoundSnapshot, config: &SelectionConfig) -> Vec<String> {
    let filter: Option<&Vec<String>> = match config.mode {
        SelectionMode::PerJudgeTopN => config
            .judge_type_filter
            .as_ref()
            .filter(|tags| !tags.is_empty()),
        SelectionMode::GlobalTopK => None,
    };

    match filter {
        Some(tags) if !snapshot.judges.is_empty() => {
            let tags: BTreeSet<&str> = tags.iter().map(String::as_str).collect();
            snapshot
                .judges
                .iter()
                .filter(|j| {
                    j.judge_type
                        .as_deref()
                        .map(|t| tags.contains(t))
                        .unwrap_or(false)
                })
                .map(|j| j.id.clone())
                .collect()
        }
        _ => snapshot.assigned_judge_ids(),
    }
}

/// A promotion record for one advancing team, shaped for the external
/// persistence layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PromotionRecord {
    pub from_round: String,
    pub to_round: String,
    pub team_id: String,
    pub mode: SelectionMode,
    pub params: SelectionParams,
}

/// Expand a selection into per-team promotion records.
pub fn promotion_records(
    selection: &SelectionResult,
    from_round: &str,
    to_round: &str,
) -> Vec<PromotionRecord> {
    selection
        .selected_team_ids
        .iter()
        .map(|team_id| PromotionRecord {
            from_round: from_round.to_string(),
            to_round: to_round.to_string(),
            team_id: team_id.clone(),
            mode: selection.mode,
            params: selection.params,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Evaluation, Judge};

    fn judge(id: &str, judge_type: Option<&str>) -> Judge {
        Judge {
            id: id.to_string(),
            name: None,
            judge_type: judge_type.map(str::to_string),
        }
    }

    fn normalized(judge: &str, team: &str, raw_total: f64) -> NormalizedEvaluation {
        NormalizedEvaluation {
            judge_id: judge.to_string(),
            team_id: team.to_string(),
            per_criterion_weighted_z: Default::default(),
            judge_total: 0.0,
            raw_total,
        }
    }

    fn snapshot(judges: Vec<Judge>, evaluations: Vec<Evaluation>) -> RoundSnapshot {
        RoundSnapshot {
            round_id: "r1".to_string(),
            criteria: vec![],
            judges,
            evaluations,
        }
    }

    fn per_judge_config(n: u32) -> SelectionConfig {
        SelectionConfig {
            mode: SelectionMode::PerJudgeTopN,
            top_n: Some(n),
            top_k: None,
            judge_type_filter: None,
        }
    }

    fn global_config(k: u32) -> SelectionConfig {
        SelectionConfig {
            mode: SelectionMode::GlobalTopK,
            top_n: None,
            top_k: Some(k),
            judge_type_filter: None,
        }
    }

    fn ranked_result(team: &str, rank: u32) -> RankedResult {
        RankedResult {
            team_id: team.to_string(),
            rank,
            percentile: 0.0,
            aggregated_score: 0.0,
            is_tied: false,
            requires_manual_resolution: false,
            tie_breaker_trace: vec![],
        }
    }

    #[test]
    fn test_per_judge_top_n_union() {
        let snapshot = snapshot(vec![judge("j1", None), judge("j2", None)], vec![]);
        let normalized = vec![
            normalized("j1", "t1", 90.0),
            normalized("j1", "t2", 80.0),
            normalized("j1", "t3", 70.0),
            normalized("j2", "t4", 95.0),
            normalized("j2", "t5", 85.0),
            normalized("j2", "t3", 60.0),
        ];
        let result = execute_selection(
            &snapshot,
            &normalized,
            &[],
            &per_judge_config(2),
        )
        .unwrap();
        assert!(!result.stop);
        let selected: Vec<&str> = result
            .selected_team_ids
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(selected, vec!["t1", "t2", "t4", "t5"]);
        assert_eq!(result.selected_team_ids.len(), 4);
        assert_eq!(result.per_judge_breakdown.len(), 2);
        assert_eq!(result.per_judge_breakdown[0].selected, vec!["t1", "t2"]);
        assert_eq!(result.per_judge_breakdown[1].selected, vec!["t4", "t5"]);
    }

    #[test]
    fn test_per_judge_overlap_collapses() {
        let snapshot = snapshot(vec![judge("j1", None), judge("j2", None)], vec![]);
        let normalized = vec![
            normalized("j1", "t1", 90.0),
            normalized("j1", "t2", 80.0),
            normalized("j2", "t1", 95.0),
            normalized("j2", "t2", 85.0),
        ];
        let result = execute_selection(
            &snapshot,
            &normalized,
            &[],
            &per_judge_config(2),
        )
        .unwrap();
        assert_eq!(result.selected_team_ids.len(), 2);
    }

    #[test]
    fn test_per_judge_raw_total_tie_broken_by_team_id() {
        let snapshot = snapshot(vec![judge("j1", None), judge("j2", None)], vec![]);
        let normalized = vec![
            normalized("j1", "t-b", 80.0),
            normalized("j1", "t-a", 80.0),
            normalized("j1", "t-c", 70.0),
            normalized("j2", "t-c", 75.0),
            normalized("j2", "t-a", 60.0),
        ];
        let result = execute_selection(
            &snapshot,
            &normalized,
            &[],
            &per_judge_config(2),
        )
        .unwrap();
        assert_eq!(result.per_judge_breakdown[0].selected, vec!["t-a", "t-b"]);
    }

    #[test]
    fn test_single_judge_stops() {
        let snapshot = snapshot(vec![judge("j1", None)], vec![]);
        let result = execute_selection(
            &snapshot,
            &[normalized("j1", "t1", 90.0)],
            &[],
            &per_judge_config(2),
        )
        .unwrap();
        assert!(result.stop);
        assert!(result.selected_team_ids.is_empty());
        assert!(result.per_judge_breakdown.is_empty());
    }

    #[test]
    fn test_single_judge_stops_global_mode_too() {
        let snapshot = snapshot(vec![judge("j1", None)], vec![]);
        let result = execute_selection(
            &snapshot,
            &[],
            &[ranked_result("t1", 1)],
            &global_config(1),
        )
        .unwrap();
        assert!(result.stop);
    }

    #[test]
    fn test_judge_type_filter() {
        let snapshot = snapshot(
            vec![
                judge("j1", Some("industry")),
                judge("j2", Some("faculty")),
                judge("j3", Some("industry")),
            ],
            vec![],
        );
        let normalized = vec![
            normalized("j1", "t1", 90.0),
            normalized("j2", "t2", 99.0),
            normalized("j3", "t3", 80.0),
        ];
        let config = SelectionConfig {
            judge_type_filter: Some(vec!["industry".to_string()]),
            ..per_judge_config(2)
        };
        let result = execute_selection(
            &snapshot,
            &normalized,
            &[],
            &config,
        )
        .unwrap();
        // j2's pick is not in: faculty filtered out.
        assert!(!result.selected_team_ids.contains("t2"));
        assert_eq!(result.per_judge_breakdown.len(), 2);
    }

    #[test]
    fn test_judge_type_filter_down_to_one_judge_stops() {
        let snapshot = snapshot(
            vec![judge("j1", Some("industry")), judge("j2", Some("faculty"))],
            vec![],
        );
        let config = SelectionConfig {
            judge_type_filter: Some(vec!["industry".to_string()]),
            ..per_judge_config(2)
        };
        let result = execute_selection(
            &snapshot,
            &[normalized("j1", "t1", 90.0)],
            &[],
            &config,
        )
        .unwrap();
        assert!(result.stop);
    }

    #[test]
    fn test_global_top_k() {
        let snapshot = snapshot(vec![judge("j1", None), judge("j2", None)], vec![]);
        let ranked = vec![
            ranked_result("t1", 1),
            ranked_result("t2", 2),
            ranked_result("t3", 3),
            ranked_result("t4", 4),
        ];
        let result = execute_selection(
            &snapshot,
            &[],
            &ranked,
            &global_config(2),
        )
        .unwrap();
        assert_eq!(result.ranked_list, vec!["t1", "t2"]);
        assert_eq!(result.selected_team_ids.len(), 2);
    }

    #[test]
    fn test_global_top_k_includes_whole_tied_group() {
        let snapshot = snapshot(vec![judge("j1", None), judge("j2", None)], vec![]);
        // Ranks 1, 2, 2, 4: a tied pair straddling K=2.
        let ranked = vec![
            ranked_result("t1", 1),
            ranked_result("t2", 2),
            ranked_result("t3", 2),
            ranked_result("t4", 4),
        ];
        let result = execute_selection(
            &snapshot,
            &[],
            &ranked,
            &global_config(2),
        )
        .unwrap();
        assert_eq!(result.ranked_list, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let snapshot = snapshot(vec![judge("j1", None), judge("j2", None)], vec![]);
        let bad = SelectionConfig {
            mode: SelectionMode::PerJudgeTopN,
            top_n: Some(4),
            top_k: None,
            judge_type_filter: None,
        };
        let errors = execute_selection(
            &snapshot,
            &[],
            &[],
            &bad,
        )
        .unwrap_err();
        assert!(errors[0].contains("top_n"));
    }

    #[test]
    fn test_promotion_records() {
        let selection = SelectionResult {
            mode: SelectionMode::GlobalTopK,
            params: SelectionParams {
                top_n: None,
                top_k: Some(2),
            },
            stop: false,
            selected_team_ids: BTreeSet::from(["t1".to_string(), "t2".to_string()]),
            per_judge_breakdown: vec![],
            ranked_list: vec!["t1".to_string(), "t2".to_string()],
        };
        let records = promotion_records(&selection, "r1", "r2");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].from_round, "r1");
        assert_eq!(records[0].to_round, "r2");
        assert_eq!(records[0].team_id, "t1");
    }
}
