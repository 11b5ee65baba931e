use super::aggregate::AggregatedTeamResult;
use crate::model::Criterion;
use serde::Serialize;
use std::cmp::Ordering;

/// Two adjacent teams are tied when their aggregated scores differ by no
/// more than this. Also the decision threshold inside the cascade.
pub const EPSILON: f64 = 1e-4;

/// One comparator's inputs during tie-breaking, recorded for audit.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TieBreakerStep {
    /// Comparator name: `criterion:<id>`, `mean_raw_total`,
    /// `median_raw_total` or `judge_count`.
    pub level: String,
    pub own: f64,
    pub other: f64,
    pub decided: bool,
}

/// The recorded comparison against one adjacent contender.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TieBreakerTrace {
    pub against: String,
    pub steps: Vec<TieBreakerStep>,
}

/// A team's final position. Derived, ephemeral.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedResult {
    pub team_id: String,
    /// Competition ranking: an unresolved tied group shares the rank of its
    /// head position and the next rank jumps by the group size.
    pub rank: u32,
    /// Position rescaled to [0, 100], 100 = best. Shared across an
    /// unresolved tied group.
    pub percentile: f64,
    pub aggregated_score: f64,
    /// True only when the full cascade failed to separate this team from a
    /// neighbor; such groups need human follow-up.
    pub is_tied: bool,
    pub requires_manual_resolution: bool,
    pub tie_breaker_trace: Vec<TieBreakerTrace>,
}

type Extract = Box<dyn Fn(&AggregatedTeamResult) -> f64>;

/// The cascade as an ordered list of named value extractors. Evaluated in
/// order; the first level whose values differ by more than EPSILON decides.
fn tie_break_levels(criteria: &[Criterion]) -> Vec<(String, Extract)> {
    let mut ordered: Vec<&Criterion> = criteria.iter().collect();
    // Heaviest criterion speaks first; equal weights fall back to id so the
    // iteration order is never left to chance.
    ordered.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut levels: Vec<(String, Extract)> = Vec::with_capacity(criteria.len() + 3);
    for criterion in ordered {
        let id = criterion.id.clone();
        levels.push((
            format!("criterion:{}", id),
            Box::new(move |team: &AggregatedTeamResult| {
                team.per_criterion_aggregate.get(&id).copied().unwrap_or(0.0)
            }),
        ));
    }
    levels.push((
        "mean_raw_total".to_string(),
        Box::new(|team: &AggregatedTeamResult| team.mean_raw_total),
    ));
    levels.push((
        "median_raw_total".to_string(),
        Box::new(|team: &AggregatedTeamResult| team.median_raw_total),
    ));
    levels.push((
        "judge_count".to_string(),
        Box::new(|team: &AggregatedTeamResult| team.judge_count as f64),
    ));
    levels
}

/// Run the cascade for one contested pair. `Ordering::Greater` means `a`
/// ranks higher. Steps are recorded up to and including the decisive level.
fn compare_tied(
    a: &AggregatedTeamResult,
    b: &AggregatedTeamResult,
    levels: &[(String, Extract)],
) -> (Ordering, Vec<TieBreakerStep>) {
    let mut steps = Vec::new();
    for (level, extract) in levels {
        let own = extract(a);
        let other = extract(b);
        let decided = (own - other).abs() > EPSILON;
        steps.push(TieBreakerStep {
            level: level.clone(),
            own,
            other,
            decided,
        });
        if decided {
            let ordering = if own > other {
                Ordering::Greater
            } else {
                Ordering::Less
            };
            return (ordering, steps);
        }
    }
    (Ordering::Equal, steps)
}

/// Order teams, assign rank and percentile, resolve ties deterministically.
///
/// Stateless: identical input always yields identical output, regardless of
/// the order `aggregated` arrives in.
pub fn rank_teams(
    aggregated: &[AggregatedTeamResult],
    criteria: &[Criterion],
) -> Vec<RankedResult> {
    if aggregated.is_empty() {
        return Vec::new();
    }
    let levels = tie_break_levels(criteria);

    // Deterministic starting order: score descending, team_id ascending.
    let mut order: Vec<&AggregatedTeamResult> = aggregated.iter().collect();
    order.sort_by(|a, b| {
        b.aggregated_score
            .partial_cmp(&a.aggregated_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.team_id.cmp(&b.team_id))
    });

    // Maximal runs of adjacent teams within EPSILON of each other.
    let mut groups: Vec<Vec<&AggregatedTeamResult>> = Vec::new();
    for team in order {
        match groups.last_mut() {
            Some(group)
                if (group.last().unwrap().aggregated_score - team.aggregated_score).abs()
                    <= EPSILON =>
            {
                group.push(team);
            }
            _ => groups.push(vec![team]),
        }
    }

    // Order each contested group by the cascade; cascade-equal members fall
    // back to team_id for output stability only.
    for group in &mut groups {
        if group.len() > 1 {
            group.sort_by(|a, b| match compare_tied(a, b, &levels).0 {
                Ordering::Greater => Ordering::Less,
                Ordering::Less => Ordering::Greater,
                Ordering::Equal => a.team_id.cmp(&b.team_id),
            });
        }
    }

    let n: usize = groups.iter().map(|g| g.len()).sum();
    let percentile_at = |i: usize| -> f64 {
        if n == 1 {
            100.0
        } else {
            100.0 * (n - 1 - i) as f64 / (n - 1) as f64
        }
    };

    let mut results = Vec::with_capacity(n);
    let mut position = 0usize;
    for group in &groups {
        // Re-run the cascade for each adjacent pair to capture the audit
        // trace and to find the sub-runs the cascade could not separate.
        let mut pair_results = Vec::with_capacity(group.len().saturating_sub(1));
        for pair in group.windows(2) {
            pair_results.push(compare_tied(pair[0], pair[1], &levels));
        }

        let mut idx = 0usize;
        while idx < group.len() {
            // Extend over adjacent members the cascade left unresolved.
            let mut run_end = idx;
            while run_end + 1 < group.len() && pair_results[run_end].0 == Ordering::Equal {
                run_end += 1;
            }
            let unresolved = run_end > idx;
            let head_position = position + idx;

            for member_idx in idx..=run_end {
                let team = group[member_idx];
                let mut trace = Vec::new();
                if member_idx > 0 {
                    let (_, steps) = &pair_results[member_idx - 1];
                    trace.push(TieBreakerTrace {
                        against: group[member_idx - 1].team_id.clone(),
                        steps: steps
                            .iter()
                            .map(|s| TieBreakerStep {
                                level: s.level.clone(),
                                own: s.other,
                                other: s.own,
                                decided: s.decided,
                            })
                            .collect(),
                    });
                }
                if member_idx < group.len() - 1 {
                    let (_, steps) = &pair_results[member_idx];
                    trace.push(TieBreakerTrace {
                        against: group[member_idx + 1].team_id.clone(),
                        steps: steps.clone(),
                    });
                }

                let effective_position = if unresolved {
                    head_position
                } else {
                    position + member_idx
                };
                results.push(RankedResult {
                    team_id: team.team_id.clone(),
                    rank: (effective_position + 1) as u32,
                    percentile: percentile_at(effective_position),
                    aggregated_score: team.aggregated_score,
                    is_tied: unresolved,
                    requires_manual_resolution: unresolved,
                    tie_breaker_trace: trace,
                });
            }
            idx = run_end + 1;
        }
        position += group.len();
    }
    results
}
