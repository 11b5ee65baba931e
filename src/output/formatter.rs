use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::scoring::{
    JudgeStatistic, RankedResult, SelectionMode, SelectionResult, TieBreakerTrace,
};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format an aggregated score with explicit sign, e.g. "+1.225", "-0.340".
/// Normalized scores are centered on zero, so the sign carries meaning.
pub fn format_score(score: f64) -> String {
    format!("{:+.3}", score)
}

/// Format a percentile as a whole number with a percent sign.
pub fn format_percentile(percentile: f64) -> String {
    format!("{:.0}%", percentile)
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a team name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format the final ranking as a table with columns: rank, score,
/// percentile, team. Unresolved ties are marked with an asterisk.
pub fn format_ranked_table(ranked: &[RankedResult], use_colors: bool) -> String {
    if ranked.is_empty() {
        return "No teams ranked.".to_string();
    }

    let term_width = get_terminal_width();

    // Rank column: 3 chars + tie marker. Score: 8. Percentile: 4.
    let score_width = 8;
    let pctl_width = 4;
    let fixed_width = 4 + 1 + score_width + 2 + pctl_width + 2;

    let mut lines: Vec<String> = ranked
        .iter()
        .map(|result| {
            let marker = if result.requires_manual_resolution {
                "*"
            } else {
                " "
            };
            let rank_str = format!("{:>3}{}", result.rank, marker);
            let score_str = format!(
                "{:>width$}",
                format_score(result.aggregated_score),
                width = score_width
            );
            let pctl_str = format!(
                "{:>width$}",
                format_percentile(result.percentile),
                width = pctl_width
            );

            let team = if let Some(width) = term_width {
                if width > fixed_width + 10 {
                    truncate_name(&result.team_id, width - fixed_width)
                } else {
                    truncate_name(&result.team_id, 20)
                }
            } else {
                result.team_id.clone()
            };

            if use_colors {
                format!(
                    "{} {}  {}  {}",
                    rank_str.dimmed(),
                    score_str.bold(),
                    pctl_str,
                    team
                )
            } else {
                format!("{} {}  {}  {}", rank_str, score_str, pctl_str, team)
            }
        })
        .collect();

    if ranked.iter().any(|r| r.requires_manual_resolution) {
        lines.push("* tied after all tie-breakers; needs manual resolution".to_string());
    }
    lines.join("\n")
}

/// Format a single ranked team with detailed multi-line output (for verbose
/// mode), including the recorded tie-break comparisons.
pub fn format_ranked_detail(result: &RankedResult, use_colors: bool) -> String {
    let header = if use_colors {
        format!(
            "{}. {}",
            result.rank,
            result.team_id.bold()
        )
    } else {
        format!("{}. {}", result.rank, result.team_id)
    };

    let mut out = format!(
        "{}\n  Score: {}\n  Percentile: {}",
        header,
        format_score(result.aggregated_score),
        format_percentile(result.percentile)
    );
    if result.is_tied {
        out.push_str("\n  Tied: yes (manual resolution required)");
    }
    for trace in &result.tie_breaker_trace {
        out.push('\n');
        out.push_str(&format_trace(trace));
    }
    out
}

/// Render one recorded tie-break comparison, one comparator per line.
fn format_trace(trace: &TieBreakerTrace) -> String {
    let mut lines = vec![format!("  Tie-break vs {}:", trace.against)];
    for step in &trace.steps {
        let verdict = if step.decided { "decisive" } else { "even" };
        lines.push(format!(
            "    {}: {:.4} vs {:.4} ({})",
            step.level, step.own, step.other, verdict
        ));
    }
    lines.join("\n")
}

/// Format per-judge statistics with columns: judge, criterion, center,
/// spread, samples. Zero spread is flagged since those scores normalize
/// to neutral.
pub fn format_judge_table(statistics: &[JudgeStatistic], use_colors: bool) -> String {
    if statistics.is_empty() {
        return "No judge statistics available.".to_string();
    }

    statistics
        .iter()
        .map(|stat| {
            let spread = if stat.spread > 0.0 {
                format!("{:>8.3}", stat.spread)
            } else {
                format!("{:>8}", "flat")
            };
            let line = format!(
                "{:<16} {:<16} {:>8.2} {} {:>3}",
                stat.judge_id, stat.criterion_id, stat.center, spread, stat.sample_count
            );
            if use_colors && stat.spread == 0.0 {
                line.yellow().to_string()
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a selection outcome: the advancing set, plus the per-judge
/// breakdown under PER_JUDGE_TOP_N.
pub fn format_selection(selection: &SelectionResult, use_colors: bool) -> String {
    if selection.stop {
        return "Single judge assigned; selection is a no-op for this round.".to_string();
    }

    let mut lines = Vec::new();
    if selection.mode == SelectionMode::PerJudgeTopN {
        for breakdown in &selection.per_judge_breakdown {
            let picks = breakdown.selected.join(", ");
            if use_colors {
                lines.push(format!("{}: {}", breakdown.judge_id.cyan(), picks));
            } else {
                lines.push(format!("{}: {}", breakdown.judge_id, picks));
            }
        }
    }

    let advancing: Vec<&str> = selection
        .selected_team_ids
        .iter()
        .map(String::as_str)
        .collect();
    let summary = format!(
        "Advancing ({}): {}",
        advancing.len(),
        advancing.join(", ")
    );
    if use_colors {
        lines.push(summary.bold().to_string());
    } else {
        lines.push(summary);
    }
    lines.join("\n")
}

/// Format the ranking as tab-separated values for scripting.
/// Columns: rank, team, score, percentile, tied (no headers, no colors)
pub fn format_tsv(ranked: &[RankedResult]) -> String {
    ranked
        .iter()
        .map(|result| {
            format!(
                "{}\t{}\t{:.6}\t{:.2}\t{}",
                result.rank,
                result.team_id,
                result.aggregated_score,
                result.percentile,
                result.is_tied
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
