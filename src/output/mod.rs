pub mod formatter;

pub use formatter::{
    format_judge_table, format_percentile, format_ranked_detail, format_ranked_table,
    format_score, format_selection, format_tsv, should_use_colors,
};
