pub mod formatter;

pub use formatter::{
    format_config_summary, format_evaluation_report, format_filter_stats, format_item_outcomes,
    format_percent, format_qualified_list, format_score, format_score_result, should_use_colors,
};
