pub mod formatter;

pub use formatter::{
    format_breakdown, format_ranked_table, format_recalculated, format_score, format_sliders,
    format_tsv, should_use_colors,
};
