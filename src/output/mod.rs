pub mod export;
pub mod formatter;

pub use export::{export_json, to_json, write_output};
pub use formatter::{
    combined_event_rows, format_combined_table, format_combined_tsv, format_event_table,
    format_meet_table, format_meet_tsv, format_points, meet_rows, should_use_colors, EventRows,
    ResultRow,
};
