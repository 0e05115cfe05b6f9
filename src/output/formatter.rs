use std::io::IsTerminal;
use owo_colors::OwoColorize;
use serde::Serialize;
use terminal_size::{Width, terminal_size};

use crate::meet::{MeetInfo, Phase};
use crate::scoring::{
    CombinedEvent, CombinedResult, EventResult, MeetResult, PhaseScore, ScoredEntry,
};

const ABSENT: &str = "-";

/// A scored entry flattened into display strings.
///
/// Phases the swimmer did not swim show `-`; a swum phase that scored
/// nothing shows `0`. This is also the shape of the JSON export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    /// Meet name, only set for combined rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meet: Option<String>,
    pub place: String,
    pub name: String,
    pub age: String,
    pub team: String,
    pub prelim_time: String,
    pub prelim_points: String,
    pub swimoff_time: String,
    pub swimoff_points: String,
    pub final_time: String,
    pub final_points: String,
    pub best_points: String,
}

impl ResultRow {
    pub fn from_entry(entry: &ScoredEntry) -> Self {
        let (prelim_time, prelim_points) = phase_cells(entry.phase(Phase::Prelim));
        let (swimoff_time, swimoff_points) = phase_cells(entry.phase(Phase::Swimoff));
        let (final_time, final_points) = phase_cells(entry.phase(Phase::Final));

        Self {
            meet: None,
            place: entry
                .sort_place()
                .map_or_else(|| ABSENT.to_string(), |p| p.to_string()),
            name: entry.swimmer.name.clone(),
            age: entry
                .swimmer
                .age
                .map_or_else(|| ABSENT.to_string(), |a| a.to_string()),
            team: entry.swimmer.team.clone(),
            prelim_time,
            prelim_points,
            swimoff_time,
            swimoff_points,
            final_time,
            final_points,
            best_points: format_points(entry.best_points),
        }
    }

    pub fn with_meet(mut self, meet: &str) -> Self {
        self.meet = Some(meet.to_string());
        self
    }

    /// Columns in display order, meet first when present
    fn cells(&self) -> Vec<&str> {
        let mut cells = Vec::with_capacity(12);
        if let Some(ref meet) = self.meet {
            cells.push(meet.as_str());
        }
        cells.extend([
            self.place.as_str(),
            self.name.as_str(),
            self.age.as_str(),
            self.team.as_str(),
            self.prelim_time.as_str(),
            self.prelim_points.as_str(),
            self.swimoff_time.as_str(),
            self.swimoff_points.as_str(),
            self.final_time.as_str(),
            self.final_points.as_str(),
            self.best_points.as_str(),
        ]);
        cells
    }
}

/// One event and its rows, as exported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRows {
    pub event: String,
    pub rows: Vec<ResultRow>,
}

/// Rows for every event of a meet
pub fn meet_rows(result: &MeetResult) -> Vec<EventRows> {
    result
        .events
        .iter()
        .map(|event| EventRows {
            event: event.event.display_name(),
            rows: event.entries.iter().map(ResultRow::from_entry).collect(),
        })
        .collect()
}

/// Rows for every combined event, each tagged with its meet
pub fn combined_event_rows(result: &CombinedResult) -> Vec<EventRows> {
    result
        .events
        .iter()
        .map(|group| EventRows {
            event: group.name.clone(),
            rows: combined_rows(group),
        })
        .collect()
}

/// Time and points cells for one phase. Exhibition swims are marked with
/// a leading `x`.
fn phase_cells(score: Option<&PhaseScore>) -> (String, String) {
    match score {
        Some(score) => {
            let time = if score.exhibition {
                format!("x{}", score.time)
            } else {
                score.time.to_string()
            };
            (time, format_points(score.points))
        }
        None => (ABSENT.to_string(), ABSENT.to_string()),
    }
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format points without noise: "9", "4.5", "833.33"
pub fn format_points(points: f64) -> String {
    let formatted = format!("{:.2}", points);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
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

const HEADERS: [&str; 11] = [
    "Pl", "Name", "Age", "Team", "Prelim", "Pts", "Swimoff", "Pts", "Final", "Pts", "Best",
];

/// Render rows as an aligned table with a header line.
///
/// Text columns (meet, name, team) are left-aligned, everything else
/// right-aligned. When stdout is a terminal the name column gives way
/// first so lines fit the window.
fn render_rows(rows: &[ResultRow], with_meet: bool, use_colors: bool, term_width: Option<usize>) -> String {
    let mut header: Vec<&str> = Vec::with_capacity(12);
    if with_meet {
        header.push("Meet");
    }
    header.extend(HEADERS);

    let name_col = if with_meet { 2 } else { 1 };
    let left_aligned = |col: usize| (with_meet && col == 0) || col == name_col || col == name_col + 2;

    let mut table: Vec<Vec<String>> = vec![header.iter().map(|h| h.to_string()).collect()];
    table.extend(rows.iter().map(|r| r.cells().iter().map(|c| c.to_string()).collect()));

    let mut widths = vec![0usize; header.len()];
    for line in &table {
        for (col, cell) in line.iter().enumerate() {
            widths[col] = widths[col].max(cell.chars().count());
        }
    }

    let separator = "  ";
    let indent = "  ";
    if let Some(width) = term_width {
        let fixed: usize = indent.len() + widths
            .iter()
            .enumerate()
            .filter(|(col, _)| *col != name_col)
            .map(|(_, w)| w + separator.len())
            .sum::<usize>();
        let available = if width > fixed + 10 { width - fixed } else { 20 };
        if widths[name_col] > available {
            widths[name_col] = available;
            for line in table.iter_mut().skip(1) {
                line[name_col] = truncate_name(&line[name_col], available);
            }
        }
    }

    table
        .iter()
        .enumerate()
        .map(|(row_idx, line)| {
            let cells: Vec<String> = line
                .iter()
                .enumerate()
                .map(|(col, cell)| {
                    let w = widths[col];
                    let padded = if left_aligned(col) {
                        format!("{:<width$}", cell, width = w)
                    } else {
                        format!("{:>width$}", cell, width = w)
                    };
                    if !use_colors {
                        padded
                    } else if row_idx == 0 {
                        padded.dimmed().to_string()
                    } else if col == line.len() - 1 {
                        padded.bold().to_string()
                    } else if cell == ABSENT {
                        padded.dimmed().to_string()
                    } else if with_meet && col == 0 {
                        padded.cyan().to_string()
                    } else {
                        padded
                    }
                })
                .collect();
            format!("{}{}", indent, cells.join(separator).trim_end())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn heading(title: &str, use_colors: bool) -> String {
    if use_colors {
        title.bold().to_string()
    } else {
        title.to_string()
    }
}

fn event_block(title: &str, rows: &[ResultRow], with_meet: bool, use_colors: bool, term_width: Option<usize>) -> String {
    if rows.is_empty() {
        format!("{}\n  (no entries)", heading(title, use_colors))
    } else {
        format!(
            "{}\n{}",
            heading(title, use_colors),
            render_rows(rows, with_meet, use_colors, term_width)
        )
    }
}

/// Format one scored event: the event name, then one line per swimmer
pub fn format_event_table(event: &EventResult, use_colors: bool) -> String {
    let rows: Vec<ResultRow> = event.entries.iter().map(ResultRow::from_entry).collect();
    event_block(&event.event.display_name(), &rows, false, use_colors, get_terminal_width())
}

fn meet_title(meet: &MeetInfo) -> String {
    let mut title = meet.name.clone();
    match (meet.start_date, meet.end_date) {
        (Some(start), Some(end)) if end != start => {
            title.push_str(&format!(" ({} to {})", start.format("%Y-%m-%d"), end.format("%Y-%m-%d")));
        }
        (Some(start), _) => title.push_str(&format!(" ({})", start.format("%Y-%m-%d"))),
        _ => {}
    }
    if let Some(course) = meet.course {
        title.push_str(&format!(" [{}]", course));
    }
    title
}

/// Format a whole meet: a title line, then each event table
pub fn format_meet_table(result: &MeetResult, use_colors: bool) -> String {
    let title = heading(&meet_title(&result.meet), use_colors);
    if result.events.is_empty() {
        return format!("{}\n\nNo scored events.", title);
    }

    let events = result
        .events
        .iter()
        .map(|event| format_event_table(event, use_colors))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{}\n\n{}", title, events)
}

fn combined_rows(group: &CombinedEvent) -> Vec<ResultRow> {
    group
        .entries
        .iter()
        .map(|e| ResultRow::from_entry(&e.entry).with_meet(&e.meet))
        .collect()
}

/// Format combined results: each event group with a meet column
pub fn format_combined_table(result: &CombinedResult, use_colors: bool) -> String {
    if result.events.is_empty() {
        return "No scored events.".to_string();
    }

    let term_width = get_terminal_width();
    result
        .events
        .iter()
        .map(|group| event_block(&group.name, &combined_rows(group), true, use_colors, term_width))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format a meet as tab-separated values for scripting
/// Columns: event, place, name, age, team, prelim time/points,
/// swimoff time/points, final time/points, best (no headers, no colors)
pub fn format_meet_tsv(result: &MeetResult) -> String {
    result
        .events
        .iter()
        .flat_map(|event| {
            let name = event.event.display_name();
            event
                .entries
                .iter()
                .map(move |entry| tsv_line(&name, &ResultRow::from_entry(entry)))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Same as `format_meet_tsv` with the meet name after the event column
pub fn format_combined_tsv(result: &CombinedResult) -> String {
    result
        .events
        .iter()
        .flat_map(|group| {
            combined_rows(group)
                .into_iter()
                .map(|row| tsv_line(&group.name, &row))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn tsv_line(event: &str, row: &ResultRow) -> String {
    let mut cells = vec![event];
    cells.extend(row.cells());
    cells.join("\t")
}
