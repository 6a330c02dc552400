//! CSV exports of a user's journal and goals.
//!
//! Documents start with a UTF-8 byte order mark so spreadsheet tools detect
//! the encoding, use CRLF line endings and quote fields per RFC 4180.

use super::{Goal, MoodEntry};

const BOM: char = '\u{feff}';
const LINE_END: &str = "\r\n";

/// Header row for mood exports.
pub const MOOD_CSV_HEADER: [&str; 3] = ["date", "mood", "notes"];
/// Header row for goal exports.
pub const GOAL_CSV_HEADER: [&str; 6] = [
    "title",
    "category",
    "status",
    "progress",
    "priority",
    "target_date",
];

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

fn push_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    let row = fields.into_iter().map(quote).collect::<Vec<_>>().join(",");
    out.push_str(&row);
    out.push_str(LINE_END);
}

fn document<'h>(header: impl IntoIterator<Item = &'h str>, rows: Vec<Vec<String>>) -> String {
    let mut out = String::new();
    out.push(BOM);
    push_row(&mut out, header);
    for row in &rows {
        push_row(&mut out, row.iter().map(String::as_str));
    }
    out
}

/// Render mood entries as CSV, one row per entry in the given order.
///
/// # Examples
/// ```
/// use mindtrack::domain::export::mood_entries_csv;
///
/// let csv = mood_entries_csv(&[]);
/// assert_eq!(csv, "\u{feff}date,mood,notes\r\n");
/// ```
pub fn mood_entries_csv(entries: &[MoodEntry]) -> String {
    let rows = entries
        .iter()
        .map(|entry| {
            vec![
                entry.recorded_at.to_rfc3339(),
                entry.score.value().to_string(),
                entry.notes.as_ref().to_owned(),
            ]
        })
        .collect();
    document(MOOD_CSV_HEADER, rows)
}

/// Render goals as CSV, one row per goal in the given order.
pub fn goals_csv(goals: &[Goal]) -> String {
    let rows = goals
        .iter()
        .map(|goal| {
            vec![
                goal.title.clone(),
                goal.category.to_string(),
                goal.status.to_string(),
                goal.progress.value().to_string(),
                goal.priority.to_string(),
                goal.target_date.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();
    document(GOAL_CSV_HEADER, rows)
}
