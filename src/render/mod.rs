//! Timeline rendering: filtered records → CSV export + interactive HTML.
//!
//! Row shaping lives here as pure functions; the two artifact writers are in
//! [`csv`] and [`html`]. The CSV is the ground truth (full payload), the HTML
//! carries a truncated preview per point plus the full payload as auxiliary
//! data for click-to-expand.

pub mod csv;
pub mod html;

use serde::Serialize;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::core::TimedRecord;

/// Hover/preview truncation limit, in characters.
pub const PREVIEW_LIMIT: usize = 100;
/// Category-axis label truncation limit, in characters.
pub const ACTIVITY_LABEL_LIMIT: usize = 40;
/// Chart canvas floor in pixels.
pub const MIN_CHART_HEIGHT: u32 = 700;
/// Extra canvas pixels per distinct activity label.
pub const HEIGHT_PER_ACTIVITY: u32 = 20;

const KEY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// One renderable timeline point. `datalist` is the cleaned full payload;
/// `preview` is its truncated, angle-bracket-escaped form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineRow {
    pub key: String,
    pub activity: String,
    pub datalist: String,
    pub preview: String,
    pub raw_key: String,
    pub activity_label: String,
}

/// Collapse all whitespace runs to single spaces and trim.
pub fn clean_payload(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `limit` characters of `payload` and whether anything was cut.
pub fn truncate_preview(payload: &str, limit: usize) -> (&str, bool) {
    match payload.char_indices().nth(limit) {
        Some((idx, _)) => (&payload[..idx], true),
        None => (payload, false),
    }
}

/// Escape `<` and `>` so payload fragments cannot be interpreted as markup.
pub fn escape_angle_brackets(s: &str) -> String {
    s.replace('<', "&lt;").replace('>', "&gt;")
}

fn char_prefix(s: &str, limit: usize) -> &str {
    truncate_preview(s, limit).0
}

/// Shape filtered records into renderable rows, preserving input order.
///
/// Rows without an instant cannot be placed on the axis and are skipped; the
/// window filter has already excluded them under normal operation.
pub fn build_rows(records: &[&TimedRecord]) -> Vec<TimelineRow> {
    records
        .iter()
        .filter_map(|record| {
            let instant = record.instant?;
            let key = instant.format(KEY_FORMAT).unwrap_or_else(|_| "".to_string());
            let datalist = clean_payload(&record.raw.datalist);
            let (cut, truncated) = truncate_preview(&datalist, PREVIEW_LIMIT);
            let mut preview = escape_angle_brackets(cut);
            if truncated {
                preview.push('…');
            }
            Some(TimelineRow {
                key,
                activity: record.raw.activity.clone(),
                datalist,
                preview,
                raw_key: record.raw.key.clone(),
                activity_label: char_prefix(&record.raw.activity, ACTIVITY_LABEL_LIMIT)
                    .to_string(),
            })
        })
        .collect()
}

/// Distinct activity labels in first-appearance order. The chart reverses this
/// for display so the first-seen category sits at the top.
pub fn category_order(rows: &[TimelineRow]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    rows.iter()
        .filter(|row| seen.insert(row.activity_label.clone()))
        .map(|row| row.activity_label.clone())
        .collect()
}

/// Canvas height scales with category count so labels stay legible on
/// high-cardinality activity sets.
pub fn chart_height(distinct_labels: usize) -> u32 {
    MIN_CHART_HEIGHT.max(HEIGHT_PER_ACTIVITY.saturating_mul(distinct_labels as u32))
}
