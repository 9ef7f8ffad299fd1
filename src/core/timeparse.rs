//! Timestamp normalization for inconsistent extraction-key formats.
//!
//! Extraction stores mix RFC 3339 keys with offset-less dialects and outright
//! garbage, sometimes with a malformed timezone fragment appended. Parsing here
//! is a total function: every input maps to either a UTC instant or `None`,
//! never an error, so no row is discarded at parse time.

use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::{TimelineError, TimelineResult};

/// Pattern accepted for operator-supplied window bounds.
pub const WINDOW_PATTERN: &str = "YYYY-MM-DD HH:MM:SS";

const WINDOW_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

// Offset-less dialects seen in extraction keys, tried in order after RFC 3339.
const DATETIME_T_SUBSEC: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
const DATETIME_T: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const DATETIME_SPACE_SUBSEC: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]");
const DATETIME_SPACE: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const DATE_ONLY: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Normalize an extraction key to a UTC instant.
///
/// Two tiers: direct parsing first (offset-less forms are assumed UTC), then a
/// retry with everything from the first `+` stripped — source data carries
/// malformed offset fragments like `+05:00weird`. First successful parse wins;
/// `None` marks a key that is not a time.
pub fn parse_instant(raw: &str) -> Option<OffsetDateTime> {
    if let Some(instant) = parse_direct(raw) {
        return Some(instant);
    }
    strip_offset_suffix(raw).and_then(parse_direct)
}

fn parse_direct(s: &str) -> Option<OffsetDateTime> {
    if let Ok(odt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(odt.to_offset(UtcOffset::UTC));
    }
    for format in [DATETIME_T_SUBSEC, DATETIME_T, DATETIME_SPACE_SUBSEC, DATETIME_SPACE] {
        if let Ok(pdt) = PrimitiveDateTime::parse(s, format) {
            return Some(pdt.assume_utc());
        }
    }
    Date::parse(s, DATE_ONLY).ok().map(|d| d.midnight().assume_utc())
}

/// Everything before the first `+`, or `None` when there is nothing to strip.
fn strip_offset_suffix(s: &str) -> Option<&str> {
    s.find('+').map(|idx| &s[..idx])
}

/// Parse an operator-supplied window bound, accepting exactly [`WINDOW_PATTERN`].
pub fn parse_window_bound(s: &str) -> TimelineResult<OffsetDateTime> {
    PrimitiveDateTime::parse(s, WINDOW_FORMAT)
        .map(|pdt| pdt.assume_utc())
        .map_err(|_| {
            TimelineError::Message(format!(
                "invalid datetime '{s}', expected '{WINDOW_PATTERN}'"
            ))
        })
}
