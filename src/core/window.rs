//! Inclusive time-window selection over normalized records.

use time::OffsetDateTime;

use super::record::TimedRecord;
use super::timeparse::parse_window_bound;
use crate::TimelineResult;

/// Inclusive `[start, end]` instant range.
///
/// `start <= end` is not enforced: an inverted window selects nothing, which is
/// a valid result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

impl TimeWindow {
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        TimeWindow { start, end }
    }

    /// Parse a window from two operator-supplied bound strings.
    pub fn parse(start: &str, end: &str) -> TimelineResult<Self> {
        Ok(TimeWindow { start: parse_window_bound(start)?, end: parse_window_bound(end)? })
    }

    /// Inclusive on both bounds.
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Select records whose instant falls inside `window`, preserving load order.
/// Rows without an instant are silently excluded regardless of the window.
pub fn filter_window<'a>(records: &'a [TimedRecord], window: &TimeWindow) -> Vec<&'a TimedRecord> {
    records
        .iter()
        .filter(|r| r.instant.is_some_and(|i| window.contains(i)))
        .collect()
}
