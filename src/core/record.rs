//! Record model for extraction timeline rows.

use time::OffsetDateTime;

use super::timeparse::parse_instant;

/// One row as stored: free-form timestamp key, categorical activity label,
/// unbounded textual payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub key: String,
    pub activity: String,
    pub datalist: String,
}

/// A raw record annotated with its canonical instant.
///
/// `instant` is `None` when the key failed both parse tiers. Such rows are
/// retained here and only drop out at window filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedRecord {
    pub raw: RawRecord,
    pub instant: Option<OffsetDateTime>,
}

/// Derive instants for a loaded row set, preserving order. Runs once per load;
/// records are never re-normalized afterwards.
pub fn normalize_records(rows: Vec<RawRecord>) -> Vec<TimedRecord> {
    rows.into_iter()
        .map(|raw| {
            let instant = parse_instant(&raw.key);
            TimedRecord { raw, instant }
        })
        .collect()
}
