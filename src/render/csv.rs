//! CSV export for timeline rows.

use std::io::Write;
use std::path::Path;

use crate::TimelineError;
use crate::render::TimelineRow;

/// CSV column headers in deterministic order. `datalist` is the cleaned full
/// payload; `raw_key` keeps the original store key for traceability.
pub const CSV_HEADERS: &[&str] = &["key", "activity", "datalist", "preview", "raw_key"];

/// CSV exporter for timeline rows.
///
/// The export is the ground-truth artifact: every retained record appears with
/// its full, untruncated payload, in load order.
#[derive(Debug, Clone, Default)]
pub struct TimelineCsvExporter;

impl TimelineCsvExporter {
    pub fn new() -> Self {
        TimelineCsvExporter
    }

    /// Export rows to a CSV file, creating parent directories as needed.
    pub fn export(&self, rows: &[TimelineRow], output: &Path) -> Result<(), TimelineError> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| TimelineError::Message(format!("failed to create directory: {e}")))?;
            }
        }

        let file = std::fs::File::create(output)
            .map_err(|e| TimelineError::Message(format!("failed to create file: {e}")))?;

        self.export_to_writer(rows, file)
    }

    /// Export rows to any writer implementing Write.
    pub fn export_to_writer<W: Write>(
        &self,
        rows: &[TimelineRow],
        writer: W,
    ) -> Result<(), TimelineError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer
            .write_record(CSV_HEADERS)
            .map_err(|e| TimelineError::Message(format!("failed to write CSV headers: {e}")))?;

        for row in rows {
            csv_writer
                .write_record([
                    row.key.as_str(),
                    row.activity.as_str(),
                    row.datalist.as_str(),
                    row.preview.as_str(),
                    row.raw_key.as_str(),
                ])
                .map_err(|e| TimelineError::Message(format!("failed to write CSV row: {e}")))?;
        }

        csv_writer
            .flush()
            .map_err(|e| TimelineError::Message(format!("failed to flush CSV writer: {e}")))?;

        Ok(())
    }
}
