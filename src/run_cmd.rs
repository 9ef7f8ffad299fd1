//! `run` command: invoke the extraction collaborator, then drive a timeline
//! session over its record store.

use std::path::PathBuf;
use std::time::Instant;

use tracing::info;

use crate::core::TimeWindow;
use crate::extractor::{self, ExtractorConfig};
use crate::session::{self, PhaseTimings, SessionConfig};
use crate::{TimelineResult, write_json};

pub fn run(
    input: PathBuf,
    output: PathBuf,
    aleapp_dir: PathBuf,
    template: Option<String>,
    start: String,
    end: String,
    windows_file: Option<PathBuf>,
    interactive: bool,
    no_open: bool,
    json_out: Option<PathBuf>,
) -> TimelineResult<()> {
    let initial = TimeWindow::parse(&start, &end)?;

    let mut extractor_cfg = ExtractorConfig::new(aleapp_dir);
    if let Some(template) = template {
        extractor_cfg = extractor_cfg.with_template(template);
    }

    info!("starting extraction");
    let mut timings = PhaseTimings::default();
    let extraction_start = Instant::now();
    let report_location = extractor::run_extraction(&extractor_cfg, &input, &output)?;
    timings.record_extraction(extraction_start.elapsed());
    info!(
        report = %report_location.display(),
        elapsed_ms = timings.extraction_ms,
        "extraction completed"
    );

    extractor::list_report_files(&report_location);

    let session_cfg = SessionConfig {
        store_path: extractor::timeline_db_path(&report_location),
        output_dir: output,
        device_info_html: extractor::device_info_html(&report_location),
        report_index: Some(extractor::report_index_path(&report_location)),
        open_viewer: !no_open,
    };
    let mut windows =
        session::source_from_cli(initial, windows_file.as_deref(), interactive, start, end)?;
    let summary = session::run_session(&session_cfg, windows.as_mut(), timings)?;

    summary.print_human();
    if let Some(path) = json_out {
        write_json(&path, &summary)?;
    }
    Ok(())
}
