//! `timeline` command: drive a session against an existing extraction report
//! (or an explicit record store) without re-running extraction.

use std::path::PathBuf;

use crate::core::TimeWindow;
use crate::extractor;
use crate::session::{self, PhaseTimings, SessionConfig};
use crate::{TimelineError, TimelineResult, write_json};

pub fn run(
    report: Option<PathBuf>,
    store: Option<PathBuf>,
    output: PathBuf,
    start: String,
    end: String,
    windows_file: Option<PathBuf>,
    interactive: bool,
    no_open: bool,
    json_out: Option<PathBuf>,
) -> TimelineResult<()> {
    let initial = TimeWindow::parse(&start, &end)?;

    let store_path = match (&store, &report) {
        (Some(store), _) => store.clone(),
        (None, Some(report)) => extractor::timeline_db_path(report),
        (None, None) => {
            return Err(TimelineError::Message(
                "either --report or --store is required".into(),
            ));
        }
    };
    let device_info_html = report
        .as_deref()
        .map(extractor::device_info_html)
        .unwrap_or_else(|| extractor::DEVICE_INFO_PLACEHOLDER.to_string());
    let report_index = report.as_deref().map(extractor::report_index_path);

    let session_cfg = SessionConfig {
        store_path,
        output_dir: output,
        device_info_html,
        report_index,
        open_viewer: !no_open,
    };
    let mut windows =
        session::source_from_cli(initial, windows_file.as_deref(), interactive, start, end)?;
    let summary =
        session::run_session(&session_cfg, windows.as_mut(), PhaseTimings::default())?;

    summary.print_human();
    if let Some(path) = json_out {
        write_json(&path, &summary)?;
    }
    Ok(())
}
