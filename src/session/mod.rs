//! Session driver: one loaded store, many filter+render cycles.
//!
//! The driver loads and normalizes the record store once, then pulls time
//! windows from a [`WindowSource`] until the source signals stop, producing a
//! uniquely named CSV/HTML artifact pair per non-empty window. Per-phase
//! durations accumulate in a session-scoped [`PhaseTimings`] value and are
//! reported in the final [`SessionSummary`].

pub mod prompt;

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::{info, warn};

use crate::core::{TimeWindow, filter_window, normalize_records};
use crate::render::html::TimelinePage;
use crate::render::{TimelineRow, build_rows, csv::TimelineCsvExporter, html};
use crate::{SystemInfo, TimelineError, TimelineResult, collect_system_info, now_string, sha256_hex, store};

const STAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]_[hour][minute][second]");

/// Supplies time windows to the session loop.
///
/// The driver pulls; the front end answers with the next window or `None` to
/// end the session. This keeps the core free of any terminal dependency —
/// batch and interactive front ends implement the same contract.
pub trait WindowSource {
    fn next_window(&mut self) -> Option<TimeWindow>;
}

/// A fixed, pre-validated window sequence (CLI args, batch file).
pub struct FixedWindows {
    queue: VecDeque<TimeWindow>,
}

impl FixedWindows {
    pub fn new(windows: Vec<TimeWindow>) -> Self {
        FixedWindows { queue: windows.into() }
    }
}

impl WindowSource for FixedWindows {
    fn next_window(&mut self) -> Option<TimeWindow> {
        self.queue.pop_front()
    }
}

/// One entry of a batch windows file.
#[derive(Debug, Clone, Deserialize)]
pub struct WindowSpec {
    pub start: String,
    pub end: String,
}

/// Load a YAML batch file of time windows. Malformed entries are reported and
/// skipped; only an unreadable or structurally invalid file is an error.
pub fn load_windows_file(path: &Path) -> TimelineResult<Vec<TimeWindow>> {
    let bytes = std::fs::read(path)
        .map_err(|e| TimelineError::Message(format!("failed to read windows file: {e}")))?;
    let specs: Vec<WindowSpec> = serde_yaml::from_slice(&bytes)
        .map_err(|e| TimelineError::Message(format!("invalid windows file: {e}")))?;

    let mut windows = Vec::with_capacity(specs.len());
    for spec in specs {
        match TimeWindow::parse(&spec.start, &spec.end) {
            Ok(window) => windows.push(window),
            Err(e) => warn!(start = %spec.start, end = %spec.end, %e, "skipping malformed window"),
        }
    }
    Ok(windows)
}

/// Assemble the window source for a CLI invocation: a batch file extends the
/// initial window with its entries; `interactive` switches to the prompting
/// front end with the initial window served first.
pub fn source_from_cli(
    initial: TimeWindow,
    windows_file: Option<&Path>,
    interactive: bool,
    default_start: String,
    default_end: String,
) -> TimelineResult<Box<dyn WindowSource>> {
    if let Some(path) = windows_file {
        let mut windows = vec![initial];
        windows.extend(load_windows_file(path)?);
        return Ok(Box::new(FixedWindows::new(windows)));
    }
    if interactive {
        return Ok(Box::new(prompt::PromptWindows::from_stdio(
            Some(initial),
            default_start,
            default_end,
        )));
    }
    Ok(Box::new(FixedWindows::new(vec![initial])))
}

/// Cumulative per-phase durations for one session. Passed into the driver and
/// carried through each phase call rather than living in ambient state.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PhaseTimings {
    pub extraction_ms: u128,
    pub data_ms: u128,
    pub render_ms: u128,
}

impl PhaseTimings {
    pub fn record_extraction(&mut self, elapsed: Duration) {
        self.extraction_ms += elapsed.as_millis();
    }

    pub fn record_data(&mut self, elapsed: Duration) {
        self.data_ms += elapsed.as_millis();
    }

    pub fn record_render(&mut self, elapsed: Duration) {
        self.render_ms += elapsed.as_millis();
    }

    pub fn total_ms(&self) -> u128 {
        self.extraction_ms + self.data_ms + self.render_ms
    }
}

/// One iteration's output files.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactPair {
    pub csv: PathBuf,
    pub html: PathBuf,
}

/// Operator-facing session report, emitted once at session end.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub generated_at: String,
    pub store_path: PathBuf,
    pub store_sha256: Option<String>,
    pub rows_loaded: usize,
    pub iterations: u32,
    pub artifacts: Vec<ArtifactPair>,
    pub timings: PhaseTimings,
    pub peak_memory_bytes: Option<u64>,
    pub system: SystemInfo,
}

impl SessionSummary {
    pub fn print_human(&self) {
        println!("\n=== Processing Summary (excluding user input) ===");
        println!("Extraction runtime: {:.2} s", self.timings.extraction_ms as f64 / 1000.0);
        println!("Data load/filter runtime: {:.2} s", self.timings.data_ms as f64 / 1000.0);
        println!("Timeline generation runtime: {:.2} s", self.timings.render_ms as f64 / 1000.0);
        println!("Total processing runtime: {:.2} s", self.timings.total_ms() as f64 / 1000.0);
        println!(
            "Windows rendered: {} ({} artifact pairs, {} rows loaded)",
            self.iterations,
            self.artifacts.len(),
            self.rows_loaded
        );
    }
}

/// Everything the driver needs besides the window sequence.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub store_path: PathBuf,
    pub output_dir: PathBuf,
    /// Device-metadata markup embedded into each HTML artifact.
    pub device_info_html: String,
    /// Full-report location linked from each HTML artifact.
    pub report_index: Option<PathBuf>,
    /// Open each generated HTML artifact in the default viewer.
    pub open_viewer: bool,
}

#[cfg(feature = "mem")]
fn capture_peak_mem() -> Option<u64> {
    use sysinfo::{MemoryRefreshKind, RefreshKind, System};
    let mut sys = System::new_with_specifics(
        RefreshKind::new().with_memory(MemoryRefreshKind::new().with_ram()),
    );
    sys.refresh_memory();
    Some(sys.total_memory() - sys.free_memory())
}

#[cfg(not(feature = "mem"))]
fn capture_peak_mem() -> Option<u64> {
    None
}

/// Run one session: load once, then filter+render per supplied window.
///
/// `timings` arrives pre-populated when an extraction phase ran before the
/// session (the `run` command); the driver only ever adds to it.
pub fn run_session(
    cfg: &SessionConfig,
    windows: &mut dyn WindowSource,
    mut timings: PhaseTimings,
) -> TimelineResult<SessionSummary> {
    let data_start = Instant::now();
    let records = normalize_records(store::read_store(&cfg.store_path));
    timings.record_data(data_start.elapsed());
    let rows_loaded = records.len();

    // Evidence-integrity fingerprint of the store as examined.
    let store_sha256 = std::fs::read(&cfg.store_path).ok().map(|bytes| sha256_hex(&bytes));

    let mut artifacts = Vec::new();
    let mut iterations = 0u32;
    while let Some(window) = windows.next_window() {
        iterations += 1;
        info!(iteration = iterations, start = %window.start, end = %window.end, "rendering window");

        let filter_start = Instant::now();
        let selected = filter_window(&records, &window);
        timings.record_data(filter_start.elapsed());
        info!(retained = selected.len(), "filtered records for window");

        let render_start = Instant::now();
        let rows = build_rows(&selected);
        if rows.is_empty() {
            info!("no records in window, skipping artifact generation");
            timings.record_render(render_start.elapsed());
            continue;
        }
        let pair = write_artifacts(cfg, &rows, iterations)?;
        timings.record_render(render_start.elapsed());

        if cfg.open_viewer {
            if let Err(e) = open::that(&pair.html) {
                warn!(%e, "failed to open timeline in viewer");
            }
        }
        artifacts.push(pair);
    }

    Ok(SessionSummary {
        generated_at: now_string(),
        store_path: cfg.store_path.clone(),
        store_sha256,
        rows_loaded,
        iterations,
        artifacts,
        timings,
        peak_memory_bytes: capture_peak_mem(),
        system: collect_system_info(),
    })
}

/// Write one CSV/HTML pair with a UTC-stamp + iteration suffix so repeated
/// windows in one session never overwrite each other.
fn write_artifacts(
    cfg: &SessionConfig,
    rows: &[TimelineRow],
    iteration: u32,
) -> TimelineResult<ArtifactPair> {
    std::fs::create_dir_all(&cfg.output_dir)
        .map_err(|e| TimelineError::Message(format!("failed to create output directory: {e}")))?;

    let stamp = OffsetDateTime::now_utc()
        .format(STAMP_FORMAT)
        .unwrap_or_else(|_| "".to_string());
    let stem = format!("timeline_{stamp}_{iteration:02}");
    let csv_path = cfg.output_dir.join(format!("{stem}.csv"));
    let html_path = cfg.output_dir.join(format!("{stem}.html"));

    TimelineCsvExporter::new().export(rows, &csv_path)?;
    let page = TimelinePage {
        rows,
        device_info_html: &cfg.device_info_html,
        report_index: cfg.report_index.as_deref(),
    };
    html::write_html(&html_path, &page)?;

    info!(csv = %csv_path.display(), html = %html_path.display(), "timeline artifacts written");
    Ok(ArtifactPair { csv: csv_path, html: html_path })
}
