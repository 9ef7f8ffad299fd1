//! Session driver smoke tests: one loaded store, repeated filter+render
//! cycles, artifact uniqueness, and empty-window short-circuiting.

use std::path::PathBuf;

use droidline::core::TimeWindow;
use droidline::session::{FixedWindows, PhaseTimings, SessionConfig, run_session};
use rusqlite::Connection;

fn scratch_store(rows: &[(&str, &str, &str)]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tl.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute("CREATE TABLE data (key TEXT, activity TEXT, datalist TEXT)", [])
        .unwrap();
    for (key, activity, datalist) in rows {
        conn.execute(
            "INSERT INTO data (key, activity, datalist) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, activity, datalist],
        )
        .unwrap();
    }
    (dir, path)
}

fn session_config(store_path: PathBuf, output_dir: PathBuf) -> SessionConfig {
    SessionConfig {
        store_path,
        output_dir,
        device_info_html: "<p>test device</p>".to_string(),
        report_index: None,
        open_viewer: false,
    }
}

fn window(start: &str, end: &str) -> TimeWindow {
    TimeWindow::parse(start, end).unwrap()
}

#[test]
fn repeated_windows_get_distinct_artifact_pairs() {
    let (_store_dir, store_path) =
        scratch_store(&[("2024-07-14 10:00:00", "Usage", "a payload")]);
    let out_dir = tempfile::tempdir().unwrap();
    let cfg = session_config(store_path, out_dir.path().to_path_buf());

    let day = window("2024-07-14 00:00:00", "2024-07-14 23:59:59");
    let mut windows = FixedWindows::new(vec![day, day]);
    let summary = run_session(&cfg, &mut windows, PhaseTimings::default()).unwrap();

    assert_eq!(summary.iterations, 2);
    assert_eq!(summary.artifacts.len(), 2);
    assert_ne!(summary.artifacts[0].csv, summary.artifacts[1].csv);
    assert_ne!(summary.artifacts[0].html, summary.artifacts[1].html);
    for pair in &summary.artifacts {
        assert!(pair.csv.exists());
        assert!(pair.html.exists());
    }
}

#[test]
fn empty_window_short_circuits_without_files() {
    let (_store_dir, store_path) =
        scratch_store(&[("2024-07-14 10:00:00", "Usage", "a payload")]);
    let out_dir = tempfile::tempdir().unwrap();
    let cfg = session_config(store_path, out_dir.path().to_path_buf());

    // start after end: valid request, empty result
    let inverted = window("2024-07-16 00:00:00", "2024-07-15 00:00:00");
    let mut windows = FixedWindows::new(vec![inverted]);
    let summary = run_session(&cfg, &mut windows, PhaseTimings::default()).unwrap();

    assert_eq!(summary.iterations, 1);
    assert!(summary.artifacts.is_empty());
    let leftover: Vec<_> = std::fs::read_dir(out_dir.path())
        .map(|entries| entries.flatten().collect())
        .unwrap_or_default();
    assert!(leftover.is_empty(), "no artifact files for an empty window");
}

#[test]
fn missing_store_yields_empty_session_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let cfg = session_config(dir.path().join("absent.db"), out_dir.path().to_path_buf());

    let day = window("2024-07-14 00:00:00", "2024-07-14 23:59:59");
    let mut windows = FixedWindows::new(vec![day]);
    let summary = run_session(&cfg, &mut windows, PhaseTimings::default()).unwrap();

    assert_eq!(summary.rows_loaded, 0);
    assert!(summary.artifacts.is_empty());
    assert!(summary.store_sha256.is_none());
}

#[test]
fn csv_artifact_keeps_full_payload_and_truncates_preview() {
    let long_payload = "A".repeat(150);
    let (_store_dir, store_path) =
        scratch_store(&[("2024-07-14 10:00:00", "Usage", long_payload.as_str())]);
    let out_dir = tempfile::tempdir().unwrap();
    let cfg = session_config(store_path, out_dir.path().to_path_buf());

    let day = window("2024-07-14 00:00:00", "2024-07-14 23:59:59");
    let mut windows = FixedWindows::new(vec![day]);
    let summary = run_session(&cfg, &mut windows, PhaseTimings::default()).unwrap();

    let mut reader = csv::Reader::from_path(&summary.artifacts[0].csv).unwrap();
    let record = reader.records().next().unwrap().unwrap();
    assert_eq!(&record[0], "2024-07-14 10:00:00");
    assert_eq!(&record[1], "Usage");
    assert_eq!(&record[2], long_payload);
    assert_eq!(&record[3], format!("{}…", "A".repeat(100)));
    assert_eq!(&record[4], "2024-07-14 10:00:00");
}

#[test]
fn html_artifact_embeds_device_metadata() {
    let (_store_dir, store_path) =
        scratch_store(&[("2024-07-14 10:00:00", "Usage", "a payload")]);
    let out_dir = tempfile::tempdir().unwrap();
    let cfg = session_config(store_path, out_dir.path().to_path_buf());

    let day = window("2024-07-14 00:00:00", "2024-07-14 23:59:59");
    let mut windows = FixedWindows::new(vec![day]);
    let summary = run_session(&cfg, &mut windows, PhaseTimings::default()).unwrap();

    let html = std::fs::read_to_string(&summary.artifacts[0].html).unwrap();
    assert!(html.contains("<p>test device</p>"));
    assert!(html.contains("a payload"));
}

#[test]
fn session_summary_fingerprints_the_store() {
    let (_store_dir, store_path) =
        scratch_store(&[("2024-07-14 10:00:00", "Usage", "a payload")]);
    let out_dir = tempfile::tempdir().unwrap();
    let cfg = session_config(store_path.clone(), out_dir.path().to_path_buf());

    let mut windows = FixedWindows::new(vec![]);
    let summary = run_session(&cfg, &mut windows, PhaseTimings::default()).unwrap();

    assert_eq!(summary.iterations, 0);
    assert_eq!(summary.rows_loaded, 1);
    let expected = droidline::sha256_hex(&std::fs::read(&store_path).unwrap());
    assert_eq!(summary.store_sha256.as_deref(), Some(expected.as_str()));
}
