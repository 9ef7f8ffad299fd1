//! Core types for the timeline pipeline.
//!
//! This module contains the record model, the timestamp normalizer, and the
//! time-window filter the rest of the pipeline is built on.

pub mod record;
pub mod timeparse;
pub mod window;

// Re-export key types for convenience
pub use record::{RawRecord, TimedRecord, normalize_records};
pub use timeparse::{WINDOW_PATTERN, parse_instant, parse_window_bound};
pub use window::{TimeWindow, filter_window};
