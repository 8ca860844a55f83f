//! # surveillance-engine
//!
//! Exam supervision window coverage and consolidation.
//!
//! Given exam sessions and a catalogue of supervision windows, the engine
//! decides which windows can supervise which exams under a preparation buffer,
//! picks the tightest covering window per exam, folds per-room exam rows into
//! consolidated groups, and buckets the results into calendar views. Every
//! operation is a pure function of its input.
//!
//! ## Modules
//!
//! - [`time`] — `HH:MM` wall-clock parsing and buffered start times
//! - [`model`] — Exam sessions, supervision windows, per-row validation
//! - [`coverage`] — Coverage predicate and per-exam coverage analysis
//! - [`selector`] — Tightest-window selection with a deterministic tie-break
//! - [`grouping`] — Consolidation of per-room rows into groups
//! - [`calendar`] — ISO week → day → window views
//! - [`config`] — Buffer and window catalogue configuration
//! - [`error`] — Error types

pub mod calendar;
pub mod config;
pub mod coverage;
pub mod error;
pub mod grouping;
pub mod model;
pub mod selector;
pub mod time;

pub use calendar::{day_schedule, iso_week, week_schedule, CalendarView, IsoWeek, Scheduled};
pub use config::{EngineConfig, DEFAULT_BUFFER_MINUTES};
pub use coverage::{analyze_coverage, coverage_assignments, covers, CoverageResult};
pub use error::EngineError;
pub use grouping::{consolidate, ConsolidatedGroup};
pub use model::{validate_rows, ExamSession, SupervisionWindow, ValidationStatus};
pub use selector::{optimal_window_for, select_optimal};
pub use time::{buffered_start, to_minutes, WallTime};
