//! Decide which supervision windows can cover which exams.
//!
//! A window covers an exam when a supervisor arriving `buffer` minutes before
//! the exam start is already inside the window, and the exam ends no later
//! than the window does. There is no partial coverage and no tolerance.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{ExamSession, SupervisionWindow};
use crate::selector::select_optimal;
use crate::time::{buffered_start, WallTime};

/// A covering `(exam, window)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageAssignment {
    pub exam: ExamSession,
    pub window: SupervisionWindow,
    /// True for the single window the selector picked for this exam.
    pub is_optimal: bool,
}

/// Coverage outcome for one exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageResult {
    pub exam: ExamSession,
    /// Every covering window, in catalogue order.
    pub matched_windows: Vec<SupervisionWindow>,
    /// The tightest covering window, if any.
    pub optimal: Option<SupervisionWindow>,
    pub is_covered: bool,
}

/// Dashboard counters over a set of coverage results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub total: usize,
    pub covered: usize,
    pub uncovered: usize,
    /// Ids of uncovered exams, in input order.
    pub uncovered_ids: Vec<String>,
}

impl CoverageSummary {
    pub fn from_results(results: &[CoverageResult]) -> Self {
        let uncovered_ids: Vec<String> = results
            .iter()
            .filter(|r| !r.is_covered)
            .map(|r| r.exam.id.clone())
            .collect();
        Self {
            total: results.len(),
            covered: results.len() - uncovered_ids.len(),
            uncovered: uncovered_ids.len(),
            uncovered_ids,
        }
    }
}

/// Does `window` cover `exam` with the given preparation buffer?
///
/// Order matters: the first argument is the window, the second the exam.
pub fn covers(window: &SupervisionWindow, exam: &ExamSession, buffer_minutes: u32) -> bool {
    covers_interval(window, exam.start, exam.end, buffer_minutes)
}

/// [`covers`] for a bare `start..end` interval, used for consolidated groups.
pub fn covers_interval(
    window: &SupervisionWindow,
    start: WallTime,
    end: WallTime,
    buffer_minutes: u32,
) -> bool {
    let required_arrival = buffered_start(start, buffer_minutes);
    required_arrival >= i64::from(window.start.minutes()) && end <= window.end
}

/// All windows in `catalogue` that cover `exam`, in catalogue order.
pub fn covering_windows<'a>(
    exam: &ExamSession,
    catalogue: &'a [SupervisionWindow],
    buffer_minutes: u32,
) -> Vec<&'a SupervisionWindow> {
    catalogue
        .iter()
        .filter(|window| covers(window, exam, buffer_minutes))
        .collect()
}

/// Evaluate coverage for every exam against the whole catalogue.
///
/// Results follow input order. An uncovered exam yields `is_covered = false`
/// and an empty `matched_windows`; it is not an error.
///
/// # Errors
/// Returns `EngineError::InvalidInterval` if any exam or window has
/// `start >= end`. Use [`crate::validate_rows`] first to drop bad rows
/// individually.
pub fn analyze_coverage(
    exams: &[ExamSession],
    catalogue: &[SupervisionWindow],
    buffer_minutes: u32,
) -> Result<Vec<CoverageResult>> {
    validate_inputs(exams, catalogue)?;
    debug!(
        exams = exams.len(),
        windows = catalogue.len(),
        buffer_minutes,
        "analyzing coverage"
    );

    let results = exams
        .iter()
        .map(|exam| {
            let matched = covering_windows(exam, catalogue, buffer_minutes);
            let optimal = select_optimal(matched.iter().copied()).cloned();
            if optimal.is_none() {
                warn!(
                    exam_id = %exam.id,
                    date = %exam.date,
                    start = %exam.start,
                    end = %exam.end,
                    "exam is not covered by any supervision window"
                );
            }
            CoverageResult {
                exam: exam.clone(),
                is_covered: optimal.is_some(),
                matched_windows: matched.into_iter().cloned().collect(),
                optimal,
            }
        })
        .collect();

    Ok(results)
}

/// Every covering `(exam, window)` pair, exam-major in input order, with
/// `is_optimal` set on the selected window of each exam.
///
/// # Errors
/// Same as [`analyze_coverage`].
pub fn coverage_assignments(
    exams: &[ExamSession],
    catalogue: &[SupervisionWindow],
    buffer_minutes: u32,
) -> Result<Vec<CoverageAssignment>> {
    validate_inputs(exams, catalogue)?;

    let mut assignments = Vec::new();
    for exam in exams {
        let matched = covering_windows(exam, catalogue, buffer_minutes);
        let optimal = select_optimal(matched.iter().copied());
        for window in matched {
            assignments.push(CoverageAssignment {
                exam: exam.clone(),
                window: window.clone(),
                is_optimal: optimal.is_some_and(|o| std::ptr::eq(o, window)),
            });
        }
    }
    Ok(assignments)
}

fn validate_inputs(exams: &[ExamSession], catalogue: &[SupervisionWindow]) -> Result<()> {
    for window in catalogue {
        window.validate()?;
    }
    for exam in exams {
        exam.validate()?;
    }
    Ok(())
}
