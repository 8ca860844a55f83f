//! Pick the tightest covering window for an exam.
//!
//! The tightest window is the one with the smallest duration: it keeps
//! supervisors on duty for the least idle time. Equal durations are broken by
//! earliest start, then earliest end, then label (unlabelled first), so the
//! choice does not depend on catalogue order.

use std::cmp::Ordering;

use crate::coverage::covers;
use crate::model::{ExamSession, SupervisionWindow};

/// Choose the optimal window among `candidates`, or `None` if there are none.
///
/// The candidates are assumed to already cover the exam; see
/// [`optimal_window_for`] for the filtering variant.
pub fn select_optimal<'a, I>(candidates: I) -> Option<&'a SupervisionWindow>
where
    I: IntoIterator<Item = &'a SupervisionWindow>,
{
    candidates.into_iter().min_by(|a, b| compare_tightness(a, b))
}

/// Filter `catalogue` to the windows covering `exam`, then select the optimal
/// one. `None` means the exam is uncovered.
pub fn optimal_window_for<'a>(
    exam: &ExamSession,
    catalogue: &'a [SupervisionWindow],
    buffer_minutes: u32,
) -> Option<&'a SupervisionWindow> {
    select_optimal(
        catalogue
            .iter()
            .filter(|window| covers(window, exam, buffer_minutes)),
    )
}

/// Total order used by the selector: duration, start, end, label.
pub fn compare_tightness(a: &SupervisionWindow, b: &SupervisionWindow) -> Ordering {
    a.duration_minutes()
        .cmp(&b.duration_minutes())
        .then_with(|| a.start.cmp(&b.start))
        .then_with(|| a.end.cmp(&b.end))
        .then_with(|| a.label.cmp(&b.label))
}
