//! Fold per-room exam rows into consolidated scheduling units.
//!
//! Rows sharing a course code, date and start time describe one logical exam
//! spread over several rooms. [`consolidate`] merges them in a single pass,
//! preserving the order in which each key was first seen.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{ExamSession, ValidationStatus};
use crate::time::WallTime;

/// Composite grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    pub course_code: Option<String>,
    pub date: NaiveDate,
    pub start: WallTime,
}

/// One room's share of a consolidated exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomEntry {
    pub room: Option<String>,
    pub required_supervisors: u32,
    pub exam_id: String,
    pub validation_status: ValidationStatus,
}

/// All rows of one logical exam, merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedGroup {
    pub course_code: Option<String>,
    pub date: NaiveDate,
    pub start: WallTime,
    /// Latest end among the merged rows.
    pub end: WallTime,
    /// Subject of the first merged row.
    pub subject: String,
    /// Room entries in first-encounter order.
    pub rooms: Vec<RoomEntry>,
    /// Sum of `required_supervisors`, widened so large inputs cannot overflow.
    pub total_supervisors: u64,
    pub room_count: usize,
    /// True iff every merged row is `Validated`.
    pub can_be_validated: bool,
}

impl ConsolidatedGroup {
    fn seed(exam: &ExamSession) -> Self {
        let mut group = ConsolidatedGroup {
            course_code: exam.course_code.clone(),
            date: exam.date,
            start: exam.start,
            end: exam.end,
            subject: exam.subject.clone(),
            rooms: Vec::new(),
            total_supervisors: 0,
            room_count: 0,
            can_be_validated: true,
        };
        group.absorb(exam);
        group
    }

    fn absorb(&mut self, exam: &ExamSession) {
        self.rooms.push(RoomEntry {
            room: exam.room.clone(),
            required_supervisors: exam.required_supervisors,
            exam_id: exam.id.clone(),
            validation_status: exam.validation_status,
        });
        self.total_supervisors += u64::from(exam.required_supervisors);
        self.room_count = distinct_rooms(&self.rooms);
        self.can_be_validated &= exam.is_validated();
        self.end = self.end.max(exam.end);
    }

    pub fn key(&self) -> GroupKey {
        GroupKey {
            course_code: self.course_code.clone(),
            date: self.date,
            start: self.start,
        }
    }

    /// Re-expand the group into one exam row per room entry.
    ///
    /// Consolidating the expanded rows yields this group again.
    pub fn expand(&self) -> Vec<ExamSession> {
        self.rooms
            .iter()
            .map(|entry| ExamSession {
                id: entry.exam_id.clone(),
                course_code: self.course_code.clone(),
                subject: self.subject.clone(),
                date: self.date,
                start: self.start,
                end: self.end,
                room: entry.room.clone(),
                required_supervisors: entry.required_supervisors,
                validation_status: entry.validation_status,
            })
            .collect()
    }

    /// Roll the constituent statuses up into one status for display.
    ///
    /// All validated gives `Validated`; otherwise any rejection wins, then any
    /// pending review, else `Unprocessed`.
    pub fn overall_status(&self) -> ValidationStatus {
        let has = |status: ValidationStatus| {
            self.rooms.iter().any(|r| r.validation_status == status)
        };
        if self.can_be_validated {
            ValidationStatus::Validated
        } else if has(ValidationStatus::Rejected) {
            ValidationStatus::Rejected
        } else if has(ValidationStatus::NeedsReview) {
            ValidationStatus::NeedsReview
        } else {
            ValidationStatus::Unprocessed
        }
    }

    /// Room names joined with `", "` in insertion order; unnamed rooms are
    /// rendered as `?`.
    pub fn room_label(&self) -> String {
        self.rooms
            .iter()
            .map(|r| r.room.as_deref().unwrap_or("?"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Count distinct named rooms; each unnamed entry counts as its own room.
fn distinct_rooms(rooms: &[RoomEntry]) -> usize {
    let mut named = HashSet::new();
    let mut unnamed = 0;
    for entry in rooms {
        match &entry.room {
            Some(room) => {
                named.insert(room.as_str());
            }
            None => unnamed += 1,
        }
    }
    named.len() + unnamed
}

/// Groups in first-seen key order, with a key index for lookups.
#[derive(Default)]
struct OrderedGroups {
    groups: Vec<ConsolidatedGroup>,
    index: HashMap<GroupKey, usize>,
}

impl OrderedGroups {
    fn fold(&mut self, exam: &ExamSession) {
        // Rows without a course code cannot be told apart, so they are never merged.
        if exam.course_code.is_none() {
            self.groups.push(ConsolidatedGroup::seed(exam));
            return;
        }

        let key = GroupKey {
            course_code: exam.course_code.clone(),
            date: exam.date,
            start: exam.start,
        };
        match self.index.get(&key) {
            Some(&slot) => self.groups[slot].absorb(exam),
            None => {
                self.index.insert(key, self.groups.len());
                self.groups.push(ConsolidatedGroup::seed(exam));
            }
        }
    }
}

/// Merge exam rows sharing `(course_code, date, start)` into groups.
///
/// A single left fold in linear time: no sorting, output keys in first-seen
/// order. The sum of `total_supervisors` over the output always equals the sum
/// of `required_supervisors` over the input.
pub fn consolidate(exams: &[ExamSession]) -> Vec<ConsolidatedGroup> {
    let mut acc = OrderedGroups::default();
    for exam in exams {
        acc.fold(exam);
    }
    debug!(
        rows = exams.len(),
        groups = acc.groups.len(),
        "consolidated exam rows"
    );
    acc.groups
}

/// Flatten groups back into per-room exam rows, group by group.
pub fn expand_all(groups: &[ConsolidatedGroup]) -> Vec<ExamSession> {
    groups.iter().flat_map(ConsolidatedGroup::expand).collect()
}
