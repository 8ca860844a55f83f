//! Input records: exam sessions and supervision windows.
//!
//! These are plain data contracts. The caller fetches them from its own store
//! and hands them to the engine as immutable slices.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calendar::Scheduled;
use crate::error::{EngineError, Result};
use crate::time::WallTime;

/// Per-exam lifecycle flag for the scheduling entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    #[default]
    Unprocessed,
    Validated,
    Rejected,
    NeedsReview,
}

/// One scheduled exam occupying one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSession {
    /// Opaque identifier, unique within a snapshot.
    pub id: String,
    /// Course code. `None` when unknown; never merged with other unknown codes.
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default)]
    pub subject: String,
    pub date: NaiveDate,
    pub start: WallTime,
    pub end: WallTime,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub required_supervisors: u32,
    #[serde(default)]
    pub validation_status: ValidationStatus,
}

impl ExamSession {
    /// Check the `start < end` invariant.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidInterval` naming the exam id.
    pub fn validate(&self) -> Result<()> {
        self.validate_interval()
    }

    pub fn duration_minutes(&self) -> i64 {
        i64::from(self.end.minutes()) - i64::from(self.start.minutes())
    }

    pub fn is_validated(&self) -> bool {
        self.validation_status == ValidationStatus::Validated
    }
}

/// A candidate time range during which supervisors can be on duty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupervisionWindow {
    pub start: WallTime,
    pub end: WallTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SupervisionWindow {
    pub fn new(start: WallTime, end: WallTime) -> Self {
        Self {
            start,
            end,
            label: None,
        }
    }

    /// Parse a window from two `HH:MM` strings, checking `start < end`.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let window = Self::new(start.parse()?, end.parse()?);
        window.validate()?;
        Ok(window)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn duration_minutes(&self) -> i64 {
        i64::from(self.end.minutes()) - i64::from(self.start.minutes())
    }

    /// Check the `start < end` invariant.
    pub fn validate(&self) -> Result<()> {
        if self.start >= self.end {
            return Err(EngineError::InvalidInterval {
                subject: format!("window {}", self.display_name()),
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// The label if present, otherwise `HH:MM-HH:MM`.
    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{}-{}", self.start, self.end),
        }
    }
}

/// A rejected input row, identified by its position and exam id.
#[derive(Debug, Clone, PartialEq)]
pub struct RowDiagnostic {
    pub index: usize,
    pub exam_id: String,
    pub error: EngineError,
}

/// A batch split into rows that passed validation and per-row diagnostics.
#[derive(Debug, Clone, Default)]
pub struct RowValidation {
    pub valid: Vec<ExamSession>,
    pub rejected: Vec<RowDiagnostic>,
}

/// Validate each exam independently so one malformed row does not abort the
/// whole batch. Valid rows keep their input order.
pub fn validate_rows(exams: &[ExamSession]) -> RowValidation {
    let mut out = RowValidation::default();
    for (index, exam) in exams.iter().enumerate() {
        match exam.validate() {
            Ok(()) => out.valid.push(exam.clone()),
            Err(error) => {
                warn!(index, exam_id = %exam.id, %error, "rejecting exam row");
                out.rejected.push(RowDiagnostic {
                    index,
                    exam_id: exam.id.clone(),
                    error,
                });
            }
        }
    }
    out
}
