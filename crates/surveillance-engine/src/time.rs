//! Wall-clock time primitives.
//!
//! Exam and window times are plain `HH:MM` values within a single day. They are
//! compared as integer minutes since midnight; no timezone or date arithmetic is
//! involved.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

const MINUTES_PER_HOUR: u32 = 60;
const HOURS_PER_DAY: u32 = 24;

/// A wall-clock time of day, stored as minutes since midnight (`0..1440`).
///
/// Parses from `HH:MM` (a trailing `:SS` is accepted and ignored, since SQL
/// `time` columns render that way) and displays as zero-padded `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WallTime(u16);

impl WallTime {
    /// Build a time from hour and minute components.
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self> {
        if hour >= HOURS_PER_DAY || minute >= MINUTES_PER_HOUR {
            return Err(EngineError::InvalidTimeFormat(format!(
                "{:02}:{:02}",
                hour, minute
            )));
        }
        Ok(WallTime((hour * MINUTES_PER_HOUR + minute) as u16))
    }

    /// Build a time from in-range constant components.
    pub(crate) const fn at(hour: u16, minute: u16) -> Self {
        assert!(hour < 24 && minute < 60);
        WallTime(hour * 60 + minute)
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> u32 {
        u32::from(self.0)
    }

    pub fn hour(self) -> u32 {
        self.minutes() / MINUTES_PER_HOUR
    }

    pub fn minute(self) -> u32 {
        self.minutes() % MINUTES_PER_HOUR
    }
}

impl FromStr for WallTime {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || EngineError::InvalidTimeFormat(s.to_string());

        let mut parts = s.split(':');
        let hour = parts.next().ok_or_else(invalid)?;
        let minute = parts.next().ok_or_else(invalid)?;
        let second = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        let hour = parse_component(hour, 1..=2).ok_or_else(invalid)?;
        let minute = parse_component(minute, 2..=2).ok_or_else(invalid)?;
        if let Some(second) = second {
            match parse_component(second, 2..=2) {
                Some(sec) if sec < 60 => {}
                _ => return Err(invalid()),
            }
        }

        WallTime::from_hm(hour, minute).map_err(|_| invalid())
    }
}

/// Parse an all-ASCII-digit component whose length falls in `digits`.
fn parse_component(raw: &str, digits: std::ops::RangeInclusive<usize>) -> Option<u32> {
    if !digits.contains(&raw.len()) || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

impl TryFrom<String> for WallTime {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<WallTime> for String {
    fn from(t: WallTime) -> Self {
        t.to_string()
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parse a wall-clock string into minutes since midnight.
///
/// Accepts `HH:MM` and two relaxations of it: a single-digit hour (`9:30`)
/// and a trailing `:SS` seconds component, which is range-checked and then
/// discarded (`09:30:00`). Minutes must always have two digits.
///
/// # Errors
/// Returns `EngineError::InvalidTimeFormat` if the string does not match the
/// pattern or the hour/minute components are out of range.
pub fn to_minutes(time: &str) -> Result<u32> {
    time.parse::<WallTime>().map(WallTime::minutes)
}

/// The latest minute a supervisor may arrive for an exam starting at
/// `exam_start`, given a preparation buffer. May be negative for exams that
/// start shortly after midnight.
pub fn buffered_start(exam_start: WallTime, buffer_minutes: u32) -> i64 {
    i64::from(exam_start.minutes()) - i64::from(buffer_minutes)
}
