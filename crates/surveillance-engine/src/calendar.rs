//! Calendar views: ISO week -> day -> supervision window.
//!
//! Each scheduled item (a raw exam row or a consolidated group) is placed under
//! its optimal window on its date. Windows, days and weeks with nothing in them
//! are omitted. Items no window covers are returned separately.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::coverage::covers_interval;
use crate::error::{EngineError, Result};
use crate::grouping::ConsolidatedGroup;
use crate::model::{ExamSession, SupervisionWindow};
use crate::selector::compare_tightness;
use crate::time::WallTime;

/// ISO-8601 week: weeks start on Monday and week 1 contains the year's first
/// Thursday. `year` is the ISO week-numbering year, which differs from the
/// calendar year for some days around New Year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IsoWeek {
    pub year: i32,
    pub week: u32,
}

impl fmt::Display for IsoWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// Compute the ISO week of `date`.
pub fn iso_week(date: NaiveDate) -> IsoWeek {
    let year = date.year();
    let weekday = date.weekday().number_from_monday() as i64;
    let week = (i64::from(date.ordinal()) - weekday + 10) / 7;

    if week < 1 {
        IsoWeek {
            year: year - 1,
            week: weeks_in_year(year - 1),
        }
    } else if week as u32 > weeks_in_year(year) {
        IsoWeek {
            year: year + 1,
            week: 1,
        }
    } else {
        IsoWeek {
            year,
            week: week as u32,
        }
    }
}

/// Number of ISO weeks (52 or 53) in the ISO year `year`.
///
/// A year has 53 weeks when it ends on a Thursday, or when the previous year
/// ends on a Wednesday.
pub fn weeks_in_year(year: i32) -> u32 {
    let p = |y: i64| (y + y.div_euclid(4) - y.div_euclid(100) + y.div_euclid(400)).rem_euclid(7);
    let y = i64::from(year);
    if p(y) == 4 || p(y - 1) == 3 {
        53
    } else {
        52
    }
}

/// The Monday starting the week that contains `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Something with a date and a wall-clock interval that can be placed on the
/// calendar.
pub trait Scheduled {
    fn date(&self) -> NaiveDate;
    fn start(&self) -> WallTime;
    fn end(&self) -> WallTime;
    /// Short description used in error messages.
    fn describe(&self) -> String;

    fn validate_interval(&self) -> Result<()> {
        if self.start() >= self.end() {
            return Err(EngineError::InvalidInterval {
                subject: self.describe(),
                start: self.start(),
                end: self.end(),
            });
        }
        Ok(())
    }
}

impl Scheduled for ExamSession {
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn start(&self) -> WallTime {
        self.start
    }
    fn end(&self) -> WallTime {
        self.end
    }
    fn describe(&self) -> String {
        format!("exam {}", self.id)
    }
}

impl Scheduled for ConsolidatedGroup {
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn start(&self) -> WallTime {
        self.start
    }
    fn end(&self) -> WallTime {
        self.end
    }
    fn describe(&self) -> String {
        format!(
            "group {} on {} at {}",
            self.course_code.as_deref().unwrap_or("?"),
            self.date,
            self.start
        )
    }
}

/// A window and the items for which it is the optimal choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSlot<T> {
    pub window: SupervisionWindow,
    pub items: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule<T> {
    pub date: NaiveDate,
    /// Non-empty windows sorted by start time.
    pub windows: Vec<WindowSlot<T>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSchedule<T> {
    pub week: IsoWeek,
    /// Monday of this week.
    pub starts_on: NaiveDate,
    pub days: Vec<DaySchedule<T>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarView<T> {
    pub weeks: Vec<WeekSchedule<T>>,
    /// Items with no covering window, in input order.
    pub uncovered: Vec<T>,
}

/// Sort key for a window within a day: start, end, label, then catalogue
/// position so identical windows stay distinct.
type SlotKey = (WallTime, WallTime, Option<String>, usize);

type DayBuckets<T> = BTreeMap<NaiveDate, BTreeMap<SlotKey, WindowSlot<T>>>;

/// Index of the optimal covering window for `item`, if any.
fn optimal_index<T: Scheduled>(
    item: &T,
    catalogue: &[SupervisionWindow],
    buffer_minutes: u32,
) -> Option<usize> {
    catalogue
        .iter()
        .enumerate()
        .filter(|(_, w)| covers_interval(w, item.start(), item.end(), buffer_minutes))
        .min_by(|(_, a), (_, b)| compare_tightness(a, b))
        .map(|(idx, _)| idx)
}

/// Place every item under its optimal window on its date.
fn bucket<'a, T, I>(
    items: I,
    catalogue: &[SupervisionWindow],
    buffer_minutes: u32,
) -> Result<(DayBuckets<T>, Vec<T>)>
where
    T: Scheduled + Clone + 'a,
    I: IntoIterator<Item = &'a T>,
{
    for window in catalogue {
        window.validate()?;
    }

    let mut days: DayBuckets<T> = BTreeMap::new();
    let mut uncovered = Vec::new();
    for item in items {
        item.validate_interval()?;
        match optimal_index(item, catalogue, buffer_minutes) {
            Some(idx) => {
                let window = &catalogue[idx];
                let key = (window.start, window.end, window.label.clone(), idx);
                days.entry(item.date())
                    .or_default()
                    .entry(key)
                    .or_insert_with(|| WindowSlot {
                        window: window.clone(),
                        items: Vec::new(),
                    })
                    .items
                    .push(item.clone());
            }
            None => {
                warn!(item = %item.describe(), "no supervision window covers item");
                uncovered.push(item.clone());
            }
        }
    }
    Ok((days, uncovered))
}

fn into_day<T>(date: NaiveDate, slots: BTreeMap<SlotKey, WindowSlot<T>>) -> DaySchedule<T> {
    DaySchedule {
        date,
        windows: slots.into_values().collect(),
    }
}

/// Per-day view: the windows on `date` that are optimal for at least one item.
///
/// Items on other dates are ignored. A date with nothing scheduled yields an
/// empty `windows` list.
///
/// # Errors
/// Returns `EngineError::InvalidInterval` for an inverted window or item.
pub fn day_schedule<T: Scheduled + Clone>(
    date: NaiveDate,
    items: &[T],
    catalogue: &[SupervisionWindow],
    buffer_minutes: u32,
) -> Result<DaySchedule<T>> {
    let (mut days, _) = bucket(
        items.iter().filter(|item| item.date() == date),
        catalogue,
        buffer_minutes,
    )?;
    Ok(into_day(date, days.remove(&date).unwrap_or_default()))
}

/// Per-week view over all items, weeks and days in chronological order.
///
/// # Errors
/// Returns `EngineError::InvalidInterval` for an inverted window or item.
pub fn week_schedule<T: Scheduled + Clone>(
    items: &[T],
    catalogue: &[SupervisionWindow],
    buffer_minutes: u32,
) -> Result<CalendarView<T>> {
    let (days, uncovered) = bucket(items, catalogue, buffer_minutes)?;

    let mut weeks: BTreeMap<IsoWeek, WeekSchedule<T>> = BTreeMap::new();
    for (date, slots) in days {
        weeks
            .entry(iso_week(date))
            .or_insert_with(|| WeekSchedule {
                week: iso_week(date),
                starts_on: week_start(date),
                days: Vec::new(),
            })
            .days
            .push(into_day(date, slots));
    }

    debug!(
        items = items.len(),
        weeks = weeks.len(),
        uncovered = uncovered.len(),
        "built calendar view"
    );
    Ok(CalendarView {
        weeks: weeks.into_values().collect(),
        uncovered,
    })
}
