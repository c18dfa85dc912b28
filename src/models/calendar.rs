//! Weekly calendar and timetable configuration.
//!
//! A school week is an ordered list of weekdays crossed with an ordered
//! list of numbered periods. Every class grid has exactly
//! `weekdays.len() × periods.len()` slots.
//!
//! # Time Model
//! Periods are numbered `1..=N`. Start/end times are opaque display data;
//! the engine only uses period numbers and their adjacency within a day.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A day of the school week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Short display label (e.g., "Mon").
    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Monday => "Mon",
            Weekday::Tuesday => "Tue",
            Weekday::Wednesday => "Wed",
            Weekday::Thursday => "Thu",
            Weekday::Friday => "Fri",
            Weekday::Saturday => "Sat",
            Weekday::Sunday => "Sun",
        }
    }

    /// Monday through Friday.
    pub fn school_week() -> Vec<Weekday> {
        vec![
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
        ]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A numbered lesson period with display times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTime {
    /// Period number (1-based).
    pub number: u32,
    /// Start time, display only (e.g., "07:00").
    pub start: String,
    /// End time, display only (e.g., "07:50").
    pub end: String,
}

impl PeriodTime {
    /// Creates a period.
    pub fn new(number: u32, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            number,
            start: start.into(),
            end: end.into(),
        }
    }
}

/// A (day, period) coordinate in the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    pub day: Weekday,
    /// Period number (1-based).
    pub period: u32,
}

impl TimeSlot {
    /// Creates a coordinate.
    pub fn new(day: Weekday, period: u32) -> Self {
        Self { day, period }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.period)
    }
}

/// Timetable configuration.
///
/// Describes the weekly grid shape and how elective subjects are recognised.
/// Use [`crate::validation::validate_config`] to check it before generation;
/// the generator refuses malformed configurations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableConfig {
    /// Ordered school days.
    pub weekdays: Vec<Weekday>,
    /// Ordered periods, numbered consecutively from 1.
    pub periods: Vec<PeriodTime>,
    /// Legacy per-day subject limit. Kept for compatibility, not used by
    /// the placement rules.
    pub max_lessons_per_subject_per_day: u32,
    /// Case-insensitive marker identifying elective subjects.
    pub elective_marker: String,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self {
            weekdays: Weekday::school_week(),
            periods: vec![
                PeriodTime::new(1, "07:00", "07:50"),
                PeriodTime::new(2, "07:50", "08:40"),
                PeriodTime::new(3, "08:40", "09:30"),
                PeriodTime::new(4, "09:50", "10:40"),
                PeriodTime::new(5, "10:40", "11:30"),
                PeriodTime::new(6, "11:30", "12:20"),
                PeriodTime::new(7, "13:20", "14:10"),
                PeriodTime::new(8, "14:10", "15:00"),
                PeriodTime::new(9, "15:00", "15:50"),
            ],
            max_lessons_per_subject_per_day: 2,
            elective_marker: "ELECTIVE".to_string(),
        }
    }
}

impl TimetableConfig {
    /// Creates a configuration with the given days and `period_count`
    /// periods (display times left empty).
    pub fn new(weekdays: Vec<Weekday>, period_count: u32) -> Self {
        Self {
            weekdays,
            periods: (1..=period_count)
                .map(|n| PeriodTime::new(n, "", ""))
                .collect(),
            ..Self::default()
        }
    }

    /// Sets the elective marker.
    pub fn with_elective_marker(mut self, marker: impl Into<String>) -> Self {
        self.elective_marker = marker.into();
        self
    }

    /// Sets the periods.
    pub fn with_periods(mut self, periods: Vec<PeriodTime>) -> Self {
        self.periods = periods;
        self
    }

    /// Number of periods per day.
    #[inline]
    pub fn period_count(&self) -> u32 {
        self.periods.len() as u32
    }

    /// Number of slots per class grid.
    #[inline]
    pub fn slots_per_class(&self) -> usize {
        self.weekdays.len() * self.periods.len()
    }

    /// All coordinates in day-major order.
    pub fn slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        self.weekdays.iter().flat_map(move |&day| {
            (1..=self.period_count()).map(move |period| TimeSlot::new(day, period))
        })
    }

    /// Whether a subject name carries the elective marker.
    pub fn is_elective(&self, subject: &str) -> bool {
        is_elective_subject(subject, &self.elective_marker)
    }

    /// The coordinates reserved for electives: the last two periods of the
    /// last weekday (only the last one when the day has a single period).
    pub fn elective_slots(&self) -> Vec<TimeSlot> {
        let (Some(&day), count) = (self.weekdays.last(), self.period_count()) else {
            return Vec::new();
        };
        (count.saturating_sub(1).max(1)..=count)
            .map(|period| TimeSlot::new(day, period))
            .collect()
    }
}

/// Case-insensitive substring match of the elective marker.
pub fn is_elective_subject(subject: &str, marker: &str) -> bool {
    if marker.trim().is_empty() {
        return false;
    }
    subject.to_uppercase().contains(&marker.to_uppercase())
}
