//! Weekly calendar: school days, slot keys, and daily period templates.
//!
//! A timetable grid is indexed by `(Day, period)`. Periods are numbered
//! from 1 in template order. Which periods exist, when they start, and
//! which of them are breaks is decided by a [`PeriodTemplate`] looked up
//! per [`EducationLevel`] through a [`PeriodTemplateSource`].
//!
//! # Break periods
//! A period marked `is_break` is never available for lessons. The
//! generator pre-marks it as fixed in every teacher grid and the
//! analyzer reports it as a conflict.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::EducationLevel;

/// A school day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Day {
    /// The school week in calendar order.
    pub const WEEK: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    /// Zero-based position within [`Day::WEEK`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Day at a zero-based week position.
    pub fn from_index(index: usize) -> Option<Day> {
        Self::WEEK.get(index).copied()
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
        };
        f.write_str(name)
    }
}

/// A `(day, period)` cell of a weekly grid.
///
/// Ordering is day-major, then period, which is also the scan order
/// used for tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub day: Day,
    /// 1-based period number.
    pub period: u8,
}

impl SlotKey {
    pub fn new(day: Day, period: u8) -> Self {
        Self { day, period }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.day, self.period)
    }
}

/// Wall-clock time of day with minute resolution.
///
/// Serialized as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    /// Creates a time from hours and minutes. Out-of-range values saturate
    /// to 23:59.
    pub fn hm(hours: u16, minutes: u16) -> Self {
        Self {
            minutes: (hours * 60 + minutes).min(24 * 60 - 1),
        }
    }

    /// Minutes since midnight.
    #[inline]
    pub fn minutes(self) -> u16 {
        self.minutes
    }

    /// This time shifted by `minutes`, saturating at 23:59.
    pub fn plus_minutes(self, minutes: u16) -> Self {
        Self {
            minutes: self.minutes.saturating_add(minutes).min(24 * 60 - 1),
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}

impl FromStr for ClockTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("expected HH:MM, got '{s}'"))?;
        let hours: u16 = h.parse().map_err(|_| format!("invalid hour in '{s}'"))?;
        let minutes: u16 = m.parse().map_err(|_| format!("invalid minute in '{s}'"))?;
        if hours > 23 || minutes > 59 {
            return Err(format!("time out of range: '{s}'"));
        }
        Ok(Self::hm(hours, minutes))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// One entry of a daily period template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSlot {
    /// 1-based period number.
    pub period: u8,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    /// Break periods are never available for lessons.
    pub is_break: bool,
}

impl PeriodSlot {
    /// Creates a lesson period.
    pub fn lesson(period: u8, start_time: ClockTime, end_time: ClockTime) -> Self {
        Self {
            period,
            start_time,
            end_time,
            is_break: false,
        }
    }

    /// Creates a break period.
    pub fn break_period(period: u8, start_time: ClockTime, end_time: ClockTime) -> Self {
        Self {
            period,
            start_time,
            end_time,
            is_break: true,
        }
    }

    fn overlaps(&self, start: ClockTime, end: ClockTime) -> bool {
        self.start_time < end && start < self.end_time
    }
}

/// Ordered daily period template for one education level.
///
/// The same template applies to every day of the week.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTemplate {
    periods: Vec<PeriodSlot>,
}

impl PeriodTemplate {
    /// Creates a template; entries are sorted by period number.
    pub fn new(mut periods: Vec<PeriodSlot>) -> Self {
        periods.sort_by_key(|p| p.period);
        periods.dedup_by_key(|p| p.period);
        Self { periods }
    }

    /// Builds a template of `count` back-to-back lessons.
    ///
    /// `gap_minutes` of recess follow every lesson; recesses are not periods.
    pub fn uniform(start: ClockTime, count: u8, lesson_minutes: u16, gap_minutes: u16) -> Self {
        let mut periods = Vec::with_capacity(count as usize);
        let mut at = start;
        for period in 1..=count {
            let end = at.plus_minutes(lesson_minutes);
            periods.push(PeriodSlot::lesson(period, at, end));
            at = end.plus_minutes(gap_minutes);
        }
        Self { periods }
    }

    /// All template entries in period order.
    pub fn periods(&self) -> &[PeriodSlot] {
        &self.periods
    }

    /// Highest period number (0 for an empty template).
    pub fn period_count(&self) -> u8 {
        self.periods.last().map(|p| p.period).unwrap_or(0)
    }

    /// Looks up a period entry.
    pub fn get(&self, period: u8) -> Option<&PeriodSlot> {
        self.periods.iter().find(|p| p.period == period)
    }

    /// Whether `period` exists and is not a break.
    pub fn is_lesson_period(&self, period: u8) -> bool {
        self.get(period).is_some_and(|p| !p.is_break)
    }

    /// Whether `period` exists and is a break.
    pub fn is_break(&self, period: u8) -> bool {
        self.get(period).is_some_and(|p| p.is_break)
    }

    /// Lesson period numbers in order.
    pub fn lesson_periods(&self) -> impl Iterator<Item = u8> + '_ {
        self.periods.iter().filter(|p| !p.is_break).map(|p| p.period)
    }

    /// First and last lesson period of the day.
    pub fn lesson_bounds(&self) -> Option<(u8, u8)> {
        let first = self.lesson_periods().next()?;
        let last = self.lesson_periods().last()?;
        Some((first, last))
    }

    /// Every slot key of the week for this template, day-major.
    pub fn slot_keys(&self) -> Vec<SlotKey> {
        Day::WEEK
            .iter()
            .flat_map(|&day| self.periods.iter().map(move |p| SlotKey::new(day, p.period)))
            .collect()
    }

    /// Returns a copy in which lesson periods overlapping
    /// `[start, start + duration)` become breaks.
    ///
    /// Unchanged if the template already has a break in that interval.
    pub fn with_lunch_break(&self, start: ClockTime, duration_minutes: u16) -> Self {
        let end = start.plus_minutes(duration_minutes);
        if duration_minutes == 0
            || self
                .periods
                .iter()
                .any(|p| p.is_break && p.overlaps(start, end))
        {
            return self.clone();
        }
        let periods = self
            .periods
            .iter()
            .map(|p| PeriodSlot {
                is_break: p.is_break || p.overlaps(start, end),
                ..p.clone()
            })
            .collect();
        Self { periods }
    }
}

/// External lookup of daily period templates by education level.
pub trait PeriodTemplateSource: Send + Sync {
    /// Ordered periods for a level.
    fn periods_for(&self, level: EducationLevel) -> PeriodTemplate;
}

/// Default templates: 40-minute lessons from 08:30 with 10-minute recesses.
///
/// | Level | Lesson periods |
/// |-------|----------------|
/// | Primary | 6 |
/// | Middle | 7 |
/// | High | 8 |
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTemplates;

impl PeriodTemplateSource for StandardTemplates {
    fn periods_for(&self, level: EducationLevel) -> PeriodTemplate {
        let count = match level {
            EducationLevel::Primary => 6,
            EducationLevel::Middle => 7,
            EducationLevel::High => 8,
        };
        PeriodTemplate::uniform(ClockTime::hm(8, 30), count, 40, 10)
    }
}

/// A fixed template per level, for callers that manage their own.
#[derive(Debug, Clone, Default)]
pub struct FixedTemplates {
    templates: std::collections::BTreeMap<EducationLevel, PeriodTemplate>,
    fallback: PeriodTemplate,
}

impl FixedTemplates {
    /// Uses `fallback` for every level without an explicit template.
    pub fn new(fallback: PeriodTemplate) -> Self {
        Self {
            templates: Default::default(),
            fallback,
        }
    }

    /// Sets the template for one level.
    pub fn with_level(mut self, level: EducationLevel, template: PeriodTemplate) -> Self {
        self.templates.insert(level, template);
        self
    }
}

impl PeriodTemplateSource for FixedTemplates {
    fn periods_for(&self, level: EducationLevel) -> PeriodTemplate {
        self.templates
            .get(&level)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Wraps a template source and applies the lunch-break rule on lookup.
pub struct RuleAdjustedTemplates<'a> {
    inner: &'a dyn PeriodTemplateSource,
    lunch: Option<(ClockTime, u16)>,
}

impl<'a> RuleAdjustedTemplates<'a> {
    /// `lunch = Some((start, minutes))` reserves a lunch break.
    pub fn new(inner: &'a dyn PeriodTemplateSource, lunch: Option<(ClockTime, u16)>) -> Self {
        Self { inner, lunch }
    }
}

impl PeriodTemplateSource for RuleAdjustedTemplates<'_> {
    fn periods_for(&self, level: EducationLevel) -> PeriodTemplate {
        let template = self.inner.periods_for(level);
        match self.lunch {
            Some((start, minutes)) => template.with_lunch_break(start, minutes),
            None => template,
        }
    }
}
