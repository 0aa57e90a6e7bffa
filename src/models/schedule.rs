//! Weekly schedule (solution) model.
//!
//! Schedules are stored per teacher: a `Schedule` is one teacher's
//! `grid[day][period]`. The class view is never stored; a [`ClassGrid`]
//! is derived by scanning teacher grids for a class id.
//!
//! # Invariants
//! - A teacher cell holds at most one lesson.
//! - Across all teacher grids, at most one lesson claims a given class
//!   in a given cell (checked by `validation::audit_schedules`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Day, PeriodTemplate, SlotKey};

/// One occupied cell of a teacher grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub subject_id: String,
    pub class_id: String,
    pub teacher_id: String,
    /// Break or template-locked cell; carries no lesson.
    pub is_fixed: bool,
}

impl ScheduleSlot {
    /// A lesson cell.
    pub fn lesson(
        teacher_id: impl Into<String>,
        class_id: impl Into<String>,
        subject_id: impl Into<String>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            class_id: class_id.into(),
            teacher_id: teacher_id.into(),
            is_fixed: false,
        }
    }

    /// A fixed (break) cell.
    pub fn fixed(teacher_id: impl Into<String>) -> Self {
        Self {
            subject_id: String::new(),
            class_id: String::new(),
            teacher_id: teacher_id.into(),
            is_fixed: true,
        }
    }

    /// Whether this cell is a lesson of `class_id`.
    pub fn is_lesson_of(&self, class_id: &str) -> bool {
        !self.is_fixed && self.class_id == class_id
    }
}

/// One teacher's weekly grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub teacher_id: String,
    /// `grid[day.index()][period - 1]`.
    pub grid: Vec<Vec<Option<ScheduleSlot>>>,
}

impl Schedule {
    /// Creates an empty grid with `period_count` periods per day.
    pub fn new(teacher_id: impl Into<String>, period_count: u8) -> Self {
        Self {
            teacher_id: teacher_id.into(),
            grid: vec![vec![None; period_count as usize]; Day::WEEK.len()],
        }
    }

    /// Creates a grid sized to `template` with its break periods fixed.
    pub fn for_template(teacher_id: impl Into<String>, template: &PeriodTemplate) -> Self {
        let mut schedule = Self::new(teacher_id, template.period_count());
        for day in Day::WEEK {
            for period in template.periods().iter().filter(|p| p.is_break) {
                let slot = ScheduleSlot::fixed(schedule.teacher_id.clone());
                schedule.set(SlotKey::new(day, period.period), slot);
            }
        }
        schedule
    }

    /// Periods per day.
    pub fn period_count(&self) -> u8 {
        self.grid.first().map(|d| d.len() as u8).unwrap_or(0)
    }

    fn cell(&self, key: SlotKey) -> Option<&Option<ScheduleSlot>> {
        let period = (key.period as usize).checked_sub(1)?;
        self.grid.get(key.day.index())?.get(period)
    }

    fn cell_mut(&mut self, key: SlotKey) -> Option<&mut Option<ScheduleSlot>> {
        let period = (key.period as usize).checked_sub(1)?;
        self.grid.get_mut(key.day.index())?.get_mut(period)
    }

    /// Whether the key lies inside the grid.
    pub fn contains(&self, key: SlotKey) -> bool {
        self.cell(key).is_some()
    }

    /// Slot at a cell, if occupied.
    pub fn slot(&self, key: SlotKey) -> Option<&ScheduleSlot> {
        self.cell(key).and_then(Option::as_ref)
    }

    /// Whether the cell exists and is empty.
    pub fn is_free(&self, key: SlotKey) -> bool {
        matches!(self.cell(key), Some(None))
    }

    /// Writes a cell. Returns `false` if the key is out of range.
    pub fn set(&mut self, key: SlotKey, slot: ScheduleSlot) -> bool {
        match self.cell_mut(key) {
            Some(cell) => {
                *cell = Some(slot);
                true
            }
            None => false,
        }
    }

    /// Removes a lesson. Fixed cells are left untouched.
    pub fn clear(&mut self, key: SlotKey) -> Option<ScheduleSlot> {
        let cell = self.cell_mut(key)?;
        if cell.as_ref().is_some_and(|s| s.is_fixed) {
            return None;
        }
        cell.take()
    }

    /// All lesson cells (fixed cells excluded), day-major.
    pub fn lessons(&self) -> impl Iterator<Item = (SlotKey, &ScheduleSlot)> + '_ {
        self.grid.iter().enumerate().flat_map(|(d, periods)| {
            periods.iter().enumerate().filter_map(move |(p, cell)| {
                let slot = cell.as_ref().filter(|s| !s.is_fixed)?;
                let day = Day::from_index(d)?;
                Some((SlotKey::new(day, p as u8 + 1), slot))
            })
        })
    }

    /// Number of lesson cells.
    pub fn lesson_count(&self) -> usize {
        self.lessons().count()
    }

    /// Whether at least one lesson is placed.
    pub fn has_lessons(&self) -> bool {
        self.lessons().next().is_some()
    }

    /// Lesson hours on one day.
    pub fn day_hours(&self, day: Day) -> u8 {
        self.grid
            .get(day.index())
            .map(|periods| {
                periods
                    .iter()
                    .filter(|c| c.as_ref().is_some_and(|s| !s.is_fixed))
                    .count() as u8
            })
            .unwrap_or(0)
    }
}

/// Occupant of a derived class cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCell {
    pub teacher_id: String,
    pub subject_id: String,
}

/// A class's weekly view, derived from teacher grids.
#[derive(Debug, Clone)]
pub struct ClassGrid {
    pub class_id: String,
    template: PeriodTemplate,
    cells: BTreeMap<SlotKey, ClassCell>,
}

impl ClassGrid {
    /// Derives the class view by scanning `schedules` for `class_id`.
    ///
    /// If two teachers claim the same cell, the first scanned wins.
    pub fn derive<'a, I>(class_id: impl Into<String>, template: PeriodTemplate, schedules: I) -> Self
    where
        I: IntoIterator<Item = &'a Schedule>,
    {
        let class_id = class_id.into();
        let mut cells = BTreeMap::new();
        for schedule in schedules {
            for (key, slot) in schedule.lessons() {
                if slot.is_lesson_of(&class_id) {
                    cells.entry(key).or_insert_with(|| ClassCell {
                        teacher_id: slot.teacher_id.clone(),
                        subject_id: slot.subject_id.clone(),
                    });
                }
            }
        }
        Self {
            class_id,
            template,
            cells,
        }
    }

    /// The class's period template.
    pub fn template(&self) -> &PeriodTemplate {
        &self.template
    }

    /// Whether the cell is a break or outside the class's template.
    pub fn is_fixed(&self, key: SlotKey) -> bool {
        !self.template.is_lesson_period(key.period)
    }

    /// Lesson occupying a cell.
    pub fn occupant(&self, key: SlotKey) -> Option<&ClassCell> {
        self.cells.get(&key)
    }

    /// Whether the cell is a lesson period with no lesson.
    pub fn is_free(&self, key: SlotKey) -> bool {
        !self.is_fixed(key) && !self.cells.contains_key(&key)
    }

    /// Occupied cells in day-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (&SlotKey, &ClassCell)> {
        self.cells.iter()
    }

    /// Lesson hours on one day.
    pub fn day_hours(&self, day: Day) -> u8 {
        self.cells.keys().filter(|k| k.day == day).count() as u8
    }
}
