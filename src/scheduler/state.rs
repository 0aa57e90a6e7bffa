//! Mutable placement state of one generation run.
//!
//! Teacher grids are the primary store. Class occupancy is kept as a
//! secondary index updated in the same `commit` call, so it always
//! equals the class view derived by scanning the teacher grids.

use std::collections::BTreeMap;

use crate::models::{ClassCell, Day, PeriodTemplate, Schedule, ScheduleSlot, SlotKey};

#[derive(Debug, Default)]
pub(crate) struct PlacementState {
    teacher_grids: BTreeMap<String, Schedule>,
    class_templates: BTreeMap<String, PeriodTemplate>,
    class_index: BTreeMap<String, BTreeMap<SlotKey, ClassCell>>,
}

impl PlacementState {
    /// Registers a teacher grid with its break periods fixed. No-op if
    /// the teacher is already registered.
    pub fn seed_teacher(&mut self, teacher_id: &str, template: &PeriodTemplate) {
        if !self.teacher_grids.contains_key(teacher_id) {
            self.teacher_grids.insert(
                teacher_id.to_string(),
                Schedule::for_template(teacher_id, template),
            );
        }
    }

    /// Registers a class template. No-op if already registered.
    pub fn seed_class(&mut self, class_id: &str, template: PeriodTemplate) {
        self.class_templates
            .entry(class_id.to_string())
            .or_insert(template);
    }

    /// Largest period count over the teacher's and class's templates.
    pub fn period_span(&self, teacher_id: &str, class_id: &str) -> u8 {
        let t = self
            .teacher_grids
            .get(teacher_id)
            .map(Schedule::period_count)
            .unwrap_or(0);
        let c = self
            .class_templates
            .get(class_id)
            .map(PeriodTemplate::period_count)
            .unwrap_or(0);
        t.max(c)
    }

    pub fn teacher_free(&self, teacher_id: &str, key: SlotKey) -> bool {
        self.teacher_grids
            .get(teacher_id)
            .is_some_and(|g| g.is_free(key))
    }

    pub fn class_free(&self, class_id: &str, key: SlotKey) -> bool {
        let lesson_period = self
            .class_templates
            .get(class_id)
            .is_some_and(|t| t.is_lesson_period(key.period));
        lesson_period && self.class_cell(class_id, key).is_none()
    }

    fn class_cell(&self, class_id: &str, key: SlotKey) -> Option<&ClassCell> {
        self.class_index.get(class_id)?.get(&key)
    }

    fn teacher_has_lesson(&self, teacher_id: &str, key: SlotKey) -> bool {
        self.teacher_grids
            .get(teacher_id)
            .and_then(|g| g.slot(key))
            .is_some_and(|s| !s.is_fixed)
    }

    pub fn teacher_day_hours(&self, teacher_id: &str, day: Day) -> u8 {
        self.teacher_grids
            .get(teacher_id)
            .map(|g| g.day_hours(day))
            .unwrap_or(0)
    }

    pub fn class_day_hours(&self, class_id: &str, day: Day) -> u8 {
        self.class_index
            .get(class_id)
            .map(|cells| cells.keys().filter(|k| k.day == day).count() as u8)
            .unwrap_or(0)
    }

    /// First and last lesson period of the class's template.
    pub fn class_lesson_bounds(&self, class_id: &str) -> Option<(u8, u8)> {
        self.class_templates.get(class_id)?.lesson_bounds()
    }

    /// Length of the contiguous lesson run the teacher would have if
    /// `len` periods from `start` were filled.
    pub fn teacher_run(&self, teacher_id: &str, day: Day, start: u8, len: u8) -> u8 {
        run_length(start, len, |p| {
            self.teacher_has_lesson(teacher_id, SlotKey::new(day, p))
        })
    }

    /// Same as [`teacher_run`](Self::teacher_run) for the class.
    pub fn class_run(&self, class_id: &str, day: Day, start: u8, len: u8) -> u8 {
        run_length(start, len, |p| {
            self.class_cell(class_id, SlotKey::new(day, p)).is_some()
        })
    }

    /// Whether the period just before or just after the window already
    /// holds `subject_id` for the class.
    pub fn subject_adjacent(
        &self,
        class_id: &str,
        subject_id: &str,
        day: Day,
        start: u8,
        len: u8,
    ) -> bool {
        let holds = |p: u8| {
            self.class_cell(class_id, SlotKey::new(day, p))
                .is_some_and(|c| c.subject_id == subject_id)
        };
        (start > 1 && holds(start - 1)) || holds(start.saturating_add(len))
    }

    /// Writes a lesson into the teacher grid and the class index.
    pub fn commit(
        &mut self,
        teacher_id: &str,
        class_id: &str,
        subject_id: &str,
        day: Day,
        start: u8,
        len: u8,
    ) {
        let Some(grid) = self.teacher_grids.get_mut(teacher_id) else {
            return;
        };
        let cells = self.class_index.entry(class_id.to_string()).or_default();
        for period in start..start + len {
            let key = SlotKey::new(day, period);
            grid.set(key, ScheduleSlot::lesson(teacher_id, class_id, subject_id));
            cells.insert(
                key,
                ClassCell {
                    teacher_id: teacher_id.to_string(),
                    subject_id: subject_id.to_string(),
                },
            );
        }
    }

    /// Class view derived from the teacher grids.
    #[cfg(test)]
    pub fn derived_class_grid(&self, class_id: &str) -> Option<crate::models::ClassGrid> {
        let template = self.class_templates.get(class_id)?.clone();
        Some(crate::models::ClassGrid::derive(class_id, template, self.teacher_grids.values()))
    }

    /// Ids of every teacher that took part in the run.
    pub fn teacher_ids(&self) -> Vec<String> {
        self.teacher_grids.keys().cloned().collect()
    }

    /// Teacher grids with at least one lesson, in teacher id order.
    pub fn into_schedules(self) -> Vec<Schedule> {
        self.teacher_grids
            .into_values()
            .filter(Schedule::has_lessons)
            .collect()
    }
}

fn run_length(start: u8, len: u8, occupied: impl Fn(u8) -> bool) -> u8 {
    let mut run = len;
    let mut p = start;
    while p > 1 && occupied(p - 1) {
        run += 1;
        p -= 1;
    }
    let mut p = start.saturating_add(len);
    while p < u8::MAX && occupied(p) {
        run += 1;
        p += 1;
    }
    run
}
