//! Generation statistics.
//!
//! Computed from the final task states and teacher grids of a run.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total lessons to place | Σ weekly hours over all tasks |
//! | Placed lessons | Σ assigned hours over all tasks |
//! | Unassigned lessons | One entry per task with a shortfall |
//! | Hours by teacher | Lesson cells in each teacher grid |
//! | Gaps by teacher | Idle lesson periods between a teacher's first and last lesson of each day |
//!
//! `total_lessons_to_place == placed_lessons + Σ missing_hours` always holds.
//!
//! # Reference
//! de Werra (1985), "An introduction to timetabling"

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Day, PlacementTask, Schedule, SlotKey};

/// A task whose hours were not all placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnassignedLesson {
    pub task_id: String,
    pub class_id: String,
    pub subject_id: String,
    pub teacher_id: String,
    pub weekly_hours: u8,
    pub assigned_hours: u8,
    pub missing_hours: u8,
}

impl From<&PlacementTask> for UnassignedLesson {
    fn from(task: &PlacementTask) -> Self {
        Self {
            task_id: task.id.clone(),
            class_id: task.class_id.clone(),
            subject_id: task.subject_id.clone(),
            teacher_id: task.teacher_id.clone(),
            weekly_hours: task.weekly_hours,
            assigned_hours: task.assigned_hours,
            missing_hours: task.missing_hours(),
        }
    }
}

/// Placement statistics of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStatistics {
    /// Σ weekly hours.
    pub total_lessons_to_place: u32,
    /// Σ assigned hours.
    pub placed_lessons: u32,
    /// Tasks with a shortfall, in placement order.
    pub unassigned_lessons: Vec<UnassignedLesson>,
    /// Lesson hours per teacher.
    pub hours_by_teacher: BTreeMap<String, u32>,
    /// Idle periods between lessons per teacher, summed over the week.
    pub gaps_by_teacher: BTreeMap<String, u32>,
}

impl GenerationStatistics {
    /// Computes statistics from tasks and the teacher grids they produced.
    pub fn calculate(tasks: &[PlacementTask], schedules: &[Schedule]) -> Self {
        let mut stats = Self::default();

        for task in tasks {
            stats.total_lessons_to_place += task.weekly_hours as u32;
            stats.placed_lessons += task.assigned_hours as u32;
            if !task.is_complete() {
                stats.unassigned_lessons.push(UnassignedLesson::from(task));
            }
        }

        for schedule in schedules {
            stats
                .hours_by_teacher
                .insert(schedule.teacher_id.clone(), schedule.lesson_count() as u32);
            stats
                .gaps_by_teacher
                .insert(schedule.teacher_id.clone(), teacher_gaps(schedule));
        }

        stats
    }

    /// Fraction of required hours that were placed (1.0 when nothing was required).
    pub fn placement_rate(&self) -> f64 {
        if self.total_lessons_to_place == 0 {
            1.0
        } else {
            self.placed_lessons as f64 / self.total_lessons_to_place as f64
        }
    }

    /// Whether every required hour was placed.
    pub fn is_complete(&self) -> bool {
        self.unassigned_lessons.is_empty()
    }

    /// Σ missing hours over unassigned lessons.
    pub fn missing_hours(&self) -> u32 {
        self.unassigned_lessons
            .iter()
            .map(|u| u.missing_hours as u32)
            .sum()
    }
}

/// Free, non-fixed periods strictly between the first and last lesson of each day.
fn teacher_gaps(schedule: &Schedule) -> u32 {
    let mut gaps = 0;
    for day in Day::WEEK {
        let lessons: Vec<u8> = (1..=schedule.period_count())
            .filter(|&p| {
                schedule
                    .slot(SlotKey::new(day, p))
                    .is_some_and(|s| !s.is_fixed)
            })
            .collect();
        if let (Some(&first), Some(&last)) = (lessons.first(), lessons.last()) {
            gaps += (first..=last)
                .filter(|&p| schedule.is_free(SlotKey::new(day, p)))
                .count() as u32;
        }
    }
    gaps
}
