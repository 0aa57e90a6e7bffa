//! Placement task (obligation) model.
//!
//! A placement task is the weekly obligation of one teacher to teach one
//! subject to one class. Tasks are built fresh for every generation run
//! and discarded afterwards.

use serde::{Deserialize, Serialize};

use super::Distribution;

/// Placement priority. Higher priorities are placed first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// A weekly (class, subject, teacher) obligation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementTask {
    /// `"{class_id}-{subject_id}"`; unique within one run.
    pub id: String,
    pub class_id: String,
    pub subject_id: String,
    pub teacher_id: String,
    /// Required hours per week.
    pub weekly_hours: u8,
    /// Hours placed so far. Never exceeds `weekly_hours`.
    pub assigned_hours: u8,
    /// Validated block pattern, if any.
    pub distribution: Option<Distribution>,
    pub priority: Priority,
}

impl PlacementTask {
    /// Creates an unplaced task.
    pub fn new(
        class_id: impl Into<String>,
        subject_id: impl Into<String>,
        teacher_id: impl Into<String>,
        weekly_hours: u8,
    ) -> Self {
        let class_id = class_id.into();
        let subject_id = subject_id.into();
        Self {
            id: Self::task_id(&class_id, &subject_id),
            class_id,
            subject_id,
            teacher_id: teacher_id.into(),
            weekly_hours,
            assigned_hours: 0,
            distribution: None,
            priority: Priority::Medium,
        }
    }

    /// Task identifier for a (class, subject) pair.
    pub fn task_id(class_id: &str, subject_id: &str) -> String {
        format!("{class_id}-{subject_id}")
    }

    /// Sets the distribution.
    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = Some(distribution);
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Hours still to place.
    pub fn missing_hours(&self) -> u8 {
        self.weekly_hours.saturating_sub(self.assigned_hours)
    }

    /// Whether every required hour is placed.
    pub fn is_complete(&self) -> bool {
        self.assigned_hours >= self.weekly_hours
    }

    /// Records `hours` as placed, capped at `weekly_hours`.
    pub fn record_placed(&mut self, hours: u8) {
        self.assigned_hours = self.assigned_hours.saturating_add(hours).min(self.weekly_hours);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_builder() {
        let t = PlacementTask::new("9A", "MATH", "T1", 5)
            .with_priority(Priority::High)
            .with_distribution(Distribution::parse("2+2+1").unwrap());

        assert_eq!(t.id, "9A-MATH");
        assert_eq!(t.priority, Priority::High);
        assert_eq!(t.missing_hours(), 5);
        assert!(!t.is_complete());
    }

    #[test]
    fn test_record_placed_caps_at_quota() {
        let mut t = PlacementTask::new("9A", "MATH", "T1", 3);
        t.record_placed(2);
        assert_eq!(t.missing_hours(), 1);
        t.record_placed(5);
        assert_eq!(t.assigned_hours, 3);
        assert!(t.is_complete());
    }

    #[test]
    fn test_priority_order() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
        assert_eq!(Priority::default(), Priority::Medium);
    }
}
