//! Input validation and schedule auditing.
//!
//! [`validate_input`] checks that a task list can be interpreted before
//! generation starts. It detects:
//! - An empty task list
//! - Duplicate task IDs
//! - Tasks referencing unknown teachers, classes, or subjects
//! - Teachers or classes without an education level (no period template)
//! - Zero or inconsistent hour quotas
//!
//! [`audit_schedules`] checks a finished set of teacher grids for the
//! invariants every schedule set must hold: no class double-booked in a
//! cell, and no lesson on an `unavailable` cell.

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

use crate::models::{
    Catalog, ConstraintIndex, EntityRef, PlacementTask, Schedule, SlotKey, TimeConstraint,
};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Nothing to schedule.
    NoTasks,
    /// Two tasks share the same ID.
    DuplicateId,
    /// A task references a teacher that doesn't exist.
    UnknownTeacher,
    /// A task references a class that doesn't exist.
    UnknownClass,
    /// A task references a subject that doesn't exist.
    UnknownSubject,
    /// A teacher or class has no education level.
    MissingLevel,
    /// Weekly hours are zero or already exceeded.
    InvalidHours,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input of a generation run.
///
/// Checks:
/// 1. At least one task
/// 2. No duplicate task IDs
/// 3. Every teacher, class, and subject reference resolves
/// 4. Referenced teachers and classes have an education level
/// 5. `0 < weekly_hours` and `assigned_hours <= weekly_hours`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(tasks: &[PlacementTask], catalog: &Catalog) -> ValidationResult {
    let mut errors = Vec::new();

    if tasks.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoTasks,
            "No tasks to schedule",
        ));
    }

    let mut task_ids = HashSet::new();
    let mut levelless_teachers: HashSet<&str> = HashSet::new();
    let mut levelless_classes: HashSet<&str> = HashSet::new();
    for task in tasks {
        if !task_ids.insert(task.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate task ID: {}", task.id),
            ));
        }

        match catalog.teacher(&task.teacher_id) {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownTeacher,
                format!("Task '{}' references unknown teacher '{}'", task.id, task.teacher_id),
            )),
            Some(t) if t.levels.is_empty() && levelless_teachers.insert(&t.id) => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingLevel,
                    format!("Teacher '{}' has no education level", t.id),
                ))
            }
            Some(_) => {}
        }

        match catalog.class(&task.class_id) {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownClass,
                format!("Task '{}' references unknown class '{}'", task.id, task.class_id),
            )),
            Some(c) if c.levels.is_empty() && levelless_classes.insert(&c.id) => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingLevel,
                    format!("Class '{}' has no education level", c.id),
                ))
            }
            Some(_) => {}
        }

        if catalog.subject(&task.subject_id).is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownSubject,
                format!("Task '{}' references unknown subject '{}'", task.id, task.subject_id),
            ));
        }

        if task.weekly_hours == 0 || task.assigned_hours > task.weekly_hours {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidHours,
                format!(
                    "Task '{}' has {} of {} weekly hours assigned",
                    task.id, task.assigned_hours, task.weekly_hours
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A schedule invariant violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Cell where it occurs.
    pub slot: SlotKey,
    /// Related entity (class for double-bookings, the blocked entity otherwise).
    pub entity: EntityRef,
    /// Human-readable description.
    pub message: String,
}

/// Classification of schedule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationType {
    /// Two teacher grids place the same class in one cell.
    DoubleBooking,
    /// A lesson sits on an `unavailable` cell of its teacher, class, or subject.
    UnavailableSlot,
}

/// Audits a set of teacher grids.
///
/// Returns every violation found, in slot order for double-bookings and
/// grid order for constraint breaches.
pub fn audit_schedules(schedules: &[Schedule], constraints: &[TimeConstraint]) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut claims: BTreeMap<(SlotKey, &str), Vec<&str>> = BTreeMap::new();

    for schedule in schedules {
        for (key, slot) in schedule.lessons() {
            claims
                .entry((key, slot.class_id.as_str()))
                .or_default()
                .push(schedule.teacher_id.as_str());
        }
    }

    for ((slot, class_id), teachers) in &claims {
        if teachers.len() > 1 {
            violations.push(Violation {
                violation_type: ViolationType::DoubleBooking,
                slot: *slot,
                entity: EntityRef::class(*class_id),
                message: format!(
                    "Class '{}' is booked by {} teachers at {}: {}",
                    class_id,
                    teachers.len(),
                    slot,
                    teachers.join(", ")
                ),
            });
        }
    }

    let index = ConstraintIndex::new(constraints);
    for schedule in schedules {
        for (key, slot) in schedule.lessons() {
            let entities = [
                EntityRef::teacher(&slot.teacher_id),
                EntityRef::class(&slot.class_id),
                EntityRef::subject(&slot.subject_id),
            ];
            for entity in entities {
                if index.is_unavailable(&entity, key) {
                    violations.push(Violation {
                        violation_type: ViolationType::UnavailableSlot,
                        slot: key,
                        message: format!("Lesson at {key} is placed on unavailable {entity}"),
                        entity,
                    });
                }
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Day, EducationLevel, ScheduleSlot, SchoolClass, Subject, Teacher};

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                Teacher::new("T1").with_level(EducationLevel::High),
                Teacher::new("T0"),
            ],
            vec![SchoolClass::new("9A").with_level(EducationLevel::High)],
            vec![Subject::new("MATH", 4)],
        )
    }

    #[test]
    fn test_valid_input() {
        let tasks = vec![PlacementTask::new("9A", "MATH", "T1", 4)];
        assert!(validate_input(&tasks, &catalog()).is_ok());
    }

    #[test]
    fn test_no_tasks() {
        let errors = validate_input(&[], &catalog()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::NoTasks);
    }

    #[test]
    fn test_duplicate_task_id() {
        let tasks = vec![
            PlacementTask::new("9A", "MATH", "T1", 4),
            PlacementTask::new("9A", "MATH", "T1", 4),
        ];
        let errors = validate_input(&tasks, &catalog()).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_unknown_references() {
        let tasks = vec![PlacementTask::new("10B", "ART", "T9", 2)];
        let errors = validate_input(&tasks, &catalog()).unwrap_err();
        let kinds: Vec<_> = errors.iter().map(|e| e.kind.clone()).collect();
        assert!(kinds.contains(&ValidationErrorKind::UnknownTeacher));
        assert!(kinds.contains(&ValidationErrorKind::UnknownClass));
        assert!(kinds.contains(&ValidationErrorKind::UnknownSubject));
    }

    #[test]
    fn test_missing_level() {
        let tasks = vec![PlacementTask::new("9A", "MATH", "T0", 4)];
        let errors = validate_input(&tasks, &catalog()).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::MissingLevel);
        assert_eq!(errors[0].to_string(), "Teacher 'T0' has no education level");
    }

    #[test]
    fn test_invalid_hours() {
        let mut task = PlacementTask::new("9A", "MATH", "T1", 0);
        let errors = validate_input(std::slice::from_ref(&task), &catalog()).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidHours);

        task.weekly_hours = 2;
        task.assigned_hours = 3;
        assert!(validate_input(&[task], &catalog()).is_err());
    }

    #[test]
    fn test_audit_double_booking() {
        let key = SlotKey::new(Day::Monday, 1);
        let mut t1 = Schedule::new("T1", 4);
        let mut t2 = Schedule::new("T2", 4);
        t1.set(key, ScheduleSlot::lesson("T1", "9A", "MATH"));
        t2.set(key, ScheduleSlot::lesson("T2", "9A", "LIT"));

        let violations = audit_schedules(&[t1, t2], &[]);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].violation_type, ViolationType::DoubleBooking);
        assert_eq!(violations[0].entity, EntityRef::class("9A"));
        assert_eq!(violations[0].slot, key);
    }

    #[test]
    fn test_audit_unavailable_slot() {
        let key = SlotKey::new(Day::Tuesday, 2);
        let mut t1 = Schedule::new("T1", 4);
        t1.set(key, ScheduleSlot::lesson("T1", "9A", "MATH"));
        let constraints = vec![
            TimeConstraint::unavailable("c1", EntityRef::subject("MATH"), Day::Tuesday, 2),
            TimeConstraint::restricted("c2", EntityRef::teacher("T1"), Day::Tuesday, 2),
        ];

        let violations = audit_schedules(&[t1], &constraints);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].violation_type, ViolationType::UnavailableSlot);
        assert_eq!(violations[0].entity, EntityRef::subject("MATH"));
    }

    #[test]
    fn test_audit_clean() {
        let mut t1 = Schedule::new("T1", 4);
        let mut t2 = Schedule::new("T2", 4);
        t1.set(SlotKey::new(Day::Monday, 1), ScheduleSlot::lesson("T1", "9A", "MATH"));
        t2.set(SlotKey::new(Day::Monday, 1), ScheduleSlot::lesson("T2", "9B", "MATH"));
        assert!(audit_schedules(&[t1, t2], &[]).is_empty());
    }
}
