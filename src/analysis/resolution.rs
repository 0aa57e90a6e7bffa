//! Manual resolution of unplaced lessons.
//!
//! [`diagnose`] runs the analyzer and, when nothing is available, the swap
//! engine. [`place_lesson`] and [`relocate_lesson`] edit a schedule set in
//! place; both only accept slots the analyzer reports available, so a
//! schedule set that passed `validation::audit_schedules` still does.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{analyze, suggest_swaps, PendingLesson, SlotAnalysis, SwapSuggestion};
use crate::error::{Result, TimetableError};
use crate::models::{
    Catalog, ClassGrid, PeriodTemplateSource, Schedule, ScheduleSlot, SlotKey, TimeConstraint,
};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Analyzer result for one lesson plus swap suggestions when blocked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnosis {
    pub lesson: PendingLesson,
    pub analysis: SlotAnalysis,
    /// Empty unless `analysis` has no available slot.
    pub swaps: Vec<SwapSuggestion>,
}

/// Analyzes a pending lesson against the current schedule set.
///
/// # Errors
///
/// [`TimetableError::InvalidInput`] if the lesson's teacher or class is
/// unknown or has no education level.
pub fn diagnose(
    lesson: &PendingLesson,
    schedules: &[Schedule],
    catalog: &Catalog,
    constraints: &[TimeConstraint],
    templates: &dyn PeriodTemplateSource,
) -> Result<Diagnosis> {
    let (teacher_grid, class_grid) = lesson_grids(lesson, schedules, catalog, templates)?;
    let analysis = analyze(lesson, &teacher_grid, &class_grid, constraints);
    let swaps = if analysis.is_blocked() {
        suggest_swaps(lesson, schedules, catalog, templates)
    } else {
        Vec::new()
    };
    Ok(Diagnosis {
        lesson: lesson.clone(),
        analysis,
        swaps,
    })
}

/// Places one hour of `lesson` at `key`.
///
/// A grid is created for a teacher without one, keeping `schedules` in
/// teacher id order.
///
/// # Errors
///
/// [`TimetableError::Placement`] if `key` is not available for the lesson.
pub fn place_lesson(
    schedules: &mut Vec<Schedule>,
    lesson: &PendingLesson,
    key: SlotKey,
    catalog: &Catalog,
    constraints: &[TimeConstraint],
    templates: &dyn PeriodTemplateSource,
) -> Result<()> {
    let teacher_grid = check_slot(lesson, key, schedules, catalog, constraints, templates)?;

    let index = match schedules.iter().position(|s| s.teacher_id == lesson.teacher_id) {
        Some(i) => i,
        None => {
            let i = schedules.partition_point(|s| s.teacher_id < lesson.teacher_id);
            schedules.insert(i, teacher_grid);
            i
        }
    };
    schedules[index].set(key, lesson_slot(lesson));

    info!(
        event = "lesson_placed",
        class_id = %lesson.class_id,
        subject_id = %lesson.subject_id,
        slot = %key,
    );
    Ok(())
}

/// Moves the lesson at `from` in a teacher's grid to `to`.
///
/// The grid is left unchanged on error.
///
/// # Errors
///
/// [`TimetableError::Placement`] if there is no lesson at `from` or `to`
/// is not available for it.
pub fn relocate_lesson(
    schedules: &mut [Schedule],
    teacher_id: &str,
    from: SlotKey,
    to: SlotKey,
    catalog: &Catalog,
    constraints: &[TimeConstraint],
    templates: &dyn PeriodTemplateSource,
) -> Result<()> {
    let index = schedules
        .iter()
        .position(|s| s.teacher_id == teacher_id)
        .ok_or_else(|| TimetableError::Placement(format!("Teacher '{teacher_id}' has no schedule")))?;
    let slot = schedules[index]
        .clear(from)
        .ok_or_else(|| TimetableError::Placement(format!("No lesson of '{teacher_id}' at {from}")))?;

    let lesson = PendingLesson::new(&slot.class_id, &slot.subject_id, &slot.teacher_id);
    if let Err(e) = check_slot(&lesson, to, schedules, catalog, constraints, templates) {
        schedules[index].set(from, slot);
        return Err(e);
    }
    schedules[index].set(to, slot);

    info!(
        event = "lesson_relocated",
        teacher_id,
        class_id = %lesson.class_id,
        from = %from,
        to = %to,
    );
    Ok(())
}

/// Rejects `key` unless the analyzer reports it available and the
/// teacher cell is empty. Returns the lesson teacher's grid.
fn check_slot(
    lesson: &PendingLesson,
    key: SlotKey,
    schedules: &[Schedule],
    catalog: &Catalog,
    constraints: &[TimeConstraint],
    templates: &dyn PeriodTemplateSource,
) -> Result<Schedule> {
    let (teacher_grid, class_grid) = lesson_grids(lesson, schedules, catalog, templates)?;
    let analysis = analyze(lesson, &teacher_grid, &class_grid, constraints);

    if !analysis.is_available(key) {
        let reasons = analysis.messages(key);
        let detail = if reasons.is_empty() {
            "outside the class's day".to_string()
        } else {
            reasons.join("; ")
        };
        return Err(TimetableError::Placement(format!(
            "{key} is not available for {} of class {}: {detail}",
            lesson.subject_id, lesson.class_id
        )));
    }
    if !teacher_grid.is_free(key) {
        return Err(TimetableError::Placement(format!(
            "{key} already holds {} of class {}",
            lesson.subject_id, lesson.class_id
        )));
    }
    Ok(teacher_grid)
}

/// The lesson teacher's grid (empty if none yet) and the derived class grid.
fn lesson_grids(
    lesson: &PendingLesson,
    schedules: &[Schedule],
    catalog: &Catalog,
    templates: &dyn PeriodTemplateSource,
) -> Result<(Schedule, ClassGrid)> {
    let teacher_level = match catalog.teacher(&lesson.teacher_id) {
        None => {
            return Err(invalid(
                ValidationErrorKind::UnknownTeacher,
                format!("Unknown teacher '{}'", lesson.teacher_id),
            ))
        }
        Some(t) => t.primary_level().ok_or_else(|| {
            invalid(
                ValidationErrorKind::MissingLevel,
                format!("Teacher '{}' has no education level", t.id),
            )
        })?,
    };
    let class_level = match catalog.class(&lesson.class_id) {
        None => {
            return Err(invalid(
                ValidationErrorKind::UnknownClass,
                format!("Unknown class '{}'", lesson.class_id),
            ))
        }
        Some(c) => c.primary_level().ok_or_else(|| {
            invalid(
                ValidationErrorKind::MissingLevel,
                format!("Class '{}' has no education level", c.id),
            )
        })?,
    };

    let teacher_grid = schedules
        .iter()
        .find(|s| s.teacher_id == lesson.teacher_id)
        .cloned()
        .unwrap_or_else(|| {
            Schedule::for_template(&lesson.teacher_id, &templates.periods_for(teacher_level))
        });
    let class_grid = ClassGrid::derive(
        &lesson.class_id,
        templates.periods_for(class_level),
        schedules,
    );
    Ok((teacher_grid, class_grid))
}

fn invalid(kind: ValidationErrorKind, message: String) -> TimetableError {
    TimetableError::InvalidInput(vec![ValidationError::new(kind, message)])
}

fn lesson_slot(lesson: &PendingLesson) -> ScheduleSlot {
    ScheduleSlot::lesson(&lesson.teacher_id, &lesson.class_id, &lesson.subject_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulingRules;
    use crate::models::{
        Day, EducationLevel, EntityRef, PlacementTask, SchoolClass, StandardTemplates, Subject,
        Teacher,
    };
    use crate::scheduler::ScheduleGenerator;
    use crate::validation::audit_schedules;

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                Teacher::new("T1").with_level(EducationLevel::Primary),
                Teacher::new("T2").with_level(EducationLevel::Primary),
            ],
            vec![
                SchoolClass::new("1A").with_level(EducationLevel::Primary),
                SchoolClass::new("1B").with_level(EducationLevel::Primary),
            ],
            vec![Subject::new("MATH", 1), Subject::new("ART", 1)],
        )
    }

    /// 1B may only meet on Monday 1, where T1 already teaches 1A.
    fn contested() -> (Vec<Schedule>, Vec<TimeConstraint>, PendingLesson) {
        let only = SlotKey::new(Day::Monday, 1);
        let mut constraints = Vec::new();
        for day in Day::WEEK {
            for period in 1..=6 {
                let key = SlotKey::new(day, period);
                if key != only {
                    constraints.push(TimeConstraint::unavailable(
                        format!("c-{key}"),
                        EntityRef::class("1B"),
                        day,
                        period,
                    ));
                }
            }
        }
        let mut t1 = Schedule::for_template("T1", &StandardTemplates.periods_for(EducationLevel::Primary));
        t1.set(only, ScheduleSlot::lesson("T1", "1A", "MATH"));
        (vec![t1], constraints, PendingLesson::new("1B", "MATH", "T1"))
    }

    #[test]
    fn test_diagnose_available() {
        let diagnosis = diagnose(
            &PendingLesson::new("1A", "ART", "T2"),
            &[],
            &catalog(),
            &[],
            &StandardTemplates,
        )
        .unwrap();
        assert_eq!(diagnosis.analysis.available_slots.len(), 30);
        assert!(diagnosis.swaps.is_empty());
    }

    #[test]
    fn test_diagnose_blocked_suggests_swap() {
        let (schedules, constraints, lesson) = contested();
        let diagnosis =
            diagnose(&lesson, &schedules, &catalog(), &constraints, &StandardTemplates).unwrap();

        assert!(diagnosis.analysis.is_blocked());
        assert_eq!(diagnosis.swaps.len(), 1);
        assert_eq!(diagnosis.swaps[0].target_class, "1A");
        assert_eq!(diagnosis.swaps[0].day, Day::Monday);
        assert_eq!(diagnosis.swaps[0].period, 1);
    }

    #[test]
    fn test_swap_then_place_resolves() {
        let (mut schedules, constraints, lesson) = contested();
        let cat = catalog();
        let from = SlotKey::new(Day::Monday, 1);
        let to = SlotKey::new(Day::Tuesday, 1);

        relocate_lesson(&mut schedules, "T1", from, to, &cat, &constraints, &StandardTemplates)
            .unwrap();
        place_lesson(&mut schedules, &lesson, from, &cat, &constraints, &StandardTemplates)
            .unwrap();

        assert_eq!(schedules[0].slot(from).unwrap().class_id, "1B");
        assert_eq!(schedules[0].slot(to).unwrap().class_id, "1A");
        assert!(audit_schedules(&schedules, &constraints).is_empty());
    }

    #[test]
    fn test_place_rejects_unavailable() {
        let (mut schedules, constraints, lesson) = contested();
        let err = place_lesson(
            &mut schedules,
            &lesson,
            SlotKey::new(Day::Monday, 1),
            &catalog(),
            &constraints,
            &StandardTemplates,
        )
        .unwrap_err();
        assert!(matches!(err, TimetableError::Placement(_)));
        assert!(err.to_string().contains("Teacher is teaching MATH to class 1A"));
        assert_eq!(schedules[0].lesson_count(), 1);
    }

    #[test]
    fn test_place_creates_teacher_grid_in_order() {
        let (mut schedules, _, _) = contested();
        let lesson = PendingLesson::new("1A", "ART", "T2");
        place_lesson(
            &mut schedules,
            &lesson,
            SlotKey::new(Day::Friday, 6),
            &catalog(),
            &[],
            &StandardTemplates,
        )
        .unwrap();

        let ids: Vec<_> = schedules.iter().map(|s| s.teacher_id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "T2"]);
        assert_eq!(schedules[1].lesson_count(), 1);

        // The same cell twice is refused.
        assert!(place_lesson(
            &mut schedules,
            &lesson,
            SlotKey::new(Day::Friday, 6),
            &catalog(),
            &[],
            &StandardTemplates,
        )
        .is_err());
    }

    #[test]
    fn test_relocate_failure_restores() {
        let (mut schedules, constraints, _) = contested();
        let from = SlotKey::new(Day::Monday, 1);
        // Period 7 does not exist for a primary class.
        let err = relocate_lesson(
            &mut schedules,
            "T1",
            from,
            SlotKey::new(Day::Monday, 7),
            &catalog(),
            &constraints,
            &StandardTemplates,
        )
        .unwrap_err();
        assert!(matches!(err, TimetableError::Placement(_)));
        assert_eq!(schedules[0].slot(from).unwrap().class_id, "1A");

        assert!(relocate_lesson(
            &mut schedules,
            "T1",
            SlotKey::new(Day::Friday, 1),
            SlotKey::new(Day::Friday, 2),
            &catalog(),
            &constraints,
            &StandardTemplates,
        )
        .is_err());
    }

    #[test]
    fn test_unknown_entities() {
        let err = diagnose(
            &PendingLesson::new("9Z", "MATH", "T1"),
            &[],
            &catalog(),
            &[],
            &StandardTemplates,
        )
        .unwrap_err();
        assert!(matches!(err, TimetableError::InvalidInput(_)));
    }

    #[test]
    fn test_generator_shortfall_workflow() {
        let cat = catalog();
        let only = SlotKey::new(Day::Monday, 1);
        let mut constraints = Vec::new();
        for day in Day::WEEK {
            for period in 1..=6 {
                let key = SlotKey::new(day, period);
                if key != only {
                    constraints.push(TimeConstraint::unavailable(
                        format!("t-{key}"),
                        EntityRef::teacher("T1"),
                        day,
                        period,
                    ));
                }
            }
        }
        let generator = ScheduleGenerator::new(SchedulingRules::default());
        let tasks = vec![
            PlacementTask::new("1A", "MATH", "T1", 1),
            PlacementTask::new("1B", "MATH", "T1", 1),
        ];
        let outcome = generator.generate(&tasks, &cat, &constraints).unwrap();
        let unplaced = &outcome.statistics.unassigned_lessons[0];

        let diagnosis = diagnose(
            &PendingLesson::from(unplaced),
            &outcome.schedules,
            &cat,
            &constraints,
            &generator.templates(),
        )
        .unwrap();

        assert_eq!(diagnosis.lesson.class_id, "1B");
        assert!(diagnosis.analysis.is_blocked());
        assert_eq!(diagnosis.swaps.len(), 1);
        assert_eq!(diagnosis.swaps[0].target_class, "1A");
    }
}
