//! Swap suggestions for lessons with no available slot.
//!
//! Scans the class's derived grid day-major, then period-major. At each
//! free class cell where the lesson's own teacher is teaching a different
//! class, moving that other lesson away would free the cell. The first
//! [`MAX_SUGGESTIONS`] such cells are returned in scan order; this is a
//! first-found heuristic, not a ranked search.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::PendingLesson;
use crate::models::{Catalog, ClassGrid, Day, PeriodTemplateSource, Schedule};

/// Upper bound on suggestions per lesson.
pub const MAX_SUGGESTIONS: usize = 3;

/// An existing lesson that could be moved to make room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapSuggestion {
    pub day: Day,
    pub period: u8,
    pub target_teacher: String,
    pub target_class: String,
    pub target_subject: String,
    pub reason: String,
}

/// Suggests up to [`MAX_SUGGESTIONS`] lessons to relocate.
///
/// Returns an empty list if the class is unknown or has no education level.
pub fn suggest_swaps(
    lesson: &PendingLesson,
    schedules: &[Schedule],
    catalog: &Catalog,
    templates: &dyn PeriodTemplateSource,
) -> Vec<SwapSuggestion> {
    let Some(level) = catalog
        .class(&lesson.class_id)
        .and_then(|c| c.primary_level())
    else {
        return Vec::new();
    };
    let Some(teacher_grid) = schedules.iter().find(|s| s.teacher_id == lesson.teacher_id) else {
        return Vec::new();
    };
    let class_grid = ClassGrid::derive(&lesson.class_id, templates.periods_for(level), schedules);

    let subject_name = |id: &str| {
        catalog
            .subject(id)
            .map(|s| s.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| id.to_string())
    };

    let suggestions: Vec<SwapSuggestion> = class_grid
        .template()
        .slot_keys()
        .into_iter()
        .filter(|&key| class_grid.is_free(key))
        .filter_map(|key| {
            let slot = teacher_grid
                .slot(key)
                .filter(|s| !s.is_fixed && s.class_id != lesson.class_id)?;
            Some(SwapSuggestion {
                day: key.day,
                period: key.period,
                target_teacher: slot.teacher_id.clone(),
                target_class: slot.class_id.clone(),
                target_subject: slot.subject_id.clone(),
                reason: format!(
                    "Moving {} of class {} frees {} for {}",
                    subject_name(&slot.subject_id),
                    slot.class_id,
                    key,
                    subject_name(&lesson.subject_id),
                ),
            })
        })
        .take(MAX_SUGGESTIONS)
        .collect();

    debug!(
        event = "swap_suggestions",
        class_id = %lesson.class_id,
        subject_id = %lesson.subject_id,
        count = suggestions.len(),
    );
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ClockTime, EducationLevel, FixedTemplates, PeriodTemplate, ScheduleSlot, SchoolClass,
        SlotKey, Subject, Teacher,
    };

    fn templates() -> FixedTemplates {
        FixedTemplates::new(PeriodTemplate::uniform(ClockTime::hm(8, 0), 3, 40, 10))
    }

    fn catalog() -> Catalog {
        Catalog::new(
            vec![Teacher::new("T1").with_level(EducationLevel::Middle)],
            vec![
                SchoolClass::new("7A").with_level(EducationLevel::Middle),
                SchoolClass::new("7B").with_level(EducationLevel::Middle),
            ],
            vec![
                Subject::new("MATH", 4).with_name("Mathematics"),
                Subject::new("GEO", 2),
            ],
        )
    }

    #[test]
    fn test_first_three_in_scan_order() {
        let mut t1 = Schedule::new("T1", 3);
        for key in [
            SlotKey::new(Day::Tuesday, 2),
            SlotKey::new(Day::Monday, 3),
            SlotKey::new(Day::Friday, 1),
            SlotKey::new(Day::Monday, 1),
        ] {
            t1.set(key, ScheduleSlot::lesson("T1", "7A", "MATH"));
        }
        let lesson = PendingLesson::new("7B", "GEO", "T1");

        let swaps = suggest_swaps(&lesson, &[t1], &catalog(), &templates());

        let keys: Vec<_> = swaps.iter().map(|s| SlotKey::new(s.day, s.period)).collect();
        assert_eq!(
            keys,
            vec![
                SlotKey::new(Day::Monday, 1),
                SlotKey::new(Day::Monday, 3),
                SlotKey::new(Day::Tuesday, 2),
            ]
        );
        assert_eq!(swaps[0].target_class, "7A");
        assert_eq!(swaps[0].target_subject, "MATH");
        assert_eq!(swaps[0].target_teacher, "T1");
        assert_eq!(
            swaps[0].reason,
            "Moving Mathematics of class 7A frees Monday-1 for GEO"
        );
    }

    #[test]
    fn test_busy_class_cells_skipped() {
        let mut t1 = Schedule::new("T1", 3);
        let mut t2 = Schedule::new("T2", 3);
        let key = SlotKey::new(Day::Monday, 1);
        t1.set(key, ScheduleSlot::lesson("T1", "7A", "MATH"));
        t2.set(key, ScheduleSlot::lesson("T2", "7B", "ART"));
        let lesson = PendingLesson::new("7B", "GEO", "T1");

        let swaps = suggest_swaps(&lesson, &[t1, t2], &catalog(), &templates());
        assert!(swaps.is_empty());
    }

    #[test]
    fn test_unknown_class_or_idle_teacher() {
        let t1 = Schedule::new("T1", 3);
        let lesson = PendingLesson::new("9Z", "GEO", "T1");
        assert!(suggest_swaps(&lesson, &[t1.clone()], &catalog(), &templates()).is_empty());

        let lesson = PendingLesson::new("7B", "GEO", "T9");
        assert!(suggest_swaps(&lesson, &[t1], &catalog(), &templates()).is_empty());
    }
}
