//! Per-slot availability of one pending lesson.
//!
//! Every slot key of the class's period template ends up in exactly one of
//! two places: the available set, or the reasons map with at least one
//! [`ConflictReason`].
//!
//! # Reason order
//!
//! 1. Teacher grid: fixed period, or a lesson of another class or subject
//! 2. Class grid: fixed period, or a lesson of another teacher
//! 3. Teacher constraint: `unavailable` or `restricted`
//! 4. Class constraint: `unavailable` or `restricted`
//! 5. Subject constraint: `unavailable`

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{
    ClassGrid, ConstraintIndex, ConstraintKind, EntityRef, PlacementTask, Schedule, SlotKey,
    TimeConstraint,
};
use crate::scheduler::UnassignedLesson;

/// A lesson waiting for manual placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLesson {
    pub class_id: String,
    pub subject_id: String,
    pub teacher_id: String,
    /// Hours still to place.
    pub missing_hours: u8,
}

impl PendingLesson {
    /// A single pending hour.
    pub fn new(
        class_id: impl Into<String>,
        subject_id: impl Into<String>,
        teacher_id: impl Into<String>,
    ) -> Self {
        Self {
            class_id: class_id.into(),
            subject_id: subject_id.into(),
            teacher_id: teacher_id.into(),
            missing_hours: 1,
        }
    }
}

impl From<&PlacementTask> for PendingLesson {
    fn from(task: &PlacementTask) -> Self {
        Self {
            class_id: task.class_id.clone(),
            subject_id: task.subject_id.clone(),
            teacher_id: task.teacher_id.clone(),
            missing_hours: task.missing_hours(),
        }
    }
}

impl From<&UnassignedLesson> for PendingLesson {
    fn from(lesson: &UnassignedLesson) -> Self {
        Self {
            class_id: lesson.class_id.clone(),
            subject_id: lesson.subject_id.clone(),
            teacher_id: lesson.teacher_id.clone(),
            missing_hours: lesson.missing_hours,
        }
    }
}

/// Why a slot cannot take the lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictReason {
    /// Break period, or outside the teacher's day.
    TeacherFixedPeriod,
    /// The teacher already teaches something else here.
    TeacherBusy { class_id: String, subject_id: String },
    /// Break period, or outside the class's day.
    ClassFixedPeriod,
    /// Another teacher already teaches the class here.
    ClassBusy { teacher_id: String, subject_id: String },
    TeacherConstraint(ConstraintKind),
    ClassConstraint(ConstraintKind),
    SubjectUnavailable,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::TeacherFixedPeriod => f.write_str("Teacher has a fixed period"),
            ConflictReason::TeacherBusy {
                class_id,
                subject_id,
            } => write!(f, "Teacher is teaching {subject_id} to class {class_id}"),
            ConflictReason::ClassFixedPeriod => f.write_str("Class has a fixed period"),
            ConflictReason::ClassBusy {
                teacher_id,
                subject_id,
            } => write!(f, "Class has {subject_id} with teacher {teacher_id}"),
            ConflictReason::TeacherConstraint(kind) => write!(f, "Teacher is {}", kind_label(*kind)),
            ConflictReason::ClassConstraint(kind) => write!(f, "Class is {}", kind_label(*kind)),
            ConflictReason::SubjectUnavailable => f.write_str("Subject is unavailable"),
        }
    }
}

fn kind_label(kind: ConstraintKind) -> &'static str {
    match kind {
        ConstraintKind::Unavailable => "unavailable",
        ConstraintKind::Restricted => "restricted",
        ConstraintKind::Preferred => "preferred",
    }
}

/// Partition of a class's slot keys into available and conflicting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAnalysis {
    pub available_slots: BTreeSet<SlotKey>,
    pub conflict_reasons: BTreeMap<SlotKey, Vec<ConflictReason>>,
}

impl SlotAnalysis {
    pub fn is_available(&self, key: SlotKey) -> bool {
        self.available_slots.contains(&key)
    }

    /// Whether no slot can take the lesson.
    pub fn is_blocked(&self) -> bool {
        self.available_slots.is_empty()
    }

    /// Reasons at `key` as display strings; empty if available.
    pub fn messages(&self, key: SlotKey) -> Vec<String> {
        self.conflict_reasons
            .get(&key)
            .map(|reasons| reasons.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }
}

/// Classifies every slot of the class's template for `lesson`.
///
/// `teacher_grid` is the lesson teacher's current grid; `class_grid` is
/// the class view derived from all teacher grids.
pub fn analyze(
    lesson: &PendingLesson,
    teacher_grid: &Schedule,
    class_grid: &ClassGrid,
    constraints: &[TimeConstraint],
) -> SlotAnalysis {
    let index = ConstraintIndex::new(constraints);
    let teacher = EntityRef::teacher(&lesson.teacher_id);
    let class = EntityRef::class(&lesson.class_id);
    let subject = EntityRef::subject(&lesson.subject_id);

    let mut analysis = SlotAnalysis::default();
    for key in class_grid.template().slot_keys() {
        let mut reasons = Vec::new();

        if !teacher_grid.contains(key) {
            reasons.push(ConflictReason::TeacherFixedPeriod);
        } else if let Some(slot) = teacher_grid.slot(key) {
            if slot.is_fixed {
                reasons.push(ConflictReason::TeacherFixedPeriod);
            } else if slot.class_id != lesson.class_id || slot.subject_id != lesson.subject_id {
                reasons.push(ConflictReason::TeacherBusy {
                    class_id: slot.class_id.clone(),
                    subject_id: slot.subject_id.clone(),
                });
            }
        }

        if class_grid.is_fixed(key) {
            reasons.push(ConflictReason::ClassFixedPeriod);
        } else if let Some(cell) = class_grid.occupant(key) {
            if cell.teacher_id != lesson.teacher_id {
                reasons.push(ConflictReason::ClassBusy {
                    teacher_id: cell.teacher_id.clone(),
                    subject_id: cell.subject_id.clone(),
                });
            }
        }

        let kind = index.kind(&teacher, key);
        if kind != ConstraintKind::Preferred {
            reasons.push(ConflictReason::TeacherConstraint(kind));
        }
        let kind = index.kind(&class, key);
        if kind != ConstraintKind::Preferred {
            reasons.push(ConflictReason::ClassConstraint(kind));
        }
        if index.is_unavailable(&subject, key) {
            reasons.push(ConflictReason::SubjectUnavailable);
        }

        if reasons.is_empty() {
            analysis.available_slots.insert(key);
        } else {
            reasons.dedup();
            analysis.conflict_reasons.insert(key, reasons);
        }
    }
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClockTime, Day, PeriodSlot, PeriodTemplate, ScheduleSlot};

    fn template() -> PeriodTemplate {
        PeriodTemplate::new(vec![
            PeriodSlot::lesson(1, ClockTime::hm(8, 0), ClockTime::hm(8, 40)),
            PeriodSlot::lesson(2, ClockTime::hm(8, 50), ClockTime::hm(9, 30)),
            PeriodSlot::break_period(3, ClockTime::hm(9, 30), ClockTime::hm(10, 0)),
            PeriodSlot::lesson(4, ClockTime::hm(10, 0), ClockTime::hm(10, 40)),
        ])
    }

    fn lesson() -> PendingLesson {
        PendingLesson::new("9A", "MATH", "T1")
    }

    #[test]
    fn test_free_slot_is_available() {
        let teacher = Schedule::for_template("T1", &template());
        let class = ClassGrid::derive("9A", template(), [&teacher]);
        let key = SlotKey::new(Day::Monday, 1);

        let analysis = analyze(&lesson(), &teacher, &class, &[]);

        assert!(analysis.is_available(key));
        assert!(!analysis.conflict_reasons.contains_key(&key));
        assert!(analysis.messages(key).is_empty());
    }

    #[test]
    fn test_partition_covers_every_slot() {
        let mut teacher = Schedule::for_template("T1", &template());
        teacher.set(SlotKey::new(Day::Tuesday, 1), ScheduleSlot::lesson("T1", "9B", "MATH"));
        let mut other = Schedule::for_template("T2", &template());
        other.set(SlotKey::new(Day::Tuesday, 2), ScheduleSlot::lesson("T2", "9A", "LIT"));
        let class = ClassGrid::derive("9A", template(), [&teacher, &other]);
        let constraints = vec![
            TimeConstraint::unavailable("c1", EntityRef::teacher("T1"), Day::Friday, 4),
            TimeConstraint::restricted("c2", EntityRef::class("9A"), Day::Friday, 4),
        ];

        let analysis = analyze(&lesson(), &teacher, &class, &constraints);

        let all: BTreeSet<SlotKey> = template().slot_keys().into_iter().collect();
        let conflicted: BTreeSet<SlotKey> = analysis.conflict_reasons.keys().copied().collect();
        assert!(analysis.available_slots.is_disjoint(&conflicted));
        let union: BTreeSet<SlotKey> = analysis.available_slots.union(&conflicted).copied().collect();
        assert_eq!(union, all);
        assert_eq!(all.len(), 20);
        // Breaks on 5 days plus three blocked cells.
        assert_eq!(analysis.available_slots.len(), 20 - 5 - 3);
    }

    #[test]
    fn test_reason_order() {
        let mut teacher = Schedule::for_template("T1", &template());
        let key = SlotKey::new(Day::Wednesday, 2);
        teacher.set(key, ScheduleSlot::lesson("T1", "9B", "PHYS"));
        let mut other = Schedule::for_template("T2", &template());
        other.set(key, ScheduleSlot::lesson("T2", "9A", "LIT"));
        let class = ClassGrid::derive("9A", template(), [&teacher, &other]);
        let constraints = vec![
            TimeConstraint::restricted("c1", EntityRef::teacher("T1"), Day::Wednesday, 2),
            TimeConstraint::unavailable("c2", EntityRef::class("9A"), Day::Wednesday, 2),
            TimeConstraint::unavailable("c3", EntityRef::subject("MATH"), Day::Wednesday, 2),
        ];

        let analysis = analyze(&lesson(), &teacher, &class, &constraints);

        assert_eq!(
            analysis.conflict_reasons[&key],
            vec![
                ConflictReason::TeacherBusy {
                    class_id: "9B".into(),
                    subject_id: "PHYS".into()
                },
                ConflictReason::ClassBusy {
                    teacher_id: "T2".into(),
                    subject_id: "LIT".into()
                },
                ConflictReason::TeacherConstraint(ConstraintKind::Restricted),
                ConflictReason::ClassConstraint(ConstraintKind::Unavailable),
                ConflictReason::SubjectUnavailable,
            ]
        );
        assert_eq!(analysis.messages(key)[0], "Teacher is teaching PHYS to class 9B");
        assert_eq!(analysis.messages(key)[3], "Class is unavailable");
    }

    #[test]
    fn test_fixed_periods_reported_once_per_side() {
        let teacher = Schedule::for_template("T1", &template());
        let class = ClassGrid::derive("9A", template(), [&teacher]);
        let key = SlotKey::new(Day::Thursday, 3);

        let analysis = analyze(&lesson(), &teacher, &class, &[]);

        assert_eq!(
            analysis.conflict_reasons[&key],
            vec![ConflictReason::TeacherFixedPeriod, ConflictReason::ClassFixedPeriod]
        );
    }

    #[test]
    fn test_shorter_teacher_day() {
        let short = PeriodTemplate::uniform(ClockTime::hm(8, 0), 2, 40, 10);
        let teacher = Schedule::for_template("T1", &short);
        let class = ClassGrid::derive("9A", template(), [&teacher]);

        let analysis = analyze(&lesson(), &teacher, &class, &[]);

        assert_eq!(
            analysis.conflict_reasons[&SlotKey::new(Day::Monday, 4)],
            vec![ConflictReason::TeacherFixedPeriod]
        );
    }

    #[test]
    fn test_own_lesson_is_not_a_conflict() {
        let mut teacher = Schedule::for_template("T1", &template());
        let key = SlotKey::new(Day::Monday, 2);
        teacher.set(key, ScheduleSlot::lesson("T1", "9A", "MATH"));
        let class = ClassGrid::derive("9A", template(), [&teacher]);

        let analysis = analyze(&lesson(), &teacher, &class, &[]);
        assert!(analysis.is_available(key));
    }
}
