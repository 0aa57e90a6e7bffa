//! School timetabling core.
//!
//! Assigns weekly lesson hours to (day, period) slots: one conflict-free
//! grid per teacher, a report of hours that could not be placed, and the
//! tools to diagnose and resolve them by hand.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Teacher`, `SchoolClass`, `Subject`,
//!   `TimeConstraint`, `PeriodTemplate`, `PlacementTask`, `Schedule`, `ClassGrid`
//! - **`builder`**: Class assignments → placement tasks
//! - **`scheduler`**: Constructive placement engine and statistics
//! - **`analysis`**: Per-slot conflict analysis, swap suggestions, manual placement
//! - **`validation`**: Input integrity checks and schedule auditing
//! - **`config`**: Global scheduling rules (TOML)
//! - **`persistence`**: Atomic schedule replacement and constraint storage
//!
//! # Flow
//!
//! ```text
//! build_tasks ─► ScheduleGenerator::generate ─► ScheduleRepository::save_outcome
//!                          │
//!                          └─ unassigned lessons ─► diagnose ─► place_lesson / relocate_lesson
//! ```
//!
//! # Invariants
//!
//! - No class is claimed by two teachers in one slot.
//! - `total_lessons_to_place == placed_lessons + Σ missing_hours`.
//! - No lesson sits on an `unavailable` slot of its teacher, class, or subject.
//! - Identical input gives identical schedules.

pub mod analysis;
pub mod builder;
pub mod config;
pub mod error;
pub mod models;
pub mod persistence;
pub mod scheduler;
pub mod validation;

pub use error::{Result, TimetableError};

#[cfg(test)]
mod tests {
    use crate::analysis::{diagnose, PendingLesson};
    use crate::builder::{build_tasks, BuildWarning, Selection};
    use crate::config::SchedulingRules;
    use crate::models::{
        Catalog, Day, EducationLevel, EntityRef, SchoolClass, Subject, Teacher, TimeConstraint,
    };
    use crate::persistence::{InMemoryScheduleRepository, ScheduleRepository};
    use crate::scheduler::ScheduleGenerator;
    use crate::validation::audit_schedules;

    fn school() -> Catalog {
        Catalog::new(
            vec![
                Teacher::new("ada")
                    .with_name("Ada")
                    .with_branch("Mathematics")
                    .with_level(EducationLevel::Middle),
                Teacher::new("bo")
                    .with_name("Bo")
                    .with_branch("Literature")
                    .with_level(EducationLevel::Middle),
                Teacher::new("cy")
                    .with_name("Cy")
                    .with_level(EducationLevel::High),
            ],
            vec![
                SchoolClass::new("7A")
                    .with_level(EducationLevel::Middle)
                    .with_assignment("ada", ["math", "geo"])
                    .with_assignment("bo", ["lit"])
                    .with_assignment("cy", ["art"]),
                SchoolClass::new("7B")
                    .with_level(EducationLevel::Middle)
                    .with_assignment("ada", ["math"])
                    .with_assignment("bo", ["lit", "geo"]),
            ],
            vec![
                Subject::new("math", 5)
                    .with_level(EducationLevel::Middle)
                    .with_distribution("2+2+1"),
                Subject::new("lit", 4).with_level(EducationLevel::Middle),
                Subject::new("geo", 2)
                    .with_level(EducationLevel::Middle)
                    .with_distribution("1+1+1"),
                Subject::new("art", 1).with_level(EducationLevel::Middle),
            ],
        )
    }

    #[test]
    fn test_build_generate_persist() {
        let catalog = school();
        let built = build_tasks(&Selection::all(&catalog), &catalog);

        assert_eq!(built.tasks.len(), 6);
        assert!(built
            .warnings
            .iter()
            .any(|w| matches!(w, BuildWarning::LevelMismatch { teacher_id, .. } if teacher_id == "cy")));
        assert!(built
            .warnings
            .iter()
            .any(|w| matches!(w, BuildWarning::DistributionMismatch { subject_id, .. } if subject_id == "geo")));

        let constraints = vec![
            TimeConstraint::unavailable("c1", EntityRef::teacher("ada"), Day::Monday, 1),
            TimeConstraint::restricted("c2", EntityRef::class("7B"), Day::Friday, 7),
        ];
        let rules = SchedulingRules::default().with_distribution_patterns(true, true);
        let generator = ScheduleGenerator::new(rules);
        let outcome = generator.generate(&built.tasks, &catalog, &constraints).unwrap();

        assert_eq!(outcome.statistics.total_lessons_to_place, 22);
        assert!(outcome.statistics.is_complete());
        assert!(audit_schedules(&outcome.schedules, &constraints).is_empty());

        let repo = InMemoryScheduleRepository::new();
        repo.save_outcome(&outcome).unwrap();
        assert_eq!(repo.load_schedules().unwrap(), outcome.schedules);

        let rerun = generator.generate(&built.tasks, &catalog, &constraints).unwrap();
        repo.save_outcome(&rerun).unwrap();
        assert_eq!(repo.schedule_count().unwrap(), 2);
    }

    #[test]
    fn test_diagnose_after_generation() {
        let catalog = school();
        let built = build_tasks(&Selection::all(&catalog), &catalog);
        let generator = ScheduleGenerator::default();
        let outcome = generator.generate(&built.tasks, &catalog, &[]).unwrap();

        // Every conflict needs a lesson of 7A or of bo in that slot.
        let lesson = PendingLesson::new("7A", "lit", "bo");
        let diagnosis = diagnose(
            &lesson,
            &outcome.schedules,
            &catalog,
            &[],
            &generator.templates(),
        )
        .unwrap();

        let booked: usize = outcome
            .schedules
            .iter()
            .flat_map(|s| s.lessons())
            .filter(|(_, slot)| slot.class_id == "7A" || slot.teacher_id == "bo")
            .count();
        assert!(!diagnosis.analysis.available_slots.is_empty());
        assert_eq!(
            diagnosis.analysis.available_slots.len() + diagnosis.analysis.conflict_reasons.len(),
            35
        );
        assert!(diagnosis.analysis.conflict_reasons.len() <= booked);
    }
}
