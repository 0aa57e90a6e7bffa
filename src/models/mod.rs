//! Timetabling domain models.
//!
//! Provides the data types for school timetabling problems and their
//! solutions: catalogs of teachers, classes, and subjects; per-slot
//! availability constraints; daily period templates; placement tasks;
//! and per-teacher weekly grids.
//!
//! # Domain Mappings
//!
//! | Type | School | Generic scheduling |
//! |------|--------|--------------------|
//! | PlacementTask | Weekly hours of a subject for a class | Job |
//! | Teacher | Teacher | Resource |
//! | PeriodTemplate | Bell schedule | Calendar |
//! | Schedule | Teacher timetable | Resource plan |

mod calendar;
mod catalog;
mod class;
mod constraint;
mod schedule;
mod subject;
mod task;
mod teacher;

pub use calendar::{
    ClockTime, Day, FixedTemplates, PeriodSlot, PeriodTemplate, PeriodTemplateSource,
    RuleAdjustedTemplates, SlotKey, StandardTemplates,
};
pub use catalog::Catalog;
pub use class::{ClassAssignment, SchoolClass};
pub use constraint::{ConstraintIndex, ConstraintKind, EntityKind, EntityRef, TimeConstraint};
pub use schedule::{ClassCell, ClassGrid, Schedule, ScheduleSlot};
pub use subject::{Distribution, DistributionError, Subject};
pub use task::{PlacementTask, Priority};
pub use teacher::{EducationLevel, Teacher};
