//! Obligation builder.
//!
//! Turns a selection of classes, subjects, and teachers into the flat list
//! of [`PlacementTask`]s consumed by the generator. Class assignments are
//! the authoritative source of which teacher teaches which subject to
//! which class.
//!
//! # Rules
//! 1. Only selected classes, teachers, and subjects take part.
//! 2. An assignment whose teacher shares no education level with the
//!    class is skipped with a [`BuildWarning::LevelMismatch`].
//! 3. One task per (class, subject): the first teacher encountered keeps
//!    it, later teachers produce [`BuildWarning::DuplicateSubjectAssignment`].
//! 4. A distribution pattern that does not parse or does not sum to the
//!    weekly hours is dropped with a warning; the task is still created.
//!
//! Nothing here fails: every problem is reported as a warning.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{Catalog, Distribution, DistributionError, PlacementTask, SchoolClass};

/// Ids chosen for one generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selection {
    pub class_ids: BTreeSet<String>,
    pub subject_ids: BTreeSet<String>,
    pub teacher_ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects every class, subject, and teacher in the catalog.
    pub fn all(catalog: &Catalog) -> Self {
        Self {
            class_ids: catalog.classes().map(|c| c.id.clone()).collect(),
            subject_ids: catalog.subjects().map(|s| s.id.clone()).collect(),
            teacher_ids: catalog.teachers().map(|t| t.id.clone()).collect(),
        }
    }

    pub fn with_class(mut self, id: impl Into<String>) -> Self {
        self.class_ids.insert(id.into());
        self
    }

    pub fn with_subject(mut self, id: impl Into<String>) -> Self {
        self.subject_ids.insert(id.into());
        self
    }

    pub fn with_teacher(mut self, id: impl Into<String>) -> Self {
        self.teacher_ids.insert(id.into());
        self
    }

    /// Whether all three sets are empty.
    pub fn is_empty(&self) -> bool {
        self.class_ids.is_empty() && self.subject_ids.is_empty() && self.teacher_ids.is_empty()
    }
}

/// A non-fatal problem found while building tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    /// Teacher and class share no education level; assignment skipped.
    LevelMismatch { class_id: String, teacher_id: String },
    /// Pattern sums to a different total than the weekly hours; dropped.
    DistributionMismatch {
        class_id: String,
        subject_id: String,
        pattern_hours: u32,
        weekly_hours: u8,
    },
    /// Pattern could not be parsed; dropped.
    InvalidDistribution {
        subject_id: String,
        reason: DistributionError,
    },
    /// Subject already assigned to another teacher for this class; ignored.
    DuplicateSubjectAssignment {
        class_id: String,
        subject_id: String,
        kept_teacher_id: String,
        ignored_teacher_id: String,
    },
    /// Selected teacher id is missing from the catalog.
    UnknownTeacher { class_id: String, teacher_id: String },
    /// Selected subject id is missing from the catalog.
    UnknownSubject { class_id: String, subject_id: String },
    /// Subject has no weekly hours; no task created.
    ZeroWeeklyHours { subject_id: String },
    /// Selections were non-empty but produced no task.
    NoValidObligations,
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::LevelMismatch { class_id, teacher_id } => write!(
                f,
                "teacher '{teacher_id}' shares no education level with class '{class_id}'; assignment skipped"
            ),
            BuildWarning::DistributionMismatch {
                class_id,
                subject_id,
                pattern_hours,
                weekly_hours,
            } => write!(
                f,
                "distribution of '{subject_id}' for class '{class_id}' covers {pattern_hours} hours \
                 but the subject needs {weekly_hours}; placing in default units"
            ),
            BuildWarning::InvalidDistribution { subject_id, reason } => write!(
                f,
                "distribution of '{subject_id}' ignored: {reason}"
            ),
            BuildWarning::DuplicateSubjectAssignment {
                class_id,
                subject_id,
                kept_teacher_id,
                ignored_teacher_id,
            } => write!(
                f,
                "'{subject_id}' for class '{class_id}' is assigned to both '{kept_teacher_id}' \
                 and '{ignored_teacher_id}'; keeping '{kept_teacher_id}'"
            ),
            BuildWarning::UnknownTeacher { class_id, teacher_id } => write!(
                f,
                "class '{class_id}' references unknown teacher '{teacher_id}'"
            ),
            BuildWarning::UnknownSubject { class_id, subject_id } => write!(
                f,
                "class '{class_id}' references unknown subject '{subject_id}'"
            ),
            BuildWarning::ZeroWeeklyHours { subject_id } => {
                write!(f, "subject '{subject_id}' has no weekly hours")
            }
            BuildWarning::NoValidObligations => f.write_str(
                "no valid (class, subject, teacher) combination in the selection; \
                 check class assignments and education levels",
            ),
        }
    }
}

/// Tasks and warnings produced by [`build_tasks`].
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub tasks: Vec<PlacementTask>,
    pub warnings: Vec<BuildWarning>,
}

/// Builds placement tasks from a selection.
///
/// Classes are visited in id order and assignments in stored order, so
/// "first teacher encountered" is deterministic.
pub fn build_tasks(selection: &Selection, catalog: &Catalog) -> BuildOutput {
    let mut output = BuildOutput::default();
    // (class, subject) → index into output.tasks
    let mut seen: BTreeMap<(String, String), usize> = BTreeMap::new();

    let classes = catalog
        .classes()
        .filter(|c| selection.class_ids.contains(&c.id) && !c.assignments.is_empty());

    for class in classes {
        build_class_tasks(class, selection, catalog, &mut seen, &mut output);
    }

    if output.tasks.is_empty() && !selection.is_empty() {
        output.warnings.push(BuildWarning::NoValidObligations);
    }

    for w in &output.warnings {
        warn!(event = "build_warning", "{w}");
    }
    info!(
        event = "build_end",
        tasks = output.tasks.len(),
        warnings = output.warnings.len(),
    );
    output
}

fn build_class_tasks(
    class: &SchoolClass,
    selection: &Selection,
    catalog: &Catalog,
    seen: &mut BTreeMap<(String, String), usize>,
    output: &mut BuildOutput,
) {
    for assignment in &class.assignments {
        if !selection.teacher_ids.contains(&assignment.teacher_id) {
            continue;
        }
        let Some(teacher) = catalog.teacher(&assignment.teacher_id) else {
            output.warnings.push(BuildWarning::UnknownTeacher {
                class_id: class.id.clone(),
                teacher_id: assignment.teacher_id.clone(),
            });
            continue;
        };
        if !teacher.teaches_any_level(&class.levels) {
            output.warnings.push(BuildWarning::LevelMismatch {
                class_id: class.id.clone(),
                teacher_id: teacher.id.clone(),
            });
            continue;
        }

        for subject_id in &assignment.subject_ids {
            if !selection.subject_ids.contains(subject_id) {
                continue;
            }
            let Some(subject) = catalog.subject(subject_id) else {
                output.warnings.push(BuildWarning::UnknownSubject {
                    class_id: class.id.clone(),
                    subject_id: subject_id.clone(),
                });
                continue;
            };

            let key = (class.id.clone(), subject.id.clone());
            if let Some(&existing) = seen.get(&key) {
                let kept = &output.tasks[existing].teacher_id;
                if *kept != teacher.id {
                    output.warnings.push(BuildWarning::DuplicateSubjectAssignment {
                        class_id: class.id.clone(),
                        subject_id: subject.id.clone(),
                        kept_teacher_id: kept.clone(),
                        ignored_teacher_id: teacher.id.clone(),
                    });
                }
                continue;
            }

            if subject.weekly_hours == 0 {
                output.warnings.push(BuildWarning::ZeroWeeklyHours {
                    subject_id: subject.id.clone(),
                });
                continue;
            }

            let mut task =
                PlacementTask::new(&class.id, &subject.id, &teacher.id, subject.weekly_hours);
            if let Some(pattern) = &subject.distribution_pattern {
                match Distribution::parse(pattern) {
                    Ok(d) if d.matches(subject.weekly_hours) => task.distribution = Some(d),
                    Ok(d) => output.warnings.push(BuildWarning::DistributionMismatch {
                        class_id: class.id.clone(),
                        subject_id: subject.id.clone(),
                        pattern_hours: d.total_hours(),
                        weekly_hours: subject.weekly_hours,
                    }),
                    Err(reason) => output.warnings.push(BuildWarning::InvalidDistribution {
                        subject_id: subject.id.clone(),
                        reason,
                    }),
                }
            }

            debug!(
                event = "task_built",
                task = %task.id,
                teacher = %task.teacher_id,
                hours = task.weekly_hours,
            );
            seen.insert(key, output.tasks.len());
            output.tasks.push(task);
        }
    }
}
