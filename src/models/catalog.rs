//! Read-only catalogs of teachers, classes, and subjects.

use std::collections::BTreeMap;

use super::{SchoolClass, Subject, Teacher};

/// Teacher, class, and subject catalogs keyed by id.
///
/// Iteration is in id order, which keeps every consumer deterministic.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    teachers: BTreeMap<String, Teacher>,
    classes: BTreeMap<String, SchoolClass>,
    subjects: BTreeMap<String, Subject>,
}

impl Catalog {
    /// Builds a catalog. Later entries replace earlier ones with the same id.
    pub fn new(teachers: Vec<Teacher>, classes: Vec<SchoolClass>, subjects: Vec<Subject>) -> Self {
        Self {
            teachers: teachers.into_iter().map(|t| (t.id.clone(), t)).collect(),
            classes: classes.into_iter().map(|c| (c.id.clone(), c)).collect(),
            subjects: subjects.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    pub fn with_teacher(mut self, teacher: Teacher) -> Self {
        self.teachers.insert(teacher.id.clone(), teacher);
        self
    }

    pub fn with_class(mut self, class: SchoolClass) -> Self {
        self.classes.insert(class.id.clone(), class);
        self
    }

    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subjects.insert(subject.id.clone(), subject);
        self
    }

    pub fn teacher(&self, id: &str) -> Option<&Teacher> {
        self.teachers.get(id)
    }

    pub fn class(&self, id: &str) -> Option<&SchoolClass> {
        self.classes.get(id)
    }

    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.get(id)
    }

    pub fn teachers(&self) -> impl Iterator<Item = &Teacher> {
        self.teachers.values()
    }

    pub fn classes(&self) -> impl Iterator<Item = &SchoolClass> {
        self.classes.values()
    }

    pub fn subjects(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.values()
    }
}
